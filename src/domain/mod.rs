pub mod action;
pub mod cell;
pub mod map;
pub mod path;
pub mod plan;
