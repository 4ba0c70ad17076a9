pub mod controller;

pub use controller::{Agent, Stage};
