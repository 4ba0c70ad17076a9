/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Milliseconds between troll turns while running.
    pub tick_rate_ms: u64,
    /// Give up after this many turns without reaching the treasure.
    pub max_turns: u32,
    /// Side length of the troll's square knowledge grid.
    pub map_side: usize,
    /// Maze to run instead of the built-in one.
    pub maze_file: Option<PathBuf>,
    /// Draw the troll's knowledge panel beside the true maze.
    pub show_knowledge: bool,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    sim: TomlSim,
}

#[derive(Deserialize, Debug)]
struct TomlSim {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_max_turns")]
    max_turns: u32,
    #[serde(default = "default_map_side")]
    map_side: usize,
    #[serde(default)]
    maze_file: String,
    #[serde(default = "default_show_knowledge")]
    show_knowledge: bool,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 40 }
fn default_max_turns() -> u32 { 5000 }
fn default_map_side() -> usize { 35 }
fn default_show_knowledge() -> bool { true }

impl Default for TomlSim {
    fn default() -> Self {
        TomlSim {
            tick_rate_ms: default_tick_rate(),
            max_turns: default_max_turns(),
            map_side: default_map_side(),
            maze_file: String::new(),
            show_knowledge: default_show_knowledge(),
        }
    }
}

// ── Loading ──

impl SimConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        let maze_file = if toml_cfg.sim.maze_file.is_empty() {
            None
        } else {
            let raw = PathBuf::from(&toml_cfg.sim.maze_file);
            if raw.is_absolute() {
                Some(raw)
            } else {
                // Search candidate dirs for the relative path.
                Some(
                    search_dirs
                        .iter()
                        .map(|d| d.join(&raw))
                        .find(|p| p.is_file())
                        .unwrap_or(raw),
                )
            }
        };

        SimConfig {
            tick_rate_ms: toml_cfg.sim.tick_rate_ms,
            max_turns: toml_cfg.sim.max_turns,
            map_side: toml_cfg.sim.map_side.max(3),
            maze_file,
            show_knowledge: toml_cfg.sim.show_knowledge,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds data relative
        // to the real one.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
