/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    /// Interval between player steps. Adjustable at runtime within
    /// [min, max]; the scale is inverted: a larger interval is slower.
    pub player_step_ms: u64,
    /// Interval between chaser steps. Fixed; speed control never
    /// touches it.
    pub chaser_step_ms: u64,
    pub min_player_step_ms: u64,
    pub max_player_step_ms: u64,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_player_step")]
    player_step_ms: u64,
    #[serde(default = "default_chaser_step")]
    chaser_step_ms: u64,
    #[serde(default = "default_min_player_step")]
    min_player_step_ms: u64,
    #[serde(default = "default_max_player_step")]
    max_player_step_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_player_step() -> u64 { 300 }
fn default_chaser_step() -> u64 { 400 }
fn default_min_player_step() -> u64 { 50 }
fn default_max_player_step() -> u64 { 300 }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            player_step_ms: default_player_step(),
            chaser_step_ms: default_chaser_step(),
            min_player_step_ms: default_min_player_step(),
            max_player_step_ms: default_max_player_step(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Clamp the configured step into its own slider bounds.
        let min = toml_cfg.speed.min_player_step_ms.max(1);
        let max = toml_cfg.speed.max_player_step_ms.max(min);
        let player_step_ms = toml_cfg.speed.player_step_ms.clamp(min, max);

        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            speed: SpeedConfig {
                player_step_ms,
                chaser_step_ms: toml_cfg.speed.chaser_step_ms.max(1),
                min_player_step_ms: min,
                max_player_step_ms: max,
            },
            levels_dir,
        }
    }

    #[cfg(test)]
    pub fn default_for_tests() -> Self {
        Self::from_toml(TomlConfig::default(), &[PathBuf::from(".")])
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable (resolve symlinks)
    if let Ok(exe) = std::env::current_exe() {
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
