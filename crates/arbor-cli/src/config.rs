//! Configuration – reads/writes `~/.arbor/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use arbor_sim::GuardSettings;
use arbor_types::ArborError;
use serde::{Deserialize, Serialize};

/// How debug snapshots are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotFormat::Text => write!(f, "text"),
            SnapshotFormat::Json => write!(f, "json"),
        }
    }
}

/// Persisted run configuration stored in `~/.arbor/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Simulation steps per simulated second.
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,

    /// Steps to run; `0` runs until Ctrl-C.
    #[serde(default = "default_steps")]
    pub steps: u64,

    /// Print the tree every N steps; `0` disables periodic snapshots.
    #[serde(default = "default_snapshot_every")]
    pub snapshot_every: u64,

    #[serde(default)]
    pub snapshot_format: SnapshotFormat,

    /// Sleep between steps so the run follows wall-clock time.
    #[serde(default)]
    pub realtime: bool,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_wander_range")]
    pub wander_range: f32,

    #[serde(default = "default_chase_min_awareness")]
    pub chase_min_awareness: f32,

    #[serde(default = "default_chase_stop_awareness")]
    pub chase_stop_awareness: f32,

    #[serde(default = "default_agent_speed")]
    pub agent_speed: f32,
}

fn default_tick_rate_hz() -> u32 {
    30
}
fn default_steps() -> u64 {
    300
}
fn default_snapshot_every() -> u64 {
    30
}
fn default_seed() -> u64 {
    42
}
fn default_wander_range() -> f32 {
    10.0
}
fn default_chase_min_awareness() -> f32 {
    1.5
}
fn default_chase_stop_awareness() -> f32 {
    1.0
}
fn default_agent_speed() -> f32 {
    3.5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            steps: default_steps(),
            snapshot_every: default_snapshot_every(),
            snapshot_format: SnapshotFormat::default(),
            realtime: false,
            seed: default_seed(),
            wander_range: default_wander_range(),
            chase_min_awareness: default_chase_min_awareness(),
            chase_stop_awareness: default_chase_stop_awareness(),
            agent_speed: default_agent_speed(),
        }
    }
}

impl Config {
    /// Seconds per step.  A zero rate is treated as 1 Hz.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }

    pub fn guard_settings(&self) -> GuardSettings {
        GuardSettings {
            wander_range: self.wander_range,
            chase_min_awareness: self.chase_min_awareness,
            chase_stop_awareness: self.chase_stop_awareness,
            agent_speed: self.agent_speed,
            seed: self.seed,
            ..GuardSettings::default()
        }
    }
}

/// Return the path to `~/.arbor/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".arbor").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, ArborError> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, ArborError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| ArborError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| ArborError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `ARBOR_*` environment variable overrides to `cfg`.  Values that do
/// not parse are ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `ARBOR_STEPS` | `steps` |
/// | `ARBOR_TICK_RATE_HZ` | `tick_rate_hz` |
/// | `ARBOR_SNAPSHOT_EVERY` | `snapshot_every` |
/// | `ARBOR_SEED` | `seed` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("ARBOR_STEPS")
        && let Ok(steps) = v.parse::<u64>()
    {
        cfg.steps = steps;
    }
    if let Ok(v) = std::env::var("ARBOR_TICK_RATE_HZ")
        && let Ok(rate) = v.parse::<u32>()
    {
        cfg.tick_rate_hz = rate;
    }
    if let Ok(v) = std::env::var("ARBOR_SNAPSHOT_EVERY")
        && let Ok(every) = v.parse::<u64>()
    {
        cfg.snapshot_every = every;
    }
    if let Ok(v) = std::env::var("ARBOR_SEED")
        && let Ok(seed) = v.parse::<u64>()
    {
        cfg.seed = seed;
    }
}

/// Save the config to disk, creating `~/.arbor/` if necessary.
pub fn save(cfg: &Config) -> Result<(), ArborError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), ArborError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ArborError::Config(format!("failed to create {}: {}", parent.display(), e)))?;
    }
    let raw = toml::to_string_pretty(cfg).map_err(|e| ArborError::Config(format!("failed to serialize: {}", e)))?;
    fs::write(path, raw).map_err(|e| ArborError::Config(format!("failed to write {}: {}", path.display(), e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.tick_rate_hz, 30);
        assert_eq!(cfg.steps, 300);
        assert_eq!(cfg.snapshot_every, 30);
        assert_eq!(cfg.snapshot_format, SnapshotFormat::Text);
        assert!(!cfg.realtime);
        assert_eq!(cfg.seed, 42);
        assert!((cfg.delta_time() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config {
            snapshot_format: SnapshotFormat::Json,
            wander_range: 4.0,
            ..Config::default()
        };
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.snapshot_format, SnapshotFormat::Json);
        assert_eq!(loaded.wander_range, 4.0);
        assert_eq!(loaded.agent_speed, 3.5);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "realtime = true\nsnapshot_format = \"json\"\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert!(loaded.realtime);
        assert_eq!(loaded.snapshot_format, SnapshotFormat::Json);
        assert_eq!(loaded.chase_min_awareness, 1.5);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tick_rate_hz = \"fast\"").unwrap();

        assert!(matches!(load_from(&path), Err(ArborError::Config(_))));
    }

    #[test]
    fn config_path_points_to_arbor_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".arbor"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn guard_settings_follow_config() {
        let cfg = Config {
            wander_range: 3.0,
            seed: 9,
            ..Config::default()
        };
        let settings = cfg.guard_settings();
        assert_eq!(settings.wander_range, 3.0);
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.yell_cooldown_max, 3.0);
    }

    #[test]
    fn apply_env_overrides_changes_steps() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ARBOR_STEPS", "12") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.steps, 12);
        unsafe { std::env::remove_var("ARBOR_STEPS") };
    }

    #[test]
    fn apply_env_overrides_changes_tick_rate() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ARBOR_TICK_RATE_HZ", "60") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.tick_rate_hz, 60);
        unsafe { std::env::remove_var("ARBOR_TICK_RATE_HZ") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_seed() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ARBOR_SEED", "not-a-seed") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.seed, 42);
        unsafe { std::env::remove_var("ARBOR_SEED") };
    }

    #[test]
    fn apply_env_overrides_changes_snapshot_every() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ARBOR_SNAPSHOT_EVERY", "5") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.snapshot_every, 5);
        unsafe { std::env::remove_var("ARBOR_SNAPSHOT_EVERY") };
    }
}
