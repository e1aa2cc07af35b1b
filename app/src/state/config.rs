//! Configuration loading and persistence.
//!
//! Handles the TOML config file (~/.config/deadeye/config.toml). The schema
//! lives in the `deadeye` lib; only the I/O is here.

use std::path::{Path, PathBuf};

pub use deadeye::DeadeyeConfig;

/// Generate a short unique ID (8 hex chars from system time).
/// Used for WebSocket source IDs (`ws.{hex}`).
pub fn generate_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:08x}", (ts ^ (seq as u64)) as u32)
}

/// Returns `~/.config/deadeye/config.toml`.
pub fn default_config_path() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deadeye");
    dir.join("config.toml")
}

/// Load persisted config from disk. If the file does not exist, creates it
/// with all-defaults and returns that. A file that fails to parse is left
/// alone and defaults are used for the session.
pub fn load(path: &Path) -> DeadeyeConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<DeadeyeConfig>(&contents) {
            Ok(config) => {
                tracing::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("failed to parse {}: {e}", path.display());
                DeadeyeConfig::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let defaults = DeadeyeConfig::default();
            tracing::info!("no config file found, creating {}", path.display());
            save_to(path, &defaults);
            defaults
        }
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", path.display());
            DeadeyeConfig::default()
        }
    }
}

/// Write config to a specific path. Creates parent dirs if needed. Never panics.
pub fn save_to(path: &Path, config: &DeadeyeConfig) {
    if let Some(dir) = path.parent()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        tracing::warn!("failed to create config dir {}: {e}", dir.display());
        return;
    }
    match toml::to_string_pretty(config) {
        Ok(contents) => {
            if let Err(e) = std::fs::write(path, contents) {
                tracing::warn!("failed to write {}: {e}", path.display());
            }
        }
        Err(e) => {
            tracing::warn!("failed to serialize config: {e}");
        }
    }
}
