//! Configuration loader for TheCanvas.
//!
//! Reads `canvas.toml` from the data directory (`~/.thecanvas/` in
//! production) and deserializes it into [`CanvasConfig`]. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use canvas_types::config::CanvasConfig;

/// Resolve the data directory: `CANVAS_DATA_DIR` env var, falling back to
/// `~/.thecanvas`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CANVAS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".thecanvas")
}

/// Load configuration from `{data_dir}/canvas.toml`.
///
/// - If the file does not exist, returns [`CanvasConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> CanvasConfig {
    let config_path = data_dir.join("canvas.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No canvas.toml found at {}, using defaults", config_path.display());
            return CanvasConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return CanvasConfig::default();
        }
    };

    match toml::from_str::<CanvasConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            CanvasConfig::default()
        }
    }
}
