//! Settings parser for .lasval/config.toml

use super::types::Settings;
use lasval_core::prelude::*;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.toml";
const LASVAL_DIR: &str = ".lasval";

/// Load settings from `.lasval/config.toml` under `project_path`.
///
/// A missing or unparseable file yields the defaults.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = project_path.join(LASVAL_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create the `.lasval/` directory with a commented default config
pub fn init_config_dir(project_path: &Path) -> Result<()> {
    let lasval_dir = project_path.join(LASVAL_DIR);

    if !lasval_dir.exists() {
        std::fs::create_dir_all(&lasval_dir)
            .map_err(|e| Error::config(format!("Failed to create .lasval dir: {}", e)))?;
    }

    let config_path = lasval_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# LAS Validator Configuration

[server]
base_url = "http://127.0.0.1:5000"

[upload]
max_file_size_bytes = 10485760   # 10 MiB
required_extension = ".las"
preview_lines = 50

[progress]
step_percent = 10
ceiling_percent = 90
interval_ms = 200
settle_ms = 500

[notifications]
timeout_ms = 5000

[export]
directory = "."

[proxy]
listen = "127.0.0.1:8080"
upstream = "http://127.0.0.1:5000"
version = "v1"                   # bump on every shell change
# cache_dir = "/var/cache/lasval"
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Created default config at {:?}", config_path);
    }

    Ok(())
}

/// Validate values that would break the workflow if taken literally
pub fn validate_settings(settings: &Settings) -> Result<()> {
    let progress = &settings.progress;
    if progress.step_percent == 0 {
        return Err(Error::ConfigInvalid {
            message: "progress.step_percent must be greater than 0".to_string(),
        });
    }
    if progress.ceiling_percent >= 100 {
        return Err(Error::ConfigInvalid {
            message: "progress.ceiling_percent must be below 100".to_string(),
        });
    }
    if !settings.upload.required_extension.starts_with('.') {
        return Err(Error::ConfigInvalid {
            message: format!(
                "upload.required_extension must start with '.', got '{}'",
                settings.upload.required_extension
            ),
        });
    }
    Ok(())
}
