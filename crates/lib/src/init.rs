//! Initialize the configuration directory: create ~/.lingo and a default config template.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Template written by `lingo init`. Secrets are left empty so env vars can supply them.
/// Binds loopback: a public bind needs a channel secret, which the template cannot know.
const DEFAULT_CONFIG_TEMPLATE: &str = r#"{
  "gateway": {
    "port": 3000,
    "bind": "127.0.0.1"
  },
  "channels": {
    "line": {
      "channelAccessToken": "",
      "channelSecret": ""
    }
  },
  "papago": {
    "clientId": "",
    "clientSecret": ""
  }
}
"#;

/// Ensure the configuration has been initialized (config file exists).
pub fn require_initialized(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        anyhow::bail!(
            "configuration not initialized; run `lingo init` first (config file not found: {})",
            config_path.display()
        );
    }
    Ok(())
}

/// Create the config directory (parent of the config file path) and write the
/// default template if no config file exists yet. An existing file is left untouched.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, DEFAULT_CONFIG_TEMPLATE)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    } else {
        log::debug!("config already exists at {}, skipping", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}
