//! DIEH configuration file loading with validation.
//!
//! One TOML file carries the `[shared]` tool settings and the `[dieh]`
//! threshold record. Missing categories fall back to factory defaults.
//! Threshold reloads parse into a shadow record and replace the live one
//! only when the shadow validates.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use dieh_common::config::{ConfigError, ConfigLoader, SharedConfig};
use dieh_common::dieh::config::ThresholdRecord;

/// Complete validated configuration bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct DiehConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub dieh: ThresholdRecord,
}

impl DiehConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.dieh.validate()
    }
}

/// Load and validate the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<DiehConfig, ConfigError> {
    let config = DiehConfig::load(path)?;
    config.validate()?;
    info!(path = %path.display(), service = %config.shared.service_name, "DIEH configuration loaded");
    Ok(config)
}

/// Parse and validate configuration text.
pub fn load_config_from_str(text: &str) -> Result<DiehConfig, ConfigError> {
    let config = DiehConfig::from_toml(text)?;
    config.validate()?;
    Ok(config)
}

// ─── Threshold Reload ───────────────────────────────────────────────

/// Replace `live` with the `[dieh]` table of `text` if it validates.
///
/// On any error `live` is left as it was.
pub fn reload_thresholds(live: &mut ThresholdRecord, text: &str) -> Result<(), ConfigError> {
    #[derive(Deserialize)]
    struct Shadow {
        #[serde(default)]
        dieh: ThresholdRecord,
    }

    let shadow = toml::from_str::<Shadow>(text)
        .map_err(|e| ConfigError::ParseError(e.to_string()))
        .and_then(|shadow| shadow.dieh.validate().map(|()| shadow.dieh));

    match shadow {
        Ok(record) => {
            *live = record;
            info!("DIEH thresholds reloaded");
            Ok(())
        }
        Err(err) => {
            warn!(%err, "threshold reload rejected, keeping current record");
            Err(err)
        }
    }
}
