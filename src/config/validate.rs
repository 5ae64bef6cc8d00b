// src/config/validate.rs

use crate::config::model::{ConfigFile, ConfigSection, RawConfigFile};
use crate::errors::{LuataskError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LuataskError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_section(&raw.config)?;
        Ok(ConfigFile::new_unchecked(raw.config))
    }
}

fn validate_section(section: &ConfigSection) -> Result<()> {
    if section.taskfile.trim().is_empty() {
        return Err(LuataskError::ConfigError(
            "[config].taskfile must not be empty".to_string(),
        ));
    }

    if section.harvest_timeout_ms == 0 {
        return Err(LuataskError::ConfigError(
            "[config].harvest_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if section.default_task.trim().is_empty() {
        return Err(LuataskError::ConfigError(
            "[config].default_task must not be empty".to_string(),
        ));
    }

    Ok(())
}
