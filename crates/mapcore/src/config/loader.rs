use std::path::Path;

use log::debug;

use crate::config::schema::{MasConfig, MAX_LIST_COUNT_LIMIT};
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MasConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Loading MAS config from {}", path.display());
    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<MasConfig, ConfigError> {
    let config: MasConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &MasConfig) -> Result<(), ConfigError> {
    if config.max_list_count > MAX_LIST_COUNT_LIMIT {
        return Err(ConfigError::Validation {
            message: format!(
                "maxListCount {} exceeds {}",
                config.max_list_count, MAX_LIST_COUNT_LIMIT
            ),
        });
    }

    let unknown = config.parameter_mask.unknown_bits();
    if unknown != 0 {
        return Err(ConfigError::Validation {
            message: format!("parameterMask has undefined bits {:#x}", unknown),
        });
    }

    Ok(())
}
