//! Configuration types
//!
//! Board-agnostic configuration structures stored as postcard binary data.
//! A terminal that has never been provisioned runs on the defaults.

pub mod types;

pub use types::*;

/// Maximum serialized config size (binary)
pub const MAX_CONFIG_SIZE: usize = 512;

/// Decode and validate a provisioned configuration blob
#[cfg(feature = "serde")]
pub fn decode(bytes: &[u8]) -> Result<TerminalConfig, ConfigError> {
    let config: TerminalConfig =
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;

    if config.version != CONFIG_VERSION {
        warn!(
            "config version mismatch: found {}, expected {}",
            config.version, CONFIG_VERSION
        );
        return Err(ConfigError::VersionMismatch);
    }

    config.validate()?;
    Ok(config)
}

/// Serialize a configuration into `buf`, returning the used part
#[cfg(feature = "serde")]
pub fn encode<'a>(config: &TerminalConfig, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
    postcard::to_slice(config, buf).map_err(|_| ConfigError::Serialize)
}

/// Load a provisioned configuration, falling back to the defaults
///
/// `None` means nothing has been provisioned.
#[cfg(feature = "serde")]
pub fn load_or_default(bytes: Option<&[u8]>) -> TerminalConfig {
    let Some(bytes) = bytes else {
        debug!("no provisioned config, using defaults");
        return TerminalConfig::default();
    };

    match decode(bytes) {
        Ok(config) => {
            info!("loaded provisioned config for bike {}", config.bike_id);
            config
        }
        Err(e) => {
            warn!("failed to load config: {}, using defaults", e);
            TerminalConfig::default()
        }
    }
}
