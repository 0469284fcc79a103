//! Host HAL implementation
//!
//! Concrete [`hal::adc::AdcDriver`] implementation for running ADC code on a
//! development machine. Each physical converter of a board is replaced by a
//! [`SimAdc`] whose input is a configurable, deterministic waveform.
//!
//! ## Bring-up
//! The board is described by a [`BoardConfig`] and installed as the
//! process-wide device table exactly once. [`install_from_env`] reads the
//! JSON description named by `SWIFTHAL_ADC_CONFIG`, falling back to the
//! SwiftIO preset, and is safe to call repeatedly.
//!
//! ## Example
//! ```no_run
//! use hal::registry;
//!
//! hal_host::install_from_env().unwrap();
//!
//! let adc = registry::open(0).unwrap();
//! let raw = registry::read(&adc).unwrap();
//! let info = registry::info(&adc).unwrap();
//! println!("A0 = {:.3} V", info.to_volts(raw));
//! registry::close(adc).unwrap();
//! ```

use std::env;

use hal::registry::{self, AdcRegistry};
use hal::HalError;

pub mod board;
pub mod error;
pub mod sim;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use board::{BoardConfig, BoardConfigBuilder, ChannelConfig};
pub use error::ConfigError;
pub use sim::{SimAdc, Waveform};

/// Environment variable naming a JSON board description
pub const CONFIG_ENV: &str = "SWIFTHAL_ADC_CONFIG";

/// Board description selected by the environment.
pub fn board_from_env() -> Result<BoardConfig, ConfigError> {
    match env::var_os(CONFIG_ENV) {
        Some(path) => {
            log::info!("loading board description from {}", path.to_string_lossy());
            BoardConfig::from_path(path)
        }
        None => Ok(BoardConfig::swiftio()),
    }
}

/// Install `config` as the process-wide device table.
///
/// Fails with [`HalError::Busy`] if a registry is already installed.
pub fn install(config: &BoardConfig) -> Result<&'static AdcRegistry, ConfigError> {
    let installed = registry::install(config.build_registry()?)?;
    log::info!(
        "board '{}' ready with {} ADC device(s)",
        config.name,
        installed.device_count()
    );
    Ok(installed)
}

/// Install the board selected by the environment unless a registry is
/// already installed, and return the installed registry.
pub fn install_from_env() -> Result<&'static AdcRegistry, ConfigError> {
    if let Some(installed) = registry::installed() {
        return Ok(installed);
    }

    match install(&board_from_env()?) {
        // Another thread finished bring-up first
        Err(ConfigError::Hal(HalError::Busy)) => {
            registry::installed().ok_or(ConfigError::Hal(HalError::NotInitialized))
        }
        result => result,
    }
}
