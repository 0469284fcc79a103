//! Board descriptions for the host port
//!
//! A board is an ordered list of ADC channels; the position of a channel in
//! the list is its device id. Descriptions are built in code through the
//! builders here or loaded from JSON:
//!
//! ```json
//! {
//!   "name": "bench",
//!   "channels": [
//!     { "name": "A0", "waveform": { "kind": "constant", "volts": 1.2 } },
//!     {
//!       "name": "A1",
//!       "adc": { "resolution": "bits10", "ref_voltage": 5.0 },
//!       "waveform": { "kind": "sine", "offset": 2.5, "amplitude": 2.0, "period": 50 },
//!       "conversion_time_us": 20,
//!       "fail_every": 100
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use hal::adc::{AdcConfig, AdcResolution};
use hal::registry::{AdcRegistry, MAX_DEVICES};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::{SimAdc, Waveform};

/// Number of analog inputs (A0-A11) on the SwiftIO board
pub const SWIFTIO_CHANNELS: usize = 12;

/// One simulated ADC instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub name: String,
    pub adc: AdcConfig,
    pub waveform: Waveform,
    /// Time a single conversion blocks the caller, in microseconds
    pub conversion_time_us: u64,
    /// Make every n-th conversion time out; 0 disables fault injection
    pub fail_every: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            adc: AdcConfig::default(),
            waveform: Waveform::default(),
            conversion_time_us: 0,
            fail_every: 0,
        }
    }
}

impl ChannelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the converter resolution.
    pub fn resolution(mut self, resolution: AdcResolution) -> Self {
        self.adc.resolution = resolution;
        self
    }

    /// Sets the full-scale reference voltage.
    pub fn ref_voltage(mut self, volts: f32) -> Self {
        self.adc.ref_voltage = volts;
        self
    }

    /// Sets the simulated input signal.
    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    /// Sets how long each conversion blocks.
    pub fn conversion_time(mut self, time: Duration) -> Self {
        self.conversion_time_us = u64::try_from(time.as_micros()).unwrap_or(u64::MAX);
        self
    }

    /// Makes every `n`-th conversion fail with a timeout.
    pub fn fail_every(mut self, n: u32) -> Self {
        self.fail_every = n;
        self
    }

    pub(crate) fn conversion_time_duration(&self) -> Duration {
        Duration::from_micros(self.conversion_time_us)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let volts = self.adc.ref_voltage;
        if !volts.is_finite() || volts <= 0.0 {
            return Err(ConfigError::InvalidReference {
                channel: self.name.clone(),
                volts,
            });
        }

        if self.waveform.period() == Some(0) {
            return Err(ConfigError::InvalidWaveform {
                channel: self.name.clone(),
                reason: "period must be at least one conversion",
            });
        }

        Ok(())
    }
}

/// Configuration of a simulated board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl BoardConfig {
    /// Creates a new board configuration builder.
    pub fn builder(name: impl Into<String>) -> BoardConfigBuilder {
        BoardConfigBuilder {
            config: BoardConfig {
                name: name.into(),
                channels: Vec::new(),
            },
        }
    }

    /// SwiftIO board: A0-A11, 12-bit, 3.3 V reference.
    ///
    /// Inputs idle around mid-scale with a slow sine so that repeated reads
    /// show movement.
    pub fn swiftio() -> Self {
        let mut builder = Self::builder("SwiftIO");
        for n in 0..SWIFTIO_CHANNELS {
            builder = builder.channel(
                ChannelConfig::new(format!("A{n}"))
                    .resolution(AdcResolution::Bits12)
                    .ref_voltage(3.3)
                    .waveform(Waveform::Sine {
                        offset: 1.65,
                        amplitude: 1.2,
                        period: 100 + 10 * n as u32,
                    }),
            );
        }
        builder.build()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.len() > MAX_DEVICES {
            return Err(ConfigError::TooManyChannels {
                count: self.channels.len(),
                max: MAX_DEVICES,
            });
        }
        self.channels.iter().try_for_each(ChannelConfig::validate)
    }

    /// Build a registry with one simulated converter per channel, in order.
    pub fn build_registry(&self) -> Result<AdcRegistry, ConfigError> {
        self.validate()?;

        let mut registry = AdcRegistry::new();
        for channel in &self.channels {
            registry.register(Box::new(SimAdc::new(channel)))?;
        }
        Ok(registry)
    }
}

/// Builder for ergonomic board configuration construction.
#[derive(Debug, Clone)]
pub struct BoardConfigBuilder {
    config: BoardConfig,
}

impl BoardConfigBuilder {
    /// Appends a channel; its id is the number of channels added before it.
    pub fn channel(mut self, channel: ChannelConfig) -> Self {
        self.config.channels.push(channel);
        self
    }

    /// Appends `count` copies of `template`, named `<prefix><n>`.
    pub fn channels(mut self, count: usize, prefix: &str, template: ChannelConfig) -> Self {
        for _ in 0..count {
            let n = self.config.channels.len();
            let mut channel = template.clone();
            channel.name = format!("{prefix}{n}");
            self.config.channels.push(channel);
        }
        self
    }

    /// Builds the board configuration.
    pub fn build(self) -> BoardConfig {
        self.config
    }
}
