//! Simulated ADC driver
//!
//! Stands in for the board's native converter when running on a host. The
//! analog input is a deterministic function of the conversion count, so a
//! sequence of reads is reproducible from run to run.

use std::f32::consts::TAU;
use std::thread;
use std::time::{Duration, Instant};

use hal::adc::{AdcDriver, AdcInfo};
use hal::HalError;
use serde::{Deserialize, Serialize};

use crate::board::ChannelConfig;

/// Analog signal presented to a simulated input, in volts.
///
/// Periods are measured in conversions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Waveform {
    Constant { volts: f32 },
    Sine { offset: f32, amplitude: f32, period: u32 },
    Sawtooth { min: f32, max: f32, period: u32 },
}

impl Waveform {
    /// Input voltage for the `index`-th conversion, before clamping.
    pub fn voltage_at(&self, index: u64) -> f32 {
        match *self {
            Self::Constant { volts } => volts,
            Self::Sine {
                offset,
                amplitude,
                period,
            } => {
                let phase = phase(index, period);
                offset + amplitude * (TAU * phase).sin()
            }
            Self::Sawtooth { min, max, period } => min + (max - min) * phase(index, period),
        }
    }

    pub(crate) fn period(&self) -> Option<u32> {
        match *self {
            Self::Constant { .. } => None,
            Self::Sine { period, .. } | Self::Sawtooth { period, .. } => Some(period),
        }
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Self::Constant { volts: 0.0 }
    }
}

fn phase(index: u64, period: u32) -> f32 {
    let period = u64::from(period.max(1));
    (index % period) as f32 / period as f32
}

/// Simulated single-channel converter.
#[derive(Debug)]
pub struct SimAdc {
    name: String,
    info: AdcInfo,
    waveform: Waveform,
    conversion_time: Duration,
    fail_every: u32,
    powered: bool,
    conversions: u64,
    pending: Option<Instant>,
}

impl SimAdc {
    pub fn new(channel: &ChannelConfig) -> Self {
        Self {
            name: channel.name.clone(),
            info: AdcInfo::from(&channel.adc),
            waveform: channel.waveform.clone(),
            conversion_time: channel.conversion_time_duration(),
            fail_every: channel.fail_every,
            powered: false,
            conversions: 0,
            pending: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Conversions attempted since creation, failed ones included
    pub fn conversions(&self) -> u64 {
        self.conversions
    }

    fn convert(&mut self) -> Result<u16, HalError> {
        let index = self.conversions;
        self.conversions += 1;

        if self.fail_every > 0 && self.conversions % u64::from(self.fail_every) == 0 {
            log::debug!("{}: injected conversion timeout", self.name);
            return Err(HalError::Timeout);
        }

        let volts = self
            .waveform
            .voltage_at(index)
            .max(0.0)
            .min(self.info.ref_voltage);
        let scaled = volts / self.info.ref_voltage * f32::from(self.info.max_raw_value);
        Ok(scaled.round() as u16)
    }
}

impl AdcDriver for SimAdc {
    fn info(&self) -> AdcInfo {
        self.info
    }

    fn enable(&mut self) -> hal::HalResult<()> {
        self.powered = true;
        self.pending = None;
        log::trace!("{}: powered on", self.name);
        Ok(())
    }

    fn disable(&mut self) -> hal::HalResult<()> {
        self.powered = false;
        self.pending = None;
        log::trace!("{}: powered off", self.name);
        Ok(())
    }

    fn read_raw(&mut self) -> hal::nb::Result<u16, HalError> {
        if !self.powered {
            return Err(hal::nb::Error::Other(HalError::HardwareError));
        }

        if !self.conversion_time.is_zero() {
            let now = Instant::now();
            match self.pending {
                None => {
                    self.pending = Some(now + self.conversion_time);
                    return Err(hal::nb::Error::WouldBlock);
                }
                Some(deadline) if now < deadline => return Err(hal::nb::Error::WouldBlock),
                Some(_) => self.pending = None,
            }
        }

        self.convert().map_err(hal::nb::Error::Other)
    }

    fn read_blocking(&mut self) -> hal::HalResult<u16> {
        loop {
            match self.read_raw() {
                Ok(raw) => return Ok(raw),
                Err(hal::nb::Error::Other(err)) => return Err(err),
                Err(hal::nb::Error::WouldBlock) => {
                    // Sleep out the conversion instead of spinning on it
                    if let Some(deadline) = self.pending {
                        thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    }
                }
            }
        }
    }
}
