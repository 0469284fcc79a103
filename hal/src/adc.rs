//! ADC (Analog-to-Digital Converter) abstraction

use crate::error::{HalError, HalResult};

/// ADC resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcResolution {
    Bits8,
    Bits10,
    Bits12,
    Bits16,
}

impl AdcResolution {
    /// Number of bits produced per conversion.
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits10 => 10,
            Self::Bits12 => 12,
            Self::Bits16 => 16,
        }
    }

    /// Largest raw code the converter can produce.
    pub const fn max_raw_value(self) -> u16 {
        match self {
            Self::Bits16 => u16::MAX,
            other => (1u16 << other.bits()) - 1,
        }
    }

    /// Look up a resolution by bit width.
    pub fn from_bits(bits: u8) -> HalResult<Self> {
        match bits {
            8 => Ok(Self::Bits8),
            10 => Ok(Self::Bits10),
            12 => Ok(Self::Bits12),
            16 => Ok(Self::Bits16),
            _ => Err(HalError::InvalidParameter),
        }
    }
}

/// ADC reference voltage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcReference {
    /// Internal reference
    Internal,
    /// External reference on VREF pin
    External,
    /// VCC/VDD as reference
    Vcc,
}

/// ADC configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcConfig {
    pub resolution: AdcResolution,
    pub reference: AdcReference,
    /// Full-scale voltage of the selected reference, in volts
    pub ref_voltage: f32,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            resolution: AdcResolution::Bits12,
            reference: AdcReference::Vcc,
            ref_voltage: 3.3,
        }
    }
}

/// Static characteristics of one ADC instance.
///
/// Field order matches the C `swift_adc_info` record: maximum raw value, then
/// reference voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcInfo {
    pub max_raw_value: u16,
    pub ref_voltage: f32,
}

impl AdcInfo {
    /// Whether `raw` lies inside the conversion range.
    pub fn contains(&self, raw: u16) -> bool {
        raw <= self.max_raw_value
    }

    /// Convert a raw code to volts.
    pub fn to_volts(&self, raw: u16) -> f32 {
        if self.max_raw_value == 0 {
            return 0.0;
        }
        f32::from(raw) * self.ref_voltage / f32::from(self.max_raw_value)
    }

    /// Convert a raw code to millivolts, rounded to nearest.
    pub fn to_millivolts(&self, raw: u16) -> u32 {
        let mv = self.to_volts(raw) * 1000.0;
        if mv <= 0.0 {
            0
        } else {
            (mv + 0.5) as u32
        }
    }
}

impl From<&AdcConfig> for AdcInfo {
    fn from(config: &AdcConfig) -> Self {
        Self {
            max_raw_value: config.resolution.max_raw_value(),
            ref_voltage: config.ref_voltage,
        }
    }
}

/// Driver for one physical ADC instance.
///
/// This is the seam to the board-support layer: register access, sample and
/// hold timing, calibration and interrupt handling all live behind it. The
/// registry guarantees `enable`/`disable` pair up and that `read_raw` is only
/// called between them, from one thread at a time.
pub trait AdcDriver: Send {
    /// Static characteristics of this converter.
    fn info(&self) -> AdcInfo;

    /// Power up and prepare the converter. Called on open.
    fn enable(&mut self) -> HalResult<()> {
        Ok(())
    }

    /// Release the converter. Called on close.
    fn disable(&mut self) -> HalResult<()> {
        Ok(())
    }

    /// Start or poll a single conversion.
    ///
    /// Returns `WouldBlock` while the conversion is still in progress, the
    /// same contract as the `embedded-hal` one-shot ADC. Any timeout is the
    /// driver's to enforce and report as [`HalError::Timeout`].
    fn read_raw(&mut self) -> nb::Result<u16, HalError>;

    /// Block until one conversion completes or fails.
    fn read_blocking(&mut self) -> HalResult<u16> {
        nb::block!(self.read_raw())
    }

    /// Read voltage in millivolts
    fn read_millivolts(&mut self) -> HalResult<u32> {
        let raw = self.read_blocking()?;
        Ok(self.info().to_millivolts(raw))
    }
}
