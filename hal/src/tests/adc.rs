use crate::adc::{AdcConfig, AdcDriver, AdcInfo, AdcReference, AdcResolution};
use crate::error::HalError;

#[test]
fn resolution_max_raw_values() {
    assert_eq!(AdcResolution::Bits8.max_raw_value(), 255);
    assert_eq!(AdcResolution::Bits10.max_raw_value(), 1023);
    assert_eq!(AdcResolution::Bits12.max_raw_value(), 4095);
    assert_eq!(AdcResolution::Bits16.max_raw_value(), u16::MAX);
}

#[test]
fn resolution_from_bits() {
    assert_eq!(AdcResolution::from_bits(12), Ok(AdcResolution::Bits12));
    assert_eq!(AdcResolution::from_bits(16).map(AdcResolution::bits), Ok(16));
    assert_eq!(AdcResolution::from_bits(11), Err(HalError::InvalidParameter));
}

#[test]
fn default_config_is_12_bit_vcc() {
    let config = AdcConfig::default();
    assert_eq!(config.resolution, AdcResolution::Bits12);
    assert_eq!(config.reference, AdcReference::Vcc);

    let info = AdcInfo::from(&config);
    assert_eq!(info.max_raw_value, 4095);
    assert_eq!(info.ref_voltage, 3.3);
}

#[test]
fn info_scales_raw_codes() {
    let info = AdcInfo {
        max_raw_value: 4095,
        ref_voltage: 3.3,
    };

    assert_eq!(info.to_volts(0), 0.0);
    assert!((info.to_volts(4095) - 3.3).abs() < 1e-6);
    assert_eq!(info.to_millivolts(4095), 3300);
    assert_eq!(info.to_millivolts(2048), 1650);
    assert!(info.contains(4095));
    assert!(!info.contains(4096));
}

#[test]
fn info_with_zero_range_scales_to_zero() {
    let info = AdcInfo {
        max_raw_value: 0,
        ref_voltage: 3.3,
    };
    assert_eq!(info.to_volts(0), 0.0);
    assert_eq!(info.to_millivolts(0), 0);
}

struct SlowDriver {
    polls_left: u8,
    value: u16,
}

impl AdcDriver for SlowDriver {
    fn info(&self) -> AdcInfo {
        AdcInfo {
            max_raw_value: 1023,
            ref_voltage: 1.023,
        }
    }

    fn read_raw(&mut self) -> nb::Result<u16, HalError> {
        if self.polls_left > 0 {
            self.polls_left -= 1;
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.value)
    }
}

#[test]
fn read_blocking_polls_until_ready() {
    let mut driver = SlowDriver {
        polls_left: 3,
        value: 512,
    };

    assert_eq!(driver.read_blocking(), Ok(512));
    assert_eq!(driver.polls_left, 0);
}

#[test]
fn read_millivolts_uses_driver_info() {
    let mut driver = SlowDriver {
        polls_left: 0,
        value: 500,
    };

    assert_eq!(driver.read_millivolts(), Ok(500));
}

#[test]
fn errno_values_are_negative() {
    let errors = [
        HalError::InvalidParameter,
        HalError::NoDevice,
        HalError::InvalidHandle,
        HalError::NotSupported,
        HalError::Busy,
        HalError::Timeout,
        HalError::HardwareError,
        HalError::ConfigurationError,
        HalError::NotInitialized,
        HalError::VendorError(0),
        HalError::VendorError(42),
        HalError::VendorError(-7),
        HalError::VendorError(i32::MIN),
    ];

    for err in errors {
        assert!(err.errno() < 0, "{err} mapped to {}", err.errno());
    }
}

#[test]
fn vendor_errors_keep_their_magnitude() {
    assert_eq!(HalError::VendorError(42).errno(), -42);
    assert_eq!(HalError::VendorError(-7).errno(), -7);
}
