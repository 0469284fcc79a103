//! Common error types for HAL operations

use core::fmt;

/// Errno values used at the C boundary.
///
/// Numbering follows newlib, which is what Zephyr-based board firmware links
/// against, so codes returned through the ABI match the native driver's.
pub mod errno {
    pub const EIO: i32 = 5;
    pub const EBADF: i32 = 9;
    pub const EBUSY: i32 = 16;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;
    pub const ETIMEDOUT: i32 = 116;
    pub const ENOTSUP: i32 = 134;
}

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Invalid parameter provided
    InvalidParameter,
    /// No device with the requested id
    NoDevice,
    /// Handle is closed, stale, or was never issued
    InvalidHandle,
    /// Operation not supported by this implementation
    NotSupported,
    /// Peripheral is busy (already open)
    Busy,
    /// Operation timed out
    Timeout,
    /// Hardware error occurred
    HardwareError,
    /// Configuration error
    ConfigurationError,
    /// No device registry has been installed
    NotInitialized,
    /// Vendor-specific error code
    VendorError(i32),
}

impl HalError {
    /// Negative errno value reported for this error at the C boundary.
    pub fn errno(self) -> i32 {
        match self {
            Self::InvalidParameter | Self::ConfigurationError => -errno::EINVAL,
            Self::NoDevice | Self::NotInitialized => -errno::ENODEV,
            Self::InvalidHandle => -errno::EBADF,
            Self::NotSupported => -errno::ENOTSUP,
            Self::Busy => -errno::EBUSY,
            Self::Timeout => -errno::ETIMEDOUT,
            Self::HardwareError => -errno::EIO,
            Self::VendorError(0) => -errno::EIO,
            Self::VendorError(code) => -code.saturating_abs(),
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::NoDevice => write!(f, "no such device"),
            Self::InvalidHandle => write!(f, "invalid handle"),
            Self::NotSupported => write!(f, "operation not supported"),
            Self::Busy => write!(f, "peripheral busy"),
            Self::Timeout => write!(f, "operation timeout"),
            Self::HardwareError => write!(f, "hardware error"),
            Self::ConfigurationError => write!(f, "configuration error"),
            Self::NotInitialized => write!(f, "device registry not installed"),
            Self::VendorError(code) => write!(f, "vendor error code: {}", code),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidParameter => defmt::write!(fmt, "InvalidParameter"),
            Self::NoDevice => defmt::write!(fmt, "NoDevice"),
            Self::InvalidHandle => defmt::write!(fmt, "InvalidHandle"),
            Self::NotSupported => defmt::write!(fmt, "NotSupported"),
            Self::Busy => defmt::write!(fmt, "Busy"),
            Self::Timeout => defmt::write!(fmt, "Timeout"),
            Self::HardwareError => defmt::write!(fmt, "HardwareError"),
            Self::ConfigurationError => defmt::write!(fmt, "ConfigurationError"),
            Self::NotInitialized => defmt::write!(fmt, "NotInitialized"),
            Self::VendorError(code) => defmt::write!(fmt, "VendorError({})", code),
        }
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
