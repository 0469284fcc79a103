//! Hardware Abstraction Layer (HAL) for analog inputs
//!
//! This crate provides the vendor-agnostic boundary between application code
//! and an ADC driver. Board ports implement [`AdcDriver`] for each physical
//! converter, register the drivers in an [`AdcRegistry`] once at startup, and
//! application code then works purely in terms of device ids and
//! [`AdcHandle`]s:
//!
//! ```
//! use hal::adc::{AdcConfig, AdcDriver, AdcInfo};
//! use hal::registry::AdcRegistry;
//! use hal::HalError;
//!
//! struct Fixed(u16);
//!
//! impl AdcDriver for Fixed {
//!     fn info(&self) -> AdcInfo {
//!         AdcInfo::from(&AdcConfig::default())
//!     }
//!
//!     fn read_raw(&mut self) -> hal::nb::Result<u16, HalError> {
//!         Ok(self.0)
//!     }
//! }
//!
//! let mut registry = AdcRegistry::new();
//! registry.register(Box::new(Fixed(2048))).unwrap();
//!
//! let handle = registry.open(0).unwrap();
//! assert_eq!(registry.read(&handle), Ok(2048));
//! registry.close(handle).unwrap();
//! ```
//!
//! ## Features
//! - `std` (default) - `std::error::Error` impls and `parking_lot` locks;
//!   without it the crate is `no_std` + `alloc`
//! - `lock-free` - `spin` locks, required for `no_std` builds
//! - `serde` - derive `Serialize`/`Deserialize` for the configuration types
//! - `defmt` - implement `defmt::Format` for the public types

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod adc;
pub mod error;
pub mod registry;
mod sync;

#[cfg(test)]
mod tests;

// Drivers implement `AdcDriver::read_raw` in terms of `nb`
pub use nb;

// Re-export commonly used types
pub use adc::{AdcConfig, AdcDriver, AdcInfo, AdcReference, AdcResolution};
pub use error::{HalError, HalResult};
pub use registry::{AdcHandle, AdcRegistry, MAX_DEVICES};
