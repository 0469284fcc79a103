//! C ABI for the ADC HAL
//!
//! Exports the `swifthal_adc_*` functions declared in
//! `include/swift_adc.h`, so existing C callers can link against this crate
//! (as `staticlib` or `cdylib`) in place of the native implementation.
//!
//! ## Conventions
//! - `open` returns an opaque non-null handle, or `NULL` on failure.
//! - Every other call returns `0` (or the sample, for `read`) on success and
//!   a negative errno value on failure; see [`hal::HalError::errno`].
//! - Handles are registry tokens, not pointers. A closed, stale or forged
//!   handle is rejected with `-EBADF` instead of being dereferenced.
//!
//! ## Features
//! - `host` (default) - bring up the simulated host board on first use

#![deny(unsafe_op_in_unsafe_fn)]

use core::ffi::{c_int, c_ushort, c_void};
use core::mem;
use core::ptr;

use hal::error::errno;
use hal::registry::{AdcHandle, AdcRegistry};
use hal::{HalError, HalResult};

/// Mirror of the C `swift_adc_info` record.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwiftAdcInfo {
    pub max_raw_value: c_int,
    pub ref_voltage: f32,
}

fn registry() -> HalResult<&'static AdcRegistry> {
    #[cfg(feature = "host")]
    {
        hal_host::install_from_env().map_err(|err| {
            log::error!("ADC board bring-up failed: {}", err);
            HalError::NotInitialized
        })
    }
    #[cfg(not(feature = "host"))]
    {
        hal::registry::installed().ok_or(HalError::NotInitialized)
    }
}

/// Run `op` against the handle behind `adc` without taking ownership of it.
fn with_handle<T>(
    adc: *mut c_void,
    op: impl FnOnce(&AdcRegistry, &AdcHandle<'_>) -> HalResult<T>,
) -> HalResult<T> {
    let registry = registry()?;
    // SAFETY: the handle is only borrowed for this call and forgotten below;
    // the C caller keeps ownership.
    let handle =
        unsafe { AdcHandle::from_raw(registry, adc as usize) }.ok_or(HalError::InvalidHandle)?;
    let result = op(registry, &handle);
    // The device stays open until C calls swifthal_adc_close
    mem::forget(handle);
    result
}

/// Open ADC `id`. Returns `NULL` on failure.
#[no_mangle]
pub extern "C" fn swifthal_adc_open(id: c_int) -> *mut c_void {
    let opened = registry().and_then(|registry| {
        let id = usize::try_from(id).map_err(|_| HalError::NoDevice)?;
        registry.open(id)
    });

    match opened {
        Ok(handle) => handle.into_raw() as *mut c_void,
        Err(err) => {
            log::debug!("swifthal_adc_open({}): {}", id, err);
            ptr::null_mut()
        }
    }
}

/// Close an ADC handle. Returns `0` or a negative errno value.
#[no_mangle]
pub extern "C" fn swifthal_adc_close(adc: *mut c_void) -> c_int {
    let closed = registry().and_then(|registry| {
        // SAFETY: ownership of the handle is transferred back from the caller.
        let handle =
            unsafe { AdcHandle::from_raw(registry, adc as usize) }.ok_or(HalError::InvalidHandle)?;
        registry.close(handle)
    });

    match closed {
        Ok(()) => 0,
        Err(err) => err.errno(),
    }
}

/// Perform one blocking conversion.
///
/// Returns the sample (also stored in `*sample_buffer`) or a negative errno
/// value, in which case the buffer is left untouched.
///
/// # Safety
///
/// `sample_buffer` must be null or valid for writing one `unsigned short`.
#[no_mangle]
pub unsafe extern "C" fn swifthal_adc_read(adc: *mut c_void, sample_buffer: *mut c_ushort) -> c_int {
    if sample_buffer.is_null() {
        return -errno::EINVAL;
    }

    match with_handle(adc, |registry, handle| registry.read(handle)) {
        Ok(raw) => {
            // SAFETY: checked non-null above; validity is the caller's contract.
            unsafe { sample_buffer.write(raw) };
            c_int::from(raw)
        }
        Err(err) => err.errno(),
    }
}

/// Fill `*info` with the characteristics of the ADC behind `adc`.
///
/// Returns `0` or a negative errno value, in which case `*info` is left
/// untouched.
///
/// # Safety
///
/// `info` must be null or valid for writing one `swift_adc_info`.
#[no_mangle]
pub unsafe extern "C" fn swifthal_adc_info_get(adc: *mut c_void, info: *mut SwiftAdcInfo) -> c_int {
    if info.is_null() {
        return -errno::EINVAL;
    }

    match with_handle(adc, |registry, handle| registry.info(handle)) {
        Ok(adc_info) => {
            let record = SwiftAdcInfo {
                max_raw_value: c_int::from(adc_info.max_raw_value),
                ref_voltage: adc_info.ref_voltage,
            };
            // SAFETY: checked non-null above; validity is the caller's contract.
            unsafe { info.write(record) };
            0
        }
        Err(err) => err.errno(),
    }
}

/// Number of ADC devices; valid ids for `swifthal_adc_open` are below it.
#[no_mangle]
pub extern "C" fn swifthal_adc_dev_number_get() -> c_int {
    registry().map_or(0, |registry| {
        c_int::try_from(registry.device_count()).unwrap_or(c_int::MAX)
    })
}
