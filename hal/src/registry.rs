//! Process-wide ADC device table and handle lifecycle
//!
//! A board port builds one [`AdcRegistry`] at startup, registering a driver
//! per physical converter in id order, and [`install`]s it. The table is
//! fixed from then on: ids are `[0, device_count())` for the rest of the
//! process.
//!
//! Each device moves through `closed -> open -> closed`. Opening hands out an
//! [`AdcHandle`] stamped with a generation number; closing or dropping it
//! releases the device. A token smuggled past close (through
//! [`AdcHandle::into_raw`]) carries a generation the slot no longer accepts,
//! so it is rejected with [`HalError::InvalidHandle`] even after the id has
//! been reopened. Generations are never reused: a slot that runs out of them
//! is retired and refuses further opens.

use alloc::boxed::Box;
use core::cell::Cell;
use core::fmt;
use core::mem;
use core::ptr;

use critical_section::Mutex as CsMutex;

use crate::adc::{AdcDriver, AdcInfo};
use crate::error::{HalError, HalResult};
use crate::sync::{Mutex, MutexGuard};

/// Maximum number of ADC instances a registry can hold
pub const MAX_DEVICES: usize = 32;

const ID_BITS: u32 = 8;
const ID_MASK: usize = (1 << ID_BITS) - 1;
/// Largest generation a token can carry: 24 bits on 32-bit targets, 56 on 64-bit
pub(crate) const GENERATION_MAX: usize = usize::MAX >> ID_BITS;

/// Generation following `current`, or `None` once the space is used up.
pub(crate) fn next_generation(current: usize) -> Option<usize> {
    current.checked_add(1).filter(|&next| next <= GENERATION_MAX)
}

/// Exclusive ownership of one open ADC instance.
///
/// Handles are move-only: there is exactly one per open device. The device is
/// released by [`AdcRegistry::close`], which reports driver errors, or when
/// the handle is dropped, which only logs them. [`AdcHandle::into_raw`] gives
/// up that ownership without releasing anything.
#[must_use = "dropping the handle closes the device"]
pub struct AdcHandle<'r> {
    registry: &'r AdcRegistry,
    id: u8,
    generation: usize,
}

impl<'r> AdcHandle<'r> {
    /// Device id this handle was opened on.
    pub fn id(&self) -> usize {
        usize::from(self.id)
    }

    /// Convert the handle into a non-zero opaque token, leaving the device
    /// open.
    pub fn into_raw(self) -> usize {
        let token = (self.generation << ID_BITS) | usize::from(self.id);
        mem::forget(self);
        token
    }

    /// Rebuild a handle on `registry` from a token produced by
    /// [`AdcHandle::into_raw`].
    ///
    /// Returns `None` for tokens that cannot have been issued by any
    /// registry. Other tokens are still checked on every registry call.
    ///
    /// # Safety
    ///
    /// The returned handle claims exclusive ownership of the device and
    /// releases it when dropped. The caller must make sure no other live
    /// `AdcHandle` exists for the same token, as with `OwnedFd::from_raw_fd`.
    pub unsafe fn from_raw(registry: &'r AdcRegistry, token: usize) -> Option<Self> {
        let generation = token >> ID_BITS;
        if generation == 0 {
            return None;
        }
        let id = token & ID_MASK;
        if id >= MAX_DEVICES {
            return None;
        }

        Some(Self {
            registry,
            id: id as u8,
            generation,
        })
    }

    /// Close the device, reporting whatever the driver says while powering
    /// down.
    pub fn close(self) -> HalResult<()> {
        let result = self.registry.release(&self);
        mem::forget(self);
        result
    }
}

impl Drop for AdcHandle<'_> {
    fn drop(&mut self) {
        match self.registry.release(self) {
            Ok(()) | Err(HalError::InvalidHandle) => {}
            Err(err) => log::warn!("adc{}: release on drop failed: {}", self.id, err),
        }
    }
}

impl PartialEq for AdcHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.registry, other.registry)
            && self.id == other.id
            && self.generation == other.generation
    }
}

impl Eq for AdcHandle<'_> {}

impl fmt::Debug for AdcHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdcHandle")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .finish()
    }
}

struct Slot {
    driver: Box<dyn AdcDriver>,
    /// Generation of the most recently issued handle, 0 if never opened
    generation: usize,
    open: bool,
}

/// Fixed-size table of ADC drivers indexed by device id.
///
/// Every device has its own lock, so a blocking conversion on one device
/// never stalls callers of another.
pub struct AdcRegistry {
    slots: heapless::Vec<Mutex<Slot>, MAX_DEVICES>,
}

impl AdcRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            slots: heapless::Vec::new(),
        }
    }

    /// Register the driver for the next device id.
    ///
    /// Returns the assigned id, or [`HalError::ConfigurationError`] once
    /// [`MAX_DEVICES`] drivers are registered.
    pub fn register(&mut self, driver: Box<dyn AdcDriver>) -> HalResult<usize> {
        let id = self.slots.len();
        let slot = Slot {
            driver,
            generation: 0,
            open: false,
        };

        self.slots
            .push(Mutex::new(slot))
            .map_err(|_| HalError::ConfigurationError)?;
        Ok(id)
    }

    /// Number of registered devices; valid ids are `[0, device_count())`.
    pub fn device_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether device `id` currently has an owner.
    pub fn is_open(&self, id: usize) -> bool {
        self.slots.get(id).is_some_and(|slot| slot.lock().open)
    }

    /// Open device `id` for exclusive use.
    ///
    /// Fails with [`HalError::NoDevice`] for an unknown id,
    /// [`HalError::Busy`] if the device is already open or has issued its
    /// last generation, or whatever the driver reports while powering up. A
    /// failed open leaves the device closed.
    pub fn open(&self, id: usize) -> HalResult<AdcHandle<'_>> {
        let slot = self.slots.get(id).ok_or(HalError::NoDevice)?;
        let mut slot = slot.lock();

        if slot.open {
            return Err(HalError::Busy);
        }

        let Some(generation) = next_generation(slot.generation) else {
            log::warn!("adc{}: handle generations exhausted, device retired", id);
            return Err(HalError::Busy);
        };

        if let Err(err) = slot.driver.enable() {
            log::warn!("adc{}: enable failed: {}", id, err);
            return Err(err);
        }

        slot.generation = generation;
        slot.open = true;
        log::debug!("adc{}: opened (generation {})", id, generation);

        Ok(AdcHandle {
            registry: self,
            id: id as u8,
            generation,
        })
    }

    /// Close the device, consuming its handle.
    ///
    /// The device is released even when the driver fails to power down; that
    /// failure is still reported. A handle issued by another registry is
    /// rejected with [`HalError::InvalidHandle`] and released by its own
    /// registry as it drops.
    pub fn close(&self, handle: AdcHandle<'_>) -> HalResult<()> {
        if !ptr::eq(handle.registry, self) {
            return Err(HalError::InvalidHandle);
        }
        handle.close()
    }

    fn release(&self, handle: &AdcHandle<'_>) -> HalResult<()> {
        let mut slot = self.checked(handle)?;
        slot.open = false;

        let result = slot.driver.disable();
        match &result {
            Ok(()) => log::debug!("adc{}: closed", handle.id),
            Err(err) => log::warn!("adc{}: disable failed: {}", handle.id, err),
        }
        result
    }

    /// Perform one blocking conversion and return the raw sample.
    ///
    /// The result is always within `[0, info().max_raw_value]`; a driver
    /// that reports anything larger yields [`HalError::HardwareError`].
    pub fn read(&self, handle: &AdcHandle<'_>) -> HalResult<u16> {
        let mut slot = self.checked(handle)?;
        let info = slot.driver.info();

        match slot.driver.read_blocking() {
            Ok(raw) if info.contains(raw) => Ok(raw),
            Ok(raw) => {
                log::warn!(
                    "adc{}: sample {} exceeds max raw value {}",
                    handle.id,
                    raw,
                    info.max_raw_value
                );
                Err(HalError::HardwareError)
            }
            Err(err) => {
                log::debug!("adc{}: conversion failed: {}", handle.id, err);
                Err(err)
            }
        }
    }

    /// Perform one blocking conversion and scale it to millivolts.
    pub fn read_millivolts(&self, handle: &AdcHandle<'_>) -> HalResult<u32> {
        let raw = self.read(handle)?;
        let info = self.info(handle)?;
        Ok(info.to_millivolts(raw))
    }

    /// Static characteristics of the device behind `handle`.
    pub fn info(&self, handle: &AdcHandle<'_>) -> HalResult<AdcInfo> {
        let slot = self.checked(handle)?;
        Ok(slot.driver.info())
    }

    fn checked(&self, handle: &AdcHandle<'_>) -> HalResult<MutexGuard<'_, Slot>> {
        if !ptr::eq(handle.registry, self) {
            return Err(HalError::InvalidHandle);
        }

        let slot = self
            .slots
            .get(handle.id())
            .ok_or(HalError::InvalidHandle)?
            .lock();

        if !slot.open || slot.generation != handle.generation {
            return Err(HalError::InvalidHandle);
        }
        Ok(slot)
    }

    #[cfg(test)]
    pub(crate) fn set_generation(&self, id: usize, generation: usize) {
        if let Some(slot) = self.slots.get(id) {
            slot.lock().generation = generation;
        }
    }
}

impl Default for AdcRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AdcRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdcRegistry")
            .field("device_count", &self.device_count())
            .finish()
    }
}

/// Global registry, installed once at startup
static REGISTRY: CsMutex<Cell<Option<&'static AdcRegistry>>> = CsMutex::new(Cell::new(None));

/// Install `registry` as the process-wide device table.
///
/// Only the first call succeeds; later calls return [`HalError::Busy`] and
/// drop the registry they were given.
pub fn install(registry: AdcRegistry) -> HalResult<&'static AdcRegistry> {
    let installed = critical_section::with(|cs| {
        let cell = REGISTRY.borrow(cs);
        if cell.get().is_some() {
            return Err(HalError::Busy);
        }

        let registry: &'static AdcRegistry = Box::leak(Box::new(registry));
        cell.set(Some(registry));
        Ok(registry)
    })?;

    log::info!("adc registry installed with {} device(s)", installed.device_count());
    Ok(installed)
}

/// The installed registry, if any
pub fn installed() -> Option<&'static AdcRegistry> {
    critical_section::with(|cs| REGISTRY.borrow(cs).get())
}

fn global() -> HalResult<&'static AdcRegistry> {
    installed().ok_or(HalError::NotInitialized)
}

/// Number of devices in the installed registry, 0 before installation.
pub fn device_count() -> usize {
    installed().map_or(0, AdcRegistry::device_count)
}

/// Open device `id` in the installed registry.
pub fn open(id: usize) -> HalResult<AdcHandle<'static>> {
    global()?.open(id)
}

/// Close a handle issued by the installed registry.
pub fn close(handle: AdcHandle<'_>) -> HalResult<()> {
    global()?.close(handle)
}

/// Blocking single conversion on the installed registry.
pub fn read(handle: &AdcHandle<'_>) -> HalResult<u16> {
    global()?.read(handle)
}

/// Device characteristics from the installed registry.
pub fn info(handle: &AdcHandle<'_>) -> HalResult<AdcInfo> {
    global()?.info(handle)
}
