//! An in-memory stand-in for a DRM card, for exercising backends without
//! a GPU.

use core::cell::{Cell, RefCell};
use core::ffi::c_int as int;
use std::vec::Vec;

use linux_io::result::{Error, Result};

use crate::device::Device;
use crate::ioctl;

/// Which kernel request a [`FakeDevice`] received.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Version,
    CreateDumb,
    MapDumb,
    DestroyDumb,
    GemClose,
    I915GetParam,
    I915GemCreate,
    I915GemSetTiling,
    I915GemMmapGtt,
    RockchipGemCreate,
    RockchipGemMapOffset,
    Map,
}

const MAP_BASE: usize = 0x4000_0000;

pub(crate) struct FakeDevice {
    driver: &'static str,
    chipset_id: int,
    next_handle: Cell<u32>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<Vec<(Call, Error)>>,
    live: RefCell<Vec<u32>>,
    closed: RefCell<Vec<u32>>,
    created_sizes: RefCell<Vec<u64>>,
    tilings: RefCell<Vec<ioctl::DrmI915GemSetTiling>>,
    mappings: RefCell<Vec<(usize, usize)>>,
}

impl FakeDevice {
    pub(crate) fn new(driver: &'static str) -> Self {
        Self {
            driver,
            chipset_id: 0x1916,
            next_handle: Cell::new(1),
            calls: RefCell::new(Vec::new()),
            failures: RefCell::new(Vec::new()),
            live: RefCell::new(Vec::new()),
            closed: RefCell::new(Vec::new()),
            created_sizes: RefCell::new(Vec::new()),
            tilings: RefCell::new(Vec::new()),
            mappings: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_chipset_id(mut self, id: int) -> Self {
        self.chipset_id = id;
        self
    }

    /// Makes the next `call` fail with `err`. Queued failures for the same
    /// call are returned in order, one per request.
    pub(crate) fn fail(&self, call: Call, err: Error) {
        self.failures.borrow_mut().push((call, err));
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn count(&self, call: Call) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }

    pub(crate) fn live_handles(&self) -> Vec<u32> {
        self.live.borrow().clone()
    }

    pub(crate) fn closed_handles(&self) -> Vec<u32> {
        self.closed.borrow().clone()
    }

    pub(crate) fn created_sizes(&self) -> Vec<u64> {
        self.created_sizes.borrow().clone()
    }

    pub(crate) fn tilings(&self) -> Vec<ioctl::DrmI915GemSetTiling> {
        self.tilings.borrow().clone()
    }

    pub(crate) fn live_mappings(&self) -> usize {
        self.mappings.borrow().len()
    }

    fn request(&self, call: Call) -> Result<()> {
        self.calls.borrow_mut().push(call);
        let mut failures = self.failures.borrow_mut();
        match failures.iter().position(|(c, _)| *c == call) {
            Some(idx) => Err(failures.remove(idx).1),
            None => Ok(()),
        }
    }

    fn alloc(&self, size: u64) -> u32 {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.live.borrow_mut().push(handle);
        self.created_sizes.borrow_mut().push(size);
        handle
    }

    fn release(&self, handle: u32) -> Result<()> {
        let mut live = self.live.borrow_mut();
        match live.iter().position(|h| *h == handle) {
            Some(idx) => {
                live.remove(idx);
                Ok(())
            }
            None => Err(linux_io::result::EINVAL),
        }
    }

    fn check_live(&self, handle: u32) -> Result<()> {
        if self.live.borrow().contains(&handle) {
            Ok(())
        } else {
            Err(linux_io::result::ENOENT)
        }
    }
}

impl Device for FakeDevice {
    fn driver_name<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8]> {
        self.request(Call::Version)?;
        let name = self.driver.as_bytes();
        let len = core::cmp::min(name.len(), buf.len());
        buf[..len].copy_from_slice(&name[..len]);
        Ok(&buf[..len])
    }

    fn create_dumb(&self, req: &mut ioctl::DrmModeCreateDumb) -> Result<()> {
        self.request(Call::CreateDumb)?;
        // Pitch rounded to 64 bytes, like most simple display drivers.
        let pitch = (req.width * req.bpp.div_ceil(8)).next_multiple_of(64);
        req.pitch = pitch;
        req.size = pitch as u64 * req.height as u64;
        req.handle = self.alloc(req.size);
        Ok(())
    }

    fn map_dumb(&self, req: &mut ioctl::DrmModeMapDumb) -> Result<()> {
        self.request(Call::MapDumb)?;
        self.check_live(req.handle)?;
        req.offset = req.handle as u64 * 0x1000;
        Ok(())
    }

    fn destroy_dumb(&self, req: &mut ioctl::DrmModeDestroyDumb) -> Result<()> {
        self.request(Call::DestroyDumb)?;
        self.release(req.handle)
    }

    fn gem_close(&self, req: &ioctl::DrmGemClose) -> Result<()> {
        self.request(Call::GemClose)?;
        self.closed.borrow_mut().push(req.handle);
        self.release(req.handle)
    }

    fn i915_getparam(&self, param: i32) -> Result<int> {
        self.request(Call::I915GetParam)?;
        match param {
            ioctl::I915_PARAM_CHIPSET_ID => Ok(self.chipset_id),
            _ => Err(linux_io::result::EINVAL),
        }
    }

    fn i915_gem_create(&self, req: &mut ioctl::DrmI915GemCreate) -> Result<()> {
        self.request(Call::I915GemCreate)?;
        req.handle = self.alloc(req.size);
        Ok(())
    }

    fn i915_gem_set_tiling(&self, req: &mut ioctl::DrmI915GemSetTiling) -> Result<()> {
        self.request(Call::I915GemSetTiling)?;
        self.check_live(req.handle)?;
        self.tilings.borrow_mut().push(*req);
        Ok(())
    }

    fn i915_gem_mmap_gtt(&self, req: &mut ioctl::DrmI915GemMmapGtt) -> Result<()> {
        self.request(Call::I915GemMmapGtt)?;
        self.check_live(req.handle)?;
        req.offset = req.handle as u64 * 0x1000;
        Ok(())
    }

    fn rockchip_gem_create(&self, req: &mut ioctl::DrmRockchipGemCreate) -> Result<()> {
        self.request(Call::RockchipGemCreate)?;
        req.handle = self.alloc(req.size);
        Ok(())
    }

    fn rockchip_gem_map_offset(&self, req: &mut ioctl::DrmRockchipGemMapOff) -> Result<()> {
        self.request(Call::RockchipGemMapOffset)?;
        self.check_live(req.handle)?;
        req.offset = req.handle as u64 * 0x1000;
        Ok(())
    }

    fn map(&self, offset: u64, len: usize) -> Result<*mut u8> {
        self.request(Call::Map)?;
        let addr = MAP_BASE + offset as usize;
        self.mappings.borrow_mut().push((addr, len));
        Ok(addr as *mut u8)
    }

    unsafe fn unmap(&self, ptr: *mut u8, len: usize) -> Result<()> {
        let mut mappings = self.mappings.borrow_mut();
        match mappings.iter().position(|m| *m == (ptr as usize, len)) {
            Some(idx) => {
                mappings.remove(idx);
                Ok(())
            }
            None => Err(linux_io::result::EINVAL),
        }
    }
}
