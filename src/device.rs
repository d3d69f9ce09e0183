use core::ffi::c_int as int;

use linux_io::result::Result;

use crate::ioctl;
use crate::Card;

/// The kernel requests that buffer object backends issue.
///
/// [`Card`] implements this by making the corresponding ioctl and memory
/// mapping system calls on a DRM card device. Each request struct is
/// filled in by the caller and updated in place with whatever the kernel
/// returns.
pub trait Device {
    /// Writes the kernel driver name (e.g. `i915`) into `buf` and returns
    /// the written prefix. Longer names are truncated.
    fn driver_name<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8]>;

    fn create_dumb(&self, req: &mut ioctl::DrmModeCreateDumb) -> Result<()>;
    fn map_dumb(&self, req: &mut ioctl::DrmModeMapDumb) -> Result<()>;
    fn destroy_dumb(&self, req: &mut ioctl::DrmModeDestroyDumb) -> Result<()>;
    fn gem_close(&self, req: &ioctl::DrmGemClose) -> Result<()>;

    /// Reads one of the `I915_PARAM_*` values.
    fn i915_getparam(&self, param: i32) -> Result<int>;
    fn i915_gem_create(&self, req: &mut ioctl::DrmI915GemCreate) -> Result<()>;
    fn i915_gem_set_tiling(&self, req: &mut ioctl::DrmI915GemSetTiling) -> Result<()>;
    fn i915_gem_mmap_gtt(&self, req: &mut ioctl::DrmI915GemMmapGtt) -> Result<()>;

    fn rockchip_gem_create(&self, req: &mut ioctl::DrmRockchipGemCreate) -> Result<()>;
    fn rockchip_gem_map_offset(&self, req: &mut ioctl::DrmRockchipGemMapOff) -> Result<()>;

    /// Maps `len` bytes of the device at the fake `offset` some earlier
    /// request returned, readable and writable and shared with the kernel.
    fn map(&self, offset: u64, len: usize) -> Result<*mut u8>;

    /// Releases a mapping made by [`Self::map`].
    ///
    /// # Safety
    ///
    /// `ptr` and `len` must describe a live mapping returned by
    /// [`Self::map`] on this device, and nothing may access it afterwards.
    unsafe fn unmap(&self, ptr: *mut u8, len: usize) -> Result<()>;
}

impl Device for Card {
    fn driver_name<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8]> {
        let mut v = ioctl::DrmVersion::zeroed();
        // Safety: the kernel writes at most buf.len() bytes, and buf
        // outlives the ioctl call.
        unsafe { v.set_name_ptr(buf.as_mut_ptr() as *mut i8, buf.len()) };
        self.f.ioctl(ioctl::DRM_IOCTL_VERSION, &mut v)?;
        let len = core::cmp::min(v.name_len(), buf.len());
        Ok(&buf[..len])
    }

    fn create_dumb(&self, req: &mut ioctl::DrmModeCreateDumb) -> Result<()> {
        self.f.ioctl(ioctl::DRM_IOCTL_MODE_CREATE_DUMB, req)?;
        Ok(())
    }

    fn map_dumb(&self, req: &mut ioctl::DrmModeMapDumb) -> Result<()> {
        self.f.ioctl(ioctl::DRM_IOCTL_MODE_MAP_DUMB, req)?;
        Ok(())
    }

    fn destroy_dumb(&self, req: &mut ioctl::DrmModeDestroyDumb) -> Result<()> {
        self.f.ioctl(ioctl::DRM_IOCTL_MODE_DESTROY_DUMB, req)?;
        Ok(())
    }

    fn gem_close(&self, req: &ioctl::DrmGemClose) -> Result<()> {
        self.f.ioctl(ioctl::DRM_IOCTL_GEM_CLOSE, req)?;
        Ok(())
    }

    fn i915_getparam(&self, param: i32) -> Result<int> {
        let mut value: int = 0;
        let mut req = ioctl::DrmI915GetParam::zeroed();
        req.param = param;
        // Safety: value outlives the ioctl call.
        unsafe { req.set_value_ptr(&mut value) };
        self.f.ioctl(ioctl::DRM_IOCTL_I915_GETPARAM, &mut req)?;
        Ok(value)
    }

    fn i915_gem_create(&self, req: &mut ioctl::DrmI915GemCreate) -> Result<()> {
        self.f.ioctl(ioctl::DRM_IOCTL_I915_GEM_CREATE, req)?;
        Ok(())
    }

    fn i915_gem_set_tiling(&self, req: &mut ioctl::DrmI915GemSetTiling) -> Result<()> {
        self.f.ioctl(ioctl::DRM_IOCTL_I915_GEM_SET_TILING, req)?;
        Ok(())
    }

    fn i915_gem_mmap_gtt(&self, req: &mut ioctl::DrmI915GemMmapGtt) -> Result<()> {
        self.f.ioctl(ioctl::DRM_IOCTL_I915_GEM_MMAP_GTT, req)?;
        Ok(())
    }

    fn rockchip_gem_create(&self, req: &mut ioctl::DrmRockchipGemCreate) -> Result<()> {
        self.f.ioctl(ioctl::DRM_IOCTL_ROCKCHIP_GEM_CREATE, req)?;
        Ok(())
    }

    fn rockchip_gem_map_offset(&self, req: &mut ioctl::DrmRockchipGemMapOff) -> Result<()> {
        self.f.ioctl(ioctl::DRM_IOCTL_ROCKCHIP_GEM_MAP_OFFSET, req)?;
        Ok(())
    }

    fn map(&self, offset: u64, len: usize) -> Result<*mut u8> {
        let ptr = unsafe {
            linux_unsafe::mmap(
                core::ptr::null_mut(),
                len,
                ioctl::PROT_READ | ioctl::PROT_WRITE,
                ioctl::MAP_SHARED,
                self.f.fd(),
                offset as linux_unsafe::off_t,
            )
        }
        .map_err(syscall_error)?;
        Ok(ptr as *mut u8)
    }

    unsafe fn unmap(&self, ptr: *mut u8, len: usize) -> Result<()> {
        linux_unsafe::munmap(ptr as *mut _, len).map_err(syscall_error)?;
        Ok(())
    }
}

/// Raw system calls report errors as linux-unsafe values, while the rest
/// of the crate classifies linux-io ones.
fn syscall_error(e: linux_unsafe::result::Error) -> linux_io::result::Error {
    linux_io::result::Error::new(e.0)
}
