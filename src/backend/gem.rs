//! Allocation helpers shared by backends that need no vendor-specific
//! requests for some or all of their operations.

use crate::bo::{BufferObject, GemHandle, Mapping};
use crate::device::Device;
use crate::ioctl;
use crate::result::Error;

/// Allocates a linear, CPU-mappable "dumb" buffer for a single-plane
/// format, letting the kernel choose the stride.
pub fn dumb_bo_create<D: Device>(dev: &D, bo: &mut BufferObject) -> Result<(), Error> {
    if bo.num_planes != 1 {
        log::error!("dumb buffers support only single-plane formats, not {}", bo.format);
        return Err(Error::Invalid);
    }

    let mut req = ioctl::DrmModeCreateDumb::zeroed();
    req.width = bo.width;
    req.height = bo.height;
    req.bpp = bo.format.bpp(0) * 8;
    if let Err(e) = dev.create_dumb(&mut req) {
        log::error!(
            "DRM_IOCTL_MODE_CREATE_DUMB failed (width={}, height={}, bpp={}): {:?}",
            req.width,
            req.height,
            req.bpp,
            e
        );
        return Err(e.into());
    }

    let handle = GemHandle(req.handle);
    let Ok(size) = u32::try_from(req.size) else {
        // The kernel gave us more than we can describe, so give it back.
        let mut destroy = ioctl::DrmModeDestroyDumb::zeroed();
        destroy.handle = handle.0;
        let _ = dev.destroy_dumb(&mut destroy);
        return Err(Error::Invalid);
    };

    bo.handles[0] = handle;
    bo.strides[0] = req.pitch;
    bo.sizes[0] = size;
    bo.offsets[0] = 0;
    Ok(())
}

pub fn dumb_bo_destroy<D: Device>(dev: &D, bo: &BufferObject) -> Result<(), Error> {
    let mut req = ioctl::DrmModeDestroyDumb::zeroed();
    req.handle = bo.handles[0].0;
    dev.destroy_dumb(&mut req).map_err(|e| {
        log::error!("DRM_IOCTL_MODE_DESTROY_DUMB failed (handle={}): {:?}", req.handle, e);
        e.into()
    })
}

pub fn dumb_bo_map<'a, D: Device>(
    dev: &'a D,
    bo: &'a BufferObject,
) -> Result<Mapping<'a, D>, Error> {
    let mut req = ioctl::DrmModeMapDumb::zeroed();
    req.handle = bo.handles[0].0;
    if let Err(e) = dev.map_dumb(&mut req) {
        log::error!("DRM_IOCTL_MODE_MAP_DUMB failed (handle={}): {:?}", req.handle, e);
        return Err(e.into());
    }
    map_plane0(dev, bo, req.offset)
}

/// Closes every distinct GEM handle of `bo`.
///
/// Planes that share an allocation also share a handle, which must be
/// closed only once. Every handle is attempted even if an earlier close
/// fails, and the first failure is returned.
pub fn gem_bo_destroy<D: Device>(dev: &D, bo: &BufferObject) -> Result<(), Error> {
    let mut ret = Ok(());
    for handle in bo.unique_handles() {
        let mut req = ioctl::DrmGemClose::zeroed();
        req.handle = handle.0;
        if let Err(e) = dev.gem_close(&req) {
            log::error!("DRM_IOCTL_GEM_CLOSE failed (handle={}): {:?}", handle.0, e);
            if ret.is_ok() {
                ret = Err(e.into());
            }
        }
    }
    ret
}

/// Maps plane 0's size of `bo` at the fake `offset` a map-offset request
/// returned.
pub(crate) fn map_plane0<'a, D: Device>(
    dev: &'a D,
    bo: &'a BufferObject,
    offset: u64,
) -> Result<Mapping<'a, D>, Error> {
    let len = bo.sizes[0] as usize;
    let ptr = dev.map(offset, len).map_err(|e| {
        log::error!("mmap failed (offset={offset:#x}, len={len}): {e:?}");
        Error::from(e)
    })?;
    Ok(Mapping::new(dev, ptr, len))
}
