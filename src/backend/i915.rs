//! Intel integrated graphics.
//!
//! Buffers are allocated as GEM objects and then given a tiling mode
//! chosen from their usage: display-only buffers use X tiling, render
//! targets use Y tiling, and cursors and buffers the CPU will walk
//! linearly are left untiled. Width and height are padded to whole tiles,
//! with tile geometry depending on the hardware generation.

use core::ffi::c_int as int;

use super::gem;
use super::Backend;
use crate::bo::{BufferObject, GemHandle, Mapping, Tiling};
use crate::device::Device;
use crate::format::Format;
use crate::ioctl;
use crate::result::{Error, InitError};
use crate::usage::{FormatSupport, Usage};
use crate::util::Cleanup;

pub const NAMES: &[&str] = &["i915"];

/// PCI device ids of the generation 3 chipsets (915G through Pineview).
const GEN3_IDS: [u16; 10] = [
    0x2582, 0x2592, 0x2772, 0x27A2, 0x27AE, 0x29C2, 0x29B2, 0x29D2, 0xA001, 0xA011,
];

/// Generation 3 hardware can't address rows longer than this.
const GEN3_MAX_STRIDE: u32 = 8192;

const SCANOUT_CURSOR_RENDERING: Usage = Usage::SCANOUT.union(Usage::CURSOR).union(Usage::RENDERING);
const SCANOUT_CURSOR_LINEAR: Usage = Usage::SCANOUT.union(Usage::CURSOR).union(Usage::LINEAR);
const SCANOUT_RENDERING: Usage = Usage::SCANOUT.union(Usage::RENDERING);
const SCANOUT_LINEAR: Usage = Usage::SCANOUT.union(Usage::LINEAR);
const RENDERING_LINEAR: Usage = Usage::RENDERING.union(Usage::LINEAR);

static FORMATS: [FormatSupport; 15] = [
    FormatSupport::new(Format::XRGB8888, SCANOUT_CURSOR_RENDERING),
    FormatSupport::new(Format::XRGB8888, SCANOUT_CURSOR_LINEAR),
    FormatSupport::new(Format::ARGB8888, SCANOUT_CURSOR_RENDERING),
    FormatSupport::new(Format::ARGB8888, SCANOUT_CURSOR_LINEAR),
    FormatSupport::new(Format::XBGR8888, SCANOUT_CURSOR_RENDERING),
    FormatSupport::new(Format::ABGR8888, SCANOUT_CURSOR_RENDERING),
    FormatSupport::new(Format::XRGB1555, SCANOUT_CURSOR_RENDERING),
    FormatSupport::new(Format::ARGB1555, SCANOUT_CURSOR_RENDERING),
    FormatSupport::new(Format::RGB565, SCANOUT_CURSOR_RENDERING),
    FormatSupport::new(Format::UYVY, SCANOUT_RENDERING),
    FormatSupport::new(Format::UYVY, SCANOUT_LINEAR),
    FormatSupport::new(Format::YUYV, SCANOUT_RENDERING),
    FormatSupport::new(Format::YUYV, SCANOUT_LINEAR),
    FormatSupport::new(Format::R8, RENDERING_LINEAR),
    FormatSupport::new(Format::GR88, RENDERING_LINEAR),
];

/// The i915 backend, holding the hardware generation detected at init.
#[derive(Debug)]
pub struct I915 {
    gen: u32,
}

impl I915 {
    /// Asks the kernel which chipset the card is and records its
    /// generation.
    pub fn init<D: Device>(dev: &D) -> Result<Self, InitError> {
        let device_id = dev
            .i915_getparam(ioctl::I915_PARAM_CHIPSET_ID)
            .map_err(|e| {
                log::error!("DRM_IOCTL_I915_GETPARAM failed: {e:?}");
                e
            })?;
        let gen = generation(device_id);
        log::debug!("i915: device id {device_id:#06x} is generation {gen}");
        Ok(Self { gen })
    }

    /// The hardware generation: 3 for the oldest supported chipsets and
    /// 4 for everything newer.
    pub fn generation(&self) -> u32 {
        self.gen
    }

    pub fn close(self) {
        log::debug!("i915: closing generation {} backend", self.gen);
    }

    /// Pads `width` and `height` (in pixels) to whole tiles of `tiling`
    /// for a format of `bpp` bytes per pixel.
    ///
    /// Returns `None` if the padded dimensions don't fit in 32 bits.
    fn align_dimensions(&self, tiling: Tiling, width: u32, height: u32, bpp: u32) -> Option<(u32, u32)> {
        let (width_bytes, height_alignment) = match tiling {
            Tiling::Linear => (64, 4),
            Tiling::X => (512, 8),
            Tiling::Y if self.gen == 3 => (512, 8),
            Tiling::Y => (128, 32),
        };
        let width_alignment = width_bytes / bpp;

        let width = if self.gen > 3 {
            width.checked_next_multiple_of(width_alignment)?
        } else {
            // Older hardware wants a power-of-two multiple of the tile
            // width, even when that's far more than the image needs.
            let mut w = width_alignment;
            while w < width {
                w = w.checked_mul(2)?;
            }
            w
        };
        let height = height.checked_next_multiple_of(height_alignment)?;
        Some((width, height))
    }
}

/// Classifies a PCI device id as generation 3 or "4 and later".
fn generation(device_id: int) -> u32 {
    if GEN3_IDS.iter().any(|id| *id as int == device_id) {
        3
    } else {
        4
    }
}

/// Picks a tiling mode from the intended usage. The first matching rule
/// wins, so a cursor or linear request is never tiled.
fn tiling_for(usage: Usage) -> Tiling {
    if usage.intersects(Usage::CURSOR | Usage::LINEAR) {
        Tiling::Linear
    } else if usage.contains(Usage::SCANOUT) {
        Tiling::X
    } else if usage.contains(Usage::RENDERING) {
        Tiling::Y
    } else {
        Tiling::Linear
    }
}

fn tiling_mode(tiling: Tiling) -> u32 {
    match tiling {
        Tiling::Linear => ioctl::I915_TILING_NONE,
        Tiling::X => ioctl::I915_TILING_X,
        Tiling::Y => ioctl::I915_TILING_Y,
    }
}

impl Backend for I915 {
    fn names(&self) -> &'static [&'static str] {
        NAMES
    }

    fn formats(&self) -> &'static [FormatSupport] {
        &FORMATS
    }

    fn bo_create<D: Device>(&self, dev: &D, bo: &mut BufferObject) -> Result<(), Error> {
        let bpp = bo.format.bpp(0);
        if bpp == 0 || bo.num_planes != 1 {
            log::error!("i915: unsupported format {}", bo.format);
            return Err(Error::Invalid);
        }

        let tiling = tiling_for(bo.usage);
        let (width, height) = self
            .align_dimensions(tiling, bo.width, bo.height, bpp)
            .ok_or(Error::Invalid)?;
        let stride = width.checked_mul(bpp).ok_or(Error::Invalid)?;
        if self.gen <= 3 && stride > GEN3_MAX_STRIDE {
            log::error!("i915: stride {stride} exceeds the generation {} limit", self.gen);
            return Err(Error::Invalid);
        }
        let size = stride.checked_mul(height).ok_or(Error::Invalid)?;
        log::debug!("i915: {}x{} {} as {width}x{height} {tiling:?}", bo.width, bo.height, bo.format);

        let mut create = ioctl::DrmI915GemCreate::zeroed();
        create.size = size as u64;
        if let Err(e) = dev.i915_gem_create(&mut create) {
            log::error!("DRM_IOCTL_I915_GEM_CREATE failed (size={size}): {e:?}");
            return Err(e.into());
        }
        let handle = GemHandle(create.handle);
        let mut cleanup = Cleanup::new(|| {
            let mut close = ioctl::DrmGemClose::zeroed();
            close.handle = handle.0;
            let _ = dev.gem_close(&close);
        });

        let mut set_tiling = ioctl::DrmI915GemSetTiling::zeroed();
        loop {
            set_tiling.handle = handle.0;
            set_tiling.tiling_mode = tiling_mode(tiling);
            set_tiling.stride = stride;
            match dev.i915_gem_set_tiling(&mut set_tiling) {
                Ok(()) => break,
                Err(linux_io::result::EINTR | linux_io::result::EAGAIN) => continue,
                Err(e) => {
                    log::error!(
                        "DRM_IOCTL_I915_GEM_SET_TILING failed (handle={}, tiling={}, stride={}): {:?}",
                        set_tiling.handle,
                        set_tiling.tiling_mode,
                        set_tiling.stride,
                        e
                    );
                    return Err(e.into());
                }
            }
        }
        cleanup.cancel();

        bo.tiling = tiling;
        bo.handles[0] = handle;
        bo.strides[0] = stride;
        bo.sizes[0] = size;
        bo.offsets[0] = 0;
        Ok(())
    }

    fn bo_destroy<D: Device>(&self, dev: &D, bo: &BufferObject) -> Result<(), Error> {
        gem::gem_bo_destroy(dev, bo)
    }

    fn bo_map<'a, D: Device>(
        &self,
        dev: &'a D,
        bo: &'a BufferObject,
    ) -> Result<Mapping<'a, D>, Error> {
        let mut req = ioctl::DrmI915GemMmapGtt::zeroed();
        req.handle = bo.handles[0].0;
        if let Err(e) = dev.i915_gem_mmap_gtt(&mut req) {
            log::error!("DRM_IOCTL_I915_GEM_MMAP_GTT failed (handle={}): {:?}", req.handle, e);
            return Err(e.into());
        }
        gem::map_plane0(dev, bo, req.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeDevice};

    const GEN3_DEVICE: int = 0x2582;
    const GEN9_DEVICE: int = 0x1916;

    fn backend(dev: &FakeDevice) -> I915 {
        I915::init(dev).unwrap()
    }

    fn create(dev: &FakeDevice, w: u32, h: u32, format: Format, usage: Usage) -> Result<BufferObject, Error> {
        let b = backend(dev);
        let mut bo = BufferObject::new(w, h, format, usage);
        b.bo_create(dev, &mut bo).map(|()| bo)
    }

    #[test]
    fn init_detects_generation() {
        let dev = FakeDevice::new("i915").with_chipset_id(GEN3_DEVICE);
        assert_eq!(backend(&dev).generation(), 3);
        let dev = FakeDevice::new("i915").with_chipset_id(0xA011);
        assert_eq!(backend(&dev).generation(), 3);
        let dev = FakeDevice::new("i915").with_chipset_id(GEN9_DEVICE);
        assert_eq!(backend(&dev).generation(), 4);
    }

    #[test]
    fn init_fails_when_chipset_query_fails() {
        let dev = FakeDevice::new("i915");
        dev.fail(Call::I915GetParam, linux_io::result::EINVAL);
        assert!(matches!(
            I915::init(&dev),
            Err(InitError::Other(linux_io::result::EINVAL))
        ));
    }

    #[test]
    fn tiling_follows_usage_priority() {
        assert_eq!(tiling_for(Usage::CURSOR | Usage::SCANOUT), Tiling::Linear);
        assert_eq!(tiling_for(Usage::LINEAR | Usage::RENDERING), Tiling::Linear);
        assert_eq!(tiling_for(Usage::SCANOUT | Usage::RENDERING), Tiling::X);
        assert_eq!(tiling_for(Usage::RENDERING), Tiling::Y);
        assert_eq!(tiling_for(Usage::SW_READ_OFTEN), Tiling::Linear);
        assert_eq!(tiling_for(Usage::empty()), Tiling::Linear);
    }

    #[test]
    fn gen3_untiled_rounds_to_power_of_two() {
        let b = I915 { gen: 3 };
        assert_eq!(b.align_dimensions(Tiling::Linear, 1, 1, 4), Some((16, 4)));
        assert_eq!(b.align_dimensions(Tiling::Linear, 17, 5, 4), Some((32, 8)));
        assert_eq!(b.align_dimensions(Tiling::Y, 100, 1, 4), Some((128, 8)));
        assert_eq!(b.align_dimensions(Tiling::X, 2049, 1, 4), Some((4096, 8)));
    }

    #[test]
    fn gen4_rounds_to_tile_multiples() {
        let b = I915 { gen: 4 };
        assert_eq!(b.align_dimensions(Tiling::Y, 1, 1, 4), Some((32, 32)));
        assert_eq!(b.align_dimensions(Tiling::X, 1920, 1080, 4), Some((1920, 1080)));
        assert_eq!(b.align_dimensions(Tiling::X, 1921, 1081, 4), Some((2048, 1088)));
        assert_eq!(b.align_dimensions(Tiling::Linear, 1, 1, 2), Some((32, 4)));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let b = I915 { gen: 3 };
        assert_eq!(b.align_dimensions(Tiling::Linear, u32::MAX, 1, 4), None);
        let b = I915 { gen: 4 };
        assert_eq!(b.align_dimensions(Tiling::Linear, 1, u32::MAX, 4), None);

        let dev = FakeDevice::new("i915");
        let err = create(&dev, 0x4000_0000, 0x4000_0000, Format::XRGB8888, Usage::LINEAR);
        assert_eq!(err.unwrap_err(), Error::Invalid);
        assert_eq!(dev.count(Call::I915GemCreate), 0);
    }

    #[test]
    fn scanout_1080p() {
        let dev = FakeDevice::new("i915").with_chipset_id(GEN9_DEVICE);
        let bo = create(&dev, 1920, 1080, Format::XRGB8888, Usage::SCANOUT).unwrap();

        assert_eq!(bo.tiling(), Tiling::X);
        assert_eq!(bo.num_planes(), 1);
        assert_eq!(bo.stride(0), 7680);
        assert_eq!(bo.size(0), 8_294_400);
        assert_eq!(bo.offset(0), 0);
        assert_ne!(bo.handle(0), GemHandle::NONE);
        assert_eq!(bo.handle(1), GemHandle::NONE);
        assert_eq!(bo.stride(1), 0);
        assert_eq!(bo.size(1), 0);

        let tilings = dev.tilings();
        assert_eq!(tilings.len(), 1);
        assert_eq!(tilings[0].handle, bo.handle(0).0);
        assert_eq!(tilings[0].tiling_mode, ioctl::I915_TILING_X);
        assert_eq!(tilings[0].stride, 7680);
        assert_eq!(dev.created_sizes(), [8_294_400]);
    }

    #[test]
    fn cursor_is_untiled() {
        let dev = FakeDevice::new("i915").with_chipset_id(GEN9_DEVICE);
        let bo = create(&dev, 64, 64, Format::ARGB8888, Usage::CURSOR).unwrap();
        assert_eq!(bo.tiling(), Tiling::Linear);
        assert_eq!(bo.stride(0), 256);
        assert_eq!(bo.size(0), 16384);
        assert_eq!(dev.tilings()[0].tiling_mode, ioctl::I915_TILING_NONE);
    }

    #[test]
    fn gen4_y_tiled_minimum() {
        let dev = FakeDevice::new("i915").with_chipset_id(GEN9_DEVICE);
        let bo = create(&dev, 1, 1, Format::XRGB8888, Usage::RENDERING).unwrap();
        assert_eq!(bo.tiling(), Tiling::Y);
        assert_eq!(bo.stride(0), 32 * 4);
        assert_eq!(bo.size(0), 32 * 32 * 4);
    }

    #[test]
    fn gen3_y_tiled_width_100() {
        let dev = FakeDevice::new("i915").with_chipset_id(GEN3_DEVICE);
        let bo = create(&dev, 100, 3, Format::XRGB8888, Usage::RENDERING).unwrap();
        assert_eq!(bo.stride(0), 128 * 4);
        assert_eq!(bo.size(0), 128 * 8 * 4);
    }

    #[test]
    fn gen3_stride_limit() {
        let dev = FakeDevice::new("i915").with_chipset_id(GEN3_DEVICE);
        let err = create(&dev, 2049, 16, Format::XRGB8888, Usage::SCANOUT);
        assert_eq!(err.unwrap_err(), Error::Invalid);
        assert_eq!(dev.count(Call::I915GemCreate), 0);

        // The same request is fine on newer hardware.
        let dev = FakeDevice::new("i915").with_chipset_id(GEN9_DEVICE);
        assert!(create(&dev, 2049, 16, Format::XRGB8888, Usage::SCANOUT).is_ok());
    }

    #[test]
    fn unknown_format_fails_before_any_request() {
        let dev = FakeDevice::new("i915");
        let err = create(&dev, 64, 64, Format(0x1234_5678), Usage::SCANOUT);
        assert_eq!(err.unwrap_err(), Error::Invalid);
        assert_eq!(dev.calls(), [Call::I915GetParam]);
    }

    #[test]
    fn set_tiling_retries_transient_errors() {
        let dev = FakeDevice::new("i915");
        dev.fail(Call::I915GemSetTiling, linux_io::result::EINTR);
        dev.fail(Call::I915GemSetTiling, linux_io::result::EAGAIN);
        dev.fail(Call::I915GemSetTiling, linux_io::result::EINTR);
        let bo = create(&dev, 64, 64, Format::XRGB8888, Usage::SCANOUT).unwrap();
        assert_eq!(dev.count(Call::I915GemSetTiling), 4);
        assert_eq!(dev.live_handles(), [bo.handle(0).0]);
    }

    #[test]
    fn set_tiling_failure_closes_handle() {
        let dev = FakeDevice::new("i915");
        dev.fail(Call::I915GemSetTiling, linux_io::result::EINTR);
        dev.fail(Call::I915GemSetTiling, linux_io::result::EBUSY);
        let err = create(&dev, 64, 64, Format::XRGB8888, Usage::SCANOUT);
        assert_eq!(err.unwrap_err(), Error::Other(linux_io::result::EBUSY));
        assert_eq!(dev.count(Call::I915GemSetTiling), 2);
        assert_eq!(dev.closed_handles(), [1]);
        assert!(dev.live_handles().is_empty());
    }

    #[test]
    fn gem_create_failure_is_propagated() {
        let dev = FakeDevice::new("i915");
        dev.fail(Call::I915GemCreate, linux_io::result::ENOSPC);
        let err = create(&dev, 64, 64, Format::XRGB8888, Usage::SCANOUT);
        assert_eq!(err.unwrap_err(), Error::GraphicsMem);
        assert_eq!(dev.count(Call::I915GemSetTiling), 0);
        assert_eq!(dev.count(Call::GemClose), 0);
    }

    #[test]
    fn map_uses_gtt_offset() {
        let dev = FakeDevice::new("i915");
        let b = backend(&dev);
        let mut bo = BufferObject::new(64, 64, Format::XRGB8888, Usage::SCANOUT);
        b.bo_create(&dev, &mut bo).unwrap();
        {
            let map = b.bo_map(&dev, &bo).unwrap();
            assert_eq!(map.len(), bo.size(0) as usize);
            assert_eq!(dev.count(Call::I915GemMmapGtt), 1);
        }
        assert_eq!(dev.live_mappings(), 0);

        b.bo_destroy(&dev, &bo).unwrap();
        assert!(dev.live_handles().is_empty());
    }

    #[test]
    fn every_table_entry_can_be_allocated() {
        for entry in FORMATS.iter() {
            let dev = FakeDevice::new("i915");
            let bo = create(&dev, 33, 17, entry.format, entry.usage).unwrap();
            let bpp = entry.format.bpp(0);
            assert_eq!(bo.stride(0) % bpp, 0);
            assert!(bo.stride(0) >= 33 * bpp);
            assert!(bo.size(0) >= bo.stride(0) * 17);
        }
    }
}
