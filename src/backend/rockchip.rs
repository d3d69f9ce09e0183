//! Rockchip SoC display and video.

use super::gem;
use super::Backend;
use crate::bo::{BufferObject, GemHandle, Mapping};
use crate::device::Device;
use crate::format::Format;
use crate::ioctl;
use crate::result::Error;
use crate::usage::{FormatSupport, Usage};

pub const NAMES: &[&str] = &["rockchip"];

const RGB_SHARED: Usage = Usage::SCANOUT
    .union(Usage::CURSOR)
    .union(Usage::RENDERING)
    .union(Usage::HW_TEXTURE)
    .union(Usage::HW_RENDER)
    .union(Usage::HW_2D)
    .union(Usage::SW_READ_RARELY)
    .union(Usage::SW_WRITE_RARELY);
const RGB_CPU: Usage = Usage::SCANOUT
    .union(Usage::CURSOR)
    .union(Usage::LINEAR)
    .union(Usage::SW_READ_OFTEN)
    .union(Usage::SW_WRITE_OFTEN);
const YUV_SHARED: Usage = Usage::SCANOUT
    .union(Usage::RENDERING)
    .union(Usage::HW_TEXTURE)
    .union(Usage::HW_RENDER)
    .union(Usage::HW_2D)
    .union(Usage::SW_READ_RARELY)
    .union(Usage::SW_WRITE_RARELY);
const YUV_CPU: Usage = Usage::SCANOUT
    .union(Usage::LINEAR)
    .union(Usage::SW_READ_OFTEN)
    .union(Usage::SW_WRITE_OFTEN);

static FORMATS: [FormatSupport; 7] = [
    FormatSupport::new(Format::XRGB8888, RGB_SHARED),
    FormatSupport::new(Format::XRGB8888, RGB_CPU),
    FormatSupport::new(Format::ARGB8888, RGB_SHARED),
    FormatSupport::new(Format::ARGB8888, RGB_CPU),
    FormatSupport::new(Format::ABGR8888, RGB_SHARED),
    FormatSupport::new(Format::NV12, YUV_SHARED),
    FormatSupport::new(Format::NV12, YUV_CPU),
];

/// The Rockchip backend. It has no private state.
#[derive(Debug)]
pub struct Rockchip;

impl Rockchip {
    /// Fills in the plane layout of `bo` and returns the total size of
    /// the single allocation backing all planes.
    fn layout(bo: &mut BufferObject) -> Result<u32, Error> {
        match bo.format {
            Format::NV12 => {
                let width = bo.width.checked_next_multiple_of(4).ok_or(Error::Invalid)?;
                let height = bo.height.checked_next_multiple_of(4).ok_or(Error::Invalid)?;
                let luma = height.checked_mul(width).ok_or(Error::Invalid)?;
                bo.strides[0] = width;
                bo.strides[1] = width;
                bo.sizes[0] = luma;
                bo.sizes[1] = luma / 2;
                bo.offsets[0] = 0;
                bo.offsets[1] = luma;
            }
            Format::XRGB8888 | Format::ARGB8888 | Format::ABGR8888 => {
                let stride = bo
                    .width
                    .checked_mul(bo.format.bpp(0))
                    .ok_or(Error::Invalid)?;
                bo.strides[0] = stride;
                bo.sizes[0] = bo.height.checked_mul(stride).ok_or(Error::Invalid)?;
                bo.offsets[0] = 0;
            }
            _ => {
                log::error!("rockchip: unsupported format {}", bo.format);
                return Err(Error::Invalid);
            }
        }
        bo.sizes()
            .iter()
            .try_fold(0u32, |total, size| total.checked_add(*size))
            .ok_or(Error::Invalid)
    }
}

impl Backend for Rockchip {
    fn names(&self) -> &'static [&'static str] {
        NAMES
    }

    fn formats(&self) -> &'static [FormatSupport] {
        &FORMATS
    }

    /// Maps the flexible formats onto what the video and display blocks
    /// can handle.
    fn resolve_format(&self, format: Format) -> Format {
        match format {
            // Android's gralloc expects XBGR8888 here for historical
            // reasons, even though this backend can't allocate it.
            Format::FLEX_IMPLEMENTATION_DEFINED => Format::XBGR8888,
            Format::FLEX_YCBCR_420_888 => Format::NV12,
            _ => format,
        }
    }

    fn bo_create<D: Device>(&self, dev: &D, bo: &mut BufferObject) -> Result<(), Error> {
        let size = Self::layout(bo)?;

        let mut create = ioctl::DrmRockchipGemCreate::zeroed();
        create.size = size as u64;
        if let Err(e) = dev.rockchip_gem_create(&mut create) {
            log::error!("DRM_IOCTL_ROCKCHIP_GEM_CREATE failed (size={size}): {e:?}");
            return Err(e.into());
        }

        let n = bo.num_planes;
        bo.handles[..n].fill(GemHandle(create.handle));
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
        let mut req = ioctl::DrmRockchipGemMapOff::zeroed();
        req.handle = bo.handles[0].0;
        if let Err(e) = dev.rockchip_gem_map_offset(&mut req) {
            log::error!(
                "DRM_IOCTL_ROCKCHIP_GEM_MAP_OFFSET failed (handle={}): {:?}",
                req.handle,
                e
            );
            return Err(e.into());
        }
        gem::map_plane0(dev, bo, req.offset)
    }
}
