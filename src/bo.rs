use core::marker::PhantomData;

use crate::device::Device;
use crate::format::Format;
use crate::usage::Usage;

/// The most planes any supported format has.
pub const MAX_PLANES: usize = 4;

/// A GEM handle, naming a kernel buffer object on one open card file.
///
/// Zero is never a valid handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct GemHandle(pub u32);

impl GemHandle {
    pub const NONE: Self = Self(0);

    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// The memory layout a backend chose for a buffer object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tiling {
    #[default]
    Linear,
    /// Intel X-major tiles.
    X,
    /// Intel Y-major tiles.
    Y,
}

/// A buffer object allocated by a [`crate::Driver`].
///
/// Describes where each plane of the image lives: which kernel object
/// holds it, at what byte offset, with what row stride and total size.
/// Planes beyond [`Self::num_planes`] are all zero.
///
/// Destroying a buffer object consumes it, so a destroyed buffer can't
/// be used again. Dropping one without destroying it leaks the kernel
/// allocation until the card file is closed.
#[derive(Debug)]
pub struct BufferObject {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: Format,
    pub(crate) usage: Usage,
    pub(crate) tiling: Tiling,
    pub(crate) num_planes: usize,
    pub(crate) handles: [GemHandle; MAX_PLANES],
    pub(crate) strides: [u32; MAX_PLANES],
    pub(crate) offsets: [u32; MAX_PLANES],
    pub(crate) sizes: [u32; MAX_PLANES],
}

impl BufferObject {
    /// An unallocated buffer object, with the plane count taken from
    /// `format` and every plane zeroed.
    pub(crate) fn new(width: u32, height: u32, format: Format, usage: Usage) -> Self {
        Self {
            width,
            height,
            format,
            usage,
            tiling: Tiling::Linear,
            num_planes: format.num_planes(),
            handles: [GemHandle::NONE; MAX_PLANES],
            strides: [0; MAX_PLANES],
            offsets: [0; MAX_PLANES],
            sizes: [0; MAX_PLANES],
        }
    }

    /// The width requested at creation, before any alignment.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height requested at creation, before any alignment.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The format actually allocated, after the backend resolved any
    /// flexible format.
    pub fn format(&self) -> Format {
        self.format
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn tiling(&self) -> Tiling {
        self.tiling
    }

    pub fn num_planes(&self) -> usize {
        self.num_planes
    }

    /// The kernel handle of `plane`, or [`GemHandle::NONE`] for a plane
    /// the buffer doesn't have.
    pub fn handle(&self, plane: usize) -> GemHandle {
        self.handles.get(plane).copied().unwrap_or_default()
    }

    pub fn stride(&self, plane: usize) -> u32 {
        self.strides.get(plane).copied().unwrap_or(0)
    }

    pub fn offset(&self, plane: usize) -> u32 {
        self.offsets.get(plane).copied().unwrap_or(0)
    }

    pub fn size(&self, plane: usize) -> u32 {
        self.sizes.get(plane).copied().unwrap_or(0)
    }

    pub fn handles(&self) -> &[GemHandle] {
        &self.handles[..self.num_planes]
    }

    pub fn strides(&self) -> &[u32] {
        &self.strides[..self.num_planes]
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets[..self.num_planes]
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes[..self.num_planes]
    }

    /// The number of distinct kernel objects backing this buffer.
    ///
    /// Formats whose planes share one allocation repeat the same handle
    /// in each plane, and count once.
    pub fn num_buffers(&self) -> usize {
        self.unique_handles().count()
    }

    /// Each distinct non-zero handle, in plane order.
    pub(crate) fn unique_handles(&self) -> impl Iterator<Item = GemHandle> + '_ {
        let handles = self.handles();
        handles
            .iter()
            .enumerate()
            .filter(move |(i, h)| !h.is_none() && !handles[..*i].contains(*h))
            .map(|(_, h)| *h)
    }
}

/// A CPU mapping of a buffer object, unmapped on drop.
///
/// A mapping borrows both the driver and the buffer object it maps, so
/// the buffer can't be destroyed while it's mapped.
#[derive(Debug)]
pub struct Mapping<'a, D: Device> {
    pub(crate) dev: &'a D,
    pub(crate) ptr: *mut u8,
    pub(crate) len: usize,
    pub(crate) _bo: PhantomData<&'a BufferObject>,
}

impl<'a, D: Device> Mapping<'a, D> {
    pub(crate) fn new(dev: &'a D, ptr: *mut u8, len: usize) -> Self {
        Self {
            dev,
            ptr,
            len,
            _bo: PhantomData,
        }
    }

    /// The start of the mapping. For multi-plane buffers that share one
    /// allocation, add [`BufferObject::offset`] to reach later planes.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

impl<'a, D: Device> Drop for Mapping<'a, D> {
    fn drop(&mut self) {
        // Safety: ptr and len came from Device::map on this same device,
        // and the mapping is never handed out beyond our own lifetime.
        let _ = unsafe { self.dev.unmap(self.ptr, self.len) };
    }
}
