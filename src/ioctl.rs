use core::ffi::c_int as int;
use core::ffi::c_ulong as ulong;

use linux_io::fd::ioctl::{ioctl_write, ioctl_writeread, IoDevice, IoctlReqWrite, IoctlReqWriteRead};

pub struct DrmCardDevice;

impl IoDevice for DrmCardDevice {}

const DRM_IOCTL_BASE: ulong = 100;

/// First ioctl number available to driver-specific requests.
const DRM_COMMAND_BASE: ulong = 0x40;

#[allow(non_snake_case)]
const fn _IOW<T>(nr: ulong) -> ulong {
    linux_io::fd::ioctl::_IOW(DRM_IOCTL_BASE, nr, core::mem::size_of::<T>() as _)
}

#[allow(non_snake_case)]
const fn _IOWR<T>(nr: ulong) -> ulong {
    linux_io::fd::ioctl::_IOWR(DRM_IOCTL_BASE, nr, core::mem::size_of::<T>() as _)
}

macro_rules! impl_zeroed {
    ($t:ty) => {
        impl $t {
            #[inline(always)]
            pub const fn zeroed() -> Self {
                // Safety: All of the field types in $t must
                // treat all-zeroes as a valid bit pattern.
                unsafe { ::core::mem::zeroed() }
            }
        }

        /// The default value is the result of [`Self::zeroed`].
        impl ::core::default::Default for $t {
            #[inline(always)]
            fn default() -> Self {
                Self::zeroed()
            }
        }
    };
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmVersion {
    pub version_major: int,
    pub version_minor: int,
    pub version_patchlevel: int,
    name_len: usize,
    name: *mut i8,
    date_len: usize,
    date: *mut i8,
    desc_len: usize,
    desc: *mut i8,
}

impl_zeroed!(DrmVersion);

impl DrmVersion {
    #[inline(always)]
    pub unsafe fn set_name_ptr(&mut self, ptr: *mut i8, len: usize) {
        self.name = ptr;
        self.name_len = len;
    }

    /// The length of the driver name as reported by the kernel, which
    /// may exceed the length of the buffer given to [`Self::set_name_ptr`].
    #[inline(always)]
    pub fn name_len(&self) -> usize {
        self.name_len
    }
}

pub const DRM_IOCTL_VERSION: IoctlReqWriteRead<DrmCardDevice, DrmVersion, int> =
    unsafe { ioctl_writeread(_IOWR::<DrmVersion>(0x00)) };

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmGemClose {
    pub handle: u32,
    pub pad: u32,
}

impl_zeroed!(DrmGemClose);

pub const DRM_IOCTL_GEM_CLOSE: IoctlReqWrite<DrmCardDevice, DrmGemClose, int> =
    unsafe { ioctl_write(_IOW::<DrmGemClose>(0x09)) };

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmModeCreateDumb {
    pub height: u32,
    pub width: u32,
    pub bpp: u32,
    pub flags: u32,
    pub handle: u32,
    pub pitch: u32,
    pub size: u64,
}

impl_zeroed!(DrmModeCreateDumb);

pub const DRM_IOCTL_MODE_CREATE_DUMB: IoctlReqWriteRead<DrmCardDevice, DrmModeCreateDumb, int> =
    unsafe { ioctl_writeread(_IOWR::<DrmModeCreateDumb>(0xb2)) };

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmModeMapDumb {
    pub handle: u32,
    pub pad: u32,
    pub offset: u64,
}

impl_zeroed!(DrmModeMapDumb);

pub const DRM_IOCTL_MODE_MAP_DUMB: IoctlReqWriteRead<DrmCardDevice, DrmModeMapDumb, int> =
    unsafe { ioctl_writeread(_IOWR::<DrmModeMapDumb>(0xb3)) };

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmModeDestroyDumb {
    pub handle: u32,
}

impl_zeroed!(DrmModeDestroyDumb);

pub const DRM_IOCTL_MODE_DESTROY_DUMB: IoctlReqWriteRead<DrmCardDevice, DrmModeDestroyDumb, int> =
    unsafe { ioctl_writeread(_IOWR::<DrmModeDestroyDumb>(0xb4)) };

// i915

/// [`DrmI915GetParam::param`] value asking for the PCI device id.
pub const I915_PARAM_CHIPSET_ID: i32 = 4;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmI915GetParam {
    pub param: i32,
    value: *mut int,
}

impl_zeroed!(DrmI915GetParam);

impl DrmI915GetParam {
    /// Sets the location where the kernel writes the parameter value.
    ///
    /// # Safety
    ///
    /// `ptr` must remain valid for writes until the ioctl using this
    /// request has returned.
    #[inline(always)]
    pub unsafe fn set_value_ptr(&mut self, ptr: *mut int) {
        self.value = ptr;
    }
}

pub const DRM_IOCTL_I915_GETPARAM: IoctlReqWriteRead<DrmCardDevice, DrmI915GetParam, int> =
    unsafe { ioctl_writeread(_IOWR::<DrmI915GetParam>(DRM_COMMAND_BASE + 0x06)) };

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmI915GemCreate {
    pub size: u64,
    pub handle: u32,
    pub pad: u32,
}

impl_zeroed!(DrmI915GemCreate);

pub const DRM_IOCTL_I915_GEM_CREATE: IoctlReqWriteRead<DrmCardDevice, DrmI915GemCreate, int> =
    unsafe { ioctl_writeread(_IOWR::<DrmI915GemCreate>(DRM_COMMAND_BASE + 0x1b)) };

pub const I915_TILING_NONE: u32 = 0;
pub const I915_TILING_X: u32 = 1;
pub const I915_TILING_Y: u32 = 2;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmI915GemSetTiling {
    pub handle: u32,
    pub tiling_mode: u32,
    pub stride: u32,
    /// Written by the kernel: the bit-6 swizzling the hardware applies.
    pub swizzle_mode: u32,
}

impl_zeroed!(DrmI915GemSetTiling);

pub const DRM_IOCTL_I915_GEM_SET_TILING: IoctlReqWriteRead<
    DrmCardDevice,
    DrmI915GemSetTiling,
    int,
> = unsafe { ioctl_writeread(_IOWR::<DrmI915GemSetTiling>(DRM_COMMAND_BASE + 0x21)) };

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmI915GemMmapGtt {
    pub handle: u32,
    pub pad: u32,
    /// Fake offset to pass to `mmap` on the card device.
    pub offset: u64,
}

impl_zeroed!(DrmI915GemMmapGtt);

pub const DRM_IOCTL_I915_GEM_MMAP_GTT: IoctlReqWriteRead<DrmCardDevice, DrmI915GemMmapGtt, int> =
    unsafe { ioctl_writeread(_IOWR::<DrmI915GemMmapGtt>(DRM_COMMAND_BASE + 0x24)) };

// Rockchip

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmRockchipGemCreate {
    pub size: u64,
    pub flags: u32,
    pub handle: u32,
}

impl_zeroed!(DrmRockchipGemCreate);

pub const DRM_IOCTL_ROCKCHIP_GEM_CREATE: IoctlReqWriteRead<
    DrmCardDevice,
    DrmRockchipGemCreate,
    int,
> = unsafe { ioctl_writeread(_IOWR::<DrmRockchipGemCreate>(DRM_COMMAND_BASE + 0x00)) };

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DrmRockchipGemMapOff {
    pub handle: u32,
    pub pad: u32,
    pub offset: u64,
}

impl_zeroed!(DrmRockchipGemMapOff);

pub const DRM_IOCTL_ROCKCHIP_GEM_MAP_OFFSET: IoctlReqWriteRead<
    DrmCardDevice,
    DrmRockchipGemMapOff,
    int,
> = unsafe { ioctl_writeread(_IOWR::<DrmRockchipGemMapOff>(DRM_COMMAND_BASE + 0x01)) };

// mmap(2) arguments used when mapping buffer objects.
pub(crate) const PROT_READ: int = 0x1;
pub(crate) const PROT_WRITE: int = 0x2;
pub(crate) const MAP_SHARED: int = 0x01;
