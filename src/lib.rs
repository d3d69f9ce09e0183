//! Allocates GPU buffer objects on Linux DRM devices, applying each
//! vendor's rules for tiling, alignment and plane layout.
//!
//! Open a card, hand it to a [`Driver`], then create, map and destroy
//! [`BufferObject`]s:
//!
//! ```no_run
//! use linux_drm_gbm::{Card, Driver, Format, Usage};
//!
//! let card = Card::open(c"/dev/dri/card0").unwrap();
//! let drv = Driver::new(card).unwrap();
//! let bo = drv.create(1920, 1080, Format::XRGB8888, Usage::SCANOUT).unwrap();
//! println!("stride {}", bo.stride(0));
//! drv.destroy(bo).unwrap();
//! ```
#![no_std]

#[cfg(test)]
extern crate std;

pub mod backend;
pub mod bo;
pub mod device;
mod driver;
pub mod format;
/// Low-level `ioctl`-based access to DRM devices.
pub mod ioctl;
pub mod result;
pub mod usage;

#[cfg(test)]
mod testing;
mod util;

pub use bo::{BufferObject, GemHandle, Mapping, Tiling};
pub use device::Device;
pub use driver::Driver;
pub use format::Format;
pub use result::{Error, InitError};
pub use usage::Usage;

/// An open DRM card device.
#[repr(transparent)]
pub struct Card {
    f: linux_io::File<ioctl::DrmCardDevice>,
}

impl Card {
    pub fn open(path: &core::ffi::CStr) -> Result<Self, InitError> {
        let f = linux_io::File::open(path, linux_io::OpenOptions::read_write())?;
        Self::from_file(f)
    }

    pub fn from_file<D>(f: linux_io::File<D>) -> Result<Self, InitError> {
        // We'll use the VERSION ioctl to decide whether this file
        // seems to be a DRM card device. To do that we need to
        // first optimistically convert it to a DrmCardDevice,
        // so that our ioctl constant will be compatible.
        // Safety: We'll return this new f only if our ioctl
        // probe is successful, which therefore suggests that
        // this ought to be a DRM card device.
        let f: linux_io::File<ioctl::DrmCardDevice> = unsafe { f.to_device(ioctl::DrmCardDevice) };
        let mut v = ioctl::DrmVersion::zeroed();
        f.ioctl(ioctl::DRM_IOCTL_VERSION, &mut v)?;
        Ok(Self { f })
    }

    pub unsafe fn from_file_unchecked<D>(f: linux_io::File<D>) -> Self {
        let f: linux_io::File<ioctl::DrmCardDevice> = unsafe { f.to_device(ioctl::DrmCardDevice) };
        Self { f }
    }

    pub fn close(self) -> linux_io::result::Result<()> {
        let f = self.take_file();
        f.close()
    }

    pub fn take_file(self) -> linux_io::File<ioctl::DrmCardDevice> {
        self.f
    }

    pub fn borrow_file(&self) -> &linux_io::File<ioctl::DrmCardDevice> {
        &self.f
    }
}

impl<D> TryFrom<linux_io::File<D>> for Card {
    type Error = InitError;

    #[inline(always)]
    fn try_from(value: linux_io::File<D>) -> Result<Self, InitError> {
        Card::from_file(value)
    }
}
