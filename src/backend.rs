//! Per-vendor allocation policy.
//!
//! Each backend knows which formats and usages its hardware can handle,
//! how to lay out a buffer object for them, and which kernel requests
//! allocate and map it. [`crate::Driver`] selects one backend per card
//! and forwards buffer object operations to it.

use crate::bo::{BufferObject, Mapping};
use crate::device::Device;
use crate::format::Format;
use crate::result::{Error, InitError};
use crate::usage::FormatSupport;

pub mod gem;

#[cfg(feature = "dumb")]
pub mod dumb;
#[cfg(feature = "i915")]
pub mod i915;
#[cfg(feature = "rockchip")]
pub mod rockchip;

/// The operations a vendor backend provides.
///
/// Initialization is each backend's own constructor, since that's where
/// its private state comes from, and closing consumes the backend.
pub trait Backend {
    /// The kernel driver names this backend handles.
    fn names(&self) -> &'static [&'static str];

    /// The capability table: every format this backend can allocate, and
    /// for which usages.
    fn formats(&self) -> &'static [FormatSupport];

    /// Translates a flexible format into the concrete one this backend
    /// allocates for it. Backends without flexible formats keep the
    /// default, which returns `format` unchanged.
    fn resolve_format(&self, format: Format) -> Format {
        format
    }

    /// Allocates storage for `bo`, whose dimensions, format and usage are
    /// already set, and fills in its planes.
    ///
    /// On failure any kernel objects created along the way have already
    /// been released, and `bo` must be discarded.
    fn bo_create<D: Device>(&self, dev: &D, bo: &mut BufferObject) -> Result<(), Error>;

    fn bo_destroy<D: Device>(&self, dev: &D, bo: &BufferObject) -> Result<(), Error>;

    fn bo_map<'a, D: Device>(
        &self,
        dev: &'a D,
        bo: &'a BufferObject,
    ) -> Result<Mapping<'a, D>, Error>;
}

/// Identifies one of the compiled-in backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackendKind {
    #[cfg(feature = "i915")]
    I915,
    #[cfg(feature = "rockchip")]
    Rockchip,
    #[cfg(feature = "dumb")]
    Dumb,
}

impl BackendKind {
    /// Every compiled-in backend, in the order they are tried.
    pub const ALL: &'static [BackendKind] = &[
        #[cfg(feature = "i915")]
        BackendKind::I915,
        #[cfg(feature = "rockchip")]
        BackendKind::Rockchip,
        #[cfg(feature = "dumb")]
        BackendKind::Dumb,
    ];

    pub fn names(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "i915")]
            BackendKind::I915 => i915::NAMES,
            #[cfg(feature = "rockchip")]
            BackendKind::Rockchip => rockchip::NAMES,
            #[cfg(feature = "dumb")]
            BackendKind::Dumb => dumb::NAMES,
        }
    }

    /// The first backend that handles the kernel driver called `name`,
    /// along with that driver's entry in the backend's name list.
    pub fn for_driver_name(name: &[u8]) -> Option<(Self, &'static str)> {
        Self::ALL.iter().copied().find_map(|kind| {
            kind.names()
                .iter()
                .copied()
                .find(|n| n.as_bytes() == name)
                .map(|n| (kind, n))
        })
    }

    /// Runs the backend's initialization against `dev`.
    #[cfg_attr(not(feature = "i915"), allow(unused_variables))]
    pub fn init<D: Device>(self, dev: &D) -> Result<DriverBackend, InitError> {
        match self {
            #[cfg(feature = "i915")]
            BackendKind::I915 => Ok(DriverBackend::I915(i915::I915::init(dev)?)),
            #[cfg(feature = "rockchip")]
            BackendKind::Rockchip => Ok(DriverBackend::Rockchip(rockchip::Rockchip)),
            #[cfg(feature = "dumb")]
            BackendKind::Dumb => Ok(DriverBackend::Dumb(dumb::Dumb)),
        }
    }
}

/// An initialized backend, together with its private state.
#[derive(Debug)]
#[non_exhaustive]
pub enum DriverBackend {
    #[cfg(feature = "i915")]
    I915(i915::I915),
    #[cfg(feature = "rockchip")]
    Rockchip(rockchip::Rockchip),
    #[cfg(feature = "dumb")]
    Dumb(dumb::Dumb),
}

macro_rules! dispatch {
    ($self:expr, $b:ident => $e:expr) => {
        match *$self {
            #[cfg(feature = "i915")]
            DriverBackend::I915(ref $b) => $e,
            #[cfg(feature = "rockchip")]
            DriverBackend::Rockchip(ref $b) => $e,
            #[cfg(feature = "dumb")]
            DriverBackend::Dumb(ref $b) => $e,
        }
    };
}

impl DriverBackend {
    pub fn kind(&self) -> BackendKind {
        match *self {
            #[cfg(feature = "i915")]
            DriverBackend::I915(_) => BackendKind::I915,
            #[cfg(feature = "rockchip")]
            DriverBackend::Rockchip(_) => BackendKind::Rockchip,
            #[cfg(feature = "dumb")]
            DriverBackend::Dumb(_) => BackendKind::Dumb,
        }
    }

    /// Releases the backend's private state.
    pub fn close(self) {
        match self {
            #[cfg(feature = "i915")]
            DriverBackend::I915(b) => b.close(),
            #[cfg(feature = "rockchip")]
            DriverBackend::Rockchip(_) => {}
            #[cfg(feature = "dumb")]
            DriverBackend::Dumb(_) => {}
        }
    }
}

impl Backend for DriverBackend {
    fn names(&self) -> &'static [&'static str] {
        dispatch!(self, b => b.names())
    }

    fn formats(&self) -> &'static [FormatSupport] {
        dispatch!(self, b => b.formats())
    }

    fn resolve_format(&self, format: Format) -> Format {
        dispatch!(self, b => b.resolve_format(format))
    }

    fn bo_create<D: Device>(&self, dev: &D, bo: &mut BufferObject) -> Result<(), Error> {
        dispatch!(self, b => b.bo_create(dev, bo))
    }

    fn bo_destroy<D: Device>(&self, dev: &D, bo: &BufferObject) -> Result<(), Error> {
        dispatch!(self, b => b.bo_destroy(dev, bo))
    }

    fn bo_map<'a, D: Device>(
        &self,
        dev: &'a D,
        bo: &'a BufferObject,
    ) -> Result<Mapping<'a, D>, Error> {
        dispatch!(self, b => b.bo_map(dev, bo))
    }
}
