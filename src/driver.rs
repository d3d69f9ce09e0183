use crate::backend::{Backend, BackendKind, DriverBackend};
use crate::bo::{BufferObject, Mapping};
use crate::device::Device;
use crate::format::Format;
use crate::result::{Error, InitError};
use crate::usage::{is_supported, Usage};

/// Longest kernel driver name we compare against backend names.
const DRIVER_NAME_MAX: usize = 32;

/// Allocates buffer objects on one device using the backend for its
/// kernel driver.
///
/// All operations run synchronously on the caller's thread, issuing
/// kernel requests in the order they're called.
#[derive(Debug)]
pub struct Driver<D: Device> {
    dev: D,
    backend: DriverBackend,
    name: &'static str,
}

impl<D: Device> Driver<D> {
    /// Selects and initializes the backend for the kernel driver behind
    /// `dev`.
    pub fn new(dev: D) -> Result<Self, InitError> {
        let mut buf = [0_u8; DRIVER_NAME_MAX];
        let name = dev.driver_name(&mut buf)?;
        let Some((kind, name)) = BackendKind::for_driver_name(name) else {
            log::error!(
                "no backend for kernel driver {:?}",
                core::str::from_utf8(name).unwrap_or("<non-utf8>")
            );
            return Err(InitError::NoBackend);
        };
        Self::init(dev, kind, name)
    }

    /// Initializes the given backend for `dev`, regardless of which kernel
    /// driver `dev` belongs to. [`Self::name`] then reports the backend's
    /// primary name.
    pub fn with_backend(dev: D, kind: BackendKind) -> Result<Self, InitError> {
        Self::init(dev, kind, kind.names()[0])
    }

    fn init(dev: D, kind: BackendKind, name: &'static str) -> Result<Self, InitError> {
        let backend = kind.init(&dev)?;
        log::debug!("using backend {:?} for {}", kind, name);
        Ok(Self { dev, backend, name })
    }

    /// The name of the kernel driver this driver was selected for.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn backend(&self) -> &DriverBackend {
        &self.backend
    }

    pub fn device(&self) -> &D {
        &self.dev
    }

    /// Releases the backend and returns the device.
    pub fn close(self) -> D {
        self.backend.close();
        self.dev
    }

    /// The format that would actually be allocated for `format`.
    pub fn resolve_format(&self, format: Format) -> Format {
        self.backend.resolve_format(format)
    }

    /// Reports whether [`Self::create`] accepts `format` and `usage`.
    pub fn is_supported(&self, format: Format, usage: Usage) -> bool {
        let format = self.resolve_format(format);
        is_supported(self.backend.formats(), format, usage)
    }

    /// Allocates a `width` by `height` buffer object.
    ///
    /// Flexible formats are first resolved to a concrete one. Formats and
    /// usages outside the backend's capability table fail with
    /// [`Error::Invalid`] without reaching the kernel.
    pub fn create(
        &self,
        width: u32,
        height: u32,
        format: Format,
        usage: Usage,
    ) -> Result<BufferObject, Error> {
        let format = self.resolve_format(format);
        if !is_supported(self.backend.formats(), format, usage) {
            log::error!("{}: format {} is not supported for {:?}", self.name(), format, usage);
            return Err(Error::Invalid);
        }

        let mut bo = BufferObject::new(width, height, format, usage);
        if bo.num_planes() == 0 {
            return Err(Error::Invalid);
        }
        self.backend.bo_create(&self.dev, &mut bo)?;
        Ok(bo)
    }

    /// Releases the kernel objects behind `bo`.
    pub fn destroy(&self, bo: BufferObject) -> Result<(), Error> {
        self.backend.bo_destroy(&self.dev, &bo)
    }

    /// Maps `bo` into this process. Each call makes a new mapping.
    pub fn map<'a>(&'a self, bo: &'a BufferObject) -> Result<Mapping<'a, D>, Error> {
        self.backend.bo_map(&self.dev, bo)
    }
}
