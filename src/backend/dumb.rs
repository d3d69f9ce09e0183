//! Display-only and virtual drivers with no allocation interface of their
//! own, served entirely by the kernel's generic dumb buffers.

use super::gem;
use super::Backend;
use crate::bo::{BufferObject, Mapping};
use crate::device::Device;
use crate::format::Format;
use crate::result::Error;
use crate::usage::{FormatSupport, Usage};

pub const NAMES: &[&str] = &["cirrus", "evdi", "gma500", "udl", "vgem", "virtio_gpu"];

const ANY_USE: Usage = Usage::SCANOUT
    .union(Usage::CURSOR)
    .union(Usage::RENDERING)
    .union(Usage::LINEAR)
    .union(Usage::SW_READ_RARELY)
    .union(Usage::SW_READ_OFTEN)
    .union(Usage::SW_WRITE_RARELY)
    .union(Usage::SW_WRITE_OFTEN);

static FORMATS: [FormatSupport; 3] = [
    FormatSupport::new(Format::XRGB8888, ANY_USE),
    FormatSupport::new(Format::ARGB8888, ANY_USE),
    FormatSupport::new(Format::RGB565, ANY_USE),
];

#[derive(Debug)]
pub struct Dumb;

impl Backend for Dumb {
    fn names(&self) -> &'static [&'static str] {
        NAMES
    }

    fn formats(&self) -> &'static [FormatSupport] {
        &FORMATS
    }

    fn bo_create<D: Device>(&self, dev: &D, bo: &mut BufferObject) -> Result<(), Error> {
        gem::dumb_bo_create(dev, bo)
    }

    fn bo_destroy<D: Device>(&self, dev: &D, bo: &BufferObject) -> Result<(), Error> {
        gem::dumb_bo_destroy(dev, bo)
    }

    fn bo_map<'a, D: Device>(
        &self,
        dev: &'a D,
        bo: &'a BufferObject,
    ) -> Result<Mapping<'a, D>, Error> {
        gem::dumb_bo_map(dev, bo)
    }
}
