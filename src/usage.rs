use bitflags::bitflags;

bitflags! {
    /// How the client intends to use a buffer object.
    ///
    /// Backends use these to choose a memory layout and to decide whether
    /// they can satisfy a request at all.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Usage: u32 {
        /// Consumed directly by the display controller.
        const SCANOUT = 1 << 0;
        /// Used as a hardware cursor image.
        const CURSOR = 1 << 1;
        /// Used as a GPU render target.
        const RENDERING = 1 << 2;
        /// Must not be tiled.
        const LINEAR = 1 << 3;
        const SW_READ_NEVER = 1 << 4;
        const SW_READ_RARELY = 1 << 5;
        const SW_READ_OFTEN = 1 << 6;
        const SW_WRITE_NEVER = 1 << 7;
        const SW_WRITE_RARELY = 1 << 8;
        const SW_WRITE_OFTEN = 1 << 9;
        const HW_TEXTURE = 1 << 10;
        const HW_RENDER = 1 << 11;
        const HW_2D = 1 << 12;
    }
}

/// One row of a backend's capability table: buffers of `format` may be
/// allocated for any subset of `usage`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSupport {
    pub format: crate::format::Format,
    pub usage: Usage,
}

impl FormatSupport {
    pub const fn new(format: crate::format::Format, usage: Usage) -> Self {
        Self { format, usage }
    }
}

/// Reports whether some entry of `table` covers `format` with a usage mask
/// that includes every bit of `usage`.
pub fn is_supported(table: &[FormatSupport], format: crate::format::Format, usage: Usage) -> bool {
    table
        .iter()
        .any(|entry| entry.format == format && entry.usage.contains(usage))
}
