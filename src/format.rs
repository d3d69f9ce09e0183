use core::fmt;

/// A pixel format, identified by its DRM four-character code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Format(pub u32);

impl Format {
    #[inline(always)]
    pub const fn from_fourcc(code: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(code))
    }

    #[inline(always)]
    pub const fn fourcc(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub const C8: Self = Self::from_fourcc(*b"C8  ");
    pub const R8: Self = Self::from_fourcc(*b"R8  ");
    pub const GR88: Self = Self::from_fourcc(*b"GR88");
    pub const RGB332: Self = Self::from_fourcc(*b"RGB8");
    pub const BGR233: Self = Self::from_fourcc(*b"BGR8");

    pub const XRGB4444: Self = Self::from_fourcc(*b"XR12");
    pub const XBGR4444: Self = Self::from_fourcc(*b"XB12");
    pub const ARGB4444: Self = Self::from_fourcc(*b"AR12");
    pub const ABGR4444: Self = Self::from_fourcc(*b"AB12");
    pub const XRGB1555: Self = Self::from_fourcc(*b"XR15");
    pub const XBGR1555: Self = Self::from_fourcc(*b"XB15");
    pub const ARGB1555: Self = Self::from_fourcc(*b"AR15");
    pub const ABGR1555: Self = Self::from_fourcc(*b"AB15");
    pub const RGB565: Self = Self::from_fourcc(*b"RG16");
    pub const BGR565: Self = Self::from_fourcc(*b"BG16");

    pub const RGB888: Self = Self::from_fourcc(*b"RG24");
    pub const BGR888: Self = Self::from_fourcc(*b"BG24");

    pub const XRGB8888: Self = Self::from_fourcc(*b"XR24");
    pub const XBGR8888: Self = Self::from_fourcc(*b"XB24");
    pub const ARGB8888: Self = Self::from_fourcc(*b"AR24");
    pub const ABGR8888: Self = Self::from_fourcc(*b"AB24");
    pub const XRGB2101010: Self = Self::from_fourcc(*b"XR30");
    pub const XBGR2101010: Self = Self::from_fourcc(*b"XB30");
    pub const ARGB2101010: Self = Self::from_fourcc(*b"AR30");
    pub const ABGR2101010: Self = Self::from_fourcc(*b"AB30");

    pub const YUYV: Self = Self::from_fourcc(*b"YUYV");
    pub const YVYU: Self = Self::from_fourcc(*b"YVYU");
    pub const UYVY: Self = Self::from_fourcc(*b"UYVY");
    pub const VYUY: Self = Self::from_fourcc(*b"VYUY");
    pub const AYUV: Self = Self::from_fourcc(*b"AYUV");

    pub const NV12: Self = Self::from_fourcc(*b"NV12");
    pub const NV21: Self = Self::from_fourcc(*b"NV21");
    pub const YVU420: Self = Self::from_fourcc(*b"YV12");

    /// Placeholder meaning "whatever the platform prefers". Never allocated
    /// as-is; a backend's resolver must translate it first.
    pub const FLEX_IMPLEMENTATION_DEFINED: Self = Self::from_fourcc(*b"9998");
    /// Placeholder for "any 8-bit YCbCr 4:2:0 layout". Never allocated as-is.
    pub const FLEX_YCBCR_420_888: Self = Self::from_fourcc(*b"9999");

    /// The number of planes a buffer of this format has, or zero if the
    /// format is unknown.
    pub const fn num_planes(self) -> usize {
        match self {
            Self::NV12 | Self::NV21 => 2,
            Self::YVU420 => 3,
            _ if self.packed_bpp() != 0 => 1,
            _ => 0,
        }
    }

    /// Bytes per pixel of the given plane, or zero for an unknown format
    /// or a plane the format doesn't have.
    pub const fn bpp(self, plane: usize) -> u32 {
        if plane >= self.num_planes() {
            return 0;
        }
        match self {
            Self::NV12 | Self::NV21 => {
                if plane == 0 {
                    1
                } else {
                    // Interleaved Cb/Cr pairs.
                    2
                }
            }
            Self::YVU420 => 1,
            _ => self.packed_bpp(),
        }
    }

    /// The minimum row length in bytes of the given plane for an image
    /// `width` pixels wide. No hardware alignment is applied.
    ///
    /// Returns 0 for unknown formats and for rows too long to describe in
    /// a `u32`.
    pub const fn stride(self, width: u32, plane: usize) -> u32 {
        let samples = width.div_ceil(self.horizontal_subsampling(plane));
        match samples.checked_mul(self.bpp(plane)) {
            Some(stride) => stride,
            None => 0,
        }
    }

    /// How many columns of the image share one sample of the given plane.
    pub const fn horizontal_subsampling(self, plane: usize) -> u32 {
        match self {
            Self::NV12 | Self::NV21 | Self::YVU420 if plane > 0 => 2,
            _ => 1,
        }
    }

    /// How many rows of the image share one row of the given plane.
    pub const fn vertical_subsampling(self, plane: usize) -> u32 {
        match self {
            Self::NV12 | Self::NV21 | Self::YVU420 if plane > 0 => 2,
            _ => 1,
        }
    }

    const fn packed_bpp(self) -> u32 {
        match self {
            Self::C8 | Self::R8 | Self::RGB332 | Self::BGR233 => 1,

            Self::GR88
            | Self::XRGB4444
            | Self::XBGR4444
            | Self::ARGB4444
            | Self::ABGR4444
            | Self::XRGB1555
            | Self::XBGR1555
            | Self::ARGB1555
            | Self::ABGR1555
            | Self::RGB565
            | Self::BGR565
            | Self::YUYV
            | Self::YVYU
            | Self::UYVY
            | Self::VYUY => 2,

            Self::RGB888 | Self::BGR888 => 3,

            Self::XRGB8888
            | Self::XBGR8888
            | Self::ARGB8888
            | Self::ABGR8888
            | Self::XRGB2101010
            | Self::XBGR2101010
            | Self::ARGB2101010
            | Self::ABGR2101010
            | Self::AYUV => 4,

            _ => 0,
        }
    }
}

impl From<u32> for Format {
    #[inline(always)]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Format> for u32 {
    #[inline(always)]
    fn from(value: Format) -> Self {
        value.0
    }
}

/// Writes the four-character code, replacing non-printable bytes with `?`.
impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.fourcc() {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}
