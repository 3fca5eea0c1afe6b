// SPDX-License-Identifier: MIT
//! # Export Presets and Plan Computation
//!
//! Computes the output dimensions for an export. Two strategies exist:
//!
//! 1. **ScaleTarget::Native**: keep the generated image's own resolution
//! 2. **ScaleTarget::LongSide**: force the longer axis to a fixed length and
//!    derive the other axis from the source aspect ratio
//!
//! Unlike thumbnail-style scaling, `LongSide` upscales as well as downscales:
//! a 4K export of a 1600×1200 image is 3840×2880.
//!
//! All computations use floating point and round to the nearest integer,
//! clamped to at least 1px.

/// Long-side length of a 4K export, in pixels.
pub const UHD_LONG_SIDE: u32 = 3840;

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Defines the target size constraint for an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleTarget {
    /// Keep the input dimensions.
    Native,
    /// Force the longest side to this length, derive the other side proportionally.
    LongSide(u32),
}

/// Complete export plan computed from input parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Target size constraint used for planning
    pub target: ScaleTarget,
    /// Final computed output dimensions
    pub out: Size,
}

impl ScalePlan {
    /// True when the output has the same dimensions as the input.
    pub fn is_identity(&self) -> bool {
        self.input == self.out
    }

    /// Byte length of an RGBA8 buffer holding the output.
    pub fn out_len(&self) -> usize {
        (self.out.w as usize) * (self.out.h as usize) * 4
    }
}

/// Compute an export plan.
///
/// # Arguments
/// * `input` - Source image dimensions
/// * `target` - Size constraint to apply
pub fn build_plan(input: Size, target: ScaleTarget) -> ScalePlan {
    let out = match target {
        ScaleTarget::Native => input,
        ScaleTarget::LongSide(long) => {
            let (w, h) = fit_long_side(input, long);
            Size { w, h }
        }
    };
    ScalePlan { input, target, out }
}

/// Scale so the longest dimension equals `long`, preserving aspect ratio.
/// Landscape and square inputs pin the width; portrait inputs pin the height.
fn fit_long_side(input: Size, long: u32) -> (u32, u32) {
    let (w, h) = (input.w.max(1) as f64, input.h.max(1) as f64);
    if w >= h {
        (long, ((h * long as f64 / w).round() as u32).max(1))
    } else {
        (((w * long as f64 / h).round() as u32).max(1), long)
    }
}

/// Export resolution presets offered to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportPreset {
    /// The generated image's native resolution
    #[default]
    #[clap(name = "original")]
    Original,
    /// Longest side forced to 3840px
    #[clap(name = "4k")]
    Uhd4k,
}

impl ExportPreset {
    /// Convert preset to the corresponding ScaleTarget for plan computation.
    pub fn to_target(self) -> ScaleTarget {
        match self {
            ExportPreset::Original => ScaleTarget::Native,
            ExportPreset::Uhd4k => ScaleTarget::LongSide(UHD_LONG_SIDE),
        }
    }

    /// Filename suffix for this preset (`_4K` or empty).
    pub fn file_suffix(self) -> &'static str {
        match self {
            ExportPreset::Original => "",
            ExportPreset::Uhd4k => "_4K",
        }
    }
}
