// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → RGBA8 out, direct write into caller-provided dst buffer.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{ResizeOptions, Resizer};

use crate::presets::{ScalePlan, Size};

/// Opaque white, the background used when flattening for JPEG.
pub const WHITE: [u8; 3] = [255, 255, 255];

#[derive(Debug)]
pub enum ScaleError {
    BufferTooSmall,
    InputSizeMismatch,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::BufferTooSmall => write!(f, "Output buffer too small"),
            ScaleError::InputSizeMismatch => write!(f, "Input buffer or plan does not match the declared size"),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            _ => None,
        }
    }
}

/// Resize a tightly packed RGBA8 buffer according to `plan`.
///
/// `dst` must be at least `plan.out_len()` bytes. Alpha is taken into account
/// during filtering so fully transparent pixels do not bleed colour into
/// their neighbours; transparency itself is preserved.
pub fn scale_rgba_cpu(
    resizer: &mut Resizer,
    src_rgba: &[u8],
    src: Size,
    plan: &ScalePlan,
    dst: &mut [u8],
) -> Result<(), ScaleError> {
    let src_len = (src.w as usize) * (src.h as usize) * 4;
    if src_rgba.len() != src_len || plan.input != src {
        return Err(ScaleError::InputSizeMismatch);
    }
    let dst_len = plan.out_len();
    if dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall);
    }

    // Same size: nothing to filter.
    if plan.is_identity() {
        dst[..dst_len].copy_from_slice(src_rgba);
        return Ok(());
    }

    let src_view = TypedImageRef::<U8x4>::from_buffer(src.w, src.h, src_rgba)?;
    let mut dst_image = TypedImage::<U8x4>::from_buffer(plan.out.w, plan.out.h, &mut dst[..dst_len])?;

    let opts = ResizeOptions::new().use_alpha(true);
    resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;

    Ok(())
}

/// Flatten an RGBA8 buffer onto an opaque background in place.
///
/// Every output pixel has alpha 255; colour channels are blended
/// `src * a + bg * (1 - a)`.
pub fn composite_over(rgba: &mut [u8], bg: [u8; 3]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 255 {
            continue;
        }
        for c in 0..3 {
            let fg = px[c] as u32;
            let back = bg[c] as u32;
            px[c] = ((fg * a + back * (255 - a) + 127) / 255) as u8;
        }
        px[3] = 255;
    }
}

/// True when at least one pixel is not fully opaque.
pub fn has_transparency(rgba: &[u8]) -> bool {
    rgba.chunks_exact(4).any(|px| px[3] != 255)
}
