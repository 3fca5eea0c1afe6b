//! # Export
//!
//! Re-encodes a staged image for download:
//!
//! - **resolution**: native, or 4K (longer axis forced to 3840px, other axis
//!   scaled to keep the aspect ratio)
//! - **format**: PNG (lossless, transparency kept) or JPEG (quality 95,
//!   flattened onto opaque white because JPEG has no alpha channel)
//!
//! Files are named `staged_<room_type>_<style>[_4K].<ext>`.
//!
//! This is a purely local transform: no network, no persistence beyond
//! writing the output file.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use fast_image_resize::Resizer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use stage_scale::cpu::{WHITE, composite_over, has_transparency, scale_rgba_cpu};
use stage_scale::presets::{ScalePlan, Size, build_plan};
use tracing::info;

use crate::catalog::{RoomType, Style};
use crate::error::{StagingError, StagingResult};

pub use stage_scale::presets::ExportPreset as ExportResolution;

/// JPEG quality used for exports (0-100).
pub const JPEG_QUALITY: u8 = 95;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Png,
    #[value(name = "jpg", alias = "jpeg")]
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

/// An encoded export ready to be written.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Output dimensions for an export of an image of `size`.
pub fn plan_export(size: Size, resolution: ExportResolution) -> ScalePlan {
    build_plan(size, resolution.to_target())
}

/// Decode, resize and re-encode a staged image.
pub fn export_image(
    source: &[u8],
    format: ExportFormat,
    resolution: ExportResolution,
) -> StagingResult<ExportedImage> {
    let decoded = image::load_from_memory(source)?.into_rgba8();
    let input = Size {
        w: decoded.width(),
        h: decoded.height(),
    };
    let plan = plan_export(input, resolution);

    let mut pixels = vec![0u8; plan.out_len()];
    let mut resizer = Resizer::new();
    scale_rgba_cpu(&mut resizer, decoded.as_raw(), input, &plan, &mut pixels)
        .map_err(|e| StagingError::export(format.extension(), e.to_string()))?;

    let bytes = match format {
        ExportFormat::Png => encode_png(&pixels, plan.out)?,
        ExportFormat::Jpeg => {
            if has_transparency(&pixels) {
                composite_over(&mut pixels, WHITE);
            }
            encode_jpeg(&pixels, plan.out)?
        }
    };

    Ok(ExportedImage {
        format,
        width: plan.out.w,
        height: plan.out.h,
        bytes,
    })
}

fn encode_png(rgba: &[u8], size: Size) -> StagingResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out)
        .write_image(rgba, size.w, size.h, ExtendedColorType::Rgba8)
        .map_err(|e| StagingError::export("png", e.to_string()))?;
    Ok(out.into_inner())
}

fn encode_jpeg(rgba: &[u8], size: Size) -> StagingResult<Vec<u8>> {
    // Already flattened; drop the alpha channel.
    let rgb: Vec<u8> = rgba
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .write_image(&rgb, size.w, size.h, ExtendedColorType::Rgb8)
        .map_err(|e| StagingError::export("jpg", e.to_string()))?;
    Ok(out.into_inner())
}

/// `staged_<room_type>_<style>[_4K].<ext>`, room and style lower-cased.
pub fn export_filename(
    room_type: RoomType,
    style: Style,
    resolution: ExportResolution,
    format: ExportFormat,
) -> String {
    format!(
        "staged_{}_{}{}.{}",
        room_type.as_str().to_ascii_lowercase(),
        style.as_str().to_ascii_lowercase(),
        resolution.file_suffix(),
        format.extension()
    )
}

/// Export and write into `dir`, returning the written path.
pub fn write_export(
    dir: &Path,
    source: &[u8],
    room_type: RoomType,
    style: Style,
    format: ExportFormat,
    resolution: ExportResolution,
) -> StagingResult<PathBuf> {
    let exported = export_image(source, format, resolution)?;
    std::fs::create_dir_all(dir).map_err(|e| {
        StagingError::io("create output directory", e).with_path(dir.display().to_string())
    })?;
    let path = dir.join(export_filename(room_type, style, resolution, format));
    std::fs::write(&path, &exported.bytes)
        .map_err(|e| StagingError::io("write export", e).with_path(path.display().to_string()))?;
    info!(
        path = %path.display(),
        width = exported.width,
        height = exported.height,
        bytes = exported.bytes.len(),
        "export written"
    );
    Ok(path)
}
