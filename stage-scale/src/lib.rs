// SPDX-License-Identifier: MIT
//! # stage-scale: Export Scaling for Staged Room Images
//!
//! CPU-side image work for the export path of the staging client: deciding
//! the output resolution, resizing RGBA buffers, and flattening transparency
//! onto an opaque background for formats without an alpha channel.
//!
//! ## Key Components
//!
//! - [`presets`]: Export plan computation (native size or 4K long side)
//! - [`cpu`]: RGBA resizing via fast_image_resize and background compositing
//!
//! ## Usage Example
//!
//! ```rust
//! use stage_scale::{cpu::scale_rgba_cpu, presets::{build_plan, ExportPreset, Size}};
//!
//! let input = Size { w: 1600, h: 1200 };
//! let plan = build_plan(input, ExportPreset::Uhd4k.to_target());
//! assert_eq!((plan.out.w, plan.out.h), (3840, 2880));
//!
//! let src = vec![255u8; (input.w * input.h * 4) as usize];
//! let mut resizer = fast_image_resize::Resizer::new();
//! let mut dst = vec![0u8; plan.out_len()];
//! scale_rgba_cpu(&mut resizer, &src, input, &plan, &mut dst).unwrap();
//! ```

pub mod cpu;
pub mod presets;
