//! # heic2jpg
//!
//! Convert HEIC images to JPEG while preserving EXIF metadata.
//!
//! Decoding is delegated to libheif (via `libheif-rs`) and encoding to the
//! `image` crate's JPEG encoder. The one genuinely interesting piece is
//! [`jpeg::ExifWriter`]: the encoder knows nothing about the source's EXIF
//! block, so the writer pre-emits a Start-Of-Image marker plus an APP1
//! segment carrying the EXIF bytes, then swallows the encoder's own
//! redundant leading marker so the destination stays a single well-formed
//! JPEG stream.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use heic2jpg::pipeline::{convert, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     convert(
//!         Path::new("photo.heic"),
//!         Path::new("photo.jpg"),
//!         ConvertOptions::default(),
//!     )
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The decoder adapter and the injecting writer can be driven directly,
//! for example to keep the JPEG in memory:
//!
//! ```rust,no_run
//! use heic2jpg::{heic, jpeg::ExifWriter};
//! use image::codecs::jpeg::JpegEncoder;
//! use image::{ExtendedColorType, ImageEncoder};
//! use std::fs::File;
//! use std::io::{Seek, SeekFrom};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut source = File::open("photo.heic")?;
//!     let exif = heic::extract_exif(&mut source)?;
//!     source.seek(SeekFrom::Start(0))?;
//!     let img = heic::decode(&mut source)?;
//!
//!     let mut writer = ExifWriter::new(Vec::new(), exif.as_deref())?;
//!     let encoder = JpegEncoder::new_with_quality(&mut writer, 90);
//!     encoder.write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)?;
//!
//!     let jpeg_bytes = writer.into_inner();
//!     println!("{} bytes", jpeg_bytes.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`heic`] — HEIC decoding and raw EXIF extraction (libheif adapter)
//! - [`jpeg`] — the EXIF-injecting JPEG byte sink
//! - [`pipeline`] — the file-to-file conversion pipeline

pub mod heic;
pub mod jpeg;
pub mod pipeline;
