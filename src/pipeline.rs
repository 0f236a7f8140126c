use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::heic;
use crate::jpeg::ExifWriter;

/// JPEG quality used when callers do not pick one.
pub const DEFAULT_QUALITY: u8 = 90;

/// Runtime options for a conversion.
///
/// # Example
///
/// ```rust
/// use heic2jpg::pipeline::ConvertOptions;
///
/// let options = ConvertOptions::default();
/// assert_eq!(options.quality, 90);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// JPEG quality on a 0–100 scale.
    pub quality: u8,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self { quality: DEFAULT_QUALITY }
    }
}

/// Convert the HEIC file at `input` into a JPEG file at `output`,
/// carrying the source's EXIF metadata over into an APP1 segment.
///
/// The source is read twice: once to extract EXIF, once (after rewinding)
/// to decode pixels. The destination is created or truncated up front, so
/// a conversion that fails mid-way leaves it in a partial state callers
/// must treat as invalid. Every step is attempted exactly once; the first
/// failure aborts the conversion with a wrapped description of its cause.
///
/// # Example
///
/// ```rust,no_run
/// use heic2jpg::pipeline::{convert, ConvertOptions};
/// use std::path::Path;
///
/// convert(
///     Path::new("photo.heic"),
///     Path::new("photo.jpg"),
///     ConvertOptions::default(),
/// )?;
/// # anyhow::Ok(())
/// ```
pub fn convert(input: &Path, output: &Path, options: ConvertOptions) -> Result<()> {
    let mut source = File::open(input)
        .with_context(|| format!("failed to open input file {}", input.display()))?;

    log::debug!("extracting EXIF metadata");
    let exif = heic::extract_exif(&mut source).context("failed to extract EXIF")?;
    match &exif {
        Some(blob) => log::debug!("EXIF payload: {} bytes", blob.len()),
        None => log::debug!("no EXIF metadata present"),
    }

    source
        .seek(SeekFrom::Start(0))
        .context("failed to rewind input file")?;

    log::debug!("decoding HEIC image");
    let img = heic::decode(&mut source).context("failed to decode HEIC")?;
    log::debug!("decoded {}x{} pixels", img.width(), img.height());

    let dest = File::create(output)
        .with_context(|| format!("failed to open output file {}", output.display()))?;

    let mut writer = ExifWriter::new(BufWriter::new(dest), exif.as_deref())
        .context("failed to write JPEG header")?;

    log::debug!("encoding JPEG at quality {}", options.quality);
    let encoder = JpegEncoder::new_with_quality(&mut writer, options.quality);
    encoder
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .context("failed to encode JPEG")?;

    writer.flush().context("failed to flush output file")?;

    Ok(())
}
