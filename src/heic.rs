use anyhow::{Context, Result, bail};
use image::RgbImage;
use libheif_rs::{ColorSpace, HeifContext, ItemId, LibHeif, RgbChroma};
use std::io::Read;

/// The identifier that opens an EXIF APP1 payload.
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Extract the raw EXIF payload embedded in a HEIC stream.
///
/// Reads the stream to the end and returns the first Exif metadata block
/// of the primary image, already shaped as an APP1 payload
/// (`Exif\0\0` + TIFF), or `None` when the file carries no EXIF. The
/// stream position is left at EOF; callers that need to read the file
/// again must rewind it themselves.
pub fn extract_exif<R: Read>(mut reader: R) -> Result<Option<Vec<u8>>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).context("failed to read HEIC stream")?;

    let ctx = HeifContext::read_from_bytes(&data)?;
    let handle = ctx.primary_image_handle()?;

    let mut meta_ids: Vec<ItemId> = vec![0; 1];
    let count = handle.metadata_block_ids(&mut meta_ids, b"Exif");
    if count == 0 {
        return Ok(None);
    }

    let raw = handle.metadata(meta_ids[0])?;
    Ok(app1_payload(&raw))
}

/// Decode the primary image of a HEIC stream into an RGB pixel buffer.
///
/// Reads the stream to the end, so the same rewind caveat as
/// [`extract_exif`] applies.
pub fn decode<R: Read>(mut reader: R) -> Result<RgbImage> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).context("failed to read HEIC stream")?;

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(&data)?;
    let handle = ctx.primary_image_handle()?;
    let width = handle.width();
    let height = handle.height();
    if width == 0 || height == 0 {
        bail!("HEIC image reports zero dimensions ({width}x{height})");
    }

    let decoded = lib_heif.decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)?;
    let planes = decoded.planes();
    let interleaved = planes
        .interleaved
        .context("decoded HEIC image has no interleaved RGB plane")?;

    // Rows may carry stride padding; repack them tightly.
    let stride = interleaved.stride;
    let row_len = width as usize * 3;
    if interleaved.data.len() < (height as usize - 1) * stride + row_len {
        bail!("decoded plane is shorter than {width}x{height} RGB pixels");
    }

    let mut rgb = Vec::with_capacity(height as usize * row_len);
    for y in 0..height as usize {
        let row = &interleaved.data[y * stride..y * stride + row_len];
        rgb.extend_from_slice(row);
    }

    RgbImage::from_raw(width, height, rgb)
        .context("decoded pixel buffer does not match the reported dimensions")
}

/// Shape a HEIF Exif item into an APP1 payload.
///
/// The item data starts with a 4-byte big-endian offset to the TIFF header
/// within the rest of the payload; the payload itself usually begins with
/// `Exif\0\0`. Returns `None` when the item is too short to contain
/// anything useful.
fn app1_payload(raw: &[u8]) -> Option<Vec<u8>> {
    if raw.len() < 4 {
        return None;
    }
    let offset = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
    let payload = &raw[4..];

    if payload.starts_with(EXIF_HEADER) {
        return Some(payload.to_vec());
    }

    // Bare TIFF data: re-add the identifier the APP1 convention expects.
    if offset < payload.len() {
        let mut out = Vec::with_capacity(EXIF_HEADER.len() + payload.len() - offset);
        out.extend_from_slice(EXIF_HEADER);
        out.extend_from_slice(&payload[offset..]);
        return Some(out);
    }

    None
}
