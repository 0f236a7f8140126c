use std::io::{self, Write};

/// The mandatory 2-byte Start-Of-Image marker that opens every JPEG stream.
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// APP1 segment marker byte, conventionally used to carry EXIF data.
const APP1: u8 = 0xE1;

/// The APP1 length field is 16-bit and counts its own 2 bytes.
const MAX_EXIF_LEN: usize = u16::MAX as usize - 2;

/// A byte sink that splices an EXIF APP1 segment into a JPEG stream
/// produced by a generic encoder.
///
/// On construction the writer emits the SOI marker and (if an EXIF blob is
/// supplied) a complete APP1 segment directly into the underlying sink.
/// The wrapped encoder then writes its own JPEG stream through
/// [`Write::write`], which swallows exactly the encoder's redundant leading
/// SOI marker and forwards everything after it untouched. The skip works
/// regardless of how the encoder chunks its output: one 2-byte write, two
/// 1-byte writes, or a single large buffer starting with the marker all
/// forward the same bytes.
///
/// # Example
///
/// ```rust
/// use std::io::Write;
/// use heic2jpg::jpeg::ExifWriter;
///
/// let exif = b"Exif\0\0...";
/// let mut writer = ExifWriter::new(Vec::new(), Some(exif)).unwrap();
///
/// // The encoder's own SOI marker is absorbed, not duplicated.
/// writer.write_all(&[0xFF, 0xD8, 0xFF, 0xDB]).unwrap();
///
/// let out = writer.into_inner();
/// assert_eq!(&out[..4], &[0xFF, 0xD8, 0xFF, 0xE1]);
/// ```
#[derive(Debug)]
pub struct ExifWriter<W: Write> {
    inner: W,
    /// Bytes of the encoder's leading SOI marker still to be absorbed.
    /// Starts at 2, monotonically decremented to 0, never reset.
    skip: usize,
}

impl<W: Write> ExifWriter<W> {
    /// Wrap `inner`, immediately writing the SOI marker and, when `exif`
    /// holds a non-empty blob, an APP1 segment carrying it verbatim.
    ///
    /// An empty blob is treated the same as `None`: no APP1 segment is
    /// emitted. A blob too large for the 16-bit APP1 length field is
    /// rejected with [`io::ErrorKind::InvalidInput`].
    pub fn new(mut inner: W, exif: Option<&[u8]>) -> io::Result<Self> {
        inner.write_all(&SOI)?;

        if let Some(exif) = exif.filter(|blob| !blob.is_empty()) {
            if exif.len() > MAX_EXIF_LEN {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("EXIF blob of {} bytes does not fit an APP1 segment", exif.len()),
                ));
            }
            // Segment length counts the length field itself plus the payload.
            let [hi, lo] = ((exif.len() + 2) as u16).to_be_bytes();
            inner.write_all(&[0xFF, APP1, hi, lo])?;
            inner.write_all(exif)?;
        }

        Ok(Self { inner, skip: SOI.len() })
    }

    /// Unwrap the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ExifWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.skip == 0 {
            return self.inner.write(buf);
        }

        if buf.len() < self.skip {
            self.skip -= buf.len();
            return Ok(buf.len());
        }

        // Skipped bytes count as accepted even though never forwarded.
        let n = self.inner.write(&buf[self.skip..])?;
        let accepted = n + self.skip;
        self.skip = 0;
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXIF: &[u8] = b"Exif\0\0II*\0test-payload";

    /// A sink whose first `write` always fails.
    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("sink is broken"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // ── construction ─────────────────────────────────────────────────

    #[test]
    fn header_with_exif() {
        let writer = ExifWriter::new(Vec::new(), Some(EXIF)).unwrap();
        let out = writer.into_inner();

        let len = (EXIF.len() + 2) as u16;
        assert_eq!(&out[..4], &[0xFF, 0xD8, 0xFF, 0xE1]);
        assert_eq!(&out[4..6], &len.to_be_bytes());
        assert_eq!(&out[6..], EXIF);
    }

    #[test]
    fn header_without_exif() {
        let writer = ExifWriter::new(Vec::new(), None).unwrap();
        assert_eq!(writer.into_inner(), vec![0xFF, 0xD8]);
    }

    #[test]
    fn empty_blob_emits_no_app1() {
        let writer = ExifWriter::new(Vec::new(), Some(&[])).unwrap();
        assert_eq!(writer.into_inner(), vec![0xFF, 0xD8]);
    }

    #[test]
    fn oversized_blob_rejected() {
        let huge = vec![0u8; MAX_EXIF_LEN + 1];
        let err = ExifWriter::new(Vec::new(), Some(&huge)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn largest_blob_accepted() {
        let blob = vec![0u8; MAX_EXIF_LEN];
        let writer = ExifWriter::new(Vec::new(), Some(&blob)).unwrap();
        let out = writer.into_inner();
        assert_eq!(&out[4..6], &[0xFF, 0xFF]);
        assert_eq!(out.len(), 2 + 4 + MAX_EXIF_LEN);
    }

    #[test]
    fn header_write_error_propagates() {
        assert!(ExifWriter::new(FailingSink, Some(EXIF)).is_err());
    }

    // ── skip accounting ──────────────────────────────────────────────

    fn forwarded_after(chunks: &[&[u8]]) -> Vec<u8> {
        let mut writer = ExifWriter::new(Vec::new(), None).unwrap();
        let header_len = writer.inner.len();
        for chunk in chunks {
            assert_eq!(writer.write(chunk).unwrap(), chunk.len());
        }
        writer.into_inner().split_off(header_len)
    }

    #[test]
    fn chunking_invariance() {
        let stream = [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43];

        let whole = forwarded_after(&[&stream]);
        let split_marker = forwarded_after(&[&stream[..2], &stream[2..]]);
        let byte_at_a_time = forwarded_after(&[&stream[..1], &stream[1..2], &stream[2..]]);

        assert_eq!(whole, &stream[2..]);
        assert_eq!(split_marker, whole);
        assert_eq!(byte_at_a_time, whole);
    }

    #[test]
    fn short_chunk_accepted_without_forwarding() {
        let mut writer = ExifWriter::new(Vec::new(), None).unwrap();
        assert_eq!(writer.write(&[0xFF]).unwrap(), 1);
        assert_eq!(writer.inner, vec![0xFF, 0xD8]); // still just our header
        assert_eq!(writer.skip, 1);
    }

    #[test]
    fn skip_frozen_at_zero() {
        let mut writer = ExifWriter::new(Vec::new(), None).unwrap();
        writer.write_all(&[0xFF, 0xD8]).unwrap();
        assert_eq!(writer.skip, 0);

        // Later SOI-looking bytes pass through untouched.
        writer.write_all(&[0xFF, 0xD8]).unwrap();
        assert_eq!(writer.into_inner(), vec![0xFF, 0xD8, 0xFF, 0xD8]);
    }

    #[test]
    fn exact_marker_write_fully_accepted() {
        let mut writer = ExifWriter::new(Vec::new(), None).unwrap();
        assert_eq!(writer.write(&[0xFF, 0xD8]).unwrap(), 2);
        assert_eq!(writer.inner, vec![0xFF, 0xD8]);
    }

    #[test]
    fn sink_error_leaves_skip_untouched() {
        let mut writer = ExifWriter { inner: FailingSink, skip: 2 };
        assert!(writer.write(&[0xFF, 0xD8, 0x01]).is_err());
        assert_eq!(writer.skip, 2);
    }
}
