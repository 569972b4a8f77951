use std::io::{Read, Seek, SeekFrom};

use byteorder::ReadBytesExt;

use crate::error::Result;

/// Reads a fixed-width character field, stopping at the first NUL.
pub fn read_chars<R: Read>(reader: &mut R, width: usize) -> Result<String> {
    let mut buf = vec![0u8; width];
    reader.read_exact(&mut buf)?;
    Ok(bytes_to_string(&buf))
}

/// Reads a length-prefixed string occupying `pad` bytes after its length byte.
///
/// The first byte holds the content length. Whatever that length says, the
/// stream is left at `position after the length byte + pad` so the next field
/// starts where the layout expects it. A zero length reads as `None`.
pub fn read_padded_string<R: Read + Seek>(reader: &mut R, pad: u64) -> Result<Option<String>> {
    let len = reader.read_u8()?;
    let start = reader.stream_position()?;

    let value = if len > 0 {
        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf)?;
        Some(bytes_to_string(&buf))
    } else {
        None
    };

    reader.seek(SeekFrom::Start(start + pad))?;
    Ok(value)
}

/// Decodes raw field bytes, cut at the first NUL and trimmed of whitespace.
pub fn bytes_to_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

/// Case-insensitive label comparison; only ASCII letters fold.
pub fn labels_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Turns a stored file offset into a seek position; negative offsets are
/// link sentinels and have no position.
pub fn file_offset(raw: i32) -> Option<u64> {
    u64::try_from(raw).ok()
}
