use byteorder::{BigEndian, ByteOrder};
use encoding_rs::SHIFT_JIS;
use log::debug;

use crate::error::PiDecodeError;

const PI_SIGNATURE: &[u8; 2] = b"Pi";

// Stock digital 16-color palette, used when a 4-plane file stores an
// all-zero palette block. Entries 0 and 8 are transparent black.
const DEFAULT_PALETTE: [[u8; 4]; 16] = [
    [0x00, 0x00, 0x00, 0x00],
    [0x00, 0x00, 0x70, 0xFF],
    [0x70, 0x00, 0x00, 0xFF],
    [0x70, 0x00, 0x70, 0xFF],
    [0x00, 0x70, 0x00, 0xFF],
    [0x00, 0x70, 0x70, 0xFF],
    [0x70, 0x70, 0x00, 0xFF],
    [0x70, 0x70, 0x70, 0xFF],
    [0x00, 0x00, 0x00, 0x00],
    [0x00, 0x00, 0xF0, 0xFF],
    [0xF0, 0x00, 0x00, 0xFF],
    [0xF0, 0x00, 0xF0, 0xFF],
    [0x00, 0xF0, 0x00, 0xFF],
    [0x00, 0xF0, 0xF0, 0xFF],
    [0xF0, 0xF0, 0x00, 0xFF],
    [0xF0, 0xF0, 0xF0, 0xFF],
];

/// Parsed PI file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiHeader {
    /// Free-form comment, Shift_JIS in the file.
    pub comment: String,
    pub mode: u8,
    /// Screen aspect ratio as stored: (numerator, denominator).
    pub aspect: (u8, u8),
    /// 4 or 8.
    pub planes: u8,
    /// Four-character tag of the saving program.
    pub editor: String,
    pub width: u16,
    pub height: u16,
    /// RGBA palette, one entry per palette index.
    pub palette: Vec<[u8; 4]>,
}

impl PiHeader {
    /// Palette size implied by the plane count.
    pub fn colors(&self) -> usize {
        1 << self.planes
    }

    pub fn aspect_ratio(&self) -> f32 {
        match self.aspect {
            (0, _) | (_, 0) => 1.0,
            (n, m) => f32::from(n) / f32::from(m),
        }
    }
}

fn take(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], PiDecodeError> {
    buf.get(offset..offset + len)
        .ok_or(PiDecodeError::TruncatedHeader)
}

/// Parses the header, returning it together with the byte offset of the
/// compressed body.
pub(crate) fn parse(buf: &[u8]) -> Result<(PiHeader, usize), PiDecodeError> {
    if buf.len() < 2 || &buf[..2] != PI_SIGNATURE {
        return Err(PiDecodeError::SignatureInvalid);
    }

    // Comment runs up to a 0x1A byte; an editor-specific area follows it
    // up to a zero terminator.
    let comment_end = 2 + buf[2..]
        .iter()
        .position(|&b| b == 0x1A)
        .ok_or(PiDecodeError::TruncatedHeader)?;
    let comment = SHIFT_JIS.decode(&buf[2..comment_end]).0.into_owned();
    let terminator = comment_end
        + buf[comment_end..]
            .iter()
            .position(|&b| b == 0x00)
            .ok_or(PiDecodeError::TruncatedHeader)?;

    // mode, aspect pair, plane count, editor tag, machine-data length.
    let fixed = take(buf, terminator + 1, 10)?;
    let mode = fixed[0];
    let aspect = (fixed[1], fixed[2]);
    let planes = fixed[3];
    if planes != 4 && planes != 8 {
        return Err(PiDecodeError::UnsupportedPlaneCount(planes));
    }
    let editor = String::from_utf8_lossy(&fixed[4..8]).into_owned();
    let machine_len = BigEndian::read_u16(&fixed[8..10]) as usize;

    let dims_at = terminator + 11 + machine_len;
    let dims = take(buf, dims_at, 4)?;
    let width = BigEndian::read_u16(&dims[..2]);
    let height = BigEndian::read_u16(&dims[2..]);
    if width == 0 || height == 0 {
        return Err(PiDecodeError::InvalidDimensions(width, height));
    }

    let colors = 1usize << planes;
    let raw_palette = take(buf, dims_at + 4, colors * 3)?;
    let palette = build_palette(planes, raw_palette);

    debug!(
        "pi header: {}x{}, {} planes, editor {:?}, comment {:?}",
        width, height, planes, editor, comment
    );

    let header = PiHeader {
        comment,
        mode,
        aspect,
        planes,
        editor,
        width,
        height,
        palette,
    };
    Ok((header, dims_at + 4 + colors * 3))
}

fn build_palette(planes: u8, raw: &[u8]) -> Vec<[u8; 4]> {
    if planes == 4 && raw.iter().all(|&b| b == 0) {
        return DEFAULT_PALETTE.to_vec();
    }
    raw.chunks_exact(3)
        .map(|rgb| [rgb[0], rgb[1], rgb[2], 0xFF])
        .collect()
}

/// Builds a minimal 4x2 PI file for tests.
#[cfg(test)]
pub(crate) fn sample_file(planes: u8, palette: &[u8], body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"Pi");
    // "テスト" in Shift_JIS.
    buf.extend_from_slice(&[0x83, 0x65, 0x83, 0x58, 0x83, 0x67]);
    buf.push(0x1A);
    buf.push(0x00);
    buf.push(0); // mode
    buf.extend_from_slice(&[1, 1]); // aspect
    buf.push(planes);
    buf.extend_from_slice(b"TEST");
    buf.extend_from_slice(&[0, 0]); // machine-data length
    buf.extend_from_slice(&4u16.to_be_bytes());
    buf.extend_from_slice(&2u16.to_be_bytes());
    buf.extend_from_slice(palette);
    buf.extend_from_slice(body);
    buf
}
