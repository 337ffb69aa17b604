use std::io::Read;

use crate::decoder::BodyDecoder;
use crate::error::PiDecodeError;
use crate::header::{self, PiHeader};

/// A decoded PI image: the parsed header plus one palette index per pixel,
/// row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiFile {
    header: PiHeader,
    pixels: Vec<u8>,
}

impl PiFile {
    /// Reads and decodes a PI file from `reader`.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, PiDecodeError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::parse(&buf)
    }

    /// Decodes a PI file already held in memory.
    pub fn parse(buf: &[u8]) -> Result<Self, PiDecodeError> {
        let (header, body_at) = header::parse(buf)?;
        let pixels = BodyDecoder::new(header.width, header.height, header.planes, &buf[body_at..])
            .decode()?;
        Ok(Self { header, pixels })
    }

    pub fn header(&self) -> &PiHeader {
        &self.header
    }

    pub fn width(&self) -> u16 {
        self.header.width
    }

    pub fn height(&self) -> u16 {
        self.header.height
    }

    pub fn planes(&self) -> u8 {
        self.header.planes
    }

    /// Palette indices, one per pixel, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(feature = "to_image")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PiImageConvertError {
    #[error("invalid raw pixel color buffer")]
    InvalidRawBuffer,
}

#[cfg(feature = "to_image")]
impl TryFrom<PiFile> for image::DynamicImage {
    type Error = PiImageConvertError;

    fn try_from(value: PiFile) -> Result<Self, PiImageConvertError> {
        let mut raw = Vec::with_capacity(value.pixels.len() * 4);
        for &index in &value.pixels {
            raw.extend_from_slice(&value.header.palette[index as usize]);
        }
        let rgba = image::ImageBuffer::from_raw(
            u32::from(value.width()),
            u32::from(value.height()),
            raw,
        )
        .ok_or(PiImageConvertError::InvalidRawBuffer)?;
        Ok(image::DynamicImage::ImageRgba8(rgba))
    }
}

#[cfg(test)]
mod tests {
    use super::PiFile;
    use crate::bitstream::pack_bits;
    use crate::error::PiDecodeError;
    use crate::header::sample_file;

    #[test]
    fn decodes_a_whole_file() {
        // Solid palette-0 body for the fixture's 4x2 canvas.
        let body = pack_bits(&[1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0]);
        let buf = sample_file(4, &[0x33; 48], &body);
        let file = PiFile::read(&buf[..]).unwrap();
        assert_eq!((file.width(), file.height()), (4, 2));
        assert_eq!(file.planes(), 4);
        assert_eq!(file.pixels(), [0; 8]);
        assert_eq!(file.header().comment, "テスト");
    }

    #[test]
    fn body_errors_pass_through() {
        let buf = sample_file(4, &[0x33; 48], &[0x9F, 0, 0, 0, 0]);
        assert!(matches!(
            PiFile::parse(&buf),
            Err(PiDecodeError::TruncatedStream(8))
        ));
    }

    #[cfg(feature = "to_image")]
    #[test]
    fn converts_to_an_rgba_image() {
        use image::{DynamicImage, GenericImageView};

        let body = pack_bits(&[1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0]);
        let buf = sample_file(4, &[0; 48], &body);
        let file = PiFile::parse(&buf).unwrap();
        let img = DynamicImage::try_from(file).unwrap();
        assert_eq!(img.dimensions(), (4, 2));
        // Index 0 of the stock palette is transparent black.
        assert_eq!(img.get_pixel(0, 0), image::Rgba([0, 0, 0, 0]));
    }
}
