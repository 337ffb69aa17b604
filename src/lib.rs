//! PI Image Format Decoder
//!
//! PI is a palette-indexed raster format from Japanese personal computers.
//! The body is a bit stream combining a move-to-front color predictor with
//! 2-dot block copies from five relative source positions.

mod bitstream;
mod decoder;
mod error;
mod frame;
mod header;
mod pi;
mod predictor;
mod repeat;

pub use self::decoder::BodyDecoder;
pub use self::error::PiDecodeError;
pub use self::header::PiHeader;
pub use self::pi::PiFile;

#[cfg(feature = "to_image")]
pub use self::pi::PiImageConvertError;
