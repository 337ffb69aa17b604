use std::io;

/// Errors raised while parsing or decoding a PI file.
///
/// The body-codec variants carry the bit offset into the body stream at
/// which decoding failed.
#[derive(Debug, thiserror::Error)]
pub enum PiDecodeError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid file signature")]
    SignatureInvalid,
    #[error("file ends inside the header")]
    TruncatedHeader,
    #[error("unsupported plane count `{0}`")]
    UnsupportedPlaneCount(u8),
    #[error("invalid image dimensions `{0}x{1}`")]
    InvalidDimensions(u16, u16),
    #[error("bit stream exhausted mid-code at bit {0}")]
    UnexpectedEnd(usize),
    #[error("unrecognised variable-length prefix at bit {0}")]
    InvalidPrefix(usize),
    #[error("bit stream ended at bit {0} with pixels left to produce")]
    TruncatedStream(usize),
}
