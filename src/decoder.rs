use crate::bitstream::BitReader;
use crate::error::PiDecodeError;
use crate::frame::Frame;
use crate::predictor::ColorPredictor;
use crate::repeat::RepeatEngine;

/// Decoder for the compressed PI body.
///
/// The stream opens with one literal color pair, then alternates between
/// block-copy runs and further literal pairs. A repeat instruction whose
/// position code matches the previous one carries no run and switches the
/// decoder back to literal pairs; after each literal pair a single
/// continuation bit picks the next phase.
pub struct BodyDecoder<'a> {
    bits: BitReader<'a>,
    predictor: ColorPredictor,
    repeats: RepeatEngine,
    frame: Frame,
}

impl<'a> BodyDecoder<'a> {
    /// `planes` must be 4 or 8; callers validate it when parsing the
    /// header.
    pub fn new(width: u16, height: u16, planes: u8, body: &'a [u8]) -> Self {
        Self {
            bits: BitReader::new(body),
            predictor: ColorPredictor::new(planes),
            repeats: RepeatEngine::new(),
            frame: Frame::new(width, height),
        }
    }

    /// Runs the decoder to completion, producing one palette index per
    /// pixel in row-major order.
    pub fn decode(mut self) -> Result<Vec<u8>, PiDecodeError> {
        self.emit_pair()?;
        loop {
            // Block-copy phase.
            loop {
                if self.frame.is_full() {
                    return Ok(self.frame.into_pixels());
                }
                if self.bits.eof() {
                    return Err(PiDecodeError::TruncatedStream(self.bits.bit_position()));
                }
                match self.repeats.read_instruction(&mut self.bits)? {
                    Some((position, length)) => position.copy(length, &mut self.frame),
                    None => break,
                }
            }
            // Literal color phase.
            loop {
                if self.frame.is_full() {
                    return Ok(self.frame.into_pixels());
                }
                if self.bits.eof() {
                    return Err(PiDecodeError::TruncatedStream(self.bits.bit_position()));
                }
                self.emit_pair()?;
                if self.frame.is_full() {
                    return Ok(self.frame.into_pixels());
                }
                if self.bits.pull()? == 0 {
                    break;
                }
            }
        }
    }

    fn emit_pair(&mut self) -> Result<(), PiDecodeError> {
        let first = self.predictor.decode_color(&mut self.bits)?;
        let second = self.predictor.decode_color(&mut self.bits)?;
        self.frame.push(first);
        self.frame.push(second);
        Ok(())
    }
}
