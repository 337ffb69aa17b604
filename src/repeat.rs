use crate::bitstream::BitReader;
use crate::error::PiDecodeError;
use crate::frame::Frame;

// Runs of more than 2^31 blocks cannot occur in a 65535x65535 image.
const MAX_LENGTH_ZEROS: u32 = 30;

/// Source selector for a block-copy run, one 2-dot block at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionCode {
    /// Repeat the previous 2- or 4-pixel tile (see [`Frame::tile_period`]).
    Tile,
    /// The 2 pixels one line above.
    LineAbove,
    /// The 2 pixels two lines above.
    TwoLinesAbove,
    /// One line above, shifted right by one pixel.
    LineAboveRight,
    /// One line above, shifted left by one pixel.
    LineAboveLeft,
}

impl PositionCode {
    fn read(bits: &mut BitReader<'_>) -> Result<Self, PiDecodeError> {
        Ok(match (bits.pull()?, bits.pull()?) {
            (0, 0) => Self::Tile,
            (0, _) => Self::LineAbove,
            (1, 0) => Self::TwoLinesAbove,
            _ => {
                if bits.pull()? == 0 {
                    Self::LineAboveRight
                } else {
                    Self::LineAboveLeft
                }
            }
        })
    }

    // Every source collapses to a plain backward displacement over the
    // linear pixel order, so a run is an overlapping LZ-style copy.
    fn displacement(self, frame: &Frame) -> usize {
        match self {
            Self::Tile => frame.tile_period(),
            Self::LineAbove => frame.width(),
            Self::TwoLinesAbove => frame.width() * 2,
            Self::LineAboveRight => frame.width() - 1,
            Self::LineAboveLeft => frame.width() + 1,
        }
    }

    /// Replays `length` 2-dot blocks from this source onto the frame.
    pub fn copy(self, length: usize, frame: &mut Frame) {
        let distance = self.displacement(frame);
        frame.copy_back(distance, length * 2);
    }
}

/// Decoder for repeat instructions: a position code followed by a run
/// length.
pub struct RepeatEngine {
    prev_position: Option<PositionCode>,
    first_length_seen: bool,
}

impl RepeatEngine {
    pub fn new() -> Self {
        Self {
            prev_position: None,
            first_length_seen: false,
        }
    }

    /// Reads one instruction. Returns `None` when the position code repeats
    /// the previous one: such an instruction carries no length and hands
    /// control back to the literal-color phase.
    pub fn read_instruction(
        &mut self,
        bits: &mut BitReader<'_>,
    ) -> Result<Option<(PositionCode, usize)>, PiDecodeError> {
        let position = PositionCode::read(bits)?;
        if self.prev_position == Some(position) {
            self.prev_position = None;
            return Ok(None);
        }
        // Code 0 may legitimately recur, so it never arms the equality
        // check for the following instruction.
        self.prev_position = if position == PositionCode::Tile {
            None
        } else {
            Some(position)
        };
        let length = self.read_length(bits)?;
        Ok(Some((position, length)))
    }

    // Run lengths are gamma-style: a run of zeros, a 1, then as many offset
    // bits as there were zeros. The very first length of the stream is
    // stored one too high and adjusted here.
    fn read_length(&mut self, bits: &mut BitReader<'_>) -> Result<usize, PiDecodeError> {
        let mut zeros = 0u32;
        while bits.pull()? == 0 {
            zeros += 1;
            if zeros > MAX_LENGTH_ZEROS {
                return Err(PiDecodeError::InvalidPrefix(bits.bit_position()));
            }
        }
        let mut offset = 0usize;
        for _ in 0..zeros {
            offset = offset << 1 | bits.pull()? as usize;
        }
        let mut length = (1usize << zeros) + offset;
        if !self.first_length_seen {
            self.first_length_seen = true;
            length -= 1;
        }
        Ok(length)
    }
}

#[cfg(test)]
mod tests {
    use super::{PositionCode, RepeatEngine};
    use crate::bitstream::{pack_bits, BitReader};
    use crate::error::PiDecodeError;

    fn engine() -> RepeatEngine {
        let mut engine = RepeatEngine::new();
        engine.first_length_seen = true;
        engine
    }

    fn read_one(engine: &mut RepeatEngine, bits: &[u8]) -> Option<(PositionCode, usize)> {
        let body = pack_bits(bits);
        let mut reader = BitReader::new(&body);
        engine.read_instruction(&mut reader).unwrap()
    }

    #[test]
    fn position_codes() {
        assert_eq!(
            read_one(&mut engine(), &[0, 0, 1]),
            Some((PositionCode::Tile, 1))
        );
        assert_eq!(
            read_one(&mut engine(), &[0, 1, 1]),
            Some((PositionCode::LineAbove, 1))
        );
        assert_eq!(
            read_one(&mut engine(), &[1, 0, 1]),
            Some((PositionCode::TwoLinesAbove, 1))
        );
        assert_eq!(
            read_one(&mut engine(), &[1, 1, 0, 1]),
            Some((PositionCode::LineAboveRight, 1))
        );
        assert_eq!(
            read_one(&mut engine(), &[1, 1, 1, 1]),
            Some((PositionCode::LineAboveLeft, 1))
        );
    }

    #[test]
    fn length_codes() {
        assert_eq!(read_one(&mut engine(), &[0, 0, 1]).unwrap().1, 1);
        assert_eq!(read_one(&mut engine(), &[0, 0, 0, 1, 0]).unwrap().1, 2);
        assert_eq!(read_one(&mut engine(), &[0, 0, 0, 1, 1]).unwrap().1, 3);
        assert_eq!(read_one(&mut engine(), &[0, 0, 0, 0, 1, 0, 0]).unwrap().1, 4);
        assert_eq!(read_one(&mut engine(), &[0, 0, 0, 0, 1, 1, 1]).unwrap().1, 7);
        assert_eq!(
            read_one(&mut engine(), &[0, 0, 0, 0, 0, 1, 0, 1, 1]).unwrap().1,
            11
        );
    }

    #[test]
    fn first_length_of_the_stream_is_one_short() {
        let mut engine = RepeatEngine::new();
        assert_eq!(read_one(&mut engine, &[0, 0, 0, 1, 1]).unwrap().1, 2);
        // Only the first decoded length is adjusted.
        assert_eq!(read_one(&mut engine, &[0, 0, 0, 1, 1]).unwrap().1, 3);
    }

    #[test]
    fn repeated_position_voids_without_consuming_a_length() {
        let mut engine = engine();
        assert!(read_one(&mut engine, &[0, 1, 1]).is_some());

        let body = pack_bits(&[0, 1, 1, 1, 1]);
        let mut reader = BitReader::new(&body);
        assert_eq!(engine.read_instruction(&mut reader).unwrap(), None);
        assert_eq!(reader.bit_position(), 2);
        assert_eq!(engine.prev_position, None);
    }

    #[test]
    fn void_resets_the_stored_position() {
        let mut engine = engine();
        assert!(read_one(&mut engine, &[0, 1, 1]).is_some());
        assert_eq!(read_one(&mut engine, &[0, 1]), None);
        // After the reset the same position is accepted again.
        assert!(read_one(&mut engine, &[0, 1, 1]).is_some());
    }

    #[test]
    fn tile_code_may_recur() {
        let mut engine = engine();
        assert_eq!(
            read_one(&mut engine, &[0, 0, 1]),
            Some((PositionCode::Tile, 1))
        );
        assert_eq!(
            read_one(&mut engine, &[0, 0, 1]),
            Some((PositionCode::Tile, 1))
        );
    }

    #[test]
    fn unbounded_zero_run_is_rejected() {
        let mut engine = engine();
        let mut bits = vec![0, 1];
        bits.extend(std::iter::repeat(0).take(40));
        // A set bit at the end keeps the zeroed-tail trim out of the way.
        bits.push(1);
        let body = pack_bits(&bits);
        let mut reader = BitReader::new(&body);
        assert!(matches!(
            engine.read_instruction(&mut reader),
            Err(PiDecodeError::InvalidPrefix(_))
        ));
    }
}
