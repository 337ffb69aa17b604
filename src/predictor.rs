use crate::bitstream::BitReader;
use crate::error::PiDecodeError;

/// Move-to-front color predictor.
///
/// One ranking row per possible left-neighbor color; each row is a
/// permutation of all palette indices, most recently used first. The bit
/// stream carries the *rank* of the next color within the row selected by
/// the previously emitted pixel, so colors that recur near similar
/// neighbors get the shortest codes.
pub struct ColorPredictor {
    table: Vec<u8>,
    colors: usize,
    prev: u8,
}

impl ColorPredictor {
    /// `planes` must be 4 or 8 (16- or 256-color palette).
    pub fn new(planes: u8) -> Self {
        let colors = 1usize << planes;
        let mut table = vec![0u8; colors * colors];
        // Row for left color `p` starts at `p` and counts down.
        for prev in 0..colors {
            for rank in 0..colors {
                table[prev * colors + rank] = ((colors + prev - rank) % colors) as u8;
            }
        }
        Self {
            table,
            colors,
            prev: 0,
        }
    }

    /// Decodes one palette index and promotes it to the front of the
    /// current row.
    pub fn decode_color(&mut self, bits: &mut BitReader<'_>) -> Result<u8, PiDecodeError> {
        let rank = self.decode_rank(bits)?;
        let row = self.prev as usize * self.colors;
        let color = self.table[row + rank];
        self.table.copy_within(row..row + rank, row + 1);
        self.table[row] = color;
        self.prev = color;
        Ok(color)
    }

    // Rank codes are a short prefix selecting a range, then `extra` bits of
    // offset into it. The 16-color table tops out at prefix `011`; the
    // 256-color table extends the run of 1s up to `01111110`.
    fn decode_rank(&mut self, bits: &mut BitReader<'_>) -> Result<usize, PiDecodeError> {
        let (base, extra) = if bits.pull()? == 1 {
            (0usize, 1u32)
        } else if bits.pull()? == 0 {
            (2, 1)
        } else if self.colors == 16 {
            if bits.pull()? == 0 {
                (4, 2)
            } else {
                (8, 3)
            }
        } else {
            let mut ones = 1u32;
            while bits.pull()? == 1 {
                ones += 1;
                if ones > 6 {
                    return Err(PiDecodeError::InvalidPrefix(bits.bit_position()));
                }
            }
            (2usize << ones, ones + 1)
        };

        let mut offset = 0usize;
        for _ in 0..extra {
            offset = offset << 1 | bits.pull()? as usize;
        }
        Ok(base + offset)
    }
}
