use crate::dictionary::Code;
use crate::lzw::CodeStreamEntry;

/// Codes are spread over at most three bytes.
pub const MAX_PACKED_WIDTH: u8 = 16;

/// Packs variable width codes least significant bit first, the way GIF
/// decoders read them.
pub struct BitPacker {
    output: Vec<u8>,
    nbit: usize,
}

impl BitPacker {

    pub fn new() -> Self {
        BitPacker {
            output: Vec::new(),
            nbit: 0,
        }
    }

    pub fn push(&mut self, code: Code, width: u8) {
        debug_assert!(width <= MAX_PACKED_WIDTH, "code width {} does not fit the packing window", width);

        let code = code as u32;
        let width = width as usize;
        let shift = self.nbit % 8;
        let index = self.nbit / 8;

        self.write_byte(index, code << shift);

        if shift + width > 8 {
            self.write_byte(index + 1, code >> (8 - shift));
        }

        if shift + width > 16 {
            self.write_byte(index + 2, code >> (16 - shift));
        }

        self.nbit += width;
    }

    pub fn bits_written(&self) -> usize {
        self.nbit
    }

    pub fn finish(self) -> Vec<u8> {
        self.output
    }

    fn write_byte(&mut self, index: usize, bits: u32) {
        if index >= self.output.len() {
            self.output.resize(index + 1, 0);
        }

        self.output[index] |= (bits & 0xFF) as u8;
    }
}

impl Default for BitPacker {

    fn default() -> Self {
        Self::new()
    }
}

pub fn pack_codes(codes: &[CodeStreamEntry]) -> Vec<u8> {
    let mut packer = BitPacker::new();

    for entry in codes {
        packer.push(entry.code, entry.width);
    }

    trace!("packed {} codes into {} bits", codes.len(), packer.bits_written());

    packer.finish()
}
