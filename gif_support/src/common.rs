// see https://www.fileformat.info/format/gif/egff.htm

pub const SIGNATURE: &[u8; 3] = b"GIF";
pub const VERSION_89A: &[u8; 3] = b"89a";
pub const VERSION_87A: &[u8; 3] = b"87a";

pub const EXTENSION_INTRODUCER: u8 = 0x21;
pub const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
pub const COMMENT_LABEL: u8 = 0xFE;
pub const IMAGE_SEPARATOR: u8 = 0x2C;
pub const BLOCK_TERMINATOR: u8 = 0x00;
pub const TRAILER: u8 = 0x3B;

pub const GLOBAL_COLOR_TABLE_FLAG: u8 = 0b1000_0000;
pub const LOCAL_COLOR_TABLE_FLAG: u8 = 0b1000_0000;
pub const INTERLACE_FLAG: u8 = 0b0100_0000;

pub const MAX_SUB_BLOCK_SIZE: usize = 255;

/// Bits per palette index, also the declared LZW minimum code size.
pub const MIN_CODE_SIZE: u8 = 8;
pub const MAX_CODE_SIZE: u8 = 12;
pub const CLEAR_CODE: u16 = 1 << MIN_CODE_SIZE;
pub const END_CODE: u16 = CLEAR_CODE + 1;
pub const MAX_DICTIONARY_SIZE: usize = 1 << MAX_CODE_SIZE;

pub fn should_increase_code_size(dictionary_size: usize, code_size: u8) -> bool {
    dictionary_size == 1 << code_size && code_size < MAX_CODE_SIZE
}
