use byteorder::{ByteOrder, LittleEndian};

use gifenc_core::models::{Image, ImageIOError, ImageWriter, ImageWriterOptions};

use crate::common::{
    BLOCK_TERMINATOR,
    COMMENT_LABEL,
    EXTENSION_INTRODUCER,
    GLOBAL_COLOR_TABLE_FLAG,
    GRAPHIC_CONTROL_LABEL,
    IMAGE_SEPARATOR,
    MAX_SUB_BLOCK_SIZE,
    MIN_CODE_SIZE,
    SIGNATURE,
    TRAILER,
    VERSION_89A,
};
use crate::errors::GIFWriterError;
use crate::lzw::LZWEncoder;
use crate::packer::pack_codes;
use crate::palette::{PALETTE, PALETTE_SIZE, Palette};

pub const OPTION_COMMENT: &str = "comment";

const COLOR_RESOLUTION: u8 = 7; // 8 bits per primary color, minus one

pub struct GIFWriter {
}

impl GIFWriter {

    pub fn new() -> Self {
        GIFWriter {
        }
    }
}

impl ImageWriter for GIFWriter {

    fn write(&self, image: &Image, options: &ImageWriterOptions) -> Result<Vec<u8>, ImageIOError> {
        let comment = options.get_string(OPTION_COMMENT).filter(|v| !v.is_empty());

        encode_with_comment(&image.to_rgb_buffer(), image.width, image.height, comment)
            .map_err(|err| ImageIOError::FailedToWrite {
                description: format!("failed to write gif: {}", err),
            })
    }
}

/// Encodes tightly packed RGB triplets (row-major) as a single-frame GIF.
pub fn encode(buffer: &[u8], width: usize, height: usize) -> Result<Vec<u8>, GIFWriterError> {
    encode_with_comment(buffer, width, height, None)
}

pub fn encode_with_comment(buffer: &[u8], width: usize, height: usize, comment: Option<&str>) -> Result<Vec<u8>, GIFWriterError> {
    let (width, height) = check_dimensions(buffer, width, height)?;

    let indexes = PALETTE.quantize_buffer(buffer)?;
    debug!("quantized {} pixels of a {}x{} image", indexes.len(), width, height);

    let image_data = write_image_data(&indexes)?;

    let mut data = Vec::with_capacity(13 + PALETTE_SIZE * 3 + image_data.len() + 32);
    data.extend_from_slice(&write_header(width, height));
    data.extend_from_slice(&write_color_table(&PALETTE));
    if let Some(comment) = comment {
        data.extend_from_slice(&write_comment_extension(comment));
    }
    data.extend_from_slice(&write_graphic_control_extension());
    data.extend_from_slice(&write_local_image_descriptor(width, height));
    data.extend_from_slice(&image_data);
    data.push(TRAILER);

    debug!("gif written, {} bytes total", data.len());

    Ok(data)
}

fn check_dimensions(buffer: &[u8], width: usize, height: usize) -> Result<(u16, u16), GIFWriterError> {
    let expected = width.checked_mul(height)
        .and_then(|v| v.checked_mul(3))
        .ok_or_else(|| GIFWriterError::InvalidDimensions {
            description: format!("{}x{} is too large", width, height),
        })?;

    if buffer.len() != expected {
        return Err(GIFWriterError::InvalidDimensions {
            description: format!("expected {} bytes for {}x{} pixels, got {}", expected, width, height, buffer.len()),
        });
    }

    if expected == 0 {
        return Err(GIFWriterError::EmptyInput);
    }

    if width > u16::MAX as usize || height > u16::MAX as usize {
        return Err(GIFWriterError::InvalidDimensions {
            description: format!("{}x{} does not fit into 16 bit gif dimensions", width, height),
        });
    }

    Ok((width as u16, height as u16))
}

// header and logical screen descriptor
fn write_header(width: u16, height: u16) -> Vec<u8> {
    let mut data: Vec<u8> = vec![0; 13];

    data[0..3].copy_from_slice(SIGNATURE);
    data[3..6].copy_from_slice(VERSION_89A);

    LittleEndian::write_u16(&mut data[6..8], width);
    LittleEndian::write_u16(&mut data[8..10], height);

    let size_of_global_color_table = PALETTE_SIZE.trailing_zeros() as u8 - 1;
    let mut packed: u8 = 0;
    packed |= size_of_global_color_table;
    packed |= COLOR_RESOLUTION << 4;
    packed |= GLOBAL_COLOR_TABLE_FLAG;
    data[10] = packed;

    // data[11] is background color, data[12] is aspect ratio, both stay 0

    data
}

fn write_color_table(palette: &Palette) -> Vec<u8> {
    let mut data = Vec::with_capacity(palette.colors().len() * 3);

    for color in palette.colors() {
        data.push(color.red);
        data.push(color.green);
        data.push(color.blue);
    }

    data
}

fn write_comment_extension(comment: &str) -> Vec<u8> {
    let mut data = vec![EXTENSION_INTRODUCER, COMMENT_LABEL];
    data.append(&mut write_sub_blocks(comment.as_bytes()));
    data
}

fn write_graphic_control_extension() -> Vec<u8> {
    vec![
        EXTENSION_INTRODUCER,
        GRAPHIC_CONTROL_LABEL,
        0x04, // block size
        0x00, // no disposal method, no user input, no transparency
        0x00, 0x00, // delay time
        0x00, // transparent color index
        BLOCK_TERMINATOR,
    ]
}

fn write_local_image_descriptor(width: u16, height: u16) -> Vec<u8> {
    let mut data: Vec<u8> = vec![0; 10];
    data[0] = IMAGE_SEPARATOR;

    LittleEndian::write_u16(&mut data[1..3], 0); // left
    LittleEndian::write_u16(&mut data[3..5], 0); // top
    LittleEndian::write_u16(&mut data[5..7], width);
    LittleEndian::write_u16(&mut data[7..9], height);

    data[9] = 0; // no local color table, not interlaced

    data
}

fn write_image_data(indexes: &[u8]) -> Result<Vec<u8>, GIFWriterError> {
    let codes = LZWEncoder::new().encode(indexes)?;
    let compressed_data = pack_codes(&codes);

    let mut data = vec![MIN_CODE_SIZE];
    data.append(&mut write_sub_blocks(&compressed_data));

    Ok(data)
}

/// Splits data into length-prefixed sub-blocks followed by a block terminator.
fn write_sub_blocks(data: &[u8]) -> Vec<u8> {
    let mut blocks = Vec::with_capacity(data.len() + data.len() / MAX_SUB_BLOCK_SIZE + 2);

    for chunk in data.chunks(MAX_SUB_BLOCK_SIZE) {
        blocks.push(chunk.len() as u8);
        blocks.extend_from_slice(chunk);
    }

    blocks.push(BLOCK_TERMINATOR);
    blocks
}
