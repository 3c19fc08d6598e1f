use bit_vec::BitVec;
use byteorder::{ByteOrder, LittleEndian};

use gifenc_core::models::{Image, ImageIOError, ImageReader, Pixel};

use crate::common::{
    COMMENT_LABEL,
    EXTENSION_INTRODUCER,
    GLOBAL_COLOR_TABLE_FLAG,
    GRAPHIC_CONTROL_LABEL,
    IMAGE_SEPARATOR,
    INTERLACE_FLAG,
    LOCAL_COLOR_TABLE_FLAG,
    MAX_DICTIONARY_SIZE,
    SIGNATURE,
    TRAILER,
    VERSION_87A,
    VERSION_89A,
    should_increase_code_size,
};
use crate::errors::GIFReaderError;

const HEADER_SIZE: usize = 13;
const IMAGE_DESCRIPTOR_SIZE: usize = 9; // without the separator

pub struct GIFReader {
}

pub(crate) struct GIF {
    pub width: usize,
    pub height: usize,
    pub color_table: Vec<Pixel>,
    pub indexes: Vec<u8>,
    pub comments: Vec<String>,
}

struct Header {
    screen_width: u16,
    screen_height: u16,
    number_of_global_color_table_entries: usize,
}

struct LocalImageDescriptor {
    width: u16,
    height: u16,
}

impl GIFReader {

    pub fn new() -> Self {
        GIFReader {}
    }
}

impl ImageReader for GIFReader {

    fn read(&self, data: &[u8]) -> Result<Vec<Image>, ImageIOError> {
        let gif = read_gif(data).map_err(|err| ImageIOError::FailedToRead {
            description: format!("failed to read gif: {}", err)
        })?;

        let pixels = gif.indexes.iter()
            .map(|index| gif.color_table.get(*index as usize).copied())
            .collect::<Option<Vec<Pixel>>>()
            .ok_or_else(|| ImageIOError::FailedToRead {
                description: "color index points outside of the global color table".to_string(),
            })?;

        Ok(vec![Image {
            width: gif.width,
            height: gif.height,
            pixels,
        }])
    }
}

pub(crate) fn read_gif(data: &[u8]) -> Result<GIF, GIFReaderError> {
    let header = read_header(data)?;
    let data = &data[HEADER_SIZE..];

    let (color_table, mut data) = read_global_color_table(data, header.number_of_global_color_table_entries)?;

    let mut comments = Vec::new();
    let mut image: Option<(LocalImageDescriptor, Vec<u8>)> = None;

    loop {
        let (block, rest) = split_byte(data, "block introducer")?;

        data = match block {
            EXTENSION_INTRODUCER => {
                let (label, rest) = split_byte(rest, "extension label")?;
                let (payload, rest) = read_sub_blocks(rest)?;

                match label {
                    GRAPHIC_CONTROL_LABEL => read_graphic_control_extension(&payload)?,
                    COMMENT_LABEL => comments.push(String::from_utf8_lossy(&payload).to_string()),
                    other => trace!("skipping extension block with label {:x}", other),
                }

                rest
            },
            IMAGE_SEPARATOR => {
                if image.is_some() {
                    return Err(GIFReaderError::NotImplemented {
                        description: "gif contains more than one image".to_string(),
                    });
                }

                let (descriptor, rest) = read_local_image_descriptor(rest)?;
                let (indexes, rest) = read_image_data(rest)?;

                let expected = descriptor.width as usize * descriptor.height as usize;
                if indexes.len() != expected {
                    return Err(GIFReaderError::InvalidEncodedData {
                        description: format!("expected {} pixels, decoded {}", expected, indexes.len()),
                    });
                }

                image = Some((descriptor, indexes));
                rest
            },
            TRAILER => break,
            other => return Err(GIFReaderError::InvalidBlock {
                description: format!("unexpected block introducer: {:x}", other),
            }),
        };
    }

    let (descriptor, indexes) = image.ok_or_else(|| GIFReaderError::InvalidBlock {
        description: "gif does not contain an image".to_string(),
    })?;

    trace!(
        "logical screen is {}x{}, image is {}x{}",
        header.screen_width,
        header.screen_height,
        descriptor.width,
        descriptor.height
    );

    Ok(GIF {
        width: descriptor.width as usize,
        height: descriptor.height as usize,
        color_table,
        indexes,
        comments,
    })
}

fn read_header(data: &[u8]) -> Result<Header, GIFReaderError> {
    if data.len() < HEADER_SIZE {
        return Err(GIFReaderError::UnexpectedEnd {
            description: format!("header needs {} bytes, got {}", HEADER_SIZE, data.len()),
        });
    }

    if &data[0..3] != SIGNATURE {
        return Err(GIFReaderError::InvalidHeader {
            description: format!("Unexpected signature for GIF: {:x?}", &data[0..3]),
        });
    }

    let version = &data[3..6];
    if version != VERSION_89A && version != VERSION_87A {
        return Err(GIFReaderError::NotImplemented {
            description: format!("Support for GIF version {:x?} not implemented", version)
        });
    }

    let screen_width = LittleEndian::read_u16(&data[6..8]);
    let screen_height = LittleEndian::read_u16(&data[8..10]);

    let packed: u8 = data[10];

    let size_of_global_color_table = packed & 0b111;
    let color_table_sort_flag = (packed & 0b1000) >> 3;
    let color_resolution = (packed & 0b111_0000) >> 4;
    let global_color_table = packed & GLOBAL_COLOR_TABLE_FLAG != 0;
    let number_of_global_color_table_entries = 1 << (size_of_global_color_table + 1);

    trace!("packed is {:?}", packed);
    trace!("color table sort flag: {}", color_table_sort_flag);
    trace!("color resolution: {}", color_resolution);
    trace!("number of global color table entries: {}", number_of_global_color_table_entries);

    if !global_color_table {
        return Err(GIFReaderError::NotImplemented {
            description: "this gif does not use global color table".to_string(),
        });
    }

    trace!("background color: {}, aspect ratio: {}", data[11], data[12]);

    Ok(Header {
        screen_width,
        screen_height,
        number_of_global_color_table_entries,
    })
}

fn read_global_color_table(data: &[u8], number_of_entries: usize) -> Result<(Vec<Pixel>, &[u8]), GIFReaderError> {
    let (table, rest) = split_at(data, number_of_entries * 3, "global color table")?;

    let colors = table.chunks_exact(3)
        .map(|rgb| Pixel::from_rgb(rgb[0], rgb[1], rgb[2]))
        .collect();

    Ok((colors, rest))
}

fn read_graphic_control_extension(payload: &[u8]) -> Result<(), GIFReaderError> {
    if payload.len() != 4 {
        return Err(GIFReaderError::InvalidBlock {
            description: format!("graphic control extension has {} bytes, expected 4", payload.len()),
        });
    }

    trace!(
        "graphic control: packed {:b}, delay {}, transparent index {}",
        payload[0],
        LittleEndian::read_u16(&payload[1..3]),
        payload[3]
    );

    Ok(())
}

fn read_local_image_descriptor(data: &[u8]) -> Result<(LocalImageDescriptor, &[u8]), GIFReaderError> {
    let (descriptor, rest) = split_at(data, IMAGE_DESCRIPTOR_SIZE, "image descriptor")?;

    let _left = LittleEndian::read_u16(&descriptor[0..2]);
    let _top = LittleEndian::read_u16(&descriptor[2..4]);
    let width = LittleEndian::read_u16(&descriptor[4..6]);
    let height = LittleEndian::read_u16(&descriptor[6..8]);

    let packed = descriptor[8];
    if packed & LOCAL_COLOR_TABLE_FLAG != 0 {
        return Err(GIFReaderError::NotImplemented {
            description: "Local color tables are not supported".to_string(),
        });
    }

    if packed & INTERLACE_FLAG != 0 {
        return Err(GIFReaderError::NotImplemented {
            description: "Interlaced images are not supported".to_string(),
        });
    }

    Ok((LocalImageDescriptor { width, height }, rest))
}

fn read_image_data(data: &[u8]) -> Result<(Vec<u8>, &[u8]), GIFReaderError> {
    let (min_code_size, data) = split_byte(data, "lzw minimum code size")?;
    if !(2..=8).contains(&min_code_size) {
        return Err(GIFReaderError::InvalidEncodedData {
            description: format!("unsupported lzw minimum code size: {}", min_code_size),
        });
    }

    let (compressed_data, rest) = read_sub_blocks(data)?;
    let indexes = decode_lzw(&compressed_data, min_code_size)?;

    Ok((indexes, rest))
}

/// Concatenates length-prefixed sub-blocks up to and including the terminator.
fn read_sub_blocks(mut data: &[u8]) -> Result<(Vec<u8>, &[u8]), GIFReaderError> {
    let mut payload = Vec::new();

    loop {
        let (size, rest) = split_byte(data, "sub-block size")?;
        if size == 0 {
            return Ok((payload, rest));
        }

        let (block, rest) = split_at(rest, size as usize, "sub-block")?;
        payload.extend_from_slice(block);
        data = rest;
    }
}

pub(crate) fn decode_lzw(data: &[u8], min_code_size: u8) -> Result<Vec<u8>, GIFReaderError> {
    let bits = bit_vec_for_source_bytes(data);

    let mut indexes: Vec<u8> = Vec::new();
    let mut dictionary: Vec<Vec<u8>> = Vec::new(); // index is a key
    let (clear_code, end_code) = init_dictionary(&mut dictionary, min_code_size);
    let mut code_size = min_code_size + 1;
    let mut offset = 0;
    let mut prev_code: Option<usize> = None;

    while offset + code_size as usize <= bits.len() {
        let code = read_bits(&bits, offset, code_size) as usize;
        offset += code_size as usize;

        if code == clear_code {
            init_dictionary(&mut dictionary, min_code_size);
            code_size = min_code_size + 1;
            prev_code = None;
            continue;
        }

        if code == end_code {
            return Ok(indexes);
        }

        if code < dictionary.len() {
            let this_code_value = dictionary[code].clone();

            if let Some(prev_code) = prev_code {
                if dictionary.len() < MAX_DICTIONARY_SIZE {
                    let mut prev_code_value = dictionary[prev_code].clone();
                    prev_code_value.push(this_code_value[0]);
                    dictionary.push(prev_code_value);
                }
            }

            indexes.extend_from_slice(&this_code_value);
        } else if code == dictionary.len() {
            // match to an entry that has just been encoded
            let prev_code = prev_code.ok_or_else(|| GIFReaderError::InvalidEncodedData {
                description: "Expected prev code to be present when there is a match to entry which has just been encoded".to_string(),
            })?;

            let mut prev_code_value = dictionary[prev_code].clone();
            prev_code_value.push(prev_code_value[0]);
            indexes.extend_from_slice(&prev_code_value);
            dictionary.push(prev_code_value);
        } else {
            return Err(GIFReaderError::InvalidEncodedData {
                description: format!("code {} is past the end of the dictionary ({} entries)", code, dictionary.len()),
            });
        }

        prev_code = Some(code);

        if should_increase_code_size(dictionary.len(), code_size) {
            code_size += 1;
        }
    }

    trace!("lzw data ended without an end code, {} bits left over", bits.len() - offset);

    Ok(indexes)
}

fn init_dictionary(dictionary: &mut Vec<Vec<u8>>, min_code_size: u8) -> (usize, usize) {
    dictionary.clear();

    for i in 0..(1usize << min_code_size) {
        dictionary.push(vec![i as u8]);
    }

    let clear_index = dictionary.len();
    dictionary.push(Vec::new());

    let end_index = dictionary.len();
    dictionary.push(Vec::new());

    (clear_index, end_index)
}

fn read_bits(bits: &BitVec, offset: usize, total: u8) -> u16 {
    let mut result = 0;

    for i in (0..total as usize).rev() {
        result <<= 1;
        if bits[offset + i] {
            result |= 1;
        }
    }

    result
}

fn bit_vec_for_source_bytes(data: &[u8]) -> BitVec {
    BitVec::from_fn(data.len() * 8, |x| (data[x / 8] >> (x % 8)) & 0b1 == 1)
}

fn split_byte<'a>(data: &'a [u8], what: &str) -> Result<(u8, &'a [u8]), GIFReaderError> {
    match data.split_first() {
        Some((byte, rest)) => Ok((*byte, rest)),
        None => Err(GIFReaderError::UnexpectedEnd {
            description: format!("expected {}", what),
        }),
    }
}

fn split_at<'a>(data: &'a [u8], size: usize, what: &str) -> Result<(&'a [u8], &'a [u8]), GIFReaderError> {
    if data.len() < size {
        return Err(GIFReaderError::UnexpectedEnd {
            description: format!("{} needs {} bytes, got {}", what, size, data.len()),
        });
    }

    Ok(data.split_at(size))
}

#[cfg(test)]
mod tests {
    use crate::writer::encode;

    use super::*;

    #[test]
    fn test_bitvec_offsets() {
        let data: Vec<u8> = vec![0x00, 0x0B, 0x04, 0x04];
        let bits = bit_vec_for_source_bytes(&data);

        assert_eq!(read_bits(&bits, 0, 9), 256);
        assert_eq!(read_bits(&bits, 9, 9), 5);
        assert_eq!(read_bits(&bits, 18, 9), 257);
        assert_eq!(read_bits(&bits, 8, 4), 0b1011);
    }

    #[test]
    fn test_decode_repeated_symbol() {
        // clear, 0, 258, 0, end
        let codes: [u16; 5] = [256, 0, 258, 0, 257];
        let mut bits = BitVec::new();
        for code in codes.iter() {
            for i in 0..9 {
                bits.push((code >> i) & 0b1 == 1);
            }
        }
        let mut data = vec![0u8; (bits.len() + 7) / 8];
        for (i, bit) in bits.iter().enumerate() {
            if bit {
                data[i / 8] |= 1 << (i % 8);
            }
        }

        let indexes = decode_lzw(&data, 8).expect("failed to decode lzw data");

        assert_eq!(indexes, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_decode_rejects_unknown_code() {
        // clear, then 300 which is past the dictionary
        let data = vec![0x00, 0x59, 0x02];

        assert!(matches!(decode_lzw(&data, 8), Err(GIFReaderError::InvalidEncodedData { .. })));
    }

    #[test]
    fn test_read_encoded_image() {
        let buffer = vec![
            255, 0, 0,     0, 255, 0,
            0, 0, 255,     255, 255, 255,
        ];
        let data = encode(&buffer, 2, 2).expect("failed to encode image");

        let images = GIFReader::new().read(&data).expect("failed to read image");
        let image = &images[0];

        assert_eq!(image.width, 2);
        assert_eq!(image.height, 2);
        assert_eq!(image.get_pixel(0, 0), Pixel::from_rgb(255, 0, 0));
        assert_eq!(image.get_pixel(1, 0), Pixel::from_rgb(0, 255, 0));
        assert_eq!(image.get_pixel(0, 1), Pixel::from_rgb(0, 0, 252));
        assert_eq!(image.get_pixel(1, 1), Pixel::from_rgb(255, 255, 252));
    }

    #[test]
    fn test_read_skips_application_extension() {
        let data = encode(&[10, 200, 90], 1, 1).expect("failed to encode image");

        let netscape_loop: Vec<u8> = [
            &[0x21, 0xFF, 0x0B][..],
            &b"NETSCAPE2.0"[..],
            &[0x03, 0x01, 0x00, 0x00, 0x00][..],
        ].concat();
        let gct_end = HEADER_SIZE + 256 * 3;
        let data = [&data[..gct_end], &netscape_loop[..], &data[gct_end..]].concat();

        let gif = read_gif(&data).expect("failed to read image with application extension");
        assert_eq!(gif.indexes, vec![gif_index(0, 153, 84)]);
        assert!(gif.comments.is_empty());
    }

    fn gif_index(red: u8, green: u8, blue: u8) -> u8 {
        crate::palette::PALETTE.quantize(red, green, blue).expect("failed to quantize")
    }

    #[test]
    fn test_read_invalid_signature() {
        let mut data = encode(&[0, 0, 0], 1, 1).expect("failed to encode image");
        data[0] = b'J';

        assert!(matches!(read_gif(&data), Err(GIFReaderError::InvalidHeader { .. })));
    }

    #[test]
    fn test_read_truncated_data() {
        let data = encode(&[0, 0, 0], 1, 1).expect("failed to encode image");

        for length in [0, 5, 13, 400, data.len() - 3, data.len() - 1].iter() {
            let result = read_gif(&data[..*length]);
            assert!(
                matches!(result, Err(GIFReaderError::UnexpectedEnd { .. })),
                "expected truncated gif of {} bytes to fail",
                length
            );
        }
    }

    #[test]
    fn test_read_local_color_table_not_implemented() {
        let mut data = encode(&[0, 0, 0], 1, 1).expect("failed to encode image");
        let packed_offset = HEADER_SIZE + 256 * 3 + 8 + IMAGE_DESCRIPTOR_SIZE;
        assert_eq!(data[packed_offset - IMAGE_DESCRIPTOR_SIZE], IMAGE_SEPARATOR);
        data[packed_offset] = LOCAL_COLOR_TABLE_FLAG;

        assert!(matches!(read_gif(&data), Err(GIFReaderError::NotImplemented { .. })));
    }

    #[test]
    fn test_read_wrong_pixel_count() {
        let mut data = encode(&[0, 0, 0], 1, 1).expect("failed to encode image");
        let width_offset = HEADER_SIZE + 256 * 3 + 8 + 1 + 4;
        data[width_offset] = 2;

        assert!(matches!(read_gif(&data), Err(GIFReaderError::InvalidEncodedData { .. })));
    }
}
