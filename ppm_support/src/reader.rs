use std::str::from_utf8;

use custom_error::custom_error;

use gifenc_core::models::{Image, ImageIOError, ImageReader};

custom_error! {pub PPMReaderError
    InvalidHeader {description: String} = "Invalid header: {description}",
    UnsupportedFormat {magic_number: String} = "Current PPM reader does not support {magic_number} magic number",
    UnexpectedEnd {description: String} = "Unexpected end of data: {description}",
}

#[derive(Debug)]
struct Header {
    magic_number: String,
    width: usize,
    height: usize,
    pixel_count: usize,
    max_color_value: usize,
}

/// Produces tightly packed RGB triplets, normalized to 0..=255.
trait RasterReader {
    fn read_raster(&self, header: &Header, data: &[u8]) -> Result<Vec<u8>, PPMReaderError>;
}

/// Plain (ASCII) raster
pub struct P3RasterReader {
}

/// Binary raster, one byte per sample or two big-endian bytes when max value is above 255
pub struct P6RasterReader {
}

impl RasterReader for P3RasterReader {
    fn read_raster(&self, header: &Header, mut data: &[u8]) -> Result<Vec<u8>, PPMReaderError> {
        // every sample takes at least two bytes of text
        let mut raster = Vec::with_capacity(header.pixel_count.min(data.len() / 6) * 3);
        let normalize = get_normalize_fn(header.max_color_value);

        for _ in 0..header.pixel_count {
            for _ in 0..3 {
                let (value, rest) = read_number(skip_whitespaces_and_comments(data))?;
                raster.push(normalize(value));
                data = rest;
            }
        }

        Ok(raster)
    }
}

impl RasterReader for P6RasterReader {
    fn read_raster(&self, header: &Header, data: &[u8]) -> Result<Vec<u8>, PPMReaderError> {
        let bytes_per_sample = if header.max_color_value > 255 { 2 } else { 1 };
        let expected = header.pixel_count.checked_mul(3 * bytes_per_sample)
            .ok_or_else(|| PPMReaderError::InvalidHeader {
                description: format!("{}x{} raster is too large", header.width, header.height),
            })?;
        if data.len() < expected {
            return Err(PPMReaderError::UnexpectedEnd {
                description: format!("raster needs {} bytes, got {}", expected, data.len()),
            });
        }

        let normalize = get_normalize_fn(header.max_color_value);
        let sample = |bytes: &[u8]| match bytes {
            [high, low] => ((*high as usize) << 8) | *low as usize,
            _ => bytes[0] as usize,
        };

        let raster = data[..expected].chunks_exact(bytes_per_sample)
            .map(|bytes| normalize(sample(bytes)))
            .collect();

        Ok(raster)
    }
}

fn get_raster_reader(magic_number: &str) -> Result<Box<dyn RasterReader>, PPMReaderError> {
    match magic_number {
        "P3" => Ok(Box::new(P3RasterReader {})),
        "P6" => Ok(Box::new(P6RasterReader {})),
        other => Err(PPMReaderError::UnsupportedFormat {
            magic_number: other.to_string(),
        }),
    }
}

fn get_normalize_fn(max_value: usize) -> impl Fn(usize) -> u8 {
    move |x| (255 * x.min(max_value) / max_value) as u8
}

fn is_whitespace(char: u8) -> bool {
    // 9 - TAB; 10 - LF; 11 - VT; 12 - FF; 13 - CR; 32 - SPACE;
    char == 9 || char == 10 || char == 11 || char == 12 || char == 13 || char == 32
}

fn read_number(data: &[u8]) -> Result<(usize, &[u8]), PPMReaderError> {
    let mut i = 0;
    while data.len() > i && data[i].is_ascii_digit() {
        i += 1;
    }

    if i == 0 {
        return Err(match data.first() {
            Some(v) => PPMReaderError::InvalidHeader {
                description: format!("expected a number, got byte {:x}", v),
            },
            None => PPMReaderError::UnexpectedEnd {
                description: "expected a number".to_string(),
            },
        });
    }

    let number = from_utf8(&data[0..i]).ok()
        .and_then(|v| v.parse::<usize>().ok())
        .ok_or_else(|| PPMReaderError::InvalidHeader {
            description: "number is too large".to_string(),
        })?;

    Ok((number, &data[i..]))
}

fn skip_whitespaces_and_comments(mut data: &[u8]) -> &[u8] {
    // 35 - #, comment runs until the end of line
    loop {
        match data.first() {
            Some(v) if is_whitespace(*v) => data = &data[1..],
            Some(35) => {
                data = match data.iter().position(|v| *v == 10) {
                    Some(end) => &data[end + 1..],
                    None => &[],
                };
            },
            _ => return data,
        }
    }
}

fn read_header(data: &[u8]) -> Result<(Header, &[u8]), PPMReaderError> {
    if data.len() < 2 {
        return Err(PPMReaderError::UnexpectedEnd {
            description: "missing magic number".to_string(),
        });
    }

    let magic_number = from_utf8(&data[0..2]).map_err(|_| PPMReaderError::InvalidHeader {
        description: "bad data for magic number in PPM header".to_string(),
    })?;

    let (width, data) = read_number(skip_whitespaces_and_comments(&data[2..]))?;
    let (height, data) = read_number(skip_whitespaces_and_comments(data))?;
    let (max_color_value, data) = read_number(skip_whitespaces_and_comments(data))?;

    let pixel_count = width.checked_mul(height).ok_or_else(|| PPMReaderError::InvalidHeader {
        description: format!("{}x{} image is too large", width, height),
    })?;

    if max_color_value == 0 || max_color_value > 65535 {
        return Err(PPMReaderError::InvalidHeader {
            description: format!("max color value {} is out of range", max_color_value),
        });
    }

    // a single whitespace separates the header from the raster
    let data = match data.split_first() {
        Some((v, rest)) if is_whitespace(*v) => rest,
        _ => return Err(PPMReaderError::InvalidHeader {
            description: "expected whitespace after max color value".to_string(),
        }),
    };

    Ok((Header {
        magic_number: magic_number.to_owned(),
        width,
        height,
        pixel_count,
        max_color_value,
    }, data))
}

pub struct PPMReader {
}

impl PPMReader {
    pub const fn new() -> Self {
        PPMReader {}
    }
}

impl ImageReader for PPMReader {

    fn read(&self, data: &[u8]) -> Result<Vec<Image>, ImageIOError> {
        read_ppm(data).map(|image| vec![image]).map_err(|err| ImageIOError::FailedToRead {
            description: format!("failed to read ppm: {}", err),
        })
    }
}

fn read_ppm(data: &[u8]) -> Result<Image, PPMReaderError> {
    let (header, data) = read_header(data)?;
    debug!("ppm header: {:?}", header);

    let raster_reader = get_raster_reader(header.magic_number.as_str())?;

    let raster = raster_reader.read_raster(&header, data)?;

    Image::from_rgb_buffer(header.width, header.height, &raster).map_err(|err| PPMReaderError::UnexpectedEnd {
        description: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use gifenc_core::models::Pixel;

    use super::*;

    #[test]
    fn test_read_plain_ppm() {
        let data = b"P3\n# simple image\n2 2\n255\n255 0 0  0 255 0\n0 0 255  255 255 255\n";

        let images = PPMReader::new().read(data).expect("failed to read the image");
        let image = &images[0];

        assert_eq!(image.width, 2);
        assert_eq!(image.height, 2);
        assert_eq!(image.pixels.len(), 4);
        assert_eq!(image.get_pixel(0, 0), Pixel::from_rgb(255, 0, 0));
        assert_eq!(image.get_pixel(1, 1), Pixel::from_rgb(255, 255, 255));
    }

    #[test]
    fn test_read_plain_ppm_normalizes_max_value() {
        let data = b"P3 1 1 15\n15 0 5\n";

        let image = read_ppm(data).expect("failed to read the image");

        assert_eq!(image.get_pixel(0, 0), Pixel::from_rgb(255, 0, 85));
    }

    #[test]
    fn test_read_binary_ppm() {
        let mut data = b"P6\n# comment\n2 1\n255\n".to_vec();
        data.extend_from_slice(&[10, 20, 30, 40, 50, 60]);

        let image = read_ppm(&data).expect("failed to read the image");

        assert_eq!(image.width, 2);
        assert_eq!(image.height, 1);
        assert_eq!(image.pixels, vec![Pixel::from_rgb(10, 20, 30), Pixel::from_rgb(40, 50, 60)]);
    }

    #[test]
    fn test_read_binary_ppm_sixteen_bit() {
        let mut data = b"P6 1 1 65535\n".to_vec();
        data.extend_from_slice(&[0xFF, 0xFF, 0x00, 0x00, 0x80, 0x00]);

        let image = read_ppm(&data).expect("failed to read the image");

        assert_eq!(image.get_pixel(0, 0), Pixel::from_rgb(255, 0, 127));
    }

    #[test]
    fn test_read_binary_ppm_whitespace_raster_byte() {
        // the first raster byte is 10, which must not be skipped as whitespace
        let mut data = b"P6 1 1 255\n".to_vec();
        data.extend_from_slice(&[10, 32, 9]);

        let image = read_ppm(&data).expect("failed to read the image");

        assert_eq!(image.get_pixel(0, 0), Pixel::from_rgb(10, 32, 9));
    }

    #[test]
    fn test_read_truncated_raster() {
        let mut data = b"P6 2 2 255\n".to_vec();
        data.extend_from_slice(&[1, 2, 3]);

        assert!(matches!(read_ppm(&data), Err(PPMReaderError::UnexpectedEnd { .. })));
    }

    #[test]
    fn test_read_unsupported_magic_number() {
        let data = b"P5 1 1 255\n\x00";

        assert!(matches!(read_ppm(data), Err(PPMReaderError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_read_invalid_header() {
        assert!(matches!(read_ppm(b"P6 x 1 255\n"), Err(PPMReaderError::InvalidHeader { .. })));
        assert!(matches!(read_ppm(b"P6 1 1 0\n"), Err(PPMReaderError::InvalidHeader { .. })));
        assert!(matches!(read_ppm(b"P6 1"), Err(PPMReaderError::UnexpectedEnd { .. })));
    }

    #[test]
    fn test_read_oversized_dimensions() {
        let too_large = b"P6 4294967296 4294967296 255\n\0\0\0";
        assert!(matches!(read_ppm(too_large), Err(PPMReaderError::InvalidHeader { .. })));

        let too_large = b"P3 4294967296 4294967296 255\n1 2 3\n";
        assert!(matches!(read_ppm(too_large), Err(PPMReaderError::InvalidHeader { .. })));
    }

    #[test]
    fn test_read_large_dimensions_without_raster() {
        // fits in usize, but the data runs out long before the raster does
        assert!(matches!(read_ppm(b"P3 100000 100000 255\n1 2 3\n"), Err(PPMReaderError::UnexpectedEnd { .. })));
        assert!(matches!(read_ppm(b"P6 100000 100000 65535\n\0\0"), Err(PPMReaderError::UnexpectedEnd { .. })));
    }
}
