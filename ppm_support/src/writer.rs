use gifenc_core::models::{Image, ImageIOError, ImageWriter, ImageWriterOptions};

/// Writes an ASCII (P3) raster instead of the binary (P6) one.
pub const OPTION_PLAIN: &str = "plain";

pub struct PPMWriter {
}

impl PPMWriter {
    pub const fn new() -> Self {
        PPMWriter {}
    }
}

impl ImageWriter for PPMWriter {

    fn write(&self, image: &Image, options: &ImageWriterOptions) -> Result<Vec<u8>, ImageIOError> {
        let plain = options.get_bool(OPTION_PLAIN, false)?;

        if image.pixels.len() != image.width * image.height {
            return Err(ImageIOError::FailedToWrite {
                description: format!(
                    "image has {} pixels, expected {}x{}",
                    image.pixels.len(),
                    image.width,
                    image.height
                ),
            });
        }

        let mut bytes = Vec::new();
        bytes.extend_from_slice(if plain { b"P3" } else { b"P6" });
        // 10 - LF
        bytes.push(10);
        bytes.extend_from_slice(format!("{} {}", image.width, image.height).as_bytes());
        bytes.push(10);
        bytes.extend_from_slice(b"255");
        bytes.push(10);

        if plain {
            write_plain_raster(image, &mut bytes);
        } else {
            bytes.extend_from_slice(&image.to_rgb_buffer());
        }

        debug!("wrote {}x{} ppm image, {} bytes", image.width, image.height, bytes.len());

        Ok(bytes)
    }
}

fn write_plain_raster(image: &Image, bytes: &mut Vec<u8>) {
    for row in image.pixels.chunks(image.width.max(1)) {
        let line = row.iter()
            .map(|pixel| format!("{} {} {}", pixel.red, pixel.green, pixel.blue))
            .collect::<Vec<String>>()
            .join(" ");
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(10);
    }
}

#[cfg(test)]
mod tests {
    use gifenc_core::models::{ImageReader, Pixel};

    use crate::reader::PPMReader;

    use super::*;

    #[test]
    fn test_write_binary_ppm() {
        let mut image = Image::new(2, 1);
        image.set_pixel(0, 0, Pixel::from_rgb(1, 2, 3));
        image.set_pixel(1, 0, Pixel::from_rgb(4, 5, 6));

        let bytes = PPMWriter::new().write(&image, &ImageWriterOptions::default())
            .expect("failed to write the image");

        let mut expected = b"P6\n2 1\n255\n".to_vec();
        expected.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_write_plain_ppm() {
        let mut image = Image::new(1, 2);
        image.set_pixel(0, 0, Pixel::from_rgb(255, 0, 0));
        image.set_pixel(0, 1, Pixel::from_rgb(0, 128, 255));

        let options = ImageWriterOptions::default().with_option_bool(OPTION_PLAIN, true);
        let bytes = PPMWriter::new().write(&image, &options).expect("failed to write the image");

        assert_eq!(bytes, b"P3\n1 2\n255\n255 0 0\n0 128 255\n".to_vec());
    }

    #[test]
    fn test_write_then_read() {
        let image = Image::test_image();

        for plain in &[false, true] {
            let options = ImageWriterOptions::default().with_option_bool(OPTION_PLAIN, *plain);
            let bytes = PPMWriter::new().write(&image, &options).expect("failed to write the image");
            let read = PPMReader::new().read(&bytes).expect("failed to read the image");

            assert_eq!(read.len(), 1);
            assert_eq!(read[0].width, image.width);
            assert_eq!(read[0].height, image.height);
            assert_eq!(read[0].pixels, image.pixels);
        }
    }

    #[test]
    fn test_write_invalid_option() {
        let options = ImageWriterOptions::default().with_option(OPTION_PLAIN, "sometimes");

        assert!(matches!(
            PPMWriter::new().write(&Image::test_image(), &options),
            Err(ImageIOError::InvalidOptions { .. })
        ));
    }
}
