use custom_error::custom_error;

use super::pixel::Pixel;

custom_error! {pub ImageBufferError
    InvalidLength {expected: usize, actual: usize} = "RGB buffer has {actual} bytes, expected {expected}",
    TooLarge {width: usize, height: usize} = "{width}x{height} image does not fit into memory",
}

#[derive(Clone, Debug)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Pixel>, // starting at top left pixel of the image, pos = y * width + x
}

impl Image {

    pub fn new(width: usize, height: usize) -> Self {
        Image {
            width,
            height,
            pixels: vec![Pixel::zero(); width * height],
        }
    }

    /// Builds an image from tightly packed RGB triplets, row-major.
    pub fn from_rgb_buffer(width: usize, height: usize, buffer: &[u8]) -> Result<Self, ImageBufferError> {
        let expected = width.checked_mul(height)
            .and_then(|v| v.checked_mul(3))
            .ok_or(ImageBufferError::TooLarge { width, height })?;
        if buffer.len() != expected {
            return Err(ImageBufferError::InvalidLength {
                expected,
                actual: buffer.len(),
            });
        }

        let pixels = buffer.chunks_exact(3)
            .map(|rgb| Pixel::from_rgb(rgb[0], rgb[1], rgb[2]))
            .collect();

        Ok(Image {
            width,
            height,
            pixels,
        })
    }

    /// Flattens pixels into RGB triplets, alpha is dropped.
    pub fn to_rgb_buffer(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.pixels.len() * 3);

        for pixel in &self.pixels {
            buffer.push(pixel.red);
            buffer.push(pixel.green);
            buffer.push(pixel.blue);
        }

        buffer
    }

    pub fn test_image() -> Self {
        let mut image = Self::new(4, 4);

        let white = Pixel::white();
        let blue = Pixel::from_rgb(3, 155, 229);
        let red = Pixel::from_rgb(221, 47, 47);

        image.fill(white);
        image.set_pixel(1, 1, blue);
        image.set_pixel(2, 1, blue);
        image.set_pixel(1, 2, blue);
        image.set_pixel(2, 2, red);

        image
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Pixel) {
        self.pixels[y * self.width + x] = pixel;
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * self.width + x]
    }

    pub fn fill(&mut self, color: Pixel) {
        for pixel in self.pixels.iter_mut() {
            *pixel = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_buffer_conversion() {
        let image = Image::test_image();
        let buffer = image.to_rgb_buffer();

        assert_eq!(buffer.len(), 4 * 4 * 3);
        assert_eq!(&buffer[0..3], &[255, 255, 255]);

        let restored = Image::from_rgb_buffer(4, 4, &buffer)
            .expect("failed to build image from buffer");
        assert_eq!(restored.pixels, image.pixels);
        assert_eq!(restored.get_pixel(2, 2), Pixel::from_rgb(221, 47, 47));
    }

    #[test]
    fn test_rgb_buffer_length_mismatch() {
        let result = Image::from_rgb_buffer(2, 2, &[0; 11]);

        assert!(matches!(result, Err(ImageBufferError::InvalidLength { expected: 12, actual: 11 })));
    }

    #[test]
    fn test_rgb_buffer_too_large() {
        let result = Image::from_rgb_buffer(usize::MAX / 2, 2, &[0; 3]);

        assert!(matches!(result, Err(ImageBufferError::TooLarge { height: 2, .. })));
    }
}
