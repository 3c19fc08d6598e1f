use std::collections::HashMap;

use lazy_static::lazy_static;

use gifenc_core::models::Pixel;

use crate::errors::GIFWriterError;

pub const RED_STEP: u8 = 51;
pub const GREEN_STEP: u8 = 51;
pub const BLUE_STEP: u8 = 42;

/// Colors produced by the channel steps: 6 reds * 6 greens * 7 blues.
pub const GENERATED_COLORS: usize = 252;
pub const PALETTE_SIZE: usize = 256;

lazy_static! {
    pub static ref PALETTE: Palette = Palette::generate();
}

/// Fixed quantization table shared by every encoded image.
pub struct Palette {
    colors: Vec<Pixel>,
    indexes: HashMap<u32, u8>, // rgb key -> palette index
}

impl Palette {

    pub fn generate() -> Self {
        let mut colors = Vec::with_capacity(PALETTE_SIZE);
        let mut indexes = HashMap::with_capacity(GENERATED_COLORS);

        for blue in (0..=255).step_by(BLUE_STEP as usize) {
            for green in (0..=255).step_by(GREEN_STEP as usize) {
                for red in (0..=255).step_by(RED_STEP as usize) {
                    let color = Pixel::from_rgb(red, green, blue);
                    indexes.insert(color.rgb_key(), colors.len() as u8);
                    colors.push(color);
                }
            }
        }

        // pad to a power of two, the color table size field can't express 252
        while colors.len() < PALETTE_SIZE {
            colors.push(Pixel::black());
        }

        Palette {
            colors,
            indexes,
        }
    }

    pub fn colors(&self) -> &[Pixel] {
        &self.colors
    }

    pub fn color(&self, index: u8) -> Pixel {
        self.colors[index as usize]
    }

    pub fn quantize(&self, red: u8, green: u8, blue: u8) -> Result<u8, GIFWriterError> {
        let red = red - red % RED_STEP;
        let green = green - green % GREEN_STEP;
        let blue = blue - blue % BLUE_STEP;

        self.indexes.get(&Pixel::from_rgb(red, green, blue).rgb_key())
            .copied()
            .ok_or(GIFWriterError::QuantizationMismatch { red, green, blue })
    }

    /// Maps tightly packed RGB triplets to palette indexes.
    pub fn quantize_buffer(&self, buffer: &[u8]) -> Result<Vec<u8>, GIFWriterError> {
        buffer.chunks_exact(3)
            .map(|rgb| self.quantize(rgb[0], rgb[1], rgb[2]))
            .collect()
    }
}
