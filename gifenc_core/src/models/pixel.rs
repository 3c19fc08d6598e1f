#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Pixel {

    pub fn zero() -> Self {
        Self::black()
    }

    pub fn white() -> Self {
        Self::from_rgb(255, 255, 255)
    }

    pub fn black() -> Self {
        Self::from_rgb(0, 0, 0)
    }

    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba(red, green, blue, 255)
    }

    pub fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Pixel {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Packs the color channels into `0x00BBGGRR`, alpha is dropped.
    pub fn rgb_key(&self) -> u32 {
        ((self.blue as u32) << 16) | ((self.green as u32) << 8) | self.red as u32
    }
}
