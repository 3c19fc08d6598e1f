#[macro_use]
extern crate log;
extern crate custom_error;

use gifenc_core::{plugins::ImageFormatSupportPlugin, models::{ImageReader, ImageWriter}};

use reader::GIFReader;
use writer::GIFWriter;

pub mod common;
pub mod dictionary;
pub mod errors;
pub mod lzw;
pub mod packer;
pub mod palette;
pub mod reader;
pub mod writer;

pub use errors::{GIFReaderError, GIFWriterError};
pub use writer::encode;

pub struct GIFFormatSupportPlugin {
}

impl GIFFormatSupportPlugin {

    pub fn new() -> Self {
        GIFFormatSupportPlugin {}
    }
}

impl ImageFormatSupportPlugin for GIFFormatSupportPlugin {

    fn format_name(&self) -> String {
        "GIF".to_string()
    }

    fn reader(&self) -> Box<dyn ImageReader> {
        Box::new(GIFReader::new())
    }

    fn writer(&self) -> Box<dyn ImageWriter> {
        Box::new(GIFWriter::new())
    }
}
