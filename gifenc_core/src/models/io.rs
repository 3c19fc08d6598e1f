use std::collections::HashMap;

use custom_error::custom_error;

use super::image::Image;

custom_error! {pub ImageIOError
    FailedToRead {description: String} = "Failed to read image: {description}",
    FailedToWrite {description: String} = "Failed to write image: {description}",
    InvalidOptions {description: String} = "Invalid options are set for this io operation: {description}",
}

pub trait ImageReader {

    fn read(&self, data: &[u8]) -> Result<Vec<Image>, ImageIOError>;
}

pub trait ImageWriter {

    fn write(&self, image: &Image, options: &ImageWriterOptions) -> Result<Vec<u8>, ImageIOError>;
}

#[derive(Clone, Debug, Default)]
pub struct ImageWriterOptions {

    options: HashMap<String, String>,
}

impl ImageWriterOptions {

    pub fn with_option(&self, key: &str, value: &str) -> Self {
        let mut options = self.options.clone();
        options.insert(key.to_string(), value.to_string());

        Self {
            options,
        }
    }

    pub fn with_option_bool(&self, key: &str, value: bool) -> Self {
        self.with_option(key, if value {
            "true"
        } else {
            "false"
        })
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(|v| v.as_str())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ImageIOError> {
        let value = match self.options.get(key) {
            Some(v) => v,
            None => return Ok(default),
        };

        match value.to_lowercase().trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(ImageIOError::InvalidOptions {
                description: format!("failed to parse option value as a bool: {}", other),
            })
        }
    }
}
