use custom_error::custom_error;

custom_error! {pub GIFWriterError
    EmptyInput = "Image has no pixels to encode",
    InvalidDimensions {description: String} = "Invalid image dimensions: {description}",
    QuantizationMismatch {red: u8, green: u8, blue: u8} = "Quantized color ({red}, {green}, {blue}) is missing from the palette",
    DictionaryOverflow {size: usize} = "Symbol dictionary overflow at {size} entries",
}

custom_error! {pub GIFReaderError
    InvalidHeader {description: String} = "Invalid header: {description}",
    InvalidBlock {description: String} = "Invalid block: {description}",
    InvalidEncodedData {description: String} = "Invalid encoded data: {description}",
    UnexpectedEnd {description: String} = "Unexpected end of data: {description}",
    NotImplemented {description: String} = "Not implemented: {description}"
}
