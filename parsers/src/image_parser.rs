use std::fmt::Display;
use std::io::Cursor;

use image::ImageReader;

pub struct ImageParser;

#[derive(Debug, thiserror::Error)]
pub enum ImageParserError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Parse(#[from] image::error::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl ImageParser {
    /// Reads only the image header, which is enough for width and height.
    pub fn dimensions(bytes: &[u8]) -> Result<Dimensions, ImageParserError> {
        let (width, height) = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(Dimensions { width, height })
    }

    /// `"WxH"`, or `"N/A"` when the bytes do not decode as an image.
    pub fn dimensions_label(bytes: &[u8]) -> String {
        Self::dimensions(bytes)
            .map(|d| d.to_string())
            .unwrap_or_else(|_| "N/A".to_string())
    }
}
