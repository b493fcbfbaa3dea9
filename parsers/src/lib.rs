pub mod data_uri;
pub mod image_parser;
pub mod mime;

pub use data_uri::{DataUri, DataUriError};
