pub mod client;
pub mod config;
pub mod decoder;
pub mod dialect;
pub mod domain;
pub mod error;
pub mod export;
pub mod multipart;
pub mod output;
pub mod structure;

pub use decoder::{Decoder, decode};
pub use domain::{DecodedResponse, PocketMap, PocketRecord};
pub use error::{DecodeWarning, PocketError};
