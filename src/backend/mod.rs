//! Backend module - the outbound inference API client

pub mod inference;

pub use inference::{InferenceClient, UploadedImage};
