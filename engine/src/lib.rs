use crate::client::InferenceClient;

pub mod adapter;
pub mod catalog;
pub mod client;
pub mod error;
pub mod generate;
pub mod image_store;

pub use adapter::{RequestDescriptor, ResultPayload};
pub use catalog::{Family, ModelSpec};
pub use error::{Error, Result, TransportError};
pub use generate::generate;

pub type ClientBox = Box<dyn InferenceClient + Send + Sync>;
