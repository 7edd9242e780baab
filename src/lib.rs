//! Backend for two small Gemini-assisted tools: image captioning and
//! multiple-choice quiz generation. The HTTP surface lives in the binary;
//! this library holds the services, the Gemini gateway, and the pure quiz
//! session state machine that a UI embeds client-side.

pub mod caption;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod quiz;
pub mod session;

pub use error::ServiceError;
