//! Core client: configuration, signing, transport and job polling

pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod models;
pub mod polling;
pub mod s3;
pub mod signer;
