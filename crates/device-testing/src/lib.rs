//! Device testing provider client.
//!
//! Submits an application package to a BrowserStack App Automate
//! compatible ingestion endpoint, either as raw bytes or as a URL the
//! provider downloads itself, and returns the provider-hosted app URL.

pub mod client;
pub mod types;

pub use client::Client;
pub use types::ProviderConfig;
