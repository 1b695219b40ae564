//! Cloud Storage adapter
//!
//! Renames, publishes and inspects exported objects through the
//! [`BlobStore`](crate::adapters::traits::BlobStore) trait. A rename is a
//! server-side rewrite followed by a delete of the source.

pub mod client;

pub use client::GcsClient;
