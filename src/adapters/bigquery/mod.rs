//! BigQuery adapter
//!
//! Submits extract jobs and reports their state through the
//! [`Warehouse`](crate::adapters::traits::Warehouse) trait.

pub mod client;

pub use client::BigQueryClient;
