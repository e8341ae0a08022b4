//! Core types and trait definitions for WorkLyft meeting recordings.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store, provider client, reconciliation engine and API crates all
//! depend on it.

// Implementors write plain `async fn`; the traits spell out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod event;
pub mod meeting;
pub mod provider;
pub mod store;
pub mod summary;

pub use error::{Error, Result};
