//! 100ms.live management API client.
//!
//! [`HmsClient`] implements [`worklyft_core::provider::VideoProvider`]. Every
//! request carries a freshly minted management token (see [`token`]).

mod client;
mod wire;

pub mod error;
pub mod token;

pub use client::{HmsClient, HmsConfig};
pub use error::{Error, Result};
