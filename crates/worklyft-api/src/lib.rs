//! JSON HTTP API for WorkLyft meeting recordings.
//!
//! Exposes an axum [`Router`] backed by a [`RecordingService`]. Auth, TLS,
//! and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! axum::Router::new().merge(worklyft_api::api_router(service))
//! ```

pub mod error;
pub mod meetings;
pub mod webhook;

use axum::{
  Router,
  routing::{get, post},
};
use worklyft_core::{provider::VideoProvider, store::MeetingStore};
use worklyft_recording::RecordingService;

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
pub fn api_router<S, P>(service: RecordingService<S, P>) -> Router<()>
where
  S: MeetingStore + 'static,
  P: VideoProvider + 'static,
{
  Router::new()
    // Provider callbacks
    .route("/webhook", post(webhook::receive::<S, P>))
    .route("/webhook/test", get(webhook::probe))
    // Meetings
    .route("/meetings", get(meetings::list::<S, P>).post(meetings::create::<S, P>))
    .route("/meetings/{id}", get(meetings::get_one::<S, P>))
    .route(
      "/meetings/{id}/recording/start",
      post(meetings::start_recording::<S, P>),
    )
    .route(
      "/meetings/{id}/recording/stop",
      post(meetings::stop_recording::<S, P>),
    )
    // Transcription
    .route(
      "/meetings/{id}/transcription",
      get(meetings::transcription::<S, P>),
    )
    .route(
      "/meetings/{id}/transcription/fetch",
      post(meetings::fetch_transcription::<S, P>),
    )
    .with_state(service)
}

#[cfg(test)]
mod tests;
