//! Recording and transcription reconciliation for WorkLyft meetings.
//!
//! [`RecordingService`] is the single entry point. Its controller half issues
//! commands to the video provider on behalf of clients; its dispatch half
//! folds the provider's webhooks back into meeting records. Both halves
//! serialise work per meeting through a shared [`locks::MeetingLocks`].

pub mod assets;
pub mod controller;
pub mod correlate;
pub mod dispatch;
pub mod error;
pub mod locks;

pub use controller::{
  CreateMeeting, RecordingConfig, RecordingService, RecordingStarted,
  RecordingStopped, TranscriptionView,
};
pub use dispatch::Outcome;
pub use error::{Error, Result};
