//! Speech-to-text and text-to-speech via the Bhashini pipeline API.
//!
//! The session engine only depends on the `SpeechTranscriber` seam;
//! `BhashiniClient` is the production implementation.

pub mod bhashini;

use async_trait::async_trait;

use sahayak_core::UpstreamStatus;

pub use bhashini::BhashiniClient;

/// External speech-to-text collaborator.
///
/// Failure of any kind (unreachable service, malformed response, nothing
/// recognizable in the audio) is reported as `None`.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Option<String>;

    /// Reachability probe for /health.
    async fn check_health(&self) -> UpstreamStatus {
        UpstreamStatus::Unknown
    }
}
