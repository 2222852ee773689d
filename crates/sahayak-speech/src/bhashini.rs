//! Bhashini pipeline client: ASR (whisper) and TTS.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use sahayak_core::config::BhashiniConfig;
use sahayak_core::UpstreamStatus;

use crate::SpeechTranscriber;

const ASR_SERVICE_ID: &str = "ai4bharat/whisper-medium-en--gpu--t4";
const TTS_SERVICE_ID: &str = "ai4bharat/indic-tts-coqui-misc-gpu--t4";

/// Errors from the Bhashini pipeline. Callers of the transcriber trait
/// never see these; they are logged and collapsed into `None`.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Bhashini request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pipeline response carried no usable output")]
    EmptyOutput,

    #[error("Pipeline response carried no audio content")]
    NoAudio,

    #[error("Audio payload was not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Debug, Deserialize)]
struct PipelineReply {
    #[serde(rename = "pipelineResponse", default)]
    pipeline_response: Vec<PipelineTaskOutput>,
}

#[derive(Debug, Deserialize)]
struct PipelineTaskOutput {
    #[serde(default)]
    output: Vec<TextOutput>,
    #[serde(default)]
    audio: Vec<AudioOutput>,
}

#[derive(Debug, Deserialize)]
struct TextOutput {
    #[serde(default)]
    source: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct AudioOutput {
    #[serde(rename = "audioContent", default)]
    audio_content: String,
}

/// Client for the Bhashini speech pipeline.
pub struct BhashiniClient {
    client: Client,
    config: BhashiniConfig,
}

impl BhashiniClient {
    pub fn new(config: BhashiniConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn post_pipeline(&self, payload: serde_json::Value) -> Result<PipelineReply, SpeechError> {
        let reply = self
            .client
            .post(&self.config.url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .header("Authorization", &self.config.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json::<PipelineReply>()
            .await?;
        Ok(reply)
    }

    async fn try_transcribe(&self, audio: &[u8]) -> Result<String, SpeechError> {
        let audio_b64 = base64::engine::general_purpose::STANDARD.encode(audio);

        let payload = json!({
            "pipelineTasks": [{
                "taskType": "asr",
                "config": {
                    "language": {"sourceLanguage": "en"},
                    "serviceId": ASR_SERVICE_ID,
                    "audioFormat": "wav",
                    "samplingRate": 16000,
                    "preProcessors": ["vad"],
                    "postProcessors": ["itn"]
                }
            }],
            "inputData": {
                "audio": [{"audioContent": audio_b64}]
            }
        });

        let reply = self.post_pipeline(payload).await?;
        let text = reply
            .pipeline_response
            .first()
            .and_then(|task| task.output.first())
            .map(|out| out.source.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(SpeechError::EmptyOutput);
        }
        Ok(text)
    }

    /// Synthesize speech for `text`. Returns decoded audio bytes, or None
    /// on any failure.
    pub async fn synthesize(&self, text: &str, gender: &str) -> Option<Vec<u8>> {
        let payload = json!({
            "pipelineTasks": [{
                "taskType": "tts",
                "config": {
                    "language": {"sourceLanguage": "en"},
                    "serviceId": TTS_SERVICE_ID,
                    "gender": gender
                }
            }],
            "inputData": {
                "input": [{"source": text}]
            }
        });

        let result: Result<Vec<u8>, SpeechError> = async {
            let reply = self.post_pipeline(payload).await?;
            let audio_b64 = reply
                .pipeline_response
                .first()
                .and_then(|task| task.audio.first())
                .map(|a| a.audio_content.clone())
                .unwrap_or_default();
            if audio_b64.is_empty() {
                return Err(SpeechError::NoAudio);
            }
            Ok(base64::engine::general_purpose::STANDARD.decode(audio_b64)?)
        }
        .await;

        match result {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "TTS audio synthesized");
                Some(bytes)
            }
            Err(e) => {
                warn!(error = %e, "TTS failed");
                None
            }
        }
    }
}

#[async_trait]
impl SpeechTranscriber for BhashiniClient {
    async fn transcribe(&self, audio: &[u8]) -> Option<String> {
        if audio.is_empty() {
            return None;
        }
        match self.try_transcribe(audio).await {
            Ok(text) => {
                debug!(chars = text.len(), "Audio transcribed");
                Some(text)
            }
            Err(e) => {
                warn!(error = %e, "Transcription failed");
                None
            }
        }
    }

    /// A reachable endpoint (any non-5xx answer) counts as healthy.
    async fn check_health(&self) -> UpstreamStatus {
        let response = self
            .client
            .request(reqwest::Method::OPTIONS, &self.config.url)
            .timeout(Duration::from_secs(3))
            .send()
            .await;

        match response {
            Ok(resp) if !resp.status().is_server_error() => UpstreamStatus::Healthy,
            Ok(_) => UpstreamStatus::Unhealthy,
            Err(_) => UpstreamStatus::Unreachable,
        }
    }
}
