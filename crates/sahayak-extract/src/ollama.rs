//! Ollama chat-API client for structured field extraction.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use sahayak_core::config::OllamaConfig;
use sahayak_core::{ChatMessage, UpstreamStatus};
use sahayak_session::Extractor;

const SYSTEM_PROMPT: &str = "You are a scholarship application assistant.\n\
Extract only clearly mentioned information.\n\
Return ONLY valid JSON object. Do not add explanations.";

const INSTRUCTION_PROMPT: &str = r#"
Extract/update ALL known information from the FULL conversation so far. Match the fields given by user only with the possible options provided below.
Return ONLY valid JSON with these exact fields (null if unknown):

- name                   // write exactly same name given by user, don't change any spelling, make the first letter of first name , middle name and surname if provided to uppercase
- gender                 // Male / Female / Others
- d_state_id             // full state name in Capital letters e.g. "ANDHRA PRADESH"
- religion               // Hindu / Muslim / Christian / Sikh / Buddhist / Jain / Parsi / Other
- community              // SC / ST / OBC / General
- annual_family_income   // number only
- c_course_id            // MBBS / B.Tech / Class 12 / Class 10
- maritalStatus          // Married / Un Married / Divorced / Widowed
- hosteler               // Yes / No
- dob                    // DD/MM/YYYY or any clear format
- xii_roll_no
- twelfthPercentage      // number
- x_roll_no
- tenthPercentage        // number
- parent_profession      // Beedi Worker / Central Armed Police Forces & Assam Rifles (CAPFs/AR) / Cine Worker / Ex-RPF / Ex-RPSF / Flayers /
Iron Ore, Manganese Ore & Chrome Ore Mine (IOMC) Workers /  Limestone & Dolomite Mine (LSDM) Workers /  Others / Scavengers / Serving RPF / Serving RPSF / State Police Personnel(Martyred in Terrorist/Naxalite Violence) /
Sweepers / Tanner / Waste Pickers
- competitiveExam        // NMMS / PM-USP SSSJKL / STATE COMPETITIVE SCHOLARSHIP EXAM FOR CLASS V AND VIII - MANIPUR / STATE TALENT SEARCH EXAM (STSE) IN MATHS-SCIENCE FOR ST STUDENTS OF CLASS VIII - MEGHALAYA
- competitiveRollno      //

Current conversation:"#;

/// Errors from the Ollama extraction path. Callers of the `Extractor`
/// trait never see these; they are logged and collapsed into `None`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Ollama request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No JSON object in model reply")]
    NoJson,

    #[error("Model reply was not a JSON object: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsReply {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    #[serde(default)]
    name: String,
}

/// Extraction client for an Ollama chat endpoint.
pub struct OllamaExtractor {
    client: Client,
    config: OllamaConfig,
    json_block: Regex,
}

impl OllamaExtractor {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            // First brace to last brace, across newlines.
            json_block: Regex::new(r"(?s)\{.*\}").expect("static regex"),
        }
    }

    async fn try_extract(
        &self,
        input: &str,
        history: &[ChatMessage],
    ) -> Result<Map<String, Value>, ExtractError> {
        let mut messages = vec![
            WireMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            WireMessage {
                role: "user",
                content: INSTRUCTION_PROMPT,
            },
        ];
        messages.extend(history.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));
        messages.push(WireMessage {
            role: "user",
            content: input,
        });

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
            temperature: 0.15,
        };

        let reply: ChatReply = self
            .client
            .post(format!("{}/api/chat", self.config.url))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = reply.message.map(|m| m.content).unwrap_or_default();
        let block = self
            .json_block
            .find(content.trim())
            .ok_or(ExtractError::NoJson)?;

        match serde_json::from_str::<Value>(block.as_str()) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ExtractError::Malformed(other.to_string())),
            Err(e) => Err(ExtractError::Malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl Extractor for OllamaExtractor {
    async fn extract(&self, input: &str, history: &[ChatMessage]) -> Option<Map<String, Value>> {
        if input.trim().is_empty() {
            return None;
        }
        match self.try_extract(input, history).await {
            Ok(map) => {
                debug!(keys = map.len(), "Extraction candidate received");
                Some(map)
            }
            Err(e) => {
                warn!(error = %e, "Extraction failed; treating as no new data");
                None
            }
        }
    }

    /// Healthy only if the endpoint answers and lists the configured model.
    async fn check_health(&self) -> UpstreamStatus {
        let response = self
            .client
            .get(format!("{}/api/tags", self.config.url))
            .timeout(Duration::from_secs(3))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<TagsReply>().await {
                Ok(tags)
                    if tags
                        .models
                        .iter()
                        .any(|m| m.name.contains(&self.config.model)) =>
                {
                    UpstreamStatus::Healthy
                }
                Ok(_) => UpstreamStatus::Unhealthy,
                Err(_) => UpstreamStatus::Unhealthy,
            },
            Ok(_) => UpstreamStatus::Unhealthy,
            Err(_) => UpstreamStatus::Unreachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> OllamaExtractor {
        OllamaExtractor::new(OllamaConfig::default())
    }

    #[test]
    fn test_json_block_regex_carves_object() {
        let ex = extractor();
        let content = "Here you go:\n{\"name\": \"Asha\",\n \"gender\": null}\nDone.";
        let block = ex.json_block.find(content).unwrap();
        let value: Value = serde_json::from_str(block.as_str()).unwrap();
        assert_eq!(value["name"], "Asha");
    }

    #[test]
    fn test_json_block_regex_no_match_on_plain_text() {
        let ex = extractor();
        assert!(ex.json_block.find("sorry, I cannot help").is_none());
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let request = ChatRequest {
            model: "llama3.2:3b",
            messages: vec![WireMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
            temperature: 0.15,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2:3b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["temperature"], 0.15);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_extract_empty_input_short_circuits() {
        // No network call is made for blank input, so this cannot hang.
        let ex = extractor();
        assert!(ex.extract("   ", &[]).await.is_none());
    }

    #[test]
    fn test_instruction_prompt_names_every_canonical_field() {
        for key in sahayak_core::FIELD_KEYS {
            assert!(
                INSTRUCTION_PROMPT.contains(key),
                "prompt is missing field {key}"
            );
        }
    }
}
