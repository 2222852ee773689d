//! HTTP client for the external browser-automation bridge.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use sahayak_core::config::FormConfig;
use sahayak_core::ApplicantFields;

use crate::{FillOutcome, FormFiller};

#[derive(Debug, Serialize)]
struct FillRequest<'a> {
    session_id: Uuid,
    form_url: &'a str,
    fields: &'a ApplicantFields,
}

/// Drives the scholarship form through a separate automation bridge
/// process, which owns the browser and writes screenshots to a shared
/// directory.
pub struct BridgeFormFiller {
    client: Client,
    config: FormConfig,
}

impl BridgeFormFiller {
    pub fn new(config: FormConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn try_fill(
        &self,
        fields: &ApplicantFields,
        session_id: Uuid,
    ) -> Result<FillOutcome, reqwest::Error> {
        let request = FillRequest {
            session_id,
            form_url: &self.config.form_url,
            fields,
        };
        self.client
            .post(format!("{}/fill", self.config.bridge_url))
            .timeout(Duration::from_secs(self.config.fill_timeout_secs))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<FillOutcome>()
            .await
    }
}

#[async_trait]
impl FormFiller for BridgeFormFiller {
    async fn fill(&self, fields: &ApplicantFields, session_id: Uuid) -> FillOutcome {
        match self.try_fill(fields, session_id).await {
            Ok(outcome) => {
                info!(
                    session_id = %session_id,
                    success = outcome.success,
                    field_errors = outcome.errors.len(),
                    "Bridge fill finished"
                );
                outcome
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Bridge fill request failed");
                FillOutcome::failed(format!("Automation bridge request failed: {e}"))
            }
        }
    }
}
