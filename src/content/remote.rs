//! HTTP client for a remote content service.
//!
//! Every call is a POST of `{"action": ..., "payload": ...}` to one endpoint.
//! `generate_customer` answers with an order draft, `get_tip` with
//! `{"text": ...}`.

use std::time::Duration;

use serde::Deserialize;

use crate::customers::{OrderDraft, Requirements};
use crate::genetics::{Genotype, Phenotype};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("no answer within {0:?}")]
    Timeout(Duration),
    #[error("provider returned {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub struct RemoteProvider {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct WireRequirements {
    quantity: Option<u8>,
    phenotype: Option<Phenotype>,
    genotype: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireOrder {
    name: Option<String>,
    description: Option<String>,
    requirements: Option<WireRequirements>,
}

#[derive(Debug, Deserialize)]
struct WireTip {
    text: Option<String>,
}

impl RemoteProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        RemoteProvider {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn customer_order(&self, level: u8) -> Result<OrderDraft, ProviderError> {
        let body = serde_json::json!({
            "action": "generate_customer",
            "payload": { "difficulty": level },
        });
        let value = self.post(&body).await?;
        let wire: WireOrder =
            serde_json::from_value(value).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        validate_order(wire)
    }

    pub async fn tutor_hint(&self, context: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "action": "get_tip",
            "payload": { "context": context },
        });
        let value = self.post(&body).await?;
        let wire: WireTip =
            serde_json::from_value(value).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        wire.text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Malformed("missing tip text".to_string()))
    }

    async fn post(&self, body: &serde_json::Value) -> Result<serde_json::Value, ProviderError> {
        let call = async {
            let response = self.client.post(&self.endpoint).json(body).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::Status(status));
            }
            Ok(response.json::<serde_json::Value>().await?)
        };
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?
    }
}

fn non_empty(text: Option<String>, default: &str) -> String {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Turn a wire order into a draft, rejecting anything the shop cannot serve.
fn validate_order(wire: WireOrder) -> Result<OrderDraft, ProviderError> {
    let req = wire
        .requirements
        .ok_or_else(|| ProviderError::Malformed("missing requirements".to_string()))?;

    let quantity = req.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(ProviderError::Malformed("quantity must be at least 1".to_string()));
    }

    let genotype = req
        .genotype
        .map(|s| s.parse::<Genotype>())
        .transpose()
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let requirements = match (genotype, req.phenotype) {
        (Some(genotype), _) => Requirements::genotype(quantity, genotype),
        (None, Some(phenotype)) => Requirements::phenotype(quantity, phenotype),
        (None, None) => {
            return Err(ProviderError::Malformed("order has no criterion".to_string()));
        }
    };

    Ok(OrderDraft {
        name: non_empty(wire.name, "Customer"),
        description: non_empty(wire.description, "..."),
        requirements,
    })
}
