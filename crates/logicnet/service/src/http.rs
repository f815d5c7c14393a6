//! HTTP client for a remote rule service.

use async_trait::async_trait;
use logicnet_types::{NodeName, NodeState, Rule};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ServiceConfig, REGION_HEADER};
use crate::error::{Result, ServiceError};
use crate::traits::RuleService;
use crate::wire::{
    ApiErrorBody, CreateNodeRequest, DescribeStatesRequest, NodeStateEntry, OverrideStateRequest,
};

/// Reason recorded with every state override.
const OVERRIDE_REASON: &str = "8-bit adder exercise";

/// JSON-over-HTTP rule service client.
pub struct HttpRuleService {
    client: Client,
    base_url: Url,
}

impl HttpRuleService {
    /// Create a client from configuration.
    ///
    /// The region, the bearer token and every configured header are sent with
    /// each request.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.endpoint)
            .map_err(|e| ServiceError::Config(format!("invalid endpoint {:?}: {}", config.endpoint, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::Config(format!(
                "endpoint {:?} cannot be used as a base URL",
                config.endpoint
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(default_headers(config)?)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn node_url(&self, name: &NodeName, tail: Option<&str>) -> Url {
        match tail {
            Some(tail) => self.url(&["v1", "nodes", name.as_str(), tail]),
            None => self.url(&["v1", "nodes", name.as_str()]),
        }
    }
}

fn default_headers(config: &ServiceConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(REGION_HEADER, header_value(&config.region)?);
    if let Some(token) = &config.token {
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
    }
    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ServiceError::Config(format!("invalid header name {:?}: {}", key, e)))?;
        headers.insert(name, header_value(value)?);
    }
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ServiceError::Config(format!("invalid header value {:?}: {}", value, e)))
}

/// Turn a non-success response into a typed error.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => body.into_error(status.as_u16()),
        Err(_) => ServiceError::Api {
            status: status.as_u16(),
            message: text,
        },
    })
}

async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
    Ok(check(response).await?.json().await?)
}

#[async_trait]
impl RuleService for HttpRuleService {
    async fn create_rule_node(&self, name: &NodeName, rule: &Rule) -> Result<()> {
        debug!(%name, %rule, "Creating node");
        let request = CreateNodeRequest {
            name: name.clone(),
            expression: rule.to_string(),
            rule: rule.clone(),
        };
        let response = self
            .client
            .post(self.url(&["v1", "nodes"]))
            .json(&request)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn override_state(&self, name: &NodeName, value: bool) -> Result<()> {
        debug!(%name, value, "Setting state");
        let request = OverrideStateRequest {
            state: NodeState::from(value),
            reason: OVERRIDE_REASON.to_string(),
            reason_data: serde_json::json!({}),
            timestamp: chrono::Utc::now(),
        };
        let response = self
            .client
            .put(self.node_url(name, Some("state")))
            .json(&request)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn describe_states(&self, names: &[NodeName]) -> Result<Vec<(NodeName, NodeState)>> {
        debug!(count = names.len(), "Describing states");
        let request = DescribeStatesRequest {
            names: names.to_vec(),
        };
        let response = self
            .client
            .post(self.url(&["v1", "states"]))
            .json(&request)
            .send()
            .await?;
        let entries: Vec<NodeStateEntry> = json(response).await?;
        Ok(entries.into_iter().map(|e| (e.name, e.state)).collect())
    }

    async fn query_children(&self, name: &NodeName) -> Result<Vec<NodeName>> {
        debug!(%name, "Finding children");
        let response = self
            .client
            .get(self.node_url(name, Some("children")))
            .send()
            .await?;
        json(response).await
    }

    async fn query_parents(&self, name: &NodeName) -> Result<Vec<NodeName>> {
        debug!(%name, "Finding parents");
        let response = self
            .client
            .get(self.node_url(name, Some("parents")))
            .send()
            .await?;
        json(response).await
    }

    async fn delete_node(&self, name: &NodeName) -> Result<()> {
        debug!(%name, "Deleting node");
        let response = self.client.delete(self.node_url(name, None)).send().await?;
        check(response).await?;
        Ok(())
    }
}
