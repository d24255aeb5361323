use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use url::Url;

use super::{ManagedRecord, ResourceClient, ResourceError};
use crate::schema::{EntityKind, UpdateMethod};

/// reqwest-backed client for one `{base}` / `{base}/{id}` collection.
///
/// No request timeout; transport defaults apply.
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    http: reqwest::Client,
    kind: EntityKind,
    base: Url,
}

impl From<reqwest::Error> for ResourceError {
    fn from(err: reqwest::Error) -> Self {
        ResourceError::Transport(err.to_string())
    }
}

impl HttpResourceClient {
    pub fn new(kind: EntityKind, base: &str) -> Result<Self, ResourceError> {
        Self::with_client(reqwest::Client::new(), kind, base)
    }

    pub fn with_client(http: reqwest::Client, kind: EntityKind, base: &str) -> Result<Self, ResourceError> {
        let base = Url::parse(base)
            .map_err(|e| ResourceError::Transport(format!("invalid base URL '{}': {}", base, e)))?;

        if base.cannot_be_a_base() {
            return Err(ResourceError::Transport(format!("base URL '{}' cannot hold a path", base)));
        }

        Ok(Self { http, kind, base })
    }

    fn record_url(&self, id: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url
    }

    async fn send(&self, method: Method, url: Url, body: Option<&Map<String, Value>>) -> Result<Response, ResourceError> {
        tracing::debug!("{} {} ({})", method, url, self.kind);

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Map remote statuses onto the error taxonomy, passing successes through
    async fn check(&self, response: Response, target: &str) -> Result<Response, ResourceError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ResourceError::NotFound(format!("{} '{}'", self.kind, target)));
        }

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(validation_from_body(status, &body));
        }

        if !status.is_success() {
            tracing::error!("Remote {} store responded {} for {}", self.kind, status, target);
            return Err(ResourceError::Transport(format!("remote responded {}", status)));
        }

        Ok(response)
    }

    async fn read<T: DeserializeOwned>(&self, response: Response, target: &str) -> Result<T, ResourceError> {
        self.check(response, target)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ResourceError::Transport(format!("invalid response body: {}", e)))
    }
}

fn validation_from_body(status: StatusCode, body: &Value) -> ResourceError {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| body.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("remote rejected the record ({})", status));

    let field_errors = body
        .get("field_errors")
        .or_else(|| body.get("errors"))
        .and_then(Value::as_object)
        .map(|errors| {
            errors
                .iter()
                .map(|(field, msg)| {
                    let msg = msg.as_str().map(str::to_string).unwrap_or_else(|| msg.to_string());
                    (field.clone(), msg)
                })
                .collect::<HashMap<_, _>>()
        })
        .unwrap_or_default();

    ResourceError::Validation { message, field_errors }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    async fn list(&self) -> Result<Vec<ManagedRecord>, ResourceError> {
        let response = self.send(Method::GET, self.base.clone(), None).await?;
        self.read(response, "collection").await
    }

    async fn get(&self, id: &str) -> Result<ManagedRecord, ResourceError> {
        let response = self.send(Method::GET, self.record_url(id), None).await?;
        self.read(response, id).await
    }

    async fn create(&self, fields: &Map<String, Value>) -> Result<ManagedRecord, ResourceError> {
        let response = self.send(Method::POST, self.base.clone(), Some(fields)).await?;
        let record: ManagedRecord = self.read(response, "new record").await?;
        tracing::info!("Created {} '{}'", self.kind, record.id);
        Ok(record)
    }

    async fn update(&self, id: &str, fields: &Map<String, Value>) -> Result<ManagedRecord, ResourceError> {
        let method = match self.kind.schema().update_method {
            UpdateMethod::Put => Method::PUT,
            UpdateMethod::Patch => Method::PATCH,
        };
        let response = self.send(method, self.record_url(id), Some(fields)).await?;
        let record = self.read(response, id).await?;
        tracing::info!("Updated {} '{}'", self.kind, id);
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        let response = self.send(Method::DELETE, self.record_url(id), None).await?;
        // Body is whatever the store echoes back; only the status matters
        self.check(response, id).await?;
        tracing::info!("Deleted {} '{}'", self.kind, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_urls_append_one_segment() {
        let client = HttpResourceClient::new(EntityKind::Cage, "https://example.mockapi.io/cage").unwrap();
        assert_eq!(client.record_url("12").as_str(), "https://example.mockapi.io/cage/12");

        let trailing = HttpResourceClient::new(EntityKind::Cage, "https://example.mockapi.io/cage/").unwrap();
        assert_eq!(trailing.record_url("12").as_str(), "https://example.mockapi.io/cage/12");
    }

    #[test]
    fn record_ids_are_escaped() {
        let client = HttpResourceClient::new(EntityKind::Staff, "https://example.mockapi.io/staff").unwrap();
        assert_eq!(
            client.record_url("a/b").as_str(),
            "https://example.mockapi.io/staff/a%2Fb"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(HttpResourceClient::new(EntityKind::NewsItem, "not a url").is_err());
        assert!(HttpResourceClient::new(EntityKind::NewsItem, "mailto:zoo@example.com").is_err());
    }

    #[test]
    fn validation_body_is_mapped_to_field_errors() {
        let err = validation_from_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({"message": "bad cage", "errors": {"maxCapacity": "too large"}}),
        );
        match err {
            ResourceError::Validation { message, field_errors } => {
                assert_eq!(message, "bad cage");
                assert_eq!(field_errors.get("maxCapacity").map(String::as_str), Some("too large"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
