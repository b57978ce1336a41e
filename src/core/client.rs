//! Signed HTTP client for the Lara API
//!
//! Every call goes out as `POST {server_url}{path}`; the logical method travels
//! in `X-HTTP-Method-Override`. Successful responses wrap their payload as
//! `{"content": ...}`.

use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, DATE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config::ClientConfig;
use crate::core::credentials::Credentials;
use crate::core::errors::{LaraError, Result};
use crate::core::signer::{content_md5, http_date, RequestSigner};

pub const SDK_NAME: &str = "lara-rust";
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

const METHOD_OVERRIDE: &str = "X-HTTP-Method-Override";
const CONTENT_MD5: &str = "Content-MD5";

/// File attached to a multipart request
#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Gzip `bytes` and attach them under `field`
    pub fn gzip(field: impl Into<String>, filename: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(7));
        encoder.write_all(bytes)?;

        Ok(Self {
            field: field.into(),
            filename: filename.into(),
            bytes: encoder.finish()?,
        })
    }
}

/// Shared, cloneable connection to the Lara API.
///
/// Construct once and hand clones to every resource; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct LaraClient {
    http: reqwest::Client,
    signer: Arc<RequestSigner>,
    config: Arc<ClientConfig>,
}

impl LaraClient {
    /// Create a new client
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            http,
            signer: Arc::new(RequestSigner::new(credentials)),
            config: Arc::new(config),
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::load(None)?, ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Unsigned HTTP client sharing this client's pool
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: Option<Value>) -> Result<T> {
        self.request(Method::GET, path, params).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        self.request(Method::POST, path, body).await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        self.request(Method::PUT, path, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, params: Option<Value>) -> Result<T> {
        self.request(Method::DELETE, path, params).await
    }

    /// Send a JSON request and decode the `content` of the response
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let response = self.send(&method, path, body, None).await?;
        Self::parse_content(response).await
    }

    /// Send a multipart request: `fields` become form fields, `upload` the file part
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: Option<Value>,
        upload: Upload,
    ) -> Result<T> {
        let response = self.send(&Method::POST, path, fields, Some(upload)).await?;
        Self::parse_content(response).await
    }

    /// Send a request whose successful response is a raw payload, not JSON
    pub async fn request_bytes(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Vec<u8>> {
        let response = self.send(&method, path, body, None).await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            warn!("{} {} failed with HTTP {}", method, path, status.as_u16());
            return Err(LaraError::from_response_body(status.as_u16(), &bytes));
        }

        Ok(bytes.to_vec())
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<Value>,
        upload: Option<Upload>,
    ) -> Result<Response> {
        let path = normalize_path(path);
        let body = strip_nulls(body)?;
        let date = http_date(chrono::Utc::now());

        debug!("{} {}", method, path);

        let mut builder = self
            .http
            .post(format!("{}{}", self.config.base_url(), path))
            .header(METHOD_OVERRIDE, method.as_str())
            .header(DATE, &date)
            .header("X-Lara-SDK-Name", SDK_NAME)
            .header("X-Lara-SDK-Version", SDK_VERSION);

        let encoded = match &body {
            Some(fields) => Some(serde_json::to_vec(fields)?),
            None => None,
        };
        let md5 = encoded.as_deref().map(content_md5).unwrap_or_default();
        if !md5.is_empty() {
            builder = builder.header(CONTENT_MD5, &md5);
        }

        builder = match (upload, encoded) {
            (Some(upload), _) => builder.multipart(build_form(body, upload)?),
            (None, Some(encoded)) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(encoded),
            (None, None) => builder,
        };

        let mut request = builder.build()?;

        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let path_and_query = match request.url().query() {
            Some(query) => format!("{}?{}", request.url().path(), query),
            None => request.url().path().to_string(),
        };

        let authorization =
            self.signer
                .authorization(method.as_str(), &path_and_query, &md5, &content_type, &date)?;
        let authorization =
            HeaderValue::from_str(&authorization).map_err(|e| LaraError::InvalidInput {
                message: format!("invalid authorization header: {e}"),
            })?;
        request.headers_mut().insert(AUTHORIZATION, authorization);

        Ok(self.http.execute(request).await?)
    }

    async fn parse_content<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let url = response.url().path().to_string();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            warn!("Request to {} failed with HTTP {}", url, status.as_u16());
            return Err(LaraError::from_response_body(status.as_u16(), &bytes));
        }

        let mut envelope: Value =
            serde_json::from_slice(&bytes).map_err(|e| LaraError::InvalidResponse {
                message: format!("response is not JSON: {e}"),
            })?;
        let content = envelope
            .get_mut("content")
            .map(Value::take)
            .unwrap_or(Value::Null);

        serde_json::from_value(content).map_err(|e| LaraError::InvalidResponse {
            message: format!("unexpected content for {url}: {e}"),
        })
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Drop null fields; an object left empty means "no body"
fn strip_nulls(body: Option<Value>) -> Result<Option<Map<String, Value>>> {
    match body {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(fields)) => {
            let fields: Map<String, Value> =
                fields.into_iter().filter(|(_, v)| !v.is_null()).collect();
            Ok((!fields.is_empty()).then_some(fields))
        }
        Some(other) => Err(LaraError::InvalidInput {
            message: format!("request body must be a JSON object, got {other}"),
        }),
    }
}

fn build_form(fields: Option<Map<String, Value>>, upload: Upload) -> Result<Form> {
    let mut form = Form::new();

    for (name, value) in fields.unwrap_or_default() {
        let text = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        form = form.text(name, text);
    }

    let part = Part::bytes(upload.bytes)
        .file_name(upload.filename)
        .mime_str("application/octet-stream")?;

    Ok(form.part(upload.field, part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use serde_json::json;
    use std::io::Read;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("memories"), "/memories");
        assert_eq!(normalize_path("/memories"), "/memories");
    }

    #[test]
    fn test_strip_nulls() {
        let body = strip_nulls(Some(json!({"name": "demo", "external_id": null}))).unwrap();
        assert_eq!(Value::Object(body.unwrap()), json!({"name": "demo"}));

        assert!(strip_nulls(Some(json!({"external_id": null}))).unwrap().is_none());
        assert!(strip_nulls(None).unwrap().is_none());
        assert!(strip_nulls(Some(json!(["not", "an", "object"]))).is_err());
    }

    #[test]
    fn test_upload_gzip() {
        let upload = Upload::gzip("tmx", "memory.tmx", b"<tmx version=\"1.4\"/>").unwrap();
        assert_eq!(upload.field, "tmx");

        let mut decoded = String::new();
        GzDecoder::new(upload.bytes.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "<tmx version=\"1.4\"/>");
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ClientConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        let result = LaraClient::new(Credentials::new("AK", "secret"), config);
        assert!(matches!(result, Err(LaraError::Config { .. })));
    }
}
