use std::pin::Pin;
use std::time::{Duration, Instant};

use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::credential::ApiKey;
use crate::error::{Error, Result};
use crate::observability;
use crate::sse::process_sse;
use crate::types::{ChatCompletion, ChatCompletionChunk, ChatCompletionParams, StreamOptions};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A lazily evaluated, finite stream of completion chunks.
///
/// The stream is produced by exactly one request, cannot be restarted, and
/// ends when the server finishes the message or the connection closes.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk>> + Send>>;

/// The completion provider seam.
///
/// Implementations issue exactly one outbound request per call and never
/// retry or resubmit: the outcome of that single request is the outcome of
/// the turn. Anything that speaks the chat-completions shape can stand in
/// for the hosted API, including scripted backends in tests.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Request a complete (non-streaming) chat completion.
    async fn complete(&self, params: ChatCompletionParams) -> Result<ChatCompletion>;

    /// Request a streaming chat completion.
    ///
    /// Consuming the returned stream to the end yields the whole message.
    async fn stream(&self, params: ChatCompletionParams) -> Result<FragmentStream>;
}

/// Client for OpenAI-compatible chat completion APIs.
#[derive(Debug, Clone)]
pub struct OpenAi {
    api_key: ApiKey,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl OpenAi {
    /// Create a new client.
    ///
    /// The API key can be provided directly or read from the OPENAI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<ApiKey>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<ApiKey>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => ApiKey::from_env().ok_or_else(|| {
                Error::authentication(
                    "API key not provided and OPENAI_API_KEY environment variable not set",
                )
            })?,
        };

        let base_url = match base_url {
            Some(url) => normalize_base_url(&url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
        })
    }

    /// The base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", self.api_key.expose())).map_err(|_| {
                Error::authentication("API key contains characters not allowed in an HTTP header")
            })?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);
        Ok(headers)
    }

    /// Classify a transport-level send failure.
    fn classify_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        // Get headers we might need for error processing
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // The error body shape shared by OpenAI-compatible hosts
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
            param: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let error_type = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.error_type.clone());
        let error_message = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| error_body.clone());
        let error_param = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.param.clone());

        // Map HTTP status code to appropriate error type
        match status_code {
            400 => Error::bad_request(error_message, error_param),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message, request_id),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message, request_id),
        }
    }

    async fn post(&self, headers: HeaderMap, params: &ChatCompletionParams) -> Result<Response> {
        let url = format!("{}chat/completions", self.base_url);

        observability::CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(params)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e));
        observability::CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                observability::CLIENT_REQUEST_ERRORS.click();
                return Err(e);
            }
        };

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl CompletionBackend for OpenAi {
    /// Send the conversation to the API and get a non-streaming response.
    async fn complete(&self, mut params: ChatCompletionParams) -> Result<ChatCompletion> {
        params.stream = false;
        params.stream_options = None;

        let response = self.post(self.default_headers()?, &params).await?;

        response.json::<ChatCompletion>().await.map_err(|e| {
            Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
        })
    }

    /// Send the conversation to the API and get a streaming response.
    ///
    /// Returns a stream of ChatCompletionChunk objects that can be processed
    /// incrementally.
    async fn stream(&self, mut params: ChatCompletionParams) -> Result<FragmentStream> {
        params.stream = true;
        if params.stream_options.is_none() {
            params.stream_options = Some(StreamOptions::include_usage());
        }

        let mut headers = self.default_headers()?;
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let response = self.post(headers, &params).await?;

        // Hand the byte stream to the SSE processor
        let stream = response.bytes_stream();
        Ok(Box::pin(process_sse(stream)))
    }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let parsed = url::Url::parse(base_url)?;
    let mut normalized = parsed.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> ApiKey {
        ApiKey::from_input("sk-test-123").unwrap()
    }

    #[test]
    fn new_requires_a_key_or_the_environment() {
        let client = OpenAi::new(Some(test_key())).unwrap();
        assert_eq!(client.base_url(), "https://api.openai.com/v1/");
    }

    #[test]
    fn base_url_gains_a_trailing_slash() {
        let client = OpenAi::with_options(
            Some(test_key()),
            Some("https://example.com/openai/v1".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://example.com/openai/v1/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err =
            OpenAi::with_options(Some(test_key()), Some("not a url".to_string()), None)
                .unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn default_headers_carry_bearer_auth() {
        let client = OpenAi::new(Some(test_key())).unwrap();
        let headers = client.default_headers().unwrap();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer sk-test-123"
        );
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn debug_does_not_leak_the_key() {
        let client = OpenAi::new(Some(test_key())).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-test-123"));
    }
}
