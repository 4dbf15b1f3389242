use std::env;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_TTFB,
};
use crate::sse::process_sse;
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

/// Base URL of the public generative-language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// A boxed stream of response chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// Client for the Gemini generative-language API.
#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl Gemini {
    /// Create a new client.
    ///
    /// The API key can be provided directly or read from the GEMINI_API_KEY
    /// environment variable.  A missing key is a configuration error.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var(API_KEY_ENV).map_err(|_| {
                Error::configuration(format!(
                    "API key not provided and {API_KEY_ENV} environment variable not set"
                ))
            })?,
        };
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(Error::configuration("API key is empty"));
        }
        if HeaderValue::from_str(&api_key).is_err() {
            return Err(Error::configuration(
                "API key contains characters that cannot be sent in a header",
            ));
        }

        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

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
            logger: None,
        })
    }

    /// Attach a logger that observes every request and streamed chunk.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// The logger attached to this client, if any.
    pub(crate) fn logger(&self) -> Option<&Arc<dyn ClientLogger>> {
        self.logger.as_ref()
    }

    /// Build the URL for `models/{model}:{method}`.
    fn endpoint(&self, model: &Model, method: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("models/{}:{method}", model.as_str()))?)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| Error::configuration("API key is not a valid header value"))?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // Try to parse error response body
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
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

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error);
        let error_status = detail.as_ref().and_then(|d| d.status.clone());
        let error_message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| error_body.clone());

        // Map HTTP status code to appropriate error type
        match status_code {
            400 => Error::bad_request(error_message),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_status, error_message),
        }
    }

    async fn post(&self, url: Url, request: &GenerateContentRequest) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(url)
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
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
            });
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                return Err(err);
            }
        };

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Send a request and wait for the complete, non-streaming response.
    pub async fn generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model, "generateContent")?;
        if let Some(logger) = &self.logger {
            logger.log_request(model, request);
        }

        let start = Instant::now();
        let response = self.post(url, request).await?;
        let body = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
            })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if let Some(reason) = body.block_reason() {
            return Err(Error::blocked(reason));
        }
        if let Some(logger) = &self.logger {
            logger.log_stream_chunk(&body);
            logger.log_stream_text(&body.text());
        }
        Ok(body)
    }

    /// Send a request and get a streaming response.
    ///
    /// Returns a stream of response chunks that can be processed incrementally;
    /// each chunk carries only the text produced since the previous one.
    pub async fn stream_generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream> {
        let mut url = self.endpoint(model, "streamGenerateContent")?;
        url.set_query(Some("alt=sse"));
        if let Some(logger) = &self.logger {
            logger.log_request(model, request);
        }

        let start = Instant::now();
        let response = self.post(url, request).await?;
        STREAM_TTFB.add(start.elapsed().as_secs_f64());

        let stream = process_sse(response.bytes_stream());
        match self.logger.clone() {
            Some(logger) => Ok(Box::pin(stream.inspect(move |chunk| {
                if let Ok(chunk) = chunk {
                    logger.log_stream_chunk(chunk);
                }
            }))),
            None => Ok(Box::pin(stream)),
        }
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut base_url = base_url.trim().to_string();
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    let url = Url::parse(&base_url)
        .map_err(|e| Error::configuration(format!("invalid base URL {base_url}: {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration(format!(
            "base URL must be an http(s) URL: {base_url}"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, KnownModel};

    #[test]
    fn test_client_creation() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = Gemini::with_options(
            Some(" test-key\n".to_string()),
            Some("http://localhost:8080/v1beta".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url(), "http://localhost:8080/v1beta/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn empty_key_is_configuration_error() {
        let err = Gemini::new(Some("   ".to_string())).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn bad_base_url_is_configuration_error() {
        let err = Gemini::with_options(Some("k".to_string()), Some("not a url".to_string()), None)
            .unwrap_err();
        assert!(err.is_configuration());
        let err = Gemini::with_options(
            Some("k".to_string()),
            Some("ftp://example.com/".to_string()),
            None,
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn endpoints() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        let url = client
            .endpoint(
                &Model::Known(KnownModel::Gemini25FlashLite),
                "streamGenerateContent",
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-lite:streamGenerateContent"
        );
    }

    #[test]
    fn debug_hides_key() {
        let client = Gemini::new(Some("super-secret".to_string())).unwrap();
        assert!(!format!("{client:?}").contains("super-secret"));
    }

    #[tokio::test]
    #[ignore] // Ignore by default as this requires a real API key
    async fn test_stream_generate_content() {
        let api_key = env::var(API_KEY_ENV).ok();
        if api_key.is_none() {
            println!("Skipping test_stream_generate_content: {API_KEY_ENV} not set");
            return;
        }

        let client = Gemini::new(api_key).unwrap();
        let request = GenerateContentRequest::new(vec![Content::user(
            "Please respond with a short greeting.",
        )]);
        let mut stream = client
            .stream_generate_content(&Model::Known(KnownModel::Gemini25FlashLite), &request)
            .await
            .unwrap();

        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            text.push_str(&chunk.expect("chunk should parse").text());
        }
        assert!(!text.is_empty(), "Expected some streamed text");
    }
}
