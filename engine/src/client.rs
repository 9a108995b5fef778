use std::{env, fmt, pin::Pin, time::Duration};

use log::{debug, warn};
use reqwest::{
    Url,
    header::{self, HeaderValue},
};

mod error;
pub use error::BedrockApiError;

use crate::{ClientBox, adapter::RequestDescriptor, error::TransportError};

pub const BEARER_TOKEN_VAR: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const DEFAULT_REGION: &str = "us-east-1";
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";
/// image generation regularly takes longer than a minute
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60 * 3);

pub type InvokeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<u8>, TransportError>> + Send + 'a>>;

/// Performs one model invocation and returns the raw response body
pub trait InferenceClient {
    fn invoke(&self, req: RequestDescriptor) -> InvokeFuture<'_>;
    fn clone(&self) -> ClientBox;
}

#[derive(Clone, Default)]
pub struct ClientConfig {
    pub region: Option<String>,
    /// Replaces `https://bedrock-runtime.{region}.amazonaws.com`
    pub endpoint: Option<String>,
    pub bearer_token: Option<String>,
}

impl ClientConfig {
    /// Reads region and credentials from the ambient AWS environment variables
    pub fn from_env() -> Self {
        Self {
            region: env::var("AWS_REGION")
                .or_else(|_| env::var("AWS_DEFAULT_REGION"))
                .ok()
                .filter(|r| !r.trim().is_empty()),
            endpoint: None,
            bearer_token: env::var(BEARER_TOKEN_VAR)
                .ok()
                .filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        if region.is_some() {
            self.region = region;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        self
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    pub fn endpoint_url(&self) -> Result<Url, TransportError> {
        let mut endpoint = match &self.endpoint {
            Some(e) => e.clone(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region()),
        };
        // so that joining keeps any path prefix
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        Url::parse(&endpoint).map_err(|e| TransportError::InvalidEndpoint {
            endpoint,
            message: e.to_string(),
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Calls the `InvokeModel` operation of the Bedrock runtime
#[derive(Clone)]
pub struct BedrockClient {
    endpoint: Url,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl BedrockClient {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        if config.bearer_token.is_none() {
            warn!("{BEARER_TOKEN_VAR} is not set, requests will be sent without credentials");
        }
        Ok(Self {
            endpoint: config.endpoint_url()?,
            bearer_token: config.bearer_token.clone(),
            client: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn invoke_url(&self, model_id: &str) -> Result<Url, TransportError> {
        let path = format!("model/{}/invoke", urlencoding::encode(model_id));
        self.endpoint
            .join(&path)
            .map_err(|e| TransportError::InvalidEndpoint {
                endpoint: self.endpoint.to_string(),
                message: e.to_string(),
            })
    }
}

impl InferenceClient for BedrockClient {
    fn invoke(&self, req: RequestDescriptor) -> InvokeFuture<'_> {
        Box::pin(async move {
            let url = self.invoke_url(&req.model_id)?;
            debug!("POST {url} ({} bytes)", req.body.len());

            let mut request = self
                .client
                .post(url)
                .timeout(REQUEST_TIMEOUT)
                .header(header::ACCEPT, HeaderValue::from_static("application/json"))
                .header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )
                .body(req.body);
            if let Some(token) = &self.bearer_token {
                request = request.bearer_auth(token);
            }

            let resp = request.send().await?;
            let status = resp.status();
            let error_type = resp
                .headers()
                .get(ERROR_TYPE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = resp.bytes().await?;

            if !status.is_success() {
                let err =
                    BedrockApiError::from_response(status.as_u16(), error_type.as_deref(), &body);
                debug!("{} failed: {err}", req.model_id);
                return Err(err.into());
            }

            Ok(body.to_vec())
        })
    }

    fn clone(&self) -> ClientBox {
        Box::new(Clone::clone(self))
    }
}
