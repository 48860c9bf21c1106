//! Reqwest-backed webinar gateway speaking the Zoom server-to-server OAuth
//! and registrant APIs.
//!
//! The adapter owns transport details only. Tokens are fetched per
//! registration attempt and never cached.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::dto::{ProviderErrorDto, RegistrantRequestDto, RegistrantResponseDto, TokenResponseDto};
use crate::domain::WebinarSeat;
use crate::domain::ports::{
    WebinarGateway, WebinarGatewayError, WebinarRegistrant, WebinarToken,
};

/// Server-to-server OAuth app credentials.
#[derive(Clone)]
pub struct ZoomCredentials {
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ZoomCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoomCredentials")
            .field("account_id", &self.account_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Token endpoint and API base.
#[derive(Debug, Clone)]
pub struct ZoomEndpoints {
    pub oauth_url: Url,
    pub api_url: Url,
}

/// [`WebinarGateway`] over HTTPS.
///
/// Without credentials every call fails with
/// [`WebinarGatewayError::NotConfigured`].
pub struct ZoomWebinarGateway {
    client: Client,
    credentials: Option<ZoomCredentials>,
    endpoints: ZoomEndpoints,
}

impl ZoomWebinarGateway {
    /// Build the gateway with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        credentials: Option<ZoomCredentials>,
        endpoints: ZoomEndpoints,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
            endpoints,
        })
    }

    fn credentials(&self) -> Result<&ZoomCredentials, WebinarGatewayError> {
        self.credentials
            .as_ref()
            .ok_or_else(WebinarGatewayError::not_configured)
    }
}

#[async_trait]
impl WebinarGateway for ZoomWebinarGateway {
    async fn acquire_token(&self) -> Result<WebinarToken, WebinarGatewayError> {
        let credentials = self.credentials()?;
        let response = self
            .client
            .post(self.endpoints.oauth_url.clone())
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "account_credentials"),
                ("account_id", credentials.account_id.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_token_status_error(status, body.as_ref()));
        }

        let token: TokenResponseDto = decode(body.as_ref(), "token")?;
        Ok(WebinarToken::new(token.access_token))
    }

    async fn create_registrant(
        &self,
        token: &WebinarToken,
        webinar_id: &str,
        registrant: &WebinarRegistrant,
    ) -> Result<WebinarSeat, WebinarGatewayError> {
        let url = registrants_url(&self.endpoints.api_url, webinar_id)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token.expose())
            .json(&RegistrantRequestDto::from(registrant))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let seat: RegistrantResponseDto = decode(body.as_ref(), "registrant")?;
        seat.into_seat().map_err(WebinarGatewayError::decode)
    }
}

/// `{api_url}/webinars/{webinar_id}/registrants` with the id as one segment.
fn registrants_url(api_url: &Url, webinar_id: &str) -> Result<Url, WebinarGatewayError> {
    let mut url = api_url.clone();
    url.path_segments_mut()
        .map_err(|()| WebinarGatewayError::transport("webinar API URL cannot be a base"))?
        .pop_if_empty()
        .extend(["webinars", webinar_id.trim(), "registrants"]);
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, WebinarGatewayError> {
    serde_json::from_slice(body).map_err(|error| {
        WebinarGatewayError::decode(format!("invalid {what} response: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> WebinarGatewayError {
    WebinarGatewayError::transport(error.to_string())
}

fn map_token_status_error(status: StatusCode, body: &[u8]) -> WebinarGatewayError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            WebinarGatewayError::authentication(provider_message(status, body))
        }
        _ => map_status_error(status, body),
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> WebinarGatewayError {
    let message = provider_message(status, body);
    if status.is_server_error() {
        WebinarGatewayError::transport(message)
    } else {
        WebinarGatewayError::rejected(status.as_u16(), message)
    }
}

/// Provider `message` when the body carries one, else a compact preview.
fn provider_message(status: StatusCode, body: &[u8]) -> String {
    if let Some(message) = serde_json::from_slice::<ProviderErrorDto>(body)
        .ok()
        .and_then(ProviderErrorDto::into_message)
    {
        return message;
    }
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
