//! Reqwest-backed [`ConfirmationMailer`] for the SendGrid v3 mail send API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;

use crate::domain::ports::{ConfirmationMailer, ConfirmationMailerError};
use crate::domain::{ConfirmationEmail, ConfirmationFields, EmailAddress};

#[derive(Debug, Serialize)]
struct MailRequestDto<'a> {
    personalizations: [PersonalizationDto<'a>; 1],
    from: AddressDto<'a>,
    template_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PersonalizationDto<'a> {
    to: [AddressDto<'a>; 1],
    dynamic_template_data: &'a ConfirmationFields,
}

#[derive(Debug, Serialize)]
struct AddressDto<'a> {
    email: &'a str,
}

fn mail_request<'a>(from: &'a EmailAddress, email: &'a ConfirmationEmail) -> MailRequestDto<'a> {
    MailRequestDto {
        personalizations: [PersonalizationDto {
            to: [AddressDto {
                email: email.to.as_str(),
            }],
            dynamic_template_data: &email.fields,
        }],
        from: AddressDto {
            email: from.as_str(),
        },
        template_id: &email.template_id,
    }
}

/// Sends confirmation emails through a dynamic template.
pub struct SendGridMailer {
    client: Client,
    api_key: Option<String>,
    endpoint: Url,
    from: EmailAddress,
}

impl SendGridMailer {
    /// Build the mailer. Without an API key every send fails with
    /// [`ConfirmationMailerError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        api_key: Option<String>,
        endpoint: Url,
        from: EmailAddress,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint,
            from,
        })
    }
}

#[async_trait]
impl ConfirmationMailer for SendGridMailer {
    async fn send(&self, email: &ConfirmationEmail) -> Result<(), ConfirmationMailerError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(ConfirmationMailerError::not_configured)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&mail_request(&self.from, email))
            .send()
            .await
            .map_err(|error| ConfirmationMailerError::transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "mail provider accepted message");
            return Ok(());
        }
        let body = response
            .bytes()
            .await
            .map_err(|error| ConfirmationMailerError::transport(error.to_string()))?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ConfirmationMailerError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let message = if compact.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        compact.chars().take(PREVIEW_CHAR_LIMIT).collect()
    };
    if status.is_server_error() {
        ConfirmationMailerError::transport(message)
    } else {
        ConfirmationMailerError::rejected(status.as_u16(), message)
    }
}
