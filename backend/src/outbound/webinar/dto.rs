//! Wire shapes for the webinar provider's token and registrant endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::WebinarSeat;
use crate::domain::ports::WebinarRegistrant;

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct RegistrantRequestDto<'a> {
    pub(super) first_name: &'a str,
    pub(super) last_name: &'a str,
    pub(super) email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) org: Option<&'a str>,
}

impl<'a> From<&'a WebinarRegistrant> for RegistrantRequestDto<'a> {
    fn from(registrant: &'a WebinarRegistrant) -> Self {
        Self {
            first_name: &registrant.first_name,
            last_name: &registrant.last_name,
            email: registrant.email.as_str(),
            org: registrant.org.as_deref(),
        }
    }
}

/// Successful registrant creation. Older API versions only return `id`.
#[derive(Debug, Deserialize)]
pub(super) struct RegistrantResponseDto {
    #[serde(default)]
    pub(super) registrant_id: Option<String>,
    #[serde(default)]
    pub(super) id: Option<serde_json::Value>,
    #[serde(default)]
    pub(super) join_url: Option<String>,
}

impl RegistrantResponseDto {
    pub(super) fn into_seat(self) -> Result<WebinarSeat, String> {
        let registrant_id = match (self.registrant_id, self.id) {
            (Some(id), _) if !id.is_empty() => id,
            (_, Some(serde_json::Value::String(id))) if !id.is_empty() => id,
            (_, Some(serde_json::Value::Number(id))) => id.to_string(),
            _ => return Err("registrant response carries no registrant id".to_owned()),
        };
        Ok(WebinarSeat {
            registrant_id,
            join_url: self.join_url,
        })
    }
}

/// Error body returned by the provider, e.g. `{"code":300,"message":"..."}`.
#[derive(Debug, Deserialize)]
pub(super) struct ProviderErrorDto {
    #[serde(default)]
    pub(super) code: Option<i64>,
    #[serde(default)]
    pub(super) message: Option<String>,
    /// OAuth endpoints report `reason` instead of `message`.
    #[serde(default)]
    pub(super) reason: Option<String>,
}

impl ProviderErrorDto {
    pub(super) fn into_message(self) -> Option<String> {
        let text = self
            .message
            .or(self.reason)
            .filter(|text| !text.trim().is_empty())?;
        Some(match self.code {
            Some(code) => format!("{text} (code {code})"),
            None => text,
        })
    }
}
