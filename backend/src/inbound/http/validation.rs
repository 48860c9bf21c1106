//! Request validation helpers shared by the HTTP handlers.
//!
//! Failures become [`Error::invalid_request`] values whose details name the
//! offending field and a machine-readable code.

use serde_json::json;

use crate::domain::{EmailAddress, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    MissingField,
    InvalidEmail,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidEmail => "invalid_email",
        }
    }
}

/// JSON field name as the client sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ValidationCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_email_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid email address")).with_details(json!({
        "field": field,
        "value": value,
        "code": ValidationCode::InvalidEmail.as_str(),
    }))
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_email(value: String, field: FieldName) -> Result<EmailAddress, Error> {
    EmailAddress::parse(value.trim()).map_err(|_| invalid_email_error(field, &value))
}

pub(crate) fn parse_optional_email(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<EmailAddress>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_email(raw, field))
        .transpose()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    const FIELD: FieldName = FieldName::new("newEmail");

    #[rstest]
    fn missing_field_names_the_field() {
        let error = require::<String>(None, FIELD).expect_err("missing");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "newEmail", "code": "missing_field" }))
        );
    }

    #[rstest]
    fn invalid_email_echoes_value() {
        let error = parse_email("nope".to_owned(), FIELD).expect_err("invalid");
        assert_eq!(error.details().map(|d| &d["value"]), Some(&json!("nope")));
    }

    #[rstest]
    #[case::absent(None)]
    #[case::blank(Some("  ".to_owned()))]
    fn blank_optional_email_is_none(#[case] raw: Option<String>) {
        assert_eq!(parse_optional_email(raw, FIELD).expect("valid"), None);
    }

    #[rstest]
    fn surrounding_whitespace_is_trimmed() {
        let email = parse_email(" ana@x.com ".to_owned(), FIELD).expect("valid");
        assert_eq!(email.as_str(), "ana@x.com");
    }
}
