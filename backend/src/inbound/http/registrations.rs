//! Registration endpoint.
//!
//! ```text
//! POST /api/v1/registrations
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, EventId, GuestId, RegistrationOutcome, RegistrationRequest, RegistrationStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_email, require};

const GUEST_ID: FieldName = FieldName::new("guestId");
const EVENT_ID: FieldName = FieldName::new("eventId");
const WEBINAR_EMAIL: FieldName = FieldName::new("webinarEmail");

/// Registration request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationBody {
    pub guest_id: Option<i64>,
    pub event_id: Option<i64>,
    /// Must be `true`; the guest confirmed the registration prompt.
    pub confirmed: Option<bool>,
    /// Alternate address for the webinar join (virtual events only).
    pub webinar_email: Option<String>,
    /// Store `webinarEmail` on the guest record.
    pub persist_webinar_email: Option<bool>,
}

fn parse_registration_body(body: RegistrationBody) -> Result<RegistrationRequest, Error> {
    Ok(RegistrationRequest {
        guest_id: GuestId::new(require(body.guest_id, GUEST_ID)?),
        event_id: EventId::new(require(body.event_id, EVENT_ID)?),
        confirmed: body.confirmed.unwrap_or(false),
        webinar_email: parse_optional_email(body.webinar_email, WEBINAR_EMAIL)?,
        persist_webinar_email: body.persist_webinar_email.unwrap_or(false),
    })
}

/// Register a guest for an event.
#[utoipa::path(
    post,
    path = "/api/v1/registrations",
    request_body = RegistrationBody,
    responses(
        (status = 201, description = "Registered", body = RegistrationOutcome),
        (status = 200, description = "Already registered", body = RegistrationOutcome),
        (status = 400, description = "Invalid or unconfirmed request", body = Error),
        (status = 404, description = "Unknown guest or event", body = Error),
        (status = 409, description = "Registration closed or attendance delegated", body = Error),
        (status = 502, description = "Webinar provider failure", body = Error),
        (status = 503, description = "Data store unavailable", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "register"
)]
#[post("/registrations")]
pub async fn register(
    state: web::Data<HttpState>,
    body: web::Json<RegistrationBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_registration_body(body.into_inner())?;
    let outcome = state.registrations.register(request).await?;
    let mut response = match outcome.status {
        RegistrationStatus::Registered => HttpResponse::Created(),
        RegistrationStatus::AlreadyRegistered => HttpResponse::Ok(),
    };
    Ok(response.json(outcome))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockRegistrationCommand;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[rstest]
    fn missing_guest_id_is_invalid() {
        let error = parse_registration_body(RegistrationBody {
            event_id: Some(2),
            confirmed: Some(true),
            ..RegistrationBody::default()
        })
        .expect_err("guestId missing");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details().map(|d| &d["field"]), Some(&json!("guestId")));
    }

    #[rstest]
    fn absent_confirmation_is_passed_through_as_false() {
        let request = parse_registration_body(RegistrationBody {
            guest_id: Some(1),
            event_id: Some(2),
            ..RegistrationBody::default()
        })
        .expect("parses");
        assert!(!request.confirmed);
        assert!(!request.persist_webinar_email);
    }

    #[rstest]
    fn malformed_webinar_email_is_invalid() {
        let error = parse_registration_body(RegistrationBody {
            guest_id: Some(1),
            event_id: Some(2),
            confirmed: Some(true),
            webinar_email: Some("zoom-at-x".to_owned()),
            persist_webinar_email: Some(true),
        })
        .expect_err("bad email");
        assert_eq!(
            error.details().map(|d| &d["code"]),
            Some(&json!("invalid_email"))
        );
    }

    #[rstest]
    #[case::registered(RegistrationStatus::Registered, StatusCode::CREATED)]
    #[case::repeat(RegistrationStatus::AlreadyRegistered, StatusCode::OK)]
    #[actix_web::test]
    async fn status_code_follows_outcome(
        #[case] status: RegistrationStatus,
        #[case] expected: StatusCode,
    ) {
        let mut command = MockRegistrationCommand::new();
        command.expect_register().return_once(move |_| {
            Ok(RegistrationOutcome {
                status,
                webinar: None,
                warnings: Vec::new(),
            })
        });
        let state = HttpState::default().with_registrations(Arc::new(command));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(register)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/registrations")
            .set_json(json!({ "guestId": 1, "eventId": 2, "confirmed": true }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), expected);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["warnings"], json!([]));
    }
}
