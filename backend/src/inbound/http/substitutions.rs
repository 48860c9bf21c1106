//! Substitution endpoint.
//!
//! ```text
//! POST /api/v1/substitutions
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, EventGroupId, SubstitutionOutcome, SubstitutionRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_email, require};

const ORIGINAL_EMAIL: FieldName = FieldName::new("originalEmail");
const NEW_EMAIL: FieldName = FieldName::new("newEmail");
const NEW_NAME: FieldName = FieldName::new("newName");

/// Substitution request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionBody {
    /// Defaults to the configured current event group.
    pub event_group_id: Option<i64>,
    pub original_email: Option<String>,
    pub new_email: Option<String>,
    pub new_name: Option<String>,
}

fn parse_substitution_body(body: SubstitutionBody) -> Result<SubstitutionRequest, Error> {
    Ok(SubstitutionRequest {
        event_group_id: body.event_group_id.map(EventGroupId::new),
        original_email: parse_email(require(body.original_email, ORIGINAL_EMAIL)?, ORIGINAL_EMAIL)?,
        new_email: parse_email(require(body.new_email, NEW_EMAIL)?, NEW_EMAIL)?,
        new_name: require(body.new_name, NEW_NAME)?,
    })
}

/// Delegate an invited guest's attendance to a replacement.
#[utoipa::path(
    post,
    path = "/api/v1/substitutions",
    request_body = SubstitutionBody,
    responses(
        (status = 201, description = "Substitution recorded", body = SubstitutionOutcome),
        (status = 200, description = "Existing substitution returned", body = SubstitutionOutcome),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Original email not invited", body = Error),
        (status = 409, description = "Chained substitution", body = Error),
        (status = 500, description = "Substitution failed part-way", body = Error)
    ),
    tags = ["substitutions"],
    operation_id = "substitute"
)]
#[post("/substitutions")]
pub async fn substitute(
    state: web::Data<HttpState>,
    body: web::Json<SubstitutionBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_substitution_body(body.into_inner())?;
    let outcome = state.substitutions.substitute(request).await?;
    let mut response = if outcome.created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(outcome))
}
