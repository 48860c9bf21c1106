//! Invitations page endpoint.
//!
//! ```text
//! GET /api/v1/invitations/{email}?eventGroupId=
//! ```
//!
//! The path segment is percent-decoded by the router. A malformed address
//! answers 404 without touching any port, matching an unknown address.

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

use crate::domain::ports::{InvitationsRequest, InvitationsView};
use crate::domain::{EmailAddress, Error, EventGroupId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query parameters for the invitations lookup.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InvitationsParams {
    /// Event group to scope the lookup to.
    pub event_group_id: Option<i64>,
}

fn parse_path_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::parse(raw.trim()).map_err(|error| {
        debug!(%error, "rejecting malformed invitations email");
        Error::not_found("no invitations found for this address")
    })
}

/// Events the address is invited to, after substitution redirect.
#[utoipa::path(
    get,
    path = "/api/v1/invitations/{email}",
    params(
        ("email" = String, Path, description = "Guest email address"),
        InvitationsParams
    ),
    responses(
        (status = 200, description = "Invitations view", body = InvitationsView),
        (status = 404, description = "Malformed email address", body = Error)
    ),
    tags = ["invitations"],
    operation_id = "getInvitations"
)]
#[get("/invitations/{email}")]
pub async fn get_invitations(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    params: web::Query<InvitationsParams>,
) -> ApiResult<HttpResponse> {
    let email = parse_path_email(&path.into_inner())?;
    let request = InvitationsRequest {
        email,
        event_group_id: params.into_inner().event_group_id.map(EventGroupId::new),
    };
    let view = state.invitations.invitations(request).await?;
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-store"))
        .json(view))
}
