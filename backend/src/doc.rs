//! OpenAPI document for the REST API.
//!
//! Served by Swagger UI at `/docs` in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event registration API",
        description = "Invitation lookup, event registration and guest substitution."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    paths(
        crate::inbound::http::invitations::get_invitations,
        crate::inbound::http::registrations::register,
        crate::inbound::http::substitutions::substitute,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "invitations", description = "Events an email is invited to"),
        (name = "registrations", description = "Guest registration for events"),
        (name = "substitutions", description = "Delegating attendance to a replacement"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;
