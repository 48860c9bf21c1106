//! HTTP inbound adapter exposing the REST endpoints.

pub mod error;
pub mod health;
pub mod invitations;
pub mod registrations;
pub mod state;
pub mod substitutions;
pub mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

use crate::domain::Error;

/// JSON body extractor settings. Malformed bodies answer with the same
/// error payload as validation failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            Error::invalid_request(format!("invalid JSON body: {err}")).into()
        })
}

/// Query string extractor settings.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid query string: {err}")).into()
    })
}

/// The versioned API routes. Handlers expect [`state::HttpState`] in app
/// data.
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .app_data(json_config())
        .app_data(query_config())
        .service(invitations::get_invitations)
        .service(registrations::register)
        .service(substitutions::substitute)
}
