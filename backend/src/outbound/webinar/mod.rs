//! Zoom-style webinar provider adapter.

mod dto;
mod zoom_gateway;

pub use zoom_gateway::{ZoomCredentials, ZoomEndpoints, ZoomWebinarGateway};
