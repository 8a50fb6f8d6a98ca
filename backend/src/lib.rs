//! Users API library modules.
//!
//! A small hexagonal service: `domain` holds the user model and use-cases,
//! `inbound` the actix-web adapter, and `outbound` the Diesel adapter.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
