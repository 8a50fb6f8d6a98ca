//! HTTP inbound adapter exposing the users REST endpoints.

pub mod error;
pub mod payload;
pub mod schemas;
pub mod state;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api` routes.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::{App, web};
/// use users_api::inbound::http::{self, state::HttpState};
/// use users_api::test_support::InMemoryUserRepository;
///
/// let state = HttpState::from_repository(Arc::new(InMemoryUserRepository::default()));
/// let _app = App::new()
///     .app_data(web::Data::new(state))
///     .configure(http::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(users::list_users)
            .service(users::create_user)
            .service(users::update_user),
    );
}
