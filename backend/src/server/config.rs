//! HTTP server configuration object.

use users_api::outbound::persistence::DbPool;

/// Everything the HTTP server needs to start.
pub struct ServerConfig {
    pub(crate) bind_addr: (String, u16),
    pub(crate) db_pool: DbPool,
}

impl ServerConfig {
    /// Construct a configuration binding `bind_addr` over `db_pool`.
    #[must_use]
    pub fn new(bind_addr: (String, u16), db_pool: DbPool) -> Self {
        Self { bind_addr, db_pool }
    }
}
