//! Users API entry-point: loads settings, opens the store, serves HTTP.

mod server;

use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use users_api::outbound::persistence::{DbPool, run_migrations};
use users_api::settings::ServerSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("failed to load settings")?;
    let pool_config = settings.pool_config()?;

    if settings.run_migrations {
        run_migrations(pool_config.database_url())
            .await
            .wrap_err("failed to migrate the user store")?;
    }

    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to connect to the user store")?;

    let server = create_server(ServerConfig::new(settings.bind_addr(), pool.clone()))
        .wrap_err("failed to bind the HTTP listener")?;
    server.await.wrap_err("HTTP server failed")?;

    info!("HTTP server stopped; closing the user store");
    pool.close();
    Ok(())
}
