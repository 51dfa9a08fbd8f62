//! Backend entry-point: config, migrations, admin seed, and the HTTP server.

mod server;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use hostel_backend::outbound::persistence::bootstrap::{run_migrations, seed_admin};
use hostel_backend::outbound::persistence::{DbPool, DieselUserRepository};
use server::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::parse();

    run_migrations(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;

    let pool = DbPool::new(config.pool())
        .await
        .map_err(std::io::Error::other)?;

    let users = DieselUserRepository::new(pool.clone());
    seed_admin(&users, &config.admin_password)
        .await
        .map_err(std::io::Error::other)?;

    info!(bind_addr = %config.bind_addr, "starting server");
    let server = server::create_server(config, pool).await?;
    server.await
}
