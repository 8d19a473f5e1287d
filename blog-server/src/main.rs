mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;
mod state;

use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::security::JwtKeys;
use state::AppServices;
use tracing::warn;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    let keys = JwtKeys::new(config.jwt_secret.clone());

    let services = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = create_pool(database_url).await?;
            run_migrations(&pool).await?;
            AppServices::postgres(pool, keys)
        }
        None => {
            warn!("DATABASE_URL is not set, serving from the in-memory store");
            AppServices::in_memory(keys)
        }
    };

    server::start_http_server(config, services).await
}
