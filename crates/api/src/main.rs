use std::sync::Arc;

use anyhow::Context;

use hackathon_api::config::AppConfig;
use hackathon_infra::{InMemoryStore, PgStore, Stores};

const PG_MAX_CONNECTIONS: u32 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hackathon_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    // Dev tooling: `hackathon-api mint-token <email>` prints a token the server accepts.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [cmd, email] = args.as_slice() {
        if cmd == "mint-token" {
            let token = config
                .token_issuer()
                .issue(email, chrono::Utc::now())
                .context("failed to sign token")?;
            println!("{token}");
            return Ok(());
        }
    }

    let stores = match config.database_url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url, PG_MAX_CONNECTIONS)
                .await
                .context("failed to connect to postgres")?;
            store.migrate().await.context("failed to apply migrations")?;
            tracing::info!("using postgres store");
            Stores::shared(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Stores::shared(Arc::new(InMemoryStore::new()))
        }
    };

    let app = hackathon_api::app::build_app(&config, stores);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
