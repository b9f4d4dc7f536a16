#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;

    use workout_schedule::{ServiceConfig, http_api, logging};

    logging::init_logging("info")?;
    let config = ServiceConfig::from_env()?;

    let state = match &config.database_path {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            let store = workout_schedule::SqliteProgramStore::new(path)?;
            tracing::info!(path = %path.display(), "using sqlite program store");
            http_api::AppState::with_store(config.policy, Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        Some(path) => {
            let store = workout_schedule::JsonDirectoryStore::new(path)?;
            tracing::info!(path = %path.display(), "using json program store");
            http_api::AppState::with_store(config.policy, Arc::new(store))
        }
        None => {
            tracing::warn!("no database configured; programs are kept in memory only");
            http_api::AppState::new(config.policy)
        }
    };

    http_api::serve(config.addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
