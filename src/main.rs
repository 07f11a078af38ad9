use anyhow::{Context, Result};
use log::info;
use machine_learning::TextPipeline;
use model_server::{
    ModelManager,
    storage::{ArtifactStore, FsStore},
};
use tokio::{net::TcpListener, signal};

use nlp_trainer::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // load .env file, it's fine if there's none
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;

    let store = FsStore::new(&config.storage_path).with_context(|| {
        format!(
            "couldn't open the storage at {}",
            config.storage_path.display()
        )
    })?;

    let manager = ModelManager::open(
        TextPipeline::default(),
        ArtifactStore::new(store),
        config.training.clone(),
    );

    let app = nlp_trainer::router(AppState::new(manager, &config), &config.api_key);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("{} {} listening at {}", config.app_name, config.version, listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("received ctrl-c (SIGINT), shutting down");
        })
        .await?;

    Ok(())
}
