use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use whisperdesk::application::services::{RequestPipeline, UploadLifecycle};
use whisperdesk::infrastructure::audio::ProviderFactory;
use whisperdesk::infrastructure::observability::{TracingConfig, init_tracing};
use whisperdesk::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(
        TracingConfig::new(
            environment.as_str(),
            settings.logging.level.clone(),
            settings.logging.enable_json,
        ),
        settings.server.port,
    );

    let model_id = settings.local.model_id.clone();
    let model = tokio::task::spawn_blocking(move || ProviderFactory::load_local_model(&model_id))
        .await
        .context("Local model loader panicked")?
        .context("Failed to load local Whisper model")?;

    let dispatcher = ProviderFactory::create_dispatcher(
        settings.remote_provider_config(),
        model,
        settings.transcription.timeout(),
    );

    let uploads = UploadLifecycle::new(settings.storage.scratch_dir.clone())
        .context("Failed to prepare scratch directory")?;

    let pipeline = Arc::new(RequestPipeline::new(
        settings.transcription.allowed_extensions(),
        uploads,
        dispatcher,
    ));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState {
        pipeline,
        settings: Arc::new(settings),
    };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router).await?;

    Ok(())
}
