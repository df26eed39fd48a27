mod cli;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tripglide_wizard::{
    config::Config,
    services::{HttpBackend, JsonFileSessionStore, MemorySessionStore, SessionStore},
    view::TerminalView,
    wizard::WizardController,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the prompts on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tripglide_wizard=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    tracing::info!(api = %config.api_base_url, "Starting booking wizard");

    let backend = Arc::new(HttpBackend::new(
        &config.api_base_url,
        config.request_timeout(),
    )?);

    let session: Arc<dyn SessionStore> = match &config.session_file {
        Some(path) => Arc::new(JsonFileSessionStore::open(path).await?),
        None => Arc::new(MemorySessionStore::new()),
    };

    let view = Arc::new(TerminalView::new());
    let controller = WizardController::new(
        backend,
        view.clone(),
        session,
        config.wizard_settings(),
    );

    cli::run(controller, view, config.identity_mode).await
}
