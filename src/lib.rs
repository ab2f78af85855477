pub mod api;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod view;

use api::fixture::FixtureStore;
use api::Backend;
use commands::{Dashboard, Reaction, UiEvent};
use config::{ConfigError, DashboardConfig};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub base_url: Option<String>,
    /// Serve the built-in demo data instead of talking to a server.
    pub demo: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Load the dashboard once, wait for card enrichment, and return the page.
pub fn run(options: RunOptions) -> Result<String, AppError> {
    let mut config = DashboardConfig::load(options.config_path.as_deref())?;
    if let Some(base_url) = options.base_url {
        config.base_url = base_url;
    }
    let backend = if options.demo {
        Backend::Fixture(FixtureStore::demo(&config))
    } else {
        Backend::http(config.base_url.clone())
    };
    log::info!(
        "Loading dashboard from {}",
        if options.demo { "demo data" } else { config.base_url.as_str() }
    );

    // Everything runs on one thread; enrichment is a local task beside the UI.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();

    let html = local.block_on(&runtime, async move {
        let dashboard = Dashboard::new(config, backend);
        if let Reaction::Rendered { enrichment, .. } = dashboard.handle(UiEvent::Load).await {
            if let Err(e) = tokio::task::spawn_local(enrichment).await {
                log::warn!("Enrichment task failed: {}", e);
            }
        }
        let doc = dashboard.document();
        let html = doc.borrow().to_html();
        html
    });
    Ok(html)
}
