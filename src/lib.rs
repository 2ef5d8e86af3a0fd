//! Order Desk: a small-business order manager.
//!
//! Orders live in a spreadsheet (`pedidos.xlsx`), prices come from a JSON
//! catalog, customers are told about their orders over WhatsApp, and a
//! daily spreadsheet report can be mailed to the owner. The binary in
//! `main.rs` exposes each action in `commands` as a subcommand.

use std::path::Path;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod catalog;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod diagnostics;
pub mod mailer;
pub mod models;
pub mod notifier;
pub mod report;
pub mod store;
pub mod validation;

use catalog::Catalog;
use config::Settings;
use mailer::{ReportMailer, SmtpMailer};
use notifier::{EvolutionGateway, MessageSender, Notifier};
use store::OrderStore;

/// Everything a command needs: file locations, the order store, the price
/// catalog and the two outbound channels.
pub struct AppState {
    pub settings: Settings,
    pub store: OrderStore,
    pub catalog: Catalog,
    pub notifier: Notifier,
    pub mailer: Box<dyn ReportMailer>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        catalog: Catalog,
        sender: Box<dyn MessageSender>,
        mailer: Box<dyn ReportMailer>,
    ) -> Self {
        Self {
            store: OrderStore::new(settings.store_path.clone()),
            notifier: Notifier::new(sender),
            settings,
            catalog,
            mailer,
        }
    }

    /// Wire the WhatsApp gateway and the SMTP mailer to `config.json`.
    pub fn production(settings: Settings, catalog: Catalog) -> Self {
        let sender = EvolutionGateway::new(settings.config_path.clone());
        let mailer = SmtpMailer::new(settings.config_path.clone());
        Self::new(settings, catalog, Box::new(sender), Box::new(mailer))
    }
}

/// Load the catalog, falling back to an empty one so the rest of the
/// application stays usable. Every product is then rejected by validation.
pub fn load_catalog_or_empty(path: &Path) -> Catalog {
    match Catalog::load(path) {
        Ok(catalog) => {
            if catalog.is_empty() {
                warn!(path = %path.display(), "catalog has no products");
            }
            catalog
        }
        Err(e) => {
            warn!("catalog unavailable, continuing with no products: {e}");
            Catalog::default()
        }
    }
}

/// Console (stderr) plus daily rolling file logging. The returned guard
/// flushes the file writer when dropped, so hold it until exit. When the log
/// directory can't be created only the console layer is installed and the
/// guard is `None`.
pub fn init_logging() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,order_desk_lib=debug"));

    let log_dir = diagnostics::get_log_dir();
    diagnostics::prune_old_logs(&log_dir, diagnostics::MAX_LOG_FILES);

    let (file_layer, guard, appender_error) = match diagnostics::daily_log_appender(&log_dir) {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(e) = appender_error {
        warn!(log_dir = %log_dir.display(), "file logging disabled: {e}");
    }
    info!("Starting Order Desk v{}", env!("CARGO_PKG_VERSION"));
    guard
}
