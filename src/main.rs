//! Wiring & DI. Entry point: bootstrap the gateway, inject into services,
//! run the console. No business logic here.

use dotenv::dotenv;
use intake_client::adapters::http::ApiClient;
use intake_client::adapters::ui::ConsoleAdapter;
use intake_client::ports::{ApiGateway, ConsolePort};
use intake_client::shared::config::{self, AppConfig};
use intake_client::usecases::{
    ActivityLogService, AdminAuthManager, AuthService, CurriculumService, FormSubmissionService,
    InstructorService, RequestDispatcher,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    // LOG_LEVEL (NONE|ERROR|WARN|INFO|DEBUG) wins over RUST_LOG.
    let filter = config::log_filter_from_env();
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&filter).unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    intake_client::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_default();
    let base_url = cfg.api_base_url_or_default();
    let timeout = Duration::from_secs(cfg.request_timeout_secs_or_default());
    info!(base_url = %base_url, timeout_secs = timeout.as_secs(), "backend configuration");

    // --- Gateway (shared by every service; headers/token are synchronized) ---
    let gateway: Arc<dyn ApiGateway> = Arc::new(
        ApiClient::new(base_url, timeout).map_err(|e| anyhow::anyhow!("{e}"))?,
    );

    if !gateway.is_server_available().await {
        warn!("backend health check failed; continuing, requests will error until it is up");
    }

    // --- Background dispatch: bounded queue, capped in-flight, joined on exit ---
    let queue_size = cfg.request_queue_size_or_default();
    let max_in_flight = cfg.max_in_flight_or_default();
    info!(queue_size, max_in_flight, "request dispatcher sizing");
    let dispatcher = Arc::new(RequestDispatcher::spawn(
        Arc::clone(&gateway),
        queue_size,
        max_in_flight,
    ));

    // --- Services ---
    let auth = Arc::new(AuthService::new(Arc::clone(&gateway)));
    let admin_auth = Arc::new(AdminAuthManager::new(Arc::clone(&gateway)));
    let curriculums = Arc::new(CurriculumService::new(Arc::clone(&gateway)));
    let submissions = Arc::new(FormSubmissionService::new(Arc::clone(&gateway)));
    let activity = Arc::new(ActivityLogService::new(Arc::clone(&gateway)));
    let instructors = Arc::new(InstructorService::new(Arc::clone(&gateway)));

    let console: Arc<dyn ConsolePort> = Arc::new(ConsoleAdapter::new(
        Arc::clone(&gateway),
        auth,
        admin_auth,
        curriculums,
        submissions,
        activity,
        instructors,
        Arc::clone(&dispatcher),
    ));

    // --- Run (portal menu -> intake / admin / instructor) ---
    let result = console.run().await;

    // Drain queued background requests before exiting.
    dispatcher.shutdown().await;

    result.map_err(|e| anyhow::anyhow!("{}", e))
}
