use aerobook_api::{app, AppState};
use aerobook_core::notification::Mailer;
use aerobook_core::repository::{BookingRepository, EmailLogRepository};
use aerobook_core::OrderProvider;
use aerobook_order::{BookingOrchestrator, ConfirmationNotifier};
use aerobook_store::app_config::Config;
use aerobook_store::{
    DbClient, HttpOrderProvider, InMemoryBookingRepository, InMemoryEmailLogRepository, LogMailer,
    PostgresBookingRepository, PostgresEmailLogRepository,
};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "aerobook_api=debug,aerobook_order=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        environment = %config.booking.environment,
        test_mode = config.booking.test_mode,
        "Starting AeroBook API on port {}",
        config.server.port
    );

    // An empty database url runs on the in-memory store
    let (bookings, email_logs): (Arc<dyn BookingRepository>, Arc<dyn EmailLogRepository>) =
        if config.database.url.trim().is_empty() {
            tracing::warn!("No database configured, bookings are kept in memory");
            (
                Arc::new(InMemoryBookingRepository::new()),
                Arc::new(InMemoryEmailLogRepository::new()),
            )
        } else {
            let db = DbClient::new(&config.database.url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            (
                Arc::new(PostgresBookingRepository::new(db.pool.clone())),
                Arc::new(PostgresEmailLogRepository::new(db.pool.clone())),
            )
        };

    let provider: Arc<dyn OrderProvider> = Arc::new(
        HttpOrderProvider::new(&config.provider).context("Failed to build provider client")?,
    );
    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.mail.from.clone()));

    let orchestrator = BookingOrchestrator::from_rules(bookings.clone(), provider, &config.booking)
        .context("Invalid booking.usd_fee_rate")?;
    let notifier = ConfirmationNotifier::new(
        bookings,
        email_logs,
        mailer,
        config.booking.environment.clone(),
    );

    let app = app(AppState {
        bookings: Arc::new(orchestrator),
        notifier: Arc::new(notifier),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
