use midtrans_gateway::api::{router, AppState};
use midtrans_gateway::config::AppConfig;
use midtrans_gateway::database::memory::{InMemoryInvoiceStore, TracingGatewayLog};
use midtrans_gateway::database::repository::{GatewayLogSink, InvoiceLookup};
use midtrans_gateway::health::HealthChecker;
use midtrans_gateway::logging::init_tracing_with;
use midtrans_gateway::payments::provider::PaymentProvider;
use midtrans_gateway::payments::providers::MidtransProvider;
use midtrans_gateway::services::MidtransGateway;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

fn in_memory_stores() -> (Arc<dyn InvoiceLookup>, Arc<dyn GatewayLogSink>) {
    (
        Arc::new(InMemoryInvoiceStore::new()),
        Arc::new(TracingGatewayLog::new()),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::from_env()?;
    config.validate()?;
    init_tracing_with(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        merchant_id = %config.midtrans.merchant_id,
        sandbox = config.midtrans.sandbox,
        "Starting Midtrans gateway service"
    );

    let mut health_checker = HealthChecker::new();
    let (invoices, gateway_log): (Arc<dyn InvoiceLookup>, Arc<dyn GatewayLogSink>) =
        match &config.database {
            #[cfg(feature = "database")]
            Some(db) => {
                use midtrans_gateway::database::gateway_log_repository::GatewayLogRepository;
                use midtrans_gateway::database::invoice_repository::InvoiceRepository;
                use midtrans_gateway::database::{init_pool, PoolConfig};

                let pool = init_pool(&db.url, PoolConfig::from(db)).await?;
                health_checker = health_checker.with_database(pool.clone());
                (
                    Arc::new(InvoiceRepository::new(pool.clone())) as Arc<dyn InvoiceLookup>,
                    Arc::new(GatewayLogRepository::new(pool)) as Arc<dyn GatewayLogSink>,
                )
            }
            #[cfg(not(feature = "database"))]
            Some(_) => {
                warn!(
                    "DATABASE_URL is set but the database feature is off; using in-memory stores"
                );
                in_memory_stores()
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory stores");
                in_memory_stores()
            }
        };

    let provider: Arc<dyn PaymentProvider> = Arc::new(MidtransProvider::new()?);
    let gateway = Arc::new(MidtransGateway::new(
        Arc::new(config.midtrans.clone()),
        provider,
        invoices,
        gateway_log,
    ));

    let app = router(AppState::new(gateway).with_health_checker(health_checker));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!(address = %addr, "Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
