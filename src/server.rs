use school_fees::api::build_router;
use school_fees::config::ServiceConfig;
use school_fees::services::payment_service::PaymentService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = ServiceConfig::from_env();
    if let Some(addr) = std::env::args().nth(1) {
        config = config.with_bind_addr(addr);
    }

    if let Err(e) = run(config).await {
        log::error!("Server failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .map_err(|e| format!("invalid bind address {:?}: {}", config.bind_addr, e))?;

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind to {}: {}", addr, e);
            return Err(e.into());
        }
    };

    log::info!("School fee payment server listening on http://{}", addr);
    log::info!(
        "Gateway delay {:?}, failure rate {}, dedup window {:?}",
        config.gateway_delay,
        config.gateway_failure_rate,
        config.dedup_window
    );
    log::info!("  POST /payments  {{\"studentId\":\"STU001\",\"amount\":500,\"method\":\"credit\"}}");
    log::info!("  GET  /payments");
    log::info!("  POST /reports   {{\"reportType\":\"monthly\"}}");

    let service = Arc::new(PaymentService::new(config));
    axum::serve(listener, build_router(service)).await?;
    Ok(())
}
