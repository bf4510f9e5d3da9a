use clap::Parser;
use core::time::Duration;
use hashpipe::{BcryptHasher, PasswordHasher};
use hashpipe_server::server::{
    config::{CliArgs, ServerConfig},
    service::handler::{HashService, router},
    telemetry::init_telemetry,
};
use std::future::IntoFuture;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::time::timeout;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    init_telemetry()?;

    let service = HashService::new(
        BcryptHasher::new(config.hash_cost),
        config.id_seed,
        config.container_config(),
        config.shutdown_timeout,
    )?;

    let listener = TcpListener::bind(&config.server_addr).await?;
    log_startup_info(&config);

    run_server(listener, service, config.shutdown_timeout).await
}

/// Serves until shutdown is requested, then closes the listener (bounded by
/// `shutdown_timeout`) and waits for every outstanding job.
async fn run_server<H>(
    listener: TcpListener,
    service: HashService<H>,
    shutdown_timeout: Duration,
) -> anyhow::Result<()>
where
    H: PasswordHasher,
{
    let transport = service.coordinator().transport_token();
    tokio::spawn(shutdown_signal(service.clone()));

    let mut server = tokio::spawn(
        axum::serve(listener, router(service.clone()))
            .with_graceful_shutdown(transport.clone().cancelled_owned())
            .into_future(),
    );

    let server_done = tokio::select! {
        () = transport.cancelled() => false,
        res = &mut server => {
            // The listener only returns early when it fails.
            match res {
                Ok(Ok(())) => tracing::warn!("HTTP server stopped unexpectedly"),
                Ok(Err(e)) => tracing::error!("HTTP server failed: {e}"),
                Err(e) => tracing::error!("HTTP server task panicked: {e}"),
            }
            true
        }
    };

    // No-op when the drain was already started by a signal or `/shutdown`.
    service.shutdown().await;

    if !server_done {
        match timeout(shutdown_timeout, server).await {
            Ok(Ok(Ok(()))) => tracing::info!("HTTP listener closed"),
            Ok(Ok(Err(e))) => tracing::error!("HTTP server failed while closing: {e}"),
            Ok(Err(e)) => tracing::error!("HTTP server task panicked: {e}"),
            Err(_) => tracing::warn!(
                "HTTP listener did not close within {:?}; abandoning open connections",
                shutdown_timeout
            ),
        }
    }

    // Jobs are always waited for, whatever happened to the transport.
    service.wait().await;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting hash service on {} with full config: {:#?}",
            config.server_addr,
            config
        );
    } else {
        tracing::info!(
            "Starting hash service on {} (bcrypt cost {})",
            config.server_addr,
            config.hash_cost
        );
    }
}

async fn shutdown_signal<H>(service: HashService<H>)
where
    H: PasswordHasher,
{
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let transport = service.coordinator().transport_token();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
        // Shutdown was requested over HTTP; nothing left to listen for.
        () = transport.cancelled() => return,
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
    service.shutdown().await;
}
