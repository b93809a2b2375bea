//! API command - serves user CRUD over HTTP

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use super::{bootstrap, shutdown_signal, ApiArgs};
use crate::api::create_router;
use crate::config::AppConfig;

/// Run the HTTP API server until a shutdown signal arrives
pub async fn run(args: ApiArgs) -> anyhow::Result<()> {
    let mut config = bootstrap(args.env.as_deref());

    if let Some(port) = args.port {
        config.server.port = port;
    }

    let state = crate::create_app_state(&config).await?;
    let app = create_router(state);

    let addr = build_socket_addr(&config)?;
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server shutdown complete");

    Ok(())
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_socket_addr() {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 3000;

        let addr = build_socket_addr(&config).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_build_socket_addr_rejects_hostname() {
        let mut config = AppConfig::default();
        config.server.host = "localhost".to_string();

        assert!(build_socket_addr(&config).is_err());
    }
}
