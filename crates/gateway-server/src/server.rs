//! Service runner.

use std::net::SocketAddr;
use std::time::Instant;

use tokio::net::TcpListener;
use tracing::info;

use crate::{routes::create_router, shutdown::shutdown_signal, state::AppState};

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Listener address could not be parsed
    #[error("Invalid listen address {0}")]
    InvalidAddress(String),
    /// Binding or serving failed
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One front-end service bound to its configured address
#[derive(Debug)]
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a server for the given state
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Address from the configuration
    ///
    /// # Errors
    /// Returns error if host and port do not form a socket address
    pub fn address(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.state.config.server.host, self.state.config.port());
        addr.parse().map_err(|_| ServerError::InvalidAddress(addr))
    }

    /// Bind and serve until a shutdown signal arrives
    ///
    /// # Errors
    /// Returns error if the address is invalid or the listener fails
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.address()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    ///
    /// # Errors
    /// Returns error if serving fails
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let service = self.state.service_name();
        let local = listener.local_addr()?;
        let app = create_router(self.state);
        let started = Instant::now();

        info!(service, address = %local, "Starting service");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_signal().await;
            })
            .await?;

        info!(
            service,
            uptime_secs = started.elapsed().as_secs(),
            "Service stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_config::{MapStore, ServiceConfig, ServiceKind};

    fn server(host: &str, port: Option<u16>) -> Server {
        let mut config = ServiceConfig::for_service(ServiceKind::Material);
        config.server.host = host.to_string();
        config.server.port = port;

        let state = AppState::builder()
            .config(config)
            .config_store(MapStore::new())
            .build()
            .unwrap();
        Server::new(state)
    }

    #[test]
    fn test_address_uses_service_default_port() {
        let addr = server("127.0.0.1", None).address().unwrap();
        assert_eq!(addr.port(), 5102);
    }

    #[test]
    fn test_invalid_address() {
        assert!(matches!(
            server("not a host", Some(80)).address(),
            Err(ServerError::InvalidAddress(_))
        ));
    }
}
