//! Server entry point for running Terraform providers
//!
//! Binds a local TCP listener, prints the go-plugin handshake line on
//! stdout, and serves the plugin protocol over gRPC. Providers normally
//! call [`serve`] from their `main` and nothing else.

use crate::error::{Result, TfbridgeError};
use crate::grpc::ProviderService;
use crate::proto::tfplugin6::provider_server::ProviderServer;
use crate::provider::Provider;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to a PEM certificate file. TLS is only enabled when both
    /// `cert_path` and `key_path` are set; Terraform accepts plaintext
    /// for locally launched plugins.
    pub cert_path: Option<PathBuf>,
    /// Path to the matching PEM key file
    pub key_path: Option<PathBuf>,
    /// Maximum gRPC message size in bytes
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cert_path: None,
            key_path: None,
            max_message_size: 256 << 20, // 256MB
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the certificate path
    pub fn with_cert_path(mut self, path: PathBuf) -> Self {
        self.cert_path = Some(path);
        self
    }

    /// Set the key path
    pub fn with_key_path(mut self, path: PathBuf) -> Self {
        self.key_path = Some(path);
        self
    }

    /// Set the maximum message size
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }
}

/// Main entry point for running a provider
///
/// Logging must go to stderr; stdout carries the handshake line that
/// Terraform parses to find the server.
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    // reqwest may have installed a provider already, so a failure here
    // only means one is in place.
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let service = ProviderServer::new(ProviderService::new(provider))
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let tls_config = match (&config.cert_path, &config.key_path) {
        (Some(cert_path), Some(key_path)) => {
            let cert = tokio::fs::read(cert_path).await.map_err(|e| {
                TfbridgeError::TlsError(format!("Failed to read certificate: {}", e))
            })?;
            let key = tokio::fs::read(key_path)
                .await
                .map_err(|e| TfbridgeError::TlsError(format!("Failed to read key: {}", e)))?;
            Some(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))
        }
        _ => None,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let bound_addr = listener.local_addr()?;
    tracing::debug!(port = bound_addr.port(), "provider server listening");

    // go-plugin handshake: CORE-PROTOCOL-VERSION|APP-PROTOCOL-VERSION|NETWORK|ADDR|PROTOCOL
    println!("1|6|tcp|127.0.0.1:{}|grpc", bound_addr.port());

    let mut builder = Server::builder();
    if let Some(tls) = tls_config {
        builder = builder.tls_config(tls)?;
    }

    let incoming = TcpListenerStream::new(listener);
    builder
        .add_service(service)
        .serve_with_incoming(incoming)
        .await?;

    Ok(())
}

/// Convenience function to run a provider with default configuration
pub async fn serve_default<P: Provider + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::default()).await
}
