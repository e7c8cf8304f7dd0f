//! Adapter selection from a stored server record.

use super::{AdapterOptions, MediaServer, SrsServer, ZlmServer};
use crate::errors::MediaError;
use crate::models::{ServerDescriptor, ServerType};
use tracing::{debug, warn};

/// Builds a fresh adapter per call; nothing is cached.
pub struct MediaServerFactory;

impl MediaServerFactory {
    /// Create an adapter with default options.
    ///
    /// # Errors
    ///
    /// See [`MediaServerFactory::create_with`].
    pub fn create(descriptor: ServerDescriptor) -> Result<Box<dyn MediaServer>, MediaError> {
        Self::create_with(descriptor, &AdapterOptions::default())
    }

    /// Create the adapter named by the descriptor's type tag, ignoring case.
    ///
    /// # Errors
    ///
    /// - `MediaError::UnsupportedServerType` naming the tag when no adapter
    ///   exists for it
    /// - `MediaError::Transport` if the adapter's HTTP client cannot be built
    pub fn create_with(
        descriptor: ServerDescriptor,
        options: &AdapterOptions,
    ) -> Result<Box<dyn MediaServer>, MediaError> {
        let server: Box<dyn MediaServer> = match ServerType::from_tag(&descriptor.server_type) {
            Some(ServerType::Srs) => Box::new(SrsServer::new(
                &descriptor.host,
                descriptor.port,
                options,
            )?),
            Some(ServerType::Zlm) => Box::new(ZlmServer::new(
                &descriptor.host,
                descriptor.port,
                descriptor.secret,
                options,
            )?),
            Some(ServerType::Custom) | None => {
                warn!(target: "mg.servers.factory", server_type = %descriptor.server_type, "No adapter for server type");
                return Err(MediaError::UnsupportedServerType(descriptor.server_type));
            }
        };

        debug!(
            target: "mg.servers.factory",
            server_type = %server.server_type(),
            host = %descriptor.host,
            port = descriptor.port,
            "Created media server adapter"
        );
        Ok(server)
    }
}
