//! Uniform contract for services managed by a host process.

use async_trait::async_trait;

use crate::error::ServerError;

/// A long-running service the host can start, stop and check for readiness.
///
/// Object safe, so heterogeneous services can be held as
/// `Arc<dyn ManagedService>`.
#[async_trait]
pub trait ManagedService: Send + Sync {
    /// Display name used in logs and health reports.
    fn name(&self) -> &str;

    /// Start the service. Blocks until the service stops.
    async fn listen(&self) -> Result<(), ServerError>;

    /// Stop the service and wait until it has fully exited.
    async fn close(&self) -> Result<(), ServerError>;

    /// `Ok` while the service accepts work, [`ServerError::NotReady`] otherwise.
    async fn is_ready(&self) -> Result<(), ServerError>;
}
