//! Listener resolution for the engine.
//!
//! # Responsibilities
//! - Bind the configured address when no listener was supplied
//! - Adopt a pre-bound std listener into the Tokio runtime
//! - Preserve the OS error text on failure

use std::borrow::Cow;

use tokio::net::TcpListener;

use crate::error::ServerError;

/// Expand a `:port` address to all IPv4 interfaces.
pub fn normalize_bind_address(address: &str) -> Cow<'_, str> {
    if address.starts_with(':') {
        Cow::Owned(format!("0.0.0.0{address}"))
    } else {
        Cow::Borrowed(address)
    }
}

/// Bind a fresh TCP listener on `address`.
pub async fn bind(address: &str) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind(normalize_bind_address(address).as_ref())
        .await
        .map_err(|source| ServerError::Bind {
            address: address.to_string(),
            source,
        })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::debug!(address = %local_addr, "Listener bound");
    }

    Ok(listener)
}

/// Hand an already bound std listener to the Tokio runtime.
pub fn adopt(listener: std::net::TcpListener) -> Result<TcpListener, ServerError> {
    listener.set_nonblocking(true).map_err(ServerError::Listener)?;
    let listener = TcpListener::from_std(listener).map_err(ServerError::Listener)?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::debug!(address = %local_addr, "Adopted pre-bound listener");
    }

    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_port_only_addresses() {
        assert_eq!(normalize_bind_address(":8080"), "0.0.0.0:8080");
        assert_eq!(normalize_bind_address("127.0.0.1:8080"), "127.0.0.1:8080");
        assert_eq!(normalize_bind_address("[::1]:80"), "[::1]:80");
    }

    #[tokio::test]
    async fn bind_reports_address_in_use() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let err = bind(&addr).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
        assert!(err.to_string().contains("address already in use"));
    }

    #[tokio::test]
    async fn adopts_std_listener() {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();

        let listener = adopt(std_listener).unwrap();
        assert_eq!(listener.local_addr().unwrap(), addr);
    }
}
