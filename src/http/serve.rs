//! Accept loop and connection tracking for the engine.
//!
//! # Responsibilities
//! - Accept connections until shutdown is requested, then drop the listener
//! - Serve each connection over HTTP/1.1 or HTTP/2 on its own task
//! - Drain connections on shutdown, aborting those that outlive the grace period
//!
//! # Design Decisions
//! - Connection tasks live in a `JoinSet` so the loop can wait for them and
//!   abort them; nothing outlives `serve`
//! - Each connection watches the lifecycle phase itself and switches to
//!   graceful shutdown (finish in-flight request, refuse new ones)

use std::future::Future;
use std::io;
use std::pin::pin;
use std::time::Duration;

use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder,
    service::TowerToHyperService,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use crate::lifecycle::{Exit, Lifecycle};

/// Serve `router` on `listener` until the lifecycle enters `Closing`.
///
/// Returns once every connection has finished or been aborted.
pub(crate) async fn serve(
    listener: TcpListener,
    router: Router,
    lifecycle: &Lifecycle,
    grace: Option<Duration>,
) -> io::Result<Exit> {
    let builder = Builder::new(TokioExecutor::new());
    let mut connections = JoinSet::new();
    let mut closing = pin!(lifecycle.closing());

    loop {
        tokio::select! {
            () = closing.as_mut() => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::trace!(peer = %peer, "Connection accepted");
                    connections.spawn(serve_connection(
                        builder.clone(),
                        stream,
                        router.clone(),
                        lifecycle.closing(),
                    ));
                }
                Err(e) if is_connection_error(&e) => {
                    tracing::debug!(error = %e, "Connection dropped before accept");
                }
                Err(e) => {
                    connections.abort_all();
                    drain(&mut connections).await;
                    return Err(e);
                }
            },
        }
    }

    drop(listener);
    tracing::debug!(open = connections.len(), "Listener closed, draining connections");

    let drained = match grace {
        None => {
            drain(&mut connections).await;
            true
        }
        Some(grace) => tokio::time::timeout(grace, drain(&mut connections))
            .await
            .is_ok(),
    };
    if drained {
        return Ok(Exit::Graceful);
    }

    tracing::warn!(
        open = connections.len(),
        grace_ms = grace.map_or(0, |g| g.as_millis() as u64),
        "Grace period elapsed, aborting open connections"
    );
    connections.abort_all();
    drain(&mut connections).await;
    Ok(Exit::Forced)
}

async fn drain(connections: &mut JoinSet<()>) {
    while connections.join_next().await.is_some() {}
}

async fn serve_connection(
    builder: Builder<TokioExecutor>,
    stream: TcpStream,
    router: Router,
    closing: impl Future<Output = ()>,
) {
    let service = TowerToHyperService::new(router);
    let mut conn = pin!(builder.serve_connection_with_upgrades(TokioIo::new(stream), service));
    let mut closing = pin!(closing);

    let res = tokio::select! {
        res = conn.as_mut() => res,
        () = closing.as_mut() => {
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
    };

    if let Err(e) = res {
        tracing::debug!(error = %e, "Connection closed with error");
    }
}

/// Errors that concern a single pending connection, not the listener.
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_connection_accept_errors_are_not_fatal() {
        assert!(is_connection_error(&io::Error::from(io::ErrorKind::ConnectionAborted)));
        assert!(is_connection_error(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(!is_connection_error(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }
}
