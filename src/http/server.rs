//! Connection loop

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::WorkerHandler;

/// Serve until Ctrl+C
pub async fn serve(listener: TcpListener, handler: WorkerHandler) -> std::io::Result<()> {
    serve_with_shutdown(listener, handler, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
    })
    .await
}

/// Serve until `shutdown` resolves
///
/// Connections already accepted keep running on their own tasks.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    handler: WorkerHandler,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    let local_addr = listener.local_addr()?;
    let handler = Arc::new(handler);
    let http_server = ConnBuilder::new(TokioExecutor::new());
    tokio::pin!(shutdown);

    info!("HTTP server running at http://{}", local_addr);

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((socket, peer)) => {
                        let handler = handler.clone();
                        let http_server = http_server.clone();
                        tokio::spawn(async move {
                            let service = service_fn(move |request| {
                                dispatch(handler.clone(), request)
                            });
                            let conn = http_server.serve_connection(TokioIo::new(socket), service);
                            if let Err(e) = conn.await {
                                warn!("Connection error from {}: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received, no longer accepting connections");
                break;
            }
        }
    }

    Ok(())
}

async fn dispatch(
    handler: Arc<WorkerHandler>,
    request: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = request.into_parts();
    let response = match body.collect().await {
        Ok(collected) => handler.handle(Request::from_parts(parts, collected.to_bytes())),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            let mut response = Response::new(Bytes::new());
            *response.status_mut() = StatusCode::BAD_REQUEST;
            response
        }
    };
    Ok(response.map(Full::new))
}
