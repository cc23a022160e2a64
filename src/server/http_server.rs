use super::response::Reply;
use super::service::AppService;
use crate::error::HandlerError;
use http::header::CONTENT_LENGTH;
use std::any::Any;
use std::io::{self, Cursor, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Blocking HTTP server running an [`AppService`] on a pool of worker threads.
pub struct HttpServer {
    service: AppService,
    workers: usize,
    body_limit: usize,
}

/// Handle to a running [`HttpServer`].
pub struct ServerHandle {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Address the server is bound to; port 0 resolves to the actual port.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the listener until it accepts connections.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server is not ready within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop accepting requests and wait for the workers to finish.
    pub fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        let addr = self.addr;
        if let Err(payload) = self.join() {
            warn!(addr = %addr, panic = %panic_message(&*payload), "HTTP worker panicked");
        }
        info!(addr = %addr, "HTTP server stopped");
    }

    /// Block until every worker exits.
    ///
    /// # Errors
    ///
    /// Returns the payload of the first worker that panicked.
    pub fn join(self) -> thread::Result<()> {
        let mut result = Ok(());
        for worker in self.workers {
            if let Err(panic) = worker.join() {
                if result.is_ok() {
                    result = Err(panic);
                }
            }
        }
        result
    }
}

impl HttpServer {
    /// Serve `service`; the body limit starts at the router's own limit.
    pub fn new(service: AppService) -> Self {
        let body_limit = service.router.max_body_size();
        HttpServer {
            service,
            workers: 4,
            body_limit,
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Bytes read from a request body. Longer bodies are answered with 413
    /// here, before any route sees them.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Bind `addr` and start the workers.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let server = tiny_http::Server::http(addr)
            .map_err(|e| io::Error::new(io::ErrorKind::AddrInUse, e.to_string()))?;
        let bound = server.server_addr().to_ip().unwrap_or(addr);
        let server = Arc::new(server);
        let stop = Arc::new(AtomicBool::new(false));

        let workers = (0..self.workers)
            .map(|i| {
                let server = Arc::clone(&server);
                let stop = Arc::clone(&stop);
                let service = self.service.clone();
                let body_limit = self.body_limit;
                thread::Builder::new()
                    .name(format!("http-worker-{}", i))
                    .spawn(move || serve(&server, &service, &stop, body_limit))
            })
            .collect::<io::Result<Vec<_>>>()?;

        info!(addr = %bound, workers = self.workers, "HTTP server started");
        Ok(ServerHandle {
            addr: bound,
            stop,
            workers,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn serve(server: &tiny_http::Server, service: &AppService, stop: &AtomicBool, body_limit: usize) {
    while !stop.load(Ordering::SeqCst) {
        let mut request = match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(err) => {
                warn!(error = %err, "Failed to receive request");
                continue;
            }
        };
        let response = match to_http_request(&mut request, body_limit) {
            Ok(req) if req.body().len() > body_limit => {
                debug!(limit = body_limit, path = %req.uri().path(), "Request body too large");
                service.router.respond(
                    &req,
                    Reply::error(413, HandlerError::exposed(413, "Request body too large")),
                )
            }
            Ok(req) => service.call(req),
            Err(err) => {
                debug!(error = %err, "Malformed request");
                let mut response = http::Response::new(Vec::new());
                *response.status_mut() = http::StatusCode::BAD_REQUEST;
                response
            }
        };
        if let Err(err) = request.respond(to_tiny_response(response)) {
            warn!(error = %err, "Failed to write response; client gone");
        }
    }
}

fn to_http_request(
    request: &mut tiny_http::Request,
    body_limit: usize,
) -> Result<http::Request<Vec<u8>>, http::Error> {
    let mut body = Vec::new();
    if let Err(err) = request
        .as_reader()
        .take(body_limit as u64 + 1)
        .read_to_end(&mut body)
    {
        debug!(error = %err, "Failed to read request body");
    }

    let mut builder = http::Request::builder()
        .method(request.method().as_str())
        .uri(request.url());
    for header in request.headers() {
        builder = builder.header(header.field.as_str().as_str(), header.value.as_str());
    }
    builder.body(body)
}

fn to_tiny_response(response: http::Response<Vec<u8>>) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let (parts, body) = response.into_parts();
    let mut length = body.len();
    let mut headers = Vec::with_capacity(parts.headers.len());
    for (name, value) in &parts.headers {
        if name == CONTENT_LENGTH {
            if let Some(declared) = value.to_str().ok().and_then(|v| v.parse().ok()) {
                length = declared;
            }
            continue;
        }
        match tiny_http::Header::from_bytes(name.as_str().as_bytes(), value.as_bytes()) {
            Ok(header) => headers.push(header),
            Err(()) => warn!(header = %name, "Dropping invalid response header"),
        }
    }
    tiny_http::Response::new(
        tiny_http::StatusCode(parts.status.as_u16()),
        headers,
        Cursor::new(body),
        Some(length),
        None,
    )
}
