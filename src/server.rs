//! HTTP endpoint serving freshly rendered wallpapers
//!
//! `GET /api/wallpaper?<params>` answers with a PNG rendered for the
//! current date. A fixed pool of worker threads shares one
//! [`tiny_http::Server`], each blocking in `recv()`.

use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::query::{config_from_query, WALLPAPER_PATH};
use crate::rendering::raster::generate_wallpaper;
use crate::rendering::FontBook;
use crate::{Error, Result};

/// Listener settings for `lifegrid serve`.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub addr: String,
    pub workers: usize,
    /// Preferred font file; system fonts are always available.
    pub font: Option<PathBuf>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            workers: num_cpus::get(),
            font: None,
        }
    }
}

/// A fully formed response, independent of the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub no_cache: bool,
}

impl Reply {
    fn json_error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string().into_bytes();
        Self {
            status,
            content_type: "application/json",
            body,
            no_cache: false,
        }
    }

    fn png(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "image/png",
            body,
            no_cache: true,
        }
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut headers = vec![("Content-Type", self.content_type)];
        if self.no_cache {
            headers.extend([
                ("Cache-Control", "no-cache, no-store, must-revalidate"),
                ("Pragma", "no-cache"),
                ("Expires", "0"),
            ]);
        }
        if self.status == 405 {
            headers.push(("Allow", "GET"));
        }
        let mut response = Response::from_data(self.body).with_status_code(self.status);
        for (name, value) in headers {
            if let Ok(h) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                response.add_header(h);
            }
        }
        response
    }
}

/// Route one request. `now` fixes the calendar period being drawn.
pub fn handle(method: &Method, url: &str, now: DateTime<Utc>, fonts: Option<&FontBook>) -> Reply {
    let path = url.split('?').next().unwrap_or_default();
    if path != WALLPAPER_PATH {
        return Reply::json_error(404, "not found");
    }
    if *method != Method::Get {
        return Reply::json_error(405, "method not allowed");
    }

    let render = || {
        let config = config_from_query(url, now);
        generate_wallpaper(&config, now, fonts)
    };
    let result = catch_unwind(AssertUnwindSafe(render))
        .unwrap_or_else(|_| Err(Error::RenderError("renderer panicked".into())));
    match result {
        Ok(wallpaper) => Reply::png(wallpaper.png_data),
        Err(e) => {
            log::error!("wallpaper error for {}: {}", url, e);
            Reply::json_error(500, &e.to_string())
        }
    }
}

/// A bound listener that has not started serving yet.
pub struct WallpaperServer {
    server: Arc<Server>,
    fonts: Arc<FontBook>,
    workers: usize,
}

impl WallpaperServer {
    /// Bind the listener and load the font book.
    pub fn bind(config: &ServeConfig) -> Result<Self> {
        let fonts = FontBook::discover(config.font.as_deref())?;
        let server = Server::http(&config.addr)
            .map_err(|e| Error::Other(format!("cannot listen on {}: {}", config.addr, e)))?;
        Ok(Self {
            server: Arc::new(server),
            fonts: Arc::new(fonts),
            workers: config.workers.max(1),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Start the worker threads and return immediately.
    pub fn spawn(self) -> ServerHandle {
        let shutdown = Arc::new(AtomicBool::new(false));
        let threads = (0..self.workers)
            .map(|id| {
                let server = Arc::clone(&self.server);
                let fonts = Arc::clone(&self.fonts);
                let shutdown = Arc::clone(&shutdown);
                thread::spawn(move || worker_loop(id, &server, &fonts, &shutdown))
            })
            .collect();
        if let Some(addr) = self.local_addr() {
            log::info!("serving http://{}{} with {} workers", addr, WALLPAPER_PATH, self.workers);
        }
        ServerHandle {
            server: self.server,
            threads,
            shutdown,
        }
    }

    /// Serve until the process exits.
    pub fn run(self) -> Result<()> {
        let handle = self.spawn();
        for t in handle.threads {
            t.join()
                .map_err(|_| Error::Other("server worker panicked".into()))?;
        }
        Ok(())
    }
}

/// Running workers; dropping it leaves them running, [`ServerHandle::shutdown`]
/// stops them.
pub struct ServerHandle {
    server: Arc<Server>,
    threads: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for _ in &self.threads {
            self.server.unblock();
        }
        for t in self.threads {
            let _ = t.join();
        }
    }
}

fn worker_loop(id: usize, server: &Server, fonts: &FontBook, shutdown: &AtomicBool) {
    loop {
        let request = match server.recv() {
            Ok(rq) => rq,
            Err(e) => {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                log::warn!("worker {}: accept failed: {}", id, e);
                continue;
            }
        };
        respond(request, fonts);
    }
    log::debug!("worker {} stopped", id);
}

fn respond(request: Request, fonts: &FontBook) {
    let started = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_string();
    let reply = handle(&method, &url, Utc::now(), Some(fonts));
    let status = reply.status;
    let bytes = reply.body.len();
    if let Err(e) = request.respond(reply.into_response()) {
        log::warn!("{} {}: failed to send response: {}", method, url, e);
        return;
    }
    log::info!(
        "{} {} -> {} ({} bytes, {} ms)",
        method,
        url,
        status,
        bytes,
        started.elapsed().as_millis()
    );
}
