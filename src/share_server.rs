use crate::{
    assets::{AssetProvider, detect_content_type, load_asset},
    config::Config,
    listing::Listing,
    registry::LinkRegistry,
    template::Templates,
};
use anyhow::{Error, Result, anyhow};
use std::{fs::File as FsFile, io::ErrorKind, thread};
use tiny_http::{Header, Method, Request, Response, ResponseBox, Server, StatusCode};
use tracing::{debug, error, info};

pub enum Body {
    Empty,
    Bytes(Vec<u8>),
    File(FsFile),
}

/// What a route answers, before it becomes a tiny_http response.
pub struct Reply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Body,
}

impl Reply {
    fn ok(content_type: impl Into<String>, body: Body) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.into()),
            body,
        }
    }

    fn status(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Body::Empty,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: Some("text/plain; charset=utf-8".into()),
            body: Body::Bytes(b"404 page not found".to_vec()),
        }
    }

    fn into_response(self) -> Result<ResponseBox> {
        let response = match self.body {
            Body::Empty => Response::empty(StatusCode(self.status)).boxed(),
            Body::Bytes(bytes) => Response::from_data(bytes)
                .with_status_code(self.status)
                .boxed(),
            Body::File(file) => Response::from_file(file)
                .with_status_code(self.status)
                .boxed(),
        };

        let Some(content_type) = self.content_type else {
            return Ok(response);
        };

        let header = Header::from_bytes("content-type", content_type)
            .map_err(|_| Error::msg("Could not create header"))?;

        Ok(response.with_header(header))
    }
}

pub struct ShareServer {
    config: Config,
    registry: LinkRegistry,
    assets: Box<dyn AssetProvider>,
    templates: Templates,
}

impl ShareServer {
    pub fn new(
        config: Config,
        registry: LinkRegistry,
        assets: Box<dyn AssetProvider>,
        templates: Templates,
    ) -> Self {
        Self {
            config,
            registry,
            assets,
            templates,
        }
    }

    /// Binds the listener and serves until the process is killed.
    pub fn start(&self) -> Result<()> {
        let bind_addr = self.config.bind_addr();
        let server = Server::http(&bind_addr)
            .map_err(|error| anyhow!("Could not bind to {bind_addr}: {error}"))?;

        info!(
            bind = %bind_addr,
            links = self.registry.links().len(),
            "Share server started"
        );

        for link in self.registry.links() {
            info!(name = %link.name, uri = %link.uri, "Sharing");
        }

        self.serve(&server);

        Ok(())
    }

    /// Accepts requests until the listener is unblocked, each on its own
    /// thread. Returns once every in-flight request has finished.
    fn serve(&self, server: &Server) {
        thread::scope(|scope| {
            for request in server.incoming_requests() {
                scope.spawn(move || self.respond(request));
            }
        });
    }

    fn respond(&self, request: Request) {
        let reply = self.handle(request.method(), request.url());

        debug!(
            method = %request.method(),
            url = request.url(),
            status = reply.status,
            "Request"
        );

        let result = reply
            .into_response()
            .and_then(|response| request.respond(response).map_err(Error::from));

        if let Err(error) = result {
            debug!("Error while responding: {error}");
        }
    }

    pub fn handle(&self, method: &Method, url: &str) -> Reply {
        if !matches!(method, Method::Get | Method::Head) {
            return Reply::not_found();
        }

        let path = url.split(['?', '#']).next().unwrap_or_default();

        if path == "/" {
            return self.listing();
        }

        if let Some(file) = path.strip_prefix("/static/") {
            if file.is_empty() || file.contains('/') {
                return Reply::not_found();
            }

            return match urlencoding::decode(file) {
                Ok(file) => self.static_asset(&file),
                Err(_) => Reply::not_found(),
            };
        }

        match urlencoding::decode(path) {
            Ok(path) => self.shared_file(&path),
            Err(_) => Reply::not_found(),
        }
    }

    fn listing(&self) -> Reply {
        match Listing::new(&self.registry).render(&self.templates) {
            Ok(html) => Reply::ok("text/html; charset=utf-8", Body::Bytes(html.into_bytes())),
            Err(error) => {
                error!("Could not render listing: {error:#}");
                Reply::status(500)
            }
        }
    }

    fn static_asset(&self, file: &str) -> Reply {
        match load_asset(self.assets.as_ref(), file) {
            Ok(Some(content)) => {
                let content_type = detect_content_type(file, &content);
                Reply::ok(content_type, Body::Bytes(content))
            }
            Ok(None) => Reply::not_found(),
            Err(error) => {
                error!("[Assets] {error}");
                Reply::status(500)
            }
        }
    }

    fn shared_file(&self, uri: &str) -> Reply {
        let Some(file) = self.registry.file_for_uri(uri) else {
            return Reply::not_found();
        };

        match file.open() {
            Ok(fs_file) => Reply::ok(file.content_type.as_str(), Body::File(fs_file)),
            Err(error) if error.kind() == ErrorKind::NotFound => Reply::not_found(),
            Err(error) => {
                error!(path = %file.path.display(), "Could not open shared file: {error}");
                Reply::status(500)
            }
        }
    }
}
