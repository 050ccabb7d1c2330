use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use ntex::http::Method;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{critical, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::poller::Poller;
use crate::render::{SiteRenderer, TemplateRenderer};
use crate::render_tree::{Resolved, INDEX_FILE};
use crate::site::{LiveSite, Site};

const MIN_POLL_SECS: u64 = 1;

struct AppState {
    site: Arc<LiveSite>,
    renderer: TemplateRenderer,
    static_dir: Option<PathBuf>,
}

/// Outcome of looking a request path up in the site.
#[derive(Debug, PartialEq)]
pub(crate) enum Reply {
    Page(Vec<u8>),
    Feed(Vec<u8>),
    Redirect(String),
    NotFound,
    Failed(String),
}

pub(crate) fn resolve_request<R: SiteRenderer>(site: &Site, path: &str, renderer: &R) -> Reply {
    let rendered = match site.tree().resolve(path) {
        None if path.trim_matches('/') == INDEX_FILE => renderer.render_index(site.posts().as_slice(), ""),
        None => return Reply::NotFound,
        Some(Resolved::Root(_)) => renderer.render_index(site.posts().as_slice(), ""),
        Some(Resolved::Directory(dir)) => return Reply::Redirect(dir.redirect_target()),
        Some(Resolved::Redirect(target)) => return Reply::Redirect(target.to_string()),
        Some(Resolved::Post { post, root_path }) => renderer.render_post(post, &root_path),
        Some(Resolved::Feed(posts)) => {
            return match renderer.render_feed(posts) {
                Ok(feed) => Reply::Feed(feed),
                Err(e) => Reply::Failed(format!("Error rendering feed: {}", e)),
            };
        }
    };

    match rendered {
        Ok(page) => Reply::Page(page),
        Err(e) => Reply::Failed(format!("Error rendering {}: {}", path, e)),
    }
}

#[web::get("/static/{file_name}*")]
async fn static_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> std::result::Result<NamedFile, web::Error> {
    if path.contains("..") {
        return Err(web::error::ErrorForbidden("Access forbidden").into());
    }

    let Some(ref static_dir) = state.static_dir else {
        return Err(web::error::ErrorNotFound("No static files").into());
    };

    Ok(NamedFile::open(static_dir.join(path.into_inner()))?)
}

async fn serve_tree(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return web::HttpResponse::MethodNotAllowed().finish();
    }

    let site = state.site.snapshot();
    match resolve_request(&site, req.path(), &state.renderer) {
        Reply::Page(page) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(page),
        Reply::Feed(feed) => web::HttpResponse::Ok()
            .content_type("application/rss+xml; charset=utf-8")
            .body(feed),
        Reply::Redirect(target) => web::HttpResponse::MovedPermanently()
            .header("Location", target)
            .finish(),
        Reply::NotFound => web::HttpResponse::NotFound()
            .body(format!("Not found: {}", req.path())),
        Reply::Failed(message) => {
            warn!("{}", message);
            web::HttpResponse::InternalServerError()
                .body(message)
        }
    }
}

pub async fn server_run(config: Config) -> Result<()> {
    let config = Arc::new(config);
    let site = Arc::new(LiveSite::load(&config.posts_dir, config.feed)?);

    let poll_secs = config.poll_interval.max(MIN_POLL_SECS);
    let poller = Poller::new(site.clone(), Duration::from_secs(poll_secs));
    let stop = poller.stop_handle();
    tokio::spawn(async move {
        // Serving stale posts forever is worse than going down
        if let Err(err) = poller.run().await {
            critical!("Error reloading posts, shutting down: {}", err);
            process::exit(1);
        }
    });

    let bind_addr = config.address.clone();
    let bind_port = config.port;
    let app_state = Arc::new(AppState {
        site,
        renderer: TemplateRenderer::new(config.clone()),
        static_dir: config.static_files_dir.clone(),
    });

    info!("Polling posts every {} seconds", poll_secs);
    let server = web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(static_files)
            .default_service(web::route().to(serve_tree))
    })
        .bind((bind_addr.clone(), bind_port))
        .map_err(|source| Error::Server { address: format!("{}:{}", bind_addr, bind_port), source })?;

    let res = server.run().await;
    stop.stop();
    res.map_err(|source| Error::Server { address: format!("{}:{}", config.address, config.port), source })
}
