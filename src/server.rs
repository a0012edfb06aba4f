//! Server construction, routing, and graceful shutdown.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use crate::browser;
use crate::config::Config;
use crate::errors::AppError;
use crate::guard;
use crate::handlers;
use crate::render::{self, MarkdownRenderer};
use crate::templates::TemplateCache;
use crate::types::AppState;

/// How long in-flight requests get to finish once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct Server {
    config: Config,
    state: AppState,
    shutdown_rx: mpsc::Receiver<()>,
}

impl Server {
    /// Resolve the served root, build the template cache, and assemble the
    /// shared state. All failures here are fatal startup errors.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let root_dir = config.target_dir.canonicalize()?;
        if !root_dir.is_dir() {
            return Err(AppError::NotFound);
        }
        let templates = TemplateCache::load(&config.template_dir)?;
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let state = AppState {
            root_dir: Arc::new(root_dir),
            static_dir: Arc::new(config.static_dir.clone()),
            templates: Arc::new(templates),
            renderer: Arc::new(MarkdownRenderer::new(render::is_safe_link)),
            shutdown: shutdown_tx,
        };

        Ok(Self {
            config,
            state,
            shutdown_rx,
        })
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind, serve, and drain. The shutdown channel is fed by the API
    /// handler and by OS signals; whichever fires first starts a graceful
    /// drain bounded by [`SHUTDOWN_GRACE`].
    pub async fn run(mut self) -> Result<(), AppError> {
        let app = self.router();
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr).await?;
        log::info!("listening on http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(err) = browser::open_browser(&url) {
                log::warn!("failed to open browser: {}", err);
            }
        }

        let signal_tx = self.state.shutdown.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            let _ = signal_tx.try_send(());
        });

        let (notify_tx, notify_rx) = oneshot::channel::<()>();
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = notify_rx.await;
            })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => result?,
            _ = self.shutdown_rx.recv() => {
                log::info!("shutdown signal received, draining connections");
                let _ = notify_tx.send(());
                match tokio::time::timeout(SHUTDOWN_GRACE, &mut serve).await {
                    Ok(result) => result?,
                    Err(_) => {
                        log::warn!("graceful shutdown timed out after {:?}, forcing exit", SHUTDOWN_GRACE);
                    }
                }
            }
        }

        log::info!("server exited gracefully");
        Ok(())
    }
}

/// Assemble the route table. The path guard runs as middleware ahead of all
/// route matching, so a rejected request never reaches a handler.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_index))
        .route("/welcome", get(handlers::handle_welcome))
        .route("/files", get(handlers::handle_tree))
        .route("/files/", get(handlers::handle_tree))
        .route("/api/list", get(handlers::handle_api_list))
        .route(
            "/api/shutdown",
            post(handlers::handle_shutdown).fallback(handlers::handle_method_not_allowed),
        )
        .route("/static/*path", get(handlers::handle_static))
        .route("/view/*path", get(handlers::handle_view))
        .fallback(handlers::handle_not_found)
        .layer(middleware::from_fn(guard::require_safe_path))
        .with_state(state)
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl-C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                log::error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
