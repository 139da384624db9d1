//! Film Portfolio Backend
//!
//! Serves the portfolio site's public pages and JSON API, plus the
//! password-protected admin API that edits the site's content documents.

mod api;
mod auth;
mod cache;
mod config;
mod errors;
mod models;
mod slug;
mod store;
mod upload;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::PageCache;
use config::Config;
use models::{
    AboutDocument, ContactDocument, HomePosters, ImportantDocument, PhotoLibrary, Projects,
    UpcomingItems,
};
use store::ContentStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContentStore>,
    pub cache: Arc<PageCache>,
    pub config: Arc<Config>,
    /// Serialises read-modify-write of the photo list
    pub photo_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: ContentStore, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            cache: Arc::new(PageCache::new()),
            config: Arc::new(config),
            photo_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Film Portfolio Backend");
    tracing::info!("Public directory: {:?}", config.public_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if admin is not configured
    if !config.admin_configured() {
        tracing::warn!(
            "ADMIN_PASSWORD or ADMIN_COOKIE_SECRET is not set. Admin login is disabled!"
        );
    }

    // Initialize content store
    let store = ContentStore::from_config(&config.storage)?;
    tracing::info!("Content store: {}", store.backend_name());

    let state = AppState::new(store, config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the cookie secret for the auth layer
    let secret = state.config.admin_secret.clone();
    let upload_max_bytes = state.config.upload_max_bytes;

    // Admin routes
    let admin_routes = Router::new()
        // Projects
        .route(
            "/projects",
            get(api::get_document::<Projects>)
                .put(api::put_document::<Projects>)
                .post(api::put_document::<Projects>),
        )
        .route("/projects/slug", get(api::suggest_slug::<Projects>))
        // Upcoming
        .route(
            "/upcoming",
            get(api::get_document::<UpcomingItems>)
                .put(api::put_document::<UpcomingItems>)
                .post(api::put_document::<UpcomingItems>),
        )
        .route("/upcoming/slug", get(api::suggest_slug::<UpcomingItems>))
        // Contact, about, important
        .route(
            "/contact",
            get(api::get_document::<ContactDocument>)
                .put(api::put_document::<ContactDocument>)
                .post(api::put_document::<ContactDocument>),
        )
        .route(
            "/about",
            get(api::get_document::<AboutDocument>)
                .put(api::put_document::<AboutDocument>)
                .post(api::put_document::<AboutDocument>),
        )
        .route(
            "/important",
            get(api::get_document::<ImportantDocument>)
                .put(api::put_document::<ImportantDocument>)
                .post(api::put_document::<ImportantDocument>),
        )
        // Home posters
        .route(
            "/home-posters",
            get(api::get_document::<HomePosters>)
                .put(api::put_document::<HomePosters>)
                .post(api::put_document::<HomePosters>),
        )
        // Photos
        .route(
            "/photos",
            get(api::get_document::<PhotoLibrary>)
                .put(api::put_photos)
                .post(api::upload_photo)
                .delete(api::delete_photo),
        )
        // Scoped uploads
        .route("/upload", post(api::upload_image))
        .layer(DefaultBodyLimit::max(upload_max_bytes))
        // Apply admin cookie auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(secret.clone(), req, next)
        }));

    // Login/logout (no auth required)
    let session_routes = Router::new()
        .route("/login", post(api::login))
        .route("/logout", post(api::logout));

    // Public read API (no auth required)
    let api_routes = Router::new()
        .route("/projects", get(api::public_document::<Projects>))
        .route("/projects/{slug}", get(api::public_entry::<Projects>))
        .route("/upcoming", get(api::public_document::<UpcomingItems>))
        .route("/upcoming/{slug}", get(api::public_entry::<UpcomingItems>))
        .route("/photos", get(api::public_document::<PhotoLibrary>))
        .route("/home-posters", get(api::public_document::<HomePosters>))
        .route("/contact", get(api::public_document::<ContactDocument>))
        .route("/about", get(api::public_document::<AboutDocument>))
        .nest("/admin", admin_routes.merge(session_routes));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    let public_files = ServeDir::new(&state.config.public_dir);

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .fallback_service(public_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
