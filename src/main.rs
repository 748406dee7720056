use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use redis::Client as RedisClient;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use examboard_api::{config::Config, db, middleware::auth::JwtSecret, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let redis_client = RedisClient::open(config.redis_url.as_str())?;
    let redis_conn = redis_client.get_multiplexed_async_connection().await?;
    info!("Redis connected");

    let state = AppState {
        db: pool,
        redis: redis_conn,
        redis_client: redis_client.clone(),
        config: config.clone(),
    };

    // Display views are public and may be embedded anywhere on the base
    // domain; localhost is always allowed for development.
    let base_url = config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
            return true;
        }
        o == base_url
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Display view (public)
        .route("/exam", get(routes::exam::get_exam).put(routes::exam::save_exam))
        .route(
            "/announcements",
            get(routes::announcements::list_announcements)
                .post(routes::announcements::create_announcement),
        )
        .route(
            "/announcements/{id}",
            delete(routes::announcements::delete_announcement),
        )
        .route(
            "/settings",
            get(routes::settings::get_settings).put(routes::settings::update_settings),
        )
        .route("/ws", get(routes::websocket::ws_handler))
        // Presets
        .route("/presets", get(routes::presets::list_presets))
        .route("/presets/capture", post(routes::presets::capture_preset))
        .route("/presets/{id}", delete(routes::presets::delete_preset))
        .route("/presets/{id}/apply", post(routes::presets::apply_preset))
        // Auth
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/password", post(routes::auth::password_login))
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/auth/admin-password",
            get(routes::auth::admin_password_status).put(routes::auth::set_admin_password),
        )
        // Admin registry
        .route("/admins", get(routes::admins::list_admins).post(routes::admins::add_admin))
        .route("/admins/{email}", delete(routes::admins::remove_admin))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("examboard API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
