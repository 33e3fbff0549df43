use axum::{
    middleware,
    routing::{get, get_service, post},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Executor;
use std::env;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use humsafar::web::middleware::auth as auth_middleware;
use humsafar::web::routes::{assistant, auth, home, profile, requests, rides, trips};

const SCHEMA_SQL: &str = include_str!("../schema.sql");

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();

    // 2. Connect to the database and make sure the tables exist
    let db_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://humsafar.db?mode=rwc".to_string());
    info!("Connecting to database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Cannot connect to DB");

    pool.execute(SCHEMA_SQL)
        .await
        .expect("Cannot apply schema");

    // 3. Dashboard routes live behind one auth middleware layer
    let protected_routes = Router::new()
        .route(
            "/rides",
            get(rides::rides_handler).post(rides::create_ride_handler),
        )
        .route("/rides/:ride_id/book", post(rides::book_ride_handler))
        .route("/offer", get(requests::offer_handler))
        .route("/requests", post(requests::post_request_handler))
        .route(
            "/requests/:request_id/accept",
            post(requests::accept_request_handler),
        )
        .route("/trips", get(trips::trips_handler))
        .route(
            "/trips/:trip_id/advance",
            post(trips::advance_status_handler),
        )
        .route("/trips/:trip_id/feedback", post(trips::feedback_handler))
        .route(
            "/profile",
            get(profile::profile_handler).post(profile::update_profile_handler),
        )
        .route("/profile/role", post(profile::switch_role_handler))
        .route("/api/assistant", post(assistant::assistant_handler))
        .route("/logout", post(auth::logout_handler))
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            auth_middleware::require_auth,
        ));

    // 4. Assemble the whole application
    let app = Router::new()
        // Public routes
        .route("/", get(home::home_page))
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route(
            "/register",
            get(auth::register_page).post(auth::register_handler),
        )
        // Protected routes
        .merge(protected_routes)
        // Static files
        .nest_service(
            "/assets",
            get_service(ServeDir::new("assets")).layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            )),
        )
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        // State
        .with_state(pool);

    // 5. Start the server (with fallback port)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            warn!(
                "Could not bind on {}: {}. Trying fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Cannot parse fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Cannot bind on fallback port")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    info!("HumSafar running on http://{}", bound_addr);
    info!("Go to http://{}/login to sign in", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
