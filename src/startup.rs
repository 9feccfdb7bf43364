use crate::authentication::{reject_anonymous_admins, SessionGate, StaticAccount, SystemClock};
use crate::configuration::{DatabaseSettings, Settings};
use crate::coupons::seed_catalog_if_empty;
use crate::routes::{
    add_coupon, delete_coupon, health_check, json_error_handler, list_all_coupons,
    list_all_subscribers, list_coupons, login, logout, query_error_handler, submit_coupon,
    subscribe, update_coupon_status, who_am_i,
};
use actix_session::config::PersistentSession;
use actix_session::storage::RedisSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use actix_web_lab::middleware::from_fn;
use anyhow::Context;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(
        pg_pool: PgPool,
        settings: Settings,
        session_gate: SessionGate,
    ) -> Result<Self, anyhow::Error> {
        if settings.application.seed_catalog {
            seed_catalog_if_empty(&pg_pool)
                .await
                .context("Failed to seed the coupon catalog")?;
        }

        // Port 0 lets the OS pick a free port, read back the real one
        let listener = TcpListener::bind(settings.application.get_url())?;
        let port = listener.local_addr()?.port();
        let server = run(listener, pg_pool, session_gate, settings).await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    // Server is a future, it only serves requests while it is polled
    pub async fn run_until_terminated(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_pg_pool(database: &DatabaseSettings) -> PgPool {
    // Lazy pool: no connection is opened until the first query
    // so the binary starts even while Postgres is still booting
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(database.get_pg_options_with_db())
}

/// The production gate: the configured administrator account and the wall clock.
pub fn get_session_gate(settings: &Settings) -> Result<SessionGate, anyhow::Error> {
    let account = StaticAccount::new(settings.admin.username.clone(), &settings.admin.password)
        .context("Failed to prepare the administrator account")?;
    Ok(SessionGate::new(
        Arc::new(account),
        Arc::new(SystemClock),
        settings.session.ttl(),
    ))
}

async fn run(
    listener: TcpListener,
    pg_pool: PgPool,
    session_gate: SessionGate,
    settings: Settings,
) -> Result<Server, anyhow::Error> {
    // Key signs and encrypts the session cookie, only the session id travels
    // to the browser, the ticket itself stays in Redis
    let secret_key = Key::try_from(settings.session.secret_key.expose_secret().as_bytes())
        .context("Session secret key must be at least 64 bytes long")?;
    let redis_store = RedisSessionStore::new(settings.redis_uri.expose_secret()).await?;
    // Redis forgets the session after the same TTL the gate enforces
    let session_ttl = CookieDuration::seconds(session_gate.ttl().num_seconds());
    let cookie_secure = settings.session.cookie_secure;

    // HttpServer::new runs the closure once per worker thread
    // web::Data is an Arc, every worker shares the same pool and gate
    let pg_pool = Data::new(pg_pool);
    let session_gate = Data::new(session_gate);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(redis_store.clone(), secret_key.clone())
                    .session_lifecycle(PersistentSession::default().session_ttl(session_ttl))
                    .cookie_secure(cookie_secure)
                    .build(),
            )
            // Middlewares wrap in reverse order: TracingLogger sees the request first
            // so the session lookup already runs inside the request span
            .wrap(TracingLogger::default())
            // Extractor failures default to plain-text bodies, keep them in the
            // `{"error": ..}` shape the rest of the API answers with
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/login", web::post().to(login))
                    .route("/logout", web::post().to(logout))
                    .route("/me", web::get().to(who_am_i))
                    .route("/coupons", web::get().to(list_coupons))
                    .route("/coupons", web::post().to(submit_coupon))
                    .route("/subscribe", web::post().to(subscribe))
                    .service(
                        // Every route in this scope sits behind the session gate
                        web::scope("/admin")
                            .wrap(from_fn(reject_anonymous_admins))
                            .route("/coupons", web::get().to(list_all_coupons))
                            .route("/coupons", web::post().to(add_coupon))
                            .route("/coupons/{id}", web::put().to(update_coupon_status))
                            .route("/coupons/{id}", web::delete().to(delete_coupon))
                            .route("/subscribers", web::get().to(list_all_subscribers)),
                    ),
            )
            .app_data(pg_pool.clone())
            .app_data(session_gate.clone())
    })
    .listen(listener)?
    .run();
    // The server is built but does nothing until the caller awaits it

    Ok(server)
}
