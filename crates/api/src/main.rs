// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{convert::Infallible, error::Error, net::SocketAddr, sync::Arc};

use diesel::Connection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpListener;

use quiz_registration_api::capacity::DEFAULT_MAX_TEAM_SIZE;
use quiz_registration_api::email::{NoopNotifier, RosterNotifier, SmtpNotifier};
use quiz_registration_api::web::AppContext;
use quiz_registration_api::{captcha, db, web};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Default RUST_LOG to debug, keeping an operator-set value
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "debug");
        }
    }
    tracing_subscriber::fmt::init();

    for var in &[
        "EMAIL_SMTP_SERVER",
        "EMAIL_SMTP_USERNAME",
        "EMAIL_SMTP_PASSWORD",
        "EMAIL_FROM_ADDRESS",
    ] {
        if std::env::var(var).is_err() {
            tracing::warn!(
                "Environment variable {var} is not set; roster summary emails will only be logged!"
            );
        }
    }

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    {
        let mut pg_connection = diesel::pg::PgConnection::establish(&database_url)
            .expect("Failed to connect to database for migrations");
        db::run_migrations(&mut pg_connection).expect("Failed to run database migrations");
    }

    let max_team_size = std::env::var("MAX_TEAM_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_TEAM_SIZE);
    let port: u16 = std::env::var("LISTEN_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);

    let notifier: Box<dyn RosterNotifier + Send + Sync> = match SmtpNotifier::from_env() {
        Some(notifier) => Box::new(notifier),
        None => Box::new(NoopNotifier),
    };

    let ctx = Arc::new(AppContext {
        db_pool: {
            let manager =
                AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(database_url);
            diesel_async::pooled_connection::bb8::Pool::builder()
                .build(manager)
                .await
                .expect("Failed to create DB connection pool")
        },
        captcha: captcha::select_verifier(),
        notifier,
        max_team_size,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0, 0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    loop {
        let (stream, _remote_addr) = listener.accept().await?;

        let io = TokioIo::new(stream);
        let ctx = ctx.clone();

        tokio::spawn(async move {
            if let Err(e) = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                .serve_connection(
                    io,
                    service_fn(move |req| {
                        let ctx = ctx.clone();
                        async move { Ok::<_, Infallible>(web::handle_request(ctx, req).await) }
                    }),
                )
                .await
            {
                tracing::error!("Error serving connection: {e}");
            }
        });
    }
}
