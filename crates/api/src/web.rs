// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP surface of the registration workflow: the application context
//! constructed once at startup, and the router dispatching on method and
//! path segments. Workflow failures are recovered here and rendered as a
//! single flash message on the stage's form.

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::header::{CONTENT_TYPE, HeaderValue, LOCATION};
use hyper::{Method, Request, Response, StatusCode};

use crate::captcha::CaptchaVerifier;
use crate::email::RosterNotifier;
use crate::error::WorkflowError;
use crate::token;

pub mod forms;
pub mod handlers;
pub mod pages;

use forms::FormData;
use handlers::captain::CaptainForm;
use handlers::roster::RosterForm;
use handlers::team::TeamForm;

/// Everything a request handler needs, built once at startup and shared.
/// There is deliberately no ambient global.
pub struct AppContext {
    pub db_pool: diesel_async::pooled_connection::bb8::Pool<diesel_async::AsyncPgConnection>,
    pub captcha: Box<dyn CaptchaVerifier + Send + Sync>,
    pub notifier: Box<dyn RosterNotifier + Send + Sync>,
    pub max_team_size: i64,
}

impl AppContext {
    pub async fn get_db_conn(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>,
        WorkflowError,
    > {
        Ok(self.db_pool.get().await?)
    }
}

fn html(status: StatusCode, body: String) -> Response<String> {
    let mut resp = Response::new(body);
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    resp
}

fn redirect(location: &str) -> Response<String> {
    match Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(LOCATION, location)
        .body(String::new())
    {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!("Failed to build redirect to {location}: {e}");
            html(
                StatusCode::INTERNAL_SERVER_ERROR,
                pages::error_page("Server error"),
            )
        }
    }
}

fn not_found() -> Response<String> {
    html(StatusCode::NOT_FOUND, pages::error_page("Page not found"))
}

/// Log a workflow failure with the right severity. Only the generic flash
/// message ever reaches the client.
fn log_failure(stage: &str, err: &WorkflowError) {
    match err {
        WorkflowError::Database(_) | WorkflowError::Pool(_) | WorkflowError::Hash(_) => {
            tracing::error!("{stage} failed: {err}");
        }
        _ => tracing::debug!("{stage} rejected: {err}"),
    }
}

async fn read_form(req: Request<Incoming>) -> Option<FormData> {
    match req.into_body().collect().await {
        Ok(collected) => {
            let body = String::from_utf8_lossy(&collected.to_bytes()).into_owned();
            Some(FormData::parse(&body))
        }
        Err(e) => {
            tracing::warn!("Failed to read request body: {e}");
            None
        }
    }
}

pub async fn handle_request(
    ctx: std::sync::Arc<AppContext>,
    req: Request<Incoming>,
) -> Response<String> {
    let method = req.method().clone();
    let path = req.uri().path().trim_matches('/').to_string();
    let segments: Vec<String> = if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').map(str::to_string).collect()
    };
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    match (&method, segments.as_slice()) {
        (&Method::GET, []) => html(StatusCode::OK, pages::home()),
        (&Method::GET, ["success"]) => html(StatusCode::OK, pages::success()),

        (&Method::GET, ["register-captain"]) => html(StatusCode::OK, pages::captain_form(None)),
        (&Method::POST, ["register-captain"]) => {
            let Some(form) = read_form(req).await else {
                return html(
                    StatusCode::OK,
                    pages::captain_form(Some(&WorkflowError::NotFound.user_message())),
                );
            };
            let submission = CaptainForm::from_form(&form);
            match handlers::captain::register_captain(&ctx, submission).await {
                Ok(stage) => redirect(&stage.path()),
                Err(err) => {
                    log_failure("Captain registration", &err);
                    html(StatusCode::OK, pages::captain_form(Some(&err.user_message())))
                }
            }
        }

        (&Method::GET, ["create_team", username_token, email_token]) => {
            // Malformed tokens cannot belong to an in-progress registration.
            if token::decode(username_token).is_err() || token::decode(email_token).is_err() {
                return not_found();
            }
            html(StatusCode::OK, pages::team_form(None))
        }
        (&Method::POST, ["create_team", username_token, email_token]) => {
            let Some(form) = read_form(req).await else {
                return html(
                    StatusCode::OK,
                    pages::team_form(Some(&WorkflowError::NotFound.user_message())),
                );
            };
            let submission = TeamForm::from_form(&form);
            match handlers::team::create_team(&ctx, username_token, email_token, submission).await
            {
                Ok(stage) => redirect(&stage.path()),
                Err(err) => {
                    log_failure("Team creation", &err);
                    html(StatusCode::OK, pages::team_form(Some(&err.user_message())))
                }
            }
        }

        (&Method::GET, ["add_users", team_id, team_name_token, email_token]) => {
            if team_id.parse::<i32>().is_err()
                || token::decode(team_name_token).is_err()
                || token::decode(email_token).is_err()
            {
                return not_found();
            }
            html(StatusCode::OK, pages::roster_form(None))
        }
        (&Method::POST, ["add_users", team_id, team_name_token, email_token]) => {
            let Some(form) = read_form(req).await else {
                return html(
                    StatusCode::OK,
                    pages::roster_form(Some(&WorkflowError::NotFound.user_message())),
                );
            };
            let submission = RosterForm::from_form(&form);
            match handlers::roster::add_teammates(
                &ctx,
                team_id,
                team_name_token,
                email_token,
                submission,
            )
            .await
            {
                Ok(stage) => redirect(&stage.path()),
                Err(err) => {
                    log_failure("Roster completion", &err);
                    html(StatusCode::OK, pages::roster_form(Some(&err.user_message())))
                }
            }
        }

        _ => not_found(),
    }
}
