// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Stage 1: captain registration. On success a `User` with the captain
//! role and its paired pending-registration record are created in one
//! serializable transaction, and the client is redirected to stage 2 with
//! the username and email minted into tokens.

use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::credentials::{generate_password, hash_password};
use crate::db::guard;
use crate::db::models::{NewPendingRegistration, NewUser, UserRole};
use crate::error::{Conflict, WorkflowError, map_unique_violation};
use crate::stage::Stage;
use crate::validation::is_valid_identifier_text;
use crate::web::AppContext;
use crate::web::forms::FormData;

#[derive(Debug)]
pub struct CaptainForm {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub website: Option<String>,
    pub captcha_response: String,
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl CaptainForm {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            username: form.get("username").unwrap_or_default().to_string(),
            full_name: form.get("full_name").unwrap_or_default().to_string(),
            email: form.get("email").unwrap_or_default().to_string(),
            website: normalize_optional(form.get("website")),
            captcha_response: form
                .get("g-recaptcha-response")
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Character policy on the fields the captain typed in. The email is
/// deliberately not charset-checked: addresses may contain characters the
/// identifier policy forbids, and the uniqueness check is what guards the
/// email column.
fn check_fields(form: &CaptainForm) -> Result<(), WorkflowError> {
    if !is_valid_identifier_text(&form.username) || !is_valid_identifier_text(&form.full_name) {
        return Err(WorkflowError::Validation);
    }
    Ok(())
}

pub async fn register_captain(
    ctx: &AppContext,
    form: CaptainForm,
) -> Result<Stage, WorkflowError> {
    check_fields(&form)?;

    // Verified up front (bounded call), but reported only after the
    // uniqueness checks so the error priority matches the stage contract:
    // email taken > username taken > CAPTCHA.
    let captcha_ok = ctx.captcha.verify(&form.captcha_response).await;

    let password = generate_password();
    let password_hash = hash_password(&password)?;

    let mut conn = ctx.get_db_conn().await?;
    let form = &form;
    conn.build_transaction()
        .serializable()
        .run(|conn| {
            async move {
                if guard::email_taken(conn, &form.email).await? {
                    return Err(WorkflowError::Conflict(Conflict::EmailTaken));
                }
                if guard::username_taken(conn, &form.username).await? {
                    return Err(WorkflowError::Conflict(Conflict::UsernameTaken));
                }
                if !captcha_ok {
                    return Err(WorkflowError::Captcha);
                }

                diesel::insert_into(crate::db::schema::users::table)
                    .values(&NewUser {
                        username: form.username.clone(),
                        password_hash,
                        email: form.email.clone(),
                        website: form.website.clone(),
                        role: UserRole::Captain,
                        team_id: None,
                    })
                    .execute(conn)
                    .await
                    .map_err(map_unique_violation)?;

                diesel::insert_into(crate::db::schema::pending_registrations::table)
                    .values(&NewPendingRegistration {
                        username: form.username.clone(),
                        full_name: form.full_name.clone(),
                        email: form.email.clone(),
                        password,
                    })
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await?;

    Ok(Stage::TeamPending {
        username: form.username.clone(),
        email: form.email.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::forms::FormData;

    #[test]
    fn test_from_form_normalizes_website() {
        let form = FormData::parse("username=alice&full_name=Alice&email=a%40x.com&website=");
        let parsed = CaptainForm::from_form(&form);
        assert_eq!(parsed.username, "alice");
        assert_eq!(parsed.website, None);

        let form =
            FormData::parse("username=alice&full_name=Alice&email=a%40x.com&website=x.example");
        assert_eq!(
            CaptainForm::from_form(&form).website,
            Some("x.example".to_string())
        );
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let parsed = CaptainForm::from_form(&FormData::parse(""));
        assert!(parsed.username.is_empty());
        assert!(parsed.captcha_response.is_empty());
        // An empty username fails validation before anything else runs.
        assert!(matches!(
            check_fields(&parsed),
            Err(WorkflowError::Validation)
        ));
    }

    #[test]
    fn test_email_charset_is_not_policed() {
        // Addresses may contain characters the identifier policy forbids;
        // only username and full name go through it.
        let parsed = CaptainForm::from_form(&FormData::parse(
            "username=obrien&full_name=OBrien&email=o%27brien%40x.com",
        ));
        assert_eq!(parsed.email, "o'brien@x.com");
        assert!(check_fields(&parsed).is_ok());
    }

    #[test]
    fn test_invalid_username_still_rejected() {
        let parsed = CaptainForm::from_form(&FormData::parse(
            "username=bad%20name&full_name=Alice&email=a%40x.com",
        ));
        assert!(matches!(
            check_fields(&parsed),
            Err(WorkflowError::Validation)
        ));
    }
}
