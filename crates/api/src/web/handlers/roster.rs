// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Stage 3: roster completion. The whole teammate batch commits in one
//! serializable transaction; afterwards the captain gets a single summary
//! email (fire-and-forget) and the client is redirected to the success
//! page.

use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::capacity;
use crate::credentials::{generate_password, generate_username, hash_password};
use crate::db::guard;
use crate::db::models::{NewPendingRegistration, NewUser, UserRole};
use crate::email::RosterSummary;
use crate::error::{Conflict, WorkflowError, map_unique_violation};
use crate::stage::Stage;
use crate::token;
use crate::validation::is_valid_identifier_text;
use crate::web::AppContext;
use crate::web::forms::FormData;

#[derive(Debug)]
pub struct RosterForm {
    /// Parallel arrays: `emails[i]` belongs to `full_names[i]`.
    pub emails: Vec<String>,
    pub full_names: Vec<String>,
    pub captcha_response: String,
}

impl RosterForm {
    pub fn from_form(form: &FormData) -> Self {
        let emails = form.get_all("participant_email[]");
        let full_names = form.get_all("participant_full_name[]");

        // The form renders more rows than most teams fill in; drop rows
        // the submitter left completely empty.
        let (emails, full_names) = if emails.len() == full_names.len() {
            emails
                .into_iter()
                .zip(full_names)
                .filter(|(email, name)| !email.is_empty() || !name.is_empty())
                .unzip()
        } else {
            (emails, full_names)
        };

        Self {
            emails,
            full_names,
            captcha_response: form
                .get("g-recaptcha-response")
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Preconditions over the submitted batch, in contract order: mismatched
/// parallel arrays are malformed input, then duplicate emails / capacity,
/// then the character policy on every full name.
fn check_batch(
    current: i64,
    max: i64,
    emails: &[String],
    full_names: &[String],
) -> Result<(), WorkflowError> {
    if emails.len() != full_names.len() {
        return Err(WorkflowError::NotFound);
    }
    if !capacity::no_duplicates(emails) || !capacity::accepts(current, emails.len(), max) {
        return Err(WorkflowError::Conflict(Conflict::RosterBatch));
    }
    if !full_names.iter().all(|name| is_valid_identifier_text(name)) {
        return Err(WorkflowError::Validation);
    }
    Ok(())
}

pub async fn add_teammates(
    ctx: &AppContext,
    team_id_segment: &str,
    team_name_token: &str,
    email_token: &str,
    form: RosterForm,
) -> Result<Stage, WorkflowError> {
    let team_id: i32 = team_id_segment
        .parse()
        .map_err(|_| WorkflowError::NotFound)?;
    let team_name = token::decode(team_name_token).map_err(|_| WorkflowError::NotFound)?;
    let captain_email = token::decode(email_token).map_err(|_| WorkflowError::NotFound)?;

    let captcha_ok = ctx.captcha.verify(&form.captcha_response).await;

    let mut conn = ctx.get_db_conn().await?;
    let form = &form;
    let team_name_ref = &team_name;
    let captain_email_ref = &captain_email;
    let max_team_size = ctx.max_team_size;
    conn.build_transaction()
        .serializable()
        .run(|conn| {
            async move {
                let captain = guard::find_user_by_email(conn, captain_email_ref).await?;
                let team = guard::find_team_by_name(conn, team_name_ref).await?;
                let (_captain, team) = match (captain, team) {
                    (Some(captain), Some(team)) => (captain, team),
                    _ => return Err(WorkflowError::NotFound),
                };
                // The path segment is data, not authority; it has to agree
                // with the record the token resolved to.
                if team.id != team_id {
                    return Err(WorkflowError::NotFound);
                }

                let current = guard::roster_size(conn, team.id).await?;
                check_batch(current, max_team_size, &form.emails, &form.full_names)?;

                for email in &form.emails {
                    if guard::email_taken(conn, email).await? {
                        return Err(WorkflowError::Conflict(Conflict::TeammateEmailTaken(
                            email.clone(),
                        )));
                    }
                }
                if !captcha_ok {
                    return Err(WorkflowError::Captcha);
                }

                for (email, full_name) in form.emails.iter().zip(&form.full_names) {
                    let username = generate_username();
                    let password = generate_password();
                    let password_hash = hash_password(&password)?;

                    diesel::insert_into(crate::db::schema::users::table)
                        .values(&NewUser {
                            username: username.clone(),
                            password_hash,
                            email: email.clone(),
                            website: None,
                            role: UserRole::Member,
                            team_id: Some(team.id),
                        })
                        .execute(conn)
                        .await
                        .map_err(map_unique_violation)?;

                    diesel::insert_into(crate::db::schema::pending_registrations::table)
                        .values(&NewPendingRegistration {
                            username,
                            full_name: full_name.clone(),
                            email: email.clone(),
                            password,
                        })
                        .execute(conn)
                        .await?;
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await?;

    // Data is durable at this point; a failed notification is logged and
    // deliberately not rolled back or surfaced.
    let summary = RosterSummary {
        captain_email: captain_email.clone(),
        teammate_emails: form.emails.clone(),
        team_name,
    };
    if let Err(e) = ctx
        .notifier
        .send_registration_complete(&captain_email, &summary)
        .await
    {
        tracing::warn!("Failed to send roster summary to {captain_email}: {e}");
    }

    Ok(Stage::Complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::DEFAULT_MAX_TEAM_SIZE;

    fn batch(entries: &[(&str, &str)]) -> (Vec<String>, Vec<String>) {
        entries
            .iter()
            .map(|(email, name)| (email.to_string(), name.to_string()))
            .unzip()
    }

    #[test]
    fn test_batch_over_capacity_rejected() {
        // Roster at 4 including the captain, two more requested, limit 5.
        let (emails, names) = batch(&[("a@x.com", "Anna"), ("b@x.com", "Boris")]);
        let result = check_batch(4, DEFAULT_MAX_TEAM_SIZE, &emails, &names);
        assert!(matches!(
            result,
            Err(WorkflowError::Conflict(Conflict::RosterBatch))
        ));
    }

    #[test]
    fn test_batch_duplicate_emails_rejected() {
        let (emails, names) = batch(&[("a@x.com", "Anna"), ("a@x.com", "Boris")]);
        let result = check_batch(1, DEFAULT_MAX_TEAM_SIZE, &emails, &names);
        assert!(matches!(
            result,
            Err(WorkflowError::Conflict(Conflict::RosterBatch))
        ));
    }

    #[test]
    fn test_batch_invalid_full_name_rejected() {
        let (emails, names) = batch(&[("a@x.com", "Anna🚀")]);
        let result = check_batch(1, DEFAULT_MAX_TEAM_SIZE, &emails, &names);
        assert!(matches!(result, Err(WorkflowError::Validation)));
    }

    #[test]
    fn test_capacity_checked_before_names() {
        // Both conditions hold; the capacity conflict wins per the stage's
        // fixed priority.
        let (emails, names) = batch(&[
            ("a@x.com", "bad name!"),
            ("b@x.com", "Boris"),
            ("c@x.com", "Clara"),
            ("d@x.com", "Dana"),
            ("e@x.com", "Elena"),
        ]);
        let result = check_batch(1, DEFAULT_MAX_TEAM_SIZE, &emails, &names);
        assert!(matches!(
            result,
            Err(WorkflowError::Conflict(Conflict::RosterBatch))
        ));
    }

    #[test]
    fn test_well_formed_batch_accepted() {
        let (emails, names) = batch(&[("a@x.com", "Anna"), ("b@x.com", "Борис")]);
        assert!(check_batch(1, DEFAULT_MAX_TEAM_SIZE, &emails, &names).is_ok());
    }

    #[test]
    fn test_mismatched_arrays_rejected() {
        let emails = vec!["a@x.com".to_string()];
        let names: Vec<String> = Vec::new();
        let result = check_batch(1, DEFAULT_MAX_TEAM_SIZE, &emails, &names);
        assert!(matches!(result, Err(WorkflowError::NotFound)));
    }

    #[test]
    fn test_from_form_drops_fully_empty_rows() {
        let form = FormData::parse(
            "participant_email%5B%5D=a%40x.com&participant_full_name%5B%5D=Anna\
             &participant_email%5B%5D=&participant_full_name%5B%5D=\
             &participant_email%5B%5D=b%40x.com&participant_full_name%5B%5D=Boris",
        );
        let parsed = RosterForm::from_form(&form);
        assert_eq!(parsed.emails, vec!["a@x.com", "b@x.com"]);
        assert_eq!(parsed.full_names, vec!["Anna", "Boris"]);
    }

    #[test]
    fn test_invalid_name_reported_once_batch_fits() {
        let (emails, names) = batch(&[("a@x.com", "bad name!")]);
        let result = check_batch(1, DEFAULT_MAX_TEAM_SIZE, &emails, &names);
        assert!(matches!(result, Err(WorkflowError::Validation)));
    }
}
