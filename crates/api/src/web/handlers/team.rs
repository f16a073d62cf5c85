// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Stage 2: team creation. The decoded username must resolve to a user
//! with no team yet; the team row and the captain's team reference are
//! written in one serializable transaction.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::credentials::{generate_password, hash_password};
use crate::db::guard;
use crate::db::models::{NewTeam, Team, User};
use crate::error::{Conflict, WorkflowError, map_unique_violation};
use crate::stage::Stage;
use crate::token;
use crate::validation::is_valid_identifier_text;
use crate::web::AppContext;
use crate::web::forms::FormData;

#[derive(Debug)]
pub struct TeamForm {
    pub team_name: String,
    pub city: String,
    /// Empty submissions normalize to absent.
    pub affiliation: Option<String>,
    pub captcha_response: String,
}

impl TeamForm {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            team_name: form.get("team_name").unwrap_or_default().to_string(),
            city: form.get("team_city").unwrap_or_default().to_string(),
            affiliation: form
                .get("team_affiliation")
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            captcha_response: form
                .get("g-recaptcha-response")
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Whether the resolved captain may create a team: they must exist, and a
/// user leads at most one team, ever — the team reference is one-way and
/// permanent in this flow. Both failures take the catch-all
/// "unknown error" path.
fn check_captain(user: Option<&User>) -> Result<i32, WorkflowError> {
    match user {
        Some(user) if user.team_id.is_none() => Ok(user.id),
        _ => Err(WorkflowError::NotFound),
    }
}

pub async fn create_team(
    ctx: &AppContext,
    username_token: &str,
    email_token: &str,
    form: TeamForm,
) -> Result<Stage, WorkflowError> {
    // The tokens only tell us which records to look up; everything else is
    // re-derived from storage below.
    let username = token::decode(username_token).map_err(|_| WorkflowError::NotFound)?;
    let email = token::decode(email_token).map_err(|_| WorkflowError::NotFound)?;

    if !is_valid_identifier_text(&form.team_name)
        || !is_valid_identifier_text(&form.city)
        || !form
            .affiliation
            .as_deref()
            .map(is_valid_identifier_text)
            .unwrap_or(true)
    {
        return Err(WorkflowError::Validation);
    }

    let captcha_ok = ctx.captcha.verify(&form.captcha_response).await;

    // The team gets its own generated password; only the hash is kept.
    let team_password_hash = hash_password(&generate_password())?;

    let mut conn = ctx.get_db_conn().await?;
    let form = &form;
    let username = &username;
    let team = conn
        .build_transaction()
        .serializable()
        .run(|conn| {
            async move {
                let user = guard::find_user_by_username(conn, username).await?;
                if guard::team_name_taken(conn, &form.team_name).await? {
                    return Err(WorkflowError::Conflict(Conflict::TeamNameTaken));
                }
                if !captcha_ok {
                    return Err(WorkflowError::Captcha);
                }
                let captain_id = check_captain(user.as_ref())?;

                let team: Team = diesel::insert_into(crate::db::schema::teams::table)
                    .values(&NewTeam {
                        name: form.team_name.clone(),
                        city: form.city.clone(),
                        affiliation: form.affiliation.clone(),
                        password_hash: team_password_hash,
                        captain_id,
                    })
                    .returning(Team::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(map_unique_violation)?;

                {
                    use crate::db::schema::users::dsl::*;
                    diesel::update(users.filter(id.eq(captain_id)))
                        .set(team_id.eq(team.id))
                        .execute(conn)
                        .await?;
                }

                Ok(team)
            }
            .scope_boxed()
        })
        .await?;

    Ok(Stage::RosterPending {
        team_id: team.id,
        team_name: team.name,
        email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::UserRole;

    fn captain(team_id: Option<i32>) -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            email: "a@x.com".to_string(),
            website: None,
            role: UserRole::Captain,
            team_id,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_captain_without_team_may_create_one() {
        let user = captain(None);
        assert_eq!(check_captain(Some(&user)).unwrap(), 7);
    }

    #[test]
    fn test_captain_with_team_cannot_create_second() {
        let user = captain(Some(3));
        assert!(matches!(
            check_captain(Some(&user)),
            Err(WorkflowError::NotFound)
        ));
    }

    #[test]
    fn test_unresolved_captain_rejected() {
        assert!(matches!(check_captain(None), Err(WorkflowError::NotFound)));
    }

    #[test]
    fn test_empty_affiliation_normalizes_to_none() {
        let form = TeamForm::from_form(&FormData::parse(
            "team_name=Knights&team_city=Kazan&team_affiliation=",
        ));
        assert_eq!(form.affiliation, None);

        let form = TeamForm::from_form(&FormData::parse(
            "team_name=Knights&team_city=Kazan&team_affiliation=University",
        ));
        assert_eq!(form.affiliation, Some("University".to_string()));
    }
}
