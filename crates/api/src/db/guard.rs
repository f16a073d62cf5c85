// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Uniqueness checks and record resolution against the live store.
//!
//! Every function here is meant to run inside the same transaction as the
//! write that depends on its answer; the unique constraints on
//! `users.username`, `users.email` and `teams.name` remain the backstop if
//! two submissions race anyway.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::db::models::{Team, User};

pub async fn username_taken(
    conn: &mut AsyncPgConnection,
    candidate: &str,
) -> QueryResult<bool> {
    use crate::db::schema::users::dsl::*;
    let count: i64 = users
        .filter(username.eq(candidate))
        .count()
        .get_result(conn)
        .await?;
    Ok(count > 0)
}

pub async fn email_taken(conn: &mut AsyncPgConnection, candidate: &str) -> QueryResult<bool> {
    use crate::db::schema::users::dsl::*;
    let count: i64 = users
        .filter(email.eq(candidate))
        .count()
        .get_result(conn)
        .await?;
    Ok(count > 0)
}

pub async fn team_name_taken(conn: &mut AsyncPgConnection, candidate: &str) -> QueryResult<bool> {
    use crate::db::schema::teams::dsl::*;
    let count: i64 = teams
        .filter(name.eq(candidate))
        .count()
        .get_result(conn)
        .await?;
    Ok(count > 0)
}

pub async fn find_user_by_username(
    conn: &mut AsyncPgConnection,
    candidate: &str,
) -> QueryResult<Option<User>> {
    use crate::db::schema::users::dsl::*;
    users
        .filter(username.eq(candidate))
        .select(User::as_select())
        .first(conn)
        .await
        .optional()
}

pub async fn find_user_by_email(
    conn: &mut AsyncPgConnection,
    candidate: &str,
) -> QueryResult<Option<User>> {
    use crate::db::schema::users::dsl::*;
    users
        .filter(email.eq(candidate))
        .select(User::as_select())
        .first(conn)
        .await
        .optional()
}

pub async fn find_team_by_name(
    conn: &mut AsyncPgConnection,
    candidate: &str,
) -> QueryResult<Option<Team>> {
    use crate::db::schema::teams::dsl::*;
    teams
        .filter(name.eq(candidate))
        .select(Team::as_select())
        .first(conn)
        .await
        .optional()
}

/// Current roster size of a team, captain included.
pub async fn roster_size(conn: &mut AsyncPgConnection, team: i32) -> QueryResult<i64> {
    use crate::db::schema::users::dsl::*;
    users.filter(team_id.eq(team)).count().get_result(conn).await
}
