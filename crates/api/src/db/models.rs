// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, Utc};
use diesel::associations::Identifiable;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::schema::*;

#[derive(diesel_derive_enum::DbEnum, Debug, PartialEq, Eq, Deserialize, Serialize, Clone, Copy)]
#[DbValueStyle = "UPPERCASE"]
#[ExistingTypePath = "crate::db::schema::sql_types::UserRole"]
pub enum UserRole {
    Captain,
    Member,
}

/* =========================
 * USERS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub website: Option<String>,
    pub role: UserRole,
    pub team_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub website: Option<String>,
    pub role: UserRole,
    pub team_id: Option<i32>,
}

/* =========================
 * TEAMS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub affiliation: Option<String>,
    pub password_hash: String,
    pub captain_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub name: String,
    pub city: String,
    pub affiliation: Option<String>,
    pub password_hash: String,
    pub captain_id: i32,
}

/* =========================
 * PENDING REGISTRATIONS
 * ========================= */

/// Write-once audit record pairing every created user with the plaintext
/// password generated for them, so credentials can be emailed afterwards.
/// The plaintext is never re-derivable from `users.password_hash`.
#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = pending_registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PendingRegistration {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = pending_registrations)]
pub struct NewPendingRegistration {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}
