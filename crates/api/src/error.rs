// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error taxonomy of the registration workflow. Every variant is recovered
//! at the stage boundary and rendered as exactly one user-facing flash
//! message; internals (queries, constraint names, pool state) are logged
//! but never shown to the client.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum Conflict {
    #[error("duplicate email")]
    EmailTaken,
    #[error("duplicate username")]
    UsernameTaken,
    #[error("duplicate team name")]
    TeamNameTaken,
    #[error("teammate email already registered: {0}")]
    TeammateEmailTaken(String),
    #[error("batch has duplicate emails or exceeds team capacity")]
    RosterBatch,
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("invalid characters in a submitted field")]
    Validation,
    #[error("conflict: {0}")]
    Conflict(Conflict),
    #[error("CAPTCHA verification failed")]
    Captcha,
    #[error("referenced record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::bb8::RunError),
    #[error("password hashing failed: {0}")]
    Hash(#[from] argon2::password_hash::Error),
}

impl WorkflowError {
    /// The single flash message shown for this failure. Wording follows
    /// the original deployment's messages.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Validation => {
                "Please use valid characters (fields may only contain letters, digits, \
                 and the symbols @/./+/-/_)"
                    .to_string()
            }
            WorkflowError::Conflict(Conflict::EmailTaken) => {
                "A user with this email already exists!".to_string()
            }
            WorkflowError::Conflict(Conflict::UsernameTaken) => {
                "A user with this username already exists!".to_string()
            }
            WorkflowError::Conflict(Conflict::TeamNameTaken) => {
                "A team with this name already exists!".to_string()
            }
            WorkflowError::Conflict(Conflict::TeammateEmailTaken(email)) => {
                format!("A user with the email {email} already exists!")
            }
            WorkflowError::Conflict(Conflict::RosterBatch) => {
                "Please enter unique emails that fit within the team size limit!".to_string()
            }
            WorkflowError::Captcha => "Please complete the CAPTCHA!".to_string(),
            WorkflowError::NotFound
            | WorkflowError::Database(_)
            | WorkflowError::Pool(_)
            | WorkflowError::Hash(_) => "Unknown error, please try again...".to_string(),
        }
    }
}

/// Translate a unique-constraint violation raised by a racing submission
/// into the same conflict the in-transaction check would have reported.
pub fn map_unique_violation(err: diesel::result::Error) -> WorkflowError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) = err {
        match info.constraint_name() {
            Some("users_email_key") => return WorkflowError::Conflict(Conflict::EmailTaken),
            Some("users_username_key") => return WorkflowError::Conflict(Conflict::UsernameTaken),
            Some("teams_name_key") => return WorkflowError::Conflict(Conflict::TeamNameTaken),
            _ => {}
        }
    }
    WorkflowError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_share_generic_message() {
        let not_found = WorkflowError::NotFound;
        let db = WorkflowError::Database(diesel::result::Error::NotFound);
        assert_eq!(not_found.user_message(), db.user_message());
        assert!(!db.user_message().contains("database"));
    }

    #[test]
    fn test_teammate_conflict_names_offending_email() {
        let err = WorkflowError::Conflict(Conflict::TeammateEmailTaken("b@x.com".to_string()));
        assert!(err.user_message().contains("b@x.com"));
    }
}
