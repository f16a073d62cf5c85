// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The registration workflow as an explicit state type. Nothing here is
//! ever persisted server-side: the state a client is in lives entirely in
//! the tokens embedded in the URL it holds and in what the database
//! already contains. Handlers re-derive every precondition from storage
//! instead of trusting the decoded values.

use crate::token;

/// `CaptainPending -> TeamPending -> RosterPending -> Complete`, no
/// transition reversible. A stage value is minted by the handler that just
/// finished the previous stage and turned into the redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    CaptainPending,
    TeamPending { username: String, email: String },
    RosterPending { team_id: i32, team_name: String, email: String },
    Complete,
}

impl Stage {
    /// URL path of the page that serves this stage, with identifiers
    /// encoded into path-safe tokens.
    pub fn path(&self) -> String {
        match self {
            Stage::CaptainPending => "/register-captain".to_string(),
            Stage::TeamPending { username, email } => {
                format!("/create_team/{}/{}", token::encode(username), token::encode(email))
            }
            Stage::RosterPending {
                team_id,
                team_name,
                email,
            } => format!(
                "/add_users/{}/{}/{}",
                team_id,
                token::encode(team_name),
                token::encode(email)
            ),
            Stage::Complete => "/success".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_pending_path_round_trips() {
        let stage = Stage::TeamPending {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
        };
        let path = stage.path();
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        assert_eq!(segments[0], "create_team");
        assert_eq!(token::decode(segments[1]).unwrap(), "alice");
        assert_eq!(token::decode(segments[2]).unwrap(), "a@x.com");
    }

    #[test]
    fn test_roster_pending_path_keeps_team_id_plain() {
        let stage = Stage::RosterPending {
            team_id: 42,
            team_name: "Знатоки".to_string(),
            email: "cap@x.com".to_string(),
        };
        let path = stage.path();
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        assert_eq!(segments[0], "add_users");
        assert_eq!(segments[1], "42");
        assert_eq!(token::decode(segments[2]).unwrap(), "Знатоки");
        assert_eq!(token::decode(segments[3]).unwrap(), "cap@x.com");
    }

    #[test]
    fn test_terminal_paths() {
        assert_eq!(Stage::CaptainPending.path(), "/register-captain");
        assert_eq!(Stage::Complete.path(), "/success");
    }
}
