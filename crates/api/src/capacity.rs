// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashSet;

/// Default roster limit, captain included.
pub const DEFAULT_MAX_TEAM_SIZE: i64 = 5;

/// Whether a batch of `requested` new members fits a roster currently at
/// `current`, given the limit `max`. Evaluated against the count read at
/// the start of the submission's transaction, before any write.
pub fn accepts(current: i64, requested: usize, max: i64) -> bool {
    current + requested as i64 <= max
}

/// Whether the submitted batch is free of internal duplicates.
pub fn no_duplicates(emails: &[String]) -> bool {
    let unique: HashSet<&str> = emails.iter().map(String::as_str).collect();
    unique.len() == emails.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_within_capacity() {
        assert!(accepts(1, 4, DEFAULT_MAX_TEAM_SIZE));
        assert!(accepts(4, 1, DEFAULT_MAX_TEAM_SIZE));
        assert!(accepts(5, 0, DEFAULT_MAX_TEAM_SIZE));
    }

    #[test]
    fn test_rejects_over_capacity() {
        // Roster at 4 (captain included) plus 2 more exceeds the limit of 5.
        assert!(!accepts(4, 2, DEFAULT_MAX_TEAM_SIZE));
        assert!(!accepts(5, 1, DEFAULT_MAX_TEAM_SIZE));
    }

    #[test]
    fn test_no_duplicates() {
        let unique = vec!["a@x.com".to_string(), "b@x.com".to_string()];
        assert!(no_duplicates(&unique));

        let duplicated = vec!["a@x.com".to_string(), "a@x.com".to_string()];
        assert!(!no_duplicates(&duplicated));
    }

    #[test]
    fn test_empty_batch_is_fine() {
        assert!(no_duplicates(&[]));
        assert!(accepts(1, 0, DEFAULT_MAX_TEAM_SIZE));
    }
}
