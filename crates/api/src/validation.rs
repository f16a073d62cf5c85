// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

/// Upper bound for any free-text field that ends up in a unique column or
/// a displayed identifier.
pub const MAX_FIELD_LENGTH: usize = 255;

/// Allowed-character policy for usernames, full names, team names, cities
/// and affiliations: Unicode letters and digits plus `@ . + - _`.
///
/// Empty and oversized values are rejected outright. This runs before any
/// uniqueness check or write; a failure aborts the whole stage.
pub fn is_valid_identifier_text(value: &str) -> bool {
    if value.is_empty() || value.chars().count() > MAX_FIELD_LENGTH {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}
