// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Parsing of `application/x-www-form-urlencoded` submissions, including
//! the repeated `participant_email[]` / `participant_full_name[]` keys of
//! the roster form.

/// Decoded key/value pairs of a form body, in submission order.
pub struct FormData {
    pairs: Vec<(String, String)>,
}

fn decode_component(raw: &str) -> Option<String> {
    // Browsers encode spaces as '+' in form bodies.
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw).ok().map(|v| v.into_owned())
}

impl FormData {
    pub fn parse(body: &str) -> Self {
        let mut pairs = Vec::new();
        for pair in body.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let (Some(key), Some(value)) = (decode_component(key), decode_component(value)) else {
                continue;
            };
            pairs.push((key, value));
        }
        Self { pairs }
    }

    /// First value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values submitted under `key`, in order.
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fields() {
        let form = FormData::parse("username=alice&email=a%40x.com");
        assert_eq!(form.get("username"), Some("alice"));
        assert_eq!(form.get("email"), Some("a@x.com"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let form = FormData::parse("full_name=Anna+Karenina");
        assert_eq!(form.get("full_name"), Some("Anna Karenina"));
    }

    #[test]
    fn test_repeated_keys_keep_order() {
        let form = FormData::parse(
            "participant_email%5B%5D=a%40x.com&participant_email%5B%5D=b%40x.com",
        );
        assert_eq!(
            form.get_all("participant_email[]"),
            vec!["a@x.com".to_string(), "b@x.com".to_string()]
        );
    }

    #[test]
    fn test_unicode_values() {
        let form = FormData::parse("city=%D0%9A%D0%B0%D0%B7%D0%B0%D0%BD%D1%8C");
        assert_eq!(form.get("city"), Some("Казань"));
    }

    #[test]
    fn test_valueless_and_empty_pairs() {
        let form = FormData::parse("a&b=&&c=1");
        assert_eq!(form.get("a"), Some(""));
        assert_eq!(form.get("b"), Some(""));
        assert_eq!(form.get("c"), Some("1"));
    }
}
