//! Query validation for the conversation variables routes.

use crate::upstream::VariablesQuery;

use super::error::ApiError;

/// Page size used when the caller sends none.
pub const DEFAULT_LIMIT: u32 = 20;
/// Smallest accepted page size.
pub const MIN_LIMIT: u32 = 1;
/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

/// Raw query string of `GET .../variables`.
#[derive(Debug, Default)]
pub struct VariablesParams {
    /// End-user identifier.
    pub user: Option<String>,
    /// Requested page size, unparsed.
    pub limit: Option<String>,
    /// Paging cursor.
    pub last_id: Option<String>,
}

impl VariablesParams {
    /// Read the parameters from a raw query string.
    ///
    /// Repeated keys keep their first value.
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(raw) = raw else {
            return params;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match &*key {
                "user" => &mut params.user,
                "limit" => &mut params.limit,
                "last_id" => &mut params.last_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        params
    }

    /// Check required parameters and normalise the rest into an upstream query.
    ///
    /// # Errors
    /// Returns a 400 error when `user` or `conversation_id` is missing.
    pub fn validate(self, conversation_id: &str) -> Result<VariablesQuery, ApiError> {
        let limit = clamp_limit(self.limit.as_deref());

        let user = self
            .user
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::bad_request("Missing user parameter"))?;

        if conversation_id.trim().is_empty() {
            return Err(ApiError::bad_request("Missing conversationId parameter"));
        }

        let query = VariablesQuery::new(user).with_limit(limit);
        Ok(match self.last_id {
            Some(last_id) => query.with_last_id(last_id),
            None => query,
        })
    }
}

/// Turn the raw `limit` parameter into a page size within bounds.
///
/// Absent or empty input means the default. Otherwise the leading integer is
/// read (trailing characters ignored); input without one counts as the minimum.
#[must_use]
pub fn clamp_limit(raw: Option<&str>) -> u32 {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return DEFAULT_LIMIT,
    };

    match parse_leading_int(raw) {
        Some(n) if n < i64::from(MIN_LIMIT) => MIN_LIMIT,
        Some(n) if n > i64::from(MAX_LIMIT) => MAX_LIMIT,
        Some(n) => u32::try_from(n).unwrap_or(MIN_LIMIT),
        None => MIN_LIMIT,
    }
}

/// Parse an optionally signed run of decimal digits at the start of `s`.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    seen.then_some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(user: Option<&str>, limit: Option<&str>, last_id: Option<&str>) -> VariablesParams {
        VariablesParams {
            user: user.map(String::from),
            limit: limit.map(String::from),
            last_id: last_id.map(String::from),
        }
    }

    #[test]
    fn test_from_query_keeps_first_value() {
        let parsed = VariablesParams::from_query(Some(
            "user=alice&user=bob&limit=5&limit=7&last_id=v%201&other=x",
        ));
        assert_eq!(parsed.user.as_deref(), Some("alice"));
        assert_eq!(parsed.limit.as_deref(), Some("5"));
        assert_eq!(parsed.last_id.as_deref(), Some("v 1"));

        let parsed = VariablesParams::from_query(None);
        assert!(parsed.user.is_none() && parsed.limit.is_none() && parsed.last_id.is_none());
    }

    #[test]
    fn test_from_query_tolerates_malformed_pairs() {
        let parsed = VariablesParams::from_query(Some("user&&=3&limit=%ZZ&user=carol"));
        assert_eq!(parsed.user.as_deref(), Some(""));
        assert_eq!(parsed.limit.as_deref(), Some("%ZZ"));
        assert_eq!(clamp_limit(parsed.limit.as_deref()), 1);
    }

    #[test]
    fn test_clamp_limit_defaults() {
        assert_eq!(clamp_limit(None), 20);
        assert_eq!(clamp_limit(Some("")), 20);
    }

    #[test]
    fn test_clamp_limit_bounds() {
        assert_eq!(clamp_limit(Some("0")), 1);
        assert_eq!(clamp_limit(Some("-7")), 1);
        assert_eq!(clamp_limit(Some("1")), 1);
        assert_eq!(clamp_limit(Some("55")), 55);
        assert_eq!(clamp_limit(Some("100")), 100);
        assert_eq!(clamp_limit(Some("101")), 100);
        assert_eq!(clamp_limit(Some("99999999999999999999999")), 100);
    }

    #[test]
    fn test_clamp_limit_lenient_parsing() {
        assert_eq!(clamp_limit(Some("abc")), 1);
        assert_eq!(clamp_limit(Some("-")), 1);
        assert_eq!(clamp_limit(Some("15abc")), 15);
        assert_eq!(clamp_limit(Some("2.9")), 2);
        assert_eq!(clamp_limit(Some("  30")), 30);
        assert_eq!(clamp_limit(Some("+40")), 40);
    }

    #[test]
    fn test_validate_requires_user_first() {
        let err = params(None, None, None).validate("").expect_err("missing user");
        assert_eq!(err.status().as_u16(), 400);
        assert_eq!(err.message(), "Missing user parameter");

        let err = params(Some(""), None, None).validate("c1").expect_err("empty user");
        assert_eq!(err.message(), "Missing user parameter");
    }

    #[test]
    fn test_validate_requires_conversation_id() {
        let err = params(Some("alice"), None, None)
            .validate("  ")
            .expect_err("missing conversation");
        assert_eq!(err.status().as_u16(), 400);
        assert_eq!(err.message(), "Missing conversationId parameter");
    }

    #[test]
    fn test_validate_builds_query() {
        let query = params(Some("alice"), Some("500"), Some(""))
            .validate("c1")
            .expect("valid");
        assert_eq!(query.user, "alice");
        assert_eq!(query.limit, Some(100));
        assert_eq!(query.last_id, None);

        let query = params(Some("alice"), None, Some("v-3")).validate("c1").expect("valid");
        assert_eq!(query.limit, Some(20));
        assert_eq!(query.last_id, Some("v-3".to_string()));
    }
}
