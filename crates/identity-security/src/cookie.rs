//! Auth cookie helpers
//!
//! The gateway reads and writes one cookie: the per-domain session token.
//! Its name depends on whether the deployment serves HTTPS, mirroring the
//! `__Secure-` browser convention.

use identity_shared::constants::{AUTH_COOKIE_NAME, SECURE_AUTH_COOKIE_NAME};

pub fn auth_cookie_name(secure: bool) -> &'static str {
    if secure {
        SECURE_AUTH_COOKIE_NAME
    } else {
        AUTH_COOKIE_NAME
    }
}

/// Extracts a cookie value from a raw `Cookie` request header.
pub fn read_cookie<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim())
        } else {
            None
        }
    })
}

/// Builds a `Set-Cookie` header value for the auth cookie.
pub fn set_cookie(name: &str, value: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=None; Max-Age={}",
        name, value, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds a `Set-Cookie` header value that removes the auth cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie_name_by_scheme() {
        assert_eq!(auth_cookie_name(false), "letterpad.session-token");
        assert_eq!(auth_cookie_name(true), "__Secure-letterpad.session-token");
    }

    #[test]
    fn test_read_cookie_finds_value() {
        let header = "a=1; letterpad.session-token=tok-123; b=2";
        assert_eq!(
            read_cookie(header, "letterpad.session-token"),
            Some("tok-123")
        );
    }

    #[test]
    fn test_read_cookie_missing() {
        assert_eq!(read_cookie("a=1; b=2", "letterpad.session-token"), None);
        assert_eq!(read_cookie("", "letterpad.session-token"), None);
    }

    #[test]
    fn test_read_cookie_does_not_match_prefix() {
        let header = "letterpad.session-token-old=x; letterpad.session-token=y";
        assert_eq!(read_cookie(header, "letterpad.session-token"), Some("y"));
    }

    #[test]
    fn test_set_and_clear_cookie() {
        let set = set_cookie("letterpad.session-token", "tok", 86400, true);
        assert!(set.starts_with("letterpad.session-token=tok;"));
        assert!(set.contains("Max-Age=86400"));
        assert!(set.contains("Secure"));

        let clear = clear_cookie("letterpad.session-token", false);
        assert!(clear.contains("Max-Age=0"));
        assert!(!clear.contains("Secure"));
    }
}
