//! Application-wide constants

/// Auth cookie name on plain-HTTP (development) deployments.
pub const AUTH_COOKIE_NAME: &str = "letterpad.session-token";
/// Auth cookie name on HTTPS deployments. The `__Secure-` prefix makes
/// browsers refuse the cookie over plain HTTP.
pub const SECURE_AUTH_COOKIE_NAME: &str = "__Secure-letterpad.session-token";

/// Path of the per-domain gateway logout endpoint, used when building the
/// cross-domain logout chain.
pub const IDENTITY_LOGOUT_PATH: &str = "/api/identity/logout";

/// Upper bound on browser-visible logout chain legs. Sessions past the cap
/// are still deleted centrally; only the redirect chain is truncated, keeping
/// the URL inside practical browser limits.
pub const MAX_LOGOUT_CHAIN_LEGS: usize = 16;
