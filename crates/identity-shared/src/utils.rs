//! Utility functions

/// Masks a bearer token for log output, keeping just enough of the prefix to
/// correlate log lines.
pub fn mask_token(token: &str) -> String {
    if token.len() <= 8 {
        "***".to_string()
    } else {
        format!("{}***", &token[..8])
    }
}
