use std::fmt;

use crate::traits::Headers;

/// Token pair sent with every request. Obtaining and renewing tokens is the
/// caller's job.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// `Authorization: Bearer <access>` and `X-Refresh-Token: <refresh>`.
    pub fn auth_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.access_token),
        );
        headers.insert("X-Refresh-Token".to_string(), self.refresh_token.clone());
        headers
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::header_value;

    #[test]
    fn test_auth_headers() {
        let headers = Credentials::new("acc", "ref").auth_headers();
        assert_eq!(header_value(&headers, "authorization"), Some("Bearer acc"));
        assert_eq!(header_value(&headers, "x-refresh-token"), Some("ref"));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let debug = format!("{:?}", Credentials::new("secret-a", "secret-r"));
        assert!(!debug.contains("secret"));
    }
}
