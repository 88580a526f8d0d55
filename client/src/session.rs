//! Explicit session context.
//!
//! Passed into the client rather than held in module-level state, so two
//! sessions can coexist in one process and tests can fabricate identities.

/// An authenticated session against the reservation API.
#[derive(Debug, Clone)]
pub struct Session {
    id_token: String,
}

impl Session {
    /// Create a session from a gateway-issued id token.
    pub fn new(id_token: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
        }
    }

    /// `Authorization` header value for this session.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.id_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let session = Session::new("tok-123");
        assert_eq!(session.bearer(), "Bearer tok-123");
    }
}
