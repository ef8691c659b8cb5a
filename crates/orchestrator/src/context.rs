//! Request-scoped caller identity.

/// Who is making the request.
///
/// Built by the HTTP layer from a verified bearer token and passed
/// explicitly to every orchestrator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: String,
    pub username: String,
    pub is_admin: bool,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_admin,
        }
    }
}
