/// Capability handing out the current operator bearer token.
///
/// The store client and the notifier take this as an injected dependency
/// instead of reading a session singleton, so the console core stays
/// testable and tokens can rotate underneath long-lived clients.
pub trait SessionAccessor: Send + Sync {
    fn bearer_token(&self) -> String;
}

/// Fixed-token session, for service accounts and tests.
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: String,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl SessionAccessor for StaticSession {
    fn bearer_token(&self) -> String {
        self.token.clone()
    }
}
