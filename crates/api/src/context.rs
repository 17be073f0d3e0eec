use shelfplan_core::UserId;

/// Caller context for a mutation.
///
/// Authentication happens upstream; this only carries the resolved identity
/// recorded in audit stamps.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestContext {
    actor: UserId,
}

impl RequestContext {
    pub fn new(actor: UserId) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> UserId {
        self.actor
    }
}
