mod claims;
pub mod extractors;

use uuid::Uuid;

pub use extractors::AuthUser;

/// Identity of the viewing user, established before any feed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
}

impl Session {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
