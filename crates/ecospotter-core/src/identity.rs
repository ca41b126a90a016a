use tracing::info;

use crate::store::{AppUser, TreeStore};

/// The user id every mock sign-in resolves to.
pub const MOCK_USER_ID: &str = "mock-user-id";

/// Signed-in user for one session, with its points counter.
#[derive(Debug, Clone, Default)]
pub struct SessionIdentity {
    user: Option<AppUser>,
}

impl SessionIdentity {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub async fn login(&mut self, store: &dyn TreeStore) -> Option<&AppUser> {
        self.user = store.get_user(MOCK_USER_ID).await;
        if let Some(user) = &self.user {
            info!(uid = %user.uid, "signed in");
        }
        self.user.as_ref()
    }

    pub fn logout(&mut self) {
        self.user = None;
    }

    pub fn user(&self) -> Option<&AppUser> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.uid.as_str())
    }

    /// Returns the new total, or `None` when nobody is signed in.
    pub fn add_points(&mut self, points: u32) -> Option<u32> {
        let user = self.user.as_mut()?;
        user.points = user.points.saturating_add(points);
        Some(user.points)
    }
}
