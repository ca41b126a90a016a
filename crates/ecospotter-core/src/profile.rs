use crate::store::{AppUser, Tree, TreeStore};

pub const PROFILE_NOT_FOUND: &str = "Nie znaleziono użytkownika";
pub const NO_SUBMISSIONS_NOTICE: &str = "Ten użytkownik nie zgłosił jeszcze żadnych drzew.";

/// A user together with the trees they submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: AppUser,
    pub trees: Vec<Tree>,
}

impl UserProfile {
    /// `None` when the store has no user with this id.
    pub async fn load(store: &dyn TreeStore, user_id: &str) -> Option<Self> {
        let user = store.get_user(user_id).await?;
        let trees = store.list_by_user(user_id).await;
        Some(Self { user, trees })
    }

    pub fn submitted_count(&self) -> usize {
        self.trees.len()
    }

    /// Reporting is offered only on someone else's profile.
    pub fn can_report(&self, viewer_id: Option<&str>) -> bool {
        viewer_id.is_some_and(|viewer| viewer != self.user.uid)
    }
}

pub fn comment_notice(tree_id: &str) -> String {
    format!("Wkrótce będziesz mógł komentować drzewo #{}.", tree_id)
}

pub fn report_notice(tree_id: &str) -> String {
    format!(
        "Dziękujemy za zgłoszenie drzewa #{}. Nasz zespół moderacji wkrótce je przejrzy.",
        tree_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockTreeStore;

    #[tokio::test]
    async fn profile_lists_only_the_users_trees() {
        let store = MockTreeStore::seeded();
        let profile = UserProfile::load(&store, "user-2").await.unwrap();

        assert_eq!(profile.user.display_name, "Anna Nowak");
        assert!(profile.trees.iter().all(|tree| tree.submitted_by == "user-2"));
        assert_eq!(profile.submitted_count(), profile.trees.len());
        assert!(profile.submitted_count() > 0);
    }

    #[tokio::test]
    async fn unknown_user_has_no_profile() {
        let store = MockTreeStore::seeded();
        assert!(UserProfile::load(&store, "ghost").await.is_none());
    }

    #[tokio::test]
    async fn report_is_offered_only_to_other_signed_in_users() {
        let store = MockTreeStore::seeded();
        let profile = UserProfile::load(&store, "user-2").await.unwrap();

        assert!(profile.can_report(Some("mock-user-id")));
        assert!(!profile.can_report(Some("user-2")));
        assert!(!profile.can_report(None));
    }

    #[test]
    fn notices_name_the_tree() {
        assert_eq!(
            comment_notice("3"),
            "Wkrótce będziesz mógł komentować drzewo #3."
        );
        assert!(report_notice("5").starts_with("Dziękujemy za zgłoszenie drzewa #5."));
    }
}
