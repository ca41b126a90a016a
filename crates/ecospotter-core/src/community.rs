use crate::error::ModerationError;
use crate::store::{TreeStatus, TreeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub tree_id: String,
    pub species: String,
    /// Display name of the submitter, or their id if the user is unknown.
    pub submitted_by: String,
    pub upvotes: u32,
    pub downvotes: u32,
}

/// Community verification queue for trees still awaiting review.
#[derive(Debug, Clone, Default)]
pub struct ModerationQueue {
    submissions: Vec<PendingSubmission>,
}

impl ModerationQueue {
    pub async fn from_store(store: &dyn TreeStore) -> Self {
        let mut queue = Self::default();
        queue.refresh(store).await;
        queue
    }

    /// Re-read the pending trees from `store`.
    ///
    /// Trees already in the queue keep their vote counts; newly pending trees
    /// start at zero and trees no longer pending drop out.
    pub async fn refresh(&mut self, store: &dyn TreeStore) {
        let mut submissions = Vec::new();
        for tree in store.list().await {
            if tree.status != TreeStatus::Pending {
                continue;
            }
            let (upvotes, downvotes) = self
                .submissions
                .iter()
                .find(|existing| existing.tree_id == tree.id)
                .map_or((0, 0), |existing| (existing.upvotes, existing.downvotes));
            let submitted_by = match store.get_user(&tree.submitted_by).await {
                Some(user) => user.display_name,
                None => tree.submitted_by.clone(),
            };
            submissions.push(PendingSubmission {
                tree_id: tree.id,
                species: tree.species,
                submitted_by,
                upvotes,
                downvotes,
            });
        }
        self.submissions = submissions;
    }

    pub fn submissions(&self) -> &[PendingSubmission] {
        &self.submissions
    }

    pub fn vote(
        &mut self,
        tree_id: &str,
        vote: Vote,
    ) -> Result<&PendingSubmission, ModerationError> {
        let submission = self
            .submissions
            .iter_mut()
            .find(|submission| submission.tree_id == tree_id)
            .ok_or_else(|| ModerationError::UnknownSubmission(tree_id.to_string()))?;
        match vote {
            Vote::Up => submission.upvotes += 1,
            Vote::Down => submission.downvotes += 1,
        }
        Ok(&*submission)
    }
}
