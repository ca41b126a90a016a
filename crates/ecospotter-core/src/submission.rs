//! Tree submission: the photo-based species assist and the form itself.

use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;
use tracing::{info, warn};

use crate::capability::{SubmissionAssistantInput, SubmissionAssistantOutput};
use crate::error::{CapabilityError, StoreError};
use crate::identity::SessionIdentity;
use crate::invoker::CapabilityInvoker;
use crate::store::{Location, NewTree, Tree, TreeStatus, TreeStore, DEFAULT_TREE_IMAGE};
use crate::timeout::TimeoutGuard;

pub const SELECT_PHOTO_NOTICE: &str = "Najpierw wybierz zdjęcie.";
pub const IDENTIFY_FAILED_NOTICE: &str = "Nie udało się zidentyfikować drzewa.";

/// Points awarded for every accepted submission.
pub const SUBMISSION_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistFailure {
    MissingPhoto,
    NotIdentified,
}

impl AssistFailure {
    pub fn notice(&self) -> &'static str {
        match self {
            AssistFailure::MissingPhoto => SELECT_PHOTO_NOTICE,
            AssistFailure::NotIdentified => IDENTIFY_FAILED_NOTICE,
        }
    }
}

impl fmt::Display for AssistFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notice())
    }
}

/// One-shot species identification from a photo.
#[derive(Clone)]
pub struct SubmissionAssist {
    invoker: CapabilityInvoker,
    guard: Option<TimeoutGuard>,
}

impl SubmissionAssist {
    /// Without a guard the call is bounded only by the provider's own limits.
    pub fn new(invoker: CapabilityInvoker) -> Self {
        Self {
            invoker,
            guard: None,
        }
    }

    pub fn with_guard(mut self, guard: TimeoutGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub async fn suggest(
        &self,
        photo_data_uri: Option<&str>,
        description: Option<&str>,
    ) -> Result<SubmissionAssistantOutput, AssistFailure> {
        let photo = photo_data_uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or(AssistFailure::MissingPhoto)?;

        let input = SubmissionAssistantInput {
            photo_data_uri: Some(photo.to_string()),
            description: description
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        };

        let outcome = match self.guard {
            Some(guard) => {
                let invoker = self.invoker.clone();
                guard
                    .run(move || async move { invoker.submission_assistant(&input).await })
                    .await
            }
            None => self.invoker.submission_assistant(&input).await,
        };

        outcome.map_err(|err: CapabilityError| {
            warn!(error = %err, "species identification failed");
            AssistFailure::NotIdentified
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormIssue {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Musisz być zalogowany.")]
    NotSignedIn,

    #[error("{}", join_messages(.0))]
    Invalid(Vec<FormIssue>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_messages(issues: &[FormIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Field values of the submission form.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeForm {
    pub species: String,
    pub diameter: u32,
    pub description: String,
    pub is_monument: bool,
    pub location: Location,
    pub photo_data_uri: Option<String>,
}

impl Default for TreeForm {
    fn default() -> Self {
        Self {
            species: String::new(),
            diameter: 0,
            description: String::new(),
            is_monument: false,
            location: Location::DEFAULT_CENTER,
            photo_data_uri: None,
        }
    }
}

impl TreeForm {
    pub fn validate(&self) -> Result<(), FormError> {
        let mut issues = Vec::new();
        if self.species.trim().chars().count() < 2 {
            issues.push(FormIssue {
                field: "species",
                message: "Gatunek jest wymagany.",
            });
        }
        if self.diameter < 1 {
            issues.push(FormIssue {
                field: "diameter",
                message: "Średnica musi być liczbą dodatnią.",
            });
        }
        if self.description.trim().chars().count() < 10 {
            issues.push(FormIssue {
                field: "description",
                message: "Opis musi mieć co najmniej 10 znaków.",
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(FormError::Invalid(issues))
        }
    }

    /// Pre-fill the species field. Characteristics are for display only.
    pub fn apply_suggestion(&mut self, suggestion: &SubmissionAssistantOutput) -> bool {
        let species = suggestion.species.trim();
        if species.is_empty() {
            return false;
        }
        self.species = species.to_string();
        true
    }
}

/// Validate, store the tree as pending and award points to the submitter.
pub async fn submit_tree(
    form: &TreeForm,
    store: &dyn TreeStore,
    identity: &mut SessionIdentity,
) -> Result<Tree, FormError> {
    let user_id = identity.user_id().ok_or(FormError::NotSignedIn)?.to_string();
    form.validate()?;

    let tree = store
        .create(NewTree {
            species: form.species.trim().to_string(),
            diameter: form.diameter,
            description: form.description.trim().to_string(),
            location: form.location,
            photo_url: DEFAULT_TREE_IMAGE.to_string(),
            submitted_by: user_id,
            is_monument: form.is_monument,
            status: TreeStatus::Pending,
        })
        .await?;

    let total = identity.add_points(SUBMISSION_POINTS);
    info!(id = %tree.id, points = ?total, "submission accepted");
    Ok(tree)
}

/// Read an image file into a `data:<mime>;base64,...` URI.
pub fn photo_data_uri_from_path(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        other => return Err(anyhow!("Unsupported photo format: .{}", other)),
    };

    let bytes = std::fs::read(path)
        .with_context(|| format!("Could not read photo {}", path.display()))?;
    Ok(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MOCK_USER_ID;
    use crate::store::MockTreeStore;
    use std::io::Write;

    fn filled_form() -> TreeForm {
        TreeForm {
            species: "Dąb szypułkowy".to_string(),
            diameter: 150,
            description: "Okazały dąb przy alei lipowej".to_string(),
            ..TreeForm::default()
        }
    }

    #[test]
    fn empty_form_reports_every_field() {
        let err = TreeForm::default().validate().unwrap_err();
        let FormError::Invalid(issues) = err else {
            panic!("expected field issues");
        };
        let fields: Vec<&str> = issues.iter().map(|issue| issue.field).collect();
        assert_eq!(fields, vec!["species", "diameter", "description"]);
    }

    #[test]
    fn suggestion_fills_species_only() {
        let mut form = TreeForm {
            description: "opis bez zmian".to_string(),
            ..TreeForm::default()
        };
        let applied = form.apply_suggestion(&SubmissionAssistantOutput {
            species: " Klon zwyczajny ".to_string(),
            characteristics: "Pięcioklapowe liście".to_string(),
        });
        assert!(applied);
        assert_eq!(form.species, "Klon zwyczajny");
        assert_eq!(form.description, "opis bez zmian");
    }

    #[test]
    fn blank_suggestion_is_ignored() {
        let mut form = filled_form();
        assert!(!form.apply_suggestion(&SubmissionAssistantOutput {
            species: "  ".to_string(),
            characteristics: String::new(),
        }));
        assert_eq!(form.species, "Dąb szypułkowy");
    }

    #[tokio::test]
    async fn submit_requires_sign_in() {
        let store = MockTreeStore::seeded();
        let mut identity = SessionIdentity::signed_out();
        let err = submit_tree(&filled_form(), &store, &mut identity).await.unwrap_err();
        assert_eq!(err, FormError::NotSignedIn);
        assert_eq!(err.to_string(), "Musisz być zalogowany.");
    }

    #[tokio::test]
    async fn submit_stores_pending_tree_and_awards_points() {
        let store = MockTreeStore::seeded();
        let mut identity = SessionIdentity::signed_out();
        identity.login(&store).await;

        let tree = submit_tree(&filled_form(), &store, &mut identity).await.unwrap();
        assert_eq!(tree.status, TreeStatus::Pending);
        assert_eq!(tree.submitted_by, MOCK_USER_ID);
        assert_eq!(tree.photo_url, DEFAULT_TREE_IMAGE);
        assert_eq!(identity.user().unwrap().points, 1347);
        assert_eq!(store.list_by_user(MOCK_USER_ID).await.len(), 3);
    }

    #[tokio::test]
    async fn invalid_form_is_not_stored() {
        let store = MockTreeStore::seeded();
        let mut identity = SessionIdentity::signed_out();
        identity.login(&store).await;

        let form = TreeForm {
            description: "krótki".to_string(),
            ..filled_form()
        };
        let err = submit_tree(&form, &store, &mut identity).await.unwrap_err();
        assert_eq!(err.to_string(), "Opis musi mieć co najmniej 10 znaków.");
        assert_eq!(store.list().await.len(), 6);
        assert_eq!(identity.user().unwrap().points, 1337);
    }

    #[test]
    fn photo_file_becomes_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drzewo.PNG");
        std::fs::File::create(&path).unwrap().write_all(b"hello").unwrap();

        let uri = photo_data_uri_from_path(&path).unwrap();
        assert_eq!(uri, "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn unknown_photo_extension_is_rejected() {
        let err = photo_data_uri_from_path(Path::new("drzewo.txt")).unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }
}
