mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{invoker_for, StubProvider, PHOTO};
use ecospotter_core::submission::{AssistFailure, IDENTIFY_FAILED_NOTICE, SELECT_PHOTO_NOTICE};
use ecospotter_core::{SubmissionAssist, TimeoutGuard, TreeForm};
use serde_json::json;

fn identified() -> StubProvider {
    StubProvider::replying(json!({
        "species": "Lipa drobnolistna",
        "characteristics": "Sercowate liście, pachnące kwiaty"
    }))
}

#[tokio::test]
async fn no_photo_fails_before_calling_the_provider() {
    let stub = Arc::new(identified());
    let assist = SubmissionAssist::new(invoker_for(&stub));

    for photo in [None, Some(""), Some("   ")] {
        let err = assist.suggest(photo, Some("duże drzewo")).await.unwrap_err();
        assert_eq!(err, AssistFailure::MissingPhoto);
        assert_eq!(err.notice(), SELECT_PHOTO_NOTICE);
    }
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn suggestion_prefills_species_only() {
    let stub = Arc::new(identified());
    let assist = SubmissionAssist::new(invoker_for(&stub));
    let mut form = TreeForm {
        photo_data_uri: Some(PHOTO.to_string()),
        ..TreeForm::default()
    };

    let suggestion = assist
        .suggest(form.photo_data_uri.as_deref(), Some(""))
        .await
        .unwrap();
    assert!(form.apply_suggestion(&suggestion));

    assert_eq!(form.species, "Lipa drobnolistna");
    assert_eq!(form.description, "");
    assert_eq!(suggestion.characteristics, "Sercowate liście, pachnące kwiaty");

    let prompt = stub.last_prompt().unwrap();
    assert_eq!(prompt.media.len(), 1);
    assert_eq!(prompt.media[0].mime_type, "image/jpeg");
    assert!(!prompt.text.contains("Opis:"));
}

#[tokio::test]
async fn failures_leave_the_form_untouched() {
    let stub = Arc::new(StubProvider::replying(json!({ "species": "Dąb" })));
    let assist = SubmissionAssist::new(invoker_for(&stub));
    let form = TreeForm::default();

    let err = assist.suggest(Some(PHOTO), None).await.unwrap_err();
    assert_eq!(err, AssistFailure::NotIdentified);
    assert_eq!(err.to_string(), IDENTIFY_FAILED_NOTICE);
    assert_eq!(form, TreeForm::default());
}

#[tokio::test]
async fn malformed_photo_is_rejected_without_a_call() {
    let stub = Arc::new(identified());
    let assist = SubmissionAssist::new(invoker_for(&stub));

    let err = assist
        .suggest(Some("https://example.com/drzewo.jpg"), None)
        .await
        .unwrap_err();
    assert_eq!(err, AssistFailure::NotIdentified);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn optional_guard_bounds_the_call() {
    let stub = Arc::new(identified().with_delay(Duration::from_secs(60)));
    let assist = SubmissionAssist::new(invoker_for(&stub))
        .with_guard(TimeoutGuard::new(Duration::from_secs(30)));

    let err = assist.suggest(Some(PHOTO), None).await.unwrap_err();
    assert_eq!(err, AssistFailure::NotIdentified);
    assert_eq!(stub.calls(), 1);
}
