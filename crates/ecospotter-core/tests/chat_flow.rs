mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{invoker_for, StubProvider};
use ecospotter_core::assistant::{CONNECTION_NOTICE, TIMEOUT_NOTICE};
use ecospotter_core::{
    ChatAssistant, ChatRole, Conversation, ConversationState, IntentRouter, RouteContext,
    TimeoutGuard,
};
use serde_json::json;

const DEADLINE: Duration = Duration::from_millis(15_000);

fn assistant_for(stub: &Arc<StubProvider>) -> ChatAssistant {
    ChatAssistant::new(
        IntentRouter::default(),
        invoker_for(stub),
        TimeoutGuard::new(DEADLINE),
    )
}

fn texts(conversation: &Conversation) -> Vec<(ChatRole, String)> {
    conversation
        .transcript()
        .iter()
        .map(|message| (message.sender, message.text.clone()))
        .collect()
}

#[tokio::test]
async fn find_trees_reply_includes_notes() {
    let stub = Arc::new(StubProvider::replying(json!({
        "treeLocations": "Park X, Park Y",
        "additionalNotes": "Uważaj na korzenie"
    })));
    let assistant = assistant_for(&stub);
    let mut conversation = Conversation::new();

    assert!(
        conversation
            .send("znajdź drzewa", &assistant, &RouteContext::at_path("/map"))
            .await
    );

    assert_eq!(
        texts(&conversation),
        vec![
            (ChatRole::User, "znajdź drzewa".to_string()),
            (
                ChatRole::Assistant,
                "Znalazłem dla Ciebie kilka drzew:\nPark X, Park Y\n\nDodatkowe uwagi: Uważaj na korzenie"
                    .to_string()
            ),
        ]
    );
    let prompt = stub.last_prompt().unwrap();
    assert!(prompt.text.contains("obecnie w: twoja obecna okolica."));
    assert_eq!(conversation.state(), ConversationState::Idle);
}

#[tokio::test]
async fn other_questions_get_advice_verbatim() {
    let stub = Arc::new(StubProvider::replying(json!({
        "advice": "Wypełnij formularz i kliknij 'Zgłoś drzewo'."
    })));
    let assistant = assistant_for(&stub);
    let mut conversation = Conversation::new();

    conversation
        .send("jak dodać drzewo?", &assistant, &RouteContext::at_path("/submit"))
        .await;

    let last = conversation.transcript().last().unwrap();
    assert_eq!(last.sender, ChatRole::Assistant);
    assert_eq!(last.text, "Wypełnij formularz i kliknij 'Zgłoś drzewo'.");
    assert!(stub.last_prompt().unwrap().text.contains("na stronie: /submit"));
}

#[tokio::test]
async fn provider_failure_appends_connection_notice() {
    let stub = Arc::new(StubProvider::failing("503"));
    let assistant = assistant_for(&stub);
    let mut conversation = Conversation::new();

    conversation
        .send("co tu widzę?", &assistant, &RouteContext::default())
        .await;

    assert_eq!(conversation.transcript().len(), 2);
    assert_eq!(conversation.transcript()[1].text, CONNECTION_NOTICE);
    assert!(!conversation.is_pending());
}

#[tokio::test]
async fn contract_violation_appends_connection_notice() {
    let stub = Arc::new(StubProvider::replying(json!({ "treeLocations": 3 })));
    let assistant = assistant_for(&stub);
    let mut conversation = Conversation::new();

    conversation
        .send("Znajdź drzewa", &assistant, &RouteContext::default())
        .await;

    assert_eq!(conversation.transcript()[1].text, CONNECTION_NOTICE);
}

#[tokio::test(start_paused = true)]
async fn slow_reply_times_out_and_late_result_is_discarded() {
    let stub = Arc::new(
        StubProvider::replying(json!({ "advice": "za późno" }))
            .with_delay(Duration::from_millis(20_000)),
    );
    let assistant = assistant_for(&stub);
    let mut conversation = Conversation::new();

    conversation
        .send("jak dodać drzewo?", &assistant, &RouteContext::default())
        .await;

    assert_eq!(conversation.transcript().len(), 2);
    assert_eq!(conversation.transcript()[1].text, TIMEOUT_NOTICE);
    assert_eq!(conversation.state(), ConversationState::Idle);
    assert_eq!(stub.completed(), 0);

    // The abandoned call still finishes in the background.
    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(stub.completed(), 1);
    assert_eq!(conversation.transcript().len(), 2);
    assert_eq!(conversation.state(), ConversationState::Idle);
}

#[tokio::test(start_paused = true)]
async fn reply_just_inside_the_deadline_wins() {
    let stub = Arc::new(
        StubProvider::replying(json!({ "advice": "zdążyłem" }))
            .with_delay(Duration::from_millis(14_999)),
    );
    let assistant = assistant_for(&stub);
    let mut conversation = Conversation::new();

    conversation
        .send("pytanie", &assistant, &RouteContext::default())
        .await;

    assert_eq!(conversation.transcript()[1].text, "zdążyłem");
}

#[tokio::test(start_paused = true)]
async fn sends_are_serialized_while_a_reply_is_pending() {
    let stub = Arc::new(
        StubProvider::replying(json!({ "advice": "odpowiedź" }))
            .with_delay(Duration::from_millis(1_000)),
    );
    let assistant = assistant_for(&stub);
    let mut conversation = Conversation::new();

    let ticket = conversation.begin_send("pierwsze").unwrap();
    let worker = assistant.clone();
    let text = ticket.text().to_string();
    let task = tokio::spawn(async move { worker.respond(&text, &RouteContext::default()).await });

    assert!(conversation.is_pending());
    assert!(conversation.begin_send("drugie").is_none());
    assert_eq!(conversation.transcript().len(), 1);

    let outcome = task.await.unwrap();
    assert!(conversation.complete(&ticket, outcome));
    assert_eq!(stub.calls(), 1);

    assert!(conversation.begin_send("drugie").is_some());
    assert_eq!(conversation.transcript().len(), 3);
}

#[test]
fn assistant_reports_its_provider_and_deadline() {
    let stub = Arc::new(StubProvider::replying(json!({ "advice": "ok" })));
    let assistant = assistant_for(&stub);
    assert_eq!(assistant.provider_name(), "stub");
    assert_eq!(assistant.guard().deadline(), DEADLINE);
}
