//! Chat session state: transcript, input buffer and the in-flight flag.
//!
//! A send is split in two so a front-end can keep drawing while the assistant
//! works: [`Conversation::begin_send`] records the user turn and hands back a
//! [`SendTicket`], [`Conversation::complete`] folds the outcome in. Only the
//! ticket of the send in flight is accepted, so a stray or repeated completion
//! never adds a second reply.

use tracing::{debug, info};

use crate::assistant::{failure_notice, ChatAssistant};
use crate::error::CapabilityError;
use crate::router::RouteContext;
use crate::state::{ChatMessage, ChatRole, MessageIds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    Sending,
}

/// Proof that a send was accepted. Redeemed once through
/// [`Conversation::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    message_id: String,
    text: String,
}

impl SendTicket {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    transcript: Vec<ChatMessage>,
    input: String,
    in_flight: Option<String>,
    ids: MessageIds,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn state(&self) -> ConversationState {
        if self.in_flight.is_some() {
            ConversationState::Sending
        } else {
            ConversationState::Idle
        }
    }

    /// Whether the "assistant is typing" indicator should be drawn.
    pub fn is_pending(&self) -> bool {
        self.state() == ConversationState::Sending
    }

    /// Send whatever is in the input buffer.
    pub fn submit_input(&mut self) -> Option<SendTicket> {
        let text = self.input.clone();
        self.begin_send(&text)
    }

    /// Append the user turn and enter `Sending`.
    ///
    /// Returns `None`, changing nothing, for blank text or while another send
    /// is in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<SendTicket> {
        if text.trim().is_empty() {
            return None;
        }
        if self.is_pending() {
            debug!("send ignored while a reply is pending");
            return None;
        }

        let message_id = self.push(ChatRole::User, text.to_string());
        self.input.clear();
        self.in_flight = Some(message_id.clone());

        Some(SendTicket {
            message_id,
            text: text.to_string(),
        })
    }

    /// Append the assistant turn for `ticket` and return to `Idle`.
    ///
    /// Returns `false` if the ticket is not the send in flight; the outcome is
    /// then discarded.
    pub fn complete(
        &mut self,
        ticket: &SendTicket,
        outcome: Result<String, CapabilityError>,
    ) -> bool {
        if self.in_flight.as_deref() != Some(ticket.message_id.as_str()) {
            debug!(message_id = %ticket.message_id, "discarding reply for a settled send");
            return false;
        }

        let text = match outcome {
            Ok(reply) => reply,
            Err(err) => {
                info!(error = %err, "assistant reply failed");
                failure_notice(&err).to_string()
            }
        };
        self.push(ChatRole::Assistant, text);
        self.in_flight = None;
        true
    }

    /// Run a whole send cycle in place. Returns `false` if the send was
    /// rejected.
    pub async fn send(
        &mut self,
        text: &str,
        assistant: &ChatAssistant,
        context: &RouteContext,
    ) -> bool {
        let Some(ticket) = self.begin_send(text) else {
            return false;
        };
        let outcome = assistant.respond(ticket.text(), context).await;
        self.complete(&ticket, outcome)
    }

    fn push(&mut self, sender: ChatRole, text: String) -> String {
        let id = self.ids.next_id();
        self.transcript.push(ChatMessage {
            id: id.clone(),
            text,
            sender,
        });
        id
    }
}
