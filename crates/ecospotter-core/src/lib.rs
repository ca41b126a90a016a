pub mod ai;
pub mod assistant;
pub mod capability;
pub mod community;
pub mod config;
pub mod conversation;
pub mod error;
pub mod identity;
pub mod invoker;
pub mod profile;
pub mod provider;
pub mod router;
pub mod schema;
pub mod state;
pub mod store;
pub mod submission;
pub mod timeout;

// Re-export main types for convenience
pub use ai::{ClaudeClient, ModelProvider, OllamaClient, OpenAIClient};
pub use assistant::ChatAssistant;
pub use capability::{Capability, Prompt};
pub use community::{ModerationQueue, Vote};
pub use config::Config;
pub use conversation::{Conversation, ConversationState, SendTicket};
pub use error::{CapabilityError, ProviderError, ValidationError};
pub use identity::SessionIdentity;
pub use invoker::CapabilityInvoker;
pub use profile::UserProfile;
pub use provider::Provider;
pub use router::{Intent, IntentRouter, RouteContext};
pub use state::{ChatMessage, ChatRole};
pub use store::{AppUser, MockTreeStore, Tree, TreeStore};
pub use submission::{SubmissionAssist, TreeForm};
pub use timeout::{with_timeout, TimeoutGuard, TimeoutPolicy};
