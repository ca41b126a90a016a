use std::path::Path;
use std::sync::Arc;

use ecospotter_core::capability::SubmissionAssistantOutput;
use ecospotter_core::error::ProviderError;
use ecospotter_core::profile::{self, UserProfile, PROFILE_NOT_FOUND};
use ecospotter_core::submission::{self, AssistFailure, SUBMISSION_POINTS};
use ecospotter_core::{
    AppUser, CapabilityError, CapabilityInvoker, ChatAssistant, Config, Conversation,
    IntentRouter, MockTreeStore, ModelProvider, ModerationQueue, Provider, RouteContext,
    SendTicket, SessionIdentity, SubmissionAssist, Tree, TreeForm, TreeStore, Vote,
};
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Trees,
    Submit,
    Community,
    Chat,
    /// Reached from a tree's submitter; not part of the tab cycle.
    Profile,
}

impl Screen {
    pub fn all() -> [Screen; 4] {
        [Screen::Trees, Screen::Submit, Screen::Community, Screen::Chat]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Trees => "Mapa drzew",
            Screen::Submit => "Zgłoś drzewo",
            Screen::Community => "Społeczność",
            Screen::Chat => "Asystent AI",
            Screen::Profile => "Profil",
        }
    }

    /// Page path handed to the assistant as context.
    pub fn path(&self) -> &'static str {
        match self {
            Screen::Trees => "/map",
            Screen::Submit => "/submit",
            Screen::Community => "/community",
            Screen::Chat => "/",
            Screen::Profile => "/profile",
        }
    }

    fn next(self) -> Self {
        match self {
            Screen::Trees => Screen::Submit,
            Screen::Submit => Screen::Community,
            Screen::Community => Screen::Chat,
            Screen::Chat | Screen::Profile => Screen::Trees,
        }
    }

    fn prev(self) -> Self {
        match self {
            Screen::Trees => Screen::Chat,
            Screen::Submit => Screen::Trees,
            Screen::Community => Screen::Submit,
            Screen::Chat => Screen::Community,
            Screen::Profile => Screen::Trees,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Photo,
    Species,
    Diameter,
    Description,
    Monument,
}

impl FormField {
    pub fn all() -> [FormField; 5] {
        [
            FormField::Photo,
            FormField::Species,
            FormField::Diameter,
            FormField::Description,
            FormField::Monument,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Photo => "Zdjęcie (ścieżka)",
            FormField::Species => "Gatunek",
            FormField::Diameter => "Średnica (cm)",
            FormField::Description => "Opis",
            FormField::Monument => "Pomnik przyrody",
        }
    }
}

type ReplyTask = JoinHandle<Result<String, CapabilityError>>;
type AssistTask = JoinHandle<Result<SubmissionAssistantOutput, AssistFailure>>;

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    /// Last non-chat screen, used as the assistant's page context.
    pub origin: Screen,
    pub provider: Provider,
    pub model_name: String,
    pub default_location: String,

    // Chat
    pub conversation: Conversation,
    pub assistant: ChatAssistant,
    pub reply_task: Option<(SendTicket, ReplyTask)>,
    pub chat_scroll: u16,
    pub animation_frame: u8,

    // Trees
    pub store: Arc<MockTreeStore>,
    pub identity: SessionIdentity,
    pub users: Vec<AppUser>,
    pub trees: Vec<Tree>,
    pub tree_state: ListState,
    pub mine_only: bool,

    // Submit
    pub form: TreeForm,
    pub form_field: FormField,
    pub photo_path: String,
    pub diameter_input: String,
    pub characteristics: Option<String>,
    pub submission_assist: SubmissionAssist,
    pub assist_task: Option<AssistTask>,

    // Community
    pub moderation: ModerationQueue,
    pub moderation_state: ListState,

    // Profile
    pub profile_uid: String,
    /// `None` when `profile_uid` names no known user.
    pub profile: Option<UserProfile>,
    pub profile_state: ListState,

    /// One-line notice shown in the footer until the next action.
    pub status: Option<String>,
}

impl App {
    pub async fn new(config: &Config, provider: Provider, client: Arc<dyn ModelProvider>) -> Self {
        let model_name = config
            .default_model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string());

        let invoker = CapabilityInvoker::new(client);
        let guard = config.timeout_guard();
        let router = IntentRouter::new(&config.default_location);
        let assistant = ChatAssistant::new(router, invoker.clone(), guard);
        let submission_assist = SubmissionAssist::new(invoker).with_guard(guard);

        let store = Arc::new(MockTreeStore::seeded());
        let mut identity = SessionIdentity::signed_out();
        identity.login(store.as_ref()).await;
        let users = store.list_users().await;
        let moderation = ModerationQueue::from_store(store.as_ref()).await;

        let mut app = Self {
            should_quit: false,
            screen: Screen::Trees,
            origin: Screen::Trees,
            provider,
            model_name,
            default_location: config.default_location.clone(),
            conversation: Conversation::new(),
            assistant,
            reply_task: None,
            chat_scroll: 0,
            animation_frame: 0,
            store,
            identity,
            users,
            trees: Vec::new(),
            tree_state: ListState::default(),
            mine_only: false,
            form: TreeForm::default(),
            form_field: FormField::Photo,
            photo_path: String::new(),
            diameter_input: String::new(),
            characteristics: None,
            submission_assist,
            assist_task: None,
            moderation,
            moderation_state: ListState::default(),
            profile_uid: String::new(),
            profile: None,
            profile_state: ListState::default(),
            status: None,
        };
        app.refresh_trees().await;
        if !app.moderation.submissions().is_empty() {
            app.moderation_state.select(Some(0));
        }
        app
    }

    pub fn next_screen(&mut self) {
        self.switch_to(self.screen.next());
    }

    pub fn prev_screen(&mut self) {
        self.switch_to(self.screen.prev());
    }

    pub fn switch_to(&mut self, screen: Screen) {
        if self.screen != Screen::Chat {
            self.origin = self.screen;
        }
        self.screen = screen;
    }

    pub fn route_context(&self) -> RouteContext {
        match self.origin {
            Screen::Profile => {
                RouteContext::at_path(&format!("{}/{}", Screen::Profile.path(), self.profile_uid))
            }
            screen => RouteContext::at_path(screen.path()),
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_pending() || self.assist_task.is_some() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // ---- Chat ----

    /// Hand the typed message to the assistant on a background task.
    pub fn send_chat(&mut self) {
        let Some(ticket) = self.conversation.submit_input() else {
            return;
        };
        let assistant = self.assistant.clone();
        let context = self.route_context();
        let text = ticket.text().to_string();
        let handle = tokio::spawn(async move { assistant.respond(&text, &context).await });
        self.reply_task = Some((ticket, handle));
        self.scroll_chat_to_bottom();
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = u16::MAX;
    }

    /// Collect finished background work. Called on every tick.
    pub async fn poll_tasks(&mut self) {
        if self
            .reply_task
            .as_ref()
            .is_some_and(|(_, handle)| handle.is_finished())
        {
            if let Some((ticket, handle)) = self.reply_task.take() {
                let outcome = handle.await.unwrap_or_else(|err| {
                    Err(CapabilityError::Provider(ProviderError::Unavailable(err.to_string())))
                });
                self.conversation.complete(&ticket, outcome);
                self.scroll_chat_to_bottom();
            }
        }

        if self.assist_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = self.assist_task.take() {
                let outcome = handle.await.unwrap_or(Err(AssistFailure::NotIdentified));
                self.finish_assist(outcome);
            }
        }
    }

    // ---- Trees ----

    pub async fn refresh_trees(&mut self) {
        self.trees = match (self.mine_only, self.identity.user_id()) {
            (true, Some(uid)) => self.store.list_by_user(uid).await,
            _ => self.store.list().await,
        };
        let selected = if self.trees.is_empty() {
            None
        } else {
            Some(self.tree_state.selected().unwrap_or(0).min(self.trees.len() - 1))
        };
        self.tree_state.select(selected);
    }

    pub async fn toggle_mine_only(&mut self) {
        if self.identity.user().is_none() {
            self.status = Some("Zaloguj się, aby zobaczyć swoje drzewa.".to_string());
            return;
        }
        self.mine_only = !self.mine_only;
        self.refresh_trees().await;
    }

    pub async fn toggle_login(&mut self) {
        if self.identity.user().is_some() {
            self.identity.logout();
            self.mine_only = false;
            self.status = Some("Wylogowano.".to_string());
        } else if let Some(user) = self.identity.login(self.store.as_ref()).await {
            self.status = Some(format!("Zalogowano jako {}.", user.display_name));
        }
        self.refresh_trees().await;
    }

    pub fn selected_tree(&self) -> Option<&Tree> {
        self.tree_state.selected().and_then(|i| self.trees.get(i))
    }

    pub fn display_name(&self, uid: &str) -> String {
        self.users
            .iter()
            .find(|user| user.uid == uid)
            .map(|user| user.display_name.clone())
            .unwrap_or_else(|| uid.to_string())
    }

    pub fn select_next_tree(&mut self) {
        step_selection(&mut self.tree_state, self.trees.len(), 1);
    }

    pub fn select_prev_tree(&mut self) {
        step_selection(&mut self.tree_state, self.trees.len(), -1);
    }

    // ---- Submit ----

    pub fn next_field(&mut self) {
        let fields = FormField::all();
        let idx = fields.iter().position(|f| *f == self.form_field).unwrap_or(0);
        self.form_field = fields[(idx + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields = FormField::all();
        let idx = fields.iter().position(|f| *f == self.form_field).unwrap_or(0);
        self.form_field = fields[(idx + fields.len() - 1) % fields.len()];
    }

    pub fn field_input(&mut self, c: char) {
        match self.form_field {
            FormField::Photo => self.photo_path.push(c),
            FormField::Species => self.form.species.push(c),
            FormField::Diameter if c.is_ascii_digit() => {
                self.diameter_input.push(c);
                self.sync_diameter();
            }
            FormField::Diameter => {}
            FormField::Description => self.form.description.push(c),
            FormField::Monument => {
                if c == ' ' {
                    self.form.is_monument = !self.form.is_monument;
                }
            }
        }
    }

    pub fn field_backspace(&mut self) {
        match self.form_field {
            FormField::Photo => {
                self.photo_path.pop();
            }
            FormField::Species => {
                self.form.species.pop();
            }
            FormField::Diameter => {
                self.diameter_input.pop();
                self.sync_diameter();
            }
            FormField::Description => {
                self.form.description.pop();
            }
            FormField::Monument => {}
        }
    }

    fn sync_diameter(&mut self) {
        self.form.diameter = self.diameter_input.parse().unwrap_or(0);
    }

    /// Read the photo at `photo_path` into the form.
    pub fn load_photo(&mut self) {
        let path = self.photo_path.trim();
        if path.is_empty() {
            self.form.photo_data_uri = None;
            return;
        }
        match submission::photo_data_uri_from_path(Path::new(path)) {
            Ok(uri) => {
                self.form.photo_data_uri = Some(uri);
                self.status = Some("Zdjęcie wczytane.".to_string());
            }
            Err(err) => {
                warn!(error = %err, "could not load photo");
                self.form.photo_data_uri = None;
                self.status = Some(err.to_string());
            }
        }
    }

    /// Ask the model for the species on the current photo.
    pub fn request_assist(&mut self) {
        if self.assist_task.is_some() {
            return;
        }
        if self.form.photo_data_uri.is_none() && !self.photo_path.trim().is_empty() {
            self.load_photo();
        }
        let Some(photo) = self.form.photo_data_uri.clone() else {
            self.status = Some(AssistFailure::MissingPhoto.notice().to_string());
            return;
        };
        let description = self.form.description.clone();
        let assist = self.submission_assist.clone();
        self.characteristics = None;
        self.status = None;
        self.assist_task = Some(tokio::spawn(async move {
            assist.suggest(Some(photo.as_str()), Some(description.as_str())).await
        }));
    }

    fn finish_assist(&mut self, outcome: Result<SubmissionAssistantOutput, AssistFailure>) {
        match outcome {
            Ok(suggestion) => {
                if self.form.apply_suggestion(&suggestion) {
                    self.status =
                        Some(format!("Sądzimy, że to może być {}.", suggestion.species));
                } else {
                    self.status = Some(AssistFailure::NotIdentified.notice().to_string());
                }
                self.characteristics = Some(suggestion.characteristics);
            }
            Err(failure) => self.status = Some(failure.notice().to_string()),
        }
    }

    pub async fn submit_form(&mut self) {
        if self.form.photo_data_uri.is_none() && !self.photo_path.trim().is_empty() {
            self.load_photo();
        }
        match submission::submit_tree(&self.form, self.store.as_ref(), &mut self.identity).await {
            Ok(tree) => {
                info!(id = %tree.id, species = %tree.species, "tree submitted from form");
                self.status = Some(format!(
                    "Zgłoszenie udane! Zdobyłeś {} punktów!",
                    SUBMISSION_POINTS
                ));
                self.reset_form();
                self.refresh_trees().await;
                self.moderation.refresh(self.store.as_ref()).await;
                if self.moderation_state.selected().is_none() {
                    self.moderation_state.select(Some(0));
                }
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn reset_form(&mut self) {
        self.form = TreeForm::default();
        self.form_field = FormField::Photo;
        self.photo_path.clear();
        self.diameter_input.clear();
        self.characteristics = None;
    }

    // ---- Profile ----

    pub async fn open_profile(&mut self, user_id: &str) {
        self.profile_uid = user_id.to_string();
        self.profile = UserProfile::load(self.store.as_ref(), user_id).await;
        let selected = match &self.profile {
            Some(profile) if !profile.trees.is_empty() => Some(0),
            _ => None,
        };
        self.profile_state.select(selected);
        if self.profile.is_none() {
            self.status = Some(PROFILE_NOT_FOUND.to_string());
        }
        self.switch_to(Screen::Profile);
    }

    pub async fn open_submitter_profile(&mut self) {
        if let Some(user_id) = self.selected_tree().map(|tree| tree.submitted_by.clone()) {
            self.open_profile(&user_id).await;
        }
    }

    pub async fn open_own_profile(&mut self) {
        match self.identity.user_id().map(str::to_string) {
            Some(user_id) => self.open_profile(&user_id).await,
            None => self.status = Some("Zaloguj się, aby zobaczyć swój profil.".to_string()),
        }
    }

    fn profile_tree_count(&self) -> usize {
        self.profile.as_ref().map_or(0, UserProfile::submitted_count)
    }

    pub fn select_next_profile_tree(&mut self) {
        let count = self.profile_tree_count();
        step_selection(&mut self.profile_state, count, 1);
    }

    pub fn select_prev_profile_tree(&mut self) {
        let count = self.profile_tree_count();
        step_selection(&mut self.profile_state, count, -1);
    }

    pub fn selected_profile_tree(&self) -> Option<&Tree> {
        let profile = self.profile.as_ref()?;
        self.profile_state.selected().and_then(|i| profile.trees.get(i))
    }

    pub fn can_report_profile(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|profile| profile.can_report(self.identity.user_id()))
    }

    pub fn comment_on_selected(&mut self) {
        if let Some(tree_id) = self.selected_profile_tree().map(|tree| tree.id.clone()) {
            self.status = Some(profile::comment_notice(&tree_id));
        }
    }

    pub fn report_selected(&mut self) {
        if !self.can_report_profile() {
            return;
        }
        if let Some(tree_id) = self.selected_profile_tree().map(|tree| tree.id.clone()) {
            info!(tree_id = %tree_id, "tree reported");
            self.status = Some(profile::report_notice(&tree_id));
        }
    }

    // ---- Community ----

    pub fn select_next_submission(&mut self) {
        step_selection(&mut self.moderation_state, self.moderation.submissions().len(), 1);
    }

    pub fn select_prev_submission(&mut self) {
        step_selection(&mut self.moderation_state, self.moderation.submissions().len(), -1);
    }

    pub fn vote_selected(&mut self, vote: Vote) {
        let Some(tree_id) = self
            .moderation_state
            .selected()
            .and_then(|i| self.moderation.submissions().get(i))
            .map(|submission| submission.tree_id.clone())
        else {
            return;
        };
        match self.moderation.vote(&tree_id, vote) {
            Ok(_) => self.status = Some("Dziękujemy za głos!".to_string()),
            Err(err) => self.status = Some(err.to_string()),
        }
    }
}

fn step_selection(state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, len as isize - 1);
    state.select(Some(next as usize));
}
