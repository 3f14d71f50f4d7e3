//! The conversation view model.
//!
//! [`ConversationViewModel`] owns the entry list, the input buffer, the loading flag and the
//! active reveal. All of that state sits behind one mutex that is never held across an
//! `.await`, so user actions, network completions and timer ticks are applied one at a time,
//! in the order they reach the lock. Events are recorded only after the lock is released:
//! an event-store callback is free to read the view model.

use crate::client::{ChatGateway, ChatReply};
use crate::conversation::entry::{Entry, EntryId, EntryList, MessageEntry};
use crate::conversation::reveal::{RevealHandle, RevealState, TickOutcome};
use crate::error::{Result, SpecBuddyError};
use crate::session::{SessionController, SessionId};
use crate::tracer::{CancelReason, ConversationEventKind, EventStore};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Text shown when a reply could not be obtained
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "⚠️ Sorry, I couldn't reach the server. Please try again in a moment.";

/// Tuning for the conversation view model
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Delay between revealed characters
    pub reveal_interval: Duration,
    /// Bot message appended when a reply request fails
    pub fallback_message: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            reveal_interval: Duration::from_millis(15),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// What a call to [`ConversationViewModel::submit`] did
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The text was empty after trimming; nothing changed
    Empty,
    /// A reply arrived and is being revealed into `entry_id`
    Replied {
        entry_id: EntryId,
        image_entry: Option<EntryId>,
    },
    /// The request failed and the fallback message was appended as `entry_id`
    Fallback { entry_id: EntryId, error: SpecBuddyError },
    /// The conversation was reset while the request was in flight; the reply was dropped
    Discarded,
}

/// Point-in-time copy of everything a renderer needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    pub entries: Vec<Entry>,
    pub input: String,
    pub loading: bool,
    pub revealing: bool,
}

impl ConversationSnapshot {
    /// Whether the typing indicator should show
    pub fn is_typing(&self) -> bool {
        self.loading
    }
}

struct ActiveReveal {
    token: u64,
    state: RevealState,
    handle: RevealHandle,
}

#[derive(Default)]
struct ConversationState {
    entries: EntryList,
    input: String,
    /// Reply requests dispatched but not yet resolved
    pending: usize,
    /// Bumped on every reset; replies from an older epoch are dropped
    epoch: u64,
    reveal: Option<ActiveReveal>,
    next_reveal_token: u64,
}

/// One reply request counted in `pending`.
///
/// Released under the state lock when the request resolves; if the `submit` future is
/// dropped first, the count is released on drop instead.
struct PendingRequest {
    inner: Arc<Inner>,
    released: bool,
}

impl PendingRequest {
    fn release(mut self, state: &mut ConversationState) {
        state.pending = state.pending.saturating_sub(1);
        self.released = true;
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        if !self.released {
            debug!("Reply request abandoned before it resolved");
            let mut state = self.inner.lock_state();
            state.pending = state.pending.saturating_sub(1);
        }
    }
}

struct Inner {
    session: SessionController,
    config: ConversationConfig,
    state: Mutex<ConversationState>,
    revealing: watch::Sender<bool>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record events gathered under the state lock; the guard must already be dropped.
    fn record_all(&self, events: Vec<ConversationEventKind>) {
        for kind in events {
            self.session.record(kind);
        }
    }

    /// Stop the active reveal, if any.
    ///
    /// On supersede the rest of the text is written out at once so the earlier reply is
    /// never left truncated; on reset the entry is about to be cleared anyway.
    fn stop_reveal(
        &self,
        state: &mut ConversationState,
        reason: CancelReason,
        events: &mut Vec<ConversationEventKind>,
    ) {
        let Some(active) = state.reveal.take() else {
            return;
        };

        active.handle.cancel();
        let entry_id = active.state.entry_id();

        if reason == CancelReason::Superseded {
            state.entries.write_bot_text(entry_id, &active.state.target());
        }

        debug!("Reveal of {} stopped: {:?}", entry_id, reason);
        self.revealing.send_replace(false);
        events.push(ConversationEventKind::RevealCancelled { entry_id, reason });
    }

    fn reveal_tick(&self, token: u64) -> TickOutcome {
        let mut events = Vec::new();
        let outcome = self.advance_reveal(token, &mut events);
        self.record_all(events);
        outcome
    }

    fn advance_reveal(&self, token: u64, events: &mut Vec<ConversationEventKind>) -> TickOutcome {
        let mut guard = self.lock_state();
        let state = &mut *guard;

        let Some(active) = state.reveal.as_mut() else {
            return TickOutcome::Finished;
        };
        if active.token != token {
            return TickOutcome::Finished;
        }

        if let Some(ch) = active.state.advance() {
            let mut entry_id = active.state.entry_id();
            if !state.entries.push_bot_char(entry_id, ch) {
                let target = state.entries.push(MessageEntry::bot(active.state.revealed()));
                warn!("Reveal target {} is not bot text, continuing in {}", entry_id, target);
                active.state.retarget(target);
                entry_id = target;
            }
            events.push(ConversationEventKind::RevealTick {
                entry_id,
                ch,
                offset: active.state.offset(),
            });
        }

        if !active.state.is_complete() {
            return TickOutcome::Continue;
        }

        let entry_id = active.state.entry_id();
        state.reveal = None;
        self.revealing.send_replace(false);
        debug!("Reveal of {} completed", entry_id);
        events.push(ConversationEventKind::RevealCompleted { entry_id });
        TickOutcome::Finished
    }
}

/// Conversation state machine: entry list, reply requests and the typing reveal.
///
/// Cloning is cheap and every clone drives the same conversation.
///
/// # Examples
///
/// ```ignore
/// use specbuddy::client::HttpChatGateway;
/// use specbuddy::conversation::ConversationViewModel;
/// use std::sync::Arc;
///
/// let gateway = Arc::new(HttpChatGateway::new()?);
/// let conversation = ConversationViewModel::new(gateway);
/// conversation.start().await.ok();
///
/// conversation.submit("I want to buy a laptop").await;
/// conversation.wait_for_reveal().await;
/// println!("{:?}", conversation.snapshot().entries);
/// ```
#[derive(Clone)]
pub struct ConversationViewModel {
    inner: Arc<Inner>,
}

impl ConversationViewModel {
    /// Create a view model with a fresh session id and default settings
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self::builder(gateway).build()
    }

    pub fn builder(gateway: Arc<dyn ChatGateway>) -> ConversationViewModelBuilder {
        ConversationViewModelBuilder::new(gateway)
    }

    pub fn session_id(&self) -> &SessionId {
        self.inner.session.session_id()
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.inner.config
    }

    /// Announce the session to the service.
    ///
    /// Failure is logged and recorded; the conversation remains usable regardless.
    pub async fn start(&self) -> Result<()> {
        self.inner.session.start().await
    }

    /// Replace the input buffer
    pub fn set_input(&self, text: impl Into<String>) {
        self.inner.lock_state().input = text.into();
    }

    pub fn input(&self) -> String {
        self.inner.lock_state().input.clone()
    }

    /// Submit whatever is in the input buffer
    pub async fn submit_input(&self) -> SubmitOutcome {
        let text = self.input();
        self.submit(&text).await
    }

    /// Submit a prompt suggestion exactly as if the user had typed it
    pub async fn select_suggestion(&self, prompt: &str) -> SubmitOutcome {
        self.set_input(prompt);
        self.submit_input().await
    }

    /// Send `text` to the service and append the outcome to the conversation.
    ///
    /// The user entry is appended, the input buffer cleared and the loading flag raised
    /// before the request goes out. On success an empty bot entry is appended and the reply
    /// is revealed into it one character per tick; an image, if any, is appended right away.
    /// Any failure appends the fallback message instead. The loading flag drops once the
    /// request resolves, whatever the result.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            debug!("Ignoring empty submission");
            return SubmitOutcome::Empty;
        }

        let mut events = Vec::new();
        let (epoch, pending) = {
            let mut state = self.inner.lock_state();
            self.inner.stop_reveal(&mut state, CancelReason::Superseded, &mut events);
            state.entries.push(MessageEntry::user(text));
            state.input.clear();
            state.pending += 1;
            let pending = PendingRequest {
                inner: self.inner.clone(),
                released: false,
            };
            (state.epoch, pending)
        };
        events.push(ConversationEventKind::ReplyRequested {
            message: text.to_string(),
        });
        self.inner.record_all(std::mem::take(&mut events));

        let result = self
            .inner
            .session
            .gateway()
            .chat(text, self.session_id().as_str())
            .await;

        let outcome = {
            let mut state = self.inner.lock_state();
            pending.release(&mut state);
            self.resolve(&mut state, epoch, result, &mut events)
        };
        self.inner.record_all(events);
        outcome
    }

    fn resolve(
        &self,
        state: &mut ConversationState,
        epoch: u64,
        result: Result<ChatReply>,
        events: &mut Vec<ConversationEventKind>,
    ) -> SubmitOutcome {
        if state.epoch != epoch {
            info!("Dropping reply for a conversation that was reset");
            events.push(ConversationEventKind::ReplyDiscarded);
            return SubmitOutcome::Discarded;
        }

        // A concurrent submission may have started its own reveal while this one waited.
        self.inner.stop_reveal(state, CancelReason::Superseded, events);

        match result {
            Ok(reply) => {
                events.push(ConversationEventKind::ReplyReceived {
                    chars: reply.reply.chars().count(),
                    image_url: reply.image().map(String::from),
                });

                let entry_id = state.entries.push(MessageEntry::bot(""));
                self.begin_reveal(state, entry_id, &reply.reply, events);
                let image_entry = reply.image().map(|url| state.entries.push(MessageEntry::image(url)));

                SubmitOutcome::Replied {
                    entry_id,
                    image_entry,
                }
            }
            Err(error) => {
                warn!("Reply request failed: {}", error);
                events.push(ConversationEventKind::ReplyFailed {
                    error: error.to_string(),
                });

                let entry_id =
                    state.entries.push(MessageEntry::bot(self.inner.config.fallback_message.as_str()));
                SubmitOutcome::Fallback { entry_id, error }
            }
        }
    }

    fn begin_reveal(
        &self,
        state: &mut ConversationState,
        entry_id: EntryId,
        text: &str,
        events: &mut Vec<ConversationEventKind>,
    ) {
        let reveal = RevealState::new(entry_id, text);
        events.push(ConversationEventKind::RevealStarted {
            entry_id,
            chars: reveal.len(),
        });

        if reveal.is_complete() {
            events.push(ConversationEventKind::RevealCompleted { entry_id });
            return;
        }

        let token = state.next_reveal_token;
        state.next_reveal_token += 1;

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let handle = RevealHandle::spawn(self.inner.config.reveal_interval, move || {
            match weak.upgrade() {
                Some(inner) => inner.reveal_tick(token),
                None => TickOutcome::Finished,
            }
        });

        state.reveal = Some(ActiveReveal {
            token,
            state: reveal,
            handle,
        });
        self.inner.revealing.send_replace(true);
    }

    /// Start a new conversation under the same session id.
    ///
    /// Local history, the input buffer and any running reveal are dropped before the service
    /// is told to forget the session. Replies still in flight are discarded when they land.
    /// The returned error only reports the remote notification; the local reset always happens.
    pub async fn reset(&self) -> Result<()> {
        let mut events = Vec::new();
        {
            let mut state = self.inner.lock_state();
            self.inner.stop_reveal(&mut state, CancelReason::Reset, &mut events);
            state.entries.clear();
            state.input.clear();
            state.epoch += 1;
        }
        self.inner.record_all(events);

        self.inner.session.reset().await
    }

    /// Wait until no reply is being revealed
    pub async fn wait_for_reveal(&self) {
        let mut rx = self.inner.revealing.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = rx.wait_for(|revealing| !*revealing).await;
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.inner.lock_state().entries.as_slice().to_vec()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock_state().pending > 0
    }

    pub fn is_revealing(&self) -> bool {
        self.inner.lock_state().reveal.is_some()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        let state = self.inner.lock_state();
        ConversationSnapshot {
            entries: state.entries.as_slice().to_vec(),
            input: state.input.clone(),
            loading: state.pending > 0,
            revealing: state.reveal.is_some(),
        }
    }

    #[cfg(test)]
    fn edit_entries(&self, edit: impl FnOnce(&mut EntryList)) {
        edit(&mut self.inner.lock_state().entries);
    }
}

/// Builder for constructing a `ConversationViewModel` with custom configuration.
pub struct ConversationViewModelBuilder {
    gateway: Arc<dyn ChatGateway>,
    session_id: Option<SessionId>,
    config: ConversationConfig,
    event_store: Option<Arc<EventStore>>,
}

impl ConversationViewModelBuilder {
    fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            gateway,
            session_id: None,
            config: ConversationConfig::default(),
            event_store: None,
        }
    }

    /// Use a known session id instead of generating one
    pub fn session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the delay between revealed characters (default: 15ms)
    pub fn reveal_interval(mut self, interval: Duration) -> Self {
        self.config.reveal_interval = interval;
        self
    }

    /// Set the message shown when a reply cannot be fetched
    pub fn fallback_message(mut self, message: impl Into<String>) -> Self {
        self.config.fallback_message = message.into();
        self
    }

    pub fn config(mut self, config: ConversationConfig) -> Self {
        self.config = config;
        self
    }

    /// Record conversation events into `store`
    pub fn event_store(mut self, store: Arc<EventStore>) -> Self {
        self.event_store = Some(store);
        self
    }

    pub fn build(self) -> ConversationViewModel {
        let session_id = self.session_id.unwrap_or_else(SessionId::generate);
        let mut session = SessionController::with_session_id(self.gateway, session_id);
        if let Some(store) = self.event_store {
            session = session.with_event_store(store);
        }

        let (revealing, _) = watch::channel(false);

        ConversationViewModel {
            inner: Arc::new(Inner {
                session,
                config: self.config,
                state: Mutex::new(ConversationState::default()),
                revealing,
            }),
        }
    }
}
