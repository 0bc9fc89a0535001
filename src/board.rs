//! The message board view controller.
//!
//! [`MessageBoard`] owns the view state and runs the three user-facing
//! operations (load, post, delete) plus paging. Store failures never escape:
//! each is logged and reduced to a fixed banner string in
//! [`BoardState::error_message`]. Every operation takes `&mut self`, so state
//! is only ever written from one task.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::auth::AuthContext;
use crate::config::AppConfig;
use crate::error::BoardError;
use crate::logging::OperationTimer;
use crate::metrics::BoardMetrics;
use crate::models::{Cursor, CurrentUser, Message, MessageRow, NewMessage, PageRequest};
use crate::names::{name_for_row, InsertNamePolicy};
use crate::store::MessageStore;
use crate::validation::InputValidator;

/// Banner shown when listing fails
pub const LOAD_FAILED: &str = "Failed to load messages. Please try again later.";
/// Banner shown when posting fails
pub const POST_FAILED: &str = "Failed to post message. Please try again.";
/// Banner shown when deleting fails
pub const DELETE_FAILED: &str = "Failed to delete message. Please try again.";

/// Default number of messages fetched per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// How a board operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A precondition was not met; nothing was sent and nothing changed
    Skipped,
    /// The store call succeeded and the state reflects it
    Succeeded,
    /// The store call failed; the error banner is set
    Failed,
    /// The view was unmounted; the result was discarded
    Cancelled,
}

impl Outcome {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Tunables for a [`MessageBoard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardOptions {
    /// Messages fetched per page
    pub page_size: usize,
    /// Name source for freshly posted messages
    pub insert_name: InsertNamePolicy,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            insert_name: InsertNamePolicy::Email,
        }
    }
}

impl BoardOptions {
    /// Options from the `board` section of the configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        InputValidator::validate_page_size(config.board.page_size)?;
        Ok(Self {
            page_size: config.board.page_size,
            insert_name: config.insert_name_policy()?,
        })
    }
}

/// Everything the view renders from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    /// Messages in display order
    pub messages: Vec<Message>,
    /// Text typed but not yet posted
    pub draft: String,
    /// A list call is in flight
    pub is_loading: bool,
    /// Banner text from the most recent failure
    pub error_message: Option<String>,
    /// The last page came back full, so older messages may exist
    pub has_more: bool,
    /// Keyset position of the last row the store returned; the next page
    /// starts after it
    pub next_cursor: Option<Cursor>,
}

/// View controller for the message board
pub struct MessageBoard {
    store: Arc<dyn MessageStore>,
    auth: Arc<dyn AuthContext>,
    options: BoardOptions,
    state: BoardState,
    cancel: CancellationToken,
    metrics: BoardMetrics,
}

impl MessageBoard {
    /// Create a board over `store`, acting for whoever `auth` reports.
    pub fn new(store: Arc<dyn MessageStore>, auth: Arc<dyn AuthContext>, options: BoardOptions) -> Self {
        Self {
            store,
            auth,
            options,
            state: BoardState::default(),
            cancel: CancellationToken::new(),
            metrics: BoardMetrics::default(),
        }
    }

    /// Current view state.
    #[must_use]
    pub const fn state(&self) -> &BoardState {
        &self.state
    }

    /// Messages in display order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    /// The unsent draft.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.state.draft
    }

    /// Replace the draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.draft = text.into();
    }

    /// Whether a list call is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    /// Banner text, if the last failing operation left one.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message.as_deref()
    }

    /// Whether older messages may be fetched with [`load_more`](Self::load_more).
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.state.has_more
    }

    /// Options the board was built with.
    #[must_use]
    pub const fn options(&self) -> &BoardOptions {
        &self.options
    }

    /// Outcome tallies for this board.
    #[must_use]
    pub const fn metrics(&self) -> &BoardMetrics {
        &self.metrics
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.auth.current_user()
    }

    /// Whether to offer the delete control for `message`.
    ///
    /// This only hides the control from non-authors; the store's access
    /// policy is what actually permits or refuses the delete.
    #[must_use]
    pub fn can_delete(&self, message: &Message) -> bool {
        self.auth
            .current_user()
            .is_some_and(|user| message.is_authored_by(&user))
    }

    /// Token that discards every pending and future result once cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Tear the view down. In-flight operations resolve to
    /// [`Outcome::Cancelled`] without touching messages or the banner.
    pub fn unmount(&self) {
        debug!("Unmounting message board");
        self.cancel.cancel();
    }

    /// Whether the view has been torn down.
    #[must_use]
    pub fn is_unmounted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fetch the newest page and replace the list with it.
    pub async fn load(&mut self) -> Outcome {
        if self.is_unmounted() {
            return self.finish("load", Outcome::Cancelled, None);
        }

        self.state.is_loading = true;
        let timer = OperationTimer::new("load");
        let page = PageRequest::first(self.options.page_size);

        let result = race(&self.cancel, self.store.list_messages(&page)).await;
        self.state.is_loading = false;
        let elapsed = timer.finish();
        self.clear_banner_if_resolved(result.is_some());

        let outcome = match result {
            None => {
                debug!("View unmounted, discarding loaded messages");
                Outcome::Cancelled
            },
            Some(Ok(rows)) => {
                self.metrics.record_messages_loaded(rows.len());
                self.state.has_more = rows.len() == page.limit;
                self.state.next_cursor = rows.last().map(MessageRow::cursor);
                self.state.messages = rows
                    .into_iter()
                    .map(|row| {
                        let name = name_for_row(&row);
                        Message::from_row(row, name)
                    })
                    .collect();
                Outcome::Succeeded
            },
            Some(Err(err)) => {
                error!(error = %err, "Error fetching messages");
                self.state.error_message = Some(LOAD_FAILED.to_string());
                Outcome::Failed
            },
        };

        self.finish("load", outcome, Some(elapsed))
    }

    /// Fetch the page after the last row the store returned and append it.
    ///
    /// The cursor comes from the store's own ordering, never from comparing
    /// ids locally. Skipped when nothing is loaded yet or the last page was
    /// short. Rows already in the list are dropped.
    pub async fn load_more(&mut self) -> Outcome {
        let Some(cursor) = self.state.next_cursor.clone() else {
            return self.finish("load_more", Outcome::Skipped, None);
        };
        if !self.state.has_more {
            return self.finish("load_more", Outcome::Skipped, None);
        }
        if self.is_unmounted() {
            return self.finish("load_more", Outcome::Cancelled, None);
        }

        self.state.is_loading = true;
        let timer = OperationTimer::new("load_more");
        let page = PageRequest::before(self.options.page_size, cursor);

        let result = race(&self.cancel, self.store.list_messages(&page)).await;
        self.state.is_loading = false;
        let elapsed = timer.finish();
        self.clear_banner_if_resolved(result.is_some());

        let outcome = match result {
            None => Outcome::Cancelled,
            Some(Ok(rows)) => {
                self.metrics.record_messages_loaded(rows.len());
                self.state.has_more = rows.len() == page.limit;
                if let Some(last) = rows.last() {
                    self.state.next_cursor = Some(last.cursor());
                }
                let known: HashSet<String> = self.state.messages.iter().map(|m| m.id.clone()).collect();
                self.state.messages.extend(rows.into_iter().filter(|row| !known.contains(&row.id)).map(|row| {
                    let name = name_for_row(&row);
                    Message::from_row(row, name)
                }));
                Outcome::Succeeded
            },
            Some(Err(err)) => {
                error!(error = %err, "Error fetching more messages");
                self.state.error_message = Some(LOAD_FAILED.to_string());
                Outcome::Failed
            },
        };

        self.finish("load_more", outcome, Some(elapsed))
    }

    /// Post the current draft as the signed-in user.
    ///
    /// Silently skipped when nobody is signed in or the draft is blank. The
    /// draft is sent untrimmed. On success the stored row is prepended and
    /// the draft cleared; on failure the draft is kept for a manual retry.
    pub async fn post_message(&mut self) -> Outcome {
        let Some(user) = self.auth.current_user() else {
            debug!("No signed-in user, ignoring post");
            return self.finish("post", Outcome::Skipped, None);
        };
        if !InputValidator::is_postable(&self.state.draft) {
            debug!("Blank draft, ignoring post");
            return self.finish("post", Outcome::Skipped, None);
        }
        if self.is_unmounted() {
            return self.finish("post", Outcome::Cancelled, None);
        }

        let timer = OperationTimer::new("post");
        let new_message = NewMessage {
            user_id: user.id.clone(),
            content: self.state.draft.clone(),
        };

        let store = self.store.as_ref();
        let policy = self.options.insert_name;
        let result = race(&self.cancel, async {
            let row = store.insert_message(&new_message).await?;
            let name = policy.resolve(store, &user).await;
            Ok::<_, BoardError>((row, name))
        })
        .await;
        let elapsed = timer.finish();
        self.clear_banner_if_resolved(result.is_some());

        let outcome = match result {
            None => Outcome::Cancelled,
            Some(Ok((row, name))) => {
                self.state.messages.insert(0, Message::from_row(row, name));
                self.state.draft.clear();
                Outcome::Succeeded
            },
            Some(Err(err)) => {
                error!(error = %err, user_id = %user.id, "Error posting message");
                self.state.error_message = Some(POST_FAILED.to_string());
                Outcome::Failed
            },
        };

        self.finish("post", outcome, Some(elapsed))
    }

    /// Delete a message by id, then drop it from the list.
    ///
    /// Ownership is not re-checked here; see [`can_delete`](Self::can_delete).
    /// The remote call is made even when the id is not in the list.
    pub async fn delete_message(&mut self, id: &str) -> Outcome {
        if self.is_unmounted() {
            return self.finish("delete", Outcome::Cancelled, None);
        }

        let timer = OperationTimer::new("delete");
        let result = race(&self.cancel, self.store.delete_message(id)).await;
        let elapsed = timer.finish();
        self.clear_banner_if_resolved(result.is_some());

        let outcome = match result {
            None => Outcome::Cancelled,
            Some(Ok(())) => {
                self.state.messages.retain(|message| message.id != id);
                Outcome::Succeeded
            },
            Some(Err(err)) => {
                error!(error = %err, message_id = id, "Error deleting message");
                self.state.error_message = Some(DELETE_FAILED.to_string());
                Outcome::Failed
            },
        };

        self.finish("delete", outcome, Some(elapsed))
    }

    /// Each attempt that passes its preconditions starts from a clean banner.
    /// A discarded attempt leaves the previous banner in place.
    fn clear_banner_if_resolved(&mut self, resolved: bool) {
        if resolved {
            self.state.error_message = None;
        }
    }

    fn finish(&mut self, operation: &'static str, outcome: Outcome, elapsed: Option<Duration>) -> Outcome {
        self.metrics.record_operation(operation, outcome, elapsed);
        outcome
    }
}

/// Run `operation` unless `cancel` fires first.
async fn race<F: Future>(cancel: &CancellationToken, operation: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        output = operation => Some(output),
    }
}
