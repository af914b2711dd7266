//! Debounced saving of a session's notes.
//!
//! Keystrokes are sent to a background task that holds the latest text and
//! writes it once no edit has arrived for the configured delay. Closing the
//! draft writes whatever is still pending.

use std::time::Duration;

use tabletop_campaign::application::command_handlers::handle_save_session_notes;
use tabletop_campaign::domain::commands::SaveSessionNotes;
use tabletop_core::record::RecordId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Quiet period before an edit is written.
pub const DEFAULT_NOTES_DELAY: Duration = Duration::from_millis(1000);

/// An open notes editor for one session.
#[derive(Debug)]
pub struct NotesDraft {
    edits: mpsc::UnboundedSender<String>,
    writer: JoinHandle<()>,
}

impl NotesDraft {
    /// Starts the background writer for `session_id`.
    #[must_use]
    pub fn open(state: AppState, session_id: RecordId, delay: Duration) -> Self {
        let (edits, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(state, session_id, delay, rx));
        Self { edits, writer }
    }

    /// Replaces the pending text and restarts the quiet period.
    pub fn edit(&self, notes: impl Into<String>) {
        if self.edits.send(notes.into()).is_err() {
            warn!("notes writer has stopped, edit dropped");
        }
    }

    /// Writes any pending text now and stops the writer.
    pub async fn close(self) {
        drop(self.edits);
        if let Err(e) = self.writer.await {
            warn!(error = %e, "notes writer ended abnormally");
        }
    }
}

async fn write_loop(
    state: AppState,
    session_id: RecordId,
    delay: Duration,
    mut edits: mpsc::UnboundedReceiver<String>,
) {
    let mut pending: Option<String> = None;
    loop {
        let received = if pending.is_some() {
            tokio::select! {
                received = edits.recv() => received,
                () = tokio::time::sleep(delay) => {
                    if let Some(notes) = pending.take() {
                        save(&state, &session_id, notes).await;
                    }
                    continue;
                }
            }
        } else {
            edits.recv().await
        };

        match received {
            Some(notes) => pending = Some(notes),
            None => break,
        }
    }

    if let Some(notes) = pending {
        save(&state, &session_id, notes).await;
    }
}

async fn save(state: &AppState, session_id: &RecordId, notes: String) {
    let command = SaveSessionNotes {
        correlation_id: Uuid::new_v4(),
        session_id: session_id.clone(),
        notes,
    };
    let result =
        handle_save_session_notes(&command, state.clock.as_ref(), state.stores.sessions.as_ref())
            .await;
    match result {
        Ok(session) => debug!(session_id = %session.id, version = session.version, "notes written"),
        Err(e) => warn!(session_id = %session_id, error = %e, "failed to save session notes"),
    }
}
