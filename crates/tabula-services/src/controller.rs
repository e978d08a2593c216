//! CRUD submission controller
//!
//! Drives add/modify/delete/save for a record table. Each mutating action
//! walks `Idle -> Validating -> Submitting -> Succeeded | Failed -> Idle`, and
//! only one of them may be past `Idle` at a time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tabula_core::{
    CoreError, EditSession, FieldIssue, FormState, RecordTable, SubmissionMode,
};
use tabula_settings::ControllerSettings;

use crate::endpoint::{Envelope, RecordEndpoint};
use crate::error::{ServiceError, ServiceResult};
use crate::surface::{Dialog, NotificationSurface, Reloader, ToastKind};

/// User-facing texts shown by the controller
pub mod messages {
    pub const DELETED: &str = "Records deleted successfully.";
    pub const INSERTED: &str = "Record added successfully.";
    pub const UPDATED: &str = "Record updated successfully.";
    pub const DELETE_FAILED: &str = "Error while deleting.";
    pub const SAVE_FAILED: &str = "Error while saving.";
    pub const COMMUNICATION_ERROR: &str = "Error communicating with the server.";
    pub const INVALID_FORM: &str = "Please review the highlighted fields.";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// What an action ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The edit dialog is open for this session
    Staged(EditSession),
    /// The delete confirmation lists these rows
    AwaitingConfirmation { summaries: Vec<String> },
    /// The server accepted the change; a reload follows after `reload_in`
    Succeeded { reload_in: Duration },
    /// The server refused or could not be reached
    Failed { message: String },
    /// Wrong number of selected rows; nothing was sent
    SelectionRequired,
    /// Form constraints failed; nothing was sent
    Invalid(Vec<FieldIssue>),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

pub struct SubmissionController {
    endpoint: Arc<dyn RecordEndpoint>,
    surface: Arc<dyn NotificationSurface>,
    reloader: Arc<dyn Reloader>,
    reload_delay: Duration,
    state: Mutex<SubmissionState>,
}

/// Holds the controller out of `Idle` until dropped.
struct InFlight<'a> {
    state: &'a Mutex<SubmissionState>,
}

impl InFlight<'_> {
    fn advance(&self, next: SubmissionState) {
        let mut state = self.state.lock();
        tracing::debug!(from = ?*state, to = ?next, "Submission state");
        *state = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.state.lock() = SubmissionState::Idle;
    }
}

impl SubmissionController {
    pub fn new(
        endpoint: Arc<dyn RecordEndpoint>,
        surface: Arc<dyn NotificationSurface>,
        reloader: Arc<dyn Reloader>,
        settings: &ControllerSettings,
    ) -> Self {
        Self {
            endpoint,
            surface,
            reloader,
            reload_delay: settings.reload_delay(),
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.state() != SubmissionState::Idle
    }

    fn begin(&self) -> ServiceResult<InFlight<'_>> {
        let mut state = self.state.lock();
        if *state != SubmissionState::Idle {
            tracing::warn!(state = ?*state, "Submission rejected, another one is in flight");
            return Err(ServiceError::Busy);
        }
        *state = SubmissionState::Validating;
        Ok(InFlight { state: &self.state })
    }

    /// Open a blank edit form. Nothing is sent until [`Self::save`].
    pub fn add(&self, form: &mut FormState) -> EditSession {
        let session = form.begin_insert();
        self.surface.clear_form_error();
        self.surface.open_edit_dialog(SubmissionMode::Insert);
        tracing::debug!("Insert dialog staged");
        session
    }

    /// Open the edit form pre-filled from the single selected row.
    pub fn modify(&self, table: &RecordTable, form: &mut FormState) -> SubmissionOutcome {
        match form.begin_update(table.schema(), &table.selection()) {
            Ok(session) => {
                self.surface.clear_form_error();
                self.surface.open_edit_dialog(SubmissionMode::Update);
                tracing::debug!(id = ?session.target_id(), "Update dialog staged");
                SubmissionOutcome::Staged(session)
            }
            Err(err) => self.reject_selection(&err),
        }
    }

    /// Ask the user to confirm deleting every selected row.
    pub fn request_delete(&self, table: &RecordTable) -> SubmissionOutcome {
        let selection = table.selection();
        if let Err(err) = selection.at_least_one() {
            return self.reject_selection(&err);
        }
        let summaries = selection.summaries();
        self.surface.open_delete_confirmation(&summaries);
        SubmissionOutcome::AwaitingConfirmation { summaries }
    }

    /// Delete the currently selected rows.
    pub async fn confirm_delete(&self, table: &RecordTable) -> ServiceResult<SubmissionOutcome> {
        let flight = self.begin()?;

        let selection = table.selection();
        if let Err(err) = selection.at_least_one() {
            return Ok(self.reject_selection(&err));
        }
        let ids = selection.ids();

        flight.advance(SubmissionState::Submitting);
        tracing::info!(count = ids.len(), "Deleting records");
        let result = self.endpoint.delete(&ids).await;

        match result.and_then(Envelope::into_result) {
            Ok(()) => {
                flight.advance(SubmissionState::Succeeded);
                self.surface.close_dialog(Dialog::ConfirmDelete);
                self.surface.toast(ToastKind::Success, messages::DELETED);
                Ok(SubmissionOutcome::Succeeded {
                    reload_in: self.schedule_reload(),
                })
            }
            Err(err) => {
                flight.advance(SubmissionState::Failed);
                let message = failure_message(&err, messages::DELETE_FAILED);
                tracing::warn!(error = %err, "Delete failed");
                self.surface.toast(ToastKind::Error, &message);
                Ok(SubmissionOutcome::Failed { message })
            }
        }
    }

    /// Validate the form and send it to the insert or update endpoint.
    pub async fn save(
        &self,
        table: &RecordTable,
        form: &FormState,
        session: &EditSession,
    ) -> ServiceResult<SubmissionOutcome> {
        let flight = self.begin()?;
        self.surface.clear_form_error();

        match form.check_validity() {
            Ok(()) => {}
            Err(CoreError::Validation(issues)) => {
                tracing::debug!(issues = issues.len(), "Form is invalid");
                self.surface.form_error(messages::INVALID_FORM);
                self.surface.form_invalid(&issues);
                return Ok(SubmissionOutcome::Invalid(issues));
            }
            Err(other) => return Err(other.into()),
        }

        // The selection may have changed while the dialog was open.
        if session.mode() == SubmissionMode::Update {
            if let Err(err) = table.selection().exactly_one() {
                return Ok(self.reject_selection(&err));
            }
        }

        let payload = form.build_payload(session);

        flight.advance(SubmissionState::Submitting);
        tracing::info!(mode = %session.mode(), fields = payload.len(), "Saving record");
        let result = match session.mode() {
            SubmissionMode::Insert => self.endpoint.insert(&payload).await,
            SubmissionMode::Update => self.endpoint.update(&payload).await,
        };

        match result.and_then(Envelope::into_result) {
            Ok(()) => {
                flight.advance(SubmissionState::Succeeded);
                self.surface.close_dialog(Dialog::Edit);
                let message = match session.mode() {
                    SubmissionMode::Insert => messages::INSERTED,
                    SubmissionMode::Update => messages::UPDATED,
                };
                self.surface.toast(ToastKind::Success, message);
                Ok(SubmissionOutcome::Succeeded {
                    reload_in: self.schedule_reload(),
                })
            }
            Err(err) => {
                flight.advance(SubmissionState::Failed);
                let message = failure_message(&err, messages::SAVE_FAILED);
                tracing::warn!(mode = %session.mode(), error = %err, "Save failed");
                self.surface.form_error(&message);
                self.surface.toast(ToastKind::Error, &message);
                Ok(SubmissionOutcome::Failed { message })
            }
        }
    }

    fn reject_selection(&self, err: &CoreError) -> SubmissionOutcome {
        tracing::debug!(error = %err, "Action needs a different selection");
        self.surface.selection_hint();
        SubmissionOutcome::SelectionRequired
    }

    /// Reload after the configured delay so the success toast can be read.
    fn schedule_reload(&self) -> Duration {
        let reloader = Arc::clone(&self.reloader);
        let delay = self.reload_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!("Reloading records");
            reloader.reload();
        });
        delay
    }
}

/// Text shown to the user for a failed mutation.
fn failure_message(err: &ServiceError, fallback: &str) -> String {
    if err.is_transport() {
        return messages::COMMUNICATION_ERROR.to_string();
    }
    err.server_message().unwrap_or(fallback).to_string()
}
