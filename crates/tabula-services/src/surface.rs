//! Feedback collaborators
//!
//! The controller never draws anything itself. Toasts, dialogs, the
//! selection hint and the reload after a successful mutation all go through
//! these traits, so any front end (or a test double) can plug in.

use tabula_core::{FieldIssue, SubmissionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    /// Insert/update form
    Edit,
    /// List of rows about to be deleted
    ConfirmDelete,
}

/// Transient notifications and modal dialogs
pub trait NotificationSurface: Send + Sync {
    fn toast(&self, kind: ToastKind, message: &str);

    /// Non-blocking hint that the action needs a different selection
    fn selection_hint(&self);

    fn open_edit_dialog(&self, mode: SubmissionMode);

    fn open_delete_confirmation(&self, summaries: &[String]);

    fn close_dialog(&self, dialog: Dialog);

    /// Show an error inside the edit form
    fn form_error(&self, message: &str);

    fn clear_form_error(&self);

    /// Mark the offending fields and play the attention animation
    fn form_invalid(&self, issues: &[FieldIssue]);
}

/// Re-synchronizes the view with the server after a mutation
pub trait Reloader: Send + Sync {
    fn reload(&self);
}
