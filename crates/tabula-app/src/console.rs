//! Terminal front end: table rendering, feedback and reload notification

use comfy_table::{Table, presets::UTF8_FULL};
use parking_lot::Mutex;
use std::io::Write;
use std::time::Duration;
use tabula_core::{FieldIssue, RecordTable, SubmissionMode};
use tabula_services::{Dialog, NotificationSurface, Reloader, ToastKind};
use tabula_settings::ControllerSettings;
use tokio::sync::Notify;

pub const SELECTION_HINT: &str = "Select the record(s) to work on first.";

/// Render the visible rows with a checkbox column in front.
pub fn render_table(table: &RecordTable) -> String {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL);

    let mut header = vec![String::new()];
    header.extend(table.schema().columns().iter().map(|c| c.name.clone()));
    out.set_header(header);

    for row in table.rows().iter().filter(|r| r.is_visible()) {
        let mut cells = vec![if row.is_checked() { "[x]" } else { "[ ]" }.to_string()];
        cells.extend((0..table.schema().len()).map(|i| row.cell(i).to_string()));
        out.add_row(cells);
    }

    format!(
        "{}\n{} of {} rows shown, {} selected\n",
        out,
        table.visible_count(),
        table.rows().len(),
        table.selection().len()
    )
}

/// [`NotificationSurface`] that prints to a terminal.
pub struct ConsoleSurface {
    out: Mutex<Box<dyn Write + Send>>,
    toast_duration: Duration,
    hint_duration: Duration,
}

impl ConsoleSurface {
    pub fn stdout(settings: &ControllerSettings) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), settings)
    }

    pub fn with_writer(out: Box<dyn Write + Send>, settings: &ControllerSettings) -> Self {
        Self {
            out: Mutex::new(out),
            toast_duration: settings.toast_duration(),
            hint_duration: settings.selection_hint_duration(),
        }
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write to console");
        }
    }
}

impl NotificationSurface for ConsoleSurface {
    fn toast(&self, kind: ToastKind, message: &str) {
        let marker = match kind {
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
        };
        tracing::debug!(?kind, dismiss_after_ms = self.toast_duration.as_millis() as u64, "Toast");
        self.line(&format!("{} {}", marker, message));
    }

    fn selection_hint(&self) {
        tracing::debug!(
            highlight_ms = self.hint_duration.as_millis() as u64,
            "Selection hint"
        );
        self.line(&format!("! {}", SELECTION_HINT));
    }

    fn open_edit_dialog(&self, mode: SubmissionMode) {
        let title = match mode {
            SubmissionMode::Insert => "New record",
            SubmissionMode::Update => "Edit record",
        };
        self.line(&format!("== {} ==", title));
    }

    fn open_delete_confirmation(&self, summaries: &[String]) {
        self.line(&format!("About to delete {} record(s):", summaries.len()));
        for summary in summaries {
            self.line(&format!("  - {}", summary));
        }
    }

    fn close_dialog(&self, dialog: Dialog) {
        tracing::debug!(?dialog, "Dialog closed");
    }

    fn form_error(&self, message: &str) {
        self.line(&format!("  form: {}", message));
    }

    fn clear_form_error(&self) {}

    fn form_invalid(&self, issues: &[FieldIssue]) {
        for issue in issues {
            self.line(&format!("  - {}", issue));
        }
    }
}

/// Signals `main` that the controller asked for a reload.
#[derive(Default)]
pub struct ConsoleReloader {
    notify: Notify,
}

impl ConsoleReloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until [`Reloader::reload`] has been called.
    pub async fn requested(&self) {
        self.notify.notified().await;
    }
}

impl Reloader for ConsoleReloader {
    fn reload(&self) {
        tracing::debug!("Reload requested");
        self.notify.notify_one();
    }
}
