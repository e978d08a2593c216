//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tabula_core::{
    FieldIssue, FieldKind, FieldSpec, FormState, Payload, RecordTable, SubmissionMode, TableSchema,
};
use tabula_services::{
    Dialog, Envelope, NotificationSurface, RecordEndpoint, Reloader, ServiceError, ServiceResult,
    ToastKind,
};

/// A request as seen by [`ScriptedEndpoint`]
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Insert(Payload),
    Update(Payload),
    Delete(Vec<String>),
}

/// A canned answer. `ServiceError` is not `Clone`, so failures are described
/// here and built on demand.
#[derive(Debug, Clone)]
pub enum Reply {
    Envelope(Envelope),
    Unreachable,
    Garbage,
}

/// Endpoint that answers from a script and records every request.
///
/// Once the script runs out every call answers `{ "ok": true }`.
pub struct ScriptedEndpoint {
    replies: Mutex<VecDeque<Reply>>,
    delay: Option<Duration>,
    log: Arc<Mutex<Vec<Request>>>,
}

impl ScriptedEndpoint {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            delay: None,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_reply(self, reply: Reply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    pub fn with_envelope(self, envelope: Envelope) -> Self {
        self.with_reply(Reply::Envelope(envelope))
    }

    /// Make every call take this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().clone()
    }

    async fn answer(&self, request: Request) -> ServiceResult<Envelope> {
        self.log.lock().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().pop_front();
        match reply.unwrap_or(Reply::Envelope(Envelope::success())) {
            Reply::Envelope(envelope) => Ok(envelope),
            Reply::Unreachable => Err(ServiceError::Transport("connection refused".into())),
            Reply::Garbage => Err(ServiceError::InvalidResponse("Status 500: expected value".into())),
        }
    }
}

#[async_trait]
impl RecordEndpoint for ScriptedEndpoint {
    async fn insert(&self, payload: &Payload) -> ServiceResult<Envelope> {
        self.answer(Request::Insert(payload.clone())).await
    }

    async fn update(&self, payload: &Payload) -> ServiceResult<Envelope> {
        self.answer(Request::Update(payload.clone())).await
    }

    async fn delete(&self, ids: &[String]) -> ServiceResult<Envelope> {
        self.answer(Request::Delete(ids.to_vec())).await
    }
}

/// Everything the controller asked the front end to show
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Toast(ToastKind, String),
    SelectionHint,
    OpenEdit(SubmissionMode),
    OpenDeleteConfirmation(Vec<String>),
    Close(Dialog),
    FormError(String),
    ClearFormError,
    FormInvalid(Vec<String>),
}

#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<Event>>,
}

impl RecordingSurface {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn toasts(&self) -> Vec<(ToastKind, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Toast(kind, msg) => Some((kind, msg)),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.events.lock().contains(event)
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl NotificationSurface for RecordingSurface {
    fn toast(&self, kind: ToastKind, message: &str) {
        self.push(Event::Toast(kind, message.to_string()));
    }

    fn selection_hint(&self) {
        self.push(Event::SelectionHint);
    }

    fn open_edit_dialog(&self, mode: SubmissionMode) {
        self.push(Event::OpenEdit(mode));
    }

    fn open_delete_confirmation(&self, summaries: &[String]) {
        self.push(Event::OpenDeleteConfirmation(summaries.to_vec()));
    }

    fn close_dialog(&self, dialog: Dialog) {
        self.push(Event::Close(dialog));
    }

    fn form_error(&self, message: &str) {
        self.push(Event::FormError(message.to_string()));
    }

    fn clear_form_error(&self) {
        self.push(Event::ClearFormError);
    }

    fn form_invalid(&self, issues: &[FieldIssue]) {
        self.push(Event::FormInvalid(
            issues.iter().map(|i| i.field.clone()).collect(),
        ));
    }
}

#[derive(Default)]
pub struct CountingReloader {
    count: AtomicUsize,
}

impl CountingReloader {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Reloader for CountingReloader {
    fn reload(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Three products: Mesa, Silla, Lámpara with ids 1, 2, 3.
pub fn product_table() -> RecordTable {
    let schema = TableSchema::new(&["id", "nombre", "precio"], &["id", "precio"]).unwrap();
    RecordTable::from_cells(
        schema,
        vec![
            vec!["1", "Mesa", "100"],
            vec!["2", "Silla", "50"],
            vec!["3", "Lámpara", "75,5"],
        ],
    )
}

pub fn product_form() -> FormState {
    FormState::new(vec![
        FieldSpec::new("nombre", FieldKind::Text).required(),
        FieldSpec::new("precio", FieldKind::Float).required(),
    ])
    .unwrap()
}
