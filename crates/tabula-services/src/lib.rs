//! Tabula Services Layer
//!
//! Talks to the record server on behalf of a table screen. Everything that
//! can be decided locally lives in `tabula-core`; this crate adds the remote
//! endpoints and the controller that turns button presses into requests and
//! user feedback.
//!
//! # Architecture
//!
//! ```text
//! Front end (tabula-app)
//!     ↓
//! Service Layer (tabula-services) ← This crate
//!     ↓
//! Table state (tabula-core) + Settings (tabula-settings)
//! ```
//!
//! # Components
//!
//! - [`SubmissionController`] - add/modify/delete/save with a single-flight guard
//! - [`RecordEndpoint`] / [`HttpRecordEndpoint`] - the `insert`, `update` and `delete` calls
//! - [`NotificationSurface`] / [`Reloader`] - where feedback and reloads go
//!
//! # Design Principles
//!
//! 1. **No rendering** - feedback goes through [`NotificationSurface`]
//! 2. **One request at a time** - a second mutation while one is in flight gets [`ServiceError::Busy`]
//! 3. **Mode travels with the session** - insert vs update is carried by [`tabula_core::EditSession`]

mod controller;
mod endpoint;
mod error;
mod surface;

pub use controller::{SubmissionController, SubmissionOutcome, SubmissionState, messages};
pub use endpoint::{DeleteRequest, Envelope, HttpRecordEndpoint, RecordEndpoint};
pub use error::{ServiceError, ServiceResult};
pub use surface::{Dialog, NotificationSurface, Reloader, ToastKind};
