//! Interfaces of the external collaborators the engine consumes.
//!
//! Rendering, routing, file upload, and modal prompting live outside the
//! core; the workflow services depend on these traits only. Tests inject
//! recording fakes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Opaque reference to a stored document. The engine keeps only the
/// reference and a display name; the bytes belong to the document
/// collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub id: String,
    pub display_name: String,
}

/// A file handed over by the (external) upload widget.
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub name: String,
}

/// Target handed to the navigation collaborator when the engine routes
/// the user to the purchase or production views. The engine does not
/// inspect the navigation result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavTarget {
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub mode: Option<String>,
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, target: NavTarget);
}

pub trait DocumentStore: Send + Sync {
    /// Maps an uploaded file to a stable attachment reference.
    fn attach(&self, file: FileUpload) -> Result<AttachmentRef, ServiceError>;
}

/// Yes/no confirmations and free-text prompts (revised estimates,
/// invoice numbers). `prompt` returning `None` is a cancellation and
/// aborts the surrounding mutation before anything is written.
pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
    fn prompt(&self, message: &str) -> Option<String>;
}
