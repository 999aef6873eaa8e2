//! # Furrow Draft
//!
//! Autosave draft lifecycle for farm-planning edit screens.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI: field edits, blur, buttons, navigation  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ DraftMachine: draft + saved snapshot        │
//! │  - Field-level and bulk mutation            │
//! │  - Validation on demand, errors on attempt  │
//! │  - Gated save (validate → persist → commit) │
//! │  - Edit history (undo/redo)                 │
//! └─────────────────────────────────────────────┘
//!          ↓                         ↓
//! ┌──────────────────────┐ ┌────────────────────┐
//! │ SaveCoordinator      │ │ UnloadGuard        │
//! │  single-flight       │ │  armed while dirty │
//! │  tickets             │ │  and valid         │
//! └──────────────────────┘ └────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────────┐
//! │ Persister (caller-supplied, async)          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Dirty is structural**: `draft != saved`, never a flag set by hand
//! 2. **Newest attempt wins**: superseded saves never touch state
//! 3. **Nothing to save is success**: an unmodified draft saves as `true`
//! 4. **Errors show on attempt**: unless configured to show immediately
//!
//! ## Usage
//!
//! ```rust,ignore
//! use furrow_draft::{DraftMachine, DraftOptions, SaveReason};
//!
//! let machine = DraftMachine::new(bed, validate_bed, persister, DraftOptions::default());
//!
//! machine.set_field("name", json!("North bed"))?;
//! if machine.save_if_valid(SaveReason::Blur).await {
//!     // draft and saved snapshot now hold the server's canonical value
//! }
//! ```

mod apply;
mod config;
mod coordinator;
mod errors;
mod history;
mod machine;
mod navigation;
mod persist;
mod unload;
mod validation;

pub use apply::apply_field;
pub use config::{AutosaveConfig, UnloadPolicy};
pub use coordinator::{SaveCoordinator, SaveTicket};
pub use errors::DraftError;
pub use history::{EditBatch, EditHistory, FieldEdit};
pub use machine::{DraftMachine, DraftOptions, SaveErrorCallback, SaveSuccessCallback};
pub use navigation::{
    BlockReason, Confirm, GuardMessages, NavigationPrompt, NavigationState, RouteGuard,
};
pub use persist::{Persister, SaveReason};
pub use unload::{
    BeforeUnloadHub, LifecycleEvents, ListenerId, UnloadEvent, UnloadGuard, UnloadListener,
};
pub use validation::{FieldErrors, ValidationResult, Validator};

// Re-export common types for convenience
pub use furrow_common::{Entity, FieldRejection, RemoteError, RemoteResult};
