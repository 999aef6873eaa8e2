//! # Furrow Grid
//!
//! Inline-editable tables of farm entities: locations, beds, cultures,
//! plans and tasks.
//!
//! Each row moves between `view` and `edit`. Leaving edit mode commits the
//! row through a [`RowStore`]: new rows (negative synthetic ids) are
//! created, persisted rows are updated, and the server's canonical reply
//! replaces the row in place.
//!
//! ```rust,ignore
//! use furrow_grid::{GridConfig, GridController, MemoryStore, StopReason};
//!
//! let mut grid = GridController::new(store, validate_bed, confirm, GridConfig::default());
//! grid.load().await?;
//!
//! let id = grid.add_row();
//! grid.edit_cell(id, "name", json!("North bed"))?;
//! grid.stop_edit(id, StopReason::Enter).await?;
//! ```

mod columns;
mod config;
mod controller;
mod errors;
mod memory;
mod modes;
mod row;
mod store;

pub use columns::{first_editable, is_editable, label_for, ColumnDef};
pub use config::{GridConfig, InvalidCommitPolicy};
pub use controller::{CommitOutcome, DeleteOutcome, GridController, SelectionListener, StopReason};
pub use errors::{describe_remote_error, describe_validation_errors, GridError};
pub use memory::{MemoryStore, StoreCall};
pub use modes::{RowMode, RowModesModel};
pub use row::{synthetic_id, EditableRow, Identified, RowId};
pub use store::{Listing, RowStore};
