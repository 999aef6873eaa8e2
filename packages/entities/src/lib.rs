//! # Furrow Entities
//!
//! Typed farm-planning records edited through drafts and grids.
//!
//! ```text
//! Location ── Field ── Bed ── PlantingPlan ── Task
//!                                  │
//!                               Culture
//! ```
//!
//! Every entity implements [`GridEntity`]: its column layout, its row
//! validator, and the fields a server would derive on write.

mod bed;
mod culture;
mod field;
mod kind;
mod location;
mod plan;
mod task;

pub use bed::Bed;
pub use culture::Culture;
pub use field::Field;
pub use kind::{EntityKind, GridEntity};
pub use location::Location;
pub use plan::PlantingPlan;
pub use task::{Task, TaskStatus};
