//! # Edit History
//!
//! Undo/redo for field-level draft edits.
//!
//! ## Design
//!
//! - Each edit records the value it replaced before being applied
//! - Undo writes the recorded `before` values back and moves the batch to redo
//! - Redo writes the `after` values again
//! - New edits clear the redo stack
//! - Edits can be grouped into one undo step with `begin_batch`/`end_batch`
//!
//! Wholesale replacements of the draft (initialise, reset, commit) are not
//! recorded; the owner clears the history instead.

use furrow_common::{remove_path, set_path, PathError};
use serde_json::Value;

/// One field write
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdit {
    pub path: String,

    /// Value before the write (`None` when the path did not exist)
    pub before: Option<Value>,

    pub after: Value,
}

impl FieldEdit {
    fn revert(&self, doc: &mut Value) -> Result<(), PathError> {
        match &self.before {
            Some(value) => {
                set_path(doc, &self.path, value.clone())?;
            }
            None => {
                remove_path(doc, &self.path);
            }
        }
        Ok(())
    }

    fn reapply(&self, doc: &mut Value) -> Result<(), PathError> {
        set_path(doc, &self.path, self.after.clone())?;
        Ok(())
    }
}

/// Edits undone/redone together
#[derive(Debug, Clone, Default)]
pub struct EditBatch {
    /// Edits in application order
    pub edits: Vec<FieldEdit>,
}

impl EditBatch {
    pub fn single(edit: FieldEdit) -> Self {
        Self { edits: vec![edit] }
    }

    pub fn from_edits(edits: Vec<FieldEdit>) -> Self {
        Self { edits }
    }
}

#[derive(Debug, Clone)]
pub struct EditHistory {
    /// Applied batches (most recent last)
    undo_stack: Vec<EditBatch>,

    /// Undone batches (most recent last)
    redo_stack: Vec<EditBatch>,

    /// Maximum undo levels (0 = unlimited)
    max_levels: usize,

    current_batch: Option<EditBatch>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record an edit that has already been applied
    pub fn record(&mut self, edit: FieldEdit) {
        if let Some(batch) = &mut self.current_batch {
            batch.edits.push(edit);
        } else {
            self.push_batch(EditBatch::single(edit));
        }
    }

    /// Record several edits as one undo step
    pub fn record_all(&mut self, edits: Vec<FieldEdit>) {
        if edits.is_empty() {
            return;
        }
        if let Some(batch) = &mut self.current_batch {
            batch.edits.extend(edits);
        } else {
            self.push_batch(EditBatch::from_edits(edits));
        }
    }

    pub fn begin_batch(&mut self) {
        self.current_batch = Some(EditBatch::default());
    }

    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.edits.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    fn push_batch(&mut self, batch: EditBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Revert the most recent batch on `doc`
    pub fn undo(&mut self, doc: &mut Value) -> Result<bool, PathError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        for edit in batch.edits.iter().rev() {
            edit.revert(doc)?;
        }
        self.redo_stack.push(batch);

        Ok(true)
    }

    /// Reapply the most recently undone batch on `doc`
    pub fn redo(&mut self, doc: &mut Value) -> Result<bool, PathError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        for edit in &batch.edits {
            edit.reapply(doc)?;
        }
        self.undo_stack.push(batch);

        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}
