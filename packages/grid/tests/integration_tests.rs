//! Integration tests for the row commit protocol

use async_trait::async_trait;
use furrow_common::{FieldRejection, RemoteError, RemoteResult};
use furrow_draft::{BlockReason, DraftError, NavigationState, ValidationResult};
use furrow_grid::{
    ColumnDef, CommitOutcome, DeleteOutcome, GridConfig, GridController, GridError, Identified,
    InvalidCommitPolicy, Listing, MemoryStore, RowId, RowMode, RowStore, StopReason, StoreCall,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RowId>,
    name: String,
    length_m: f64,
    #[serde(default)]
    area_m2: f64,
}

impl Bed {
    fn persisted(id: RowId, name: &str, length_m: f64) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            length_m,
            area_m2: 0.0,
        }
    }
}

impl Identified for Bed {
    fn id(&self) -> Option<RowId> {
        self.id
    }

    fn assign_id(&mut self, id: RowId) {
        self.id = Some(id);
    }
}

fn validate(bed: &Bed) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if bed.name.trim().is_empty() {
        result = result.with_error("name", "Name is required");
    }
    if bed.length_m < 0.0 {
        result = result.with_error("lengthM", "Length must not be negative");
    }
    result
}

fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("id", "ID").read_only(),
        ColumnDef::new("name", "Name"),
        ColumnDef::new("lengthM", "Length (m)"),
    ]
}

fn grid_with(
    store: Arc<MemoryStore<Bed>>,
    config: GridConfig,
    confirm_answer: bool,
) -> (GridController<Bed>, Arc<AtomicUsize>) {
    let asked = Arc::new(AtomicUsize::new(0));
    let counter = asked.clone();
    let confirm = move |_: &str| {
        counter.fetch_add(1, Ordering::SeqCst);
        confirm_answer
    };
    (GridController::new(store, validate, confirm, config), asked)
}

fn grid(store: Arc<MemoryStore<Bed>>) -> GridController<Bed> {
    grid_with(store, GridConfig::with_columns(columns()), true).0
}

fn seeded() -> Arc<MemoryStore<Bed>> {
    Arc::new(MemoryStore::with_rows(vec![
        Bed::persisted(1, "North", 20.0),
        Bed::persisted(2, "South", 15.0),
    ]))
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_load_runs_once() {
    let store = seeded();
    let mut grid = grid(store.clone());

    assert!(grid.load().await.unwrap());
    assert!(!grid.load().await.unwrap());

    assert!(grid.is_loaded());
    assert_eq!(grid.rows().len(), 2);
    assert_eq!(store.calls(), vec![StoreCall::List]);
}

#[tokio::test]
async fn test_load_failure_fills_error_slot() {
    let store = seeded();
    store.fail_next(RemoteError::Transport("connection refused".into()));
    let mut grid = grid(store);

    assert!(matches!(grid.load().await, Err(GridError::Remote(_))));
    assert_eq!(
        grid.error(),
        Some("Something went wrong while saving. Please try again.")
    );
    assert!(grid.rows().is_empty());
}

// ============================================================================
// New rows
// ============================================================================

#[tokio::test]
async fn test_new_row_lifecycle() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    let temp_id = grid.add_row();
    assert!(temp_id < 0);
    assert_eq!(grid.rows()[0].id, temp_id);
    assert!(grid.rows()[0].is_new);
    assert_eq!(
        grid.mode(temp_id),
        RowMode::Edit {
            field_to_focus: Some("name".to_string())
        }
    );

    grid.edit_cell(temp_id, "name", json!("East")).unwrap();
    grid.edit_cell(temp_id, "lengthM", json!(12.5)).unwrap();

    let outcome = grid.stop_edit(temp_id, StopReason::Enter).await.unwrap();
    assert_eq!(outcome, CommitOutcome::Saved { id: 3 });

    let row = &grid.rows()[0];
    assert_eq!(row.id, 3);
    assert!(!row.is_new);
    assert_eq!(row.values.name, "East");
    assert_eq!(grid.mode(3), RowMode::View);
    assert!(grid.row(temp_id).is_none());
    assert_eq!(store.calls(), vec![StoreCall::List, StoreCall::Create]);
}

#[tokio::test]
async fn test_deleting_unsaved_row_never_reaches_store() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    let temp_id = grid.add_row();
    let outcome = grid.delete_row(temp_id).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(grid.row(temp_id).is_none());
    assert!(!grid.modes().any_editing());
    assert_eq!(store.calls(), vec![StoreCall::List]);
}

// ============================================================================
// Commit and cancel
// ============================================================================

#[tokio::test]
async fn test_escape_discards_and_blur_commits() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    assert!(grid.cell_click(1, "name"));
    grid.edit_cell(1, "name", json!("Renamed")).unwrap();
    let outcome = grid.stop_edit(1, StopReason::Escape).await.unwrap();

    assert_eq!(outcome, CommitOutcome::Cancelled);
    assert_eq!(grid.row(1).unwrap().values.name, "North");
    assert_eq!(grid.mode(1), RowMode::View);
    assert_eq!(store.calls(), vec![StoreCall::List]);

    assert!(grid.cell_click(1, "name"));
    grid.edit_cell(1, "name", json!("Renamed")).unwrap();
    let outcome = grid.stop_edit(1, StopReason::Blur).await.unwrap();

    assert_eq!(outcome, CommitOutcome::Saved { id: 1 });
    assert_eq!(grid.row(1).unwrap().values.name, "Renamed");
    assert_eq!(store.calls(), vec![StoreCall::List, StoreCall::Update(1)]);
    assert_eq!(store.rows()[0].name, "Renamed");
}

#[tokio::test]
async fn test_tab_commits_edit() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    grid.cell_click(2, "lengthM");
    grid.edit_cell(2, "lengthM", json!(30.0)).unwrap();
    let outcome = grid.stop_edit(2, StopReason::Tab).await.unwrap();

    assert_eq!(outcome, CommitOutcome::Saved { id: 2 });
    assert_eq!(store.calls().last(), Some(&StoreCall::Update(2)));
}

#[tokio::test]
async fn test_unchanged_commit_skips_store() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    grid.cell_click(1, "name");
    let outcome = grid.stop_edit(1, StopReason::Enter).await.unwrap();

    assert_eq!(outcome, CommitOutcome::Unchanged);
    assert_eq!(grid.mode(1), RowMode::View);
    assert_eq!(store.calls(), vec![StoreCall::List]);
}

#[tokio::test]
async fn test_update_takes_canonical_row() {
    let store = Arc::new(
        MemoryStore::with_rows(vec![Bed::persisted(1, "North", 20.0)])
            .with_canonicalizer(|bed: &mut Bed| {
                bed.name = bed.name.trim().to_string();
                bed.area_m2 = bed.length_m * 0.75;
            }),
    );
    let mut grid = grid(store);
    grid.load().await.unwrap();

    grid.cell_click(1, "name");
    grid.edit_cell(1, "name", json!("  North  ")).unwrap();
    grid.edit_cell(1, "lengthM", json!(40.0)).unwrap();
    grid.stop_edit(1, StopReason::Enter).await.unwrap();

    let row = grid.row(1).unwrap();
    assert_eq!(row.values.name, "North");
    assert_eq!(row.values.area_m2, 30.0);
}

// ============================================================================
// Validation and remote failures
// ============================================================================

#[tokio::test]
async fn test_invalid_commit_keeps_editing() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    let temp_id = grid.add_row();
    let outcome = grid.stop_edit(temp_id, StopReason::Enter).await.unwrap();

    assert_eq!(outcome, CommitOutcome::Invalid { editing: true });
    assert!(grid.mode(temp_id).is_edit());
    assert_eq!(grid.error(), Some("Name: Name is required"));
    assert_eq!(store.calls(), vec![StoreCall::List]);

    grid.edit_cell(temp_id, "name", json!("West")).unwrap();
    let outcome = grid.stop_edit(temp_id, StopReason::Enter).await.unwrap();

    assert!(matches!(outcome, CommitOutcome::Saved { .. }));
    assert_eq!(grid.error(), None);
}

#[tokio::test]
async fn test_invalid_commit_can_exit_to_view() {
    let store = seeded();
    let config =
        GridConfig::with_columns(columns()).invalid_commit(InvalidCommitPolicy::ExitToView);
    let (mut grid, _) = grid_with(store.clone(), config, true);
    grid.load().await.unwrap();

    grid.cell_click(1, "lengthM");
    grid.edit_cell(1, "lengthM", json!(-3.0)).unwrap();
    let outcome = grid.stop_edit(1, StopReason::Blur).await.unwrap();

    assert_eq!(outcome, CommitOutcome::Invalid { editing: false });
    assert_eq!(grid.mode(1), RowMode::View);
    assert_eq!(grid.error(), Some("Length (m): Length must not be negative"));
    assert_eq!(store.calls(), vec![StoreCall::List]);
}

#[tokio::test]
async fn test_rejection_is_flattened_into_error_slot() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    grid.cell_click(1, "name");
    grid.edit_cell(1, "name", json!("South")).unwrap();
    store.fail_next(RemoteError::Rejected(vec![
        FieldRejection::new("name", "Name must be unique"),
        FieldRejection {
            field: "lengthM".to_string(),
            messages: vec!["Too long".to_string(), "Exceeds field".to_string()],
        },
    ]));

    let outcome = grid.stop_edit(1, StopReason::Enter).await.unwrap();

    assert_eq!(outcome, CommitOutcome::Failed);
    assert!(grid.mode(1).is_edit());
    assert_eq!(grid.row(1).unwrap().values.name, "South");
    assert_eq!(
        grid.error(),
        Some("Name: Name must be unique\nLength (m): Too long, Exceeds field")
    );
}

/// Answers creates without an identifier
struct AnonymousStore;

#[async_trait]
impl RowStore<Bed> for AnonymousStore {
    async fn list(&self) -> RemoteResult<Listing<Bed>> {
        Ok(Listing { results: Vec::new() })
    }

    async fn create(&self, row: &Bed) -> RemoteResult<Bed> {
        Ok(Bed { id: None, ..row.clone() })
    }

    async fn update(&self, _id: RowId, row: &Bed) -> RemoteResult<Bed> {
        Ok(row.clone())
    }

    async fn delete(&self, _id: RowId) -> RemoteResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_create_without_identifier_is_an_error() {
    let mut grid = GridController::new(
        Arc::new(AnonymousStore),
        validate,
        |_: &str| true,
        GridConfig::with_columns(columns()),
    );
    grid.load().await.unwrap();

    let temp_id = grid.add_row();
    grid.edit_cell(temp_id, "name", json!("Orphan")).unwrap();
    let result = grid.stop_edit(temp_id, StopReason::Enter).await;

    assert!(matches!(
        result,
        Err(GridError::Remote(RemoteError::MissingIdentifier { operation: "create" }))
    ));
    assert!(grid.error().is_some());
    assert!(grid.row(temp_id).is_some());
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
async fn test_delete_failure_keeps_row() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    store.fail_next(RemoteError::Transport("timeout".into()));
    let outcome = grid.delete_row(1).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Failed);
    assert!(grid.row(1).is_some());
    assert!(grid.error().is_some());
    assert_eq!(store.calls(), vec![StoreCall::List, StoreCall::Delete(1)]);
}

#[tokio::test]
async fn test_declined_delete_does_nothing() {
    let store = seeded();
    let (mut grid, asked) = grid_with(store.clone(), GridConfig::with_columns(columns()), false);
    grid.load().await.unwrap();

    let outcome = grid.delete_row(2).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(asked.load(Ordering::SeqCst), 1);
    assert_eq!(grid.rows().len(), 2);
    assert_eq!(store.calls(), vec![StoreCall::List]);
}

#[tokio::test]
async fn test_delete_persisted_row() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    assert_eq!(grid.delete_row(2).await.unwrap(), DeleteOutcome::Deleted);
    assert!(grid.row(2).is_none());
    assert_eq!(store.rows().len(), 1);
}

// ============================================================================
// Interaction details
// ============================================================================

#[tokio::test]
async fn test_click_no_ops() {
    let store = seeded();
    let mut grid = grid(store);
    grid.load().await.unwrap();

    assert!(!grid.cell_click(1, "id"));
    assert!(!grid.cell_click(99, "name"));
    assert!(grid.cell_click(1, "name"));
    assert!(!grid.cell_click(1, "lengthM"));

    assert_eq!(
        grid.mode(1),
        RowMode::Edit {
            field_to_focus: Some("name".to_string())
        }
    );
    assert!(matches!(
        grid.edit_cell(2, "name", json!("x")),
        Err(GridError::NotEditing(2))
    ));
}

#[tokio::test]
async fn test_misspelled_cell_is_rejected() {
    let store = seeded();
    let mut grid = grid(store.clone());
    grid.load().await.unwrap();

    grid.cell_click(1, "name");
    let result = grid.edit_cell(1, "nmae", json!("Renamed"));

    assert!(matches!(
        result,
        Err(GridError::Draft(DraftError::UnknownField(ref path))) if path == "nmae"
    ));
    assert_eq!(grid.row(1).unwrap().values, Bed::persisted(1, "North", 20.0));

    // Nothing changed, so leaving the row never reaches the store
    let outcome = grid.stop_edit(1, StopReason::Enter).await.unwrap();
    assert_eq!(outcome, CommitOutcome::Unchanged);
    assert_eq!(store.calls(), vec![StoreCall::List]);
}

#[tokio::test]
async fn test_selection_listener_tracks_rows() {
    let store = seeded();
    let seen: Arc<Mutex<Vec<Vec<RowId>>>> = Arc::default();
    let sink = seen.clone();

    let mut grid = grid(store).on_selection_change(move |rows| {
        sink.lock().unwrap().push(rows.iter().map(|row| row.id).collect());
    });
    grid.load().await.unwrap();

    grid.select(&[1, 2, 42]);
    grid.delete_row(1).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![vec![1, 2], vec![2]]);
    assert_eq!(grid.selection(), &[2]);
}

#[tokio::test]
async fn test_route_guard_reasons() {
    let store = seeded();
    let (mut grid, asked) = grid_with(store, GridConfig::with_columns(columns()), false);
    grid.load().await.unwrap();

    assert_eq!(grid.pending_block(), None);
    assert!(grid.allow_navigation());
    assert_eq!(asked.load(Ordering::SeqCst), 0);

    grid.cell_click(1, "name");
    assert_eq!(grid.pending_block(), Some(BlockReason::UnsavedChanges));

    grid.edit_cell(1, "name", json!("")).unwrap();
    assert_eq!(grid.pending_block(), Some(BlockReason::ValidationErrors));

    assert!(!grid.allow_navigation());
    assert_eq!(asked.load(Ordering::SeqCst), 1);
}
