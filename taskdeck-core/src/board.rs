//! The in-memory board state store.
//!
//! One instance holds one project's board for one editing session. All
//! mutations are synchronous and atomic; there is no internal concurrency
//! and no error channel — an operation that fails its preconditions leaves
//! the state untouched (the UI validates before calling, and its task ids
//! always come from the current render of this state).
//!
//! Every effective mutation bumps `revision` and clears `is_saved`. The
//! save flow records the revision of the snapshot it sends and compares it
//! on completion, so edits made while a save was in flight are never
//! silently considered persisted.

use crate::types::{ColumnKind, ProjectModel, SelectedTask, TaskItem};
use crate::validate;

/// A drop resolved by the gesture layer, already translated to columns and
/// indices. The board core accepts only this shape, never a gesture
/// library's own event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEvent {
    pub task_id: String,
    pub from: ColumnKind,
    pub from_index: usize,
    pub to: ColumnKind,
    pub to_index: usize,
}

#[derive(Debug, Clone)]
pub struct BoardState {
    project: ProjectModel,
    is_saved: bool,
    selected: Option<SelectedTask>,
    revision: u64,
}

impl BoardState {
    /// Wrap a loaded (or freshly created) project. The initial state counts
    /// as saved; the first mutation makes it dirty.
    pub fn new(project: ProjectModel) -> Self {
        Self {
            project,
            is_saved: true,
            selected: None,
            revision: 0,
        }
    }

    pub fn project(&self) -> &ProjectModel {
        &self.project
    }

    pub fn is_saved(&self) -> bool {
        self.is_saved
    }

    pub fn selected_task(&self) -> Option<&SelectedTask> {
        self.selected.as_ref()
    }

    /// Monotonic edit counter; bumped by every effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.is_saved = false;
    }

    /// Replace the whole board. `mark_dirty` is true when the replacement
    /// is itself an unsaved local edit, false when adopting a
    /// gateway-confirmed document. Documents violating the id-uniqueness
    /// invariant are refused.
    pub fn replace_project(&mut self, project: ProjectModel, mark_dirty: bool) {
        if let Err(err) = validate::validate_data(&project.data) {
            log::warn!("[taskdeck.board] refusing project replacement: {err}");
            return;
        }
        self.project = project;
        self.revision += 1;
        self.is_saved = !mark_dirty;
    }

    /// Rename the project. No-op when the trimmed title is invalid or
    /// unchanged.
    pub fn rename_project(&mut self, new_title: &str) {
        let Ok(title) = validate::normalized_title(new_title) else {
            return;
        };
        if title == self.project.title {
            return;
        }
        self.project.title = title;
        self.touch();
    }

    /// Append a new task at the end of `column`.
    pub fn add_task(&mut self, column: ColumnKind, text: &str) {
        let Ok(text) = validate::normalized_task_text(text) else {
            return;
        };
        self.project.data.columns.get_mut(column).push(TaskItem::new(text));
        self.touch();
    }

    /// Replace a task's text, keeping its id, creation timestamp and
    /// position. Clears the selection if it referenced this task.
    pub fn edit_task(&mut self, task_id: &str, new_text: &str) {
        let Ok(text) = validate::normalized_task_text(new_text) else {
            return;
        };
        let Some((column, index)) = self.project.data.find_task(task_id) else {
            return;
        };
        self.project.data.columns.get_mut(column)[index].text = text;
        if self.selected.as_ref().is_some_and(|sel| sel.id == task_id) {
            self.selected = None;
        }
        self.touch();
    }

    /// Remove a task from whichever column contains it. Absent ids are a
    /// no-op, not an error: they only mean the UI held a stale reference.
    pub fn delete_task(&mut self, task_id: &str) {
        let Some((column, index)) = self.project.data.find_task(task_id) else {
            return;
        };
        self.project.data.columns.get_mut(column).remove(index);
        if self.selected.as_ref().is_some_and(|sel| sel.id == task_id) {
            self.selected = None;
        }
        self.touch();
    }

    /// Move a task to the end of another column. Same-column moves and
    /// absent ids are no-ops.
    pub fn move_task(&mut self, task_id: &str, from: ColumnKind, to: ColumnKind) {
        if from == to {
            return;
        }
        let source = self.project.data.columns.get_mut(from);
        let Some(index) = source.iter().position(|task| task.id == task_id) else {
            return;
        };
        let task = source.remove(index);
        self.project.data.columns.get_mut(to).push(task);
        self.touch();
    }

    /// Reinsert a task at `target_index` within its column (clamped to the
    /// valid range). Reordering to the current position changes nothing,
    /// including the dirty flag.
    pub fn reorder_within_column(&mut self, column: ColumnKind, task_id: &str, target_index: usize) {
        let tasks = self.project.data.columns.get_mut(column);
        let Some(current) = tasks.iter().position(|task| task.id == task_id) else {
            return;
        };
        // Resting index after remove + insert: past-the-end targets land last.
        let target = target_index.min(tasks.len() - 1);
        if target == current {
            return;
        }
        let task = tasks.remove(current);
        tasks.insert(target, task);
        self.touch();
    }

    /// Cross-column drag: remove from `from`, insert at `target_index` in
    /// `to` (clamped). A same-column call degenerates to a reorder.
    pub fn move_and_position(
        &mut self,
        task_id: &str,
        from: ColumnKind,
        to: ColumnKind,
        target_index: usize,
    ) {
        if from == to {
            self.reorder_within_column(from, task_id, target_index);
            return;
        }
        let source = self.project.data.columns.get_mut(from);
        let Some(index) = source.iter().position(|task| task.id == task_id) else {
            return;
        };
        let task = source.remove(index);
        let destination = self.project.data.columns.get_mut(to);
        let target = target_index.min(destination.len());
        destination.insert(target, task);
        self.touch();
    }

    /// Route a resolved drop to the matching board operation.
    pub fn apply_drag(&mut self, event: &DragEvent) {
        if event.from == event.to {
            self.reorder_within_column(event.to, &event.task_id, event.to_index);
        } else {
            self.move_and_position(&event.task_id, event.from, event.to, event.to_index);
        }
    }

    /// Open a task for inline editing. The task must currently live in the
    /// named column; a new selection silently replaces the previous one.
    /// Selection is UI-transient and never affects the dirty flag.
    pub fn select_task(&mut self, task_id: &str, column: ColumnKind) {
        let exists = self
            .project
            .data
            .columns
            .get(column)
            .iter()
            .any(|task| task.id == task_id);
        if !exists {
            return;
        }
        self.selected = Some(SelectedTask {
            id: task_id.to_string(),
            column,
        });
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Called by the save flow once a persist has been confirmed.
    pub fn mark_saved(&mut self) {
        self.is_saved = true;
    }
}
