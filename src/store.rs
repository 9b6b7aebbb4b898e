// In-memory task store with derived views

use crate::filter::TaskFilter;
use crate::models::{Counts, Priority, Task, TaskId};
use tracing::debug;

/// Owns the task collection and the filter selection
///
/// Every operation is infallible: empty text and unknown ids degrade to
/// no-ops that leave the store untouched. Derived views (`filtered_tasks`,
/// `counts`) are recomputed on each call.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    filter: TaskFilter,
    selected_priority: Priority,
    compose: String,
    next_id: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Create an empty store showing all tasks, with `medium` as the default priority
    pub fn new() -> Self {
        Self::with_defaults(Priority::default(), TaskFilter::default())
    }

    /// Create an empty store with a given default priority and initial filter
    pub fn with_defaults(priority: Priority, filter: TaskFilter) -> Self {
        Self {
            tasks: Vec::new(),
            filter,
            selected_priority: priority,
            compose: String::new(),
            next_id: 1,
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a task, returning its id
    ///
    /// Text is trimmed first; if nothing is left this is a no-op and returns
    /// `None`. A successful add clears the compose field.
    pub fn add(&mut self, raw_text: &str, priority: Priority) -> Option<TaskId> {
        let description = raw_text.trim();
        if description.is_empty() {
            debug!("add: ignoring empty description");
            return None;
        }

        let id = TaskId(self.next_id);
        self.next_id += 1;

        self.tasks.push(Task::new(id, description.to_string(), priority));
        self.compose.clear();

        debug!(%id, %priority, total = self.tasks.len(), "add: task created");
        Some(id)
    }

    /// Add the compose field's text at the selected priority
    pub fn submit(&mut self) -> Option<TaskId> {
        let text = self.compose.clone();
        self.add(&text, self.selected_priority)
    }

    /// Flip a task's completed flag. Returns false if no task has this id.
    pub fn toggle_completed(&mut self, id: TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                debug!(%id, completed = task.completed, "toggle_completed: flipped");
                true
            }
            None => {
                debug!(%id, "toggle_completed: no such task");
                false
            }
        }
    }

    /// Remove the task with this id. Returns false if no task matched.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;

        debug!(%id, removed, total = self.tasks.len(), "delete: called");
        removed
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        debug!(%filter, "set_filter: called");
        self.filter = filter;
    }

    /// Stage text for the next `submit`
    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.compose = text.into();
        debug!(len = self.compose.len(), "set_compose: called");
    }

    /// Choose the priority `submit` uses
    pub fn select_priority(&mut self, priority: Priority) {
        debug!(%priority, "select_priority: called");
        self.selected_priority = priority;
    }

    // ========================================================================
    // Read views
    // ========================================================================

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn compose(&self) -> &str {
        &self.compose
    }

    pub fn selected_priority(&self) -> Priority {
        self.selected_priority
    }

    /// Every task, in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks matching the current filter, in insertion order
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t)).collect()
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn pending_count(&self) -> usize {
        self.total() - self.completed_count()
    }

    pub fn counts(&self) -> Counts {
        let total = self.total();
        let completed = self.completed_count();
        Counts {
            total,
            completed,
            pending: total - completed,
        }
    }
}
