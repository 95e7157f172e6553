use crate::models::{Task, TaskId};

/// Hands out task ids. Never repeats a value, including ids of deleted tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    /// `None` once the id space is used up.
    next: Option<TaskId>,
}

impl IdAllocator {
    /// Starts after the highest id in `tasks`, or at 1 when there are none.
    pub fn seeded_from(tasks: &[Task]) -> Self {
        let next = match tasks.iter().map(|task| task.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        Self { next }
    }

    /// `None` when every id has been handed out.
    pub fn next_id(&mut self) -> Option<TaskId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(id)
    }
}
