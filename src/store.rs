use std::collections::VecDeque;

use crate::clock::{Clock, LocalClock};
use crate::ids::IdAllocator;
use crate::models::{parse_due_date, Settings, Task, TaskId};
use crate::storage::{Storage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("invalid date format {0:?}, expected YYYY-MM-DD")]
    InvalidDateFormat(String),
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("no task ids left to allocate")]
    IdsExhausted,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, PartialEq)]
pub enum TaskList<'a> {
    Empty,
    Tasks(&'a [Task]),
}

#[derive(Debug, PartialEq)]
pub enum SearchResults<'a> {
    NoResults,
    Matches(Vec<&'a Task>),
}

#[derive(Debug, PartialEq)]
pub enum Reminder {
    NoReminders,
    Due(Task),
}

/// In-memory task list backed by a JSON file.
///
/// Every mutation writes the complete list before it is committed in memory, so a
/// failed write leaves the store exactly as it was. The undo stack and the reminder
/// queue live only in memory.
pub struct TaskStore<C: Clock = LocalClock> {
    storage: Storage,
    settings: Settings,
    clock: C,
    ids: IdAllocator,
    tasks: Vec<Task>,
    undo_stack: Vec<Task>,
    reminder_queue: VecDeque<TaskId>,
}

impl TaskStore<LocalClock> {
    pub fn open(storage: Storage, settings: Settings) -> Self {
        Self::with_clock(storage, settings, LocalClock)
    }
}

impl<C: Clock> TaskStore<C> {
    /// Loads persisted tasks. A missing or corrupt file starts an empty store.
    pub fn with_clock(storage: Storage, settings: Settings, clock: C) -> Self {
        let tasks = match storage.load_tasks() {
            Ok(tasks) => tasks,
            Err(err) => {
                log::warn!("store: starting empty, failed to load tasks: {err}");
                Vec::new()
            }
        };
        log::info!(
            "store: loaded {} tasks from {}",
            tasks.len(),
            storage.data_path().display()
        );
        let mut store = Self {
            storage,
            settings,
            clock,
            ids: IdAllocator::seeded_from(&tasks),
            tasks,
            undo_stack: Vec::new(),
            reminder_queue: VecDeque::new(),
        };
        store.rebuild_reminder_queue();
        store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn pending_reminders(&self) -> usize {
        self.reminder_queue.len()
    }

    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        priority: &str,
        due_date: &str,
    ) -> Result<Task, TaskError> {
        let due_date = parse_due_date(due_date)
            .ok_or_else(|| TaskError::InvalidDateFormat(due_date.to_string()))?;

        let mut ids = self.ids.clone();
        let id = ids.next_id().ok_or(TaskError::IdsExhausted)?;
        let task = Task::new(
            id,
            title.to_string(),
            description.to_string(),
            priority.to_string(),
            due_date,
        );
        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        self.ids = ids;

        if self.is_due_soon(&task) {
            self.reminder_queue.push_back(task.id);
        }
        log::info!("store: added task {} due {}", task.id, task.due_date);
        Ok(task)
    }

    pub fn view_tasks(&self) -> TaskList<'_> {
        if self.tasks.is_empty() {
            TaskList::Empty
        } else {
            TaskList::Tasks(&self.tasks)
        }
    }

    /// Completing an already completed task succeeds without writing.
    pub fn mark_complete(&mut self, task_id: TaskId) -> Result<(), TaskError> {
        let index = self.position(task_id)?;
        if !self.tasks[index].is_pending() {
            return Ok(());
        }
        let mut next = self.tasks.clone();
        next[index].mark_complete();
        self.commit(next)?;
        log::info!("store: completed task {task_id}");
        Ok(())
    }

    pub fn delete(&mut self, task_id: TaskId) -> Result<Task, TaskError> {
        let index = self.position(task_id)?;
        let mut next = self.tasks.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        self.undo_stack.push(removed.clone());
        self.reminder_queue.retain(|id| *id != task_id);
        log::info!("store: deleted task {task_id}");
        Ok(removed)
    }

    /// Restores the most recently deleted task at the end of the list. Its
    /// original position and reminder queue membership are not restored.
    pub fn undo_delete(&mut self) -> Result<Task, TaskError> {
        let task = self.undo_stack.last().cloned().ok_or(TaskError::NothingToUndo)?;
        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        self.undo_stack.pop();
        log::info!("store: restored task {}", task.id);
        Ok(task)
    }

    pub fn sort_by_due_date(&mut self) {
        self.tasks.sort_by_key(|task| task.due_date);
    }

    pub fn sort_by_priority(&mut self) {
        self.tasks.sort_by_key(Task::priority_rank);
    }

    pub fn search(&self, keyword: &str) -> SearchResults<'_> {
        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.matches_keyword(keyword))
            .collect();
        if matches.is_empty() {
            SearchResults::NoResults
        } else {
            SearchResults::Matches(matches)
        }
    }

    pub fn rebuild_reminder_queue(&mut self) {
        let mut by_due: Vec<&Task> = self.tasks.iter().collect();
        by_due.sort_by_key(|task| task.due_date);
        let queue: VecDeque<TaskId> = by_due
            .into_iter()
            .filter(|task| task.is_pending() && self.is_due_soon(task))
            .map(|task| task.id)
            .collect();
        log::debug!("store: reminder queue rebuilt with {} tasks", queue.len());
        self.reminder_queue = queue;
    }

    /// Pops the oldest queued reminder. The task itself is left untouched, and a
    /// task completed after it was queued is still reported.
    pub fn next_reminder(&mut self) -> Reminder {
        // Queued ids always name a task in the list: `delete` prunes the queue.
        match self.reminder_queue.pop_front().and_then(|id| self.get(id)) {
            Some(task) => Reminder::Due(task.clone()),
            None => Reminder::NoReminders,
        }
    }

    /// Writes the current order, e.g. after a sort.
    pub fn flush(&self) -> Result<(), TaskError> {
        self.storage.save_tasks(&self.tasks)?;
        Ok(())
    }

    fn is_due_soon(&self, task: &Task) -> bool {
        task.days_until_due(self.clock.today()) <= self.settings.reminder_window_days
    }

    fn position(&self, task_id: TaskId) -> Result<usize, TaskError> {
        self.tasks
            .iter()
            .position(|task| task.id == task_id)
            .ok_or(TaskError::NotFound(task_id))
    }

    fn commit(&mut self, tasks: Vec<Task>) -> Result<(), TaskError> {
        self.storage.save_tasks(&tasks)?;
        self.tasks = tasks;
        Ok(())
    }
}
