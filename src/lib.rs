pub mod clock;
pub mod ids;
pub mod logging;
pub mod models;
pub mod storage;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;

pub use clock::{Clock, FixedClock, LocalClock};
pub use ids::IdAllocator;
pub use models::{Settings, Task, TaskId, TaskStatus};
pub use storage::{Storage, StorageError};
pub use store::{Reminder, SearchResults, TaskError, TaskList, TaskStore};

#[cfg(all(feature = "cli", not(test)))]
pub use cli::run;
