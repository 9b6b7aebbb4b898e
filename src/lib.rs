// tasklist - In-memory task list with priorities, filters and live counts

pub mod config;
pub mod filter;
pub mod models;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use config::Config;
pub use filter::TaskFilter;
pub use models::{Counts, Priority, Task, TaskId};
pub use store::TaskStore;
pub use view::{Command, Step, View};
