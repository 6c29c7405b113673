mod collection;
mod task;

pub use collection::{Statistics, TaskCollection};
pub use task::{MAX_DESCRIPTION_CHARS, Task, parse_calendar_date, validate_date_range};
