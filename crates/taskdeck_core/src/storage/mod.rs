use crate::error::AppError;
use crate::model::Task;

pub mod json_store;
pub mod rest_store;

pub use json_store::JsonStore;
pub use rest_store::RestStore;

/// Persistence port. Adapters own the mapping between the domain task and
/// their stored representation; callers pick an adapter at composition time.
pub trait TaskStore {
    fn load_all(&self) -> Result<Vec<Task>, AppError>;

    /// May assign a replacement id; the echoed task is authoritative.
    fn create(&self, task: &Task) -> Result<Task, AppError>;

    fn update(&self, task: &Task) -> Result<(), AppError>;

    fn delete_by_id(&self, id: &str) -> Result<(), AppError>;
}
