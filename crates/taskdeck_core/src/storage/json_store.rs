use crate::config::app_file_path;
use crate::error::AppError;
use crate::model::Task;
use crate::storage::TaskStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 2;
const STORE_FILE_NAME: &str = "tasks.json";
const STORE_ENV_VAR: &str = "TASKDECK_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredTasks {
    schema_version: u32,
    tasks: Vec<Task>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    app_file_path(STORE_ENV_VAR, STORE_FILE_NAME)
}

pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredTasks =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(stored.tasks)
}

pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredTasks {
        schema_version: SCHEMA_VERSION,
        tasks: tasks.to_vec(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

/// Local adapter over a versioned JSON file.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_default_path() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonStore {
    fn load_all(&self) -> Result<Vec<Task>, AppError> {
        load_tasks(&self.path).map_err(|err| AppError::load(err.to_string()))
    }

    fn create(&self, task: &Task) -> Result<Task, AppError> {
        let mut tasks = load_tasks(&self.path).map_err(|err| AppError::create(err.to_string()))?;
        if tasks.iter().any(|existing| existing.id == task.id) {
            return Err(AppError::create(format!("duplicate task id {}", task.id)));
        }

        tasks.push(task.clone());
        save_tasks(&self.path, &tasks).map_err(|err| AppError::create(err.to_string()))?;

        Ok(task.clone())
    }

    fn update(&self, task: &Task) -> Result<(), AppError> {
        let mut tasks = load_tasks(&self.path).map_err(|err| AppError::update(err.to_string()))?;
        let stored = tasks
            .iter_mut()
            .find(|existing| existing.id == task.id)
            .ok_or_else(|| AppError::update(format!("task {} not found", task.id)))?;

        *stored = task.clone();
        save_tasks(&self.path, &tasks).map_err(|err| AppError::update(err.to_string()))
    }

    fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        let mut tasks = load_tasks(&self.path).map_err(|err| AppError::delete(err.to_string()))?;
        let before = tasks.len();
        tasks.retain(|existing| existing.id != id);
        if tasks.len() == before {
            return Err(AppError::delete(format!("task {id} not found")));
        }

        save_tasks(&self.path, &tasks).map_err(|err| AppError::delete(err.to_string()))
    }
}
