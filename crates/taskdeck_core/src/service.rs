use crate::error::AppError;
use crate::filter::{StatusFilter, filter_tasks};
use crate::model::{Statistics, Task, TaskCollection, validate_date_range};
use crate::storage::TaskStore;
use log::warn;
use time::OffsetDateTime;

/// Result of an optimistic mutation. The collection always reflects the
/// change; `store_error` carries a store failure the caller should surface
/// without treating the mutation as failed.
#[derive(Debug)]
pub struct MutationOutcome {
    pub task: Task,
    pub store_error: Option<AppError>,
}

impl MutationOutcome {
    fn synced(task: Task) -> Self {
        Self {
            task,
            store_error: None,
        }
    }
}

/// Session context: owns the in-memory collection and the store it syncs to.
pub struct TaskService {
    collection: TaskCollection,
    store: Box<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Box<dyn TaskStore>) -> Self {
        Self {
            collection: TaskCollection::new(),
            store,
        }
    }

    /// Bulk-loads from the store, replacing the in-memory collection.
    pub fn load(&mut self) -> Result<usize, AppError> {
        let tasks = self.store.load_all()?;
        let mut collection = TaskCollection::new();
        for task in tasks {
            collection
                .add(task)
                .map_err(|err| AppError::invalid_data(err.message().to_string()))?;
        }

        let count = collection.len();
        self.collection = collection;
        Ok(count)
    }

    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<MutationOutcome, AppError> {
        let trimmed_title = title.trim();
        if trimmed_title.is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }

        let start_date = normalize_date(start_date);
        let end_date = normalize_date(end_date);
        validate_date_range(start_date, end_date)?;

        let id = format!("task-{}", OffsetDateTime::now_utc().unix_timestamp_nanos());
        let mut task = Task {
            id,
            title: trimmed_title.to_string(),
            description: String::new(),
            start_date: start_date.map(str::to_string),
            end_date: end_date.map(str::to_string),
            completed: false,
            starred: false,
        };
        task.set_description(description.trim())?;

        self.collection.add(task.clone())?;

        match self.store.create(&task) {
            Ok(echoed) => {
                if echoed.id != task.id && self.collection.find_by_id(&echoed.id).is_some() {
                    return Err(AppError::invalid_data(format!(
                        "store returned duplicate id {}",
                        echoed.id
                    )));
                }
                if let Some(stored) = self.collection.find_by_id_mut(&task.id) {
                    *stored = echoed.clone();
                }
                Ok(MutationOutcome::synced(echoed))
            }
            Err(err) => {
                warn!("store create failed for {}: {err}", task.id);
                Ok(MutationOutcome {
                    task,
                    store_error: Some(err),
                })
            }
        }
    }

    pub fn edit_task(&mut self, id: &str, new_title: &str) -> Result<MutationOutcome, AppError> {
        let trimmed_id = required_id(id)?;
        let trimmed_title = new_title.trim();
        if trimmed_title.is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }

        let task = match self.collection.find_by_id_mut(trimmed_id) {
            Some(task) => {
                task.title = trimmed_title.to_string();
                task.clone()
            }
            None => return Err(AppError::invalid_input("task not found")),
        };

        Ok(self.persist_update(task))
    }

    pub fn set_description(&mut self, id: &str, text: &str) -> Result<MutationOutcome, AppError> {
        let trimmed_id = required_id(id)?;

        let task = match self.collection.find_by_id_mut(trimmed_id) {
            Some(task) => {
                task.set_description(text.trim())?;
                task.clone()
            }
            None => return Err(AppError::invalid_input("task not found")),
        };

        Ok(self.persist_update(task))
    }

    /// Sets the date range; dates not given are cleared.
    pub fn set_dates(
        &mut self,
        id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<MutationOutcome, AppError> {
        let trimmed_id = required_id(id)?;
        let start_date = normalize_date(start_date);
        let end_date = normalize_date(end_date);
        validate_date_range(start_date, end_date)?;

        let task = match self.collection.find_by_id_mut(trimmed_id) {
            Some(task) => {
                task.start_date = start_date.map(str::to_string);
                task.end_date = end_date.map(str::to_string);
                task.clone()
            }
            None => return Err(AppError::invalid_input("task not found")),
        };

        Ok(self.persist_update(task))
    }

    pub fn toggle_completed(&mut self, id: &str) -> Result<MutationOutcome, AppError> {
        let trimmed_id = required_id(id)?;
        let task = match self.collection.toggle_completed_by_id(trimmed_id) {
            Some(task) => task.clone(),
            None => return Err(AppError::invalid_input("task not found")),
        };

        Ok(self.persist_update(task))
    }

    pub fn toggle_starred(&mut self, id: &str) -> Result<MutationOutcome, AppError> {
        let trimmed_id = required_id(id)?;
        let task = match self.collection.toggle_starred_by_id(trimmed_id) {
            Some(task) => task.clone(),
            None => return Err(AppError::invalid_input("task not found")),
        };

        Ok(self.persist_update(task))
    }

    pub fn delete_task(&mut self, id: &str) -> Result<MutationOutcome, AppError> {
        let trimmed_id = required_id(id)?;
        let task = self
            .collection
            .find_by_id(trimmed_id)
            .cloned()
            .ok_or_else(|| AppError::invalid_input("task not found"))?;

        self.collection.remove_by_id(trimmed_id);

        match self.store.delete_by_id(trimmed_id) {
            Ok(()) => Ok(MutationOutcome::synced(task)),
            Err(err) => {
                warn!("store delete failed for {trimmed_id}: {err}");
                Ok(MutationOutcome {
                    task,
                    store_error: Some(err),
                })
            }
        }
    }

    pub fn statistics(&self) -> Statistics {
        self.collection.statistics()
    }

    pub fn filtered(&self, search: Option<&str>, status: StatusFilter) -> Vec<&Task> {
        filter_tasks(self.collection.tasks(), search, status)
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.collection.find_by_id(id)
    }

    pub fn tasks(&self) -> &[Task] {
        self.collection.tasks()
    }

    fn persist_update(&self, task: Task) -> MutationOutcome {
        match self.store.update(&task) {
            Ok(()) => MutationOutcome::synced(task),
            Err(err) => {
                warn!("store update failed for {}: {err}", task.id);
                MutationOutcome {
                    task,
                    store_error: Some(err),
                }
            }
        }
    }
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed)
}

fn normalize_date(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
