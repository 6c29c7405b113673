use crate::error::AppError;
use crate::model::Task;

/// Ordered task list; insertion order is the canonical display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Appends a task. Ids are unique within a collection, so a task whose id
    /// is already present is rejected.
    pub fn add(&mut self, task: Task) -> Result<(), AppError> {
        if self.tasks.iter().any(|existing| existing.id == task.id) {
            return Err(AppError::invalid_input(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Removes every task matching `id` and returns how many were removed.
    pub fn remove_by_id(&mut self, id: &str) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before - self.tasks.len()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    /// No-op when the id is absent; returns the toggled task otherwise.
    pub fn toggle_completed_by_id(&mut self, id: &str) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.toggle_completed();
        Some(&*task)
    }

    pub fn toggle_starred_by_id(&mut self, id: &str) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.toggle_starred();
        Some(&*task)
    }

    pub fn statistics(&self) -> Statistics {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        Statistics {
            total,
            completed,
            pending: total - completed,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
