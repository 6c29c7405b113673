use crate::error::AppError;
use crate::model::Task;
use crate::storage::TaskStore;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/tasks";
const FALLBACK_TITLE: &str = "Untitled";

/// Wire shape of a task record. The remote schema predates the richer local
/// model: its `description` column carries the domain title, and it knows
/// nothing of long descriptions, date ranges or starring.
#[derive(Debug, Deserialize)]
struct RemoteTask {
    id: serde_json::Value,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
}

fn remote_id(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(id) => id.clone(),
        other => other.to_string(),
    }
}

fn task_from_remote(remote: &RemoteTask) -> Task {
    let title = remote
        .description
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    Task {
        id: remote_id(&remote.id),
        title,
        description: String::new(),
        start_date: None,
        end_date: None,
        completed: remote.completed,
        starred: false,
    }
}

/// REST adapter; tasks are scoped to the logged-in user when one is known.
pub struct RestStore {
    agent: ureq::Agent,
    base_url: String,
    user_id: Option<String>,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, user_id: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: ureq::agent(),
            base_url,
            user_id,
        }
    }

    fn task_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    fn remote_body(&self, task: &Task) -> serde_json::Value {
        let mut body = serde_json::json!({
            "description": task.title,
            "completed": task.completed,
        });

        if let Some(user_id) = self.user_id.as_deref() {
            // Ids arrive numeric from the auth endpoint; send them back the same way.
            body["userId"] = match user_id.parse::<i64>() {
                Ok(numeric) => serde_json::json!(numeric),
                Err(_) => serde_json::json!(user_id),
            };
        }

        body
    }
}

impl TaskStore for RestStore {
    fn load_all(&self) -> Result<Vec<Task>, AppError> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(Vec::new());
        };

        let response = self
            .agent
            .get(&self.base_url)
            .query("userId", user_id)
            .call()
            .map_err(|err| AppError::load(err.to_string()))?;
        let remote: Vec<RemoteTask> = response
            .into_json()
            .map_err(|err| AppError::load(err.to_string()))?;

        Ok(remote.iter().map(task_from_remote).collect())
    }

    fn create(&self, task: &Task) -> Result<Task, AppError> {
        let response = self
            .agent
            .post(&self.base_url)
            .send_json(self.remote_body(task))
            .map_err(|err| AppError::create(err.to_string()))?;
        let created: RemoteTask = response
            .into_json()
            .map_err(|err| AppError::create(err.to_string()))?;

        let mut echoed = task.clone();
        echoed.id = remote_id(&created.id);
        echoed.completed = created.completed;
        Ok(echoed)
    }

    fn update(&self, task: &Task) -> Result<(), AppError> {
        self.agent
            .put(&self.task_url(&task.id))
            .send_json(self.remote_body(task))
            .map_err(|err| AppError::update(err.to_string()))?;
        Ok(())
    }

    fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        self.agent
            .delete(&self.task_url(id))
            .call()
            .map_err(|err| AppError::delete(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RemoteTask, RestStore, task_from_remote};
    use crate::model::Task;
    use crate::storage::TaskStore;

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            start_date: None,
            end_date: None,
            completed: false,
            starred: false,
        }
    }

    #[test]
    fn remote_numeric_ids_are_stringified() {
        let remote: RemoteTask =
            serde_json::from_value(serde_json::json!({ "id": 42, "description": "demo" }))
                .unwrap();

        let mapped = task_from_remote(&remote);

        assert_eq!(mapped.id, "42");
        assert_eq!(mapped.title, "demo");
    }

    #[test]
    fn remote_tasks_without_description_get_a_fallback_title() {
        let remote: RemoteTask =
            serde_json::from_value(serde_json::json!({ "id": 1, "completed": true })).unwrap();

        let mapped = task_from_remote(&remote);

        assert_eq!(mapped.title, "Untitled");
        assert!(mapped.completed);
        assert!(!mapped.starred);
        assert_eq!(mapped.start_date, None);
    }

    #[test]
    fn remote_body_maps_title_into_description() {
        let store = RestStore::new("http://localhost:8080/api/tasks", None);
        let body = store.remote_body(&task("task-1", "Buy milk"));

        assert_eq!(body["description"], "Buy milk");
        assert_eq!(body["completed"], false);
        assert!(body.get("userId").is_none());
    }

    #[test]
    fn remote_body_carries_the_user_id_when_present() {
        let store = RestStore::new(
            "http://localhost:8080/api/tasks",
            Some("7".to_string()),
        );
        let body = store.remote_body(&task("task-1", "Buy milk"));

        assert_eq!(body["userId"], 7);

        let store = RestStore::new(
            "http://localhost:8080/api/tasks",
            Some("user-7".to_string()),
        );
        let body = store.remote_body(&task("task-1", "Buy milk"));

        assert_eq!(body["userId"], "user-7");
    }

    #[test]
    fn load_all_without_a_user_is_empty() {
        let store = RestStore::new("http://localhost:8080/api/tasks", None);
        let loaded = store.load_all().unwrap();

        assert!(loaded.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = RestStore::new("http://localhost:8080/api/tasks/", None);
        assert_eq!(store.task_url("5"), "http://localhost:8080/api/tasks/5");
    }
}
