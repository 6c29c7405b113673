use crate::config::app_file_path;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_AUTH_URL: &str = "http://localhost:8080/api/auth";
const SESSION_FILE_NAME: &str = "session.json";
const SESSION_ENV_VAR: &str = "TASKDECK_SESSION_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub token: Option<String>,
}

pub fn session_path() -> Result<PathBuf, AppError> {
    app_file_path(SESSION_ENV_VAR, SESSION_FILE_NAME)
}

pub fn load_session(path: &Path) -> Result<Option<User>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let user =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;
    Ok(Some(user))
}

pub fn save_session(path: &Path, user: &User) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let content =
        serde_json::to_string_pretty(user).map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

/// Returns whether a session file was present.
pub fn clear_session(path: &Path) -> Result<bool, AppError> {
    if !path.exists() {
        return Ok(false);
    }

    std::fs::remove_file(path).map_err(|err| AppError::io(err.to_string()))?;
    Ok(true)
}

/// Client for the register/login endpoints.
pub struct AuthClient {
    agent: ureq::Agent,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: ureq::agent(),
            base_url,
        }
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AppError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::invalid_input(
                "name, email and password are required",
            ));
        }

        let body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        });
        self.request("register", body)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::invalid_input("email and password are required"));
        }

        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        self.request("login", body)
    }

    fn request(&self, endpoint: &str, body: serde_json::Value) -> Result<User, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .agent
            .post(&url)
            .send_json(body)
            .map_err(auth_error_from)?;
        let payload: serde_json::Value = response
            .into_json()
            .map_err(|err| AppError::auth(err.to_string()))?;

        user_from_payload(&payload)
    }
}

/// Rejections carry the server's `message` field when it sends one.
fn auth_error_from(err: ureq::Error) -> AppError {
    match err {
        ureq::Error::Status(_, response) => {
            let message = response
                .into_json::<serde_json::Value>()
                .ok()
                .and_then(|body| {
                    body.get("message")
                        .and_then(|value| value.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "authentication rejected".to_string());
            AppError::auth(message)
        }
        other => AppError::auth(other.to_string()),
    }
}

fn user_from_payload(payload: &serde_json::Value) -> Result<User, AppError> {
    let id = match payload.get("id") {
        Some(serde_json::Value::String(id)) if !id.is_empty() => id.clone(),
        Some(serde_json::Value::Number(id)) => id.to_string(),
        _ => return Err(AppError::invalid_data("auth response is missing an id")),
    };

    let field = |name: &str| {
        payload
            .get(name)
            .and_then(|value| value.as_str())
            .unwrap_or_default()
            .to_string()
    };

    Ok(User {
        id,
        name: field("name"),
        email: field("email"),
        token: payload
            .get("token")
            .and_then(|value| value.as_str())
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::{AuthClient, User, clear_session, load_session, save_session, user_from_payload};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("taskdeck-{nanos}-{file_name}"))
    }

    fn user() -> User {
        User {
            id: "7".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            token: Some("tok-1".to_string()),
        }
    }

    #[test]
    fn session_round_trip() {
        let path = temp_path("session.json");
        save_session(&path, &user()).unwrap();

        let loaded = load_session(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, Some(user()));
    }

    #[test]
    fn load_session_missing_file_is_none() {
        let path = temp_path("missing-session.json");
        assert_eq!(load_session(&path).unwrap(), None);
    }

    #[test]
    fn load_session_rejects_malformed_file() {
        let path = temp_path("bad-session.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_session(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn clear_session_reports_whether_a_file_existed() {
        let path = temp_path("clear-session.json");
        assert!(!clear_session(&path).unwrap());

        save_session(&path, &user()).unwrap();
        assert!(clear_session(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn user_from_payload_stringifies_numeric_ids() {
        let payload = serde_json::json!({
            "id": 7,
            "name": "Ana",
            "email": "ana@example.com",
            "token": "tok-1",
        });

        let parsed = user_from_payload(&payload).unwrap();

        assert_eq!(parsed, user());
    }

    #[test]
    fn user_from_payload_requires_an_id() {
        let payload = serde_json::json!({ "name": "Ana" });
        let err = user_from_payload(&payload).unwrap_err();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn register_rejects_blank_fields_before_any_request() {
        let client = AuthClient::new("http://localhost:8080/api/auth");

        let err = client.register("  ", "ana@example.com", "secret").unwrap_err();
        assert_eq!(err.code(), "invalid_input");

        let err = client.register("Ana", "ana@example.com", "").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn login_rejects_blank_fields_before_any_request() {
        let client = AuthClient::new("http://localhost:8080/api/auth");

        let err = client.login("", "secret").unwrap_err();
        assert_eq!(err.code(), "invalid_input");

        let err = client.login("ana@example.com", "").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }
}
