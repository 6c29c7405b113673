use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidInput(String),
    InvalidData(String),
    Io(String),
    Load(String),
    Create(String),
    Update(String),
    Delete(String),
    Auth(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn load<M: Into<String>>(message: M) -> Self {
        Self::Load(message.into())
    }

    pub fn create<M: Into<String>>(message: M) -> Self {
        Self::Create(message.into())
    }

    pub fn update<M: Into<String>>(message: M) -> Self {
        Self::Update(message.into())
    }

    pub fn delete<M: Into<String>>(message: M) -> Self {
        Self::Delete(message.into())
    }

    pub fn auth<M: Into<String>>(message: M) -> Self {
        Self::Auth(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::Load(_) => "load_error",
            Self::Create(_) => "create_error",
            Self::Update(_) => "update_error",
            Self::Delete(_) => "delete_error",
            Self::Auth(_) => "auth_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Io(message)
            | Self::Load(message)
            | Self::Create(message)
            | Self::Update(message)
            | Self::Delete(message)
            | Self::Auth(message) => message,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}
