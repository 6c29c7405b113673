use clap::{Parser, Subcommand, ValueEnum};
use taskdeck_core::filter::StatusFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskdeck add "Buy milk" --description "2 litres" --start 2026-01-10
    Add {
        title: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: Option<String>,
    },
    /// Edit a task's title
    ///
    /// Example: taskdeck edit task-1 "Buy organic milk"
    Edit {
        id: String,
        new_title: String,
    },
    /// Replace a task's description
    ///
    /// Example: taskdeck describe task-1 "2 litres, semi-skimmed"
    Describe {
        id: String,
        text: String,
    },
    /// Set a task's date range; dates omitted here are cleared
    ///
    /// Example: taskdeck dates task-1 --start 2026-01-10 --end 2026-01-12
    Dates {
        id: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: Option<String>,
    },
    /// Toggle a task's completed flag
    ///
    /// Example: taskdeck done task-1
    Done {
        id: String,
    },
    /// Toggle a task's starred flag
    ///
    /// Example: taskdeck star task-1
    Star {
        id: String,
    },
    /// Delete a task
    ///
    /// Example: taskdeck delete task-1
    Delete {
        id: String,
    },
    /// Show details of a task
    ///
    /// Example: taskdeck show task-1
    Show {
        id: String,
    },
    /// List tasks, optionally searched and filtered by status
    ///
    /// Example: taskdeck list --search milk --status pending
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Show collection statistics
    ///
    /// Example: taskdeck stats
    Stats,
    /// Register a new account and start a session
    ///
    /// Example: taskdeck register --name Ana --email ana@example.com --password secret
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in to an existing account
    ///
    /// Example: taskdeck login --email ana@example.com --password secret
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    All,
    Pending,
    Completed,
    Starred,
}

impl From<StatusArg> for StatusFilter {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::All => StatusFilter::All,
            StatusArg::Pending => StatusFilter::Pending,
            StatusArg::Completed => StatusFilter::Completed,
            StatusArg::Starred => StatusFilter::Starred,
        }
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Backend,
    ApiUrl,
    AuthUrl,
    Theme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_key =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_key.as_str() {
        "backend" | "store" => ConfigOverrideTarget::Backend,
        "api_url" => ConfigOverrideTarget::ApiUrl,
        "auth_url" => ConfigOverrideTarget::AuthUrl,
        "theme" => ConfigOverrideTarget::Theme,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
