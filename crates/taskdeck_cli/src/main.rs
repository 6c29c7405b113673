use clap::{CommandFactory, Parser};
use log::warn;
use std::io::{self, BufRead};
use std::sync::OnceLock;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskdeck_cli::cli::{Cli, Command, ConfigOverrideTarget, StatusArg, parse_config_override};
use taskdeck_core::auth::{self, AuthClient};
use taskdeck_core::config::{self, Backend, Config, ConfigOverrides, Palette};
use taskdeck_core::error::AppError;
use taskdeck_core::filter::StatusFilter;
use taskdeck_core::model::Task;
use taskdeck_core::service::{MutationOutcome, TaskService};
use taskdeck_core::storage::{JsonStore, RestStore, TaskStore};

static LOGGER: OnceLock<flexi_logger::LoggerHandle> = OnceLock::new();

fn init_logging() {
    let spec = std::env::var("TASKDECK_LOG").unwrap_or_else(|_| "warn".to_string());
    let Ok(logger) = flexi_logger::Logger::try_with_str(&spec) else {
        return;
    };
    if let Ok(handle) = logger.log_to_stderr().start() {
        let _ = LOGGER.set(handle);
    }
}

/// One CLI session: the collection lives for the lifetime of this struct and
/// is dropped with it, interactive or one-shot alike.
struct Session {
    config: Config,
    service: TaskService,
    palette: Palette,
}

fn build_store(config: &Config) -> Result<Box<dyn TaskStore>, AppError> {
    match config.backend()? {
        Backend::Rest => {
            let user = auth::load_session(&auth::session_path()?)?;
            Ok(Box::new(RestStore::new(
                config.api_url(),
                user.map(|user| user.id),
            )))
        }
        Backend::Local => Ok(Box::new(JsonStore::from_default_path()?)),
    }
}

impl Session {
    fn start(config: Config) -> Result<Self, AppError> {
        let palette = config::palette_for_theme(config.theme.as_deref());
        let service = TaskService::new(build_store(&config)?);
        let mut session = Self {
            config,
            service,
            palette,
        };
        session.reload();
        Ok(session)
    }

    /// A failed load is a notice, not a dead session: the collection simply
    /// starts empty.
    fn reload(&mut self) {
        if let Err(err) = self.service.load() {
            warn!("task load failed: {err}");
            eprintln!("WARNING: could not load tasks: {err}");
        }
    }

    /// Recompose the store after the logged-in user changes.
    fn recompose(&mut self) -> Result<(), AppError> {
        self.service = TaskService::new(build_store(&self.config)?);
        self.reload();
        Ok(())
    }
}

fn session_from_overrides(raw_overrides: &[String]) -> Result<Session, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!("config ignored: {err}");
        eprintln!("WARNING: config ignored: {err}");
    }

    let mut overrides = ConfigOverrides::default();
    for raw in raw_overrides {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Backend => overrides.backend = Some(parsed.value),
            ConfigOverrideTarget::ApiUrl => overrides.api_url = Some(parsed.value),
            ConfigOverrideTarget::AuthUrl => overrides.auth_url = Some(parsed.value),
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
        }
    }

    Session::start(config::merge_overrides(&loaded.config, &overrides))
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "start_date": task.start_date,
        "end_date": task.end_date,
        "completed": task.completed,
        "starred": task.starred,
    })
}

fn report_store_notice(outcome: &MutationOutcome) {
    if let Some(err) = outcome.store_error.as_ref() {
        eprintln!("WARNING: change kept locally, store sync failed: {err}");
    }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "STAR")]
    star: String,
    #[tabled(rename = "START")]
    start: String,
    #[tabled(rename = "END")]
    end: String,
}

fn task_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id.clone(),
        title: task.title.clone(),
        status: status_label(task).to_string(),
        star: if task.starred { "*" } else { "" }.to_string(),
        start: task.start_date.clone().unwrap_or_else(|| "-".to_string()),
        end: task.end_date.clone().unwrap_or_else(|| "-".to_string()),
    }
}

fn status_label(task: &Task) -> &'static str {
    if task.completed { "completed" } else { "pending" }
}

fn user_json(user: &auth::User) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(user).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn run_command(cli: Cli, session: &mut Session) -> Result<(), AppError> {
    match cli.command {
        Command::Add {
            title,
            description,
            start,
            end,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };

            let outcome =
                session
                    .service
                    .add_task(&title, &description, start.as_deref(), end.as_deref())?;
            report_store_notice(&outcome);
            if cli.json {
                println!("{}", task_json(&outcome.task));
            } else {
                println!("Added task: {} ({})", outcome.task.title, outcome.task.id);
            }
        }
        Command::Edit { id, new_title } => {
            let outcome = session.service.edit_task(&id, &new_title)?;
            report_store_notice(&outcome);
            if cli.json {
                println!("{}", task_json(&outcome.task));
            } else {
                println!("Updated task: {} ({})", outcome.task.title, outcome.task.id);
            }
        }
        Command::Describe { id, text } => {
            let outcome = session.service.set_description(&id, &text)?;
            report_store_notice(&outcome);
            if cli.json {
                println!("{}", task_json(&outcome.task));
            } else {
                println!(
                    "Updated description: {} ({})",
                    outcome.task.title, outcome.task.id
                );
            }
        }
        Command::Dates { id, start, end } => {
            let outcome = session
                .service
                .set_dates(&id, start.as_deref(), end.as_deref())?;
            report_store_notice(&outcome);
            if cli.json {
                println!("{}", task_json(&outcome.task));
            } else {
                println!(
                    "Updated dates: {} ({}) {}..{}",
                    outcome.task.title,
                    outcome.task.id,
                    outcome.task.start_date.as_deref().unwrap_or("-"),
                    outcome.task.end_date.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Done { id } => {
            let outcome = session.service.toggle_completed(&id)?;
            report_store_notice(&outcome);
            if cli.json {
                println!("{}", task_json(&outcome.task));
            } else if outcome.task.completed {
                println!("Completed task: {} ({})", outcome.task.title, outcome.task.id);
            } else {
                println!("Reopened task: {} ({})", outcome.task.title, outcome.task.id);
            }
        }
        Command::Star { id } => {
            let outcome = session.service.toggle_starred(&id)?;
            report_store_notice(&outcome);
            if cli.json {
                println!("{}", task_json(&outcome.task));
            } else if outcome.task.starred {
                println!("Starred task: {} ({})", outcome.task.title, outcome.task.id);
            } else {
                println!("Unstarred task: {} ({})", outcome.task.title, outcome.task.id);
            }
        }
        Command::Delete { id } => {
            let outcome = session.service.delete_task(&id)?;
            report_store_notice(&outcome);
            if cli.json {
                println!("{}", task_json(&outcome.task));
            } else {
                println!("Deleted task: {} ({})", outcome.task.title, outcome.task.id);
            }
        }
        Command::Show { id } => {
            let task = session
                .service
                .find_task(id.trim())
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            if cli.json {
                println!("{}", task_json(task));
            } else {
                let star = if task.starred {
                    session.palette.accentize(" *")
                } else {
                    String::new()
                };
                println!("{} | {}{}", task.id, task.title, star);
                println!("Status: {}", status_label(task));
                if !task.description.is_empty() {
                    println!("Description: {}", task.description);
                }
                if let Some(start) = task.start_date.as_deref() {
                    println!("Start: {start}");
                }
                if let Some(end) = task.end_date.as_deref() {
                    println!("End: {end}");
                }
            }
        }
        Command::List { search, status } => {
            let status = status.unwrap_or(StatusArg::All).into();
            let view = session.service.filtered(search.as_deref(), status);
            if cli.json {
                let payload: Vec<serde_json::Value> =
                    view.iter().map(|task| task_json(task)).collect();
                println!("{}", serde_json::Value::Array(payload));
            } else if view.is_empty() {
                println!("No tasks found.");
            } else {
                let rows: Vec<TaskRow> = view.iter().map(|task| task_row(task)).collect();
                let mut table = Table::new(rows);
                table.with(Style::sharp());
                println!("{table}");
            }
        }
        Command::Stats => {
            let stats = session.service.statistics();
            let starred = session.service.filtered(None, StatusFilter::Starred).len();
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "total": stats.total,
                        "completed": stats.completed,
                        "pending": stats.pending,
                        "starred": starred,
                    })
                );
            } else {
                println!("Total: {}", stats.total);
                println!("Pending: {}", stats.pending);
                println!(
                    "Completed: {}",
                    session.palette.mutedize(&stats.completed.to_string())
                );
                println!(
                    "Starred: {}",
                    session.palette.accentize(&starred.to_string())
                );
            }
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let client = AuthClient::new(session.config.auth_url());
            let user = client.register(&name, &email, &password)?;
            auth::save_session(&auth::session_path()?, &user)?;
            if session.config.backend()? == Backend::Rest {
                session.recompose()?;
            }
            if cli.json {
                println!("{}", user_json(&user)?);
            } else {
                println!("Registered and logged in as {} <{}>", user.name, user.email);
            }
        }
        Command::Login { email, password } => {
            let client = AuthClient::new(session.config.auth_url());
            let user = client.login(&email, &password)?;
            auth::save_session(&auth::session_path()?, &user)?;
            if session.config.backend()? == Backend::Rest {
                session.recompose()?;
            }
            if cli.json {
                println!("{}", user_json(&user)?);
            } else {
                println!("Logged in as {} <{}>", user.name, user.email);
            }
        }
        Command::Logout => {
            let removed = auth::clear_session(&auth::session_path()?)?;
            if session.config.backend()? == Backend::Rest {
                session.recompose()?;
            }
            if removed {
                println!("Logged out.");
            } else {
                println!("No active session.");
            }
        }
        Command::Whoami => {
            let user = auth::load_session(&auth::session_path()?)?;
            if cli.json {
                match user {
                    Some(user) => println!("{}", user_json(&user)?),
                    None => println!("null"),
                }
            } else {
                match user {
                    Some(user) => println!("{} <{}> (id {})", user.name, user.email, user.id),
                    None => println!("Not logged in."),
                }
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive() -> Result<(), AppError> {
    let mut session = session_from_overrides(&[])?;
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {err}");
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskdeck".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, &mut session) {
            eprintln!("ERROR: {err}");
        }
    }

    Ok(())
}

fn main() {
    init_logging();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let mut session = match session_from_overrides(&cli.config_override) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli, &mut session) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
