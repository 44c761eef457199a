//! Headless command surface against the remote task service. Output is
//! plain text by default, a versioned JSON envelope with `--json`.

use clap::{Args, Subcommand};
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

use crate::app::state::parse_deadline_input;
use crate::display::{FilterSpec, PriorityFilter, SortKey, StatusFilter, display_list};
use crate::settings::Settings;
use crate::store::{StoreConfig, StoreError, TaskStore};
use crate::types::{Priority, Task, TaskDraft, TaskPatch, TaskStatus};

const SCHEMA_VERSION: &str = "cli.v1";

#[derive(Debug, Clone, Subcommand)]
pub enum RootCommand {
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TaskCommand {
    List(TaskListArgs),
    Create(TaskCreateArgs),
    Update(TaskUpdateArgs),
    Complete(TaskIdArgs),
    Reopen(TaskIdArgs),
    Delete(TaskIdArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TaskListArgs {
    /// all, active, or completed
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// critical, high, medium, or low
    #[arg(long, value_name = "PRIORITY")]
    pub priority: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// deadline, priority, or created
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TaskCreateArgs {
    #[arg(long, value_name = "TEXT")]
    pub title: String,

    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    #[arg(long, value_name = "PRIORITY")]
    pub priority: Option<String>,

    /// YYYY-MM-DD or RFC 3339
    #[arg(long, value_name = "DATE")]
    pub deadline: Option<String>,

    /// Minutes
    #[arg(long, value_name = "N")]
    pub estimate: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct TaskUpdateArgs {
    #[arg(long, value_name = "TASK_ID")]
    pub id: Uuid,

    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    #[arg(long, value_name = "PRIORITY")]
    pub priority: Option<String>,

    #[arg(long, value_name = "DATE")]
    pub deadline: Option<String>,

    #[arg(long, value_name = "N")]
    pub estimate: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct TaskIdArgs {
    #[arg(long, value_name = "TASK_ID")]
    pub id: Uuid,
}

pub async fn run(settings: &Settings, command: RootCommand, json_output: bool, quiet: bool) -> i32 {
    match execute(settings, command).await {
        Ok(output) => {
            print_success(output, json_output, quiet);
            0
        }
        Err(err) => {
            print_error(&err, json_output);
            err.exit_code
        }
    }
}

struct CommandOutput {
    command: &'static str,
    data: Value,
    text: String,
}

#[derive(Debug)]
struct CliError {
    exit_code: i32,
    code: &'static str,
    message: String,
}

type CliResult<T> = Result<T, CliError>;

async fn execute(settings: &Settings, command: RootCommand) -> CliResult<CommandOutput> {
    let store = TaskStore::new(StoreConfig {
        base_url: settings.api_base_url.clone(),
        bearer_token: settings.bearer_token(),
        request_timeout: settings.request_timeout(),
    })
    .map_err(classify_store_error)?;

    match command {
        RootCommand::Task { command } => execute_task_command(&store, command).await,
    }
}

async fn execute_task_command(store: &TaskStore, command: TaskCommand) -> CliResult<CommandOutput> {
    match command {
        TaskCommand::List(args) => task_list(store, args).await,
        TaskCommand::Create(args) => task_create(store, args).await,
        TaskCommand::Update(args) => task_update(store, args).await,
        TaskCommand::Complete(args) => task_set_status(store, args, TaskStatus::Completed).await,
        TaskCommand::Reopen(args) => task_set_status(store, args, TaskStatus::Active).await,
        TaskCommand::Delete(args) => task_delete(store, args).await,
    }
}

async fn task_list(store: &TaskStore, args: TaskListArgs) -> CliResult<CommandOutput> {
    let filter = FilterSpec {
        status: parse_status_filter(args.status.as_deref())?,
        priority: parse_priority_filter(args.priority.as_deref())?,
    };
    let sort = match args.sort.as_deref() {
        Some(raw) => SortKey::parse(raw).ok_or_else(|| {
            usage_error(
                "BAD_SORT_KEY",
                format!("unknown sort key '{raw}', expected deadline, priority, or created"),
            )
        })?,
        None => SortKey::default(),
    };
    let query = args.search.as_deref().unwrap_or("");

    let tasks = store.fetch_all().await.map_err(classify_store_error)?;
    let listed = display_list(&tasks, &filter, query, sort);

    let data = json!({
        "tasks": listed.iter().map(task_json).collect::<Vec<_>>(),
        "total": tasks.len(),
        "shown": listed.len()
    });
    let text = render_task_list_text(&listed);

    Ok(CommandOutput {
        command: "task list",
        data,
        text,
    })
}

fn render_task_list_text(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let headers = ["ID", "Pri", "Status", "Title", "Due", "Est"];
    let rows = tasks
        .iter()
        .map(|task| {
            let id = task.id.to_string();
            let short_id = id.chars().take(8).collect::<String>();
            let due = task
                .deadline
                .map(|deadline| deadline.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            let estimate = task
                .time_estimate
                .map(|minutes| format!("{minutes}m"))
                .unwrap_or_else(|| "-".to_string());

            vec![
                short_id,
                task.priority.as_str().to_string(),
                task.status.as_str().to_string(),
                task.title.replace('\n', " "),
                due,
                estimate,
            ]
        })
        .collect::<Vec<_>>();

    render_text_table(&headers, &rows)
}

async fn task_create(store: &TaskStore, args: TaskCreateArgs) -> CliResult<CommandOutput> {
    let draft = TaskDraft {
        title: args.title,
        description: args.description,
        priority: parse_priority(args.priority.as_deref())?,
        deadline: parse_deadline(args.deadline.as_deref())?,
        time_estimate: args.estimate,
        tag_ids: Vec::new(),
    };

    let created = store.create(&draft).await.map_err(classify_store_error)?;
    let data = json!({ "task": task_json(&created) });

    Ok(CommandOutput {
        command: "task create",
        data,
        text: format!("created task \"{}\" ({})", created.title, created.id),
    })
}

async fn task_update(store: &TaskStore, args: TaskUpdateArgs) -> CliResult<CommandOutput> {
    let patch = TaskPatch {
        title: args.title,
        description: args.description,
        priority: parse_priority(args.priority.as_deref())?,
        status: None,
        deadline: parse_deadline(args.deadline.as_deref())?,
        time_estimate: args.estimate,
    };
    if patch.is_empty() {
        return Err(usage_error(
            "TASK_UPDATE_EMPTY",
            "provide at least one of --title, --description, --priority, --deadline, or --estimate",
        ));
    }

    let updated = store
        .update(args.id, &patch)
        .await
        .map_err(classify_store_error)?;
    let data = json!({ "task": task_json(&updated) });

    Ok(CommandOutput {
        command: "task update",
        data,
        text: format!("updated task \"{}\" ({})", updated.title, updated.id),
    })
}

async fn task_set_status(
    store: &TaskStore,
    args: TaskIdArgs,
    status: TaskStatus,
) -> CliResult<CommandOutput> {
    let updated = store
        .toggle_status(args.id, status)
        .await
        .map_err(classify_store_error)?;
    let data = json!({ "task": task_json(&updated) });

    let (command, verb): (&'static str, &str) = match status {
        TaskStatus::Completed => ("task complete", "completed"),
        TaskStatus::Active => ("task reopen", "reopened"),
    };
    Ok(CommandOutput {
        command,
        data,
        text: format!("{verb} task \"{}\" ({})", updated.title, updated.id),
    })
}

async fn task_delete(store: &TaskStore, args: TaskIdArgs) -> CliResult<CommandOutput> {
    store.remove(args.id).await.map_err(classify_store_error)?;
    let data = json!({ "deleted": true, "task_id": args.id });

    Ok(CommandOutput {
        command: "task delete",
        data,
        text: format!("deleted task {}", args.id),
    })
}

fn parse_status_filter(raw: Option<&str>) -> CliResult<StatusFilter> {
    match raw {
        None | Some("all") => Ok(StatusFilter::All),
        Some("active") => Ok(StatusFilter::Active),
        Some("completed") => Ok(StatusFilter::Completed),
        Some(other) => Err(usage_error(
            "BAD_STATUS",
            format!("unknown status '{other}', expected all, active, or completed"),
        )),
    }
}

fn parse_priority_filter(raw: Option<&str>) -> CliResult<PriorityFilter> {
    match raw {
        None | Some("all") => Ok(PriorityFilter::All),
        Some(other) => match Priority::parse(other) {
            Some(priority) => Ok(PriorityFilter::Only(priority)),
            None => Err(bad_priority(other)),
        },
    }
}

fn parse_priority(raw: Option<&str>) -> CliResult<Option<Priority>> {
    match raw {
        None => Ok(None),
        Some(value) => Priority::parse(value)
            .map(Some)
            .ok_or_else(|| bad_priority(value)),
    }
}

fn bad_priority(raw: &str) -> CliError {
    usage_error(
        "BAD_PRIORITY",
        format!("unknown priority '{raw}', expected critical, high, medium, or low"),
    )
}

fn parse_deadline(raw: Option<&str>) -> CliResult<Option<chrono::DateTime<chrono::Utc>>> {
    match raw {
        None => Ok(None),
        Some(value) => {
            parse_deadline_input(value).map_err(|message| usage_error("BAD_DEADLINE", message))
        }
    }
}

fn task_json(task: &Task) -> Value {
    json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "priority": task.priority.as_str(),
        "status": task.status.as_str(),
        "deadline": task.deadline,
        "time_estimate": task.time_estimate,
        "tags": task.tags.iter().map(|tag| tag.label.clone()).collect::<Vec<_>>(),
        "created_at": task.created_at,
        "updated_at": task.updated_at
    })
}

fn usage_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 2,
        code,
        message: message.into(),
    }
}

fn classify_store_error(err: StoreError) -> CliError {
    match err {
        StoreError::Validation { message } => CliError {
            exit_code: 2,
            code: "VALIDATION",
            message,
        },
        StoreError::NotFound { id } => CliError {
            exit_code: 3,
            code: "TASK_NOT_FOUND",
            message: format!("task {id} not found"),
        },
        StoreError::Auth { reason } => CliError {
            exit_code: 4,
            code: "AUTH",
            message: reason,
        },
        StoreError::Network { message } => CliError {
            exit_code: 5,
            code: "NETWORK_ERROR",
            message,
        },
    }
}

fn print_success(output: CommandOutput, json_output: bool, quiet: bool) {
    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "command": output.command,
            "data": output.data
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => println!("{value}"),
            Err(_) => println!("{}", payload),
        }
        return;
    }

    if quiet {
        return;
    }

    if output.text.is_empty() {
        println!("ok");
    } else {
        println!("{}", output.text);
    }
}

fn print_error(err: &CliError, json_output: bool) {
    error!(
        code = err.code,
        message = %err.message,
        "cli command failed"
    );

    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "error": {
                "code": err.code,
                "message": err.message
            }
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => eprintln!("{value}"),
            Err(_) => eprintln!("{}", payload),
        }
        return;
    }

    eprintln!("error[{}]: {}", err.code, err.message);
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            if width > widths[index] {
                widths[index] = width;
            }
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|width| "-".repeat(*width + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut lines = Vec::new();
    lines.push(border.clone());
    lines.push(format!(
        "| {} |",
        headers
            .iter()
            .enumerate()
            .map(|(index, header)| format!("{header:<width$}", width = widths[index]))
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    lines.push(border.clone());

    for row in rows {
        lines.push(format!(
            "| {} |",
            row.iter()
                .enumerate()
                .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
                .collect::<Vec<_>>()
                .join(" | ")
        ));
    }

    lines.push(border);
    lines.join("\n")
}
