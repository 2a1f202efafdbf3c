/// Version injected at compile time via EVLINE_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("EVLINE_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use evline::api::executions::JobExecutionInput;
use evline::api::jobs::JobSpec;
use evline::api::{ApiClient, Order, Sort};
use evline::config::Config;
use evline::reconcile::{
    parse_id, sources, IdentityPlan, IdentityReconciler, JobPlan, JobReconciler, ListOrder,
    ProjectPlan, ProjectReconciler, ReadOutcome,
};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage Eventline projects, identities and jobs
#[derive(Parser, Debug)]
#[command(name = "evline", version = VERSION, about, long_about = None)]
struct Args {
    /// Eventline API endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Eventline API key
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage projects
    #[command(subcommand)]
    Projects(ProjectCommand),
    /// Manage identities
    #[command(subcommand)]
    Identities(IdentityCommand),
    /// Manage jobs
    #[command(subcommand)]
    Jobs(JobCommand),
    /// Run jobs and control their executions
    #[command(subcommand)]
    Executions(ExecutionCommand),
    /// Replay events
    #[command(subcommand)]
    Events(EventCommand),
    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Client-side ordering of a listing
#[derive(ClapArgs, Debug)]
struct SortArgs {
    /// Sort by `id` or `name`
    #[arg(long)]
    sort: Option<Sort>,
    /// `asc` or `desc`
    #[arg(long, default_value = "asc")]
    order: Order,
}

impl SortArgs {
    fn list_order(&self) -> ListOrder {
        self.sort.map(|sort| (sort, self.order))
    }
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// List all projects
    List(SortArgs),
    /// Show a project by name
    Get { name: String },
    /// Create a project
    Create { name: String },
    /// Rename a project
    Rename { id: String, name: String },
    /// Refresh a project by id
    Refresh { id: String },
    /// Delete a project by id
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum IdentityCommand {
    /// List the identities of a project
    List {
        project_id: String,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Create an identity
    Create(IdentityArgs),
    /// Refresh an identity from <project-id>/<identity-id>
    Refresh { key: String },
    /// Delete an identity from <project-id>/<identity-id>
    Delete { key: String },
}

#[derive(ClapArgs, Debug)]
struct IdentityArgs {
    project_id: String,
    name: String,
    #[arg(long)]
    connector: String,
    #[arg(long = "type")]
    identity_type: String,
    /// Connector payload as JSON text
    #[arg(long)]
    data: String,
}

#[derive(Subcommand, Debug)]
enum JobCommand {
    /// List the jobs of a project
    List {
        project_id: String,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Show a job by name
    Get { project_id: String, name: String },
    /// Deploy job spec files (YAML); several files are deployed in one request
    Deploy {
        project_id: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Only validate the spec
        #[arg(long)]
        dry_run: bool,
    },
    /// Refresh a job from <project-id>/<job-id>
    Refresh { key: String },
    /// Delete a job from <project-id>/<job-id>
    Delete { key: String },
}

#[derive(Subcommand, Debug)]
enum ExecutionCommand {
    /// Execute a job
    Run {
        project_id: String,
        job_id: String,
        /// Parameter as name=value; values are parsed as JSON when possible
        #[arg(long = "param", short = 'p')]
        params: Vec<String>,
    },
    /// Show a job execution
    Show { project_id: String, id: String },
    /// Abort a job execution
    Abort { project_id: String, id: String },
    /// Restart a job execution
    Restart { project_id: String, id: String },
}

#[derive(Subcommand, Debug)]
enum EventCommand {
    /// Replay an event, running its job again
    Replay { project_id: String, id: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the effective endpoint and key to the configuration file
    Save,
    /// Print the configuration file path
    Path,
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, err);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("evline {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("evline").join("evline.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".evline").join("evline.log");
    }
    PathBuf::from("evline.log")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outcome<T: Serialize>(outcome: ReadOutcome<T>) -> Result<()> {
    match outcome {
        ReadOutcome::Synced(record) => print_json(&record),
        ReadOutcome::Removed => {
            eprintln!("Resource no longer exists");
            Ok(())
        }
    }
}

fn parse_param(param: &str) -> Result<(String, Value)> {
    let (name, raw) = param
        .split_once('=')
        .with_context(|| format!("Invalid parameter {:?}, expected name=value", param))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

async fn run_projects(client: &ApiClient, command: ProjectCommand) -> Result<()> {
    let reconciler = ProjectReconciler::new(client);

    match command {
        ProjectCommand::List(sort) => print_json(&sources::list_projects(client, sort.list_order()).await?),
        ProjectCommand::Get { name } => print_json(&sources::project_by_name(client, &name).await?),
        ProjectCommand::Create { name } => print_json(&reconciler.create(&ProjectPlan { name }).await?),
        ProjectCommand::Rename { id, name } => {
            let record = reconciler.import(&id)?;
            print_json(&reconciler.update(&record, &ProjectPlan { name }).await?)
        }
        ProjectCommand::Refresh { id } => print_outcome(reconciler.read(&reconciler.import(&id)?).await?),
        ProjectCommand::Delete { id } => {
            let outcome = reconciler.delete(&reconciler.import(&id)?).await?;
            eprintln!("{:?}", outcome);
            Ok(())
        }
    }
}

async fn run_identities(client: &ApiClient, command: IdentityCommand) -> Result<()> {
    let reconciler = IdentityReconciler::new(client);

    match command {
        IdentityCommand::List { project_id, sort } => {
            print_json(&sources::list_identities(client, &project_id, sort.list_order()).await?)
        }
        IdentityCommand::Create(args) => {
            let plan = IdentityPlan {
                project_id: args.project_id,
                name: args.name,
                connector: args.connector,
                identity_type: args.identity_type,
                data: args.data,
            };
            print_json(&reconciler.create(&plan).await?)
        }
        IdentityCommand::Refresh { key } => print_outcome(reconciler.read(&reconciler.import(&key)?).await?),
        IdentityCommand::Delete { key } => {
            let outcome = reconciler.delete(&reconciler.import(&key)?).await?;
            eprintln!("{:?}", outcome);
            Ok(())
        }
    }
}

async fn run_jobs(client: &ApiClient, command: JobCommand) -> Result<()> {
    let reconciler = JobReconciler::new(client);

    match command {
        JobCommand::List { project_id, sort } => {
            print_json(&sources::list_jobs(client, &project_id, sort.list_order()).await?)
        }
        JobCommand::Get { project_id, name } => {
            print_json(&sources::job_by_name(client, &project_id, &name).await?)
        }
        JobCommand::Deploy {
            project_id,
            files,
            dry_run,
        } => {
            let mut specs = files
                .iter()
                .map(|file| read_job_spec(file))
                .collect::<Result<Vec<_>>>()?;

            if specs.len() > 1 {
                if dry_run {
                    reconciler.check_all(&project_id, &specs).await?;
                    eprintln!("{} jobs are valid", specs.len());
                    return Ok(());
                }
                return print_json(&reconciler.create_all(&project_id, &specs).await?);
            }

            let Some(spec) = specs.pop() else {
                return Ok(());
            };
            let plan = JobPlan { project_id, spec };

            if dry_run {
                reconciler.check(&plan).await?;
                eprintln!("Job {:?} is valid", plan.spec.name);
                Ok(())
            } else {
                print_json(&reconciler.create(&plan).await?)
            }
        }
        JobCommand::Refresh { key } => print_outcome(reconciler.read(&reconciler.import(&key)?).await?),
        JobCommand::Delete { key } => {
            let outcome = reconciler.delete(&reconciler.import(&key)?).await?;
            eprintln!("{:?}", outcome);
            Ok(())
        }
    }
}

fn read_job_spec(file: &Path) -> Result<JobSpec> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", file.display()))
}

async fn run_events(client: &ApiClient, command: EventCommand) -> Result<()> {
    match command {
        EventCommand::Replay { project_id, id } => {
            let scoped = client.scoped(parse_id("project id", &project_id)?);
            let id = parse_id("event id", &id)?;
            let event = scoped
                .replay_event(id)
                .await
                .with_context(|| format!("Unable to replay event {}", id))?;
            print_json(&event)
        }
    }
}

fn run_config(config: &Config, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Save => {
            config.save()?;
            eprintln!("Configuration saved");
            Ok(())
        }
        ConfigCommand::Path => {
            let path = Config::config_path().context("No configuration directory")?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

async fn run_executions(client: &ApiClient, command: ExecutionCommand) -> Result<()> {
    match command {
        ExecutionCommand::Run {
            project_id,
            job_id,
            params,
        } => {
            let scoped = client.scoped(parse_id("project id", &project_id)?);
            let job_id = parse_id("job id", &job_id)?;
            let input = JobExecutionInput {
                parameters: params
                    .iter()
                    .map(|p| parse_param(p))
                    .collect::<Result<_>>()?,
            };
            let execution = scoped
                .execute_job(job_id, &input)
                .await
                .with_context(|| format!("Unable to execute job {}", job_id))?;
            print_json(&execution)
        }
        ExecutionCommand::Show { project_id, id } => {
            let scoped = client.scoped(parse_id("project id", &project_id)?);
            let id = parse_id("job execution id", &id)?;
            let execution = scoped
                .fetch_job_execution(id)
                .await
                .with_context(|| format!("Unable to fetch job execution {}", id))?;
            print_json(&execution)
        }
        ExecutionCommand::Abort { project_id, id } => {
            let scoped = client.scoped(parse_id("project id", &project_id)?);
            let id = parse_id("job execution id", &id)?;
            scoped
                .abort_job_execution(id)
                .await
                .with_context(|| format!("Unable to abort job execution {}", id))
        }
        ExecutionCommand::Restart { project_id, id } => {
            let scoped = client.scoped(parse_id("project id", &project_id)?);
            let id = parse_id("job execution id", &id)?;
            scoped
                .restart_job_execution(id)
                .await
                .with_context(|| format!("Unable to restart job execution {}", id))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let config = Config::load()
        .with_env()
        .with_overrides(args.endpoint.clone(), args.api_key.clone());
    let client = ApiClient::new(&config.api).context("Unable to instantiate eventline api client")?;
    tracing::info!("Using endpoint: {}", client.base_uri());

    match args.command {
        Command::Projects(command) => run_projects(&client, command).await,
        Command::Identities(command) => run_identities(&client, command).await,
        Command::Jobs(command) => run_jobs(&client, command).await,
        Command::Executions(command) => run_executions(&client, command).await,
        Command::Events(command) => run_events(&client, command).await,
        Command::Config(command) => run_config(&config, command),
    }
}
