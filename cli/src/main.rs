//! `folio`: command-line client for the portfolio API.
//!
//! Each command maps onto one page of the app and goes through the same route
//! guard. The session lives in the token file between runs.


use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use folio::config::{BASE_URL_VAR, ClientConfig, ConfigError, TOKEN_PATH_VAR};
use folio::net::api::{AuthClient, ProjectsClient};
use folio::net::error::ApiError;
use folio::net::transport::{Transport, TransportError};
use folio::net::types::{ContactMessage, Credentials, NewProject, Project, ProjectPatch, Registration};
use folio::pages::Page;
use folio::state::auth::{LoginUser, Session, User, announce_logout};
use folio::state::errors::ViewError;
use folio::state::project::ProjectState;
use folio::state::projects::ProjectsState;
use folio::state::register::{self, FieldErrors};
use folio::util::auth::{GuardDecision, Requirement, evaluate};
use folio::util::clock::SystemClock;
use folio::util::token_store::{TokenStore, TokenStoreError};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

// The token is already gone locally; the server only gets a short courtesy wait.
const LOGOUT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client unavailable: {0}")]
    Transport(#[from] TransportError),
    #[error("token storage failed: {0}")]
    TokenStore(#[from] TokenStoreError),
    #[error("sign in required; run `folio login`")]
    SignInRequired,
    #[error("admin role required")]
    AdminRequired,
    #[error("already signed in as {0}; run `folio logout` first")]
    AlreadySignedIn(String),
    #[error("{0}")]
    Api(ViewError),
    #[error("registration rejected")]
    Registration(FieldErrors),
    #[error("project {id} has no {flag} flag to toggle")]
    NothingToToggle { id: i64, flag: &'static str },
    #[error("sign-in failed: the API issued an unusable token")]
    RejectedToken,
}

#[derive(Parser, Debug)]
#[command(name = "folio", about = "Portfolio API client")]
struct Cli {
    #[arg(long, env = BASE_URL_VAR)]
    base_url: Option<String>,

    #[arg(long, env = TOKEN_PATH_VAR)]
    token_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and keep the token for later commands.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the signed-in user.
    Whoami,
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Send a message through the public contact form.
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    Projects(ProjectsCommand),
}

#[derive(Args, Debug)]
struct ProjectsCommand {
    #[command(subcommand)]
    command: ProjectsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProjectsSubcommand {
    List,
    /// Published, viewable projects only.
    Gallery,
    Show {
        id: i64,
    },
    Create(ProjectFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ProjectEdits,
    },
    ToggleVisible {
        id: i64,
    },
    TogglePublished {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ProjectFields {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    image_url: String,
    #[arg(long, default_value = "")]
    project_url: String,
    /// Defaults to the current year.
    #[arg(long)]
    year: Option<String>,
    #[arg(long, default_value_t = false)]
    published: bool,
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    viewable: bool,
}

impl ProjectFields {
    fn into_payload(self) -> NewProject {
        let mut payload = NewProject::new(self.title);
        payload.description = self.description;
        payload.image_url = self.image_url;
        payload.project_url = self.project_url;
        if let Some(year) = self.year {
            payload.year = year;
        }
        payload.is_published = self.published;
        payload.is_viewable = self.viewable;
        payload
    }
}

#[derive(Args, Debug, Default)]
struct ProjectEdits {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long)]
    project_url: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    published: Option<bool>,
    #[arg(long)]
    viewable: Option<bool>,
}

impl From<ProjectEdits> for ProjectPatch {
    fn from(edits: ProjectEdits) -> Self {
        Self {
            title: edits.title,
            description: edits.description,
            image_url: edits.image_url,
            project_url: edits.project_url,
            year: edits.year,
            is_published: edits.published,
            is_viewable: edits.viewable,
        }
    }
}

/// Everything a command needs: the restored session and the API clients.
struct CliContext {
    session: Session,
    auth: AuthClient,
    projects: ProjectsClient,
}

impl CliContext {
    fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        let mut session = Session::new(store.clone(), Arc::new(SystemClock));
        session.initialize();
        Self {
            session,
            auth: AuthClient::new(transport.clone()),
            projects: ProjectsClient::new(transport, store),
        }
    }

    /// Apply the route guard for `page`.
    fn enter(&self, page: Page) -> Result<(), CliError> {
        match evaluate(self.session.state(), &page.requirement()) {
            GuardDecision::Allow | GuardDecision::Pending => Ok(()),
            GuardDecision::Redirect(_) => Err(self.refusal(&page.requirement())),
        }
    }

    fn refusal(&self, requirement: &Requirement) -> CliError {
        match (requirement, self.session.user()) {
            (Requirement::Guest, Some(user)) => CliError::AlreadySignedIn(user.email.clone()),
            (Requirement::Role(_), Some(_)) => CliError::AdminRequired,
            _ => CliError::SignInRequired,
        }
    }

    /// Turn an API failure into a CLI error, dropping a token the API refused.
    fn api_failure(&mut self, err: ApiError) -> CliError {
        if err.invalidates_session() {
            self.session.invalidate();
        }
        let view = ViewError::from_api(&err);
        if view.requires_sign_in() { CliError::SignInRequired } else { CliError::Api(view) }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Registration(errors)) => {
            eprintln!("error: registration rejected");
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(cli.base_url, cli.token_path)?;
    let transport = config.transport()?;
    tracing::debug!(base_url = transport.base_url(), token_path = %config.token_path.display(), "config");
    let transport: Arc<dyn Transport> = Arc::new(transport);
    let store: Arc<dyn TokenStore> = Arc::new(config.token_store());
    let mut ctx = CliContext::new(transport, store);

    let output = dispatch(&mut ctx, cli.command).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Flags win over the environment, which wins over defaults.
fn resolve_config(base_url: Option<String>, token_path: Option<PathBuf>) -> Result<ClientConfig, CliError> {
    let from_env = ClientConfig::from_lookup(|key| match key {
        BASE_URL_VAR => base_url.clone(),
        TOKEN_PATH_VAR => token_path.as_ref().map(|p| p.display().to_string()),
        _ => None,
    });
    match (from_env, token_path) {
        (Ok(config), _) => Ok(config),
        // An explicit token path does not need a home directory.
        (Err(ConfigError::NoTokenDir), Some(path)) => {
            Ok(ClientConfig::new(base_url.as_deref().unwrap_or(folio::config::DEFAULT_BASE_URL), path)?)
        }
        (Err(e), _) => Err(e.into()),
    }
}

/// Run one command and return what to print on stdout.
async fn dispatch(ctx: &mut CliContext, command: Command) -> Result<String, CliError> {
    match command {
        Command::Login { email, password } => {
            ctx.enter(Page::Login)?;
            let credentials = Credentials { email: email.clone(), password };
            let auth = ctx.auth.clone();
            let token = auth.authenticate(&credentials).await.map_err(|e| ctx.api_failure(e))?;
            let state = ctx.session.login(LoginUser { email }, &token)?;
            let user = state.user.as_ref().ok_or(CliError::RejectedToken)?;
            Ok(format!("signed in as {}", describe_user(user)))
        }
        Command::Logout => {
            let previous = ctx.session.logout();
            let auth = ctx.auth.clone();
            if tokio::time::timeout(LOGOUT_NOTIFY_TIMEOUT, announce_logout(&auth, previous)).await.is_err() {
                tracing::warn!("logout notification timed out");
            }
            Ok("signed out".to_owned())
        }
        Command::Whoami => {
            ctx.enter(Page::Home)?;
            let user = ctx.session.user().ok_or(CliError::SignInRequired)?;
            let expires = ctx.session.claims().and_then(|c| c.expires_at).map(format_expiry);
            let mut lines = vec![describe_user(user)];
            if let Some(expires) = expires {
                lines.push(format!("token expires {expires}"));
            }
            Ok(lines.join("\n"))
        }
        Command::Register { first_name, last_name, email, password } => {
            ctx.enter(Page::Register)?;
            let registration = Registration { first_name, last_name, email, plain_password: password };
            register::submit(&ctx.auth, &registration).await.map_err(CliError::Registration)?;
            Ok(format!("registered {}; run `folio login` to sign in", registration.email))
        }
        Command::Contact { name, email, message } => {
            let message = ContactMessage { name, email, message };
            let auth = ctx.auth.clone();
            auth.contact(&message).await.map_err(|e| ctx.api_failure(e))?;
            Ok("message sent".to_owned())
        }
        Command::Projects(projects) => run_projects(ctx, projects.command).await,
    }
}

async fn run_projects(ctx: &mut CliContext, command: ProjectsSubcommand) -> Result<String, CliError> {
    let client = ctx.projects.clone();
    let mut list = ProjectsState::default();

    match command {
        ProjectsSubcommand::List => {
            ctx.enter(Page::Projects)?;
            list.load(&client).await.map_err(|e| ctx.api_failure(e))?;
            Ok(render_projects(list.items.iter()))
        }
        ProjectsSubcommand::Gallery => {
            ctx.enter(Page::Gallery)?;
            list.load(&client).await.map_err(|e| ctx.api_failure(e))?;
            Ok(render_projects(list.visible()))
        }
        ProjectsSubcommand::Show { id } => {
            ctx.enter(Page::ProjectDetail(id))?;
            let mut detail = ProjectState::default();
            detail.load(&client, id).await.map_err(|e| ctx.api_failure(e))?;
            Ok(detail.project.as_ref().map(render_project).unwrap_or_default())
        }
        ProjectsSubcommand::Create(fields) => {
            ctx.enter(Page::NewProject)?;
            let created = list.create(&client, &fields.into_payload()).await.map_err(|e| ctx.api_failure(e))?;
            Ok(format!("created {}", render_summary(&created)))
        }
        ProjectsSubcommand::Update { id, fields } => {
            ctx.enter(Page::ManageProjects)?;
            let patch = ProjectPatch::from(fields);
            if patch.is_empty() {
                return Ok("nothing to update".to_owned());
            }
            let updated = client.update(id, &patch).await.map_err(|e| ctx.api_failure(e))?;
            Ok(match updated {
                Some(project) => format!("updated {}", render_summary(&project)),
                None => format!("updated project {id}"),
            })
        }
        ProjectsSubcommand::ToggleVisible { id } => {
            ctx.enter(Page::ManageProjects)?;
            load_one(ctx, &mut list, id).await?;
            let next = list.toggle_visible(&client, id).await.map_err(|e| ctx.api_failure(e))?;
            let next = next.ok_or(CliError::NothingToToggle { id, flag: "visibility" })?;
            Ok(format!("project {id} is now {}", if next { "visible" } else { "hidden" }))
        }
        ProjectsSubcommand::TogglePublished { id } => {
            ctx.enter(Page::ManageProjects)?;
            load_one(ctx, &mut list, id).await?;
            let next = list.toggle_published(&client, id).await.map_err(|e| ctx.api_failure(e))?;
            let next = next.ok_or(CliError::NothingToToggle { id, flag: "published" })?;
            Ok(format!("project {id} is now {}", if next { "published" } else { "unpublished" }))
        }
        ProjectsSubcommand::Delete { id } => {
            ctx.enter(Page::ManageProjects)?;
            list.remove(&client, id).await.map_err(|e| ctx.api_failure(e))?;
            Ok(format!("deleted project {id}"))
        }
    }
}

/// Seed `list` with the current server copy of project `id`.
async fn load_one(ctx: &mut CliContext, list: &mut ProjectsState, id: i64) -> Result<(), CliError> {
    let client = ctx.projects.clone();
    let project = client.get(id).await.map_err(|e| ctx.api_failure(e))?;
    list.items = vec![project];
    Ok(())
}

fn describe_user(user: &User) -> String {
    let roles = user.roles.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    match &user.display_name {
        Some(name) => format!("{name} <{}> [{roles}]", user.email),
        None => format!("{} [{roles}]", user.email),
    }
}

fn format_expiry(expires_at: i64) -> String {
    OffsetDateTime::from_unix_timestamp(expires_at)
        .ok()
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| expires_at.to_string())
}

fn flag(value: Option<bool>, yes: &str, no: &str) -> String {
    match value {
        Some(true) => yes.to_owned(),
        Some(false) => no.to_owned(),
        None => "-".to_owned(),
    }
}

fn render_summary(project: &Project) -> String {
    format!("#{} {}", project.id, project.title)
}

fn render_projects<'a>(projects: impl Iterator<Item = &'a Project>) -> String {
    let lines: Vec<String> = projects
        .map(|p| {
            format!(
                "{:>5}  {:<9}  {:<7}  {:<4}  {}",
                p.id,
                flag(p.is_published, "published", "draft"),
                flag(p.is_viewable, "visible", "hidden"),
                p.year,
                p.title
            )
        })
        .collect();
    if lines.is_empty() { "no projects".to_owned() } else { lines.join("\n") }
}

fn render_project(project: &Project) -> String {
    let mut lines = vec![render_summary(project)];
    for (label, value) in [
        ("description", project.description.as_str()),
        ("year", project.year.as_str()),
        ("image", project.image_url.as_str()),
        ("link", project.project_url.as_str()),
    ] {
        if !value.is_empty() {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines.push(format!("published: {}", flag(project.is_published, "yes", "no")));
    lines.push(format!("visible: {}", flag(project.is_viewable, "yes", "no")));
    lines.join("\n")
}
