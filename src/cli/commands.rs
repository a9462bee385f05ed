use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ccmd", about = concat!("cleancommand v", env!("CARGO_PKG_VERSION"), " - checklists for cleaning crews"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,

    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a .cleancommand/ workspace in the current directory
    Init(InitArgs),
    /// Log in by email
    Login(LoginArgs),
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List users
    Users(UsersArgs),
    /// List units visible to the current user
    List(ListArgs),
    /// Show unit details and its checklist
    Show(UnitArgs),
    /// Create a unit (admin)
    Create(CreateArgs),
    /// Print suggested tasks for a description without creating anything
    Suggest(SuggestArgs),
    /// Flip a task between done and not done
    Toggle(TaskRefArgs),
    /// Add, remove or list photo proofs
    Photo(PhotoCmd),
    /// Submit a unit for review (cleaner)
    Submit(UnitArgs),
    /// Approve a submitted unit (admin)
    Approve(UnitArgs),
    /// Send a submitted unit back for rework (admin)
    Reject(UnitArgs),
    /// Re-open an approved unit (admin)
    Reopen(UnitArgs),
    /// View or edit config.toml
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Workspace / session args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Workspace name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Rewrite config.toml even if .cleancommand/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Email address (case-insensitive)
    pub email: String,
}

#[derive(Args)]
pub struct UsersArgs {
    /// Only show users with this role (admin, cleaner)
    #[arg(long)]
    pub role: Option<String>,
}

// ---------------------------------------------------------------------------
// Unit args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Filter by status (all, open, submitted, rework, success)
    #[arg(long, default_value = "all")]
    pub status: String,
    /// Regex matched against unit name and address
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct UnitArgs {
    /// Unit ID
    pub unit: String,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Unit name
    #[arg(long)]
    pub name: String,
    /// Street address
    #[arg(long, default_value = "")]
    pub address: String,
    /// Deadline, shown as entered
    #[arg(long, default_value = "12:00 PM")]
    pub deadline: String,
    /// Assign to this cleaner (user ID)
    #[arg(long)]
    pub assign: Option<String>,
    /// Task as TYPE:title, e.g. "INVENTORY:Count towels" (repeatable)
    #[arg(long = "task")]
    pub tasks: Vec<String>,
    /// Generate the checklist with the suggestion service
    #[arg(long)]
    pub generate: bool,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Free-text unit description
    pub description: String,
}

// ---------------------------------------------------------------------------
// Checklist args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskRefArgs {
    /// Unit ID
    pub unit: String,
    /// Task ID
    pub task: String,
}

#[derive(Args)]
pub struct PhotoCmd {
    #[command(subcommand)]
    pub action: PhotoAction,
}

#[derive(Subcommand)]
pub enum PhotoAction {
    /// Attach an image file (stored inline) or an image URL
    Add(PhotoAddArgs),
    /// Remove the proof at a 0-based index
    Rm(PhotoRmArgs),
    /// List proofs on a task
    List(TaskRefArgs),
}

#[derive(Args)]
pub struct PhotoAddArgs {
    /// Unit ID
    pub unit: String,
    /// Task ID
    pub task: String,
    /// Image file to embed
    #[arg(required_unless_present = "url", conflicts_with = "url")]
    pub file: Option<String>,
    /// Store this image URL instead of embedding a file
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Args)]
pub struct PhotoRmArgs {
    /// Unit ID
    pub unit: String,
    /// Task ID
    pub task: String,
    /// Index of the proof to remove (0-based)
    pub index: usize,
}

// ---------------------------------------------------------------------------
// Config args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set a value, e.g. `suggestions.model gemini-2.5-flash`
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}
