mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::storage::now_millis;
use crate::io::workspace::{self, Workspace, WorkspaceError};
use crate::model::unit::Unit;
use crate::model::user::User;
use crate::ops::lifecycle::{self, UnitAction};
use crate::ops::suggest::{SuggestionClient, TaskSuggester};
use crate::ops::task_ops::{self, ProofAdded};
use crate::ops::unit_ops::{self, UnitDraft};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.workspace_dir.as_deref())?;

    match cli.command {
        // Init runs before workspace discovery
        Commands::Init(args) => cmd_init(args, &start),

        // Session
        Commands::Login(args) => cmd_login(&start, args, json),
        Commands::Logout => cmd_logout(&start),
        Commands::Whoami => cmd_whoami(&start, json),
        Commands::Users(args) => cmd_users(&start, args, json),

        // Read commands
        Commands::List(args) => cmd_list(&start, args, json),
        Commands::Show(args) => cmd_show(&start, args, json),
        Commands::Suggest(args) => cmd_suggest(&start, args, json),

        // Write commands
        Commands::Create(args) => cmd_create(&start, args, json),
        Commands::Toggle(args) => cmd_toggle(&start, args, json),
        Commands::Photo(cmd) => match cmd.action {
            PhotoAction::Add(args) => cmd_photo_add(&start, args, json),
            PhotoAction::Rm(args) => cmd_photo_rm(&start, args, json),
            PhotoAction::List(args) => cmd_photo_list(&start, args, json),
        },

        // Review
        Commands::Submit(args) => cmd_transition(&start, args, UnitAction::Submit, json),
        Commands::Approve(args) => cmd_transition(&start, args, UnitAction::Approve, json),
        Commands::Reject(args) => cmd_transition(&start, args, UnitAction::Reject, json),
        Commands::Reopen(args) => cmd_transition(&start, args, UnitAction::Reopen, json),

        Commands::Config(cmd) => match cmd.action {
            ConfigAction::Show => cmd_config_show(&start, json),
            ConfigAction::Set(args) => cmd_config_set(&start, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the directory to start workspace discovery from (-C or cwd)
fn start_dir(override_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match override_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

fn open_workspace(start: &Path) -> Result<Workspace, WorkspaceError> {
    let root = workspace::discover_workspace(start)?;
    debug!(root = %root.display(), "opening workspace");
    workspace::load_workspace(&root)
}

/// The logged-in user, or an error telling the caller to log in
fn require_user(ws: &Workspace) -> Result<User, Box<dyn std::error::Error>> {
    ws.storage
        .get_current_user()?
        .ok_or_else(|| "not logged in (run `ccmd login <email>`)".into())
}

fn load_unit(ws: &Workspace, unit_id: &str) -> Result<Unit, Box<dyn std::error::Error>> {
    ws.storage
        .get_unit(unit_id)?
        .ok_or_else(|| format!("unit not found: {}", unit_id).into())
}

/// Units a cleaner isn't assigned to are invisible to them
fn load_visible_unit(ws: &Workspace, user: &User, unit_id: &str) -> Result<Unit, Box<dyn std::error::Error>> {
    let unit = load_unit(ws, unit_id)?;
    if user.is_cleaner() && !unit.is_assigned_to(&user.id) {
        return Err(format!("unit not found: {}", unit_id).into());
    }
    Ok(unit)
}

/// Write the working copy back and return the stored version
fn save_unit(ws: &Workspace, unit: &Unit) -> Result<Unit, Box<dyn std::error::Error>> {
    ws.storage
        .update_unit(unit)?
        .ok_or_else(|| format!("unit not found: {}", unit.id).into())
}

fn unit_detail_json(ws: &Workspace, user: &User, unit: &Unit) -> Result<UnitDetailJson, Box<dyn std::error::Error>> {
    let users = ws.storage.get_users()?;
    Ok(UnitDetailJson {
        summary: unit_summary_json(
            unit,
            unit_ops::assignee_name(unit, &users),
            unit_ops::progress(unit),
        ),
        editable: lifecycle::can_edit_unit(user, unit),
        actions: lifecycle::available_actions(user, unit),
        tasks: unit.tasks.iter().map(task_to_json).collect(),
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run a future to completion on a throwaway current-thread runtime
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, std::io::Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Read an image file into an inline `data:` URL
fn encode_image(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("could not read {}: {}", path.display(), e))?;
    Ok(format!("data:{};base64,{}", mime_for(path), STANDARD.encode(bytes)))
}

// ---------------------------------------------------------------------------
// Session handlers
// ---------------------------------------------------------------------------

fn cmd_login(start: &Path, args: LoginArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = ws.storage.login(&args.email)?.ok_or(
        "User not found. Try \"admin@clean.com\" or \"john@clean.com\"",
    )?;
    if json {
        return print_json(&user);
    }
    println!("Logged in as {} ({})", user.name, user.role);
    Ok(())
}

fn cmd_logout(start: &Path) -> CmdResult {
    let ws = open_workspace(start)?;
    ws.storage.logout()?;
    println!("Logged out");
    Ok(())
}

fn cmd_whoami(start: &Path, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = ws.storage.get_current_user()?;
    if json {
        return print_json(&user);
    }
    match user {
        Some(user) => println!("{}", format_user_line(&user)),
        None => println!("not logged in"),
    }
    Ok(())
}

fn cmd_users(start: &Path, args: UsersArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let role = args.role.as_deref().map(parse_role).transpose()?;
    let users: Vec<User> = ws
        .storage
        .get_users()?
        .into_iter()
        .filter(|u| role.is_none_or(|r| u.role == r))
        .collect();
    if json {
        return print_json(&users);
    }
    for user in &users {
        println!("{}", format_user_line(user));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(start: &Path, args: ListArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = require_user(&ws)?;
    let filter = unit_ops::parse_status_filter(&args.status)?;
    let search = args
        .search
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| format!("invalid --search pattern: {}", e))?;

    let units = ws.storage.get_units()?;
    let visible = unit_ops::visible_units(&user, &units, filter, search.as_ref());

    if json {
        let users = ws.storage.get_users()?;
        let out: Vec<_> = visible
            .iter()
            .map(|u| unit_summary_json(u, unit_ops::assignee_name(u, &users), unit_ops::progress(u)))
            .collect();
        return print_json(&out);
    }

    let heading = if user.is_admin() { "All Units" } else { "My Assignments" };
    println!("== {} ==", heading);
    if visible.is_empty() {
        println!("No units found matching criteria.");
    }
    for unit in visible {
        println!("{}", format_unit_line(unit, unit_ops::progress(unit)));
    }
    Ok(())
}

fn cmd_show(start: &Path, args: UnitArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = require_user(&ws)?;
    let unit = load_visible_unit(&ws, &user, &args.unit)?;

    if json {
        return print_json(&unit_detail_json(&ws, &user, &unit)?);
    }

    let users = ws.storage.get_users()?;
    let lines = format_unit_detail(
        &unit,
        &unit_ops::assignee_name(&unit, &users),
        unit_ops::progress(&unit),
        lifecycle::can_edit_unit(&user, &unit),
        &lifecycle::available_actions(&user, &unit),
    );
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_suggest(start: &Path, args: SuggestArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let client = SuggestionClient::from_config(&ws.config.suggestions)?;
    let suggestions = block_on(client.generate_tasks_for_unit(&args.description))?;

    if json {
        return print_json(&suggestions);
    }
    if suggestions.is_empty() {
        println!("No suggestions returned.");
    }
    for s in &suggestions {
        println!("{}", format_suggestion_line(s.task_type, &s.title));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_create(start: &Path, args: CreateArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = require_user(&ws)?;
    if !user.is_admin() {
        return Err(unit_ops::UnitError::NotAdmin.into());
    }
    let now = now_millis();

    let entries = args
        .tasks
        .iter()
        .map(|s| parse_task_arg(s))
        .collect::<Result<Vec<_>, _>>()?;
    let mut tasks = unit_ops::manual_tasks(&entries, now);

    if args.generate {
        let client = SuggestionClient::from_config(&ws.config.suggestions)?;
        let generated = block_on(unit_ops::generate_tasks(&client, &args.name, &args.address, now))?;
        if generated.is_empty() {
            eprintln!("warning: no tasks were generated");
        }
        tasks.extend(generated);
    }

    let users = ws.storage.get_users()?;
    let draft = UnitDraft {
        name: args.name.trim().to_string(),
        address: args.address.trim().to_string(),
        deadline: args.deadline,
        assigned_user_id: args.assign.filter(|a| !a.is_empty()),
        tasks,
    };
    let unit = unit_ops::create_unit(&user, draft, &users, now)?;
    ws.storage.add_unit(unit.clone())?;

    if json {
        return print_json(&unit_detail_json(&ws, &user, &unit)?);
    }
    println!("Created {} \"{}\" with {} tasks", unit.id, unit.name, unit.tasks.len());
    for task in &unit.tasks {
        println!("  {}", format_task_line(task));
    }
    Ok(())
}

fn cmd_toggle(start: &Path, args: TaskRefArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = require_user(&ws)?;
    let mut unit = load_visible_unit(&ws, &user, &args.unit)?;

    let done = task_ops::toggle_task(&user, &mut unit, &args.task)?;
    let unit = save_unit(&ws, &unit)?;

    if json {
        return print_json(&unit_detail_json(&ws, &user, &unit)?);
    }
    println!("{} {} → {}", unit.id, args.task, if done { "done" } else { "not done" });
    Ok(())
}

fn cmd_photo_add(start: &Path, args: PhotoAddArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = require_user(&ws)?;
    let mut unit = load_visible_unit(&ws, &user, &args.unit)?;

    let proof = match (args.url, args.file) {
        (Some(url), _) => url,
        (None, Some(file)) => encode_image(Path::new(&file))?,
        (None, None) => return Err("pass an image file or --url".into()),
    };

    match task_ops::add_photo(&user, &mut unit, &args.task, proof)? {
        ProofAdded::Added(count) => {
            let unit = save_unit(&ws, &unit)?;
            if json {
                return print_json(&unit_detail_json(&ws, &user, &unit)?);
            }
            println!("{} {}: photo added ({}/{})", unit.id, args.task, count, crate::model::MAX_PHOTO_PROOFS);
        }
        ProofAdded::CapReached => {
            if json {
                return print_json(&unit_detail_json(&ws, &user, &unit)?);
            }
            println!(
                "{} {}: already has {} photos, nothing added",
                unit.id,
                args.task,
                crate::model::MAX_PHOTO_PROOFS
            );
        }
    }
    Ok(())
}

fn cmd_photo_rm(start: &Path, args: PhotoRmArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = require_user(&ws)?;
    let mut unit = load_visible_unit(&ws, &user, &args.unit)?;

    let removed = task_ops::remove_photo(&user, &mut unit, &args.task, args.index)?;
    if removed.is_some() {
        unit = save_unit(&ws, &unit)?;
    }

    if json {
        return print_json(&unit_detail_json(&ws, &user, &unit)?);
    }
    match removed {
        Some(_) => println!("{} {}: removed photo {}", unit.id, args.task, args.index),
        None => println!("{} {}: no photo at index {}", unit.id, args.task, args.index),
    }
    Ok(())
}

fn cmd_photo_list(start: &Path, args: TaskRefArgs, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = require_user(&ws)?;
    let unit = load_visible_unit(&ws, &user, &args.unit)?;
    let task = unit
        .task(&args.task)
        .ok_or_else(|| format!("task not found: {}", args.task))?;

    if json {
        let proofs: Vec<_> = task
            .photo_proofs
            .iter()
            .enumerate()
            .map(|(index, proof)| ProofJson {
                index,
                proof: proof.clone(),
            })
            .collect();
        return print_json(&proofs);
    }
    if task.photo_proofs.is_empty() {
        println!("no photos attached");
    }
    for (i, proof) in task.photo_proofs.iter().enumerate() {
        println!("{}", format_proof(i, proof));
    }
    Ok(())
}

fn cmd_transition(start: &Path, args: UnitArgs, action: UnitAction, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    let user = require_user(&ws)?;
    let mut unit = load_visible_unit(&ws, &user, &args.unit)?;

    let previous = lifecycle::apply(&user, &mut unit, action)?;
    let unit = save_unit(&ws, &unit)?;

    if json {
        return print_json(&unit_detail_json(&ws, &user, &unit)?);
    }
    if action == UnitAction::Submit {
        println!("Project submitted for review!");
    }
    println!("{} {} → {}", unit.id, previous, unit.status);
    Ok(())
}

// ---------------------------------------------------------------------------
// Config handlers
// ---------------------------------------------------------------------------

fn cmd_config_show(start: &Path, json: bool) -> CmdResult {
    let ws = open_workspace(start)?;
    if json {
        return print_json(&ws.config);
    }
    print!("{}", toml::to_string_pretty(&ws.config)?);
    let key_state = if ws.config.suggestions.api_key().is_some() {
        "set"
    } else {
        "not set"
    };
    println!(
        "\n# ${} is {}",
        ws.config.suggestions.api_key_env, key_state
    );
    Ok(())
}

fn cmd_config_set(start: &Path, args: ConfigSetArgs) -> CmdResult {
    let root = workspace::discover_workspace(start)?;
    let data_dir = root.join(workspace::WORKSPACE_DIR);
    let mut doc = config_io::read_config_doc(&data_dir)?;
    config_io::set_value(&mut doc, &args.key, &args.value)?;
    // refuse to write something the loader can't read back
    toml::from_str::<crate::model::config::WorkspaceConfig>(&doc.to_string())?;
    config_io::write_config(&data_dir, &doc)?;
    println!("{} = {}", args.key, args.value);
    Ok(())
}
