use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::workspace::{self, WORKSPACE_DIR};

const CONFIG_TOML_TEMPLATE: &str = r##"[workspace]
name = "{name}"

# --- Task suggestions ---
# Checklists can be generated by a hosted model when creating a unit
# (`ccmd create --generate`). Without an API key a built-in two-item
# checklist is used instead.

[suggestions]
model = "gemini-2.5-flash"
endpoint = "https://generativelanguage.googleapis.com/v1beta"
# environment variable that holds the API key
api_key_env = "API_KEY"
timeout_secs = 30
"##;

/// Infer a workspace name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_config_toml(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    CONFIG_TOML_TEMPLATE.replace("{name}", &escaped)
}

pub fn cmd_init(args: InitArgs, cwd: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = cwd.join(WORKSPACE_DIR);
    if data_dir.is_dir() && !args.force {
        return Err(format!(
            "workspace already exists in ./{}/ (use --force to rewrite config.toml)",
            WORKSPACE_DIR
        )
        .into());
    }

    if !data_dir.is_dir()
        && let Some(parent) = cwd.parent()
        && let Ok(parent_root) = workspace::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join(WORKSPACE_DIR).display()
        );
        eprintln!("Creating new workspace in ./{}/", WORKSPACE_DIR);
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "CleanCommand".to_string())
    });

    workspace::create_workspace(cwd, &render_config_toml(&name))?;

    println!("Initialized workspace \"{}\" in ./{}/", name, WORKSPACE_DIR);
    println!("Log in with: ccmd login admin@clean.com");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::WorkspaceConfig;

    #[test]
    fn infer_name_title_cases() {
        assert_eq!(infer_name("sunset-crew"), "Sunset Crew");
        assert_eq!(infer_name("harbor_view"), "Harbor View");
        assert_eq!(infer_name("x"), "X");
    }

    #[test]
    fn template_parses() {
        let config: WorkspaceConfig = toml::from_str(&render_config_toml("Say \"hi\"")).unwrap();
        assert_eq!(config.workspace.name, "Say \"hi\"");
        assert_eq!(config.suggestions.timeout_secs, 30);
        assert_eq!(config.suggestions.api_key_env, "API_KEY");
    }
}
