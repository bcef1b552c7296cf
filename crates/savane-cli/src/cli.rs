use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use savane_core::TrackerKind;

pub const DEFAULT_INSTANCE: &str = "https://savannah.nongnu.org";

#[derive(Debug, Parser)]
#[command(
    name = "savane2github",
    author,
    version,
    about = "Savane to GitHub migration tool",
    long_about = "Migrate the bug, task and patch trackers of a Savane project \
                  (or a SourceForge tracker export) to GitHub issues.\n\n\
                  The usual sequence is list, download, import, dump and export. \
                  Every step reads and writes files below a directory named after the project."
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: Global,
}

#[derive(Debug, Clone, Args)]
pub struct Global {
    /// URL of the Savane server instance
    #[arg(long, global = true, default_value = DEFAULT_INSTANCE)]
    pub instance: String,

    /// Name of the Savane project, also the name of the working directory
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Username for logging in to the Savane instance
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Password for logging in to the Savane instance
    #[arg(long, env = "SAVANE_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Enable verbose command-line output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn project(&self) -> Result<&str> {
        match self.project.as_deref() {
            Some(project) if !project.is_empty() => Ok(project),
            _ => bail!("--project is required for this command"),
        }
    }

    /// Login credentials, when both are given
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct Kinds {
    /// Tracker to operate on (bug, task or patch); repeat for several
    #[arg(long = "kind", short = 'k', required = true)]
    pub kinds: Vec<TrackerKind>,
}

/// Tracker files to read, named by kind or by file name
#[derive(Debug, Clone, Args)]
pub struct TrackerFiles {
    /// Tracker to operate on (bug, task or patch); repeat for several
    #[arg(long = "kind", short = 'k', required_unless_present = "trackers")]
    pub kinds: Vec<TrackerKind>,

    /// Tracker file name such as 'feature-requests' for trackers_feature-requests.json,
    /// as written by import-sf; repeat for several
    #[arg(long = "tracker", short = 't', value_name = "NAME", value_parser = parse_tracker_name)]
    pub trackers: Vec<String>,
}

impl TrackerFiles {
    /// Plural names of the selected tracker files, kinds first
    pub fn names(&self) -> Vec<String> {
        self.kinds
            .iter()
            .map(|kind| kind.plural().to_string())
            .chain(self.trackers.iter().cloned())
            .collect()
    }
}

fn parse_tracker_name(name: &str) -> Result<String, String> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(name.to_string())
    } else {
        Err(format!("invalid tracker name '{}'", name))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the JSON list of items from the tracker browse pages
    List(Kinds),

    /// Download the HTML page of every listed item
    Download(Kinds),

    /// Create the JSON tracker file from the downloaded pages
    Import(Kinds),

    /// Create a JSON tracker file from a SourceForge tracker export
    #[command(name = "import-sf")]
    ImportSf(ImportSfArgs),

    /// Print the contents of the JSON tracker file
    Dump(TrackerFiles),

    /// Create GitHub issues from the JSON tracker file
    Export(ExportArgs),

    /// Convert an HTML fragment file to Markdown and print it
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
pub struct ImportSfArgs {
    /// Tracker JSON file of an unpacked SourceForge project export, e.g. bugs.json
    pub export: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub trackers: TrackerFiles,

    /// Full name of the GitHub repository such as 'user/name'
    #[arg(long)]
    pub repo_path: String,

    /// GitHub access token used to create the issues
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Do not make actual changes to GitHub
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// HTML file holding the fragment to convert
    pub file: PathBuf,

    /// Keep the enclosing list kind for nested lists
    #[arg(long)]
    pub scoped_lists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_kinds() {
        let app = App::try_parse_from([
            "savane2github",
            "--project",
            "avrdude",
            "list",
            "--kind",
            "bugs",
            "-k",
            "patch",
        ])
        .unwrap();

        assert_eq!(app.global.project().unwrap(), "avrdude");
        assert_eq!(app.global.instance, DEFAULT_INSTANCE);
        match app.command {
            Command::List(kinds) => {
                assert_eq!(kinds.kinds, vec![TrackerKind::Bug, TrackerKind::Patch])
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result = App::try_parse_from(["savane2github", "dump", "--kind", "support"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_args() {
        let app = App::try_parse_from([
            "savane2github",
            "export",
            "--kind",
            "bug",
            "--repo-path",
            "avrdudes/avrdude",
            "--access-token",
            "ghp_x",
            "--dry-run",
            "--project",
            "avrdude",
        ])
        .unwrap();

        match app.command {
            Command::Export(args) => {
                assert_eq!(args.trackers.names(), vec!["bugs"]);
                assert_eq!(args.repo_path, "avrdudes/avrdude");
                assert_eq!(args.access_token.as_deref(), Some("ghp_x"));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_missing_project() {
        let app = App::try_parse_from(["savane2github", "convert", "page.html"]).unwrap();
        assert!(app.global.project().is_err());
    }

    #[test]
    fn test_dump_tracker_by_name() {
        let app = App::try_parse_from([
            "savane2github",
            "dump",
            "--tracker",
            "feature-requests",
            "-k",
            "task",
        ])
        .unwrap();

        match app.command {
            Command::Dump(files) => {
                assert_eq!(files.names(), vec!["tasks", "feature-requests"])
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_dump_needs_a_tracker() {
        assert!(App::try_parse_from(["savane2github", "dump"]).is_err());
        assert!(App::try_parse_from(["savane2github", "dump", "--tracker", "../bugs"]).is_err());
    }

    fn global(username: Option<&str>, password: Option<&str>) -> Global {
        Global {
            instance: DEFAULT_INSTANCE.to_string(),
            project: None,
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            verbose: false,
        }
    }

    #[test]
    fn test_credentials_need_both_parts() {
        assert_eq!(global(Some("jane"), None).credentials(), None);
        assert_eq!(global(None, Some("secret")).credentials(), None);
        assert_eq!(
            global(Some("jane"), Some("secret")).credentials(),
            Some(("jane", "secret"))
        );
    }
}
