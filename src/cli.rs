//! CLI argument parsing with clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sheet Import - spreadsheet translation import for resource projects
///
/// Opens the Import-from-spreadsheet wizard or the language-columns dialog
/// for a project file in the terminal.
#[derive(Parser, Debug)]
#[command(name = "sheet-import")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Import translations from a spreadsheet into the project's resource files
    Import {
        /// Project file
        #[arg(short, long)]
        project: PathBuf,

        /// Spreadsheet to preselect, overriding the remembered one
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Restrict the import to these file groups (repeatable)
        #[arg(short, long = "group")]
        group: Vec<String>,
    },

    /// Choose which language columns the project displays
    Columns {
        /// Project file
        #[arg(short, long)]
        project: PathBuf,
    },

    /// Write a commented sample configuration file
    InitConfig {
        /// Output path (default: Config/sheet-import.toml next to the executable)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Command name for log naming
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Command::Import { .. } => "Import",
            Command::Columns { .. } => "Columns",
            Command::InitConfig { .. } => "InitConfig",
        }
    }

    /// Project file of the dialog commands
    pub fn project(&self) -> Option<&PathBuf> {
        match &self.command {
            Command::Import { project, .. } | Command::Columns { project } => Some(project),
            Command::InitConfig { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_command() {
        let cli = Cli::try_parse_from([
            "sheet-import",
            "-v",
            "import",
            "--project",
            "demo.toml",
            "--file",
            "book.xlsx",
            "-g",
            "Strings",
            "--group",
            "Menus",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.command_name(), "Import");
        assert_eq!(
            cli.command,
            Command::Import {
                project: PathBuf::from("demo.toml"),
                file: Some(PathBuf::from("book.xlsx")),
                group: vec!["Strings".into(), "Menus".into()],
            }
        );
    }

    #[test]
    fn test_columns_command_with_global_flags() {
        let cli = Cli::try_parse_from([
            "sheet-import",
            "columns",
            "-p",
            "demo.toml",
            "--json-log",
            "-C",
            "custom.toml",
        ])
        .unwrap();

        assert!(cli.json_log);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(cli.project(), Some(&PathBuf::from("demo.toml")));
        assert_eq!(cli.command_name(), "Columns");
    }

    #[test]
    fn test_init_config_command() {
        let cli = Cli::try_parse_from(["sheet-import", "init-config", "--force"]).unwrap();
        assert_eq!(cli.command_name(), "InitConfig");
        assert_eq!(
            cli.command,
            Command::InitConfig {
                output: None,
                force: true,
            }
        );
        assert!(cli.project().is_none());

        let cli =
            Cli::try_parse_from(["sheet-import", "init-config", "-o", "my.toml"]).unwrap();
        assert_eq!(
            cli.command,
            Command::InitConfig {
                output: Some(PathBuf::from("my.toml")),
                force: false,
            }
        );
    }

    #[test]
    fn test_project_is_required() {
        assert!(Cli::try_parse_from(["sheet-import", "import"]).is_err());
        assert!(Cli::try_parse_from(["sheet-import"]).is_err());
    }
}
