//! Sheet Import - spreadsheet translation import for resource projects
//!
//! Opens the Import-from-spreadsheet wizard or the language-columns dialog
//! for a project file, then reports the outcome on the console.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use sheet_import::{
    AppConfig, Cli, Command, Form, ImportBackend, ImportWizard, LanguageColumnsDialog, Project,
    SettingsStore, SystemViewer, TuiApp, WizardOutcome, WorkbookBackend, init_locale, open_form,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Initialize i18n for this binary
rust_i18n::i18n!("locales", fallback = "en");

/// Dialog accepted
const EXIT_ACCEPTED: i32 = 0;
/// Command failed
const EXIT_FAILURE: i32 = 1;
/// Dialog cancelled
const EXIT_CANCELLED: i32 = 2;

/// Global settings store, under the Config directory
const GLOBAL_SETTINGS_FILE: &str = "global-settings.json";
/// Default configuration file, under the Config directory
const CONFIG_FILE: &str = "sheet-import.toml";

// CLI Output Module
mod cli_output {
    //! CLI 输出美化模块
    //!
    //! 为命令行输出提供统一的颜色和格式样式。

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI 主题颜色
    pub struct CliTheme;

    impl CliTheme {
        /// 成功颜色（绿色）
        pub const SUCCESS: Color = Color::Green;
        /// 警告颜色（黄色）
        pub const WARNING: Color = Color::Yellow;
        /// 错误颜色（红色）
        pub const ERROR: Color = Color::Red;
        /// 提示颜色（暗灰色）
        pub const HINT: Color = Color::DarkGrey;
        /// 强调颜色（青色）
        pub const ACCENT: Color = Color::Cyan;
    }

    /// 打印分隔线
    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    /// 打印状态消息
    pub fn print_status(msg: &str, color: Color) {
        let _ = stdout().execute(Print(style(format!("{}\n", msg)).with(color).bold()));
    }

    /// 打印错误消息
    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// 打印统计项
    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印日志文件路径
    pub fn print_log_path(label: &str, path: &str) {
        let _ = stdout().execute(Print(style("  📁 ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style(format!("{} ", label)).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }
}

/// Convenience macro for translation
macro_rules! t {
    ($key:expr) => {
        rust_i18n::t!($key)
    };
    ($key:expr, $($tt:tt)*) => {
        rust_i18n::t!($key, $($tt)*)
    };
}

fn main() {
    // Initialize locale based on system settings
    init_locale();

    let cli = Cli::parse();

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            cli_output::print_error(&format!("{:#}", e));
            EXIT_FAILURE
        }
    };

    std::process::exit(exit_code);
}

/// Run the selected command; returns the process exit code
fn run(cli: &Cli) -> Result<i32> {
    let exe_dir = get_executable_dir()?;
    // init-config may be replacing a config file that no longer parses
    let config = match cli.command {
        Command::InitConfig { .. } => load_config(cli, &exe_dir).unwrap_or_default(),
        _ => load_config(cli, &exe_dir)?,
    };
    let log_path = get_log_path(&exe_dir, &config, cli);

    // The TUI owns the terminal, so logs go to the file only
    let guard = setup_file_only_logging(cli, &log_path)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = cli.command_name(),
        "Sheet Import starting"
    );
    if cli.verbose {
        info!(?config, "Configuration loaded");
    }

    let result = match &cli.command {
        Command::Import {
            project,
            file,
            group,
        } => run_import(&config, &exe_dir, project, file.as_deref(), group),
        Command::Columns { project } => run_columns(&config, project),
        Command::InitConfig { output, force } => {
            run_init_config(&exe_dir, output.as_deref(), *force)
        }
    };

    match &result {
        Ok(code) => info!(exit_code = code, log_file = %log_path.display(), "Session complete"),
        Err(e) => error!(error = %format!("{:#}", e), "Command failed"),
    }

    // Flush the log file before the process exits
    drop(guard);
    cli_output::print_log_path(&t!("log_saved_to"), &log_path.display().to_string());

    result
}

/// Open the import wizard for `project_path`
fn run_import(
    config: &AppConfig,
    exe_dir: &Path,
    project_path: &Path,
    file: Option<&Path>,
    groups: &[String],
) -> Result<i32> {
    let project = Project::load(project_path)
        .with_context(|| format!("{} {}", t!("cli_project_load_failed"), project_path.display()))?;
    let allowed = project.select_file_groups(groups)?;

    let mut project_settings = SettingsStore::load(&project.settings_path())?;
    let mut global_settings =
        SettingsStore::load(&exe_dir.join("Config").join(GLOBAL_SETTINGS_FILE))?;

    let backend: Arc<dyn ImportBackend> = Arc::new(WorkbookBackend::new());
    let mut wizard = ImportWizard::new(
        Arc::new(project),
        allowed,
        backend,
        Arc::new(SystemViewer::new()),
    )
    .with_extensions(config.spreadsheet_extensions.clone())
    .with_cancel_confirmation(config.confirm_cancel);

    open_form(&mut wizard, &project_settings);
    if let Some(file) = file {
        wizard.set_source_path(&file.display().to_string());
    }

    let outcome = {
        let mut app = TuiApp::new(config.tick_rate())?;
        app.run_import(&mut wizard, &mut global_settings)?
    };

    wizard.view_to_model(&mut project_settings);
    project_settings.save()?;
    global_settings.save()?;

    use cli_output::*;
    match outcome {
        WizardOutcome::Accepted => {
            print_separator();
            print_status(&t!("cli_import_complete"), CliTheme::SUCCESS);
            if let Some(summary) = wizard.summary() {
                for (label, value, color) in [
                    (t!("stat_file_groups"), summary.file_groups, CliTheme::ACCENT),
                    (t!("stat_languages"), summary.languages, CliTheme::ACCENT),
                    (t!("stat_entries"), summary.entries, CliTheme::SUCCESS),
                    (t!("stat_files_written"), summary.files_written, CliTheme::SUCCESS),
                ] {
                    print_stat(&label, &value.to_string(), color);
                }
            }
            print_separator();
            Ok(EXIT_ACCEPTED)
        }
        WizardOutcome::Cancelled => {
            print_status(&t!("cli_import_cancelled"), CliTheme::WARNING);
            Ok(EXIT_CANCELLED)
        }
    }
}

/// Open the language-columns dialog for `project_path`
fn run_columns(config: &AppConfig, project_path: &Path) -> Result<i32> {
    let mut project = Project::load(project_path)
        .with_context(|| format!("{} {}", t!("cli_project_load_failed"), project_path.display()))?;

    let mut dialog = LanguageColumnsDialog::new();
    open_form(&mut dialog, &project);

    let accepted = {
        let mut app = TuiApp::new(config.tick_rate())?;
        app.run_columns(&mut dialog, &mut project)?
    };

    use cli_output::*;
    if accepted {
        project.save()?;
        print_status(&t!("cli_columns_saved"), CliTheme::SUCCESS);
        Ok(EXIT_ACCEPTED)
    } else {
        print_status(&t!("cli_columns_cancelled"), CliTheme::WARNING);
        Ok(EXIT_CANCELLED)
    }
}

/// Write the sample configuration to `output` or the default location
fn run_init_config(exe_dir: &Path, output: Option<&Path>, force: bool) -> Result<i32> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| exe_dir.join("Config").join(CONFIG_FILE));
    AppConfig::write_sample_config(&path, force)?;

    cli_output::print_status(
        &t!("cli_config_written", path = path.display()),
        cli_output::CliTheme::SUCCESS,
    );
    Ok(EXIT_ACCEPTED)
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Log file path: `<log_dir>/<Command>_<timestamp>.log`
fn get_log_path(exe_dir: &Path, config: &AppConfig, cli: &Cli) -> PathBuf {
    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| exe_dir.join("Log"));
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    log_dir.join(format!("{}_{}.log", cli.command_name(), timestamp))
}

/// Resolve config path - supports shorthand syntax
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let config_dir = exe_dir.join("Config");
    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());

    let mut in_config_dir = config_dir.join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from `--config`, the default file, or defaults
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<AppConfig> {
    if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        return Ok(AppConfig::load_from_file(&resolved_path)?);
    }

    let default_path = exe_dir.join("Config").join(CONFIG_FILE);
    if default_path.exists() {
        return Ok(AppConfig::load_from_file(&default_path)?);
    }

    Ok(AppConfig::default())
}

/// Setup logging while the TUI runs (file only, no console)
fn setup_file_only_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(guard)
}
