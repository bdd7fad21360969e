use std::io;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use rentbook_config::{resolve_home, Config, ConfigError, ConfigManager};
use rentbook_core::{CoreError, PaymentPolicy, ReminderThresholds, ReportOptions};
use rentbook_domain::{Money, RentBook};
use rentbook_storage_json::{JsonBookStorage, StoragePaths};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::cli::commands;
use crate::cli::io as cli_io;
use crate::cli::output::{self, OutputPreferences};
use crate::cli::registry::{CommandEntry, CommandRegistry};
use crate::manager::{BookManager, ManagerError};
use crate::utils::clock::clock_from_env;

/// Environment variable switching the shell to line-by-line stdin mode.
pub const SCRIPT_ENV: &str = "RENTBOOK_CLI_SCRIPT";

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("input error: {0}")]
    Input(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No book open. Use `book new <name>` or `book open <name>` first.")]
    BookNotLoaded,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::NoBookOpen => CommandError::BookNotLoaded,
            ManagerError::Core(err) => CommandError::Core(err),
            other => CommandError::Message(other.to_string()),
        }
    }
}

/// Shell state shared by every command handler.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: Arc<RwLock<BookManager>>,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub running: bool,
    pub last_command: Option<String>,
}

impl ShellContext {
    /// Builds the context from `$RENTBOOK_HOME` and reopens the last book.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let home = resolve_home();
        let storage = JsonBookStorage::new(StoragePaths::under(&home))?;
        let config_manager = ConfigManager::with_home(&home)?;
        let config = config_manager.load()?;
        let clock = clock_from_env().map_err(CliError::Input)?;
        let manager = BookManager::new(Box::new(storage), clock, config.cache_ttl_secs);

        output::set_preferences(OutputPreferences {
            color_enabled: config.ui_color_enabled && mode == CliMode::Interactive,
            quiet: false,
        });

        let mut context = Self {
            mode,
            registry: CommandRegistry::with_entries(commands::all_entries()),
            manager: Arc::new(RwLock::new(manager)),
            config_manager,
            config,
            running: true,
            last_command: None,
        };
        context.reopen_last_book();
        tracing::debug!(home = %home.display(), ?mode, "shell ready");
        Ok(context)
    }

    fn reopen_last_book(&mut self) {
        let Some(name) = self.config.last_opened_book.clone() else {
            return;
        };
        let result = self
            .manager_mut()
            .and_then(|mut manager| manager.open(&name).map_err(CommandError::from));
        match result {
            Ok(warnings) => {
                for warning in warnings {
                    cli_io::print_warning(warning);
                }
            }
            Err(err) => {
                cli_io::print_warning(format!("Could not reopen book `{name}`: {err}"));
            }
        }
    }

    pub fn manager(&self) -> Result<RwLockReadGuard<'_, BookManager>, CommandError> {
        self.manager
            .read()
            .map_err(|_| CommandError::Message("book manager lock poisoned".into()))
    }

    pub fn manager_mut(&self) -> Result<RwLockWriteGuard<'_, BookManager>, CommandError> {
        self.manager
            .write()
            .map_err(|_| CommandError::Message("book manager lock poisoned".into()))
    }

    /// Runs a read-only view over the open book.
    pub fn with_book<T>(
        &self,
        view: impl FnOnce(&RentBook) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        let manager = self.manager()?;
        view(manager.current()?)
    }

    /// Applies and persists a change to the open book.
    pub fn mutate_book<T>(
        &self,
        change: impl FnOnce(&mut RentBook) -> Result<T, CoreError>,
    ) -> Result<T, CommandError> {
        Ok(self.manager_mut()?.mutate(change)?)
    }

    pub fn today(&self) -> Result<NaiveDate, CommandError> {
        Ok(self.manager()?.today())
    }

    pub fn money(&self, amount: Money) -> String {
        amount.format_with(&self.config.currency)
    }

    pub fn payment_policy(&self) -> PaymentPolicy {
        PaymentPolicy {
            allow_adjustments: self.config.allow_adjustments,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            thresholds: ReminderThresholds::new(
                self.config.reminder_warning_days,
                self.config.reminder_critical_days,
            ),
            recent_limit: self.config.recent_tenants_limit,
        }
    }

    /// Persists the configuration and re-applies settings that affect live state.
    pub fn save_config(&mut self, config: Config) -> Result<(), CommandError> {
        self.config_manager.save(&config)?;
        if config.cache_ttl_secs != self.config.cache_ttl_secs {
            self.manager_mut()?.set_cache_ttl(config.cache_ttl_secs);
        }
        output::set_preferences(OutputPreferences {
            color_enabled: config.ui_color_enabled && self.mode == CliMode::Interactive,
            ..output::current_preferences()
        });
        self.config = config;
        Ok(())
    }

    pub fn remember_book(&mut self, name: Option<&str>) -> Result<(), CommandError> {
        let mut config = self.config.clone();
        config.last_opened_book = name.map(str::to_string);
        self.save_config(config)
    }

    pub fn prompt(&self) -> String {
        match self.manager().ok().and_then(|m| m.current_name().map(str::to_string)) {
            Some(name) => format!("rentbook({name})> "),
            None => "rentbook> ".to_string(),
        }
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    /// Asks before destructive actions. Scripts are never prompted.
    pub fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(prompt)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        self.confirm("Exit rentbook?").map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::BookNotLoaded => {
                cli_io::print_error(CommandError::BookNotLoaded);
                cli_io::print_hint("Try `book new \"My Flats\"` to get started.");
            }
            other => cli_io::print_error(other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_errors_map_to_command_errors() {
        assert!(matches!(
            CommandError::from(ManagerError::NoBookOpen),
            CommandError::BookNotLoaded
        ));
        assert!(matches!(
            CommandError::from(ManagerError::Core(CoreError::Conflict("x".into()))),
            CommandError::Core(CoreError::Conflict(_))
        ));
        assert!(matches!(
            CommandError::from(ManagerError::BackupNotFound("b".into())),
            CommandError::Message(_)
        ));
    }
}
