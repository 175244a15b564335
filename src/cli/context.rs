use std::io;
use std::path::PathBuf;

use strsim::levenshtein;
use uuid::Uuid;

use crate::cli::commands::{CommandRegistry, REGISTRY};
use crate::cli::output;
use crate::config::ConfigManager;
use crate::core::LedgerManager;
use crate::errors::{ErrorCategory, SplitError};
use crate::storage::FsImageStore;
use crate::utils::PathResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No group selected. Use `group-new`, `group-use` or `group-join` first.")]
    NoActiveGroup,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] SplitError),
    #[error("exit requested")]
    ExitRequested,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] SplitError),
    #[error("{0}")]
    Command(String),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}

/// State shared by every command of one shell session.
pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
    pub(crate) last_command: Option<String>,
    pub(crate) active_group: Option<Uuid>,
    pub(crate) base_dir: PathBuf,
    manager: LedgerManager,
    runtime: tokio::runtime::Runtime,
    registry: &'static CommandRegistry,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let base_dir = config_manager.base().to_path_buf();
        let images = FsImageStore::new(config.upload_dir_in(&base_dir), config.max_image_size)?;
        let manager = LedgerManager::new(config).with_images(std::sync::Arc::new(images));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            mode,
            running: true,
            last_command: None,
            active_group: None,
            base_dir,
            manager,
            runtime,
            registry: &REGISTRY,
        })
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    pub fn manager(&self) -> &LedgerManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut LedgerManager {
        &mut self.manager
    }

    /// Drives a service future to completion on the session runtime.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn active_group(&self) -> Result<Uuid, CommandError> {
        self.active_group.ok_or(CommandError::NoActiveGroup)
    }

    pub fn default_snapshot_path(&self) -> PathBuf {
        PathResolver::snapshot_file_in(&self.base_dir)
    }

    pub fn registry(&self) -> &'static CommandRegistry {
        self.registry
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn prompt(&self) -> String {
        match self.active_group {
            Some(id) => format!("split [{}]> ", short_id(id)),
            None => "split> ".to_string(),
        }
    }

    pub(crate) fn dispatch(&mut self, command: &str, raw: &str, args: &[&str]) -> Result<LoopControl, CommandError> {
        match self.registry.get(command) {
            Some(definition) => match (definition.handler)(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            },
            None => {
                self.suggest_command(raw);
                Ok(LoopControl::Continue)
            }
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, input), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            CommandError::Core(err) => {
                let prefix = match err.category() {
                    ErrorCategory::InputValidation => "Rejected",
                    ErrorCategory::InsufficientData => "Not enough data",
                    ErrorCategory::NotFound => "Not found",
                    ErrorCategory::Internal => "Internal error",
                };
                output::error(format!("{prefix}: {}", err.reason()));
            }
            other => output::error(other),
        }
    }
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}
