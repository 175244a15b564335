use std::path::PathBuf;

use crate::cli::commands::CommandDefinition;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "save",
            "Write all groups and expenses to a JSON snapshot",
            "save [path]",
            cmd_save,
        ),
        CommandDefinition::new(
            "load",
            "Replace the session state with a JSON snapshot",
            "load [path]",
            cmd_load,
        ),
        CommandDefinition::new("version", "Show build information", "version", cmd_version),
        CommandDefinition::new("help", "List commands or describe one", "help [command]", cmd_help),
        CommandDefinition::new("exit", "Leave the shell", "exit", cmd_exit),
    ]
}

fn target_path(context: &ShellContext, args: &[&str], usage: &str) -> Result<PathBuf, CommandError> {
    match args {
        [] => Ok(context
            .manager()
            .current_path()
            .map(|path| path.to_path_buf())
            .unwrap_or_else(|| context.default_snapshot_path())),
        [path] => Ok(PathBuf::from(*path)),
        _ => Err(CommandError::InvalidArguments(format!("usage: {usage}"))),
    }
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = target_path(context, args, "save [path]")?;
    context.manager_mut().save_to_path(&path)?;
    output::success(format!("Snapshot saved to {}", path.display()));
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = target_path(context, args, "load [path]")?;
    let meta = context.manager_mut().load_from_path(&path)?;
    context.active_group = None;
    for warning in &meta.warnings {
        output::warning(warning);
    }
    output::success(format!(
        "Loaded {} group(s) and {} expense(s) from {}",
        meta.groups,
        meta.expenses,
        meta.path.display()
    ));
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(build_info::current().summary());
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        Some(name) => {
            let entry = context.registry().get(name).ok_or_else(|| {
                CommandError::InvalidArguments(format!("unknown command `{name}`"))
            })?;
            output::section(format!("Help: {}", entry.name));
            output::line(format!("  {}", entry.description));
            output::line(format!("  usage: {}", entry.usage));
        }
        None => {
            output::section("Available commands");
            for entry in context.registry().iter() {
                output::line(format!("  {:<14} {}", entry.name, entry.description));
            }
            output::info("Use `help <command>` for details.");
        }
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
