use std::collections::HashMap;

use once_cell::sync::Lazy;

pub mod expense;
pub mod forecast;
pub mod group;
pub mod system;

use crate::cli::context::{CommandResult, ShellContext};

/// Every shell command, in help order.
pub static REGISTRY: Lazy<CommandRegistry> = Lazy::new(|| CommandRegistry::new(all_definitions()));

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(group::definitions());
    commands.extend(expense::definitions());
    commands.extend(forecast::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Fails unless exactly `count` arguments were given.
pub(crate) fn expect_args(args: &[&str], count: usize, usage: &str) -> CommandResult {
    if args.len() == count {
        Ok(())
    } else {
        Err(crate::cli::context::CommandError::InvalidArguments(format!(
            "usage: {usage}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_every_command_once() {
        let names: Vec<_> = REGISTRY.names().collect();
        for expected in [
            "group-new",
            "group-use",
            "group-show",
            "group-join",
            "expense-add",
            "expense-list",
            "validate",
            "forecast",
            "save",
            "load",
            "version",
            "help",
            "exit",
        ] {
            assert_eq!(names.iter().filter(|name| **name == expected).count(), 1, "{expected}");
        }
    }
}
