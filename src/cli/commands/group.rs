use crate::cli::commands::{expect_args, CommandDefinition};
use crate::cli::context::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::parse::{parse_currency, parse_members, parse_uuid};
use crate::domain::NewGroup;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "group-new",
            "Create a group and select it",
            "group-new <name> <currency> <id:name>...",
            cmd_new,
        ),
        CommandDefinition::new(
            "group-use",
            "Select an existing group",
            "group-use <group-id>",
            cmd_use,
        ),
        CommandDefinition::new(
            "group-show",
            "Show the selected group, its members and expenses",
            "group-show [group-id]",
            cmd_show,
        ),
        CommandDefinition::new(
            "group-join",
            "Select the group opened by a link token",
            "group-join <link-token>",
            cmd_join,
        ),
    ]
}

fn cmd_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, currency, members @ ..] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: group-new <name> <currency> <id:name>...".into(),
        ));
    };
    let input = NewGroup::new(*name, parse_currency(currency)?, parse_members(members)?);
    let group = context.block_on(context.manager().groups().create(input))?;
    context.active_group = Some(group.id);
    output::success(format!("Group created: {}", group.id));
    output::info(format!("Link token: {}", group.link_token));
    Ok(())
}

fn cmd_use(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 1, "group-use <group-id>")?;
    let id = parse_uuid(args[0])?;
    let group = context.block_on(context.manager().groups().find(id))?;
    context.active_group = Some(group.id);
    output::success(format!("Using group `{}`", group.name));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = match args {
        [] => context.active_group()?,
        [raw] => parse_uuid(raw)?,
        _ => return Err(CommandError::InvalidArguments("usage: group-show [group-id]".into())),
    };
    let view = context.block_on(context.manager().groups().find_with_expenses(id))?;
    let group = &view.group;
    output::section(format!("{} ({})", group.name, group.currency));
    output::line(format!("  id:         {}", group.id));
    output::line(format!("  link token: {}", group.link_token));
    output::line(format!("  version:    {}", group.version));
    for user in &group.users {
        output::line(format!("  member {:>4}  {}", user.id, user.name));
    }
    output::line(format!("  expenses:   {}", view.expenses.len()));
    Ok(())
}

fn cmd_join(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 1, "group-join <link-token>")?;
    let token = parse_uuid(args[0])?;
    let id = context.block_on(context.manager().groups().join(token))?;
    context.active_group = Some(id);
    output::success(format!("Joined group {} [{}]", id, short_id(id)));
    Ok(())
}
