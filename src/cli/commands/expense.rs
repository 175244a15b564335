use crate::cli::commands::{expect_args, CommandDefinition};
use crate::cli::context::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::parse::{parse_date, parse_number, parse_paid_details};
use crate::core::validation::ValidationRequest;
use crate::domain::{ExpenseCategory, NewExpense};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "expense-add",
            "Record an expense in the selected group",
            "expense-add <name> <YYYY-MM-DD> <amount> <paid-by> <paid-for> [category]",
            cmd_add,
        ),
        CommandDefinition::new(
            "expense-list",
            "List the expenses of the selected group",
            "expense-list",
            cmd_list,
        ),
        CommandDefinition::new(
            "validate",
            "Check a split against the selected group without saving it",
            "validate <amount> <paid-by> <paid-for>",
            cmd_validate,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (category, args) = match args.len() {
        5 => (ExpenseCategory::default(), args),
        6 => {
            let category = ExpenseCategory::parse(args[5]).ok_or_else(|| {
                CommandError::InvalidArguments(format!("unknown category `{}`", args[5]))
            })?;
            (category, &args[..5])
        }
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: expense-add <name> <YYYY-MM-DD> <amount> <paid-by> <paid-for> [category]"
                    .into(),
            ))
        }
    };
    let group_id = context.active_group()?;
    let mut input = NewExpense::new(
        group_id,
        args[0],
        parse_date(args[1])?,
        parse_number(args[2])?,
        parse_paid_details(args[3])?,
        parse_paid_details(args[4])?,
    );
    input.category = category;
    let group = context.block_on(context.manager().groups().find(group_id))?;
    input.currency = group.currency;
    let expense = context.block_on(context.manager().expenses().create(input))?;
    output::success(format!(
        "Expense added: {} [{}] {:.2}",
        expense.name,
        short_id(expense.id),
        expense.amount
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 0, "expense-list")?;
    let group_id = context.active_group()?;
    let expenses = context.block_on(context.manager().expenses().list_for_group(group_id))?;
    if expenses.is_empty() {
        output::info("No expenses recorded.");
        return Ok(());
    }
    output::section("Expenses");
    for expense in &expenses {
        output::line(format!(
            "  {}  {:<30} {:>10.2} {}  {}",
            expense.date, expense.name, expense.amount, expense.currency, expense.category
        ));
    }
    Ok(())
}

fn cmd_validate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 3, "validate <amount> <paid-by> <paid-for>")?;
    let request = ValidationRequest {
        total_amount: parse_number(args[0])?,
        paid_by: parse_paid_details(args[1])?,
        paid_for: parse_paid_details(args[2])?,
        group_id: Some(context.active_group()?),
    };
    context.block_on(context.manager().expenses().validate(&request))?;
    output::success("Repartition is valid");
    Ok(())
}
