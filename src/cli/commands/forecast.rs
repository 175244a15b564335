use chrono::Duration;

use crate::cli::commands::{expect_args, CommandDefinition};
use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::parse::{parse_date, parse_number};
use crate::core::time::{Clock, SystemClock};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "forecast",
        "Predict the next days of spend of the selected group",
        "forecast <start YYYY-MM-DD> <days>",
        cmd_forecast,
    )]
}

fn cmd_forecast(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 2, "forecast <start YYYY-MM-DD> <days>")?;
    let start = parse_date(args[0])?;
    let horizon = parse_number(args[1])?;
    let group_id = context.active_group()?;
    let values = context.block_on(
        context
            .manager()
            .forecasts()
            .predict(group_id, start, horizon),
    )?;
    let today = SystemClock.today();
    output::section(format!("Forecast from {today}"));
    for (offset, value) in values.iter().enumerate() {
        let day = today + Duration::days(offset as i64 + 1);
        output::line(format!("  {day}  {value:>10.2}"));
    }
    Ok(())
}
