//! Argument parsing for shell commands.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::cli::context::CommandError;
use crate::domain::{Currency, PaidDetails, RepartitionKind, ShareValues, UserIndex, UserShare};

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_uuid(input: &str) -> Result<Uuid, CommandError> {
    Uuid::parse_str(input)
        .map_err(|_| CommandError::InvalidArguments(format!("invalid id `{input}`")))
}

pub(crate) fn parse_number(input: &str) -> Result<f64, CommandError> {
    input
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid number `{input}`")))
}

pub(crate) fn parse_currency(input: &str) -> Result<Currency, CommandError> {
    Currency::parse(input).ok_or_else(|| {
        CommandError::InvalidArguments(format!("unknown currency `{input}` (CHF, EUR, USD)"))
    })
}

/// `<id>:<name>` pairs.
pub(crate) fn parse_members(args: &[&str]) -> Result<Vec<UserIndex>, CommandError> {
    args.iter()
        .map(|raw| {
            let (id, name) = raw.split_once(':').ok_or_else(|| {
                CommandError::InvalidArguments(format!("member `{raw}` must look like <id>:<name>"))
            })?;
            let id = id.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("invalid member id `{id}`"))
            })?;
            Ok(UserIndex::new(id, name))
        })
        .collect()
}

/// `[amount:|portions:|equal:]<id>=<value>,...`; the kind defaults to `amount`.
pub(crate) fn parse_paid_details(input: &str) -> Result<PaidDetails, CommandError> {
    let (kind, entries) = match input.split_once(':') {
        Some((kind, rest)) => (parse_kind(kind)?, rest),
        None => (RepartitionKind::Amount, input),
    };
    let mut repartition = Vec::new();
    for entry in entries.split(',').filter(|part| !part.trim().is_empty()) {
        let (id, value) = entry.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("entry `{entry}` must look like <id>=<value>"))
        })?;
        let user_id = id
            .trim()
            .parse()
            .map_err(|_| CommandError::InvalidArguments(format!("invalid user id `{id}`")))?;
        let value = parse_number(value.trim())?;
        let values = match kind {
            RepartitionKind::Portions => ShareValues::share(value),
            _ => ShareValues::amount(value),
        };
        repartition.push(UserShare::new(user_id, values));
    }
    Ok(PaidDetails::new(kind, repartition))
}

fn parse_kind(input: &str) -> Result<RepartitionKind, CommandError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "amount" => Ok(RepartitionKind::Amount),
        "portions" => Ok(RepartitionKind::Portions),
        "equal" => Ok(RepartitionKind::Equal),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown repartition kind `{other}` (amount, portions)"
        ))),
    }
}
