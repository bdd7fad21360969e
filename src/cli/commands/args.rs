//! Argument parsing shared by the command handlers.

use chrono::NaiveDate;
use rentbook_domain::{Money, MonthKey};

use crate::cli::core::CommandError;

/// Positional arguments plus `--flag value` options and bare `--switch`es.
#[derive(Debug, Default)]
pub struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    options: Vec<(&'a str, &'a str)>,
    switches: Vec<&'a str>,
}

impl<'a> ParsedArgs<'a> {
    /// Splits `args`. Only names listed in `options` take a value; only names
    /// in `switches` may appear bare. Anything else starting with `--` is rejected.
    pub fn parse(
        args: &[&'a str],
        options: &[&str],
        switches: &[&str],
    ) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            if options.contains(&name) {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("`--{name}` needs a value"))
                })?;
                parsed.options.push((name, value));
            } else if switches.contains(&name) {
                parsed.switches.push(name);
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{name}`"
                )));
            }
        }
        Ok(parsed)
    }

    /// Last value given for `name`.
    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn has(&self, switch: &str) -> bool {
        self.switches.contains(&switch)
    }

    pub fn required(&self, idx: usize, usage: &str) -> Result<&'a str, CommandError> {
        self.positional
            .get(idx)
            .copied()
            .ok_or_else(|| usage_error(usage))
    }

    /// Positional arguments from `idx` on, joined with spaces.
    pub fn rest(&self, idx: usize) -> Option<String> {
        let rest = self.positional.get(idx..)?;
        (!rest.is_empty()).then(|| rest.join(" "))
    }
}

pub fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

pub fn parse_money(raw: &str) -> Result<Money, CommandError> {
    raw.parse()
        .map_err(|err| CommandError::InvalidArguments(format!("{err}")))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("`{raw}` is not a date (expected YYYY-MM-DD)"))
    })
}

pub fn parse_month(raw: &str) -> Result<MonthKey, CommandError> {
    raw.parse().map_err(|_| {
        CommandError::InvalidArguments(format!("`{raw}` is not a month (expected YYYY-MM)"))
    })
}

/// Empty strings clear optional text fields.
pub fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_positionals_options_and_switches() {
        let args = ["Amina", "--room", "4", "-500", "--json", "extra"];
        let parsed = ParsedArgs::parse(&args, &["room"], &["json"]).unwrap();
        assert_eq!(parsed.positional, vec!["Amina", "-500", "extra"]);
        assert_eq!(parsed.option("room"), Some("4"));
        assert!(parsed.has("json"));
        assert_eq!(parsed.rest(1).as_deref(), Some("-500 extra"));
        assert_eq!(parsed.rest(3), None);
    }

    #[test]
    fn rejects_unknown_or_incomplete_options() {
        assert!(ParsedArgs::parse(&["--colour"], &[], &[]).is_err());
        assert!(ParsedArgs::parse(&["--room"], &["room"], &[]).is_err());
    }

    #[test]
    fn parses_dates_months_and_money() {
        assert_eq!(
            parse_date("2024-07-02").unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 2).unwrap()
        );
        assert!(parse_date("02/07/2024").is_err());
        assert_eq!(parse_month("2024-07").unwrap().to_string(), "2024-07");
        assert_eq!(parse_money("15,000").unwrap(), Money::from_major(15_000));
        assert!(parse_money("ten").is_err());
        assert!(parse_money("90,000,000,000,000,000").is_err());
    }
}
