//! Wall clock and the `RENTBOOK_TODAY` override.

use std::{env, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use rentbook_core::{Clock, FixedClock};

/// Pins "today" for every balance and reminder, e.g. `RENTBOOK_TODAY=2024-07-15`.
pub const TODAY_ENV: &str = "RENTBOOK_TODAY";

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock honoring [`TODAY_ENV`]; an unparsable value is an error rather than
/// a silent fallback to the wall clock.
pub fn clock_from_env() -> Result<Arc<dyn Clock>, String> {
    match env::var(TODAY_ENV) {
        Ok(raw) if !raw.trim().is_empty() => {
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|err| format!("{TODAY_ENV}=`{raw}` is not a YYYY-MM-DD date: {err}"))?;
            Ok(Arc::new(FixedClock::on(date)))
        }
        _ => Ok(Arc::new(SystemClock)),
    }
}
