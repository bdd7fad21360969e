pub mod args;
pub mod book;
pub mod config;
pub mod payment;
pub mod report;
pub mod room;
pub mod system;
pub mod tenant;

use crate::cli::registry::CommandEntry;

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut entries = Vec::new();
    entries.extend(system::definitions());
    entries.extend(book::definitions());
    entries.extend(room::definitions());
    entries.extend(tenant::definitions());
    entries.extend(payment::definitions());
    entries.extend(report::definitions());
    entries.extend(config::definitions());
    entries
}
