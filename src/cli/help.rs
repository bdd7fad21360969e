use crate::cli::io;
use crate::cli::output::section;
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    section("Available commands");
    for entry in registry.list() {
        io::print_info(format!("  {:<12} {}", entry.name, entry.description));
    }
    io::print_info("Use `help <command>` for details. Press `?` or Tab to complete.");
}

pub fn print_command(entry: &CommandEntry) {
    section(format!("Help: {}", entry.name));
    io::print_info(format!("  {}", entry.description));
    for (idx, line) in entry.usage.lines().enumerate() {
        let label = if idx == 0 { "Usage:" } else { "" };
        io::print_info(format!("  {label:<7}{}", line.trim()));
    }
}
