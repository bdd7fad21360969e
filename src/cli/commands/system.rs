use rentbook_domain::CURRENT_SCHEMA_VERSION;

use crate::cli::commands::args::ParsedArgs;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section;
use crate::cli::registry::CommandEntry;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("help", "Show available commands", "help [command]", cmd_help),
        CommandEntry::new("version", "Show build metadata", "version [--json]", cmd_version),
        CommandEntry::new("exit", "Leave the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        Some(name) => match context.command(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        },
        None => help::print_overview(&context.registry),
    }
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["json"])?;
    let meta = build_info::current();
    if parsed.has("json") {
        io::print_info(serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }
    section(format!("Rentbook {}", meta.version));
    io::print_info(format!("  Book schema : v{CURRENT_SCHEMA_VERSION}"));
    io::print_info(format!("  Build hash  : {} ({})", meta.git_hash, meta.git_status));
    io::print_info(format!("  Built at    : {}", meta.timestamp));
    io::print_info(format!("  Target      : {}", meta.target));
    io::print_info(format!("  Profile     : {}", meta.profile));
    io::print_info(format!("  Rustc       : {}", meta.rustc));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
