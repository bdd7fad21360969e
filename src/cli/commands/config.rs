use rentbook_config::Config;

use crate::cli::commands::args::usage_error;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "config [show]
config set <key> <value>
config backup [note]
config backups
config restore <name>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|s| s.to_lowercase());
    match action.as_deref() {
        None | Some("show") => {
            show(&context.config);
            Ok(())
        }
        Some("set") => {
            let (key, value) = match args {
                [_, key, rest @ ..] if !rest.is_empty() => (*key, rest.join(" ")),
                [_, key] => (*key, String::new()),
                _ => return Err(usage_error("config set <key> <value>")),
            };
            let mut config = context.config.clone();
            config.set(key, &value)?;
            let shown = config.get(key)?;
            context.save_config(config)?;
            io::print_success(format!("{key} = {shown}"));
            Ok(())
        }
        Some("backup") => {
            let note = (args.len() > 1).then(|| args[1..].join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            io::print_success(format!("Configuration backup `{name}` created."));
            Ok(())
        }
        Some("backups") => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                io::print_info("No configuration backups.");
            }
            for name in backups {
                io::print_info(format!("  {name}"));
            }
            Ok(())
        }
        Some("restore") => {
            let name = args.get(1).ok_or_else(|| usage_error("config restore <name>"))?;
            if !context.confirm(&format!("Replace the current configuration with `{name}`?"))? {
                io::print_info("Restore cancelled.");
                return Ok(());
            }
            let restored = context.config_manager.restore(name)?;
            context.save_config(restored)?;
            io::print_success(format!("Configuration restored from `{name}`."));
            Ok(())
        }
        _ => Err(usage_error(USAGE)),
    }
}

fn show(config: &Config) {
    section("Configuration");
    for key in Config::KEYS {
        let value = config.get(key).unwrap_or_default();
        let value = if value.is_empty() { "-".to_string() } else { value };
        io::print_info(format!("  {key:<24} {value}"));
    }
}
