use crate::cli::commands::args::{usage_error, ParsedArgs};
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

const USAGE: &str = "book new <name>
book open <name>
book list
book close
book delete <name>
book backup [note]
book backups
book restore <backup>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "book",
        "Create, open, delete, back up and restore rent books",
        USAGE,
        cmd_book,
    )]
}

fn cmd_book(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &[])?;
    match parsed.positional.first().map(|s| s.to_lowercase()).as_deref() {
        Some("new") => {
            let name = parsed.rest(1).ok_or_else(|| usage_error("book new <name>"))?;
            context.manager_mut()?.create(&name)?;
            context.remember_book(Some(&name))?;
            io::print_success(format!("Book `{name}` created."));
        }
        Some("open") => {
            let name = parsed.rest(1).ok_or_else(|| usage_error("book open <name>"))?;
            let warnings = context.manager_mut()?.open(&name)?;
            context.remember_book(Some(&name))?;
            io::print_success(format!("Book `{name}` opened."));
            for warning in warnings {
                io::print_warning(warning);
            }
        }
        Some("list") => list_books(context)?,
        Some("close") => {
            context.manager_mut()?.close();
            context.remember_book(None)?;
            io::print_success("Book closed.");
        }
        Some("delete") => {
            let name = parsed.rest(1).ok_or_else(|| usage_error("book delete <name>"))?;
            if !context.confirm(&format!("Delete book `{name}` and its data?"))? {
                io::print_info("Nothing deleted.");
                return Ok(());
            }
            context.manager()?.delete(&name)?;
            io::print_success(format!("Book `{name}` deleted."));
        }
        Some("backup") => {
            let note = parsed.rest(1);
            let backup = context.manager()?.backup(note.as_deref())?;
            io::print_success(format!("Backup `{}` created.", backup.id));
        }
        Some("backups") => list_backups(context)?,
        Some("restore") => {
            let id = parsed.required(1, "book restore <backup>")?;
            if !context.confirm(&format!("Replace the open book with backup `{id}`?"))? {
                io::print_info("Restore cancelled.");
                return Ok(());
            }
            let backup = context.manager_mut()?.restore(id)?;
            io::print_success(format!("Restored backup `{}`.", backup.id));
        }
        _ => return Err(usage_error(USAGE)),
    }
    Ok(())
}

fn list_books(context: &ShellContext) -> CommandResult {
    let manager = context.manager()?;
    let books = manager.list_books()?;
    if books.is_empty() {
        io::print_info("No books yet. Use `book new <name>`.");
        return Ok(());
    }
    let open = manager
        .current_name()
        .map(rentbook_storage_json::canonical_name);
    section("Books");
    for book in books {
        let marker = if open.as_deref() == Some(book.as_str()) { "*" } else { " " };
        io::print_info(format!("{marker} {book}"));
    }
    Ok(())
}

fn list_backups(context: &ShellContext) -> CommandResult {
    let backups = context.manager()?.list_backups()?;
    if backups.is_empty() {
        io::print_info("No backups for this book.");
        return Ok(());
    }
    let mut table = Table::new(vec![TableColumn::left("Backup"), TableColumn::left("Created")]);
    for backup in backups {
        table.push_row(vec![backup.id, backup.created_at]);
    }
    io::print_info(table.render());
    Ok(())
}
