use rentbook_core::{RoomService, RoomUpdate};
use rentbook_domain::{Displayable, Room, RoomStatus};

use crate::cli::commands::args::{parse_money, usage_error, ParsedArgs};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

const USAGE: &str = "room add <number> <type> <rent>
room edit <number> [--number N] [--type T] [--rent R]
room remove <number>
room show <number>
room list
room available";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new("room", "Manage rooms and their rent", USAGE, cmd_room)]
}

fn cmd_room(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["number", "type", "rent"], &[])?;
    match parsed.positional.first().map(|s| s.to_lowercase()).as_deref() {
        Some("add") => add(context, &parsed),
        Some("edit") => edit(context, &parsed),
        Some("remove") => remove(context, &parsed),
        Some("show") => show(context, &parsed),
        Some("list") => {
            let rooms = context.manager_mut()?.rooms()?;
            print_rooms(context, rooms.iter(), "No rooms yet. Use `room add`.");
            Ok(())
        }
        Some("available") => context.with_book(|book| {
            print_rooms(context, RoomService::available(book).into_iter(), "No vacant rooms.");
            Ok(())
        }),
        _ => Err(usage_error(USAGE)),
    }
}

fn add(context: &mut ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let usage = "room add <number> <type> <rent>";
    let number = parsed.required(1, usage)?;
    let room_type = parsed.required(2, usage)?;
    let rent = parse_money(parsed.required(3, usage)?)?;
    context.mutate_book(|book| RoomService::add(book, Room::new(number, room_type, rent)))?;
    io::print_success(format!("Room {number} added at {}.", context.money(rent)));
    Ok(())
}

fn edit(context: &mut ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let number = parsed.required(1, "room edit <number> [--number N] [--type T] [--rent R]")?;
    let changes = RoomUpdate {
        number: parsed.option("number").map(str::to_string),
        room_type: parsed.option("type").map(str::to_string),
        monthly_rent: parsed.option("rent").map(parse_money).transpose()?,
    };
    if changes.number.is_none() && changes.room_type.is_none() && changes.monthly_rent.is_none() {
        return Err(CommandError::InvalidArguments(
            "nothing to change; pass --number, --type or --rent".into(),
        ));
    }
    context.mutate_book(|book| {
        let id = RoomService::by_number(book, number)?.id;
        RoomService::update(book, id, changes)
    })?;
    io::print_success(format!("Room {number} updated."));
    Ok(())
}

fn remove(context: &mut ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let number = parsed.required(1, "room remove <number>")?;
    let (id, label) = context.with_book(|book| {
        let room = RoomService::by_number(book, number)?;
        Ok((room.id, room.display_label()))
    })?;
    if !context.confirm(&format!("Remove {label}?"))? {
        io::print_info("Nothing removed.");
        return Ok(());
    }
    let room = context.mutate_book(|book| RoomService::remove(book, id))?;
    io::print_success(format!("Room {} removed.", room.number));
    Ok(())
}

fn show(context: &ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let number = parsed.required(1, "room show <number>")?;
    context.with_book(|book| {
        let room = RoomService::by_number(book, number)?;
        section(format!("Room {}", room.number));
        io::print_info(format!("  Type    : {}", room.room_type));
        io::print_info(format!("  Rent    : {}", context.money(room.monthly_rent)));
        io::print_info(format!("  Status  : {}", status_label(room.status)));
        let tenants: Vec<&str> = book
            .tenants_in_room(room.id)
            .map(|tenant| tenant.name.as_str())
            .collect();
        if !tenants.is_empty() {
            io::print_info(format!("  Tenants : {}", tenants.join(", ")));
        }
        Ok(())
    })
}

fn print_rooms<'a>(
    context: &ShellContext,
    rooms: impl Iterator<Item = &'a Room>,
    empty: &str,
) {
    let mut table = Table::new(vec![
        TableColumn::left("Room"),
        TableColumn::left("Type").max(20),
        TableColumn::right("Rent"),
        TableColumn::left("Status"),
    ]);
    for room in rooms {
        table.push_row(vec![
            room.number.clone(),
            room.room_type.clone(),
            context.money(room.monthly_rent),
            status_label(room.status).to_string(),
        ]);
    }
    if table.is_empty() {
        io::print_info(empty);
    } else {
        io::print_info(table.render());
    }
}

fn status_label(status: RoomStatus) -> &'static str {
    match status {
        RoomStatus::Vacant => "vacant",
        RoomStatus::Occupied => "occupied",
    }
}
