use rentbook_core::{ReportService, RoomService, TenantService, TenantUpdate};
use rentbook_domain::{short_id, Displayable, MonthKey, Tenant, TenantIdentity};

use crate::cli::commands::args::{
    optional_text, parse_date, parse_month, usage_error, ParsedArgs,
};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

const USAGE: &str = "tenant add <name> <phone> <move-in> [--room N] [--id-number X] [--relative-name X] [--relative-contact X] [--relative-id X]
tenant edit <tenant> [--name X] [--phone X] [--move-in D] [--room N] [--no-room] [identity flags]
tenant remove <tenant>
tenant show <tenant> [--month YYYY-MM] [--json]
tenant list
tenant search <query>";

const OPTIONS: &[&str] = &[
    "room",
    "name",
    "phone",
    "move-in",
    "month",
    "id-number",
    "relative-name",
    "relative-contact",
    "relative-id",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "tenant",
        "Manage tenants and view their balances",
        USAGE,
        cmd_tenant,
    )]
}

fn cmd_tenant(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, OPTIONS, &["no-room", "json"])?;
    match parsed.positional.first().map(|s| s.to_lowercase()).as_deref() {
        Some("add") => add(context, &parsed),
        Some("edit") => edit(context, &parsed),
        Some("remove") => remove(context, &parsed),
        Some("show") => show(context, &parsed),
        Some("list") => list(context),
        Some("search") => search(context, &parsed),
        _ => Err(usage_error(USAGE)),
    }
}

fn identity_from(parsed: &ParsedArgs<'_>) -> TenantIdentity {
    TenantIdentity {
        id_number: parsed.option("id-number").and_then(optional_text),
        relative_name: parsed.option("relative-name").and_then(optional_text),
        relative_contact: parsed.option("relative-contact").and_then(optional_text),
        relative_id_number: parsed.option("relative-id").and_then(optional_text),
    }
}

fn add(context: &mut ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let usage = "tenant add <name> <phone> <move-in> [--room N]";
    let name = parsed.required(1, usage)?;
    let phone = parsed.required(2, usage)?;
    let move_in = parse_date(parsed.required(3, usage)?)?;
    let room_number = parsed.option("room");
    let identity = identity_from(parsed);

    context.mutate_book(|book| {
        let room_id = room_number
            .map(|number| RoomService::by_number(book, number).map(|room| room.id))
            .transpose()?;
        let tenant = Tenant::new(name, phone, room_id, move_in).with_identity(identity);
        TenantService::add(book, tenant)
    })?;
    match room_number {
        Some(number) => io::print_success(format!("Tenant {name} added to room {number}.")),
        None => io::print_success(format!("Tenant {name} added.")),
    }
    Ok(())
}

fn edit(context: &mut ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let key = parsed.required(1, "tenant edit <tenant> [--name X] [--phone X] ...")?;
    if parsed.option("room").is_some() && parsed.has("no-room") {
        return Err(CommandError::InvalidArguments(
            "`--room` and `--no-room` cannot be combined".into(),
        ));
    }
    let move_in_date = parsed.option("move-in").map(parse_date).transpose()?;
    let room_number = parsed.option("room");
    let move_out = parsed.has("no-room");
    let identity = |name: &str| parsed.option(name).map(|raw| raw.trim().to_string());

    let mut changes = TenantUpdate {
        name: parsed.option("name").map(str::to_string),
        phone: parsed.option("phone").map(str::to_string),
        move_in_date,
        room_id: None,
        id_number: identity("id-number"),
        relative_name: identity("relative-name"),
        relative_contact: identity("relative-contact"),
        relative_id_number: identity("relative-id"),
    };

    let name = context.mutate_book(|book| {
        let tenant = TenantService::find(book, key)?;
        let (id, name) = (tenant.id, tenant.name.clone());
        if let Some(number) = room_number {
            changes.room_id = Some(Some(RoomService::by_number(book, number)?.id));
        } else if move_out {
            changes.room_id = Some(None);
        }
        TenantService::update(book, id, changes)?;
        Ok(name)
    })?;
    io::print_success(format!("Tenant {name} updated."));
    Ok(())
}

fn remove(context: &mut ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let key = parsed.required(1, "tenant remove <tenant>")?;
    let (id, name, label) = context.with_book(|book| {
        let tenant = TenantService::find(book, key)?;
        Ok((tenant.id, tenant.name.clone(), tenant.display_label()))
    })?;
    if !context.confirm(&format!("Remove {label} and all of their payments?"))? {
        io::print_info("Nothing removed.");
        return Ok(());
    }
    context.mutate_book(|book| TenantService::remove(book, id))?;
    io::print_success(format!("Tenant {name} removed."));
    Ok(())
}

fn show(context: &ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let key = parsed.required(1, "tenant show <tenant> [--month YYYY-MM] [--json]")?;
    let month = match parsed.option("month") {
        Some(raw) => parse_month(raw)?,
        None => MonthKey::from_date(context.today()?),
    };
    let detail = context.with_book(|book| {
        let id = TenantService::find(book, key)?.id;
        Ok(TenantService::detail(book, id, month)?)
    })?;
    if parsed.has("json") {
        io::print_info(serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let tenant = &detail.tenant;
    let balance = &detail.snapshot.balance;
    section(format!("{} ({})", tenant.name, short_id(tenant.id)));
    io::print_info(format!("  Phone        : {}", tenant.phone));
    io::print_info(format!(
        "  Room         : {}",
        detail
            .room
            .as_ref()
            .map(|room| format!("{} ({})", room.number, room.room_type))
            .unwrap_or_else(|| "none".into())
    ));
    io::print_info(format!("  Moved in     : {}", tenant.move_in_date));
    let identity = &tenant.identity;
    for (label, value) in [
        ("ID number   ", &identity.id_number),
        ("Relative    ", &identity.relative_name),
        ("Rel. contact", &identity.relative_contact),
        ("Rel. ID     ", &identity.relative_id_number),
    ] {
        if let Some(value) = value {
            io::print_info(format!("  {label} : {value}"));
        }
    }

    section(format!("Balance for {month}"));
    io::print_info(format!("  Rent         : {}", context.money(balance.monthly_rent)));
    io::print_info(format!("  Prior credit : {}", context.money(balance.prior_credit)));
    io::print_info(format!("  Paid         : {}", context.money(balance.paid_this_month)));
    io::print_info(format!("  Remaining    : {}", context.money(balance.remaining)));
    io::print_info(format!("  Credit       : {}", context.money(balance.new_credit)));
    io::print_info(format!("  Status       : {}", balance.classification));
    io::print_info(format!("  Total paid   : {}", context.money(detail.total_paid)));

    if !detail.payments.is_empty() {
        section("Payments");
        let mut table = Table::new(vec![
            TableColumn::left("ID"),
            TableColumn::left("Date"),
            TableColumn::right("Amount"),
            TableColumn::left("Note").max(30),
        ]);
        for payment in &detail.payments {
            table.push_row(vec![
                short_id(payment.id),
                payment.date.to_string(),
                context.money(payment.amount),
                payment.note.clone().unwrap_or_default(),
            ]);
        }
        io::print_info(table.render());
    }
    Ok(())
}

fn list(context: &ShellContext) -> CommandResult {
    let today = context.today()?;
    let rows = context.with_book(|book| Ok(ReportService::tenant_balances(book, today)))?;
    if rows.is_empty() {
        io::print_info("No tenants yet. Use `tenant add`.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Name").max(24),
        TableColumn::left("Phone"),
        TableColumn::left("Room"),
        TableColumn::right("Balance"),
        TableColumn::left("Status"),
        TableColumn::left("Last paid"),
    ]);
    for row in rows {
        table.push_row(vec![
            row.name,
            row.phone,
            row.room_number.unwrap_or_else(|| "-".into()),
            context.money(row.snapshot.net()),
            row.snapshot.classification().to_string(),
            match (row.last_payment_date, row.days_since_payment) {
                (Some(date), Some(days)) => format!("{date} ({days}d)"),
                _ => "never".into(),
            },
        ]);
    }
    io::print_info(table.render());
    Ok(())
}

fn search(context: &ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let query = parsed.rest(1).ok_or_else(|| usage_error("tenant search <query>"))?;
    context.with_book(|book| {
        let matches = TenantService::search(book, &query);
        if matches.is_empty() {
            io::print_info(format!("No tenants match `{query}`."));
            return Ok(());
        }
        let mut table = Table::new(vec![
            TableColumn::left("ID"),
            TableColumn::left("Name"),
            TableColumn::left("Phone"),
            TableColumn::left("Room"),
        ]);
        for tenant in matches {
            table.push_row(vec![
                short_id(tenant.id),
                tenant.name.clone(),
                tenant.phone.clone(),
                book.room_number_for(tenant).unwrap_or("-").to_string(),
            ]);
        }
        io::print_info(table.render());
        Ok(())
    })
}
