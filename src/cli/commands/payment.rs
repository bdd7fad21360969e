use rentbook_core::{BalanceClass, PaymentRow, PaymentService, TenantService};
use rentbook_domain::short_id;

use crate::cli::commands::args::{parse_date, parse_money, usage_error, ParsedArgs};
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

const PAY_USAGE: &str = "pay <tenant> <amount> [date] [note]";
const PAYMENT_USAGE: &str = "payment list [--tenant X]
payment history <tenant>
payment remove <payment-id-prefix>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "pay",
            "Record a rent payment and show the resulting balance",
            PAY_USAGE,
            cmd_pay,
        ),
        CommandEntry::new("payment", "List or remove payments", PAYMENT_USAGE, cmd_payment),
    ]
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &[])?;
    let key = parsed.required(0, PAY_USAGE)?;
    let amount = parse_money(parsed.required(1, PAY_USAGE)?)?;
    let (date, note) = match parsed.positional.get(2) {
        Some(raw) if parse_date(raw).is_ok() => (parse_date(raw)?, parsed.rest(3)),
        _ => (context.today()?, parsed.rest(2)),
    };
    let policy = context.payment_policy();

    let (name, snapshot) = context.mutate_book(|book| {
        let tenant = TenantService::find(book, key)?;
        let (id, name) = (tenant.id, tenant.name.clone());
        let snapshot = PaymentService::apply_payment_with(book, &policy, id, amount, date, note)?;
        Ok((name, snapshot))
    })?;

    io::print_success(format!(
        "Recorded {} from {name} on {date}.",
        context.money(amount)
    ));
    let balance = &snapshot.balance;
    match balance.classification {
        BalanceClass::Arrears => io::print_warning(format!(
            "{} still owes {} for {}.",
            name,
            context.money(balance.remaining),
            snapshot.month
        )),
        BalanceClass::Credit => io::print_info(format!(
            "{} is paid up for {} with {} credit carried forward.",
            name,
            snapshot.month,
            context.money(balance.new_credit)
        )),
        BalanceClass::Paid => io::print_info(format!("{} is paid up for {}.", name, snapshot.month)),
    }
    Ok(())
}

fn cmd_payment(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["tenant"], &[])?;
    match parsed.positional.first().map(|s| s.to_lowercase()).as_deref() {
        Some("list") => list(context, parsed.option("tenant")),
        Some("history") => {
            let key = parsed.rest(1).ok_or_else(|| usage_error("payment history <tenant>"))?;
            list(context, Some(key.as_str()))
        }
        Some("remove") => remove(context, parsed.required(1, "payment remove <payment-id-prefix>")?),
        _ => Err(usage_error(PAYMENT_USAGE)),
    }
}

fn list(context: &ShellContext, tenant_key: Option<&str>) -> CommandResult {
    context.with_book(|book| {
        let rows: Vec<PaymentRow> = match tenant_key {
            Some(key) => {
                let tenant = TenantService::find(book, key)?;
                let room_number = book.room_number_for(tenant).map(str::to_string);
                PaymentService::history(book, tenant.id)?
                    .into_iter()
                    .map(|payment| PaymentRow {
                        payment,
                        tenant_name: tenant.name.clone(),
                        room_number: room_number.clone(),
                    })
                    .collect()
            }
            None => PaymentService::list(book),
        };
        if rows.is_empty() {
            io::print_info("No payments recorded.");
            return Ok(());
        }
        let mut table = Table::new(vec![
            TableColumn::left("ID"),
            TableColumn::left("Date"),
            TableColumn::left("Tenant").max(24),
            TableColumn::left("Room"),
            TableColumn::right("Amount"),
            TableColumn::left("Note").max(30),
        ]);
        for row in rows {
            table.push_row(vec![
                short_id(row.payment.id),
                row.payment.date.to_string(),
                row.tenant_name,
                row.room_number.unwrap_or_else(|| "-".into()),
                context.money(row.payment.amount),
                row.payment.note.unwrap_or_default(),
            ]);
        }
        io::print_info(table.render());
        Ok(())
    })
}

fn remove(context: &ShellContext, prefix: &str) -> CommandResult {
    let (id, summary) = context.with_book(|book| {
        let payment = PaymentService::find(book, prefix)?;
        let tenant = TenantService::get(book, payment.tenant_id)?;
        Ok((
            payment.id,
            format!(
                "{} from {} on {}",
                context.money(payment.amount),
                tenant.name,
                payment.date
            ),
        ))
    })?;
    if !context.confirm(&format!("Delete payment of {summary}?"))? {
        io::print_info("Nothing removed.");
        return Ok(());
    }
    context.mutate_book(|book| PaymentService::delete_payment(book, id))?;
    io::print_success(format!("Deleted payment of {summary}."));
    Ok(())
}
