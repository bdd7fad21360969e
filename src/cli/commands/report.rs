use colored::Colorize;
use rentbook_core::{ReminderCard, ReminderLevel, ReportService, TenantBalanceRow};

use crate::cli::commands::args::ParsedArgs;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "dashboard",
            "Occupancy, arrears, recent tenants and reminders",
            "dashboard [--json]",
            cmd_dashboard,
        ),
        CommandEntry::new(
            "analytics",
            "Arrears and credit totals for the current month",
            "analytics [--json]",
            cmd_analytics,
        ),
        CommandEntry::new(
            "reminders",
            "Tenants with an outstanding balance, by urgency",
            "reminders [--json]",
            cmd_reminders,
        ),
    ]
}

fn cmd_dashboard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["json"])?;
    let today = context.today()?;
    let options = context.report_options();
    let stats = context.manager_mut()?.stats()?;
    let dashboard = context.with_book(|book| Ok(ReportService::dashboard(book, today, &options)))?;
    if parsed.has("json") {
        io::print_info(serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    section(format!("Dashboard for {}", dashboard.month));
    io::print_info(format!(
        "  Rooms    : {} total, {} occupied, {} vacant",
        stats.total_rooms, stats.occupied_rooms, stats.vacant_rooms
    ));
    io::print_info(format!("  Tenants  : {}", stats.total_tenants));
    io::print_info(format!("  Arrears  : {}", context.money(dashboard.total_arrears)));

    if !dashboard.recent_tenants.is_empty() {
        section("Recent tenants");
        print_balance_rows(context, &dashboard.recent_tenants);
    }
    section("Reminders");
    print_reminders(context, &dashboard.reminders);
    Ok(())
}

fn cmd_analytics(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["json"])?;
    let today = context.today()?;
    let analytics = context.with_book(|book| Ok(ReportService::analytics(book, today)))?;
    if parsed.has("json") {
        io::print_info(serde_json::to_string_pretty(&analytics)?);
        return Ok(());
    }

    section(format!("Analytics for {}", analytics.month));
    io::print_info(format!("  Expected rent : {}", context.money(analytics.total_expected)));
    io::print_info(format!("  Collected     : {}", context.money(analytics.collected_this_month)));
    io::print_info(format!("  Arrears       : {}", context.money(analytics.total_arrears)));
    io::print_info(format!("  Credit held   : {}", context.money(analytics.total_credit)));
    io::print_info(format!(
        "  Occupancy     : {}/{} rooms",
        analytics.stats.occupied_rooms, analytics.stats.total_rooms
    ));

    section(format!("In arrears ({})", analytics.arrears_tenants.len()));
    print_balance_rows(context, &analytics.arrears_tenants);
    section(format!("In credit ({})", analytics.credit_tenants.len()));
    print_balance_rows(context, &analytics.credit_tenants);
    Ok(())
}

fn cmd_reminders(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["json"])?;
    let today = context.today()?;
    let thresholds = context.report_options().thresholds;
    let cards = context.with_book(|book| Ok(ReportService::reminders(book, today, &thresholds)))?;
    if parsed.has("json") {
        io::print_info(serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }
    print_reminders(context, &cards);
    Ok(())
}

fn print_balance_rows(context: &ShellContext, rows: &[TenantBalanceRow]) {
    if rows.is_empty() {
        io::print_info("  none");
        return;
    }
    let mut table = Table::new(vec![
        TableColumn::left("Name").max(24),
        TableColumn::left("Room"),
        TableColumn::right("Rent"),
        TableColumn::right("Remaining"),
        TableColumn::right("Credit"),
        TableColumn::left("Status"),
    ]);
    for row in rows {
        let balance = &row.snapshot.balance;
        table.push_row(vec![
            row.name.clone(),
            row.room_number.clone().unwrap_or_else(|| "-".into()),
            context.money(balance.monthly_rent),
            context.money(balance.remaining),
            context.money(balance.new_credit),
            balance.classification.to_string(),
        ]);
    }
    io::print_info(table.render());
}

fn print_reminders(context: &ShellContext, cards: &[ReminderCard]) {
    if cards.is_empty() {
        io::print_info("No outstanding balances.");
        return;
    }
    let mut table = Table::new(vec![
        TableColumn::left("Level"),
        TableColumn::left("Tenant").max(24),
        TableColumn::left("Room"),
        TableColumn::right("Owed"),
        TableColumn::right("Days"),
    ]);
    for card in cards {
        table.push_row(vec![
            level_label(card.level),
            card.tenant_name.clone(),
            card.room_number.clone().unwrap_or_else(|| "-".into()),
            context.money(card.amount_remaining),
            card.days_since_payment.to_string(),
        ]);
    }
    io::print_info(table.render());
}

fn level_label(level: ReminderLevel) -> String {
    let label = level.to_string();
    match level {
        ReminderLevel::Pending => label,
        ReminderLevel::Warning => label.yellow().to_string(),
        ReminderLevel::Critical => label.red().bold().to_string(),
    }
}
