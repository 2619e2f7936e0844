use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::advisory::{AdvisoryClient, AdvisoryPipeline, AdvisoryState};
use crate::analytics::recent_transactions;
use crate::config::Settings;
use crate::models::CategoryDefinition;
use crate::session::Session;
use crate::ui::util::format_amount;

pub(crate) fn as_cli(args: &[String], session: &mut Session, settings: &Settings) -> Result<()> {
    match args[1].as_str() {
        "add" => cli_add(&args[2..], session),
        "delete" | "rm" => cli_delete(&args[2..], session),
        "list" | "ls" => cli_list(&args[2..], session),
        "summary" | "s" => cli_summary(session),
        "trend" => cli_trend(session),
        "budget" => cli_budget(&args[2..], session),
        "ask" => cli_ask(&args[2..], session, settings),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("spendlens {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("SpendLens: personal expense tracker with an AI advisor");
    println!();
    println!("Usage: spendlens [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  add <amount> <category>       Record an expense");
    println!("    --note <text>               Optional note");
    println!("    --date <YYYY-MM-DD>         Date (default: today)");
    println!("  delete <id>                   Delete an expense");
    println!("  list [--limit <n>]            List expenses, newest first");
    println!("  summary                       Budget, spending and categories");
    println!("  trend                         Totals for the last 6 months");
    println!("  budget [amount]               Show or set the monthly budget");
    println!("  ask <question>                Ask the advisor about your spending");
    println!("  serve                         Run the Gemini relay server");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn cli_add(args: &[String], session: &mut Session) -> Result<()> {
    if args.len() < 2 {
        anyhow::bail!("Usage: spendlens add <amount> <category> [--note <text>] [--date <YYYY-MM-DD>]");
    }

    let date = match flag(args, "--date") {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid date: {raw} (use YYYY-MM-DD)"))?,
        None => today(),
    };
    let note = flag(args, "--note").unwrap_or("");
    let category = CategoryDefinition::resolve(&args[1]);

    let record = session.add_expense(&args[0], &category, note, date)?;
    println!(
        "Added {} to {} on {} (id {})",
        format_amount(record.amount),
        record.category,
        record.date,
        record.id
    );
    Ok(())
}

fn cli_delete(args: &[String], session: &mut Session) -> Result<()> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: spendlens delete <id>"))?;
    let id: i64 = raw.parse().with_context(|| format!("Invalid id: {raw}"))?;

    if session.delete_expense(id) {
        println!("Deleted expense {id}");
    } else {
        println!("No expense with id {id}");
    }
    Ok(())
}

fn cli_list(args: &[String], session: &mut Session) -> Result<()> {
    let snapshot = session.snapshot();
    let limit = match flag(args, "--limit") {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("Invalid limit: {raw}"))?,
        None => snapshot.expenses.len(),
    };

    let expenses = recent_transactions(&snapshot, limit);
    if expenses.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    println!(
        "{:<14} {:<11} {:<20} {:>12}  Note",
        "ID", "Date", "Category", "Amount"
    );
    println!("{}", "─".repeat(72));
    for e in &expenses {
        println!(
            "{:<14} {:<11} {:<20} {:>12}  {}",
            e.id,
            e.date,
            e.category,
            format_amount(e.amount),
            e.note.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn cli_summary(session: &mut Session) -> Result<()> {
    let analytics = session.analytics(today());
    let s = &analytics.signals;

    println!("SpendLens: {}", today().format("%B %Y"));
    println!("{}", "─".repeat(40));
    println!("  Budget:      {}", format_amount(analytics.budget));
    println!("  Spent:       {}", format_amount(s.total_spent));
    println!("  Remaining:   {}", format_amount(s.remaining));
    println!("  Used:        {}%", s.spend_ratio_percent.round());
    println!("  Avg / Day:   {}", format_amount(analytics.average_per_active_day));
    println!("  Total Txns:  {}", analytics.transaction_count);
    if s.danger_zone {
        println!("  ⚠ Over 90% of budget used");
    }

    if !analytics.category_breakdown.is_empty() {
        println!();
        println!("Spending by Category:");
        for c in &analytics.category_breakdown {
            println!(
                "  {} {:<22} {:>12}",
                c.category.icon,
                c.category.name,
                format_amount(c.total)
            );
        }
    }
    Ok(())
}

fn cli_trend(session: &mut Session) -> Result<()> {
    let analytics = session.analytics(today());
    let max = analytics.max_month_total();

    println!("Monthly Trend");
    println!("{}", "─".repeat(40));
    for m in &analytics.monthly_trend {
        println!(
            "  {} {} {:<20} {:>12}",
            m.label,
            m.year,
            crate::ui::util::proportional_bar(m.total, max, 20),
            format_amount(m.total)
        );
    }
    Ok(())
}

fn cli_budget(args: &[String], session: &mut Session) -> Result<()> {
    let Some(raw) = args.first() else {
        println!("Budget: {}", format_amount(session.budget()));
        return Ok(());
    };

    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '₹').collect();
    let value = Decimal::from_str(cleaned.trim()).with_context(|| format!("Invalid budget: {raw}"))?;
    session.set_budget(value);
    println!("Budget set to {}", format_amount(value));
    Ok(())
}

fn cli_ask(args: &[String], session: &mut Session, settings: &Settings) -> Result<()> {
    let question = args.join(" ");
    let analytics = session.analytics(today());
    let mut pipeline = AdvisoryPipeline::new();
    let Some(request) = pipeline.begin(&question, &analytics) else {
        anyhow::bail!("Usage: spendlens ask <question>");
    };

    let client = AdvisoryClient::from_mode(&settings.advisor)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(client.ask(&request.question, &request.summary));
    pipeline.complete(request.seq, result);

    match pipeline.state() {
        AdvisoryState::Answered { answer, .. } => {
            println!("{answer}");
            Ok(())
        }
        AdvisoryState::Failed { error, .. } => {
            tracing::warn!(error = %error, "advisory request failed");
            anyhow::bail!(error.user_message())
        }
        _ => Ok(()),
    }
}
