// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::Local;
use std::collections::HashMap;
use std::env;
use std::path::Path;

use expense_tracker::{
    filter_expenses, init_logging, load_csv, monthly_totals, open_store, parse_calendar_date,
    save_csv, summarize, Config, Expense, ExpenseDraft, FilterCriteria,
};

const USAGE: &str = "\
Usage: expense-tracker [COMMAND]

Without a command the terminal UI starts.

Commands:
  list [SEARCH...] [--category C] [--payment P] [--from DATE] [--to DATE]
                                                  List expenses, optionally filtered
  stats                                           Monthly totals, category breakdown, trend
  add <AMOUNT> <DATE> <CATEGORY> <PAYMENT> <DESCRIPTION...>
  edit <ID> [--amount A] [--date D] [--category C] [--payment P] [--description TEXT]
                                                  Change fields of an existing expense
  delete <ID>
  import <FILE.csv>                               Add every row of a CSV file
  export <FILE.csv>                               Write all expenses to CSV

Environment:
  EXPENSE_TRACKER_DB   database file (default: expenses.db)
  RUST_LOG             log filter (default: warn)";

fn main() -> Result<()> {
    init_logging("warn");

    let config = Config::from_env();
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None => run_ui_mode(&config),
        Some("list") => run_list(&config, &args[1..]),
        Some("stats") => run_stats(&config),
        Some("add") => run_add(&config, &args[1..]),
        Some("edit") => match args.get(1) {
            Some(id) => run_edit(&config, id, &args[2..]),
            None => bail!("edit needs an id\n\n{}", USAGE),
        },
        Some("delete") => match args.get(1) {
            Some(id) => run_delete(&config, id),
            None => bail!("delete needs an id\n\n{}", USAGE),
        },
        Some("import") => match args.get(1) {
            Some(path) => run_import(&config, Path::new(path)),
            None => bail!("import needs a CSV path\n\n{}", USAGE),
        },
        Some("export") => match args.get(1) {
            Some(path) => run_export(&config, Path::new(path)),
            None => bail!("export needs a CSV path\n\n{}", USAGE),
        },
        Some("help") | Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => bail!("unknown command '{}'\n\n{}", other, USAGE),
    }
}

fn run_list(config: &Config, args: &[String]) -> Result<()> {
    let criteria = list_criteria(args)?;
    let store = open_store(config)?;
    let expenses = filter_expenses(store.list_expenses(), &criteria);

    println!(
        "{:<15} {:<12} {:<28} {:<16} {:<14} {:>10}",
        "ID", "DATE", "DESCRIPTION", "CATEGORY", "PAYMENT", "AMOUNT"
    );
    for e in &expenses {
        println!(
            "{:<15} {:<12} {:<28} {:<16} {:<14} {:>10.2}",
            e.id, e.date, e.description, e.category, e.payment_method, e.amount
        );
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    println!("\n✓ {} expenses, total {:.2}", expenses.len(), total);
    Ok(())
}

fn run_stats(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let today = Local::now().date_naive();
    let summary = summarize(store.list_expenses(), today);

    println!("📊 Statistics ({})", today.format("%B %Y"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total this month:   {:>10.2}", summary.current_month_total);
    println!("Last month:         {:>10.2}", summary.previous_month_total);
    println!("Trend:              {:>+9.2}%", summary.trend);

    println!("\n📅 Monthly expenses");
    for month in monthly_totals(store.list_expenses()) {
        println!("  {:<10} {:>10.2}", month.label, month.total);
    }

    println!("\n🏷️  Category breakdown");
    for category in &summary.category_ranking {
        println!(
            "  {:<20} {:>10.2} {:>7.2}%",
            category.category, category.total, category.percentage
        );
    }
    Ok(())
}

fn run_add(config: &Config, args: &[String]) -> Result<()> {
    if args.len() < 5 {
        bail!("add needs amount, date, category, payment method and description\n\n{}", USAGE);
    }

    let draft = ExpenseDraft {
        amount: args[0].clone(),
        date: args[1].clone(),
        category: args[2].clone(),
        payment_method: args[3].clone(),
        description: args[4..].join(" "),
    };
    let candidate = draft.to_candidate()?;

    let mut store = open_store(config)?;
    let stored = store.add_expense(candidate)?;
    println!("✓ Added expense {}", stored.id);
    Ok(())
}

fn run_edit(config: &Config, id: &str, args: &[String]) -> Result<()> {
    let options = parse_options(args, &EDIT_OPTIONS)?;
    if !options.positional.is_empty() {
        bail!("unexpected argument '{}'\n\n{}", options.positional[0], USAGE);
    }
    if options.flags.is_empty() {
        bail!("edit needs at least one field to change\n\n{}", USAGE);
    }

    let mut store = open_store(config)?;
    let existing = match store.get_expense(id) {
        Some(expense) => expense.clone(),
        None => bail!("No expense with id {}", id),
    };

    let edited = edit_draft(&existing, &options.flags).apply_to(&existing)?;
    store.update_expense(edited)?;
    println!("✓ Updated expense {}", id);
    Ok(())
}

fn run_delete(config: &Config, id: &str) -> Result<()> {
    let mut store = open_store(config)?;
    if store.delete_expense(id)? {
        println!("✓ Deleted expense {}", id);
    } else {
        println!("No expense with id {}", id);
    }
    Ok(())
}

fn run_import(config: &Config, csv_path: &Path) -> Result<()> {
    println!("📂 Loading CSV...");
    let candidates = load_csv(csv_path)?;
    println!("✓ Loaded {} expenses from CSV", candidates.len());

    let mut store = open_store(config)?;
    let before = store.len();
    for candidate in candidates {
        store.add_expense(candidate)?;
    }

    println!("✓ Imported {} expenses ({} total)", store.len() - before, store.len());
    Ok(())
}

fn run_export(config: &Config, csv_path: &Path) -> Result<()> {
    let store = open_store(config)?;
    save_csv(csv_path, store.list_expenses())?;
    println!("✓ Exported {} expenses to {:?}", store.len(), csv_path);
    Ok(())
}

// ============================================================================
// OPTION PARSING
// ============================================================================

const LIST_OPTIONS: [&str; 4] = ["category", "payment", "from", "to"];
const EDIT_OPTIONS: [&str; 5] = ["amount", "date", "category", "payment", "description"];

#[derive(Debug, Default)]
struct Options {
    flags: HashMap<String, String>,
    positional: Vec<String>,
}

/// Split `--name value` pairs from plain words. Only names in `known` are accepted.
fn parse_options(args: &[String], known: &[&str]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.strip_prefix("--") {
            Some(name) => {
                if !known.contains(&name) {
                    bail!("unknown option '--{}'\n\n{}", name, USAGE);
                }
                let value = iter
                    .next()
                    .with_context(|| format!("--{} needs a value", name))?;
                options.flags.insert(name.to_string(), value.clone());
            }
            None => options.positional.push(arg.clone()),
        }
    }

    Ok(options)
}

fn list_criteria(args: &[String]) -> Result<FilterCriteria> {
    let options = parse_options(args, &LIST_OPTIONS)?;
    let flag = |name: &str| options.flags.get(name).cloned().unwrap_or_default();

    for bound in ["from", "to"] {
        let value = flag(bound);
        if !value.is_empty() && parse_calendar_date(&value).is_none() {
            bail!("--{} '{}' is not a date (expected YYYY-MM-DD)", bound, value);
        }
    }

    Ok(FilterCriteria::new()
        .with_search_term(options.positional.join(" "))
        .with_category(flag("category"))
        .with_payment_method(flag("payment"))
        .with_date_range(flag("from"), flag("to")))
}

/// Existing record as a draft, with the given flags overriding its fields
fn edit_draft(existing: &Expense, flags: &HashMap<String, String>) -> ExpenseDraft {
    let mut draft = ExpenseDraft::from_expense(existing);
    for (name, value) in flags {
        let field = match name.as_str() {
            "amount" => &mut draft.amount,
            "date" => &mut draft.date,
            "category" => &mut draft.category,
            "payment" => &mut draft.payment_method,
            "description" => &mut draft.description,
            _ => continue,
        };
        *field = value.clone();
    }
    draft
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let mut app = ui::App::new(store, Local::now().date_naive());
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the CLI commands: expense-tracker help");
    std::process::exit(1);
}
