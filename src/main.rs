use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use finantrack::ledger::{self, CategoryBudget, Transaction};
use finantrack::suggest::{self, CommandGenerator, ReplayGenerator, TextGenerator};
use finantrack::{Config, Error, Result};

#[derive(Parser)]
#[command(name = "finantrack")]
#[command(about = "Budget suggestions and safe recommendation rendering")]
struct Cli {
    /// Config file (defaults to finantrack.toml in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a markdown recommendation to HTML
    Render {
        /// Input markdown file (reads stdin when omitted or "-")
        input: Option<PathBuf>,

        /// Output HTML file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use the full markdown converter instead of the recommendation subset
        #[arg(long)]
        full: bool,
    },

    /// Print the budget-suggestion prompt
    Prompt {
        /// Monthly income or budget amount
        #[arg(long)]
        income: f64,

        /// JSON file with the transaction list
        #[arg(long)]
        transactions: PathBuf,
    },

    /// Request a budget suggestion and print the plan and recommendation
    Suggest {
        /// Monthly income or budget amount
        #[arg(long)]
        income: f64,

        /// JSON file with the transaction list
        #[arg(long)]
        transactions: PathBuf,

        /// Use a saved response instead of calling a generator
        #[arg(long, conflicts_with = "command")]
        response: Option<PathBuf>,

        /// Generator program and arguments; the prompt is written to its stdin
        #[arg(long, num_args = 1.., allow_hyphen_values = true)]
        command: Vec<String>,

        /// Write the recommendation HTML to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize one month of transactions
    Summary {
        /// JSON file with the transaction list
        #[arg(long)]
        transactions: PathBuf,

        /// Month as YYYY-MM
        #[arg(long)]
        month: String,

        /// JSON file with category budgets, for warnings
        #[arg(long)]
        budgets: Option<PathBuf>,
    },

    /// Income and expense trends (last 6 months by default) and one week of daily expenses
    Report {
        /// JSON file with the transaction list
        #[arg(long)]
        transactions: PathBuf,

        /// Every month of this year instead of the last 6 months
        #[arg(long, conflicts_with_all = ["from", "to"])]
        year: Option<i32>,

        /// Start of a custom range, YYYY-MM-DD
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// End of a custom range, YYYY-MM-DD (inclusive)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,

        /// Any day of the week to break down (defaults to today)
        #[arg(long)]
        week_of: Option<NaiveDate>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    let (config, config_path) = Config::discover(cli.config.as_deref(), &cwd)?;
    match &config_path {
        Some(path) => log::debug!("Using config from: {}", path.display()),
        None => log::debug!("Using default config"),
    }

    match cli.command {
        Commands::Render {
            input,
            output,
            full,
        } => {
            let markdown = read_input(input.as_deref())?;
            let html = if full {
                finantrack::markdown_to_sanitized_html(&markdown)
            } else {
                finantrack::render(&markdown)
            };
            write_output(output.as_deref(), &html)
        }
        Commands::Prompt {
            income,
            transactions,
        } => {
            let transactions: Vec<Transaction> = read_json(&transactions)?;
            let input = suggest::SuggestBudgetInput {
                total_income: income,
                transaction_history: suggest::transaction_history(
                    &transactions,
                    &config.budget.currency,
                ),
            };
            println!("{}", suggest::build_prompt(&input, &config.budget));
            Ok(())
        }
        Commands::Suggest {
            income,
            transactions,
            response,
            command,
            output,
        } => {
            let transactions: Vec<Transaction> = read_json(&transactions)?;
            let generator = pick_generator(response, &command, &config)?;
            let suggestion =
                suggest::suggest_budget(generator.as_ref(), &transactions, income, &config)?;

            let currency = &config.budget.currency;
            let budgets = suggestion.apply_to(&config.budget.expense_categories);
            for budget in &budgets {
                println!("{:<12} {}{:.2}", budget.category, currency, budget.amount);
            }
            println!(
                "{:<12} {}{:.2}",
                "Total",
                currency,
                ledger::total_budget(&budgets)
            );

            let html = suggestion.display_html();
            if output.is_none() {
                println!();
            }
            write_output(output.as_deref(), &html)
        }
        Commands::Summary {
            transactions,
            month,
            budgets,
        } => {
            let (year, month) = ledger::parse_period(&month).ok_or_else(|| {
                Error::InvalidInput(format!("month must be YYYY-MM, got {:?}", month))
            })?;
            let transactions: Vec<Transaction> = read_json(&transactions)?;
            let summary = ledger::monthly_summary(&transactions, year, month);
            let currency = &config.budget.currency;

            println!("Period   {}", ledger::period_id(year, month));
            println!("Income   {}{:.2}", currency, summary.total_income);
            println!("Expenses {}{:.2}", currency, summary.total_expenses);
            println!("Balance  {}{:.2}", currency, summary.balance());
            for (category, amount) in &summary.expenses_by_category {
                println!("  {:<12} {}{:.2}", category, currency, amount);
            }

            if let Some(path) = budgets {
                let budgets: Vec<CategoryBudget> = read_json(&path)?;
                let threshold = config.alerts.budget_warning_percent;
                for warning in ledger::budget_warnings(&budgets, &summary, threshold) {
                    println!(
                        "Warning: {:.0}% of the {} budget spent",
                        warning.percent, warning.category
                    );
                }
            }
            Ok(())
        }
        Commands::Report {
            transactions,
            year,
            from,
            to,
            week_of,
        } => {
            let transactions: Vec<Transaction> = read_json(&transactions)?;
            let today = Utc::now().date_naive();
            let rows = match (year, from, to) {
                (_, Some(from), Some(to)) => {
                    if from > to {
                        return Err(Error::InvalidInput(format!(
                            "range starts after it ends: {} > {}",
                            from, to
                        )));
                    }
                    vec![ledger::range_totals(&transactions, from, to)]
                }
                (Some(year), _, _) => {
                    ledger::monthly_trends(&transactions, &ledger::year_months(year))
                }
                _ => ledger::monthly_trends(&transactions, &ledger::last_months(today, 6)),
            };
            let currency = &config.budget.currency;

            println!("{:<20} {:>12} {:>12}", "Period", "Income", "Expenses");
            for row in &rows {
                println!(
                    "{:<20} {:>12} {:>12}",
                    row.label,
                    format!("{}{:.2}", currency, row.income),
                    format!("{}{:.2}", currency, row.expense)
                );
            }

            println!();
            for day in ledger::weekly_expenses(&transactions, week_of.unwrap_or(today)) {
                println!(
                    "{:<10} {} {}{:.2}",
                    ledger::weekday_name(day.weekday),
                    day.date,
                    currency,
                    day.expense
                );
            }
            Ok(())
        }
    }
}

fn pick_generator(
    response: Option<PathBuf>,
    command: &[String],
    config: &Config,
) -> Result<Box<dyn TextGenerator>> {
    if let Some(path) = response {
        return Ok(Box::new(ReplayGenerator::new(path)));
    }
    let argv = if command.is_empty() {
        config.generator.command.as_slice()
    } else {
        command
    };
    match CommandGenerator::from_argv(argv) {
        Some(generator) => Ok(Box::new(generator)),
        None => Err(Error::InvalidInput(
            "no generator: pass --response or --command, or set [generator] command".to_string(),
        )),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).map_err(|e| Error::io(path, e))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| Error::io("<stdin>", e))?;
            Ok(buf)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

fn write_output(path: Option<&Path>, html: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, html).map_err(|e| Error::io(path, e))?;
            log::info!("Created {}", path.display());
            Ok(())
        }
        None => {
            println!("{}", html);
            Ok(())
        }
    }
}
