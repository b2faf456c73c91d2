use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bahi_core::Taxonomy;
use bahi_parse::{CardParser, CardSummary, Categorizer};
use clap::{Parser, Subcommand};

mod pipeline;

#[derive(Parser, Debug)]
#[command(name = "bahi", version, about = "Bank and credit-card statement extraction")]
struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement file and persist its transactions
    Import {
        /// Statement file: .csv, .pdf, or flattened .txt
        file: PathBuf,

        /// Account the transactions belong to
        #[arg(long)]
        account: String,

        /// Treat the file as a credit-card statement
        #[arg(long)]
        card: bool,

        /// Print the import report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        command: AccountsCommand,
    },

    /// List the category table
    Categories,

    /// Show keyword suggestions for uncategorized rows in a statement
    Suggest {
        /// Statement file: .csv, .pdf, or flattened .txt
        file: PathBuf,
    },

    /// Summarize a credit-card statement without importing it
    CardSummary {
        /// Statement file: .pdf or flattened .txt
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum AccountsCommand {
    /// Create an account
    Add {
        name: String,

        #[arg(long)]
        bank: Option<String>,
    },

    /// List accounts
    List,
}

fn default_db_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("dev", "bahi", "bahi")
        .context("Failed to resolve the data directory")?;
    std::fs::create_dir_all(dirs.data_dir())?;
    Ok(dirs.data_dir().join("bahi.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };
    let pool = bahi_storage::create_db(&db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    bahi_storage::seed_default_categories(&pool, &Taxonomy::builtin()).await?;

    match cli.command {
        Command::Import { file, account, card, json } => {
            let Some(record) = bahi_storage::get_account_by_name(&pool, &account).await? else {
                bail!("No account named '{account}'. Create it with `bahi accounts add`");
            };
            let report = pipeline::import_statement(&pool, record.id, &file, card)
                .await
                .with_context(|| format!("Import of {} failed", file.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{}: {} parsed, {} imported, {} duplicates",
                    report.source, report.parsed, report.imported, report.duplicates
                );
                if report.low_confidence {
                    println!(
                        "No transactions could be extracted from this document. \
                         Try the bank's CSV export instead."
                    );
                }
            }
        }

        Command::Accounts { command } => match command {
            AccountsCommand::Add { name, bank } => {
                let id = bahi_storage::create_account(&pool, &name, bank.as_deref()).await?;
                println!("Created account '{name}' (#{id})");
            }
            AccountsCommand::List => {
                for account in bahi_storage::list_accounts(&pool).await? {
                    match account.bank_name {
                        Some(bank) => println!("#{} {} ({bank})", account.id, account.name),
                        None => println!("#{} {}", account.id, account.name),
                    }
                }
            }
        },

        Command::Categories => {
            let taxonomy = bahi_storage::load_taxonomy(&pool).await?;
            for category in &taxonomy.categories {
                println!(
                    "{} {} [{}]: {} keywords, {} patterns",
                    category.icon,
                    category.name,
                    category.kind,
                    category.keywords.len(),
                    category.patterns.len()
                );
            }
        }

        Command::Suggest { file } => {
            let text = pipeline::read_statement_text(&file).await?;
            let descriptions = collect_descriptions(&file, &text)?;
            let taxonomy = bahi_storage::load_taxonomy(&pool).await?;
            let categorizer = Categorizer::new(&taxonomy);

            let suggestions = categorizer.suggest(&descriptions);
            let mut buckets: Vec<_> = suggestions.iter().collect();
            buckets.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(b.0)));

            if buckets.is_empty() {
                println!("Nothing uncategorized in this statement.");
            }
            for (word, descs) in buckets.into_iter().take(20) {
                println!("{word}: {} uncategorized rows", descs.len());
            }
        }

        Command::CardSummary { file } => {
            let text = pipeline::read_statement_text(&file).await?;
            let taxonomy = bahi_storage::load_taxonomy(&pool).await?;
            let statement = CardParser::new(&taxonomy).parse(&text);
            let summary = CardSummary::generate(&statement.transactions);

            println!("{}: {} transactions", statement.issuer, summary.transaction_count);
            println!("Spend:    ₹{}", summary.total_spend);
            println!("Payments: ₹{}", summary.total_payments);
            println!("Cashback: ₹{}", summary.cashback);
            println!("By category:");
            for (category, amount) in &summary.category_breakdown {
                println!("  {category}: ₹{amount}");
            }
            println!("Top merchants:");
            for merchant in &summary.top_merchants {
                println!(
                    "  {}: ₹{} over {} transactions",
                    merchant.merchant, merchant.amount, merchant.count
                );
            }
        }
    }

    Ok(())
}

fn collect_descriptions(file: &std::path::Path, text: &str) -> Result<Vec<String>> {
    let descriptions = match pipeline::StatementKind::for_path(file, false) {
        pipeline::StatementKind::Csv => bahi_parse::parse_csv(text.as_bytes())?
            .into_iter()
            .map(|t| t.description)
            .collect(),
        _ => bahi_parse::parse_statement(text)
            .transactions
            .into_iter()
            .map(|t| t.description)
            .collect(),
    };
    Ok(descriptions)
}
