use std::{error::Error, io::BufRead};

use clap::{Args, Parser, Subcommand};
use engine::{BudgetStore, Engine, InitialLimit, RepeatFrequency, UserContext};
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::Database;

mod prompt;

pub(crate) type AdminResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

const PASSWORD_ATTEMPTS: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "budgetry_admin")]
#[command(about = "Bootstrap Budgetry logins and budgets")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./budgetry.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a login for the HTTP API.
    #[command(name = "user-add")]
    UserAdd(UserAdd),
    /// Create a budget for an existing login.
    #[command(name = "budget-add")]
    BudgetAdd(BudgetAdd),
}

#[derive(Args, Debug)]
struct UserAdd {
    username: String,
    /// Read the password from the first line of stdin instead of prompting.
    #[arg(long)]
    password_stdin: bool,
}

#[derive(Args, Debug)]
struct BudgetAdd {
    /// Login owning the budget.
    #[arg(long)]
    owner: String,
    name: String,
    /// Limit for the current period, e.g. `--limit 300 --every monthly`.
    #[arg(long, requires = "every")]
    limit: Option<Decimal>,
    #[arg(long, requires = "limit", value_parser = parse_frequency)]
    every: Option<RepeatFrequency>,
}

fn parse_frequency(raw: &str) -> Result<RepeatFrequency, String> {
    RepeatFrequency::try_from(raw).map_err(|err| err.to_string())
}

fn password_from_stdin() -> AdminResult<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err("empty password on stdin".into());
    }
    Ok(password)
}

async fn open_engine(database_url: &str) -> AdminResult<Engine> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

#[tokio::main]
async fn main() -> AdminResult<()> {
    let cli = Cli::parse();
    let engine = open_engine(&cli.database_url).await?;

    match cli.command {
        Command::UserAdd(args) => {
            let password = if args.password_stdin {
                password_from_stdin()?
            } else {
                prompt::new_password(PASSWORD_ATTEMPTS, prompt::read_masked, |reason| {
                    eprint!("{reason}\r\n");
                })?
            };
            let user = engine.store_user(&args.username, &password).await?;
            println!("login {} ready", user.user_id);
        }
        Command::BudgetAdd(args) => {
            let initial_limit = args
                .limit
                .zip(args.every)
                .map(|(amount, period)| InitialLimit { amount, period });
            let budget = engine
                .store_budget(
                    &UserContext::new(args.owner),
                    BudgetStore {
                        name: args.name,
                        initial_limit,
                    },
                )
                .await?;
            println!("budget {} ready as {}", budget.name, budget.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn budget_limit_needs_a_frequency() {
        let parsed = Cli::try_parse_from([
            "budgetry_admin",
            "budget-add",
            "--owner",
            "alice",
            "Groceries",
            "--limit",
            "300",
            "--every",
            "half-year",
        ])
        .unwrap();
        let Command::BudgetAdd(args) = parsed.command else {
            panic!("expected budget-add");
        };
        assert_eq!(args.every, Some(RepeatFrequency::HalfYear));
        assert_eq!(args.limit, Some(Decimal::from(300)));

        let missing = Cli::try_parse_from([
            "budgetry_admin",
            "budget-add",
            "--owner",
            "alice",
            "Groceries",
            "--limit",
            "300",
        ]);
        assert!(missing.is_err());
        let unknown = Cli::try_parse_from([
            "budgetry_admin",
            "budget-add",
            "--owner",
            "alice",
            "Groceries",
            "--limit",
            "300",
            "--every",
            "fortnightly",
        ]);
        assert!(unknown.is_err());
    }
}
