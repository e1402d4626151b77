//! Book Club console - command line front end
//!
//! Thin operator console over the lending services.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookclub_console::{
    calendar::{Clock, SystemClock},
    config::AppConfig,
    error::AppError,
    models::LoanStatus,
    services::loans::{LendingWorkspace, LoanFilter},
    AppState,
};

#[derive(Parser)]
#[command(name = "bookclub-console", version, about = "Book Club Library lending console")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and print the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOOKCLUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Summary figures and recent activity
    Dashboard,
    /// List loans
    Loans {
        #[arg(long)]
        status: Option<LoanStatus>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        reader: Option<String>,
        #[arg(long)]
        book: Option<String>,
    },
    /// Lend a book to a reader
    Lend {
        #[arg(long)]
        reader: String,
        #[arg(long)]
        book: String,
        #[arg(long)]
        days: Option<u32>,
    },
    /// Mark a loan as returned
    Return { loan_id: String },
    /// Overdue loans grouped by reader
    Overdue,
    /// E-mail a reader about all of their overdue loans
    Notify { reader_id: String },
    /// Audit log
    Audit,
    /// Recent activity feed
    Activity,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookclub_console={}", config.logging.level).into());

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Using backend {}", config.api.base_url);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::new(config, clock.clone()).context("Failed to initialise console")?;

    if let Err(e) = run(cli.command, &state, clock.as_ref()).await {
        eprintln!("error: {}", e.user_message());
        tracing::debug!("{:?}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command, state: &AppState, clock: &dyn Clock) -> Result<(), AppError> {
    let services = &state.services;

    match command {
        Command::Login { email, password } => {
            let session = services.auth.login(&email, &password).await?;
            println!("Welcome back, {}!", session.user.name);
            if let Some(exp) = session.expires_at() {
                println!("Token expires {}", exp.to_rfc3339());
            }
            println!("BOOKCLUB_TOKEN={}", session.access_token);
        }
        Command::Dashboard => {
            let summary = services.dashboard.load().await;
            println!("Total books    {}", summary.total_books);
            println!("Readers        {}", summary.total_readers);
            println!("Lendings       {}", summary.total_lendings);
            println!("Overdue        {}", summary.total_overdue);
            if !summary.monthly_lendings.is_empty() {
                println!();
                for month in &summary.monthly_lendings {
                    println!("{:<10} {}", month.month, month.count);
                }
            }
            if !summary.recent_activity.is_empty() {
                println!();
                for activity in &summary.recent_activity {
                    println!(
                        "{}  {:?}  {}",
                        activity.timestamp.format("%Y-%m-%d %H:%M"),
                        activity.kind,
                        activity.message
                    );
                }
            }
            for failure in &summary.failures {
                eprintln!("warning: {:?} unavailable: {}", failure.section, failure.error.user_message());
            }
        }
        Command::Loans {
            status,
            search,
            reader,
            book,
        } => {
            let mut workspace = LendingWorkspace::default();
            let failures = services.loans.refresh(&mut workspace).await;
            report_failures(&failures);

            let filter = LoanFilter {
                search,
                reader_id: reader,
                book_id: book,
                status,
            };
            for loan in services.loans.filtered(&workspace, &filter) {
                println!(
                    "{:<26} {:<24} {:<30} {}  {}  {}",
                    loan.id,
                    loan.reader_name(),
                    loan.book_title(),
                    clock.local_date(loan.borrowed_at),
                    clock.local_date(loan.due_date),
                    loan.status(clock)
                );
            }
        }
        Command::Lend { reader, book, days } => {
            let mut workspace = LendingWorkspace::default();
            report_failures(&services.loans.refresh(&mut workspace).await);

            let mut form = services.loans.new_form()?;
            if let Some(days) = days {
                form.set_loan_days(days)?;
            }
            form.reader_id = reader;
            form.book_id = book;
            println!("Provisional due date {}", form.due_date());

            let loan = services.loans.lend_form(&mut workspace, &form).await?;
            println!("Lending created: {} due {}", loan.id, clock.local_date(loan.due_date));
        }
        Command::Return { loan_id } => {
            let mut workspace = LendingWorkspace::default();
            report_failures(&services.loans.refresh(&mut workspace).await);

            services.loans.return_loan(&mut workspace, &loan_id).await?;
            println!("Book returned");
        }
        Command::Overdue => {
            let groups = services.overdue.load_groups().await?;
            if groups.is_empty() {
                println!("No overdue lendings");
            }
            for group in &groups {
                println!(
                    "{} <{}>",
                    group.reader_name,
                    group.reader_email.as_deref().unwrap_or("no email")
                );
                for row in services.overdue.rows(group) {
                    println!(
                        "  {:<26} {:<30} due {}  {} day(s) overdue, borrowed {} day(s) ago",
                        row.loan_id,
                        row.title,
                        clock.local_date(row.due_date),
                        row.days_overdue,
                        row.days_since_borrowed
                    );
                }
            }
        }
        Command::Notify { reader_id } => {
            let groups = services.overdue.load_groups().await?;
            let group = groups
                .iter()
                .find(|g| g.reader_id == reader_id)
                .ok_or_else(|| AppError::NotFound(format!("No overdue lendings for reader {}", reader_id)))?;
            services.overdue.notify(group).await?;
            println!("Email sent to {}", group.reader_name);
        }
        Command::Audit => {
            for log in services.audit.logs().await? {
                println!(
                    "{}  {:<20} {:<10} {:<12} {}",
                    log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    log.acting_user(),
                    log.action.to_lowercase(),
                    log.entity,
                    log.description.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Activity => {
            for activity in services.audit.recent_activity().await? {
                println!(
                    "{}  {:?}  {}",
                    activity.timestamp.format("%Y-%m-%d %H:%M"),
                    activity.kind,
                    activity.message
                );
            }
        }
    }

    Ok(())
}

fn report_failures(failures: &[bookclub_console::services::loans::LoadFailure]) {
    for failure in failures {
        eprintln!("warning: failed to load {}: {}", failure.source, failure.error.user_message());
    }
}
