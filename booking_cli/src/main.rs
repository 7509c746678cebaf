use booking_core::reconcile::{ClientPlan, RowPlan};
use booking_core::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "booksync")]
#[command(about = "Import bookings from a CSV feed into the scheduling service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to $XDG_CONFIG_HOME/booksync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the input CSV from the config
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Log debug output to the console
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import every row of the feed (default)
    Run {
        /// Fetch and match only - create nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate config and input feed without contacting the service
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(input) = cli.input {
        config.files.import_csv = input;
    }

    match cli.command {
        Some(Commands::Check) => {
            booking_core::logging::init_with_level(level);
            cmd_check(&config)
        }
        Some(Commands::Run { dry_run }) => {
            booking_core::logging::init_with_files(level, &config.files)?;
            cmd_run(&config, dry_run)
        }
        None => {
            // Default to "run" command
            booking_core::logging::init_with_files(level, &config.files)?;
            cmd_run(&config, false)
        }
    }
}

fn cmd_check(config: &Config) -> Result<()> {
    config.validate()?;
    let rows = read_rows(&config.files.import_csv)?;

    println!("✓ Config OK: company {}", config.account.company());
    println!("  API: {}", config.account.api_base());
    println!(
        "✓ Input OK: {} rows in {}",
        rows.len(),
        config.files.import_csv.display()
    );
    Ok(())
}

fn cmd_run(config: &Config, dry_run: bool) -> Result<()> {
    config.validate()?;
    // The feed is read before authenticating so a bad file costs no session
    let rows = read_rows(&config.files.import_csv)?;

    if dry_run {
        let plan = with_run_context(config, |ctx| plan_import(&mut ctx.session, &rows))
            .inspect_err(|e| tracing::error!("Dry run aborted: {}", e))?;
        display_plan(&plan);
        return Ok(());
    }

    let report = with_run_context(config, |ctx| {
        run_import(&mut ctx.session, &rows, ctx.run_id)
    })
    .inspect_err(|e| tracing::error!("Import aborted: {}", e))?;

    if let Some(ref path) = config.files.rejects_csv {
        write_rejects(path, &report)?;
    }

    display_report(&report, config);
    Ok(())
}

fn display_report(report: &ImportReport, config: &Config) {
    println!();
    println!("Run {}", report.run_id);
    println!(
        "  Started:  {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  {}", report.summary());

    if report.rejected().next().is_some() {
        println!();
        for record in report.rejected() {
            println!(
                "  ✗ row {}: {} - {}",
                record.row_number,
                record.row.email,
                record.outcome.reason().unwrap_or_default()
            );
        }
        if let Some(ref path) = config.files.rejects_csv {
            println!();
            println!("  Rejected rows written to {}", path.display());
        }
    }
}

fn display_plan(plan: &[PlannedRow]) {
    let mut bookings = 0;
    let mut new_clients = 0;
    let mut skipped = 0;
    let mut failing = 0;

    for planned in plan {
        match &planned.plan {
            RowPlan::Skip(reason) => {
                skipped += 1;
                println!("  ✗ row {}: skip ({})", planned.row_number, reason);
            }
            RowPlan::Fail(reason) => {
                failing += 1;
                println!("  ✗ row {}: would fail ({})", planned.row_number, reason);
            }
            RowPlan::Book {
                service_id,
                provider_id,
                client,
            } => {
                bookings += 1;
                let client = match client {
                    ClientPlan::Existing(id) => format!("client {}", id),
                    ClientPlan::Create => {
                        new_clients += 1;
                        "new client".to_string()
                    }
                    ClientPlan::CreatedEarlier => "client created by an earlier row".to_string(),
                };
                println!(
                    "  → row {}: book service {} with provider {} for {}",
                    planned.row_number, service_id, provider_id, client
                );
            }
        }
    }

    println!();
    println!(
        "[Dry run - nothing created] {} bookings, {} new clients, {} skipped, {} failing",
        bookings, new_clients, skipped, failing
    );
}
