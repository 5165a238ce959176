use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use custody_engine::CustodyPlan;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "custody",
    version,
    about = "Query a custody plan: who has the children, and when the next handover is"
)]
struct Cli {
    /// Plan JSON file ("-" reads from stdin)
    #[arg(short, long, global = true, default_value = "-")]
    plan: String,

    /// IANA timezone used to read "now" when no date is given
    #[arg(long, global = true, default_value = "UTC")]
    tz: String,

    /// Print single-line JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Who holds custody on a date
    Holder {
        /// Date (YYYY-MM-DD); defaults to today in --tz
        #[arg(long)]
        date: Option<String>,
    },
    /// The next handover after a moment
    NextHandover {
        /// Date-time (RFC 3339, YYYY-MM-DDTHH:MM, or a date); defaults to now in --tz
        #[arg(long)]
        from: Option<String>,
    },
    /// Handovers within a date range
    Transfers(RangeArgs),
    /// Holder for every day of a date range
    Calendar(RangeArgs),
    /// Days per parent over a date range
    Share(RangeArgs),
    /// Check the plan's structure; exits 1 if invalid
    Validate,
}

#[derive(Args)]
struct RangeArgs {
    /// First date of the range (YYYY-MM-DD)
    #[arg(long)]
    start: String,
    /// Last date of the range, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let raw = read_plan(&cli.plan)?;
    let plan = CustodyPlan::from_json(&raw)
        .with_context(|| format!("failed to load plan from '{}'", cli.plan))?;
    debug!(source = %cli.plan, "plan loaded");

    let outcome = match &cli.command {
        Command::Holder { date } => commands::holder(&plan, date.as_deref(), &cli.tz)?,
        Command::NextHandover { from } => {
            commands::next_handover(&plan, from.as_deref(), &cli.tz)?
        }
        Command::Transfers(range) => commands::transfers(&plan, &range.start, &range.end)?,
        Command::Calendar(range) => commands::calendar(&plan, &range.start, &range.end)?,
        Command::Share(range) => commands::share(&plan, &range.start, &range.end)?,
        Command::Validate => commands::validate(&plan),
    };

    let rendered = if cli.compact {
        serde_json::to_string(&outcome.output)?
    } else {
        serde_json::to_string_pretty(&outcome.output)?
    };
    println!("{rendered}");

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_plan(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read plan from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read plan file '{path}'"))
    }
}
