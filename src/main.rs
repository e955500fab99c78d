use clap::Parser;
use colored::Colorize;
use daily_ratings::config::parse_channel_list;
use daily_ratings::email::{self, EmailConfig};
use daily_ratings::report::print_report;
use daily_ratings::{
    EngineConfig, RatingsTable, Report, ReportDate, ReportError, SlotTable, generate_report,
    html_renderer,
};
use log::info;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Per-minute ratings table (JSON with "schema" and "data")
    input: PathBuf,

    /// Broadcast day being reported (YYYY-MM-DD)
    #[arg(long, short = 'D')]
    date: Option<String>,

    /// Original spreadsheet name to take the date from,
    /// e.g. "Digi 24-audiente zilnice la minut 2026-01-30.xlsx"
    #[arg(long)]
    source_name: Option<String>,

    /// Slot definitions (time_slots.json); slot rows are skipped without it
    #[arg(long, short = 's', value_name = "FILE")]
    slots: Option<PathBuf>,

    /// Comma-separated channels to report
    #[arg(long, short = 'c', default_value = "Digi 24,Antena 3 CNN")]
    channels: String,

    /// Print the HTML table instead of the terminal table
    #[arg(long, short = 'H')]
    html: bool,

    /// Print the per-channel JSON mapping instead of the terminal table
    #[arg(long, short = 'j', conflicts_with = "html")]
    json: bool,

    /// Write a standalone HTML page to FILE
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Mail the report to the configured recipients
    #[arg(long)]
    email: bool,

    /// SMTP settings file (SMTP_USER, SMTP_PASS, RECIPIENT_EMAIL)
    #[arg(long, default_value = ".email_config")]
    email_config: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{} {e}", "Error:".red());
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), ReportError> {
    let date = resolve_date(args)?;
    info!("Generating ratings report for {date}");

    let mut config = EngineConfig::default().with_channels(parse_channel_list(&args.channels));
    if let Some(path) = &args.slots {
        config = config.with_slot_table(SlotTable::load(path)?);
    }

    let table = RatingsTable::load(&args.input)?;
    let report = generate_report(&table, date, &config)?;

    if args.html {
        println!("{}", report.to_html());
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print_report(&report);
    }

    if let Some(output) = &args.output {
        fs::write(output, html_renderer::render_document(&report))?;
        info!("Report written to: {}", output.display());
    }

    if args.email {
        deliver(&report, args)?;
    }
    Ok(())
}

/// `--date` wins, then `--source-name`, then the input file name.
fn resolve_date(args: &Args) -> Result<ReportDate, ReportError> {
    if let Some(date) = &args.date {
        return date.parse();
    }
    if let Some(name) = &args.source_name {
        return ReportDate::from_filename(name);
    }
    ReportDate::from_filename(&args.input.to_string_lossy())
}

fn deliver(report: &Report, args: &Args) -> Result<(), ReportError> {
    let Some(cfg) = EmailConfig::load(&args.email_config) else {
        return Err(ReportError::Email(format!(
            "Failed to load email config from {} (expected SMTP_USER, SMTP_PASS, RECIPIENT_EMAIL)",
            args.email_config.display()
        )));
    };

    info!("Sending report to {} recipient(s)...", cfg.recipients.len());
    email::send_report(report, &cfg)
}
