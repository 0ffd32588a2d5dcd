//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads or fetches data
//! - runs normalization, rebasing, and the rotation backtest
//! - prints reports
//! - writes optional exports and charts

use clap::Parser;

use crate::cli::{
    BrokerArgs, Command, FetchArgs, InputArgs, PlotArgs, RebaseArgs, RotateArgs, SummaryArgs,
};
use crate::domain::{InputSource, RotateConfig, SampleConfig, Sector};
use crate::error::AppError;
use crate::normalize::headers::sector_from_name;

pub mod pipeline;

/// Entry point for the `nrot` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Rotate(args) => handle_rotate(args),
        Command::Rebase(args) => handle_rebase(args),
        Command::Summary(args) => handle_summary(args),
        Command::Broker(args) => handle_broker(args),
        Command::Fetch(args) => handle_fetch(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_rotate(args: RotateArgs) -> Result<(), AppError> {
    let config = rotate_config_from_args(&args)?;
    let run = pipeline::run_rotation(&config)?;

    println!("{}", crate::report::format::format_run_summary(&run.ingest, &run.rebased));
    println!("{}", crate::report::format::format_window_rankings(&run.search));
    println!(
        "{}",
        crate::report::format::format_rotation_log(run.search.best(), config.top_rotations)
    );

    if args.correlation {
        let matrix = crate::report::correlation_matrix(&run.rebased);
        println!("{}", crate::report::format::format_correlation(&matrix));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_windows_csv(path, &run.search)?;
        println!("Wrote window rankings to {}", path.display());
    }
    if let Some(path) = &args.export_equity {
        crate::io::export::write_equity_json(
            path,
            &config.source.label(),
            config.cost_per_switch,
            run.search.best(),
        )?;
        println!("Wrote equity curve to {}", path.display());
    }

    Ok(())
}

fn handle_rebase(args: RebaseArgs) -> Result<(), AppError> {
    let source = input_source(&args.input)?;
    let mut ingest = pipeline::load_table(&source)?;
    if let Some(keep) = parse_sectors(&args.input.sectors)? {
        pipeline::filter_sectors(&mut ingest, &keep)?;
    }
    let rebased = crate::normalize::rebase_table(&ingest.table, args.input.anchor)?;

    println!("{}", crate::report::format::format_run_summary(&ingest, &rebased));

    if args.correlation {
        let matrix = crate::report::correlation_matrix(&rebased);
        println!("{}", crate::report::format::format_correlation(&matrix));
    }

    if let Some(path) = &args.chart {
        let events = match &args.events {
            Some(events_path) => {
                let loaded = crate::io::events::load_events(events_path)?;
                for err in &loaded.row_errors {
                    eprintln!("events line {}: {}", err.line, err.message);
                }
                loaded.events
            }
            None => Vec::new(),
        };
        crate::plot::render_sector_chart(path, &rebased, &events, args.width, args.height)?;
        println!("Wrote chart to {}", path.display());
    }

    Ok(())
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    if args.summary.is_none() && args.market_cap.is_none() {
        return Err(AppError::usage(
            "Nothing to show: pass --summary and/or --market-cap.",
        ));
    }

    let summary = match &args.summary {
        Some(path) => crate::io::summary::load_market_summary(path)?,
        None => Vec::new(),
    };
    let caps = match &args.market_cap {
        Some(path) => crate::io::summary::load_market_cap(path)?,
        None => Vec::new(),
    };

    if let Some(path) = &args.chart {
        // Turnover and market cap live on very different scales; chart
        // whichever single family was requested, preferring turnover.
        let lines: Vec<crate::plot::DatedLine> = if !summary.is_empty() {
            vec![(
                "total turnover".to_string(),
                summary
                    .iter()
                    .map(|r| (r.business_date, r.total_turnover))
                    .collect(),
            )]
        } else {
            vec![
                (
                    "market cap".to_string(),
                    caps.iter().map(|r| (r.business_date, r.mar_cap)).collect(),
                ),
                (
                    "float market cap".to_string(),
                    caps.iter().map(|r| (r.business_date, r.float_mar_cap)).collect(),
                ),
                (
                    "sensitive market cap".to_string(),
                    caps.iter().map(|r| (r.business_date, r.sen_mar_cap)).collect(),
                ),
            ]
        };
        crate::plot::render_dated_lines(
            path,
            "NEPSE market summary",
            &lines,
            &[],
            args.width,
            args.height,
        )?;
        println!("Wrote chart to {}", path.display());
    }

    println!(
        "{}",
        crate::report::format::format_market_summary(
            &tail(summary, args.tail),
            &tail(caps, args.tail),
        )
    );
    Ok(())
}

fn handle_broker(args: BrokerArgs) -> Result<(), AppError> {
    let table = crate::io::broker::load_broker_table(&args.input)?;

    for err in &table.row_errors {
        eprintln!("broker line {}: {}", err.line, err.message);
    }
    if table.zero_total > 0 {
        eprintln!("Dropped {} broker row(s) with zero turnover.", table.zero_total);
    }

    let ranking = crate::report::rank_brokers(&table.rows, args.top);
    println!("{}", crate::report::format::format_broker_ranking(&ranking));

    if let Some(path) = &args.chart {
        crate::plot::render_broker_chart(path, &ranking, args.width, args.height)?;
        println!("Wrote chart to {}", path.display());
    }

    Ok(())
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let end = args.end.unwrap_or_else(|| chrono::Local::now().date_naive());
    let client = crate::data::fetch::SectorClient::from_env()?;
    let stats = client.fetch_range(&args.out, args.start, end)?;

    if stats.days_requested == 0 {
        println!("{} is already up to date.", args.out.display());
    } else {
        println!(
            "Fetched {} day(s) ({} holiday(s)), wrote {} row(s) to {}.",
            stats.days_requested,
            stats.holidays,
            stats.rows_written,
            args.out.display(),
        );
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::export::read_equity_json(&args.equity)?;
    crate::plot::render_equity_chart(&args.out, &file, args.width, args.height)?;
    println!("Wrote chart to {}", args.out.display());
    Ok(())
}

fn rotate_config_from_args(args: &RotateArgs) -> Result<RotateConfig, AppError> {
    Ok(RotateConfig {
        source: input_source(&args.input)?,
        windows: args.windows.clone(),
        cost_per_switch: args.cost,
        anchor: args.input.anchor,
        sectors: parse_sectors(&args.input.sectors)?,
        top_rotations: args.top,
    })
}

/// Synthetic data must be opted into; running a backtest on fabricated
/// numbers because a flag was forgotten would be a silent lie.
fn input_source(args: &InputArgs) -> Result<InputSource, AppError> {
    match (&args.input, args.sample) {
        (Some(path), _) => Ok(InputSource::File(path.clone())),
        (None, true) => Ok(InputSource::Sample(SampleConfig {
            days: args.sample_days,
            seed: args.seed,
        })),
        (None, false) => Err(AppError::usage(
            "No input given: pass -i/--input <CSV> or --sample.",
        )),
    }
}

/// Resolve `--sectors` names through the same fold table as CSV headers, so
/// `banking`, `Banking SubIndex`, and `com. bank` all mean the same thing.
fn parse_sectors(names: &[String]) -> Result<Option<Vec<Sector>>, AppError> {
    if names.is_empty() {
        return Ok(None);
    }
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let sector = sector_from_name(name)
            .ok_or_else(|| AppError::usage(format!("Unknown sector '{name}'.")))?;
        if !out.contains(&sector) {
            out.push(sector);
        }
    }
    Ok(Some(out))
}

fn tail<T>(mut rows: Vec<T>, n: usize) -> Vec<T> {
    let skip = rows.len().saturating_sub(n);
    rows.drain(..skip);
    rows
}
