use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use triage_core::config::ViewConfig;
use triage_core::export::{export_view, ExportFormat};
use triage_core::record::{records_from_json_str, Record, RecordId};
use triage_core::view::{CollectionView, SortDirection, SortSpec};

#[derive(Debug, Parser)]
#[command(name = "view_runner")]
#[command(about = "Apply a filter/sort/selection view to a JSON record fixture")]
struct Cli {
    /// JSON array of records, each with an `id`.
    #[arg(long)]
    records: PathBuf,

    /// Built-in page preset (cases, evidence, audit_logs, alerts, timeline,
    /// users, investigation_timeline).
    #[arg(long, conflicts_with = "config")]
    preset: Option<String>,

    /// View config JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// `control=value`, as a filter control would emit it. Repeatable.
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// RFC 3339 instant "last N days" filters count back from; defaults to now.
    #[arg(long)]
    now: Option<String>,

    /// `field` or `field:asc|desc`.
    #[arg(long)]
    sort: Option<String>,

    /// Record id to select. Repeatable.
    #[arg(long = "select")]
    select: Vec<String>,

    /// Select every visible record.
    #[arg(long)]
    select_all: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Comma-separated columns; defaults to every field seen in the fixture.
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Write csv/json output here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() {
    init_tracing();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("view_runner error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match (&cli.preset, &cli.config) {
        (Some(name), _) => ViewConfig::preset(name).ok_or_else(|| anyhow!("unknown preset {}", name))?,
        (None, Some(path)) => {
            ViewConfig::load(path).with_context(|| format!("loading view config {}", path.display()))?
        }
        (None, None) => return Err(anyhow!("either --preset or --config is required")),
    };
    let raw = fs::read_to_string(&cli.records)
        .with_context(|| format!("reading records {}", cli.records.display()))?;
    let records = records_from_json_str(&raw)?;
    let mut columns = cli.columns.clone();
    if columns.is_empty() {
        columns = all_columns(&records);
    }

    let now = match &cli.now {
        Some(s) => OffsetDateTime::parse(s, &Rfc3339).with_context(|| format!("parsing --now {}", s))?,
        None => OffsetDateTime::now_utc(),
    };

    let mut view = CollectionView::new(config, records)?;
    view.set_reference_time(now)?;
    for f in &cli.filters {
        let (control, value) = f
            .split_once('=')
            .ok_or_else(|| anyhow!("filter must be control=value, got {}", f))?;
        view.set_filter_value(control.trim(), value)?;
    }
    if let Some(sort) = &cli.sort {
        view.set_sort(Some(parse_sort(sort)?))?;
    }
    for id in &cli.select {
        view.toggle_select(&RecordId::new(id.as_str()))?;
    }
    if cli.select_all {
        view.toggle_select_all();
    }

    tracing::info!(
        view = %view.config().view_id,
        visible = view.summary().visible,
        total = view.summary().total,
        "view derived"
    );

    match cli.format {
        OutputFormat::Table => print_table(&view, &columns),
        OutputFormat::Csv | OutputFormat::Json => {
            let format = match cli.format {
                OutputFormat::Csv => ExportFormat::CSV,
                _ => ExportFormat::JSON,
            };
            let outcome = export_view(&view.derived(), &columns, format)?;
            match &cli.out {
                Some(path) => {
                    fs::write(path, &outcome.bytes)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
                None => print!("{}", String::from_utf8_lossy(&outcome.bytes)),
            }
        }
    }
    Ok(())
}

fn parse_sort(s: &str) -> Result<SortSpec> {
    let (field, dir) = s.split_once(':').unwrap_or((s, "asc"));
    let direction = match dir {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => return Err(anyhow!("sort direction must be asc or desc, got {}", other)),
    };
    Ok(SortSpec {
        field: field.to_string(),
        direction,
    })
}

fn all_columns(records: &[Record]) -> Vec<String> {
    let mut cols: Vec<String> = vec!["id".to_string()];
    for r in records {
        for (name, _) in r.fields() {
            if !cols.iter().any(|c| c == name) {
                cols.push(name.to_string());
            }
        }
    }
    cols
}

fn print_table(view: &CollectionView, columns: &[String]) {
    let rows: Vec<Vec<String>> = view
        .derived()
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| r.get(c).map(|v| v.render()).unwrap_or_default())
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| rows.iter().map(|row| row[i].chars().count()).fold(c.len(), usize::max))
        .collect();

    let line = |cells: &[String], mark: &str| {
        let body: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect();
        println!("{} {}", mark, body.join("  "));
    };
    line(columns, " ");
    for (row, r) in rows.iter().zip(view.derived()) {
        line(row.as_slice(), if view.is_selected(&r.id) { "*" } else { " " });
    }

    let summary = view.summary();
    println!();
    println!(
        "showing {} of {} records, {} selected ({:?})",
        summary.visible,
        summary.total,
        summary.selected,
        view.selection_status()
    );
    for chip in view.active_filter_chips() {
        println!("filter {}: {}", chip.label, chip.value);
    }
}
