use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use quotedoc::config::{self, config_dir, load_config, CONFIG_TEMPLATE};
use quotedoc::document::{
    document_file_name, render_document, render_report, report_file_name, RenderContext,
};
use quotedoc::error::{DocError, Result};
use quotedoc::format::format_money;
use quotedoc::model::LineItemDocument;
use quotedoc::summary::{aggregate, parse_records, Period, ReportWindow, SummaryRecord};
use quotedoc::Config;

#[derive(Parser)]
#[command(name = "quotedoc")]
#[command(version, about = "Quote, invoice and summary report PDF generator", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.quotedoc or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Render a quote, receipt or invoice from a JSON document
    Render {
        /// JSON file with the document header, items and unresolved items
        #[arg(short, long)]
        input: PathBuf,

        /// Custom output file path (default: output_dir/<KIND>-<number>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Render the periodic summary report from a JSON record export
    Report {
        /// JSON file with an array of records (or {"records": [...]})
        #[arg(short, long)]
        input: PathBuf,

        /// daily, weekly, monthly or yearly
        #[arg(short, long, default_value = "weekly")]
        period: String,

        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Reference date for the buckets (default: today)
        #[arg(long)]
        today: Option<String>,

        /// Custom output file path (default: output_dir/REPORTE-...pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Print the bucket series and status tally without rendering a PDF
    Summary {
        /// JSON file with an array of records (or {"records": [...]})
        #[arg(short, long)]
        input: PathBuf,

        /// daily, weekly, monthly or yearly
        #[arg(short, long, default_value = "weekly")]
        period: String,

        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Reference date for the buckets (default: today)
        #[arg(long)]
        today: Option<String>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Render {
            input,
            output,
            open,
        } => cmd_render(&cfg_dir, &input, output, open),
        Commands::Report {
            input,
            period,
            from,
            to,
            today,
            output,
            open,
        } => {
            let args = WindowArgs {
                period,
                from,
                to,
                today,
            };
            cmd_report(&cfg_dir, &input, &args, output, open)
        }
        Commands::Summary {
            input,
            period,
            from,
            to,
            today,
        } => {
            let args = WindowArgs {
                period,
                from,
                to,
                today,
            };
            cmd_summary(&cfg_dir, &input, &args)
        }
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(DocError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized quotedoc config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your organization details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then render your first document:");
    println!("  quotedoc render --input quote.json");

    Ok(())
}

fn require_config(cfg_dir: &Path) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(DocError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    load_config(cfg_dir)
}

fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(DocError::InputNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

fn load_document(path: &Path) -> Result<LineItemDocument> {
    let content = read_input(path)?;
    serde_json::from_str(&content).map_err(|e| DocError::InputParse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn load_records(path: &Path) -> Result<Vec<SummaryRecord>> {
    let content = read_input(path)?;
    parse_records(&content).map_err(|e| DocError::InputParse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DocError::InvalidDate(value.to_string()))
}

/// Resolve where a PDF goes: the explicit path, or the configured output dir.
fn output_path(cfg_dir: &Path, config: &Config, output: Option<PathBuf>, file_name: &str) -> Result<PathBuf> {
    let path = match output {
        Some(path) => path,
        None => config::resolve_output_dir(&config.pdf.output_dir, cfg_dir).join(file_name),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(path)
}

/// Render a quote, receipt or invoice
fn cmd_render(cfg_dir: &Path, input: &Path, output: Option<PathBuf>, open: bool) -> Result<()> {
    let config = require_config(cfg_dir)?;
    let doc = load_document(input)?;
    let ctx = RenderContext::current();

    let pdf_path = output_path(cfg_dir, &config, output, &document_file_name(&doc))?;
    let bytes = render_document(&doc, &config, &ctx)?;
    fs::write(&pdf_path, bytes)?;

    let totals = doc.totals(config.document.tax_rate);
    let currency = &config.document.currency_prefix;
    println!(
        "Generated {} {}",
        doc.header.kind,
        doc.header.display_number()
    );
    println!("  Items:    {}", doc.items.len());
    if !doc.unresolved.is_empty() {
        println!("  Missing:  {}", doc.unresolved.len());
    }
    println!("  Subtotal: {}", format_money(totals.subtotal, currency));
    println!("  Total:    {}", format_money(totals.total, currency));
    println!("  Saved:    {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

struct WindowArgs {
    period: String,
    from: Option<String>,
    to: Option<String>,
    today: Option<String>,
}

impl WindowArgs {
    fn resolve(&self) -> Result<(ReportWindow, RenderContext)> {
        let period: Period = self.period.parse()?;
        let ctx = match &self.today {
            Some(today) => {
                let now = Local::now().naive_local().time();
                RenderContext::at(parse_date(today)?.and_time(now))
            }
            None => RenderContext::current(),
        };
        let today = ctx.today();
        let (default_from, default_to) = period.default_range(today);
        let from = self.from.as_deref().map(parse_date).transpose()?;
        let to = self.to.as_deref().map(parse_date).transpose()?;

        let window = if from.is_none() && to.is_none() {
            ReportWindow::new(period, today)
        } else {
            ReportWindow::with_range(
                period,
                from.unwrap_or(default_from),
                to.unwrap_or(default_to),
                today,
            )?
        };
        Ok((window, ctx))
    }
}

/// Render the periodic summary report
fn cmd_report(
    cfg_dir: &Path,
    input: &Path,
    args: &WindowArgs,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let config = require_config(cfg_dir)?;
    let records = load_records(input)?;
    let (window, ctx) = args.resolve()?;

    let pdf_path = output_path(cfg_dir, &config, output, &report_file_name(&window))?;
    let bytes = render_report(&records, &window, &config, &ctx)?;
    fs::write(&pdf_path, bytes)?;

    let summary = aggregate(&records, &window, config.layout.top_n_items);
    println!("Generated {} report ({})", window.period, window.describe());
    println!("  Records:  {}", summary.record_count);
    println!(
        "  Revenue:  {}",
        format_money(summary.revenue, &config.document.currency_prefix)
    );
    println!("  Saved:    {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "PERIOD")]
    label: String,
    #[tabled(rename = "RECORDS")]
    count: usize,
    #[tabled(rename = "REVENUE")]
    revenue: String,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "RECORDS")]
    count: usize,
}

/// Print the bucket series and status tally
fn cmd_summary(cfg_dir: &Path, input: &Path, args: &WindowArgs) -> Result<()> {
    // The summary works without a config directory; it only needs the
    // currency prefix and the top-N size.
    let config = if cfg_dir.exists() {
        load_config(cfg_dir)?
    } else {
        Config::default()
    };
    let records = load_records(input)?;
    let (window, _) = args.resolve()?;
    let summary = aggregate(&records, &window, config.layout.top_n_items);
    let currency = &config.document.currency_prefix;

    println!("{} ({})", window.period.title(), window.describe());
    println!();

    let buckets: Vec<BucketRow> = summary
        .buckets
        .iter()
        .map(|bucket| BucketRow {
            label: bucket.label.clone(),
            count: bucket.count,
            revenue: format_money(bucket.revenue, currency),
        })
        .collect();
    println!("{}", Table::new(buckets).with(Style::rounded()));

    let statuses: Vec<StatusRow> = summary
        .tally
        .entries()
        .into_iter()
        .map(|(status, count, _)| StatusRow { status, count })
        .collect();
    println!("{}", Table::new(statuses).with(Style::rounded()));

    println!("Records:          {}", summary.record_count);
    println!("Revenue:          {}", format_money(summary.revenue, currency));
    println!("Average ticket:   {}", format_money(summary.average_ticket(), currency));
    println!("Approval rate:    {:.1}%", summary.approval_rate() * 100.0);
    println!("Distinct clients: {}", summary.distinct_clients);

    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(pdf_path)
            .spawn()
            .map_err(DocError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(pdf_path)
            .spawn()
            .map_err(DocError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", pdf_path.to_str().unwrap_or("")])
            .spawn()
            .map_err(DocError::Io)?;
    }
    Ok(())
}
