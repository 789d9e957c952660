//! Bookdash CLI - explore a book metadata CSV
//!
//! ```bash
//! bookdash serve                                   # Start HTTP server (port 3000)
//! bookdash inspect books.csv                       # Load report, genres, page bounds
//! bookdash view books.csv --view popular-genres    # Render one chart as JSON
//! bookdash table books.csv --genre Fantasy --rating 4.0..5.0 --limit 20
//! bookdash views                                   # List available views
//! ```

use bookdash::{FilterParams, Interval, ServerConfig, Session, View};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "bookdash")]
#[command(about = "Filter and summarize book metadata CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: BOOKDASH_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load a CSV and show what was kept, genres and page bounds
    Inspect {
        /// Input CSV file
        input: PathBuf,
    },

    /// Render one chart view as JSON
    View {
        /// Input CSV file
        input: PathBuf,

        /// View identifier (see `bookdash views`)
        #[arg(short, long, value_parser = parse_view)]
        view: Option<View>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the filtered book table as JSON, best rated first
    Table {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available views
    Views,
}

#[derive(Args)]
struct FilterArgs {
    /// Genre to include, matched as a substring (repeatable)
    #[arg(short, long = "genre")]
    genres: Vec<String>,

    /// Rating interval, inclusive (e.g. 3.0..5.0)
    #[arg(long, value_parser = parse_rating)]
    rating: Option<Interval<f64>>,

    /// Pages interval, inclusive (e.g. 50..500)
    #[arg(long, value_parser = parse_pages)]
    pages: Option<Interval<u32>>,

    /// Start from the full rating and page range instead of the dashboard defaults
    #[arg(long)]
    all: bool,
}

impl FilterArgs {
    fn resolve(self, session: &Session) -> FilterParams {
        let mut params = match (self.all, session.pages_bounds()) {
            (true, Some(bounds)) => FilterParams::unrestricted(bounds),
            _ => session.filters().clone(),
        };
        params.genres = self.genres;
        if let Some(rating) = self.rating {
            params.rating = rating;
        }
        if let Some(pages) = self.pages {
            params.pages = pages;
        }
        params
    }
}

fn parse_view(s: &str) -> Result<View, String> {
    View::from_str(s).map_err(|e| e.to_string())
}

fn parse_rating(s: &str) -> Result<Interval<f64>, String> {
    parse_interval(s, "rating")
}

fn parse_pages(s: &str) -> Result<Interval<u32>, String> {
    parse_interval(s, "pages")
}

fn parse_interval<T>(s: &str, field: &'static str) -> Result<Interval<T>, String>
where
    T: FromStr + PartialOrd + Copy + std::fmt::Display,
{
    let (lo, hi) = s
        .split_once("..")
        .ok_or_else(|| format!("expected LO..HI, got '{}'", s))?;
    let lo = lo.trim().parse::<T>().map_err(|_| format!("invalid lower bound '{}'", lo))?;
    let hi = hi.trim().parse::<T>().map_err(|_| format!("invalid upper bound '{}'", hi))?;
    Interval::new(field, lo, hi).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(port).await,
        Commands::Inspect { input } => cmd_inspect(&input),
        Commands::View {
            input,
            view,
            filters,
            output,
        } => cmd_view(&input, view.unwrap_or_default(), filters, output.as_deref()),
        Commands::Table {
            input,
            filters,
            limit,
            output,
        } => cmd_table(&input, filters, limit, output.as_deref()),
        Commands::Views => cmd_views(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env().with_port(port);
    bookdash::server::start_server(config).await
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::from_path(input)?;
    let report = session.report();

    let summary = json!({
        "source": input.display().to_string(),
        "report": report,
        "genres": session.genres(),
        "pagesBounds": session.pages_bounds(),
        "defaultFilters": session.filters(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_view(
    input: &Path,
    view: View,
    filters: FilterArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::from_path(input)?;
    let params = filters.resolve(&session);
    session.set_filters(params)?;

    let rendered = session.render(view)?;
    if rendered.is_empty() {
        eprintln!("No data for '{}' with the current filters", view);
    }

    write_output(&serde_json::to_string_pretty(&rendered)?, output)
}

fn cmd_table(
    input: &Path,
    filters: FilterArgs,
    limit: Option<usize>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::from_path(input)?;
    let params = filters.resolve(&session);
    session.set_filters(params)?;

    let mut table = session.display_table()?;
    eprintln!("{} of {} books match", table.len(), session.book_count());
    if let Some(n) = limit {
        table.truncate(n);
    }

    write_output(&serde_json::to_string_pretty(&table)?, output)
}

fn cmd_views() -> Result<(), Box<dyn std::error::Error>> {
    for view in View::ALL {
        let marker = if view == View::default() { " (default)" } else { "" };
        println!("  {:<24} {}{}", view.id(), view.title(), marker);
    }
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
