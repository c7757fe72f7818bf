use std::error::Error;
use std::path::PathBuf;

use atty::Stream;
use clap::{Parser, Subcommand};
use course_catalog::query::parse_leading_int;
use course_catalog::render::{self, DetailContent, ListContent, NOT_FOUND_MESSAGE};
use course_catalog::{Catalog, Course};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};

#[derive(Parser, Debug)]
#[command(
    name = "course-catalog",
    about = "Browse and serve a course catalog",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable tables.
    #[arg(long, global = true)]
    json: bool,

    /// Catalog file to read instead of the built-in courses.
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List courses, optionally filtered by title.
    List {
        /// Case-insensitive substring matched against course titles.
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show one course.
    Show {
        /// Course identifier, read the same way the page reads `?id=`.
        id: String,
    },
    /// Check that a catalog file loads.
    Validate {
        /// JSON catalog to check.
        path: PathBuf,
    },
    /// Serve the catalog page over HTTP.
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
        /// Public base URL used in canonical links.
        #[arg(long)]
        base_url: Option<String>,
        /// `wasm-bindgen` output directory to serve under `/pkg`.
        #[arg(long, value_name = "DIR")]
        wasm_dir: Option<PathBuf>,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::List { filter } => {
            let catalog = load_catalog(cli.catalog)?;
            handle_list(&catalog, filter.unwrap_or_default(), cli.json)
        }
        Command::Show { id } => {
            let catalog = load_catalog(cli.catalog)?;
            handle_show(&catalog, &id, cli.json)
        }
        Command::Validate { path } => handle_validate(path, cli.json),
        #[cfg(feature = "web")]
        Command::Serve {
            addr,
            base_url,
            wasm_dir,
        } => handle_serve(addr, base_url, cli.catalog, wasm_dir),
    }
}

fn load_catalog(path: Option<PathBuf>) -> Result<Catalog, Box<dyn Error>> {
    match path {
        Some(path) => Catalog::from_path(&path)
            .map_err(|err| format!("Failed to load catalog {}: {err}", path.display()).into()),
        None => Ok(Catalog::builtin()),
    }
}

fn handle_list(catalog: &Catalog, filter: String, as_json: bool) -> Result<(), Box<dyn Error>> {
    let view = render::render_list(catalog, &filter);

    if as_json {
        let payload = json!({
            "filter": filter,
            "count": view.summary.as_ref().map(|summary| summary.count),
            "message": view.content.message(),
            "results": view.content.cards(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match &view.content {
        ListContent::Cards(cards) => {
            let width = cards
                .iter()
                .map(|card| card.title.chars().count())
                .max()
                .unwrap_or(0)
                .max("TITLE".len());
            println!("{:>4}  {:<width$}  {}", "ID", "TITLE", "URL", width = width);
            println!("{:->4}  {:-<width$}  {}", "", "", "---", width = width);
            for card in cards {
                println!(
                    "{:>4}  {:<width$}  {}",
                    card.id,
                    card.title,
                    card.external.href,
                    width = width
                );
            }
        }
        other => {
            if let Some(message) = other.message() {
                println!("{message}");
            }
        }
    }
    if let Some(summary) = &view.summary {
        println!("\n{}", summary.label());
    }
    Ok(())
}

fn handle_show(catalog: &Catalog, id: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let parsed =
        parse_leading_int(id).ok_or_else(|| format!("Failed to parse course ID from {id:?}"))?;
    let detail = match render::render_detail(catalog, parsed) {
        DetailContent::Course(detail) => detail,
        DetailContent::NotFound => {
            return Err(format!("{NOT_FOUND_MESSAGE} (id {parsed})").into());
        }
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("{} (#{})", detail.title, detail.id);
    render_markdown_block("Descripción", &detail.description);
    println!("\n{}: {}", detail.external.label, detail.external.href);
    Ok(())
}

fn handle_validate(path: PathBuf, as_json: bool) -> Result<(), Box<dyn Error>> {
    let catalog = Catalog::from_path(&path)
        .map_err(|err| format!("{} is not a valid catalog: {err}", path.display()))?;
    let courses: &[Course] = catalog.courses().unwrap_or_default();

    if as_json {
        let payload = json!({
            "path": path.display().to_string(),
            "valid": true,
            "courses": courses.len(),
            "ids": courses.iter().map(|course| course.id).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}: {}", path.display(), render::results_label(courses.len()));
    }
    Ok(())
}

#[cfg(feature = "web")]
fn handle_serve(
    addr: std::net::SocketAddr,
    base_url: Option<String>,
    catalog_path: Option<PathBuf>,
    wasm_dir: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    use course_catalog::web::{self, WebConfig};

    web::init_tracing();
    let config = WebConfig {
        addr,
        base_url: base_url.unwrap_or_else(|| format!("http://{addr}")),
        catalog_path,
        wasm_dir,
    };
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(web::serve(config))?;
    Ok(())
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn markdown_skin() -> MadSkin {
    MadSkin::default()
}

fn render_markdown_block(title: &str, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    println!("\n{title}:");
    if stdout_is_tty() {
        let skin = markdown_skin();
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}");
    }
}
