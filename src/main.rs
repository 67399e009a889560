// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use doc_analytics::utils::logging::{
    format_error, format_info, format_label, format_step, format_success, format_warning,
};
use doc_analytics::{
    ClassificationOutcome, Config, DocumentAnalytics, FetchOutcome, FetchReport, Highlighter,
    Validator, render_html_report,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "doc_analytics")]
#[command(version)]
#[command(about = "Search, sort and classify PDF and DOCX documents", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy PDF/DOCX files into the document folder and mirror them remotely
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Download a document by URL, or every document linked from a page
    Fetch {
        url: String,

        #[arg(long)]
        scrape: bool,
    },

    /// List documents ordered by extracted title
    Sort,

    /// Find documents containing a keyword
    Search {
        keyword: String,

        /// Write highlighted full texts of matching documents to this file
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        #[arg(long, default_value_t = 5)]
        max_matches: usize,
    },

    /// Label documents by keyword and train a naive Bayes classifier
    Classify,

    /// Folder size and average time per operation
    Stats,

    /// List files in the remote storage folder
    RemoteList,

    /// Check the document folder and remote storage access
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    doc_analytics::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::default_config()
    };

    let mut app = DocumentAnalytics::open(config)
        .await
        .context("Failed to initialise document analytics")?;

    let outcome = match cli.command {
        Commands::Upload { files } => cmd_upload(&mut app, &files).await,
        Commands::Fetch { url, scrape } => cmd_fetch(&mut app, &url, scrape).await,
        Commands::Sort => cmd_sort(&mut app).await,
        Commands::Search {
            keyword,
            html,
            max_matches,
        } => cmd_search(&mut app, &keyword, html, max_matches).await,
        Commands::Classify => cmd_classify(&mut app).await,
        Commands::Stats => cmd_stats(&app),
        Commands::RemoteList => cmd_remote_list(&app).await,
        Commands::Health => cmd_health(&app).await,
    };

    app.save_session()
        .await
        .context("Failed to save session state")?;

    outcome
}

async fn cmd_upload(app: &mut DocumentAnalytics, files: &[PathBuf]) -> Result<()> {
    for file in files {
        Validator::validate_file_path(file)?;
    }

    let report = app.upload(files).await?;

    for path in &report.saved {
        println!("{}", format_success(&format!("Saved {}", path.display())));
    }
    for name in &report.skipped {
        println!(
            "{}",
            format_info(&format!("Skipped {} (unsupported or already uploaded)", name))
        );
    }
    for remote in &report.remote_uploaded {
        println!("{}", format_success(&format!("Mirrored to {}", remote)));
    }
    for warning in &report.warnings {
        println!("{}", format_warning(warning));
    }

    println!(
        "{}",
        format_success(&format!(
            "File processing complete! ({})",
            report.stats.format()
        ))
    );
    Ok(())
}

async fn cmd_fetch(app: &mut DocumentAnalytics, url: &str, scrape: bool) -> Result<()> {
    Validator::validate_url(url)?;

    match app.fetch(url, scrape).await? {
        FetchReport::Direct(outcome) => print_fetch_outcome(&outcome),
        FetchReport::Scraped(report) => {
            if report.links.is_empty() {
                println!("{}", format_warning("No document links found on this page"));
                return Ok(());
            }

            println!("Found {} document links", report.links.len());
            let total = report.outcomes.len();
            for (index, outcome) in report.outcomes.iter().enumerate() {
                print!("{} ", format_step(index + 1, total, ""));
                print_fetch_outcome(outcome);
            }
            println!(
                "{}",
                format_info(&format!("Downloaded {} of {}", report.saved_count(), total))
            );
        }
    }

    Ok(())
}

fn print_fetch_outcome(outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Saved { url, path } => println!(
            "{}",
            format_success(&format!("Fetched {} from {}", path.display(), url))
        ),
        FetchOutcome::Unsupported {
            url,
            content_type,
            file_name,
        } => println!(
            "{}",
            format_warning(&format!(
                "Unsupported file type from {} (Content-Type: {}, file name: {})",
                url, content_type, file_name
            ))
        ),
        FetchOutcome::Failed { url, reason } => println!(
            "{}",
            format_error(&format!("Failed to download {}: {}", url, reason))
        ),
    }
}

async fn cmd_sort(app: &mut DocumentAnalytics) -> Result<()> {
    let sorted = app.sort_by_title().await?;

    if sorted.is_empty() {
        println!("{}", format_info("No documents to sort"));
        return Ok(());
    }

    println!("Sorted Files:");
    for doc in &sorted {
        println!("📄 {} → {}", doc.name, doc.title);
    }
    Ok(())
}

async fn cmd_search(
    app: &mut DocumentAnalytics,
    keyword: &str,
    html: Option<PathBuf>,
    max_matches: usize,
) -> Result<()> {
    Validator::validate_keyword(keyword)?;

    let results = app.search(keyword).await?;

    if results.is_empty() {
        println!("{}", format_warning("No matches found."));
        return Ok(());
    }

    println!("Files matching \"{}\":\n", keyword);
    for (name, result) in &results {
        println!("{}", format_success(name));
        println!("{}", result.format_summary(max_matches));
    }

    if let Some(path) = html {
        let highlighter = Highlighter::with_color(&app.config().search.highlight_color);
        let report = render_html_report(&results, &highlighter);
        std::fs::write(&path, report)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "{}",
            format_info(&format!("Highlighted report written to {}", path.display()))
        );
    }

    Ok(())
}

async fn cmd_classify(app: &mut DocumentAnalytics) -> Result<()> {
    let outcome = app.classify().await?;

    match &outcome {
        ClassificationOutcome::NothingToClassify => {
            println!("{}", format_info("No documents available for classification."));
        }
        ClassificationOutcome::InsufficientDiversity { records, .. } => {
            println!(
                "{}",
                format_warning(
                    "Not enough documents in one or more categories to train the classifier."
                )
            );
            println!("Classification Results (Keyword Match):");
            for record in records {
                println!("{}", format_label(&record.name, record.heuristic_label.as_str()));
            }
        }
        ClassificationOutcome::Trained(trained) => {
            if trained.single_class {
                println!(
                    "{}",
                    format_warning("All documents share one category; the model is degenerate.")
                );
            }
            println!("Classification Results:");
            for record in &trained.records {
                println!("{}", format_label(&record.name, record.effective_label().as_str()));
            }

            match &trained.report {
                Some(report) => {
                    println!("\nClassification Metrics:");
                    println!("{}", report.format());
                }
                None => println!(
                    "{}",
                    format_info(
                        "Not enough diverse documents for classification metrics after splitting."
                    )
                ),
            }
            println!(
                "{}",
                format_success(&format!(
                    "Model saved to {}",
                    app.config().classifier.model_path.display()
                ))
            );
        }
    }

    Ok(())
}

fn cmd_stats(app: &DocumentAnalytics) -> Result<()> {
    let stats = app.stats()?;
    println!("{}", stats.format());
    Ok(())
}

async fn cmd_remote_list(app: &DocumentAnalytics) -> Result<()> {
    let files = app
        .remote_files()
        .await
        .context("Failed to list remote files")?;

    if files.is_empty() {
        println!("{}", format_info("Remote folder is empty"));
        return Ok(());
    }

    for file in &files {
        let modified = file
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} {:>10.1} KB  {}  {}",
            file.name,
            file.size as f64 / 1024.0,
            modified,
            file.path
        );
    }
    Ok(())
}

async fn cmd_health(app: &DocumentAnalytics) -> Result<()> {
    let report = app.health().await;
    println!("{}", report.format());
    Ok(())
}
