use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use barksy::ClientError;
use barksy::config::ClientConfig;
use barksy::listing::{ListingWorkflow, SortKey};
use barksy::models::SelectedFile;
use barksy::router::Route;
use barksy::transport::HttpFileService;
use barksy::upload::UploadWorkflow;
use barksy::version::VERSION;

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a file with tags
    Upload {
        path: PathBuf,
        /// Tag to attach; repeat for several
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Start from an empty tag set instead of the server's stored tags
        #[arg(long)]
        no_existing: bool,
    },
    /// Show the tags already stored for a file
    Tags { path: PathBuf },
    /// List uploaded files
    List {
        /// Column click (filename, uploadDate, tags); repeat a key to reverse
        #[arg(short, long = "sort")]
        sort: Vec<SortKey>,
        /// Only show files carrying every given tag
        #[arg(short, long = "filter")]
        filter: Vec<String>,
    },
    /// Resolve a page path
    Route { path: String },
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "barksy.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // stdout carries command output
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

async fn upload(
    service: &HttpFileService,
    path: PathBuf,
    tags: Vec<String>,
    no_existing: bool,
) -> Result<(), ClientError> {
    let mut workflow = UploadWorkflow::new();
    workflow.select_file(SelectedFile::read(&path).await?);

    if !no_existing {
        workflow.load_existing_tags(service).await?;
    }
    for tag in &tags {
        if !workflow.add_tag(tag) {
            eprintln!("Skipping tag {tag:?}: only letters, digits, '_' and '-' are allowed.");
        }
    }

    let valid = workflow.is_form_valid();
    if let Some(outcome) = workflow.submit(valid, service).await? {
        println!("{}", outcome.message);
        println!("-> {}", outcome.navigate_to);
    }
    Ok(())
}

async fn show_tags(service: &HttpFileService, path: PathBuf) -> Result<(), ClientError> {
    let mut workflow = UploadWorkflow::new();
    workflow.select_file(SelectedFile::read(&path).await?);
    workflow.load_existing_tags(service).await?;

    if workflow.tags().is_empty() {
        println!("No tags stored for {}", path.display());
    }
    for tag in workflow.tags().iter() {
        println!("{tag}");
    }
    Ok(())
}

async fn list(
    service: &HttpFileService,
    sort: Vec<SortKey>,
    filter: Vec<String>,
) -> Result<(), ClientError> {
    let mut workflow = ListingWorkflow::new(service.endpoints().downloads.clone());
    workflow.initialize(service).await?;

    for key in sort {
        workflow.set_sort_key(key);
    }
    for tag in filter {
        workflow.add_filter_tag(tag);
    }

    let visible = workflow.visible_files();
    info!(
        total = workflow.files().len(),
        visible = visible.len(),
        "Listing files."
    );
    for file in visible {
        let link = workflow.download_url(file)?;
        println!(
            "{}\t{}\t{}\t{}",
            file.filename,
            file.upload_date,
            file.tags.join(", "),
            link
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Keep the short version output.
    if std::env::args().any(|arg| arg == "--version") {
        println!("barksy version: {VERSION}");
        return ExitCode::SUCCESS;
    }

    let args = Args::parse();

    let config = match ClientConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log_dir);
    info!(version = VERSION, "Starting barksy.");

    if let Command::Route { path } = &args.command {
        println!("{}", Route::resolve(path));
        return ExitCode::SUCCESS;
    }

    let endpoints = match config.endpoints() {
        Ok(endpoints) => endpoints,
        Err(e) => {
            error!(error = %e, "Invalid endpoint configuration.");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let service = HttpFileService::new(endpoints);

    let result = match args.command {
        Command::Upload { path, tags, no_existing } => {
            upload(&service, path, tags, no_existing).await
        }
        Command::Tags { path } => show_tags(&service, path).await,
        Command::List { sort, filter } => list(&service, sort, filter).await,
        Command::Route { .. } => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            warn!(error = %e, "Command failed.");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
