use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use custdash::controller::Controller;
use custdash::data;
use custdash::domain::{DashConfig, DashError};
use custdash::model::{Model, RunState};
use custdash::pipeline;
use custdash::ui::TableUi;

#[derive(Parser, Debug)]
#[command(name = "custdash", version, about = "A tui based customer accounts dashboard.")]
struct Cli {
    /// CSV file with the columns id,name,email,plan,status,signup_date,spend
    file: Option<String>,

    /// Demo records to generate when no file is given
    #[arg(long, default_value_t = data::DEMO_ROWS)]
    rows: usize,

    /// Seed for the demo data generator
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Initial page size (5, 10, 20 or 50)
    #[arg(long, default_value_t = pipeline::DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Append logs to this file, level via RUST_LOG (default custdash=info)
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> ExitCode {
    let result = run();
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<(), DashError> {
    let cli = Cli::parse();
    if let Some(path) = cli.log.as_deref() {
        init_tracing(path)?;
    }
    if !pipeline::PAGE_SIZES.contains(&cli.page_size) {
        return Err(DashError::BadPageSize(cli.page_size));
    }

    let (records, source_label, bad_dates) = match cli.file.as_deref() {
        Some(raw) => {
            let expanded =
                shellexpand::full(raw).map_err(|e| DashError::LoadingFailed(e.to_string()))?;
            let path = PathBuf::from(expanded.as_ref());
            let report = data::load_csv(&path)?;
            let label = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("csv")
                .to_string();
            (report.records, label, report.bad_dates)
        }
        None => {
            info!("generating {} demo records with seed {}", cli.rows, cli.seed);
            let records = data::demo_records(cli.rows, cli.seed);
            (records, "demo data".to_string(), 0)
        }
    };

    let config = DashConfig::default();
    let mut model = Model::new(records, source_label, cli.page_size, bad_dates);
    let ui = TableUi::new(&config);
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    while model.run_state != RunState::Quitting {
        // Render the current view
        terminal.draw(|frame| ui.draw(&model, frame))?;

        // Handle events and map them to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message);
        }
    }

    Ok(())
}

fn init_tracing(path: &Path) -> Result<(), DashError> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("custdash=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| DashError::LoadingFailed(format!("tracing init failed: {e}")))?;
    Ok(())
}
