use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vgdash::controller::Controller;
use vgdash::domain::{DashConfig, DashError};
use vgdash::model::{Model, Status};
use vgdash::ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about = "A tui dashboard for video game sales data.")]
struct Args {
    /// Sales file (.csv or .tsv) to load on startup
    path: Option<PathBuf>,

    /// Where to write the log, the terminal belongs to the ui
    #[arg(long, default_value = "vgdash.log")]
    log_file: PathBuf,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Maximum rendered width of a table column
    #[arg(long, default_value_t = 40)]
    max_column_width: usize,

    /// Rows shown in the exploratory preview
    #[arg(long, default_value_t = 10)]
    preview_rows: usize,

    /// Titles shown in the North America ranking
    #[arg(long, default_value_t = 10)]
    top_n: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(&args.log_file) {
        eprintln!("Error: could not open log file {}: {e}", args.log_file.display());
        return ExitCode::FAILURE;
    }

    let result = run(args);
    ratatui::restore();
    match result {
        Err(e) => {
            error!("Fatal: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(log_file: &Path) -> std::io::Result<()> {
    let file = File::create(log_file)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), DashError> {
    info!("Starting vgdash!");

    let cfg = DashConfig::default()
        .with_event_poll_time(args.poll_ms)
        .with_max_column_width(args.max_column_width)
        .with_preview_rows(args.preview_rows)
        .with_top_n(args.top_n);

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(&cfg, size.width as usize, size.height as usize);
    let mut ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    if let Some(path) = args.path
        && let Err(e) = model.load_data_file(path)
    {
        error!("Initial load failed: {e}");
        model.report_error(&e);
    }

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Quitting vgdash");
    Ok(())
}
