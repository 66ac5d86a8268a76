use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{debug, info};

use taco_table::color::ColorScheme;
use taco_table::column::{Column, Summarizer};
use taco_table::controller::Controller;
use taco_table::domain::{DataType, SortDirection, TableError, ViewerConfig};
use taco_table::format::dec_format;
use taco_table::load::load_table_file;
use taco_table::logging::{LogConfig, LogTarget, init_logging};
use taco_table::plugin::{HEATMAP_ID, Heatmap, HighlightOnly, HighlightOptions, Plugin, PluginConfig};
use taco_table::summarize::{composite_summarizer, mean_summarizer, min_max_summarizer};
use taco_table::table::{BottomRows, Table, TableConfig};
use taco_table::td_class_names::min_max_class_name;
use taco_table::ui::{TableUI, render_text};
use taco_table::value::Value;
use taco_table::viewer::{Status, Viewer};

#[derive(Debug, Parser)]
#[command(
    name = "taco",
    version,
    about = "Sortable, summarized and heatmapped tables in the terminal"
)]
struct Args {
    /// CSV, Parquet or Arrow IPC file. `~` and environment variables are expanded.
    path: String,

    /// Column to sort by on start.
    #[arg(long, value_name = "COLUMN")]
    sort: Option<String>,

    /// Sort the start column descending.
    #[arg(long)]
    descending: bool,

    /// Heatmap color scheme of numeric columns.
    #[arg(long, default_value = "Blues")]
    scheme: ColorScheme,

    /// Only color the highlighted row and column.
    #[arg(long)]
    highlight_only: bool,

    /// Show min, mean and max of numeric columns below the table and mark
    /// the extreme cells.
    #[arg(long)]
    summary: bool,

    /// Decimals shown for numbers.
    #[arg(long, value_name = "N")]
    decimals: Option<usize>,

    /// Print the table as text instead of opening the viewer.
    #[arg(long)]
    print: bool,

    /// Write logs to a file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Event poll time of the viewer in ms.
    #[arg(long, default_value_t = 100)]
    poll: u64,

    /// -v for debug, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: Args) -> Result<(), TableError> {
    let target = match (&args.log_file, args.print) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Off,
    };
    init_logging(&LogConfig::from_verbosity(args.verbose, target))?;

    let path = shellexpand::full(&args.path)
        .map_err(|e| TableError::InvalidPath(e.to_string()))?
        .into_owned();
    let loaded = load_table_file(&PathBuf::from(path))?;
    info!(
        "Loaded {} with {} columns",
        loaded.name,
        loaded.columns.len()
    );

    let columns: Vec<Column> = loaded
        .columns
        .into_iter()
        .map(|column| configure_column(column, &args))
        .collect();

    let heatmap: Arc<dyn Plugin> = if args.highlight_only {
        Arc::new(HighlightOnly::new(Heatmap, HighlightOptions::default()))
    } else {
        Arc::new(Heatmap)
    };

    let mut config = TableConfig::default().column_highlighting(true);
    if let Some(column_id) = &args.sort {
        config = config
            .initial_sort_column_id(column_id.clone())
            .initial_sort_direction(SortDirection::from(!args.descending));
    }
    if args.summary {
        config = config.bottom_rows(BottomRows::FromColumns);
    }
    let table = Table::new(columns, loaded.rows, vec![heatmap], config);

    if args.print {
        println!("{}", render_text(&table.view()));
        return Ok(());
    }

    let mut terminal = ratatui::init();
    let result = run_viewer(&mut terminal, loaded.name, table, args.poll);
    ratatui::restore();
    result
}

fn configure_column(column: Column, args: &Args) -> Column {
    if column.data_type != DataType::Number {
        return column;
    }

    let mut column =
        column.plugin_config(HEATMAP_ID, PluginConfig::default().color_scheme(args.scheme));
    if let Some(decimals) = args.decimals {
        column = column.formatter(dec_format(decimals));
    }
    if args.summary {
        let decimals = args.decimals.unwrap_or(2);
        let min_max: Summarizer = Arc::new(min_max_summarizer);
        let mean: Summarizer = Arc::new(mean_summarizer);
        column = column
            .summarize(composite_summarizer(vec![min_max, mean]))
            .td_class_name_fn(min_max_class_name)
            .bottom_fn(move |ctx| {
                let Some(summary) = ctx.column_summary else {
                    return Value::Null;
                };
                let format = dec_format(decimals);
                Value::from(format!(
                    "{} / {} / {}",
                    format(summary.get("min")),
                    format(summary.get("mean")),
                    format(summary.get("max"))
                ))
            });
    }
    column
}

fn run_viewer(
    terminal: &mut DefaultTerminal,
    name: String,
    table: Table,
    event_poll_time: u64,
) -> Result<(), TableError> {
    let size = terminal.size()?;
    let mut viewer = Viewer::new(name, table, size.width as usize, size.height as usize);
    let ui = TableUI::new();
    let controller = Controller::new(&ViewerConfig { event_poll_time });

    while viewer.status != Status::Exiting {
        terminal.draw(|f| ui.draw(&viewer, f))?;

        if let Some(message) = controller.handle_event()? {
            viewer.update(message);
        }
    }
    debug!("Viewer closed");
    Ok(())
}
