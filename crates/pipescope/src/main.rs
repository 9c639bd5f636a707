//! pipescope - gas pipeline survey dashboard.
//!
//! Shows survey devices, valve operations and asset attributes as sortable,
//! paginated tables and groups device positions into zoom-dependent clusters.
//! Runs the interactive TUI, or prints one page and the clusters with `--print`.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use pipescope_core::cluster::{ZoomRadiusTable, cluster_points};
use pipescope_core::models::{Device, DeviceField, located, map_markers};
use pipescope_core::provider::{FileProvider, MockProvider, RecordProvider};
use pipescope_core::survey::{FileSurveySource, SurveyId, SurveySource, SurveyWatcher};
use pipescope_core::table::{TableController, TableError};
use pipescope_core::tui::{App, AppConfig};
use pipescope_core::view::{build_cluster_view, build_table_view};

/// Gas pipeline survey dashboard.
#[derive(Parser, Debug)]
#[command(name = "pipescope", about = "Gas pipeline survey dashboard", version)]
struct Args {
    /// JSON dataset with surveys, devices, valve_operations and assets.
    #[arg(short, long, value_name = "PATH", required_unless_present = "demo")]
    data: Option<PathBuf>,

    /// Use the built-in demo dataset instead of --data.
    #[arg(long, conflicts_with = "data")]
    demo: bool,

    /// Fixed active survey id.
    #[arg(long, value_name = "ID", conflicts_with = "survey_file")]
    survey: Option<String>,

    /// File holding the active survey id; watched for changes.
    #[arg(long, value_name = "PATH")]
    survey_file: Option<PathBuf>,

    /// Poll interval for --survey-file in seconds.
    #[arg(long, value_name = "SECS", default_value = "2")]
    survey_poll: u64,

    /// Rows per table page.
    #[arg(long, default_value = "20", value_parser = parse_page_size)]
    page_size: usize,

    /// Initial device sort column (id, name, kind, status, battery, last_seen, lat, lng).
    #[arg(long, value_name = "FIELD", value_parser = parse_device_field)]
    sort: Option<DeviceField>,

    /// Initial map zoom level.
    #[arg(long, default_value = "12")]
    zoom: u8,

    /// JSON zoom -> radius table: [{"zoom": 10, "radius": 0.04}, ...].
    #[arg(long, value_name = "PATH")]
    radius_table: Option<PathBuf>,

    /// TUI tick rate in milliseconds.
    #[arg(short, long, value_name = "MS", default_value = "1000")]
    interval: u64,

    /// Print the first device page and the clusters, then exit.
    #[arg(long)]
    print: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    /// Write logs to this file. Without it the TUI runs with logging disabled.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid page size '{}': {}", s, e))?;
    if n == 0 {
        return Err(TableError::InvalidPageSize(n).to_string());
    }
    Ok(n)
}

fn parse_device_field(s: &str) -> Result<DeviceField, String> {
    s.parse::<DeviceField>().map_err(|e| e.to_string())
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` directives extend the
/// level chosen by -v/-q.
fn init_logging(level: Level, log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn load_radius_table(path: &Path) -> Result<ZoomRadiusTable, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

fn open_provider(args: &Args) -> Result<Box<dyn RecordProvider>, String> {
    match &args.data {
        Some(path) => FileProvider::open(path)
            .map(|p| Box::new(p) as Box<dyn RecordProvider>)
            .map_err(|e| e.to_string()),
        None => Ok(Box::new(MockProvider::typical_survey())),
    }
}

/// Initial survey id: `--survey`, else the first read of `--survey-file`.
fn initial_survey(args: &Args) -> Option<SurveyId> {
    if let Some(id) = &args.survey {
        return Some(SurveyId::new(id.trim()));
    }
    let path = args.survey_file.as_ref()?;
    match FileSurveySource::new(path).active_survey() {
        Ok(id) => id,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Text dump of the first device page, then the clusters of devices and
/// valve operations.
fn render_print(
    provider: &dyn RecordProvider,
    survey: Option<&SurveyId>,
    config: &AppConfig,
) -> Result<String, TableError> {
    let devices: Vec<Device> = provider.devices(survey);
    let valves = provider.valve_operations(survey);
    let controller = TableController::new(devices, config.page_size, config.device_sort)?;
    let table = build_table_view(&controller, "Devices");

    let mut lines = vec![table.title.clone(), pad_row(&table.headers, &table.widths)];
    lines.extend(table.rows.iter().map(|row| {
        let cells: Vec<String> = row.cells.iter().map(|c| c.text.clone()).collect();
        pad_row(&cells, &table.widths)
    }));

    let markers = map_markers(controller.records(), &valves);
    let points = located(&markers);
    let clusters = cluster_points(&points, config.zoom, &config.radius_table);
    let view = build_cluster_view(
        &clusters,
        config.zoom,
        config.radius_table.radius_for(config.zoom),
    );
    lines.push(String::new());
    lines.push(view.title.clone());
    lines.extend(view.rows.iter().map(|row| {
        format!(
            "{:<10} {:<22} {:>5}  {}",
            row.label,
            row.centroid_text(),
            row.member_count,
            row.members_text()
        )
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

fn pad_row(cells: &[String], widths: &[u16]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{:<width$}", c, width = w as usize))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

fn fail(msg: impl std::fmt::Display) -> ! {
    error!("{}", msg);
    eprintln!("pipescope: {}", msg);
    std::process::exit(1);
}

fn main() {
    let args = Args::parse();

    // An interactive TUI owns the terminal: log only into a file.
    if args.print || args.log_file.is_some() {
        let level = log_level(args.verbose, args.quiet);
        if let Err(e) = init_logging(level, args.log_file.as_deref()) {
            eprintln!("pipescope: cannot open log file: {}", e);
            std::process::exit(1);
        }
    }

    let radius_table = match &args.radius_table {
        Some(path) => load_radius_table(path).unwrap_or_else(|e| fail(e)),
        None => ZoomRadiusTable::default(),
    };
    let config = AppConfig {
        page_size: args.page_size,
        device_sort: args.sort,
        zoom: args.zoom,
        radius_table,
    };

    let provider = open_provider(&args).unwrap_or_else(|e| fail(e));
    info!("Using data source {}", provider.source_name());
    let survey = initial_survey(&args);

    if args.print {
        match render_print(provider.as_ref(), survey.as_ref(), &config) {
            Ok(text) => print!("{}", text),
            Err(e) => fail(e),
        }
        return;
    }

    let watcher = args.survey_file.as_ref().map(|path| {
        SurveyWatcher::spawn(
            FileSurveySource::new(path),
            Duration::from_secs(args.survey_poll.max(1)),
        )
    });
    let app = App::new(provider, survey, watcher, &config).unwrap_or_else(|e| fail(e));
    if let Err(e) = app.run(Duration::from_millis(args.interval.max(50))) {
        fail(format!("terminal error: {}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipescope_core::provider::HARBOUR_SURVEY;

    #[test]
    fn test_parse_page_size() {
        assert_eq!(parse_page_size("25"), Ok(25));
        assert!(parse_page_size("0").unwrap_err().contains("invalid page size 0"));
        assert!(parse_page_size("ten").is_err());
    }

    #[test]
    fn test_parse_device_field() {
        assert_eq!(parse_device_field("battery"), Ok(DeviceField::Battery));
        assert_eq!(
            parse_device_field("colour").unwrap_err(),
            "unknown field 'colour'"
        );
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0, false), Level::INFO);
        assert_eq!(log_level(1, false), Level::DEBUG);
        assert_eq!(log_level(3, false), Level::TRACE);
        assert_eq!(log_level(2, true), Level::ERROR);
    }

    #[test]
    fn test_args_demo_and_data_conflict() {
        assert!(Args::try_parse_from(["pipescope", "--demo", "--data", "x.json"]).is_err());
        assert!(Args::try_parse_from(["pipescope"]).is_err());
        let args = Args::try_parse_from(["pipescope", "--demo", "--sort", "status"]).unwrap();
        assert_eq!(args.sort, Some(DeviceField::Status));
        assert_eq!(args.page_size, 20);
        assert_eq!(args.zoom, 12);
    }

    #[test]
    fn test_initial_survey_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("active");
        std::fs::write(&path, "S-2024-RDG\n").unwrap();
        let args = Args::try_parse_from([
            "pipescope",
            "--demo",
            "--survey-file",
            path.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(initial_survey(&args), Some(SurveyId::new("S-2024-RDG")));
    }

    #[test]
    fn test_load_radius_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radii.json");
        std::fs::write(&path, r#"[{"zoom": 8, "radius": 0.2}, {"zoom": 12, "radius": 0.01}]"#)
            .unwrap();
        let table = load_radius_table(&path).unwrap();
        assert_eq!(table.radius_for(10), 0.2);

        std::fs::write(&path, r#"[{"zoom": 8, "radius": 0.01}, {"zoom": 12, "radius": 0.2}]"#)
            .unwrap();
        assert!(load_radius_table(&path).is_err());
    }

    #[test]
    fn test_render_print() {
        let provider = MockProvider::typical_survey();
        let config = AppConfig {
            page_size: 3,
            device_sort: Some(DeviceField::Battery),
            ..AppConfig::default()
        };
        let survey = SurveyId::new(HARBOUR_SURVEY);
        let text = render_print(&provider, Some(&survey), &config).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Devices (14 rows, sort: battery asc, page 1/5)"));
        assert!(lines[1].starts_with("ID"));
        // Missing battery sorts first.
        assert!(lines[2].starts_with("HBR-007"));
        // 13 positioned devices and 4 positioned valve operations.
        assert!(text.contains("MAP: 17 markers"));
        assert!(text.contains("V-12"));
    }
}
