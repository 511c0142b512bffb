use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use packetmon_core::protocol::layout::{
    DEFAULT_SERVER_PORT, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH,
};
use packetmon_core::{
    CaptureEventSource, CaptureStats, EventOutcome, EventSource, Monitor, MonitorConfig,
    MonitorEvent, MonitorStats, NoiseProfile, OutputFormat, PcapFileSource, TraceFileSource,
    WorldSize,
};
use tracing::{debug, info, warn};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PACKETMON_BUILD_COMMIT"),
    ", ",
    env!("PACKETMON_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  packetmon replay session.jsonl\n  packetmon replay session.jsonl --json -o session.out\n  packetmon capture server.pcapng --port 7777 --show-noise";

#[derive(Parser, Debug)]
#[command(name = "packetmon")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Terraria packet monitor: decodes tile and entity traffic from hook traces or captures.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON-lines hook trace.
    #[command(after_help = EXAMPLES)]
    Replay {
        /// Path to a .jsonl trace
        input: PathBuf,

        #[command(flatten)]
        args: OutputArgs,
    },
    /// Monitor game traffic in a capture file.
    #[command(after_help = EXAMPLES)]
    Capture {
        /// Path to a .pcap or .pcapng file
        input: PathBuf,

        /// Game server TCP port
        #[arg(long, default_value_t = DEFAULT_SERVER_PORT)]
        port: u16,

        #[command(flatten)]
        args: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Write monitor output to a file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Emit one JSON object per packet instead of text lines
    #[arg(long)]
    json: bool,

    /// Also print the generic line for high-frequency packet types
    #[arg(long)]
    show_noise: bool,

    /// Noise table used to suppress high-frequency packet types
    #[arg(long, value_enum, default_value_t = ProfileArg::Refined)]
    profile: ProfileArg,

    /// World width in tiles (until the trace reports one)
    #[arg(long, default_value_t = DEFAULT_WORLD_WIDTH)]
    world_width: i32,

    /// World height in tiles (until the trace reports one)
    #[arg(long, default_value_t = DEFAULT_WORLD_HEIGHT)]
    world_height: i32,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Log every event outcome to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Exit with a non-zero code if any packet failed to decode
    #[arg(long)]
    strict: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    Classic,
    Refined,
}

impl OutputArgs {
    fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            profile: match self.profile {
                ProfileArg::Classic => NoiseProfile::Classic,
                ProfileArg::Refined => NoiseProfile::Refined,
            },
            show_noise: self.show_noise,
            format: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            world: WorldSize {
                width: self.world_width,
                height: self.world_height,
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay { input, args } => cmd_replay(input, args),
        Commands::Capture { input, port, args } => cmd_capture(input, port, args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

/// Accepted extensions and the hint shown when an input does not match.
struct InputKind {
    extensions: &'static [&'static str],
    hint: &'static str,
}

const TRACE_INPUT: InputKind = InputKind {
    extensions: &["jsonl", "ndjson", "json"],
    hint: "use a .jsonl hook trace",
};

const CAPTURE_INPUT: InputKind = InputKind {
    extensions: &["pcap", "pcapng"],
    hint: "use a .pcap or .pcapng file",
};

fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_file(false)
                .compact(),
        )
        .with(filter)
        .try_init();
}

fn cmd_replay(input: PathBuf, args: OutputArgs) -> Result<(), CliError> {
    init_tracing(args.verbose, args.quiet);
    let input = prepare_input(&input, &TRACE_INPUT, args.output.as_deref())?;

    let mut source = TraceFileSource::open(&input)
        .with_context(|| format!("Failed to open trace: {}", input.display()))?;
    let stats = run_monitor(&mut source, &args)?;
    finish(&args, stats)
}

fn cmd_capture(input: PathBuf, port: u16, args: OutputArgs) -> Result<(), CliError> {
    init_tracing(args.verbose, args.quiet);
    let input = prepare_input(&input, &CAPTURE_INPUT, args.output.as_deref())?;

    let pcap = PcapFileSource::open(&input)
        .with_context(|| format!("Failed to open capture: {}", input.display()))?;
    let mut source = CaptureEventSource::new(pcap, port);
    let stats = run_monitor(&mut source, &args)?;
    report_capture(source.server_port(), source.stats());
    finish(&args, stats)
}

fn run_monitor<S: EventSource>(source: &mut S, args: &OutputArgs) -> Result<MonitorStats, CliError> {
    let sink = open_sink(args.output.as_deref())?;
    let mut monitor = Monitor::new(sink, args.monitor_config());
    let stats = monitor
        .run(source, log_outcome)
        .context("Monitoring failed")?;
    Ok(stats)
}

fn open_sink(output: Option<&Path>) -> Result<Box<dyn Write>, CliError> {
    let Some(path) = output else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn log_outcome(event: &MonitorEvent, outcome: &EventOutcome) {
    match outcome {
        EventOutcome::State => debug!(ts = ?event.ts(), "collaborator state updated"),
        EventOutcome::Packet {
            tag,
            direction,
            noise,
            decode,
        } => match decode {
            Ok(record) => debug!(tag, %direction, ?noise, kind = record.kind(), "decoded"),
            Err(err) if err.is_unstructured() => {
                debug!(tag, %direction, ?noise, "no structured decode");
            }
            Err(err) => warn!(tag, %direction, error = %err, "decode failed"),
        },
    }
}

fn report_capture(port: u16, stats: CaptureStats) {
    info!(
        port,
        frames = stats.frames,
        skipped = stats.skipped_frames,
        segments = stats.segments,
        messages = stats.messages,
        reordered = stats.reordered,
        retransmits = stats.retransmits,
        "capture reassembled"
    );
    if stats.gaps > 0 || stats.desynced > 0 {
        warn!(
            gaps = stats.gaps,
            desynced = stats.desynced,
            "capture has missing segments; affected flows were dropped"
        );
    }
}

fn finish(args: &OutputArgs, stats: MonitorStats) -> Result<(), CliError> {
    if !args.quiet {
        let target = args
            .output
            .as_ref()
            .map_or_else(|| "stdout".to_string(), |path| path.display().to_string());
        eprintln!(
            "OK: {} events, {} decoded, {} failed -> {}",
            stats.events, stats.decoded, stats.failures, target
        );
    }
    if args.strict && stats.failures > 0 {
        return Err(CliError::new(
            format!("{} packet(s) failed to decode", stats.failures),
            Some("run with --verbose to see each failure".to_string()),
        ));
    }
    Ok(())
}

fn prepare_input(input: &Path, kind: &InputKind, output: Option<&Path>) -> Result<PathBuf, CliError> {
    let resolved = resolve_input_path(input, kind)?;
    validate_input_file(&resolved, kind)?;
    if let Some(output) = output {
        ensure_distinct_output(&resolved, output)?;
    }
    Ok(resolved)
}

fn ensure_distinct_output(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let output_dir = output
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose();
    // A missing output directory is created later and cannot hold the input.
    let Ok(Some(output_dir)) = output_dir else {
        return Ok(());
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
    if output_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path, kind: &InputKind) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some(kind.hint.to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some(kind.hint.to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !kind.extensions.contains(&ext.as_str()) {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some(kind.hint.to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path, kind: &InputKind) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some(format!("check the path or quote the pattern; {}", kind.hint)),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single input file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
