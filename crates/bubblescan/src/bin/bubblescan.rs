//! bubblescan CLI: grade one sheet, a folder of sheets, or dump the template.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bubblescan::score::report::timestamp;
use bubblescan::score::write_sheet_reports;
use bubblescan::{
    grade_sheet, run_batch, DebugDumpObserver, NoopObserver, SheetTemplate, StageObserver,
};
use clap::{Args, Parser, Subcommand};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "bubblescan")]
#[command(about = "Read and grade optical-mark answer sheets")]
#[command(version)]
struct Cli {
    /// Log level: off, error, warn, info, debug or trace.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one sheet image against its answer key.
    Grade(GradeArgs),

    /// Grade every image/key pair in a folder.
    Batch(BatchArgs),

    /// Print (or write) the built-in sheet template as JSON.
    Template {
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct SheetOptions {
    /// Sheet template JSON; the built-in template when omitted.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Directory for the CSV reports.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write every intermediate stage image as PNG into this directory.
    #[arg(long)]
    debug_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct GradeArgs {
    /// Scanned sheet image.
    #[arg(long)]
    image: PathBuf,

    /// Answer key CSV (`question_no,answer`).
    #[arg(long)]
    key: PathBuf,

    #[command(flatten)]
    options: SheetOptions,
}

#[derive(Debug, Clone, Args)]
struct BatchArgs {
    /// Folder holding `<stem>.<image>` and `<stem>.csv` pairs.
    #[arg(long)]
    dir: PathBuf,

    #[command(flatten)]
    options: SheetOptions,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    init_logging(&cli)?;

    match cli.command {
        Commands::Grade(args) => run_grade(&args),
        Commands::Batch(args) => run_folder(&args),
        Commands::Template { out } => run_template(out.as_deref()),
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) -> CliResult<()> {
    bubblescan::core::init_with_level(bubblescan::core::parse_level(&cli.log_level))?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) -> CliResult<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &cli.log_level);
    }
    let _ = tracing_log::LogTracer::init();
    bubblescan::core::init_tracing(cli.json_log);
    Ok(())
}

fn load_template(path: Option<&Path>) -> CliResult<SheetTemplate> {
    match path {
        Some(p) => {
            log::info!("loading template {}", p.display());
            Ok(SheetTemplate::load_json(p)?)
        }
        None => Ok(SheetTemplate::default()),
    }
}

fn observer_for(options: &SheetOptions) -> Box<dyn StageObserver> {
    match &options.debug_dir {
        Some(dir) => Box::new(DebugDumpObserver::new(dir)),
        None => Box::new(NoopObserver),
    }
}

// ── grade ──────────────────────────────────────────────────────────────

fn run_grade(args: &GradeArgs) -> CliResult<()> {
    let template = load_template(args.options.template.as_deref())?;
    let mut observer = observer_for(&args.options);
    let sheet = args
        .image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string());
    observer.begin_sheet(&sheet);

    let graded = grade_sheet(&args.image, &args.key, &template, observer.as_mut())?;
    let stamp = timestamp(&chrono::Local::now());
    let paths = write_sheet_reports(&args.options.out_dir, &graded.score, &stamp)?;

    let record = &graded.score.record;
    println!("Roll number:    {}", record.roll_number);
    println!("Total marks:    {}", record.total_marks);
    println!("Obtained marks: {}", record.obtained_marks);
    println!("Results saved to {}", paths.detailed.display());
    println!("Summary saved to {}", paths.summary.display());
    Ok(())
}

// ── batch ──────────────────────────────────────────────────────────────

fn run_folder(args: &BatchArgs) -> CliResult<()> {
    let template = load_template(args.options.template.as_deref())?;
    let mut observer = observer_for(&args.options);

    let result = run_batch(&args.dir, &template, observer.as_mut())?;
    let stamp = timestamp(&chrono::Local::now());
    let path = result.write_summary(&args.options.out_dir, &stamp)?;

    for s in &result.skipped {
        println!("Missing pair for: {}", s.stem);
    }
    for f in &result.failures {
        println!("Failed: {} ({})", f.stem, f.message);
    }
    println!(
        "Graded {} sheets ({} skipped, {} failed)",
        result.records.len(),
        result.skipped.len(),
        result.failures.len()
    );
    println!("Summary results saved to {}", path.display());
    Ok(())
}

// ── template ───────────────────────────────────────────────────────────

fn run_template(out: Option<&Path>) -> CliResult<()> {
    let template = SheetTemplate::default();
    match out {
        Some(path) => {
            template.write_json(path)?;
            println!("Template written to {}", path.display());
        }
        None => println!("{}", template.to_json()?),
    }
    Ok(())
}
