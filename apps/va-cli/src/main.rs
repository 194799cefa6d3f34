use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use va_app::{
    AeroSession, AppError, AppResult, ArchiveOptions, SweepProgressEvent, SweepStage,
    project_service, query, run_service,
};
use va_core::{AnalysisMethod, ResultId, StabilityType};
use va_parse::{HistoryParser, LoadParser, ResultFileParser, SliceParser, StabParser};
use va_results::{ResultRecord, ResultStore, RunArchive};
use va_setup::{WaitPolicy, write_cuts_file};
use va_solver::WriterSink;

#[derive(Parser)]
#[command(name = "va-cli")]
#[command(about = "VSPAERO sweep driver - setup decks, solver runs and result files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a settings file
    Validate {
        /// Path to the settings YAML/JSON file
        settings_path: PathBuf,
    },
    /// Print the flow conditions of the configured sweep
    Sweep {
        /// Path to the settings YAML/JSON file
        settings_path: PathBuf,
    },
    /// Write the setup file (and cuts file) without running the solver
    WriteDeck {
        /// Path to the settings YAML/JSON file
        settings_path: PathBuf,
    },
    /// Run the full sweep
    Run {
        /// Path to the settings YAML/JSON file
        settings_path: PathBuf,
        /// Write solver output to this file instead of stdout
        #[arg(long)]
        log: Option<PathBuf>,
        /// Save the results to the run archive next to the settings file
        #[arg(long)]
        archive: bool,
        /// Export the sweep results to CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Solver version recorded in the archive manifest
        #[arg(long, default_value = "unknown")]
        solver_version: String,
    },
    /// Parse one solver output file and print its records as JSON
    Parse {
        /// Kind of output file
        #[arg(value_enum)]
        kind: OutputKind,
        /// Path to the file
        file: PathBuf,
        /// Analysis method the file was produced with (vlm or panel)
        #[arg(long, default_value = "vlm")]
        method: AnalysisMethod,
        /// Stability run type for stab files (default, p, q, r)
        #[arg(long, default_value = "default")]
        stability: StabilityType,
        /// Control group names, in deck order, for ConGrp_ columns
        #[arg(long = "group")]
        groups: Vec<String>,
    },
    /// List archived runs for a settings file
    Runs {
        /// Path to the settings YAML/JSON file
        settings_path: PathBuf,
    },
    /// Export an archived run to CSV
    ExportCsv {
        /// Path to the settings YAML/JSON file
        settings_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Output CSV file path
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputKind {
    History,
    Load,
    Stab,
    Slice,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { settings_path } => cmd_validate(&settings_path),
        Commands::Sweep { settings_path } => cmd_sweep(&settings_path),
        Commands::WriteDeck { settings_path } => cmd_write_deck(&settings_path),
        Commands::Run {
            settings_path,
            log,
            archive,
            csv,
            solver_version,
        } => cmd_run(
            &settings_path,
            log.as_deref(),
            archive,
            csv.as_deref(),
            solver_version,
        ),
        Commands::Parse {
            kind,
            file,
            method,
            stability,
            groups,
        } => cmd_parse(kind, &file, method, stability, groups),
        Commands::Runs { settings_path } => cmd_runs(&settings_path),
        Commands::ExportCsv {
            settings_path,
            run_id,
            output,
        } => cmd_export_csv(&settings_path, &run_id, &output),
    }
}

fn cmd_validate(settings_path: &Path) -> AppResult<()> {
    println!("Validating settings: {}", settings_path.display());
    let settings = project_service::load_settings(settings_path)?;
    project_service::validate_settings(&settings)?;

    let summary = project_service::summarize(&settings);
    println!("✓ Settings are valid");
    println!("  Name: {}", summary.name);
    println!("  Model: {} ({})", summary.model_base, summary.analysis_method);
    println!(
        "  Sweep: {} points, {}",
        summary.sweep_points,
        if summary.batch_mode { "batch" } else { "one run per point" }
    );
    println!("  Rotors: {}", summary.rotor_count);
    println!("  Control groups: {}", summary.control_group_count);
    println!("  Cp slices: {}", summary.cp_slice_count);
    if let Some(stab) = &summary.stability {
        println!("  Stability: {}", stab);
    }
    Ok(())
}

fn cmd_sweep(settings_path: &Path) -> AppResult<()> {
    let settings = project_service::load_settings(settings_path)?;
    let session = AeroSession::new(settings);
    let flows = session.sweep_vectors().flow_conditions();

    println!("{} flow conditions:", flows.len());
    println!("  {:>5}  {:>8}  {:>10}  {:>10}", "point", "mach", "alpha", "beta");
    for (i, flow) in flows.iter().enumerate() {
        println!(
            "  {:>5}  {:>8.3}  {:>10.3}  {:>10.3}",
            i, flow.mach, flow.alpha, flow.beta
        );
    }
    Ok(())
}

fn cmd_write_deck(settings_path: &Path) -> AppResult<()> {
    let settings = project_service::load_settings(settings_path)?;
    project_service::validate_settings(&settings)?;
    let mut session = AeroSession::new(settings);

    session.create_setup_file()?;
    println!("✓ Setup file written: {}", session.files().setup.display());

    if session.settings().advanced.cp_slice_flag && !session.slices().is_empty() {
        write_cuts_file(&session.files().cuts, session.slices(), WaitPolicy::default())?;
        println!("✓ Cuts file written: {}", session.files().cuts.display());
    }
    Ok(())
}

fn cmd_run(
    settings_path: &Path,
    log: Option<&Path>,
    archive: bool,
    csv: Option<&Path>,
    solver_version: String,
) -> AppResult<()> {
    let settings = project_service::load_settings(settings_path)?;
    project_service::validate_settings(&settings)?;
    let summary = project_service::summarize(&settings);
    println!(
        "Running sweep '{}': {} points ({})",
        summary.name,
        summary.sweep_points,
        if summary.batch_mode { "batch" } else { "single" }
    );

    info!(settings = %settings_path.display(), archive, "starting run");
    let mut session = AeroSession::new(settings);
    session.clear_all_previous_results();

    // Solver output shares stdout unless it goes to a log file, so the
    // progress spinner is only drawn in the latter case.
    let inline = log.is_some();
    let mut last_emit = Instant::now();
    let mut last_key = None;
    let mut on_progress = |event: SweepProgressEvent| {
        let key = (event.stage, event.point);
        let emit_now = last_key != Some(key) || last_emit.elapsed().as_millis() >= 100;
        if emit_now {
            render_cli_progress(&event, inline);
            last_key = Some(key);
            last_emit = Instant::now();
        }
    };

    let started = Instant::now();
    match log {
        Some(path) => {
            let mut sink = WriterSink::new(BufWriter::new(File::create(path)?));
            session.compute_solver(&mut sink, Some(&mut on_progress))?;
        }
        None => {
            let mut sink = WriterSink::new(io::stdout());
            session.compute_solver(&mut sink, Some(&mut on_progress))?;
        }
    }
    if inline {
        clear_progress_line();
    }
    println!("✓ Sweep completed in {:.2}s", started.elapsed().as_secs_f64());

    print_case_table(session.results())?;
    let stored = query::summarize_store(session.results());
    println!("\nResults stored: {}", stored.total);
    for (name, count) in &stored.counts {
        println!("  {}: {}", name, count);
    }

    if let Some(path) = csv {
        session.export_results_to_csv(path)?;
        println!("✓ Results exported to {}", path.display());
    }

    if archive {
        let archive = RunArchive::for_settings(settings_path)?;
        let manifest =
            run_service::archive_session(&session, &archive, &ArchiveOptions { solver_version })?;
        println!("✓ Run archived: {}", manifest.run_id);
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &SweepProgressEvent, inline: bool) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(point) = event.point {
        line.push_str(&format!("  point={}/{}", point + 1, event.total_points));
    }
    if let Some(flow) = &event.flow {
        line.push_str(&format!(
            "  mach={:.3} alpha={:.3} beta={:.3}",
            flow.mach, flow.alpha, flow.beta
        ));
    }
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }

    if inline && event.stage != SweepStage::Completed {
        print!("\r{}", line);
        let _ = io::stdout().flush();
    } else if !inline {
        println!("{}", line);
    }
}

fn print_case_table(store: &ResultStore) -> AppResult<()> {
    let cases = query::history_summaries(store)?;
    if cases.is_empty() {
        println!("No history cases were read");
        return Ok(());
    }

    println!("\nConverged coefficients:");
    println!(
        "  {:>8}  {:>8}  {:>8}  {:>10}  {:>10}  {:>10}  {:>8}",
        "mach", "alpha", "beta", "CL", "CDtot", "CMy", "L/D"
    );
    let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.5}", v));
    for case in cases {
        let (mach, alpha, beta) = case
            .flow
            .map_or((f64::NAN, f64::NAN, f64::NAN), |f| (f.mach, f.alpha, f.beta));
        println!(
            "  {:>8.3}  {:>8.3}  {:>8.3}  {:>10}  {:>10}  {:>10}  {:>8}",
            mach,
            alpha,
            beta,
            cell(case.cl),
            cell(case.cdtot),
            cell(case.cmy),
            cell(case.l_over_d)
        );
    }
    Ok(())
}

fn cmd_parse(
    kind: OutputKind,
    file: &Path,
    method: AnalysisMethod,
    stability: StabilityType,
    groups: Vec<String>,
) -> AppResult<()> {
    info!(file = %file.display(), ?kind, "parsing result file");
    let mut store = ResultStore::new();
    let mut ids: Vec<ResultId> = Vec::new();

    match kind {
        OutputKind::History => HistoryParser::new(method).read_file(file, &mut store, &mut ids)?,
        OutputKind::Load => LoadParser::new(method).read_file(file, &mut store, &mut ids)?,
        OutputKind::Stab => {
            StabParser::new(method, stability, groups).read_file(file, &mut store, &mut ids)?
        }
        OutputKind::Slice => SliceParser::new(method).read_file(file, &mut store, &mut ids)?,
    }

    let records: Vec<&ResultRecord> = ids.iter().filter_map(|id| store.get(*id)).collect();
    let json = serde_json::to_string_pretty(&records)
        .map_err(|e| AppError::InvalidInput(format!("cannot encode records: {e}")))?;
    println!("{}", json);
    Ok(())
}

fn cmd_runs(settings_path: &Path) -> AppResult<()> {
    let archive = RunArchive::for_settings(settings_path)?;
    let runs = run_service::list_runs(&archive)?;

    if runs.is_empty() {
        println!("No archived runs in {}", archive.root_dir().display());
    } else {
        println!("Archived runs:");
        for manifest in runs {
            println!(
                "  {} - {} ({} cases, solver {}, {})",
                manifest.run_id,
                manifest.name,
                manifest.case_count,
                manifest.solver_version,
                manifest.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_export_csv(settings_path: &Path, run_id: &str, output: &Path) -> AppResult<()> {
    let archive = RunArchive::for_settings(settings_path)?;
    run_service::export_run_csv(&archive, run_id, output, WaitPolicy::default())?;
    println!("✓ Exported run {} to {}", run_id, output.display());
    Ok(())
}
