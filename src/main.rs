use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};

use two_phase_compare::config::loader;
use two_phase_compare::system_tests::{self, TEST_NAMES};
use two_phase_compare::{
    CommandRuntime, CompareTwo, FileCase, FileSnapshotStore, HarnessSettings, LogCollector,
    PhaseStatus,
};

const USAGE: &str = "usage: two_phase_compare <ers|rep|lii> <build|run> <caseroot> \
[--sharedlib-only] [--model-only] [--settings PATH]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Build,
    Run,
}

#[derive(Debug)]
struct Args {
    test: String,
    step: Step,
    caseroot: PathBuf,
    sharedlib_only: bool,
    model_only: bool,
    settings: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut sharedlib_only = false;
    let mut model_only = false;
    let mut settings = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sharedlib-only" => sharedlib_only = true,
            "--model-only" => model_only = true,
            "--settings" => {
                let path = args.next().ok_or_else(|| anyhow!("--settings needs a path"))?;
                settings = Some(PathBuf::from(path));
            }
            "-h" | "--help" => bail!("{}", USAGE),
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            _ => positional.push(arg),
        }
    }

    let [test, step, caseroot]: [String; 3] = positional
        .try_into()
        .map_err(|_| anyhow!("expected three arguments\n{}", USAGE))?;

    if !TEST_NAMES.contains(&test.to_ascii_lowercase().as_str()) {
        bail!("unknown test '{}', expected one of {:?}", test, TEST_NAMES);
    }
    let step = match step.as_str() {
        "build" => Step::Build,
        "run" => Step::Run,
        other => bail!("unknown step '{}', expected build or run", other),
    };

    Ok(Args {
        test,
        step,
        caseroot: PathBuf::from(caseroot),
        sharedlib_only,
        model_only,
        settings,
    })
}

fn execute(args: &Args, harness: HarnessSettings) -> anyhow::Result<bool> {
    let mut case = FileCase::open(&args.caseroot)
        .with_context(|| format!("Failed to open case at {}", args.caseroot.display()))?;

    let mut store = FileSnapshotStore::new(&args.caseroot);
    if let Some(exe) = &harness.executable {
        store = store.with_executable(exe);
    }
    let mut runtime = CommandRuntime::new(store, harness);

    let (test, settings) = system_tests::by_name(&args.test, &case)
        .ok_or_else(|| anyhow!("unknown test '{}'", args.test))?
        .map_err(|e| anyhow!(e.user_message()))?;

    let mut compare = CompareTwo::new(&mut case, &mut runtime, test, &settings)
        .map_err(|e| anyhow!(e.user_message()))?;

    match args.step {
        Step::Build => {
            compare
                .build(args.sharedlib_only, args.model_only)
                .map_err(|e| anyhow!(e.user_message()))?;
            log::info!("[Main] Build complete");
            Ok(true)
        }
        Step::Run => {
            let result = compare.run().map_err(|e| anyhow!(e.user_message()));
            let status = compare.status();
            log::info!("[Main] {}", status.summary());
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(result? && status.overall() == PhaseStatus::Pass)
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let harness = match loader::load_or_default(args.settings.as_deref()) {
        Ok(harness) => harness,
        Err(e) => {
            eprintln!("Error: Failed to load harness settings: {}", e);
            return ExitCode::from(2);
        }
    };
    let level = harness.level_filter().unwrap_or(log::LevelFilter::Info);
    let collector: Option<LogCollector> =
        match two_phase_compare::initialize_logging(harness.log_dir.clone(), level) {
            Ok(collector) => Some(collector),
            Err(e) => {
                eprintln!("[Main] WARNING: Logging unavailable: {}", e);
                None
            }
        };

    let outcome = execute(&args, harness);
    match &outcome {
        Ok(true) => log::info!("[Main] {} {}: success", args.test, step_name(args.step)),
        Ok(false) => log::warn!("[Main] {} {}: failed", args.test, step_name(args.step)),
        Err(e) => log::error!("[Main] {:#}", e),
    }
    if let Some(collector) = &collector {
        two_phase_compare::flush_all_logs(collector);
    }

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn step_name(step: Step) -> &'static str {
    match step {
        Step::Build => "build",
        Step::Run => "run",
    }
}
