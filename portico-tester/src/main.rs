mod reports;
mod scenario;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use portico_core::{Config, SectionRegistry};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use scenario::{BUILTIN_SECTIONS, ScenarioResult, Setup, ad_hoc, get_scenario, list_scenarios};
use util::{parse_user_arg, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "portico-tester", version)]
#[command(about = "Replays Portico boot and navigation scenarios without a browser")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Config JSON file, shaped like `window.configData`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sections JSON file; defaults to the bundled table
    #[arg(long)]
    sections: Option<PathBuf>,

    /// Navigate these paths (comma-separated) instead of running scenarios
    #[arg(long)]
    paths: Option<String>,

    /// Signed-in user for `--paths` runs, as `name[:locale]`
    #[arg(long)]
    user: Option<String>,

    /// OAuth token for `--paths` runs
    #[arg(long)]
    token: Option<String>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    if args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner();
    }

    let start_time = Instant::now();
    let base = load_setup(&args)?;
    let results = run_scenarios(&args, base)?;
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🧭 Portico Scenario Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_setup(args: &Args) -> Result<Setup> {
    let config = match &args.config {
        Some(path) => Config::from_json(&read_file(path)?)
            .with_context(|| format!("invalid config in {}", path.display()))?,
        None => Config::default(),
    };
    let sections = match &args.sections {
        Some(path) => SectionRegistry::from_json(&read_file(path)?)
            .with_context(|| format!("invalid sections in {}", path.display()))?,
        None => SectionRegistry::from_json(BUILTIN_SECTIONS).context("bundled sections")?,
    };
    let user = args
        .user
        .as_deref()
        .map(parse_user_arg)
        .transpose()
        .context("invalid --user")?;
    Ok(Setup {
        config,
        sections,
        user,
        token: args.token.clone(),
        locale_strings: None,
    })
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn run_scenarios(args: &Args, base: Setup) -> Result<Vec<ScenarioResult>> {
    if let Some(paths) = &args.paths {
        let paths = split_csv(paths);
        if paths.is_empty() {
            bail!("--paths needs at least one path");
        }
        return Ok(vec![ad_hoc(base, &paths).run()]);
    }

    let mut results = Vec::new();
    for key in expand_scenarios(&args.scenarios) {
        let Some(scenario) = get_scenario(&key, &base) else {
            eprintln!("⚠️  Unknown scenario: {}", key.yellow());
            continue;
        };
        log::info!("running {key}: {}", scenario.description);
        results.push(scenario.run());
    }
    Ok(results)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, results)?,
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Portico Scenario Results\n\n_No scenarios executed._"
                )?;
            } else {
                reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
