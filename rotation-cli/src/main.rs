mod reports;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use rotation_core::{
    CharacterId, Dataset, GenerationReport, PlannerConfig, RotationPlanner, TemplateBook,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored human-readable summary
    Console,
    /// Full generation report as JSON
    Json,
    /// Markdown tables, one per pattern
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "rotation-planner", version)]
#[command(about = "Plan race rotation patterns from a character's aptitudes and outstanding races")]
struct Args {
    /// Dataset JSON (characters, races, completion sets); defaults to the bundled sample
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Template book JSON overriding the dataset's templates
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Planner configuration overrides (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Character to plan for
    #[arg(long, required_unless_present = "list_characters")]
    character: Option<CharacterId>,

    /// List the dataset's characters and exit
    #[arg(long)]
    list_characters: bool,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let dataset = load_dataset(&args)?;
    if maybe_list_characters(&args, &dataset)? {
        return Ok(());
    }
    let Some(character) = args.character else {
        bail!("--character is required unless --list-characters is given");
    };
    let config = load_config(args.config.as_deref())?;

    let planner = RotationPlanner::with_config(dataset, config);
    let report = planner
        .generate_patterns(character)
        .with_context(|| format!("failed to generate patterns for character {character}"))?;
    let name = planner
        .source()
        .character(character)
        .map_or_else(|| format!("#{character}"), |profile| profile.name.clone());
    write_report(&args, &name, &report)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_dataset(args: &Args) -> Result<Dataset> {
    let dataset = match &args.dataset {
        Some(path) => Dataset::from_json(&read_file(path)?)
            .with_context(|| format!("invalid dataset {}", path.display()))?,
        None => Dataset::load_from_static().context("bundled sample dataset is invalid")?,
    };
    info!(
        "dataset: {} characters, {} races",
        dataset.characters.len(),
        dataset.races.len()
    );
    match &args.templates {
        Some(path) => {
            let templates = TemplateBook::from_json(&read_file(path)?)
                .with_context(|| format!("invalid template book {}", path.display()))?;
            Ok(dataset.with_templates(templates))
        }
        None => Ok(dataset),
    }
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    let Some(path) = path else {
        return Ok(PlannerConfig::default());
    };
    let config = PlannerConfig::from_json(&read_file(path)?)
        .with_context(|| format!("invalid planner config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("planner config {} failed validation", path.display()))?;
    Ok(config)
}

fn maybe_list_characters(args: &Args, dataset: &Dataset) -> Result<bool> {
    if !args.list_characters {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available characters:")?;
    for profile in &dataset.characters {
        writeln!(output_target.writer(), "  {:>4}  {}", profile.id, profile.name)?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "{}", "🏇 Race Rotation Planner".bright_cyan().bold())?;
    writeln!(out, "{}", "========================".cyan())
}

fn write_report(args: &Args, character_name: &str, report: &GenerationReport) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, report)?,
        ReportFormat::Markdown => reports::generate_markdown_report(
            &mut output_target,
            character_name,
            report,
            Utc::now(),
        )?,
        ReportFormat::Console => {
            announce_banner(&mut output_target)?;
            reports::generate_console_report(&mut output_target, character_name, report)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_args() -> Args {
        Args {
            dataset: None,
            templates: None,
            config: None,
            character: Some(1),
            list_characters: false,
            report: ReportFormat::Json,
            output: None,
            verbose: false,
        }
    }

    fn temp(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rotation-planner-{label}-{}", std::process::id()))
    }

    fn sample_report() -> GenerationReport {
        let dataset = Dataset::load_from_static().unwrap();
        RotationPlanner::new(dataset).generate_patterns(2).unwrap()
    }

    #[test]
    fn args_parse_report_formats() {
        let args = Args::try_parse_from([
            "rotation-planner",
            "--character",
            "3",
            "--report",
            "markdown",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.character, Some(3));
        assert_eq!(args.report, ReportFormat::Markdown);
        assert!(args.verbose);
    }

    #[test]
    fn args_require_character_or_listing() {
        assert!(Args::try_parse_from(["rotation-planner"]).is_err());
        let args = Args::try_parse_from(["rotation-planner", "--list-characters"]).unwrap();
        assert!(args.list_characters);
        assert!(args.character.is_none());
    }

    #[test]
    fn maybe_list_characters_writes_output() {
        let path = temp("characters.txt");
        let args = Args {
            list_characters: true,
            output: Some(path.clone()),
            ..base_args()
        };
        let dataset = Dataset::load_from_static().unwrap();
        assert!(maybe_list_characters(&args, &dataset).unwrap());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Available characters"));
        assert!(content.contains("Smart Falcon"));
    }

    #[test]
    fn maybe_list_characters_returns_false_when_disabled() {
        let dataset = Dataset::default();
        assert!(!maybe_list_characters(&base_args(), &dataset).unwrap());
    }

    #[test]
    fn load_dataset_applies_template_override() {
        let path = temp("templates.json");
        std::fs::write(&path, r#"{ "exclusive": ["Osaka Hai"] }"#).unwrap();
        let args = Args {
            templates: Some(path),
            ..base_args()
        };
        let dataset = load_dataset(&args).unwrap();
        let templates = dataset.templates.expect("override applied");
        assert!(templates.finals.is_empty());
        assert!(templates.is_exclusive("Osaka Hai"));
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let path = temp("config.json");
        std::fs::write(&path, r#"{ "consecutive": { "window": 0 } }"#).unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("consecutive.window"));
        assert_eq!(load_config(None).unwrap(), PlannerConfig::default());
    }

    #[test]
    fn write_report_emits_json() {
        let path = temp("report.json");
        let args = Args {
            output: Some(path.clone()),
            ..base_args()
        };
        write_report(&args, "El Condor Pasa", &sample_report()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"character_id\": 2"));
        assert!(content.contains("\"patterns\""));
    }

    #[test]
    fn write_report_emits_markdown() {
        let path = temp("report.md");
        let args = Args {
            report: ReportFormat::Markdown,
            output: Some(path.clone()),
            ..base_args()
        };
        write_report(&args, "El Condor Pasa", &sample_report()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("# Rotation Patterns: El Condor Pasa"));
        assert!(content.contains("_Generated "));
    }

    #[test]
    fn write_report_emits_console_banner() {
        let path = temp("report.txt");
        let args = Args {
            report: ReportFormat::Console,
            output: Some(path.clone()),
            ..base_args()
        };
        write_report(&args, "El Condor Pasa", &sample_report()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Race Rotation Planner"));
        assert!(content.contains("El Condor Pasa"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
