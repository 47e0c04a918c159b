use anyhow::Result;
use clap::{Parser, ValueEnum};
use moodsheet_config::{MoodsheetConfig, load_config};
use moodsheet_engine::{Engine, RunSummary};
use moodsheet_logging::LogLevel;
use moodsheet_sheet::{ExcelReader, XlsxWriter, ensure_excel_path};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "moodsheet", version)]
#[command(
    about = "Tag each row of an Excel sheet with a sentiment label judged by an LLM.",
    long_about = None
)]
struct Cli {
    /// Input workbook (.xls or .xlsx). Only the first sheet is read.
    input: PathBuf,
    /// Output workbook (.xlsx).
    output: PathBuf,
    /// Log level; overrides `[logging].level` from the config file.
    #[arg(long, value_enum, ignore_case = true, default_value = "INFO")]
    log_level: LevelArg,
    /// Configuration file.
    #[arg(long, default_value = "config/config.toml")]
    config: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "UPPER")]
enum LevelArg {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl From<LevelArg> for LogLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Debug => LogLevel::Debug,
            LevelArg::Info => LogLevel::Info,
            LevelArg::Warning => LogLevel::Warning,
            LevelArg::Error => LogLevel::Error,
            LevelArg::Critical => LogLevel::Critical,
        }
    }
}

fn run(cli: &Cli, config: &MoodsheetConfig) -> Result<RunSummary> {
    let classifier = moodsheet_llm::classifier_from_config(config)?;

    ensure_excel_path(&cli.input)?;
    tracing::info!("reading {}", cli.input.display());

    let engine = Engine::new(&classifier);
    let summary = engine.run(
        &ExcelReader::new(&cli.input),
        &XlsxWriter::new(&cli.output),
        &config.excel,
    )?;

    tracing::info!("done, results saved to {}", cli.output.display());
    Ok(summary)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = LogLevel::from(cli.log_level);

    let config = match load_config(&cli.config) {
        Ok(config) => config.with_log_level(level),
        Err(err) => {
            moodsheet_logging::init_console(level);
            tracing::error!("failed to load configuration: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = moodsheet_logging::init(&config.logging) {
        moodsheet_logging::init_console(level);
        tracing::error!("failed to set up logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli, &config) {
        Ok(summary) => {
            tracing::debug!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("processing failed: {err:#}");
            tracing::error!(severity = "CRITICAL", "run aborted");
            ExitCode::FAILURE
        }
    }
}
