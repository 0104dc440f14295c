//! Command-line interface of the `multivalue` binary.
//!
//! Reads a form definition and posted data from JSON files, runs one
//! round-trip through the [`FormProcessor`] and prints the response as JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use multivalue_core::Value;
use serde::de::DeserializeOwned;

use crate::config::FormConfig;
use crate::logging::{LogConfig, LogFormat};
use crate::processor::{FormDefinition, FormProcessor, FormRequest};

#[derive(Debug, Parser)]
#[command(
    name = "multivalue",
    version,
    about = "Render and submit forms made of repeatable multi-value controls"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON file with form configuration overrides.
    #[arg(long, value_name = "PATH", global = true, env = "MULTIVALUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the form, either initially or after a button was pressed.
    Render(RenderArgs),
    /// Submit posted data and print the cleaned values.
    Submit(SubmitArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Form definition (JSON).
    #[arg(long, value_name = "PATH")]
    pub form: PathBuf,

    /// Posted data (JSON). Omit for the initial render.
    #[arg(long, value_name = "PATH")]
    pub posted: Option<PathBuf>,

    /// Name of the button that fired the request.
    #[arg(long, value_name = "NAME")]
    pub trigger: Option<String>,

    /// State token from the previous render.
    #[arg(long, value_name = "TOKEN")]
    pub state: Option<String>,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Form definition (JSON).
    #[arg(long, value_name = "PATH")]
    pub form: PathBuf,

    /// Posted data (JSON).
    #[arg(long, value_name = "PATH")]
    pub posted: PathBuf,
}

/// CLI log format choices.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl Cli {
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        };
        LogConfig::from_verbosity(self.verbose).with_format(format)
    }
}

/// Runs the parsed command and returns the JSON to print.
///
/// # Errors
///
/// Fails when an input file cannot be read or parsed, or when the form
/// processor rejects the request.
pub fn run(cli: &Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => read_json::<FormConfig>(path)?,
        None => FormConfig::default(),
    };
    let processor = FormProcessor::new(Arc::new(config));

    let (form, request) = match &cli.command {
        Command::Render(args) => {
            let posted = args.posted.as_deref().map(read_json::<Value>).transpose()?;
            let request = FormRequest {
                posted,
                triggering_element: args.trigger.clone(),
                state_token: args.state.clone(),
            };
            (read_json::<FormDefinition>(&args.form)?, request)
        }
        Command::Submit(args) => {
            let submit_button = processor
                .config()
                .submit_buttons
                .first()
                .cloned()
                .context("no submit button configured")?;
            let request = FormRequest {
                posted: Some(read_json(&args.posted)?),
                triggering_element: Some(submit_button),
                state_token: None,
            };
            (read_json::<FormDefinition>(&args.form)?, request)
        }
    };

    let response = processor
        .process(&form, &request)
        .with_context(|| format!("processing form {}", form.id))?;
    serde_json::to_string_pretty(&response).context("serializing response")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
