//! nltg
//!
//! Command-line front end for the natural-language test instruction parser.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use serde::Serialize;

use nl_testgen::security::{validate_security_instruction, SecurityClassifier};
use nl_testgen::{Domain, InstructionParser, ParseReport, ParseRequest, ParsedInstructionSet, ScoringConfig};

/// Natural-language test instruction parser
#[derive(Parser, Debug)]
#[command(name = "nltg")]
#[command(author = "Z1529")]
#[command(version = "0.1.0")]
#[command(about = "Turn natural-language test instructions into typed test actions")]
struct Cli {
    /// Scoring configuration (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse an instruction file into actions
    Parse {
        /// Instruction file, or - for stdin
        input: PathBuf,

        /// Domain (api, security, accessibility)
        #[arg(short, long, default_value = "api")]
        domain: Domain,

        /// Target URL of the request under test
        #[arg(short, long)]
        url: String,

        /// HTTP method to assume when the text names none
        #[arg(short, long)]
        method: Option<String>,

        /// Emit a diagnostic report instead of the action list
        #[arg(long)]
        report: bool,
    },
    /// Classify a security instruction
    Classify {
        text: String,
    },
    /// Check that a security instruction is complete
    Validate {
        text: String,
    },
    /// Parse a JSON array of requests
    Batch {
        input: PathBuf,
    },
}

/// Outcome of one batch entry
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntry {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ParsedInstructionSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<BatchError>,
}

#[derive(Serialize)]
struct BatchError {
    code: &'static str,
    message: String,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ScoringConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScoringConfig::default(),
    };

    match &cli.command {
        Commands::Parse {
            input,
            domain,
            url,
            method,
            report,
        } => {
            let instruction = read_input(input)?;
            let mut request = ParseRequest::new(instruction, url.as_str(), *domain);
            if let Some(method) = method {
                request = request.with_method_hint(method.as_str());
            }
            request.validate().context("invalid parse request")?;

            let parser = InstructionParser::new(config);
            let parsed = parser.parse_request(&request);
            if *report {
                let validation = match domain {
                    Domain::Security => Some(validate_security_instruction(&request.instruction)),
                    _ => None,
                };
                let report = ParseReport::from_parsed(&parsed, validation.as_ref());
                info!("report: {} warning(s)", report.warnings().count());
                println!("{}", report.to_json());
            } else {
                println!("{}", parsed.to_json());
            }
        }
        Commands::Classify { text } => {
            let result = SecurityClassifier::new(config).classify(text);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Validate { text } => {
            let validation = validate_security_instruction(text);
            println!("{}", serde_json::to_string_pretty(&validation)?);
        }
        Commands::Batch { input } => {
            let source = read_input(input)?;
            let requests: Vec<ParseRequest> =
                serde_json::from_str(&source).context("batch input must be a JSON array of requests")?;

            let parser = InstructionParser::new(config);
            let entries: Vec<BatchEntry> = requests
                .iter()
                .enumerate()
                .map(|(index, request)| match request.validate() {
                    Ok(()) => BatchEntry {
                        index,
                        result: Some(parser.parse_request(request)),
                        error: None,
                    },
                    Err(e) => BatchEntry {
                        index,
                        result: None,
                        error: Some(BatchError {
                            code: e.code(),
                            message: e.to_string(),
                        }),
                    },
                })
                .collect();

            let failed = entries.iter().filter(|e| e.error.is_some()).count();
            info!("batch: {} requests, {} rejected", entries.len(), failed);
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
