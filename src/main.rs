use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use php_member_props::{Config, OutputFormat, PropertyDescriptor, TokenStream, resolve_all};

/// Report the class property declarations found in PHP files.
///
/// Every `$variable` token is run through the member-property resolver;
/// by default only actual property declarations are printed.
#[derive(Debug, Parser)]
#[command(name = "php-member-props", version, about)]
struct Cli {
    /// Configuration file (default: ./php-member-props.toml, then the
    /// user config directory).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Also list variables that are not property declarations.
    #[arg(long)]
    include_rejected: bool,

    /// PHP files to inspect.
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

/// One line of JSON output.
#[derive(Debug, Serialize)]
struct Record<'a> {
    file: &'a Path,
    line: u32,
    variable: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    property: Option<PropertyDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok((config, _)) => config,
        Err(e) => {
            eprintln!("php-member-props: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let format = cli.format.unwrap_or(config.format);
    let include_rejected = cli.include_rejected || config.include_rejected;

    let mut failed = false;
    let mut json_records: Vec<serde_json::Value> = Vec::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in &cli.files {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(file = %path.display(), "failed to read file: {e}");
                failed = true;
                continue;
            }
        };

        let stream = TokenStream::tokenize(&source);
        tracing::debug!(file = %path.display(), tokens = stream.len(), "tokenized");

        for (index, outcome) in resolve_all(&stream) {
            let token = &stream[index];
            let (property, error) = match outcome {
                Ok(Some(descriptor)) => (Some(descriptor), None),
                Ok(None) if include_rejected => (None, Some("not a property".to_string())),
                Err(e) if include_rejected => (None, Some(e.to_string())),
                _ => continue,
            };

            let written = match format {
                OutputFormat::Text => {
                    let detail = match &property {
                        Some(descriptor) => describe(descriptor),
                        None => error.unwrap_or_default(),
                    };
                    writeln!(out, "{}:{} {} {}", path.display(), token.line, token.text, detail)
                }
                OutputFormat::Json => {
                    let record = Record {
                        file: path,
                        line: token.line,
                        variable: &token.text,
                        property,
                        error,
                    };
                    match serde_json::to_value(&record) {
                        Ok(value) => json_records.push(value),
                        Err(e) => tracing::error!("failed to serialize record: {e}"),
                    }
                    Ok(())
                }
            };
            if let Err(e) = written {
                tracing::error!("failed to write output: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if format == OutputFormat::Json {
        let written = serde_json::to_writer_pretty(&mut out, &json_records)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(out));
        if let Err(e) = written {
            tracing::error!("failed to write output: {e}");
            return ExitCode::FAILURE;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// `scope[*] [static] [readonly] type`, where `*` marks a visibility that
/// was not written.
fn describe(descriptor: &PropertyDescriptor) -> String {
    let mut parts = vec![format!(
        "{}{}",
        descriptor.scope,
        if descriptor.scope_specified { "" } else { "*" }
    )];
    if descriptor.is_static {
        parts.push("static".to_string());
    }
    if descriptor.is_readonly {
        parts.push("readonly".to_string());
    }
    if !descriptor.type_hint.is_empty() {
        parts.push(descriptor.type_hint.clone());
    }
    parts.join(" ")
}
