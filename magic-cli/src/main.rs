//! Magic command line
//!
//! Reads one query per line from stdin and writes one answer per line to
//! stdout. Logs go to stderr.
//!
//! Environment:
//! - `MAGIC_SCHEMA_PATH`: directory holding `<culture>.json` (default `./api`)
//! - `MAGIC_CULTURE`: schema culture (default `en-US`)
//! - `MAGIC_RENDER`: `text` or `latex` (default `text`)
//! - `MAGIC_JSON`: when set, answers are JSON `Response` objects
//!
//! Lines starting with `:` are commands: `:help`, `:help <operation>`,
//! `:quit`.

use magic::{FileSource, HelpEntry, Interpreter, Response, DEFAULT_CULTURE};
use magic_engine::RenderMode;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq)]
struct Config {
    schema_path: PathBuf,
    culture: String,
    render_mode: RenderMode,
    json: bool,
}

impl Config {
    fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let render_mode = match lookup("MAGIC_RENDER").as_deref() {
            None | Some("text") => RenderMode::Text,
            Some("latex") => RenderMode::Latex,
            Some(other) => return Err(format!("MAGIC_RENDER must be 'text' or 'latex', got '{}'", other)),
        };
        Ok(Self {
            schema_path: lookup("MAGIC_SCHEMA_PATH").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./api")),
            culture: lookup("MAGIC_CULTURE").unwrap_or_else(|| DEFAULT_CULTURE.to_string()),
            render_mode,
            json: lookup("MAGIC_JSON").is_some(),
        })
    }
}

/// One input line
#[derive(Debug, Clone, PartialEq)]
enum Command<'a> {
    Query(&'a str),
    Help(Option<&'a str>),
    Quit,
    Unknown(&'a str),
    Blank,
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return if line.is_empty() { Command::Blank } else { Command::Query(line) };
        };
        let mut words = command.split_whitespace();
        match (words.next(), words.next()) {
            (Some("help"), operation) => Command::Help(operation),
            (Some("quit"), None) => Command::Quit,
            _ => Command::Unknown(line),
        }
    }
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        format!(r#"{{"status":"error","code":"CONFIG_ERROR","message":"{}"}}"#, e)
    })
}

fn format_response(response: &Response, as_json: bool) -> String {
    if as_json {
        return json(response);
    }
    match response {
        Response::Answer(answer) => answer.output.clone(),
        Response::Empty => String::new(),
        Response::Error(diagnostic) => match (diagnostic.line, diagnostic.column) {
            (Some(line), Some(column)) => format!("error {}:{}: {}", line, column, diagnostic),
            _ => format!("error: {}", diagnostic),
        },
    }
}

fn format_help(entries: &[HelpEntry], as_json: bool) -> String {
    if as_json {
        return json(&entries);
    }
    if entries.is_empty() {
        return "no matching queries".to_string();
    }
    entries
        .iter()
        .map(|e| {
            let mut line = format!("{:<40} {}", e.query, e.brief);
            if !e.example.is_empty() {
                line.push_str(&format!(" (e.g. {})", e.example));
            }
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    tracing::info!(
        version = VERSION,
        schema_path = %config.schema_path.display(),
        culture = %config.culture,
        render = ?config.render_mode,
        "starting magic"
    );

    let mut interpreter = Interpreter::with_standard_library()
        .with_culture(config.culture.clone())
        .with_render_mode(config.render_mode);
    if let Err(e) = interpreter.init(&FileSource::new(&config.schema_path)).await {
        tracing::error!(error = %e, "failed to load schema");
        std::process::exit(1);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("end of input");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                break;
            }
        };

        let output = match Command::parse(&line) {
            Command::Blank => continue,
            Command::Quit => break,
            Command::Query(query) => format_response(&interpreter.compile(query), config.json),
            Command::Help(operation) => match interpreter.help(operation) {
                Ok(entries) => format_help(&entries, config.json),
                Err(e) => format_response(&Response::Error(e.to_diagnostic()), config.json),
            },
            Command::Unknown(command) => {
                tracing::warn!(command, "unknown command");
                format!("unknown command '{}', try :help", command)
            }
        };

        let written = async {
            stdout.write_all(output.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await
        };
        if let Err(e) = written.await {
            tracing::error!(error = %e, "failed to write output");
            break;
        }
    }

    if let Err(e) = interpreter.stop() {
        tracing::warn!(error = %e, "stop failed");
    }
    tracing::info!("shutting down");
}
