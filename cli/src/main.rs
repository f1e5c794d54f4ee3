use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use brine_protogen::{
    document_to_json, render_translation, translate_documents, write_outputs, Grouping, ProtogenError,
    TranslateOptions, TypeOverrides,
};

#[derive(Parser)]
#[command(name = "bprotogen")]
#[command(about = "Generate Protocol Buffers schemas from the types of a Go package", long_about = None)]
struct Cli {
    /// A package directory, or Go files from a single directory
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Only translate types whose name matches this regex
    #[arg(short, long, default_value = ".*")]
    filter: String,

    /// Output file (defaults to `<package>.proto`); a directory with `--per-file`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the schema to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Print the document model as JSON instead of schema text
    #[arg(long, conflicts_with = "stdout")]
    json: bool,

    /// Schema package name (defaults to the Go package name)
    #[arg(long)]
    package: Option<String>,

    /// Write one schema file per Go source file
    #[arg(long)]
    per_file: bool,

    /// JSON file of extra type mappings, keyed by qualified Go type name
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// File-level option as `key=value`; may be repeated
    #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Log more (-v debug, -vv trace); `RUST_LOG` takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_option(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected key=value, got {:?}", text)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let stdout = io::stdout();
    match run(&cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", diagnostic(&e));
            ExitCode::FAILURE
        }
    }
}

/// The single line printed to stderr when a run fails.
fn diagnostic(err: &ProtogenError) -> String {
    format!("error: {}", err)
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<(), ProtogenError> {
    let mut options = TranslateOptions::new(&cli.filter)?;
    if let Some(path) = &cli.overrides {
        options = options.with_overrides(TypeOverrides::load(path)?);
    }
    if let Some(package) = &cli.package {
        options = options.with_package(package.clone());
    }
    for (key, value) in &cli.options {
        options = options.with_option(key.clone(), value.clone());
    }

    let output_dir = if cli.per_file {
        options = options.with_grouping(Grouping::PerFile);
        cli.output.clone().unwrap_or_else(|| PathBuf::from("."))
    } else {
        match &cli.output {
            Some(path) => {
                if let Some(name) = path.file_name() {
                    options = options.with_output_name(name.to_string_lossy().into_owned());
                }
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            }
            None => PathBuf::new(),
        }
    };

    let translation = translate_documents(&cli.inputs, &options)?;

    if cli.json {
        for doc in translation.values() {
            writeln!(out, "{}", document_to_json(doc)?)?;
        }
        return Ok(());
    }

    // Every document renders before anything is written
    let outputs = render_translation(&translation)?;

    if cli.stdout {
        let texts: Vec<&str> = outputs.iter().map(|(_, text)| text.as_str()).collect();
        write!(out, "{}", texts.join("\n"))?;
        return Ok(());
    }

    for path in write_outputs(&output_dir, &outputs)? {
        info!(path = %path.display(), "wrote schema");
        writeln!(out, "Generated {}", path.display())?;
    }
    Ok(())
}
