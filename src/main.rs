use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mdhtml::{Config, Error, Result};

#[derive(Parser)]
#[command(name = "mdhtml")]
#[command(about = "Convert Markdown files to HTML")]
struct Cli {
    /// Input Markdown file (reads stdin when omitted or `-`)
    input: Option<PathBuf>,

    /// Output HTML file (defaults to input name with .html extension, or stdout for stdin)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wrap the output in a complete HTML document
    #[arg(long)]
    standalone: bool,

    /// Log debug events to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            fs::read_to_string(path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })
        }
        _ => {
            let mut markdown = String::new();
            io::stdin()
                .read_to_string(&mut markdown)
                .map_err(|source| Error::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(markdown)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::compiled_default(),
    };
    if cli.standalone {
        config.output.standalone = true;
    }

    let markdown = read_input(cli.input.as_ref())?;
    let html = mdhtml::render_page(&markdown, &config);

    // Determine output path
    let output = cli.output.or_else(|| {
        cli.input
            .filter(|path| path.as_os_str() != "-")
            .map(|path| path.with_extension("html"))
    });

    match output {
        Some(path) => {
            fs::write(&path, html).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "wrote html");
            println!("Created {}", path.display());
        }
        None => io::stdout()
            .write_all(html.as_bytes())
            .map_err(|source| Error::Io {
                path: PathBuf::from("<stdout>"),
                source,
            })?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
