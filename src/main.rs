//! nbview - a Jupyter notebook viewer
//!
//! Entry point for the application. Handles CLI argument parsing,
//! logging initialization, and the viewer event loop.

mod app;
mod config;
mod error;
mod file_handler;
mod host;
mod message;
mod notebook;
mod outline;
mod render;
mod state;
mod utils;
mod view;

use anyhow::Context;
use config::{ColorSchemePreference, Config};
use host::Session;
use std::path::PathBuf;

/// Application name for logging
const APP_NAME: &str = "nbview";

/// Options given on the command line
#[derive(Debug, Default)]
struct CliArgs {
    notebook: Option<PathBuf>,
    output: Option<PathBuf>,
    theme: Option<String>,
    raw_mode: bool,
    no_syntax: bool,
    no_math: bool,
    no_toc: bool,
    no_emoji: bool,
    autoreload: bool,
    color_scheme: Option<ColorSchemePreference>,
}

impl CliArgs {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(theme) = &self.theme {
            config.viewer.theme = theme.clone();
        }
        if self.raw_mode {
            config.viewer.raw_mode = true;
        }

        let content = &mut config.viewer.content;
        if self.no_syntax {
            content.syntax = false;
        }
        if self.no_math {
            content.mathjax = false;
        }
        if self.no_toc {
            content.toc = false;
        }
        if self.no_emoji {
            content.emoji = false;
        }

        if self.autoreload {
            config.files.autoreload = true;
        }
        if let Some(scheme) = self.color_scheme {
            config.ui.color_scheme = scheme;
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = parse_args();
    let Some(notebook) = args.notebook.clone() else {
        eprintln!("Error: no notebook given");
        eprintln!("Use --help for usage information");
        std::process::exit(1);
    };

    log::info!("Starting {} {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("{}; using default configuration", e);
        Config::default()
    });
    args.apply(&mut config);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| notebook.with_extension("html"));
    let session = Session {
        prefers_dark: config.ui.color_scheme.prefers_dark(),
        quit_on_eof: !config.files.autoreload,
        notebook,
        output,
        config,
    };
    log::info!(
        "Viewing {} -> {}",
        session.notebook.display(),
        session.output.display()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(host::run(session));
    // stdin reads block a worker; don't wait for them
    runtime.shutdown_background();

    if let Err(e) = &result {
        if e.is_fatal() {
            eprintln!("{}: {}", APP_NAME, e.user_message());
        }
    }
    result.context("viewer stopped with an error")
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,nbview=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .init();
}

/// Parse command line arguments
fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-o" | "--output" => {
                cli.output = Some(PathBuf::from(required_value(&args, i, "--output")));
                i += 1;
            }
            "-t" | "--theme" => {
                cli.theme = Some(required_value(&args, i, "--theme").to_string());
                i += 1;
            }
            "--raw" => cli.raw_mode = true,
            "--no-syntax" => cli.no_syntax = true,
            "--no-math" => cli.no_math = true,
            "--no-toc" => cli.no_toc = true,
            "--no-emoji" => cli.no_emoji = true,
            "--autoreload" => cli.autoreload = true,
            "--dark" => cli.color_scheme = Some(ColorSchemePreference::Dark),
            "--light" => cli.color_scheme = Some(ColorSchemePreference::Light),
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
            path => {
                if cli.notebook.is_some() {
                    eprintln!("Error: only one notebook can be viewed at a time");
                    std::process::exit(1);
                }
                cli.notebook = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    cli
}

/// Value following option `args[i]`, or exit with an error
fn required_value<'a>(args: &'a [String], i: usize, name: &str) -> &'a str {
    match args.get(i + 1) {
        Some(value) => value.as_str(),
        None => {
            eprintln!("Error: {} requires an argument", name);
            std::process::exit(1);
        }
    }
}

/// Print help message
fn print_help() {
    println!(
        r#"nbview - render a Jupyter notebook to a themed HTML page

USAGE:
    nbview [OPTIONS] <NOTEBOOK>

OPTIONS:
    -o, --output <FILE>     Page output (default: <NOTEBOOK stem>.html)
    -t, --theme <NAME>      Initial theme (github, github-dark, jupyter, custom)
        --raw               Start in raw mode
        --no-syntax         Disable syntax highlighting
        --no-math           Disable math typesetting
        --no-toc            Disable the outline panel
        --no-emoji          Disable emoji shortcodes
        --autoreload        Re-render when the notebook changes on disk
        --dark              Prefer a dark colour scheme
        --light             Prefer a light colour scheme
    -h, --help              Show this help message
    -v, --version           Show version information

STDIN:
    JSON messages, one per line:
        {{"message":"theme","theme":"github-dark"}}
        {{"message":"themes","themes":{{"solar":"auto"}}}}
        {{"message":"raw","raw":"<notebook json>"}}
        {{"message":"reload"}}
        {{"message":"autoreload"}}
    Host commands:
        :raw                Toggle raw mode
        :syntax / :math     Toggle syntax highlighting / math typesetting
        :toc / :emoji       Toggle the outline panel / emoji shortcodes
        :dark / :light      Change the colour-scheme preference
        :quit               Stop

ENVIRONMENT:
    RUST_LOG                Log filter (default: info,nbview=debug)
    {env}      Colour scheme when no preference is configured
"#,
        env = config::COLOR_SCHEME_ENV
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
