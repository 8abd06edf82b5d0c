//! Command-line interface for synctex
//! Answers forward and inverse search queries against a sync file, for editors and scripts.
//!
//! Usage:
//!   synctex forward `<sync>` --input `<path>` --line `<n>`     - Source line to output position
//!   synctex backward `<sync>` --page `<p>` --x `<x>` --y `<y>` - Output position to source line
//!   synctex inspect `<sync>`                                 - Summarize a sync file
//!
//! `<sync>` is either the sync file itself or the output document next to it.
//! Logging goes to stderr and is controlled through `RUST_LOG`; settings can also be
//! given as `SYNCTEX_<SECTION>__<KEY>` environment variables.

use clap::{value_parser, Arg, ArgMatches, Command};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use synctex::synctex::config::{Loader, OutputFormat, SyncConfig};
use synctex::synctex::{backward, forward_with, loader::SyncLoader, SyncError, SyncModel};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "synctex=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let sync_arg = || {
        Arg::new("sync")
            .help("Sync file, or the output document it belongs to")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .index(1)
    };

    let matches = Command::new("synctex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Forward and inverse search over SyncTeX files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .global(true)
                .help("Output format: 'json' or 'text' (defaults to the configured format)")
                .value_parser(["json", "text"]),
        )
        .subcommand(
            Command::new("forward")
                .about("Find the output position of a source line")
                .arg(sync_arg())
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .help("Source file path as recorded by the TeX run")
                        .required(true),
                )
                .arg(
                    Arg::new("line")
                        .long("line")
                        .short('l')
                        .help("Source line number")
                        .required(true)
                        .value_parser(value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("backward")
                .about("Find the source line behind an output position")
                .arg(sync_arg())
                .arg(
                    Arg::new("page")
                        .long("page")
                        .short('p')
                        .help("Page number, starting at 1")
                        .required(true)
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("x")
                        .long("x")
                        .help("Horizontal position in big points")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("y")
                        .long("y")
                        .help("Vertical position in big points, from the top of the page")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Summarize the contents of a sync file")
                .arg(sync_arg()),
        )
        .get_matches();

    let Some((name, sub)) = matches.subcommand() else {
        unreachable!()
    };
    // global flags are propagated into the subcommand's matches
    let config = load_config(sub).unwrap_or_else(|e| fail(e));
    let format = match sub.get_one::<String>("format").map(String::as_str) {
        Some("text") => OutputFormat::Text,
        Some(_) => OutputFormat::Json,
        None => config.output.format,
    };
    let model = load_model(sub).unwrap_or_else(|e| fail(e));

    match name {
        "forward" => {
            let input = sub.get_one::<String>("input").map_or("", String::as_str);
            let line = sub.get_one::<u32>("line").copied().unwrap_or_default();
            let result = forward_with(&model, line, input, config.forward_options())
                .unwrap_or_else(|e| fail(SyncError::from(e)));
            emit(format, &result, || {
                format!("page {} x {:.2} y {:.2}", result.page, result.x, result.y)
            });
        }
        "backward" => {
            let page = sub.get_one::<u32>("page").copied().unwrap_or_default();
            let x = sub.get_one::<f64>("x").copied().unwrap_or_default();
            let y = sub.get_one::<f64>("y").copied().unwrap_or_default();
            let result = backward(&model, page, x, y).unwrap_or_else(|e| fail(SyncError::from(e)));
            emit(format, &result, || format!("{}:{}", result.input, result.line));
        }
        "inspect" => {
            let summary = model.summary();
            emit(format, &summary, || {
                let mut text = format!(
                    "version {}\npages {}\nblocks {} ({} horizontal)\nelements {}\n",
                    summary.version,
                    summary.pages,
                    summary.blocks,
                    summary.horizontal_blocks,
                    summary.elements
                );
                for input in &summary.inputs {
                    text.push_str(&format!("input {}\n", input));
                }
                text.trim_end().to_string()
            });
        }
        _ => unreachable!(),
    }
}

fn load_config(matches: &ArgMatches) -> Result<SyncConfig, config::ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    loader.build()
}

fn load_model(matches: &ArgMatches) -> Result<SyncModel, SyncError> {
    let path = matches
        .get_one::<PathBuf>("sync")
        .cloned()
        .unwrap_or_default();
    Ok(SyncLoader::from_path(path)?.parse()?)
}

/// Print a result as JSON or as a one-line summary
fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) {
    match format {
        OutputFormat::Json => match serde_json::to_string(value) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        },
        OutputFormat::Text => println!("{}", text()),
    }
}

fn fail(err: impl Display) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}
