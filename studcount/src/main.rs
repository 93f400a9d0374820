//! # studcount
//!
//! A CLI tool for inferring the stud attributes of LDraw parts.
//!
//! ## Overview
//!
//! studcount is built on top of studcountlib and provides a command-line
//! interface for batch-processing an LDraw part library. Every top-level part
//! is resolved down to its stud primitives and reported as top studs,
//! underside studs and stud rings.
//!
//! ## Usage
//!
//! ```bash
//! # Count every part of an installation
//! studcount count --ldraw ~/ldraw
//!
//! # Include the unofficial supplement and write the JSON mapping to a file
//! studcount count --ldraw ~/ldraw --unofficial ~/ldrawunf --output json --out studs.json
//!
//! # Only plates
//! studcount count --ldraw ~/ldraw --include "302*"
//!
//! # Show what a part is made of
//! studcount tree 3024 --ldraw ~/ldraw
//!
//! # Classify primitive names
//! studcount classify stud.dat stud3.dat stud4.dat
//! ```

mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use outstanding::cli::{App, CommandContext, HandlerResult, Output, RunResult};
use studcountlib::{
    count_library, BatchOptions, FileKey, FileResolver, LibraryConfig, PartFilter, StudTable,
    SubfileTree,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use render::{
    create_theme, render, ClassifyContext, OutputMode, StudTableContext, TreeContext,
    VisitsContext, CLASSIFY_TEMPLATE, STUD_TABLE_TEMPLATE, TREE_TEMPLATE, VISITS_TEMPLATE,
};

/// Number of entries shown by `--visits`
const VISIT_REPORT_LIMIT: usize = 25;

/// Arguments describing where the part library lives
fn library_args() -> Vec<Arg> {
    vec![
        Arg::new("ldraw")
            .short('l')
            .long("ldraw")
            .help("LDraw root directory containing parts/ and p/"),
        Arg::new("parts")
            .long("parts")
            .requires("primitives")
            .help("Official parts directory (overrides --ldraw)"),
        Arg::new("primitives")
            .long("primitives")
            .requires("parts")
            .help("Official primitives directory (overrides --ldraw)"),
        Arg::new("unofficial")
            .short('u')
            .long("unofficial")
            .conflicts_with_all(["unofficial-parts", "unofficial-primitives"])
            .help("Unofficial library root containing parts/ and p/"),
        Arg::new("unofficial-parts")
            .long("unofficial-parts")
            .help("Unofficial parts directory"),
        Arg::new("unofficial-primitives")
            .long("unofficial-primitives")
            .help("Unofficial primitives directory"),
    ]
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("studcount")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Infers stud counts of LDraw parts from their sub-file references")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .subcommand(
            Command::new("count")
                .about("Count studs of every part in the library")
                .args(library_args())
                .arg(
                    Arg::new("include")
                        .short('i')
                        .long("include")
                        .action(ArgAction::Append)
                        .help("Only count parts whose file name matches the glob pattern"),
                )
                .arg(
                    Arg::new("exclude")
                        .short('e')
                        .long("exclude")
                        .action(ArgAction::Append)
                        .help("Skip parts whose file name matches the glob pattern"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .help("Write the output to a file instead of stdout"),
                )
                .arg(
                    Arg::new("visits")
                        .long("visits")
                        .action(ArgAction::SetTrue)
                        .help("Report the most visited files"),
                ),
        )
        .subcommand(
            Command::new("tree")
                .about("Show the sub-file tree of a part")
                .arg(
                    Arg::new("part")
                        .required(true)
                        .help("Part file name (e.g. 3024 or 3024.dat) or path"),
                )
                .args(library_args())
                .arg(
                    Arg::new("prefix")
                        .short('p')
                        .long("prefix")
                        .help("Only show files whose name starts with this prefix"),
                ),
        )
        .subcommand(
            Command::new("classify")
                .about("Show the stud category of primitive file names")
                .arg(
                    Arg::new("names")
                        .required(true)
                        .action(ArgAction::Append)
                        .help("Primitive file names"),
                ),
        )
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins unless verbosity was raised on the command line.
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Build library config from matches
fn build_library_config(matches: &ArgMatches) -> anyhow::Result<LibraryConfig> {
    let parts = matches.get_one::<String>("parts");
    let primitives = matches.get_one::<String>("primitives");
    let ldraw = matches.get_one::<String>("ldraw");

    let mut config = match (parts, primitives, ldraw) {
        (Some(parts), Some(primitives), _) => LibraryConfig::new(parts, primitives),
        (_, _, Some(root)) => LibraryConfig::from_ldraw_root(root),
        _ => bail!("either --ldraw or both --parts and --primitives are required"),
    };

    if let Some(root) = matches.get_one::<String>("unofficial") {
        config = config.unofficial_root(root);
    }
    if let Some(dir) = matches.get_one::<String>("unofficial-parts") {
        config = config.unofficial_parts(dir);
    }
    if let Some(dir) = matches.get_one::<String>("unofficial-primitives") {
        config = config.unofficial_primitives(dir);
    }

    debug!(?config, "Library configuration");
    Ok(config)
}

/// Build part filter from matches
fn build_filter(matches: &ArgMatches) -> anyhow::Result<PartFilter> {
    let mut filter = PartFilter::new();

    if let Some(includes) = matches.get_many::<String>("include") {
        for pattern in includes {
            filter = filter.include(pattern)?;
        }
    }

    if let Some(excludes) = matches.get_many::<String>("exclude") {
        for pattern in excludes {
            filter = filter.exclude(pattern)?;
        }
    }

    Ok(filter)
}

/// Render a template context as plain text, for files and stderr
fn render_text<T: serde::Serialize>(template: &str, context: &T) -> anyhow::Result<String> {
    render(template, context, OutputMode::Text).map_err(|e| anyhow::anyhow!("{e}"))
}

/// Handler for count command
fn count_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    init_logging(matches.get_count("verbose"));

    let config = build_library_config(matches)?;
    let filter = build_filter(matches)?;
    let options = BatchOptions::new().track_visits(matches.get_flag("visits"));

    let result = count_library(&config, &filter, &options)?;

    let base = config.parts_dir.parent().unwrap_or(Path::new(""));
    let visits = result
        .visits
        .as_ref()
        .map(|v| VisitsContext::new(v, base, VISIT_REPORT_LIMIT));

    if ctx.output_mode.is_structured() {
        // The JSON document stays the bare part mapping; visits go to stderr.
        if let Some(visits) = visits {
            eprint!("{}", render_text(VISITS_TEMPLATE, &visits)?);
        }
        let value = result.to_json_map()?;
        if let Some(path) = matches.get_one::<String>("out") {
            let json = serde_json::to_string_pretty(&value)? + "\n";
            fs::write(path, json).with_context(|| format!("writing {path}"))?;
            return Ok(Output::Silent);
        }
        return Ok(Output::Render(value));
    }

    let mut context = StudTableContext::new(&StudTable::from_batch(&result));
    if let Some(visits) = visits {
        context = context.with_visits(visits);
    }

    if let Some(path) = matches.get_one::<String>("out") {
        let table = render_text(STUD_TABLE_TEMPLATE, &context)?;
        fs::write(path, table).with_context(|| format!("writing {path}"))?;
        return Ok(Output::Silent);
    }

    Ok(Output::Render(serde_json::to_value(&context)?))
}

/// Find a part by path or by library file name.
fn locate_part(name: &str, resolver: &FileResolver) -> anyhow::Result<PathBuf> {
    let path = Path::new(name);
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let key = if path.extension().is_some() {
        FileKey::new(name)
    } else {
        FileKey::new(format!("{name}.dat"))
    };
    Ok(resolver.resolve(&key)?.to_path_buf())
}

/// Handler for tree command
fn tree_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    init_logging(matches.get_count("verbose"));

    let config = build_library_config(matches)?;
    let resolver = config.build_resolver()?;
    let name = matches
        .get_one::<String>("part")
        .context("missing part argument")?;
    let prefix = matches.get_one::<String>("prefix").map(String::as_str);

    let location = locate_part(name, &resolver)?;
    let tree = SubfileTree::build(&location, &resolver, prefix)?;

    // For JSON mode, return raw data
    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(serde_json::to_value(&tree)?));
    }
    Ok(Output::Render(serde_json::to_value(TreeContext::new(&tree))?))
}

/// Handler for classify command
fn classify_handler(
    matches: &ArgMatches,
    _ctx: &CommandContext,
) -> HandlerResult<serde_json::Value> {
    init_logging(matches.get_count("verbose"));

    let names = matches
        .get_many::<String>("names")
        .map(|v| v.map(String::as_str).collect::<Vec<_>>())
        .unwrap_or_default();
    Ok(Output::Render(serde_json::to_value(ClassifyContext::new(names))?))
}

fn main() -> ExitCode {
    let result = App::builder()
        .theme(create_theme())
        .command("count", count_handler, STUD_TABLE_TEMPLATE)
        .command("tree", tree_handler, TREE_TEMPLATE)
        .command("classify", classify_handler, CLASSIFY_TEMPLATE)
        .run_to_string(build_command(), std::env::args());

    match result {
        RunResult::Handled(output) => {
            if !output.is_empty() {
                // Errors from handlers come back as rendered text
                if output.starts_with("Error:") {
                    eprintln!("{}", output.trim_end());
                    return ExitCode::FAILURE;
                }
                print!("{}", output);
            }
            ExitCode::SUCCESS
        }
        RunResult::Binary(_, _) => {
            // Not used in studcount
            ExitCode::SUCCESS
        }
        RunResult::NoMatch(_) => {
            let _ = build_command().print_help();
            ExitCode::FAILURE
        }
    }
}
