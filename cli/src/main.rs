//! xbind CLI — driving adapter for the xbind binding engine.
//!
//! Rules are bound against the generic record domain, so any rules file written with its
//! catalog names (`record`, `Record.set`, ...) can be tried on real documents.
//!
//! Subcommands:
//! - `run <rules> <xml> [--trace]` — bind a document and print the root as JSON
//! - `check <rules>` — validate rules load without errors
//! - `info` — print registered action type URLs and catalog names

use std::process;
use std::sync::Arc;

use xbind::{Binder, BinderBuilder, Catalog, RulesConfig};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "info" => cmd_info(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_run(args: &[String]) -> Result<(), String> {
    let options = parse_run_args(args)?;

    let binder = build_binder(load_rules(&options.rules)?)?;
    let file = std::fs::File::open(&options.document)
        .map_err(|e| format!("failed to open \"{}\": {e}", options.document))?;

    let mut session = binder.session();
    if options.trace {
        session = session.with_trace();
    }
    let result = session.feed_reader(std::io::BufReader::new(file));

    if options.trace {
        for step in session.trace() {
            eprintln!("{step}");
        }
    }
    result.map_err(|e| format!("bind failed: {e}"))?;

    match session.root() {
        Some(root) => {
            let json = serde_json::to_string_pretty(&xbind_test::to_json(&root))
                .map_err(|e| format!("render failed: {e}"))?;
            println!("{json}");
        }
        None => println!("(no root)"),
    }

    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a rules file path".into());
    }

    let config = load_rules(&args[0])?;
    let binder = build_binder(config)?;

    println!("Rules valid ({} bindings)", binder.rules().len());
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_info() -> Result<(), String> {
    let registry = xbind_test::registry();
    let catalog = build_catalog();

    println!("Registered actions:");
    for url in registry.type_urls() {
        println!("  {url}");
    }

    let sections = [
        ("factories", catalog.factory_names()),
        ("methods", catalog.method_names()),
        ("property setters", catalog.property_names()),
        ("constructors", catalog.constructor_names()),
    ];
    for (title, names) in sections {
        println!("\nCatalog {title}:");
        for name in names {
            println!("  {name}");
        }
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Binder assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_catalog() -> Catalog {
    xbind_test::register(Catalog::new())
}

fn build_binder(config: RulesConfig) -> Result<Binder, String> {
    xbind_test::registry()
        .load_rules(&config, Arc::new(build_catalog()), Binder::builder())
        .map(BinderBuilder::build)
        .map_err(|e| format!("rules invalid: {e}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rules loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_rules(path: &str) -> Result<RulesConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    parse_rules(&content, is_json)
}

fn parse_rules(content: &str, is_json: bool) -> Result<RulesConfig, String> {
    if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, PartialEq, Eq)]
struct RunOptions {
    rules: String,
    document: String,
    trace: bool,
}

fn parse_run_args(args: &[String]) -> Result<RunOptions, String> {
    let mut paths = Vec::new();
    let mut trace = false;

    for arg in args {
        match arg.as_str() {
            "--trace" => trace = true,
            flag if flag.starts_with("--") => {
                return Err(format!("unexpected argument \"{flag}\""));
            }
            path => paths.push(path.to_owned()),
        }
    }

    match <[String; 2]>::try_from(paths) {
        Ok([rules, document]) => Ok(RunOptions {
            rules,
            document,
            trace,
        }),
        Err(_) => Err("run requires a rules file and a document path".into()),
    }
}

fn print_usage() {
    eprintln!(
        "Usage: xbind <command> [options]

Commands:
  run <rules> <xml> [--trace]   Bind a document and print the root as JSON
  check <rules>                 Validate rules
  info                          Print registered action types and catalog names
  help                          Show this help"
    );
}
