//! Command-line interface for haml
//! Renders a haml template from a file (or stdin) to HTML.
//!
//! Usage:
//!   haml `<path>`                          - Render a template to HTML
//!   haml --emit tokens `<path>`            - Dump the token stream as JSON
//!   haml --emit ir `<path>`                - Dump the compiled instructions as JSON
//!
//! Pass `-` as the path (or no path) to read from stdin.

use clap::{Arg, ArgAction, Command};
use haml::haml::evaluator::Bindings;
use haml::haml::lexing;
use haml::{Engine, Format, Options};
use std::io::Read;

fn main() {
    let matches = Command::new("haml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile haml templates to HTML")
        .arg(
            Arg::new("path")
                .help("Path to the template, or - for stdin")
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: html5, html4 or xhtml")
                .default_value("html5"),
        )
        .arg(
            Arg::new("attr-wrapper")
                .long("attr-wrapper")
                .help("Quote character wrapping attribute values")
                .value_parser(["'", "\""])
                .default_value("'"),
        )
        .arg(
            Arg::new("no-escape")
                .long("no-escape")
                .help("Do not HTML-escape = fragments by default")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("suppress-eval")
                .long("suppress-eval")
                .help("Replace script fragments with inert equivalents")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("autoclose")
                .long("autoclose")
                .help("Add a tag name to the autoclose set")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("preserve")
                .long("preserve")
                .help("Add a tag name to the whitespace-preserving set")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("bindings")
                .long("bindings")
                .short('b')
                .help("JSON object providing the binding environment"),
        )
        .arg(
            Arg::new("emit")
                .long("emit")
                .help("What to print: the rendered html, the token stream or the instruction list")
                .value_parser(["html", "tokens", "ir"])
                .default_value("html"),
        )
        .get_matches();

    let source = read_source(matches.get_one::<String>("path").map(String::as_str));
    let options = build_options(&matches);

    match matches.get_one::<String>("emit").unwrap().as_str() {
        "tokens" => emit_tokens(&source),
        "ir" => emit_ir(&source, options),
        "html" => {
            let bindings = parse_bindings(matches.get_one::<String>("bindings"));
            emit_html(&source, options, bindings);
        }
        _ => unreachable!(),
    }
}

fn read_source(path: Option<&str>) -> String {
    match path {
        Some(path) if path != "-" => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        }),
        _ => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .unwrap_or_else(|e| {
                    eprintln!("Error reading stdin: {}", e);
                    std::process::exit(1);
                });
            source
        }
    }
}

fn build_options(matches: &clap::ArgMatches) -> Options {
    let format: Format = matches
        .get_one::<String>("format")
        .unwrap()
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let mut options = Options {
        format,
        escape_html: !matches.get_flag("no-escape"),
        suppress_eval: matches.get_flag("suppress-eval"),
        ..Options::default()
    };
    options.attr_wrapper = matches
        .get_one::<String>("attr-wrapper")
        .unwrap()
        .chars()
        .next()
        .unwrap();
    if let Some(tags) = matches.get_many::<String>("autoclose") {
        options.autoclose.extend(tags.cloned());
    }
    if let Some(tags) = matches.get_many::<String>("preserve") {
        options.preserve.extend(tags.cloned());
    }
    options
}

fn parse_bindings(json: Option<&String>) -> Bindings {
    let Some(json) = json else {
        return Bindings::new();
    };
    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(_) => {
            eprintln!("Error: --bindings must be a JSON object");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error parsing bindings: {}", e);
            std::process::exit(1);
        }
    }
}

fn emit_tokens(source: &str) {
    let tokens = lexing::tokenize(source.trim()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&tokens).expect("tokens serialize to JSON")
    );
}

fn emit_ir(source: &str, options: Options) {
    let program = Engine::new(options).compile(source.trim()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&program).expect("instructions serialize to JSON")
    );
}

fn emit_html(source: &str, options: Options, bindings: Bindings) {
    let html = Engine::new(options)
        .to_html_with(source, bindings)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
    print!("{}", html);
}
