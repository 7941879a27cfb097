//! caretc: drive the completion parser from the command line.
//!
//! Exit status is 0 for every completion outcome (including an invalid
//! cursor location), 1 when the session fails and 2 for usage errors.

mod args;
mod commands;

use std::process::ExitCode;

use args::{Args, Command, USAGE};

/// Install the log subscriber. The filter comes from `CARET_LOG` and
/// defaults to `warn`; output goes to stderr.
fn init_tracing(tree: bool) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, Registry};

    let filter = EnvFilter::try_from_env("CARET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    if tree {
        let tree_layer = tracing_tree::HierarchicalLayer::default()
            .with_writer(std::io::stderr)
            .with_indent_amount(2)
            .with_indent_lines(true)
            .with_targets(true);
        Registry::default().with(filter).with(tree_layer).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    }
}

fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let Args { command, tree } = match args::parse(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    init_tracing(tree);

    match command {
        Command::Help => {
            println!("{USAGE}");
            ExitCode::SUCCESS
        }
        Command::Complete {
            path,
            offset,
            context,
            options,
        } => {
            let source = match commands::read_file(&path) {
                Ok(source) => source,
                Err(message) => {
                    eprintln!("{message}");
                    return ExitCode::from(1);
                }
            };
            match commands::complete(&source, offset, &context, options) {
                Ok(out) => {
                    print!("{out}");
                    ExitCode::SUCCESS
                }
                Err(error) => {
                    eprintln!("error: {error}");
                    ExitCode::from(1)
                }
            }
        }
        Command::Tokens { path, offset } => {
            let result = commands::read_file(&path)
                .and_then(|source| commands::tokens(&source, offset));
            match result {
                Ok(out) => {
                    print!("{out}");
                    ExitCode::SUCCESS
                }
                Err(message) => {
                    eprintln!("error: {message}");
                    ExitCode::from(1)
                }
            }
        }
    }
}
