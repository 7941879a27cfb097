//! Hand-rolled argument parsing.

use caret_assist::{ReferenceContext, SessionOptions};
use caret_ir::Span;

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Command {
    Complete {
        path: String,
        offset: i64,
        context: ReferenceContext,
        options: SessionOptions,
    },
    Tokens {
        path: String,
        offset: Option<i64>,
    },
    Help,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Args {
    pub command: Command,
    /// Hierarchical log output.
    pub tree: bool,
}

pub const USAGE: &str = "\
Usage: caretc <command> [options]

Commands:
  complete <file> <offset>   Find the completion node at a cursor offset
  tokens <file> [offset]     Print the token stream, marking the cursor

Options for complete:
  --context <ctx>     unit (default), or type|method|field:<name>:<start>:<end>
  --max-rounds <n>    Recovery rounds before giving up (default: unlimited)
  --no-diet           Parse method bodies when resuming after a stall

  --tree              Hierarchical log output (filter with CARET_LOG)

The offset is the index of the last character before the cursor; -1 puts
the cursor at the start of the file.";

/// Parse the arguments after the program name.
pub fn parse(args: &[String]) -> Result<Args, String> {
    let mut tree = false;
    let mut rest = Vec::with_capacity(args.len());
    for arg in args {
        if arg == "--tree" {
            tree = true;
        } else {
            rest.push(arg.as_str());
        }
    }

    let command = match rest.split_first() {
        None => Command::Help,
        Some((&("help" | "--help" | "-h"), _)) => Command::Help,
        Some((&"complete", tail)) => parse_complete(tail)?,
        Some((&"tokens", tail)) => parse_tokens(tail)?,
        Some((other, _)) => return Err(format!("unknown command '{other}'")),
    };
    Ok(Args { command, tree })
}

fn parse_complete(args: &[&str]) -> Result<Command, String> {
    let mut positional = Vec::new();
    let mut context = ReferenceContext::CompilationUnit;
    let mut options = SessionOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--context" => {
                let value = args.get(i + 1).ok_or("--context needs a value")?;
                context = parse_context(value)?;
                i += 2;
            }
            "--max-rounds" => {
                let value = args.get(i + 1).ok_or("--max-rounds needs a value")?;
                let rounds = value
                    .parse()
                    .map_err(|_| format!("invalid round count '{value}'"))?;
                options = options.with_max_recovery_rounds(rounds);
                i += 2;
            }
            "--no-diet" => {
                options = options.with_diet_after_recovery(false);
                i += 1;
            }
            arg if arg.starts_with("--") => return Err(format!("unknown option '{arg}'")),
            arg => {
                positional.push(arg);
                i += 1;
            }
        }
    }
    let [path, offset] = positional[..] else {
        return Err("complete takes a file and an offset".to_owned());
    };
    Ok(Command::Complete {
        path: path.to_owned(),
        offset: parse_offset(offset)?,
        context,
        options,
    })
}

fn parse_tokens(args: &[&str]) -> Result<Command, String> {
    match args {
        [path] => Ok(Command::Tokens {
            path: (*path).to_owned(),
            offset: None,
        }),
        [path, offset] => Ok(Command::Tokens {
            path: (*path).to_owned(),
            offset: Some(parse_offset(offset)?),
        }),
        _ => Err("tokens takes a file and an optional offset".to_owned()),
    }
}

fn parse_offset(text: &str) -> Result<i64, String> {
    text.parse().map_err(|_| format!("invalid offset '{text}'"))
}

fn parse_u32(text: &str) -> Result<u32, String> {
    text.parse().map_err(|_| format!("invalid position '{text}'"))
}

/// `unit`, or `<kind>:<name>:<start>:<end>`.
fn parse_context(text: &str) -> Result<ReferenceContext, String> {
    if text == "unit" {
        return Ok(ReferenceContext::CompilationUnit);
    }
    let parts: Vec<&str> = text.split(':').collect();
    let [kind, name, start, end] = parts[..] else {
        return Err(format!("invalid context '{text}'"));
    };
    let name: Box<str> = name.into();
    let span = Span::new(parse_u32(start)?, parse_u32(end)?);
    match kind {
        "type" => Ok(ReferenceContext::TypeBody { name, body: span }),
        "method" => Ok(ReferenceContext::MethodBody { name, body: span }),
        "field" => Ok(ReferenceContext::FieldInitializer {
            name,
            initializer: span,
        }),
        _ => Err(format!("unknown context kind '{kind}'")),
    }
}
