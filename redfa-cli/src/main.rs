use clap::{Parser, Subcommand};
use redfa::{NoPatternError, RegexEngine};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(
    name = "redfa",
    about = "Compile a pattern to a minimized DFA and query it"
)]
struct RedfaArgs {
    /// The pattern to compile
    pattern: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Test whole-string matches against the pattern
    Match { inputs: Vec<String> },
    /// List all non-overlapping matches inside the input
    Findall { input: String },
    /// Test whole-string matches against the complement of the pattern
    Complement { inputs: Vec<String> },
    /// Recover a pattern from the minimized DFA by state elimination
    Recover,
    /// Print the transition table of the minimized DFA
    Table,
}

#[derive(Debug, Error)]
enum Error {
    #[error("cannot compile pattern: {0}")]
    Compile(#[from] redfa::CompileError),
    #[error("{0}")]
    Query(#[from] NoPatternError),
}

fn main() -> ExitCode {
    match run(RedfaArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: RedfaArgs) -> Result<(), Error> {
    let mut engine = RegexEngine::new();
    engine.compile(&args.pattern)?;

    match args.command {
        Command::Match { inputs } => {
            for input in inputs {
                println!("{input}: {}", engine.is_match(&input)?);
            }
        }
        Command::Findall { input } => {
            let hits = engine.find_all(&input)?;
            if hits.is_empty() {
                println!("no matches");
            }
            for hit in hits {
                println!("[{}, {}) {}", hit.start, hit.end, hit.text);
            }
        }
        Command::Complement { inputs } => {
            let complement = engine.complement()?;
            for input in inputs {
                println!("{input}: {}", complement.is_match(&input)?);
            }
        }
        Command::Recover => println!("{}", engine.recover_pattern()?),
        Command::Table => {
            let dfa = engine.dfa().ok_or(NoPatternError)?;
            println!("{}", dfa.to_table());
        }
    }
    Ok(())
}
