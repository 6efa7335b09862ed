use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox as lox;

use lox::ast_printer::AstPrinter;
use lox::error::{Diagnostics, RoxError};
use lox::parser::Parser;
use lox::scanner::Scanner;
use lox::session::{Mode, Session};
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print tokens as JSON objects, one per line
        #[arg(long)]
        json: bool,
    },

    /// Parses a program and prints it back in canonical form
    Parse { filename: PathBuf },

    /// Runs a program, or starts a prompt when no file is given
    Run { filename: Option<PathBuf> },
}

/// Reads a file and decodes it as UTF‑8.
fn read_file(filename: &PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    let text = String::from_utf8(buf).map_err(RoxError::from)?;
    Ok(text)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);

            writeln!(
                buf,
                "[{} {}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }
}

/// Print a failed run and pick its exit status.
fn fail(err: &RoxError) -> i32 {
    debug!("Run failed: {}", err);

    match err {
        RoxError::Compile(diagnostics) => report(diagnostics),
        other => eprintln!("{}", other),
    }

    err.exit_code()
}

fn tokenize(filename: &PathBuf, json: bool) -> Result<i32> {
    info!("Running Tokenize subcommand");
    let src = read_file(filename)?;
    let mut tokenized = true;

    for token in Scanner::new(&src) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);

                if json {
                    println!("{}", serde_json::to_string::<Token>(&token)?);
                } else {
                    println!("{}", token);
                }
            }

            Err(e) => {
                tokenized = false;

                debug!("Tokenization debug: {}", e);

                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");

        return Ok(65);
    }

    info!("Tokenization completed successfully");
    Ok(0)
}

fn parse(filename: &PathBuf) -> Result<i32> {
    info!("Running Parse subcommand");
    let src = read_file(filename)?;

    let (tokens, mut diagnostics) = lox::scanner::tokenize(&src);
    let (statements, parse_diagnostics) = Parser::new(tokens).parse();
    diagnostics.extend(parse_diagnostics);

    if diagnostics.has_errors() {
        report(&diagnostics);
        return Ok(65);
    }

    print!("{}", AstPrinter::print_program(&statements));

    info!("Parse subcommand completed");
    Ok(0)
}

fn run_file(filename: &PathBuf) -> Result<i32> {
    info!("Running Run subcommand");
    let src = read_file(filename)?;

    let mut session = Session::new();

    match session.run(&src, Mode::Script) {
        Ok(warnings) => {
            report(&warnings);
            info!("Program executed successfully");
            Ok(0)
        }

        Err(e) => Ok(fail(&e)),
    }
}

fn run_prompt() -> Result<i32> {
    info!("Starting interactive prompt");

    let mut session = Session::new();

    loop {
        session.interpreter().write_output("> ")?;

        let Some(line) = session.interpreter().read_line()? else {
            break;
        };

        match session.run(&line, Mode::Interactive) {
            Ok(warnings) => report(&warnings),
            Err(e) => {
                fail(&e);
            }
        }
    }

    info!("Prompt closed");
    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let outcome = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json),
        Commands::Parse { filename } => parse(filename),
        Commands::Run { filename: Some(filename) } => run_file(filename),
        Commands::Run { filename: None } => run_prompt(),
    };

    let code = match outcome {
        Ok(code) => code,

        Err(e) => {
            eprintln!("{:#}", e);

            match e.downcast_ref::<RoxError>() {
                Some(err) => err.exit_code(),
                None => 74,
            }
        }
    };

    if code != 0 {
        process::exit(code);
    }

    Ok(())
}
