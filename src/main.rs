//! Decode a single function body and print its listing and lowering.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::builder::ValueHint;
use clap::{Parser, ValueEnum};
use tracing::info;

use lowasm::codegen::{emit_function, Listing};
use lowasm::parser::{self, text};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum InputFormat {
    /// Raw body bytes
    Binary,
    /// Hex digits, whitespace ignored
    Hex,
    /// One instruction per line
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "lowasm", about = "Decode and lower one function body")]
struct Args {
    #[arg(value_name = "FILE", help = "Function body to read", value_hint = ValueHint::FilePath)]
    file: PathBuf,

    #[arg(long, default_value_t = 0, help = "Number of parameters in the function's signature")]
    params: u32,

    #[arg(long, value_enum, default_value_t = InputFormat::Binary)]
    format: InputFormat,

    #[arg(long, help = "Print the decoded listing only, skip lowering")]
    decode_only: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "More logging, repeat for trace")]
    verbose: u8,
}

fn read_body(args: &Args) -> Result<Vec<u8>, anyhow::Error> {
    let bytes = match args.format {
        InputFormat::Binary => fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?,
        InputFormat::Hex => {
            let source = fs::read_to_string(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
            let digits: String = source.split_whitespace().collect();
            hex::decode(digits).context("decoding hex input")?
        }
        InputFormat::Text => {
            let source = fs::read_to_string(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
            text::assemble(&source)?
        }
    };
    if bytes.is_empty() {
        bail!("{} holds no instructions", args.file.display());
    }
    Ok(bytes)
}

fn main() -> Result<(), anyhow::Error> {
    let args: Args = Args::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let bytes = read_body(&args)?;
    info!(len = bytes.len(), body = %hex::encode(&bytes), "read function body");

    let body = parser::decode(&bytes, args.params)?;
    println!(";; {} instruction(s), {} block(s), {} param(s)", body.len(), body.blocks().len(), body.param_count());
    print!("{body}");

    if args.decode_only {
        return Ok(());
    }

    let mut listing = Listing::new();
    emit_function(&body, &mut listing)?;
    println!();
    print!("{listing}");
    Ok(())
}
