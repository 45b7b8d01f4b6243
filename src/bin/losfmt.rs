//! losfmt CLI — ViewState <-> JSON conversion.

#[cfg(feature = "fast-alloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Args, Parser, Subcommand};
use losfmt::{json, DecodeOptions, Error};
use std::io::Read;
use std::process;

#[derive(Parser)]
#[command(name = "losfmt", about = "ASP.NET ViewState <-> JSON conversion")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a Base64 ViewState string to JSON
    Decode(DecodeArgs),
    /// Encode editor JSON to a Base64 ViewState string
    Encode(EncodeArgs),
    /// JSON editor helpers
    Json {
        #[command(subcommand)]
        command: JsonCommand,
    },
}

#[derive(Subcommand)]
enum JsonCommand {
    /// Pretty-print JSON
    Format(InputArgs),
    /// Syntax-check JSON, reporting line and column on failure
    Validate(InputArgs),
}

#[derive(Args)]
struct DecodeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Compact output instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,

    /// Print value-kind statistics to stderr
    #[arg(long)]
    stats: bool,

    /// Do not attempt URL-decoding of %-escaped input
    #[arg(long)]
    no_url_decode: bool,
}

#[derive(Args)]
struct EncodeArgs {
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args)]
struct InputArgs {
    /// Input file (- for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,
}

fn read_input(path: &str) -> Result<String, Error> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn run() -> Result<(), Error> {
    match Cli::parse().command {
        Command::Decode(args) => {
            let text = read_input(&args.input.input)?;
            let mut options = DecodeOptions::default();
            if args.no_url_decode {
                options.url_decode = false;
            }
            let decoded = losfmt::decode_with_options(&text, &options)?;
            if let Some(note) = &decoded.note {
                eprintln!("note: {note}");
            }
            if args.stats {
                let s = decoded.stats;
                eprintln!(
                    "size: {} octets | pairs: {} | triplets: {} | arrays: {} | strings: {} | integers: {} | booleans: {} | opaque: {}",
                    decoded.raw_size,
                    s.pairs,
                    s.triplets,
                    s.arrays,
                    s.strings,
                    s.integers,
                    s.booleans,
                    s.opaque_objects
                );
            }
            if args.compact {
                println!("{}", json::to_json_string(&decoded.value));
            } else {
                println!("{}", json::to_json_string_pretty(&decoded.value));
            }
            Ok(())
        }
        Command::Encode(args) => {
            let text = read_input(&args.input.input)?;
            let encoded = losfmt::encode_json_text(&text)?;
            eprintln!("size: {} octets", encoded.size);
            println!("{}", encoded.encoded);
            Ok(())
        }
        Command::Json { command } => match command {
            JsonCommand::Format(args) => {
                let text = read_input(&args.input)?;
                println!("{}", json::format(&text)?);
                Ok(())
            }
            JsonCommand::Validate(args) => {
                let text = read_input(&args.input)?;
                let v = json::validate(&text);
                if v.valid {
                    println!("valid");
                    Ok(())
                } else {
                    eprintln!(
                        "invalid JSON at line {}, column {}: {}",
                        v.line.unwrap_or(0),
                        v.column.unwrap_or(0),
                        v.error.unwrap_or_default()
                    );
                    process::exit(1);
                }
            }
        },
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        if let Some(suggestion) = e.suggestion() {
            eprintln!("{suggestion}");
        }
        process::exit(1);
    }
}
