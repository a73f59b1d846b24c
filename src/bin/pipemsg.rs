use std::{error::Error, io, path::PathBuf};

use clap::{Parser, Subcommand};
use pipemsg::{
    Codec, CodecConfig, DataPacket, LoginRequest, Message, Schema, StatusUpdate, cli::repl,
};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Encode a record into its wire form
    Encode {
        #[command(subcommand)]
        record: RecordArgs,
    },
    /// Decode a wire-format message
    Decode {
        /// Encoded message, e.g. 'StatusUpdate|5|ok|'
        wire: String,
        /// Decode against a schema file instead of the built-in records
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Reject integer fields that are not well-formed decimals
        #[arg(long)]
        strict: bool,
    },
    /// List the messages described by a schema file
    Schema {
        /// Path to schema file; the built-in schema when omitted
        path: Option<PathBuf>,
    },
    /// Decode messages read line by line from standard input
    Repl {
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Debug, Subcommand)]
enum RecordArgs {
    Login {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Status {
        #[arg(long, allow_negative_numbers = true)]
        code: i32,
        #[arg(long)]
        message: Option<String>,
    },
    Data {
        #[arg(long, allow_negative_numbers = true)]
        id: i32,
        #[arg(long)]
        payload: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        size: i32,
    },
}

impl From<RecordArgs> for Message {
    fn from(value: RecordArgs) -> Self {
        match value {
            RecordArgs::Login { username, password } => {
                Message::Login(LoginRequest { username, password })
            }
            RecordArgs::Status { code, message } => Message::Status(StatusUpdate { code, message }),
            RecordArgs::Data { id, payload, size } => {
                Message::Data(DataPacket { id, payload, size })
            }
        }
    }
}

fn config(strict: bool) -> CodecConfig {
    if strict {
        CodecConfig::standard().with_strict_integers()
    } else {
        CodecConfig::standard()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize env_logger; For logging to STDOUT/STDERR
    env_logger::init();

    let cli = Cli::parse();

    match cli.action {
        Action::Encode { record } => {
            let message: Message = record.into();
            let bytes = message.encode()?;
            println!("{}", String::from_utf8(bytes)?);
        }
        Action::Decode {
            wire,
            schema,
            strict,
        } => {
            let config = config(strict);
            match schema {
                Some(path) => {
                    let schema = Schema::open(path)?;
                    println!("{}", schema.decode(wire.as_bytes(), config)?);
                }
                None => {
                    let message = Codec::new(config).decode_message(wire.as_bytes())?;
                    println!("{message:?}");
                }
            }
        }
        Action::Schema { path } => {
            let schema = match path {
                Some(path) => Schema::open(path)?,
                None => Schema::builtin()?,
            };
            for message in schema.messages() {
                println!("{}", message.name);
                for field in &message.fields {
                    println!("  {} {}", field.name, field.kind);
                }
            }
        }
        Action::Repl { strict } => {
            let codec = Codec::new(config(strict));
            repl(io::stdin().lock(), io::stdout().lock(), codec)?;
        }
    }

    Ok(())
}
