//! CLI utilities for pipemsg.
//!
//! The utilities present in this module back the interactive `repl` mode of the binary.
use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::protocol::Codec;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unrecognized command '{0}'")]
    UnrecognizedCommand(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Possible commands from a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exit command `.exit`, also produced at end of input
    Exit,
    /// Wire-format line to decode
    Decode(String),
}

/// Prompt user for a valid command.
pub fn prompt<R, W>(mut reader: R, mut writer: W) -> Result<Command, CliError>
where
    R: BufRead,
    W: Write,
{
    let mut s = String::default();
    write!(&mut writer, "> ")?;
    writer.flush()?;

    if reader.read_line(&mut s)? == 0 {
        return Ok(Command::Exit);
    }

    match s.trim_end_matches(['\r', '\n']) {
        ".exit" => Ok(Command::Exit),
        s if !s.starts_with('.') => Ok(Command::Decode(s.to_string())),
        s => Err(CliError::UnrecognizedCommand(s.to_string())),
    }
}

/// Reads wire-format lines until `.exit`, printing each decoded message.
pub fn repl<R, W>(mut reader: R, mut writer: W, codec: Codec) -> Result<(), CliError>
where
    R: BufRead,
    W: Write,
{
    loop {
        let line = match prompt(&mut reader, &mut writer) {
            Ok(Command::Exit) => return Ok(()),
            Ok(Command::Decode(line)) => line,
            Err(CliError::Io(e)) => return Err(CliError::Io(e)),
            Err(e) => {
                writeln!(writer, "error: {e}")?;
                continue;
            }
        };

        if line.is_empty() {
            continue;
        }

        match codec.decode_message(line.as_bytes()) {
            Ok(message) => writeln!(writer, "{message:?}")?,
            Err(e) => writeln!(writer, "error: {e}")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_prints_correctly() {
        let input = b".exit\n";
        let mut output = Vec::new();

        prompt(&input[..], &mut output).unwrap();

        let output = String::from_utf8(output).expect("not valid UTF-8");
        assert_eq!("> ", output);
    }

    #[test]
    fn prompt_handles_wire_lines() {
        let input = b"StatusUpdate|5|\n";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap();
        assert_eq!(Command::Decode("StatusUpdate|5|".into()), res);
    }

    #[test]
    fn prompt_end_of_input_exits() {
        let mut output = Vec::new();

        let res = prompt(&b""[..], &mut output).unwrap();
        assert_eq!(Command::Exit, res);
    }

    #[test]
    #[should_panic(expected = "UnrecognizedCommand(\".something_wrong\")")]
    fn prompt_unrecognized_command() {
        let input = b".something_wrong\n";
        let mut output = Vec::new();

        prompt(&input[..], &mut output).unwrap();
    }

    #[test]
    fn repl_decodes_lines() {
        let input = b"StatusUpdate|5|\n\nWrongName|1|\n.help\n.exit\nDataPacket|1|x|1|\n";
        let mut output = Vec::new();

        repl(&input[..], &mut output, Codec::default()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "> Status(StatusUpdate { code: 5, message: None })\n\
             > > error: unknown message type 'WrongName'\n\
             > error: unrecognized command '.help'\n\
             > "
        );
    }
}
