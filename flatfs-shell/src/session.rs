use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use flatfs::{BlockId, FsError, Volume};
use log::debug;

use crate::command::{Command, HELP};

/// Turns an operation failure into the notice shown to the operator.
pub fn notice(err: &FsError) -> &'static str {
    match err {
        FsError::AlreadyExists(_) => "File already exists",
        FsError::NotFound(_) => "File not found",
        FsError::DiskFull { .. } => "Disk space full",
    }
}

fn block_report(header: String, blocks: &[BlockId], line: impl Fn(BlockId) -> String) -> String {
    let mut out = header;
    for &blocknr in blocks {
        out.push('\n');
        out.push_str(&line(blocknr));
    }
    out
}

/// Runs one command against the volume and returns the text to show.
pub fn execute(vol: &mut Volume, command: Command) -> String {
    let result = match command {
        Command::Create { name, size } => vol
            .create(&name, size)
            .map(|_| "File created successfully".to_string()),
        Command::Delete(name) => vol
            .delete(&name)
            .map(|_| "File deleted successfully".to_string()),
        Command::Read(name) => vol.read(&name).map(|blocks| {
            block_report(
                format!("Reading data from file: {}", name),
                blocks,
                |b| format!("Reading data from block {}", b),
            )
        }),
        Command::Write { name, data } => vol.write(&name, &data).map(|blocks| {
            block_report(
                format!("Writing data to file: {}", name),
                blocks,
                |b| format!("Writing data to block {}", b),
            )
        }),
        Command::View(name) => vol.view_content(&name).map(|content| {
            let mut out = format!("Content of file {}:", name);
            for (blocknr, text) in content {
                let _ = write!(out, "\nBlock {}: {}", blocknr, text);
            }
            out
        }),
        Command::List => Ok(list(vol)),
        Command::Usage => Ok(usage(vol)),
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    };

    result.unwrap_or_else(|err| {
        debug!("operation failed: {}", err);
        notice(&err).to_string()
    })
}

fn list(vol: &Volume) -> String {
    if vol.is_empty() {
        return "No files".to_string();
    }
    let mut out = String::new();
    for (name, entry) in vol.files() {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = write!(out, "{}\t{} bytes\tblocks {:?}", name, entry.size(), entry.blocks());
    }
    out
}

fn usage(vol: &Volume) -> String {
    let usage = vol.usage();
    format!(
        "{} blocks of {} bytes: {} used, {} free, {} orphaned",
        usage.capacity,
        vol.block_size(),
        usage.used,
        usage.free,
        usage.orphaned
    )
}

/// Reads commands line by line until end of input or `quit`.
pub fn run<R: BufRead, W: Write>(vol: &mut Volume, input: R, mut output: W) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        let reply = match Command::parse(&line) {
            None => continue,
            Some(Ok(Command::Quit)) => break,
            Some(Ok(command)) => execute(vol, command),
            Some(Err(err)) => err.to_string(),
        };
        writeln!(output, "{}", reply)?;
    }
    output.flush()
}
