use thiserror::Error;

/// One line of operator input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Create { name: String, size: u64 },
    Delete(String),
    Read(String),
    Write { name: String, data: String },
    View(String),
    List,
    Usage,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command \"{0}\", try \"help\"")]
    Unknown(String),
    #[error("usage: {0}")]
    MissingArgument(&'static str),
    #[error("invalid size \"{0}\": expected a non-negative whole number of bytes")]
    InvalidSize(String),
}

pub const HELP: &str = "\
create <name> <size>   create a file of <size> bytes
delete <name>          delete a file
read <name>            list the blocks a read would visit
write <name> <data>    list the blocks a write would land on
view <name>            show the content of each block
ls                     list files
df                     show block usage
quit                   leave the shell";

/// Splits off the first whitespace separated word, returning it and the rest of
/// the line with leading whitespace removed.
fn next_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

fn require_name<'a>(
    rest: &'a str,
    usage: &'static str,
) -> Result<(String, &'a str), ParseError> {
    let (name, rest) = next_word(rest);
    if name.is_empty() {
        return Err(ParseError::MissingArgument(usage));
    }
    Ok((name.to_string(), rest))
}

impl Command {
    /// Parses a line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Result<Self, ParseError>> {
        let (verb, rest) = next_word(line);
        if verb.is_empty() {
            return None;
        }
        Some(Self::parse_verb(verb, rest))
    }

    fn parse_verb(verb: &str, rest: &str) -> Result<Self, ParseError> {
        match verb {
            "create" => {
                let usage = "create <name> <size>";
                let (name, rest) = require_name(rest, usage)?;
                let (size, _) = next_word(rest);
                if size.is_empty() {
                    return Err(ParseError::MissingArgument(usage));
                }
                let size = size
                    .parse::<u64>()
                    .map_err(|_| ParseError::InvalidSize(size.to_string()))?;
                Ok(Command::Create { name, size })
            }
            "delete" => Ok(Command::Delete(require_name(rest, "delete <name>")?.0)),
            "read" => Ok(Command::Read(require_name(rest, "read <name>")?.0)),
            "write" => {
                let (name, data) = require_name(rest, "write <name> <data>")?;
                Ok(Command::Write {
                    name,
                    data: data.trim_end().to_string(),
                })
            }
            "view" => Ok(Command::View(require_name(rest, "view <name>")?.0)),
            "ls" => Ok(Command::List),
            "df" => Ok(Command::Usage),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}
