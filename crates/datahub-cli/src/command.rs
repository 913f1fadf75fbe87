//! Console command grammar.
//!
//! One command per line: a verb followed by whitespace-separated arguments.
//! Field targets are written as `<scope>.<path>`, for example
//! `tuning.audio.muted` or `tuning.spawns[3].weight`.

use std::fmt;
use std::str::FromStr;

use datahub::{DataHubError, ElementToken, FieldPath};
use thiserror::Error;

/// Errors raised while parsing a command line.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    UnknownVerb(String),

    #[error("`{verb}` needs {what}")]
    MissingArgument { verb: Verb, what: &'static str },

    #[error("`{verb}` takes no further arguments: `{extra}`")]
    UnexpectedArgument { verb: Verb, extra: String },

    #[error("invalid element token `{0}`")]
    InvalidToken(String),

    #[error("invalid target `{0}`: expected `<scope>` or `<scope>.<path>`")]
    InvalidTarget(String),

    #[error(transparent)]
    Path(#[from] DataHubError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Verb {
    Help,
    #[strum(to_string = "quit", serialize = "exit")]
    Quit,
    Scopes,
    Get,
    Set,
    Add,
    Remove,
    List,
    Watch,
    Unwatch,
    Dump,
}

/// A scope name and an optional field path inside it.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub scope: String,
    pub path: Option<FieldPath>,
}

impl FromStr for Target {
    type Err = CommandError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let (scope, rest) = match text.find(['.', '[']) {
            Some(split) => (&text[..split], Some(&text[split..])),
            None => (text, None),
        };
        if scope.is_empty() {
            return Err(CommandError::InvalidTarget(text.to_owned()));
        }

        let path = match rest {
            None => None,
            Some(rest) => match rest.strip_prefix('.') {
                Some(path) => Some(path.parse::<FieldPath>()?),
                // A scope is a record, never a collection.
                None => return Err(CommandError::InvalidTarget(text.to_owned())),
            },
        };
        Ok(Self {
            scope: scope.to_owned(),
            path,
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}.{}", self.scope, path),
            None => f.write_str(&self.scope),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Scopes,
    Get(Target),
    /// Assigns `text` through the lenient text conversion.
    Set(Target, String),
    Add(Target),
    Remove(Target, ElementToken),
    List(Target),
    Watch(Target),
    Unwatch(Target),
    /// Dumps one scope, or every registered scope.
    Dump(Option<String>),
}

impl Command {
    /// Parses one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb_text, rest) = split_word(line);
        let verb: Verb = verb_text
            .parse()
            .map_err(|_| CommandError::UnknownVerb(verb_text.to_owned()))?;

        let command = match verb {
            Verb::Help => no_arguments(verb, rest, Command::Help)?,
            Verb::Quit => no_arguments(verb, rest, Command::Quit)?,
            Verb::Scopes => no_arguments(verb, rest, Command::Scopes)?,
            Verb::Get => Command::Get(single_target(verb, rest)?),
            Verb::Add => Command::Add(single_target(verb, rest)?),
            Verb::List => Command::List(single_target(verb, rest)?),
            Verb::Watch => Command::Watch(single_target(verb, rest)?),
            Verb::Unwatch => Command::Unwatch(single_target(verb, rest)?),
            Verb::Set => {
                let (target, text) = split_word(rest);
                let target = required(verb, target, "a target")?.parse::<Target>()?;
                // The remainder is taken verbatim, so text values may hold spaces.
                Command::Set(target, text.to_owned())
            }
            Verb::Remove => {
                let (target, rest) = split_word(rest);
                let target = required(verb, target, "a collection target")?.parse::<Target>()?;
                let (token, extra) = split_word(rest);
                let token = required(verb, token, "an element token")?;
                let token = token
                    .parse::<ElementToken>()
                    .ok()
                    .filter(|token| !token.is_unassigned())
                    .ok_or_else(|| CommandError::InvalidToken(token.to_owned()))?;
                no_arguments(verb, extra, Command::Remove(target, token))?
            }
            Verb::Dump => {
                let (scope, extra) = split_word(rest);
                let scope = (!scope.is_empty()).then(|| scope.to_owned());
                no_arguments(verb, extra, Command::Dump(scope))?
            }
        };
        Ok(Some(command))
    }
}

/// Text shown by `help`.
pub const HELP: &str = "\
commands:
  scopes                         list registered scopes
  get <scope>.<path>             print a value
  set <scope>.<path> <text>      assign a value from text
  add <scope>.<path>             add an element to a collection
  remove <scope>.<path> <token>  remove an element from a collection
  list <scope>[.<path>]          list fields or element tokens
  watch <scope>.<path>           report changes of a value
  unwatch <scope>.<path>         stop reporting changes
  dump [<scope>]                 print scope content as JSON
  help                           show this text
  quit                           leave the console";

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim()),
        None => (text, ""),
    }
}

fn required<'a>(verb: Verb, word: &'a str, what: &'static str) -> Result<&'a str, CommandError> {
    if word.is_empty() {
        Err(CommandError::MissingArgument { verb, what })
    } else {
        Ok(word)
    }
}

fn single_target(verb: Verb, rest: &str) -> Result<Target, CommandError> {
    let (target, extra) = split_word(rest);
    let target = required(verb, target, "a target")?.parse::<Target>()?;
    no_arguments(verb, extra, target)
}

fn no_arguments<T>(verb: Verb, rest: &str, value: T) -> Result<T, CommandError> {
    if rest.trim().is_empty() {
        Ok(value)
    } else {
        Err(CommandError::UnexpectedArgument {
            verb,
            extra: rest.trim().to_owned(),
        })
    }
}
