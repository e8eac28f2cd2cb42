//! Line-based edit scripts, replayed against a [`Store`].
//!
//! ```text
//! # comments start with '#'
//! add-table
//! add-attribute 0
//! set 0 0 name id
//! set 0 0 primaryKey true
//! set 0 0 defaultValue "hello world"
//! set 0 0 defaultValue -
//! drag tables 0 1
//! drag attributes-0 2 attributes-0 0
//! drag attributes-0 2 -
//! delete-attribute 0 1
//! delete-table 0
//! ```
//!
//! `drag <source> <index> [<destination> <index> | -]` feeds a drag-end event;
//! a lone destination index reuses the source id, `-` cancels the gesture.

use tracing::debug;

use crate::model::{AttributeField, FieldKind, FieldValue, Store};
use crate::reorder::{DragEnd, DragOutcome};
use crate::store::EditError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddTable,
    DeleteTable(usize),
    AddAttribute(usize),
    DeleteAttribute(usize, usize),
    Set {
        table: usize,
        attribute: usize,
        field: AttributeField,
        value: FieldValue,
    },
    Drag(DragEnd),
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command: {command}")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: expected {expected}")]
    Missing { line: usize, expected: &'static str },
    #[error("line {line}: invalid {expected}: {found}")]
    Invalid {
        line: usize,
        expected: &'static str,
        found: String,
    },
    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },
    #[error("line {line}: unexpected trailing input: {found}")]
    Trailing { line: usize, found: String },
    #[error("line {line}: {source}")]
    Edit {
        line: usize,
        #[source]
        source: EditError,
    },
}

/// A parsed command with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub command: Command,
}

pub fn parse(input: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        let words = split_words(raw, line)?;
        if words.is_empty() {
            continue;
        }
        let command = parse_command(&words, line)?;
        steps.push(Step { line, command });
    }
    Ok(steps)
}

/// Apply every step to `store` in order, stopping at the first failing edit.
pub fn replay(store: &Store, steps: &[Step]) -> Result<Store, ScriptError> {
    let mut current = store.clone();
    for step in steps {
        current = apply(&current, &step.command).map_err(|source| ScriptError::Edit {
            line: step.line,
            source,
        })?;
    }
    Ok(current)
}

pub fn run(input: &str) -> Result<Store, ScriptError> {
    let steps = parse(input)?;
    replay(&Store::new(), &steps)
}

fn apply(store: &Store, command: &Command) -> Result<Store, EditError> {
    match command {
        Command::AddTable => Ok(store.add_table()),
        Command::DeleteTable(t) => store.delete_table(*t),
        Command::AddAttribute(t) => store.add_attribute(*t),
        Command::DeleteAttribute(t, a) => store.delete_attribute(*t, *a),
        Command::Set {
            table,
            attribute,
            field,
            value,
        } => store.set_attribute_field(*table, *attribute, *field, value.clone()),
        Command::Drag(drag) => match store.apply_drag(drag)? {
            DragOutcome::Moved(next) => Ok(next),
            outcome => {
                debug!(?outcome, "drag left store unchanged");
                Ok(store.clone())
            }
        },
    }
}

/// Split on whitespace, honouring double quotes and '#' comments.
fn split_words(raw: &str, line: usize) -> Result<Vec<String>, ScriptError> {
    let mut words = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '#' {
            break;
        } else if c == '"' {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped) => s.push(escaped),
                        None => return Err(ScriptError::UnterminatedString { line }),
                    },
                    Some(ch) => s.push(ch),
                    None => return Err(ScriptError::UnterminatedString { line }),
                }
            }
            words.push(s);
        } else {
            let mut s = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                s.push(ch);
                chars.next();
            }
            words.push(s);
        }
    }

    Ok(words)
}

struct Args<'a> {
    words: &'a [String],
    pos: usize,
    line: usize,
}

impl<'a> Args<'a> {
    fn next(&mut self, expected: &'static str) -> Result<&'a str, ScriptError> {
        let word = self.words.get(self.pos).ok_or(ScriptError::Missing {
            line: self.line,
            expected,
        })?;
        self.pos += 1;
        Ok(word.as_str())
    }

    fn peek(&self) -> Option<&'a str> {
        self.words.get(self.pos).map(|s| s.as_str())
    }

    fn index(&mut self, expected: &'static str) -> Result<usize, ScriptError> {
        let word = self.next(expected)?;
        word.parse().map_err(|_| ScriptError::Invalid {
            line: self.line,
            expected,
            found: word.to_string(),
        })
    }

    fn finish(&self) -> Result<(), ScriptError> {
        match self.words.get(self.pos) {
            None => Ok(()),
            Some(_) => Err(ScriptError::Trailing {
                line: self.line,
                found: self.words[self.pos..].join(" "),
            }),
        }
    }
}

fn parse_command(words: &[String], line: usize) -> Result<Command, ScriptError> {
    let mut args = Args {
        words,
        pos: 0,
        line,
    };

    let command = match args.next("command")? {
        "add-table" => Command::AddTable,
        "delete-table" => Command::DeleteTable(args.index("table index")?),
        "add-attribute" => Command::AddAttribute(args.index("table index")?),
        "delete-attribute" => {
            let table = args.index("table index")?;
            let attribute = args.index("attribute index")?;
            Command::DeleteAttribute(table, attribute)
        }
        "set" => {
            let table = args.index("table index")?;
            let attribute = args.index("attribute index")?;
            let name = args.next("field name")?;
            let field = AttributeField::from_str(name).ok_or_else(|| ScriptError::Edit {
                line,
                source: EditError::UnknownField(name.to_string()),
            })?;
            let value = parse_value(field, args.next("field value")?, line)?;
            Command::Set {
                table,
                attribute,
                field,
                value,
            }
        }
        "drag" => Command::Drag(parse_drag(&mut args)?),
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            });
        }
    };

    args.finish()?;
    Ok(command)
}

fn parse_value(field: AttributeField, word: &str, line: usize) -> Result<FieldValue, ScriptError> {
    match field.kind() {
        FieldKind::Text => Ok(FieldValue::Text(word.to_string())),
        FieldKind::OptionalText if word == "-" => Ok(FieldValue::Clear),
        FieldKind::OptionalText => Ok(FieldValue::Text(word.to_string())),
        FieldKind::Flag => match word {
            "true" | "yes" | "on" => Ok(FieldValue::Flag(true)),
            "false" | "no" | "off" => Ok(FieldValue::Flag(false)),
            _ => Err(ScriptError::Invalid {
                line,
                expected: "boolean",
                found: word.to_string(),
            }),
        },
    }
}

fn parse_drag(args: &mut Args<'_>) -> Result<DragEnd, ScriptError> {
    let line = args.line;
    let source_id = args.next("source drop target")?;
    let source_index = args.index("source index")?;

    let destination = match args.peek() {
        None => return Err(ScriptError::Missing { line, expected: "destination" }),
        Some("-") => {
            args.pos += 1;
            None
        }
        Some(word) if word.parse::<usize>().is_ok() => {
            Some((source_id, args.index("destination index")?))
        }
        Some(_) => {
            let id = args.next("destination drop target")?;
            Some((id, args.index("destination index")?))
        }
    };

    DragEnd::from_ids(source_id, source_index, destination)
        .map_err(|source| ScriptError::Edit { line, source })
}
