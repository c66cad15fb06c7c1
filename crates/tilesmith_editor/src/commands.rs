//! Line commands for the interactive session
//!
//! One command per line, words separated by whitespace:
//!
//! ```text
//! down X Y | move X Y | up X Y | click X Y
//! tool pattern NAME | tool collision 1-5 | tool entity ID | tool delete | tool none
//! fill on|off | cancel | map INDEX | layer NAME
//! export | export-game | flush | help | quit
//! ```

use std::str::FromStr;

use thiserror::Error;
use tilesmith_core::CollisionShape;

use crate::interaction::Tool;
use crate::session::{EditorSession, SessionError};
use crate::store::KeyValueStore;

pub const HELP: &str = "\
down X Y | move X Y | up X Y | click X Y
tool pattern NAME | tool collision 1-5 | tool entity ID | tool delete | tool none
fill on|off | cancel | map INDEX | layer NAME
export | export-game | flush | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    /// Down followed by up at the same point
    Click { x: f32, y: f32 },
    Tool(Option<Tool>),
    Fill(bool),
    Cancel,
    Map(usize),
    Layer(String),
    Export,
    ExportGame,
    Flush,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("'{command}': invalid value '{value}'")]
    InvalidArgument { command: &'static str, value: String },
}

/// What the session loop should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    /// Text to print on stdout
    Output(String),
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let command = match name {
            "down" => {
                let (x, y) = point("down", &mut words)?;
                Command::Down { x, y }
            }
            "move" => {
                let (x, y) = point("move", &mut words)?;
                Command::Move { x, y }
            }
            "up" => {
                let (x, y) = point("up", &mut words)?;
                Command::Up { x, y }
            }
            "click" => {
                let (x, y) = point("click", &mut words)?;
                Command::Click { x, y }
            }
            "tool" => Command::Tool(tool(&mut words)?),
            "fill" => match words.next() {
                Some("on") => Command::Fill(true),
                Some("off") => Command::Fill(false),
                Some(other) => {
                    return Err(CommandError::InvalidArgument {
                        command: "fill",
                        value: other.to_string(),
                    })
                }
                None => {
                    return Err(CommandError::MissingArgument {
                        command: "fill",
                        argument: "on or off",
                    })
                }
            },
            "cancel" | "esc" => Command::Cancel,
            "map" => Command::Map(parse_word("map", "an index", words.next())?),
            "layer" => Command::Layer(
                words
                    .next()
                    .ok_or(CommandError::MissingArgument {
                        command: "layer",
                        argument: "a name",
                    })?
                    .to_string(),
            ),
            "export" => Command::Export,
            "export-game" => Command::ExportGame,
            "flush" => Command::Flush,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn parse_word<T: FromStr>(
    command: &'static str,
    argument: &'static str,
    word: Option<&str>,
) -> Result<T, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument { command, argument })?;
    word.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        value: word.to_string(),
    })
}

fn point<'a>(
    command: &'static str,
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<(f32, f32), CommandError> {
    let x = parse_word(command, "X and Y", words.next())?;
    let y = parse_word(command, "X and Y", words.next())?;
    Ok((x, y))
}

fn tool<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Option<Tool>, CommandError> {
    let missing = |argument| CommandError::MissingArgument {
        command: "tool",
        argument,
    };
    let kind = words.next().ok_or(missing("a tool kind"))?;
    let tool = match kind {
        "pattern" => Tool::Pattern(words.next().ok_or(missing("a pattern name"))?.to_string()),
        "entity" => Tool::Entity(words.next().ok_or(missing("an entity id"))?.to_string()),
        "collision" => {
            let code: u8 = parse_word("tool", "a collision code", words.next())?;
            let shape =
                CollisionShape::placeable(code).map_err(|_| CommandError::InvalidArgument {
                    command: "tool",
                    value: code.to_string(),
                })?;
            Tool::Collision(shape)
        }
        "delete" => Tool::Delete,
        "none" => return Ok(None),
        other => {
            return Err(CommandError::InvalidArgument {
                command: "tool",
                value: other.to_string(),
            })
        }
    };
    Ok(Some(tool))
}

/// Run one command against the session
pub async fn execute<S: KeyValueStore>(
    session: &mut EditorSession<S>,
    command: Command,
) -> Result<Outcome, SessionError> {
    match command {
        Command::Down { x, y } => {
            session.pointer_down(x, y);
        }
        Command::Move { x, y } => {
            session.pointer_move(x, y);
        }
        Command::Up { x, y } => {
            session.pointer_up(x, y);
        }
        Command::Click { x, y } => {
            session.pointer_down(x, y);
            session.pointer_up(x, y);
        }
        Command::Tool(Some(tool)) => session.select_tool(tool),
        Command::Tool(None) | Command::Cancel => session.cancel(),
        Command::Fill(enabled) => session.set_fill_mode(enabled),
        Command::Map(index) => session.select_map(index).await?,
        Command::Layer(name) => session.select_layer(&name)?,
        Command::Export => return Ok(Outcome::Output(session.export_editable()?)),
        Command::ExportGame => return Ok(Outcome::Output(session.export_runtime()?)),
        Command::Flush => {
            session.flush().await;
        }
        Command::Help => return Ok(Outcome::Output(HELP.to_string())),
        Command::Quit => return Ok(Outcome::Quit),
    }
    Ok(Outcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tilesmith_core::{Cell, EditorConfig};

    #[test]
    fn test_parse_pointer_commands() {
        assert_eq!("down 4 8.5".parse::<Command>(), Ok(Command::Down { x: 4.0, y: 8.5 }));
        assert_eq!("  move 1 2 ".parse::<Command>(), Ok(Command::Move { x: 1.0, y: 2.0 }));
        assert_eq!("click 0 0".parse::<Command>(), Ok(Command::Click { x: 0.0, y: 0.0 }));
        assert!(matches!(
            "up 3".parse::<Command>(),
            Err(CommandError::MissingArgument { command: "up", .. })
        ));
        assert!(matches!(
            "down a 1".parse::<Command>(),
            Err(CommandError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_parse_tools() {
        assert_eq!(
            "tool pattern grass".parse::<Command>(),
            Ok(Command::Tool(Some(Tool::Pattern("grass".to_string()))))
        );
        assert_eq!(
            "tool collision 3".parse::<Command>(),
            Ok(Command::Tool(Some(Tool::Collision(CollisionShape::TopRight))))
        );
        assert_eq!("tool delete".parse::<Command>(), Ok(Command::Tool(Some(Tool::Delete))));
        assert_eq!("tool none".parse::<Command>(), Ok(Command::Tool(None)));
        assert!("tool collision 0".parse::<Command>().is_err());
        assert!("tool collision 6".parse::<Command>().is_err());
        assert!("tool brush".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!("fill on".parse::<Command>(), Ok(Command::Fill(true)));
        assert_eq!("esc".parse::<Command>(), Ok(Command::Cancel));
        assert_eq!("map 2".parse::<Command>(), Ok(Command::Map(2)));
        assert_eq!("layer fg".parse::<Command>(), Ok(Command::Layer("fg".to_string())));
        assert_eq!("export-game".parse::<Command>(), Ok(Command::ExportGame));
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "paint".parse::<Command>(),
            Err(CommandError::Unknown("paint".to_string()))
        );
    }

    #[tokio::test]
    async fn test_execute_script() {
        let mut session = EditorSession::start(&EditorConfig::default(), MemoryStore::new()).await;
        let script = ["tool collision 1", "down 0 0", "move 8 0", "up 8 0", "flush"];
        for line in script {
            let command: Command = line.parse().unwrap();
            assert_eq!(execute(&mut session, command).await.unwrap(), Outcome::Continue);
        }

        let map = session.selected_map().unwrap();
        assert_eq!(map.collision(Cell::new(1, 0)), Some(CollisionShape::Full));
        assert_eq!(session.persistence().store().put_count(), 1);

        assert!(matches!(
            execute(&mut session, Command::Export).await.unwrap(),
            Outcome::Output(text) if text.contains("\"collision\"")
        ));
        assert_eq!(
            execute(&mut session, Command::Quit).await.unwrap(),
            Outcome::Quit
        );
        assert!(execute(&mut session, Command::Map(9)).await.is_err());
    }
}
