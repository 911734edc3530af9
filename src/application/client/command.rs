//! Operator commands understood by the client REPL.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Help text listing every command.
pub const HELP: &str = "\
accounts  select account IDs to watch (space separated)
events    watch events for the selected accounts until Ctrl+C
clear     forget the current selection
help      show this message
quit      exit";

/// A command typed at the client prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Accounts,
    Events,
    Clear,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command {0:?}, type \"help\" for a list")]
pub struct UnknownCommand(pub String);

impl FromStr for ClientCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accounts" => Ok(Self::Accounts),
            "events" => Ok(Self::Events),
            "clear" => Ok(Self::Clear),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(UnknownCommand(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Accounts => "accounts",
            Self::Events => "events",
            Self::Clear => "clear",
            Self::Help => "help",
            Self::Quit => "quit",
        };
        write!(f, "{}", s)
    }
}
