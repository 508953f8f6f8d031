//! Location codec.
//!
//! A location is the only externally visible identity of a stored entity:
//! `client/<clientId>`, `user/<n>` or `command/<command-name>/<n>`. It carries
//! no payload and is only meaningful to the process that minted it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("unresolvable reference: {0:?}")]
    Unresolvable(String),
}

/// Store category with a sequential id space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    User,
    /// Results of the named command.
    Command(String),
}

impl Category {
    pub fn command(name: impl Into<String>) -> Self {
        Category::Command(name.into())
    }

    /// Whether `name` can name a command category, i.e. fits in one path
    /// segment of visible ASCII so its locations decode back to it.
    pub fn is_command_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_graphic() && !matches!(b, b'/' | b'?' | b'#'))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::User => write!(f, "user"),
            Category::Command(name) => write!(f, "command/{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Root client, addressed by the id the test driver chose.
    Client(String),
    Entry(Category, usize),
}

impl Location {
    pub fn client(id: impl Into<String>) -> Self {
        Location::Client(id.into())
    }

    pub fn user(id: usize) -> Self {
        Location::Entry(Category::User, id)
    }

    pub fn command(name: impl Into<String>, id: usize) -> Self {
        Location::Entry(Category::command(name), id)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Client(id) => write!(f, "client/{}", id),
            Location::Entry(category, id) => write!(f, "{}/{}", category, id),
        }
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unresolvable = || LocationError::Unresolvable(s.to_string());
        let path = s.strip_prefix('/').unwrap_or(s);
        let segments: Vec<&str> = path.split('/').collect();

        match segments.as_slice() {
            ["client", id] if !id.is_empty() => Ok(Location::client(*id)),
            ["user", id] => parse_id(id).map(Location::user).ok_or_else(unresolvable),
            ["command", name, id] if !name.is_empty() => parse_id(id)
                .map(|id| Location::command(*name, id))
                .ok_or_else(unresolvable),
            _ => Err(unresolvable()),
        }
    }
}

/// Canonical decimal only: no sign, no leading zeros.
fn parse_id(raw: &str) -> Option<usize> {
    let canonical = !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && (raw == "0" || !raw.starts_with('0'));
    if canonical {
        raw.parse().ok()
    } else {
        None
    }
}
