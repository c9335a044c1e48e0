//! Entity streams.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the independently subscribable entity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Properties,
    Realtors,
    Persons,
}

impl Stream {
    /// Every stream, in slot order.
    pub const ALL: [Stream; 3] = [Stream::Properties, Stream::Realtors, Stream::Persons];

    /// Stream name as used in routes and subscribe events.
    pub fn as_str(self) -> &'static str {
        match self {
            Stream::Properties => "properties",
            Stream::Realtors => "realtors",
            Stream::Persons => "persons",
        }
    }

    /// Singular noun used in change event names.
    pub fn noun(self) -> &'static str {
        match self {
            Stream::Properties => "property",
            Stream::Realtors => "realtor",
            Stream::Persons => "person",
        }
    }

    /// Backing table in the hosted database.
    pub fn table(self) -> &'static str {
        self.noun()
    }

    /// Dense index, stable for the lifetime of the process.
    pub fn index(self) -> usize {
        match self {
            Stream::Properties => 0,
            Stream::Realtors => 1,
            Stream::Persons => 2,
        }
    }

    /// Client event that installs a filter on this stream.
    pub fn subscribe_event(self) -> String {
        format!("{}-subscribe", self.as_str())
    }

    /// Client event that drops the filter on this stream.
    pub fn unsubscribe_event(self) -> String {
        format!("{}-unsubscribe", self.as_str())
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stream {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stream::ALL
            .into_iter()
            .find(|stream| stream.as_str() == s)
            .ok_or_else(|| Error::UnknownStream(s.to_string()))
    }
}
