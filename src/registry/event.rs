//! Source identifiers, filters and monitoring events
//!
//! This module defines the key types for identifying where an event came
//! from, which sources a listener cares about, and the default event payload
//! that is fanned out to listeners.

use std::borrow::Borrow;
use std::collections::HashSet;

use bytes::Bytes;

/// Identifier of an event origin (e.g., a monitored host address)
///
/// Matching is exact string equality; there are no pattern semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Create a new source identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&SourceId> for SourceId {
    fn from(id: &SourceId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for SourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Set of sources a listener wants events from
///
/// An empty filter is a wildcard and matches every source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    sources: HashSet<SourceId>,
}

impl Filter {
    /// Create a wildcard filter that matches every source
    pub fn any() -> Self {
        Self::default()
    }

    /// Create a filter matching exactly the given sources
    ///
    /// An empty iterator yields a wildcard filter.
    pub fn sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceId>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether this filter matches every source
    pub fn is_wildcard(&self) -> bool {
        self.sources.is_empty()
    }

    /// Check whether an event from `source` passes this filter
    pub fn matches(&self, source: &SourceId) -> bool {
        self.is_wildcard() || self.sources.contains(source)
    }

    /// Number of explicitly listed sources (0 for a wildcard)
    pub fn listed(&self) -> usize {
        self.sources.len()
    }
}

impl<S: Into<SourceId>> FromIterator<S> for Filter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::sources(iter)
    }
}

/// Events that carry their own source identifier
pub trait Sourced {
    /// Where this event originated
    fn source(&self) -> &SourceId;
}

/// A monitoring event reported by a host agent
///
/// Cheap to clone: the encoded payload is reference counted, so every
/// listener shares the same allocation.
#[derive(Debug, Clone)]
pub struct MonitorEvent {
    /// Host that produced the event
    pub source: SourceId,
    /// Per-agent sequence number
    pub sequence: u64,
    /// Encoded event body, opaque to the registry
    pub payload: Bytes,
}

impl MonitorEvent {
    /// Create a new monitoring event
    pub fn new(source: impl Into<SourceId>, sequence: u64, payload: Bytes) -> Self {
        Self {
            source: source.into(),
            sequence,
            payload,
        }
    }
}

impl Sourced for MonitorEvent {
    fn source(&self) -> &SourceId {
        &self.source
    }
}
