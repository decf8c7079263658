// Copyright 2025 Cowboy AI, LLC.

//! Field paths into a task specification document.
//!
//! Paths render the way a reader locates a field in the YAML source:
//! mapping keys are joined with dots and sequence positions are bracketed,
//! e.g. `designSpaces[2].components[1]`. The empty path is the document root
//! and is the identity of [`SpecPath::concat`].

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A single step into the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecPathSegment {
    /// Mapping key.
    Key(String),
    /// Sequence position.
    Index(usize),
}

/// Location of a field inside a task specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecPath {
    segments: Vec<SpecPathSegment>,
}

impl SpecPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// True when the path points at the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the path contains no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate over segments.
    pub fn segments(&self) -> impl Iterator<Item = &SpecPathSegment> {
        self.segments.iter()
    }

    /// Descend into a mapping key, returning a new path.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(SpecPathSegment::Key(key.into()));
        Self { segments }
    }

    /// Descend into a sequence position, returning a new path.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(SpecPathSegment::Index(index));
        Self { segments }
    }

    /// Concatenate with a relative path.
    pub fn concat(&self, other: &SpecPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }
}

impl Display for SpecPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (pos, segment) in self.segments.iter().enumerate() {
            match segment {
                SpecPathSegment::Key(key) if pos == 0 => f.write_str(key)?,
                SpecPathSegment::Key(key) => write!(f, ".{key}")?,
                SpecPathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
