//! Partition and sort keys for the single-table layout.
//!
//! Partitions are `<NAMESPACE>#<KIND>`. Sort keys are one or more identifier
//! segments joined with [`KEY_SEPARATOR`]; a child's sort key always starts
//! with its parent's identifier, so every child of a parent can be fetched
//! with one prefix query on [`SortKey::child_prefix`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Separator between segments of partition and sort keys.
pub const KEY_SEPARATOR: char = '#';

/// Top-level content domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Travel,
    Resume,
    Home,
}

impl Namespace {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Travel => "TRAVEL",
            Self::Resume => "RESUME",
            Self::Home => "HOME",
        }
    }
}

impl FromStr for Namespace {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRAVEL" => Ok(Self::Travel),
            "RESUME" => Ok(Self::Resume),
            "HOME" => Ok(Self::Home),
            other => Err(TypeError::InvalidKey {
                key: other.to_string(),
                reason: "unknown namespace".into(),
            }),
        }
    }
}

/// Kind of entity stored under a namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Destination,
    Place,
    Album,
    Photo,
    Job,
    Education,
    Skill,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Destination => "DESTINATION",
            Self::Place => "PLACE",
            Self::Album => "ALBUM",
            Self::Photo => "PHOTO",
            Self::Job => "JOB",
            Self::Education => "EDUCATION",
            Self::Skill => "SKILL",
        }
    }
}

impl FromStr for EntityKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DESTINATION" => Ok(Self::Destination),
            "PLACE" => Ok(Self::Place),
            "ALBUM" => Ok(Self::Album),
            "PHOTO" => Ok(Self::Photo),
            "JOB" => Ok(Self::Job),
            "EDUCATION" => Ok(Self::Education),
            "SKILL" => Ok(Self::Skill),
            other => Err(TypeError::InvalidKey {
                key: other.to_string(),
                reason: "unknown entity kind".into(),
            }),
        }
    }
}

/// Coarse grouping key: namespace plus entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Partition {
    namespace: Namespace,
    kind: EntityKind,
}

impl Partition {
    pub const DESTINATION: Self = Self::new(Namespace::Travel, EntityKind::Destination);
    pub const PLACE: Self = Self::new(Namespace::Travel, EntityKind::Place);
    pub const ALBUM: Self = Self::new(Namespace::Travel, EntityKind::Album);
    pub const PHOTO: Self = Self::new(Namespace::Travel, EntityKind::Photo);
    pub const JOB: Self = Self::new(Namespace::Resume, EntityKind::Job);
    pub const EDUCATION: Self = Self::new(Namespace::Resume, EntityKind::Education);
    pub const SKILL: Self = Self::new(Namespace::Resume, EntityKind::Skill);
    pub const HOME_PHOTO: Self = Self::new(Namespace::Home, EntityKind::Photo);

    pub const fn new(namespace: Namespace, kind: EntityKind) -> Self {
        Self { namespace, kind }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The string stored as the partition key, e.g. `TRAVEL#ALBUM`.
    pub fn key(&self) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}",
            self.namespace.as_str(),
            self.kind.as_str()
        )
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_SEPARATOR}{}",
            self.namespace.as_str(),
            self.kind.as_str()
        )
    }
}

impl FromStr for Partition {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, kind) = s.split_once(KEY_SEPARATOR).ok_or_else(|| TypeError::InvalidKey {
            key: s.to_string(),
            reason: "partition must be <NAMESPACE>#<KIND>".into(),
        })?;
        Ok(Self::new(namespace.parse()?, kind.parse()?))
    }
}

/// Composite identifier of a record within its partition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortKey(String);

impl SortKey {
    /// A single-segment key (top-level entities).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Join segments, outermost parent first.
    pub fn composite<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut key = String::new();
        for (i, segment) in segments.into_iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            key.push_str(segment.as_ref());
        }
        Self(key)
    }

    /// `parent#child`.
    pub fn scoped(parent: &str, child: &str) -> Self {
        Self::composite([parent, child])
    }

    /// The prefix shared by every key scoped under `parent`.
    ///
    /// Includes the trailing separator so that parent `ab` never matches
    /// children of parent `abc`.
    pub fn child_prefix(parent: &str) -> String {
        format!("{parent}{KEY_SEPARATOR}")
    }

    /// Validate that an identifier can be used as a key segment.
    pub fn validate_segment(segment: &str) -> Result<(), TypeError> {
        if segment.is_empty() {
            return Err(TypeError::InvalidKey {
                key: segment.to_string(),
                reason: "key segments must not be empty".into(),
            });
        }
        if segment.contains(KEY_SEPARATOR) {
            return Err(TypeError::InvalidKey {
                key: segment.to_string(),
                reason: format!("key segments must not contain {KEY_SEPARATOR:?}"),
            });
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }

    /// Identifier of the outermost parent (the whole key for top-level entities).
    pub fn root(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SortKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
