use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Number of leading words of `text` kept as an item's title.
pub const TITLE_WORDS: usize = 5;

/// Which of the two parallel collections an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Task,
    Todo,
}

impl Variant {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Todo => "todo",
        }
    }

    /// Name of the collection attribute on the stored record.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Task => "tasks",
            Self::Todo => "todos",
        }
    }

    /// Todos tie priority to list position; tasks keep an independent priority.
    #[must_use]
    pub const fn priority_follows_position(self) -> bool {
        matches!(self, Self::Todo)
    }
}

/// The two completion states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Done,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }

    /// The opposite state. Both directions are always allowed.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Done,
            Self::Done => Self::Pending,
        }
    }
}

/// Status selector for filtered views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Done,
}

impl StatusFilter {
    const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }

    #[must_use]
    pub fn matches(self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == Status::Pending,
            Self::Done => status == Status::Done,
        }
    }
}

/// Ordinal urgency rank; smaller is more urgent.
///
/// Values 1..=3 carry the names High, Medium and Low. Larger values are
/// valid ranks (todo priorities follow list position and grow with the list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(u32);

impl Priority {
    pub const HIGH: Self = Self(1);
    pub const MEDIUM: Self = Self(2);
    pub const LOW: Self = Self(3);

    /// Build a priority from a rank, clamping zero up to [`Priority::HIGH`].
    #[must_use]
    pub const fn new(rank: u32) -> Self {
        if rank == 0 { Self::HIGH } else { Self(rank) }
    }

    /// Priority of the item at zero-based `position` in a todo list.
    #[must_use]
    pub fn from_position(position: usize) -> Self {
        Self::new(u32::try_from(position.saturating_add(1)).unwrap_or(u32::MAX))
    }

    #[must_use]
    pub const fn rank(self) -> u32 {
        self.0
    }

    /// Level name for the three named ranks.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("high"),
            2 => Some("medium"),
            3 => Some("low"),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::MEDIUM
    }
}

/// A task or teaching goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub text: String,
    pub title: String,
    pub priority: Priority,
    pub status: Status,
    #[serde(default)]
    pub estimated_time: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order: usize,
}

impl Item {
    /// Create a pending item. The title is derived once from `text` and is
    /// not recomputed by later edits.
    #[must_use]
    pub fn new(id: String, text: &str, priority: Priority, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.to_string(),
            title: title_from_text(text),
            priority,
            status: Status::Pending,
            estimated_time: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            order: 0,
        }
    }

    /// Move to `target`, stamping or clearing `completed_at`.
    ///
    /// Returns `false` when the item was already in `target`; nothing is
    /// touched in that case.
    pub fn set_status(&mut self, target: Status, now: DateTime<Utc>) -> bool {
        if self.status == target {
            return false;
        }
        self.status = target;
        self.completed_at = match target {
            Status::Done => Some(now),
            Status::Pending => None,
        };
        self.updated_at = now;
        true
    }

    /// Flip between pending and done.
    pub fn toggle_status(&mut self, now: DateTime<Utc>) -> Status {
        let target = self.status.toggled();
        self.set_status(target, now);
        target
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}

/// First [`TITLE_WORDS`] whitespace-separated tokens of `text`.
#[must_use]
pub fn title_from_text(text: &str) -> String {
    text.split_whitespace()
        .take(TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Allocate an item id from the creation time in milliseconds.
///
/// Rapid successive inserts can land on the same millisecond; the id is
/// bumped past any id already present in `existing`.
#[must_use]
pub fn next_item_id(now: DateTime<Utc>, existing: &[Item]) -> String {
    let mut candidate = now.timestamp_millis();
    while existing.iter().any(|item| item.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Variant {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "task" | "tasks" => Ok(Self::Task),
            "todo" | "todos" | "goal" | "goals" => Ok(Self::Todo),
            _ => Err(ParseEnumError {
                expected: "variant",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError {
                expected: "status filter",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "high" => Ok(Self::HIGH),
            "medium" => Ok(Self::MEDIUM),
            "low" => Ok(Self::LOW),
            other => match other.parse::<u32>() {
                Ok(rank) if rank > 0 => Ok(Self(rank)),
                _ => Err(ParseEnumError {
                    expected: "priority",
                    got: s.to_string(),
                }),
            },
        }
    }
}
