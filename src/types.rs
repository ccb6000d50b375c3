//! Core types for the records manager.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of personal record.
///
/// Stored in the database as the snake_case id returned by [`Category::as_str`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Honor,
    Education,
    Competition,
    Certificate,
    Account,
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 6] = [
        Category::Honor,
        Category::Education,
        Category::Competition,
        Category::Certificate,
        Category::Account,
        Category::Other,
    ];

    /// Stable storage id.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Honor => "honor",
            Category::Education => "education",
            Category::Competition => "competition",
            Category::Certificate => "certificate",
            Category::Account => "account",
            Category::Other => "other",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Honor => "Honor",
            Category::Education => "Education",
            Category::Competition => "Competition",
            Category::Certificate => "Certificate",
            Category::Account => "Account",
            Category::Other => "Other",
        }
    }

    /// Chinese label used by older exports of this data.
    pub fn native_label(&self) -> &'static str {
        match self {
            Category::Honor => "荣誉",
            Category::Education => "教育经历",
            Category::Competition => "竞赛",
            Category::Certificate => "证书",
            Category::Account => "账号",
            Category::Other => "其他",
        }
    }

    /// Parse a category from its id, English label (case-insensitive) or
    /// Chinese label.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|c| {
            c.as_str().eq_ignore_ascii_case(s)
                || c.label().eq_ignore_ascii_case(s)
                || c.native_label() == s
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// A column of the records table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Name,
    Title,
    Category,
    Notes,
    CreatedAt,
}

impl Field {
    /// All fields in table order.
    pub const ALL: [Field; 6] = [
        Field::Id,
        Field::Name,
        Field::Title,
        Field::Category,
        Field::CreatedAt,
        Field::Notes,
    ];

    /// SQL column name. Only these strings are ever interpolated into SQL.
    pub fn column(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Title => "title",
            Field::Category => "category",
            Field::Notes => "notes",
            Field::CreatedAt => "created_at",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Id => "ID",
            Field::Name => "Name",
            Field::Title => "Title",
            Field::Category => "Category",
            Field::Notes => "Notes",
            Field::CreatedAt => "Created",
        }
    }

    /// Whether the field may be changed by an update. The primary key never is.
    pub fn is_updatable(&self) -> bool {
        !matches!(self, Field::Id)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "id" => Some(Field::Id),
            "name" => Some(Field::Name),
            "title" => Some(Field::Title),
            "category" => Some(Field::Category),
            "notes" | "note" => Some(Field::Notes),
            "created_at" | "created" | "date" => Some(Field::CreatedAt),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown field '{}'", s))
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub category: Category,
    /// SQLite `datetime('now')` text, `YYYY-MM-DD HH:MM:SS` in UTC.
    pub created_at: String,
    pub notes: String,
}

impl Record {
    /// Value of a single field rendered as text.
    pub fn field_value(&self, field: Field) -> String {
        match field {
            Field::Id => self.id.to_string(),
            Field::Name => self.name.clone(),
            Field::Title => self.title.clone(),
            Field::Category => self.category.as_str().to_string(),
            Field::Notes => self.notes.clone(),
            Field::CreatedAt => self.created_at.clone(),
        }
    }
}

/// Input for creating a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(default)]
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub notes: String,
}

impl NewRecord {
    pub fn new(title: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            category,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Number of records in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: i64,
}

/// Summary statistics over all records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStats {
    pub total: i64,
    /// Number of distinct categories in use.
    pub category_count: usize,
    /// Most recent `created_at`, if any records exist.
    pub latest: Option<String>,
    /// Counts per category, largest first.
    pub by_category: Vec<CategoryCount>,
}
