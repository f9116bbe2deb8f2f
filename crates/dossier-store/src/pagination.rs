//! Page requests and result pages.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Profile attribute a page can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    Address,
    Age,
    Birthdate,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Address => "address",
            SortKey::Age => "age",
            SortKey::Birthdate => "birthdate",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(SortKey::Id),
            "address" => Ok(SortKey::Address),
            "age" => Ok(SortKey::Age),
            "birthdate" => Ok(SortKey::Birthdate),
            other => Err(format!("unsupported sort property: {other:?}")),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if s.trim().eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(format!("unsupported sort direction: {s:?}"))
        }
    }
}

/// One sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(key: SortKey) -> Self {
        Self {
            key,
            direction: Direction::Asc,
        }
    }

    pub fn desc(key: SortKey) -> Self {
        Self {
            key,
            direction: Direction::Desc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    /// Parses `property` or `property,direction` (e.g. `age,desc`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ',');
        let key = parts.next().unwrap_or_default().parse()?;
        let direction = match parts.next() {
            Some(dir) => dir.parse()?,
            None => Direction::Asc,
        };
        Ok(Self { key, direction })
    }
}

/// A request for one page of results.
///
/// Pages are zero-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    #[serde(default)]
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
            sort: Vec::new(),
        }
    }

    /// First page with the given size.
    pub fn first(size: u32) -> Self {
        Self::new(0, size)
    }

    #[must_use]
    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Caps the page size at `max_size`.
    #[must_use]
    pub fn clamped(mut self, max_size: u32) -> Self {
        self.size = self.size.clamp(1, max_size.max(1));
        self
    }

    /// Index of the first element of this page.
    pub fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Cuts the requested page out of an already-ordered result set.
    pub fn slice(items: Vec<T>, request: &PageRequest) -> Self {
        let total_elements = items.len() as u64;
        let content = items
            .into_iter()
            .skip(request.offset())
            .take(request.size as usize)
            .collect();

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    /// Number of elements on this page.
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn is_last(&self) -> bool {
        u64::from(self.page) + 1 >= self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
