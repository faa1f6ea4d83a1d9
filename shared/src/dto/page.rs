use serde::{Deserialize, Serialize};
use validator::Validate;

/// Largest page size a client may ask for.
pub const MAX_REQUESTED_COUNT: i64 = 500;

/// Optional query parameters accepted by every paginated listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PageQuery {
    /// Page size; the configured default applies when absent
    #[validate(range(min = 1, max = 500, message = "count must be between 1 and 500"))]
    pub count: Option<i64>,
}

/// One page of a ranked collection plus the offsets of its neighbours.
///
/// `prev_start` and `next_start` are passed through unclamped; a negative
/// `prev_start` or a `next_start` past the end is for the caller to hide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto<T> {
    pub title: String,
    pub entries: Vec<T>,
    pub start: i64,
    pub count: i64,
    pub prev_start: i64,
    pub next_start: i64,
    pub prev_page: String,
    pub next_page: String,
}

impl<T> PageDto<T> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts every entry, keeping the pagination metadata.
    pub fn map<U, F>(self, f: F) -> PageDto<U>
    where
        F: FnMut(T) -> U,
    {
        PageDto {
            title: self.title,
            entries: self.entries.into_iter().map(f).collect(),
            start: self.start,
            count: self.count,
            prev_start: self.prev_start,
            next_start: self.next_start,
            prev_page: self.prev_page,
            next_page: self.next_page,
        }
    }
}
