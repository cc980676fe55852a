//! Page selection.
//!
//! Callers address pages by 1-based number. Numbers that do not name a page
//! of the document (zero, negative, past the end) are kept here and filtered
//! when the selector is applied, so a request can mention pages a particular
//! document does not have.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSelector(Vec<i64>);

impl PageSelector {
    pub fn new(numbers: Vec<i64>) -> Self {
        Self(numbers)
    }

    pub fn first_page() -> Self {
        Self(vec![1])
    }

    /// Page numbers to visit, in request order. Duplicates are preserved.
    /// An empty selector means the first page.
    pub fn numbers(&self) -> Vec<i64> {
        if self.0.is_empty() {
            vec![1]
        } else {
            self.0.clone()
        }
    }

    /// Zero-based index for a 1-based page number, or `None` when the number
    /// does not address one of `page_count` pages.
    pub fn index_of(number: i64, page_count: usize) -> Option<usize> {
        let index = usize::try_from(number.checked_sub(1)?).ok()?;
        (index < page_count).then_some(index)
    }
}

impl From<Vec<i64>> for PageSelector {
    fn from(numbers: Vec<i64>) -> Self {
        Self(numbers)
    }
}

impl From<Option<Vec<i64>>> for PageSelector {
    fn from(numbers: Option<Vec<i64>>) -> Self {
        Self(numbers.unwrap_or_default())
    }
}
