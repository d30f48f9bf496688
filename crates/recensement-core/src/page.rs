//! Pagination types for sorted scans.

use serde::Serialize;

/// A 0-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page: u32,
  pub size: u32,
}

impl PageRequest {
  pub const DEFAULT_SIZE: u32 = 100;

  pub fn new(page: u32, size: u32) -> Self { Self { page, size } }

  /// Number of rows to skip.
  pub fn offset(&self) -> u64 { u64::from(self.page) * u64::from(self.size) }
}

impl Default for PageRequest {
  fn default() -> Self { Self::new(0, Self::DEFAULT_SIZE) }
}

/// One page of a sorted scan plus the totals needed to navigate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub content:        Vec<T>,
  pub page:           u32,
  pub size:           u32,
  pub total_elements: u64,
  pub total_pages:    u64,
}

impl<T> Page<T> {
  pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
    let total_pages = if request.size == 0 {
      0
    } else {
      total_elements.div_ceil(u64::from(request.size))
    };
    Self {
      content,
      page: request.page,
      size: request.size,
      total_elements,
      total_pages,
    }
  }

  pub fn is_empty(&self) -> bool { self.content.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn offset_is_page_times_size() {
    assert_eq!(PageRequest::new(0, 100).offset(), 0);
    assert_eq!(PageRequest::new(3, 25).offset(), 75);
  }

  #[test]
  fn total_pages_rounds_up() {
    let page: Page<()> = Page::new(vec![], PageRequest::new(0, 10), 21);
    assert_eq!(page.total_pages, 3);

    let exact: Page<()> = Page::new(vec![], PageRequest::new(0, 10), 20);
    assert_eq!(exact.total_pages, 2);

    let empty: Page<()> = Page::new(vec![], PageRequest::default(), 0);
    assert_eq!(empty.total_pages, 0);
  }
}
