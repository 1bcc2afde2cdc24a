//! Deterministic windowing of an ordered sequence.

use serde::Serialize;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page size and the page the user asked for.
///
/// `current_page` is 1-based. It is re-clamped by [`PageState::clamp_to`]
/// whenever the number of pages changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    page_size: usize,
    pub current_page: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    /// Create a page state positioned on page 1. A zero size is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Clamp `current_page` into `[1, max(1, total_pages)]`.
    pub fn clamp_to(&mut self, total_pages: usize) {
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }
}

/// One window over a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub total_pages: usize,
    /// The requested page after clamping.
    pub effective_page: usize,
}

/// Number of pages needed for `len` items; never less than 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Return the window for `requested_page` (1-based), clamping out-of-range
/// requests to the first or last page.
pub fn paginate<T>(items: &[T], page_size: usize, requested_page: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let effective_page = requested_page.clamp(1, total_pages);

    let start = ((effective_page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        total_pages,
        effective_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_items_two_pages() {
        let items: Vec<u32> = (0..12).collect();

        let page = paginate(&items, 10, 1);
        assert_eq!(page.items, &items[0..10]);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.effective_page, 1);

        let page = paginate(&items, 10, 2);
        assert_eq!(page.items, &items[10..12]);
        assert_eq!(page.effective_page, 2);
    }

    #[test]
    fn test_out_of_range_pages_clamp() {
        let items: Vec<u32> = (0..25).collect();
        let total = total_pages(items.len(), 10);
        assert_eq!(total, 3);

        assert_eq!(paginate(&items, 10, 0), paginate(&items, 10, 1));
        assert_eq!(paginate(&items, 10, total + 1), paginate(&items, 10, total));
        assert_eq!(paginate(&items, 10, usize::MAX).effective_page, total);
    }

    #[test]
    fn test_empty_sequence_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 10, 3);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.effective_page, 1);
    }

    #[test]
    fn test_pages_cover_sequence_without_overlap() {
        for n in 0..35usize {
            for size in 1..12usize {
                let items: Vec<usize> = (0..n).collect();
                let total = total_pages(n, size);

                let joined: Vec<usize> = (1..=total)
                    .flat_map(|p| paginate(&items, size, p).items.to_vec())
                    .collect();
                assert_eq!(joined, items, "n={n} size={size}");
            }
        }
    }

    #[test]
    fn test_page_state_clamps() {
        let mut state = PageState::new(10);
        state.current_page = 7;
        state.clamp_to(3);
        assert_eq!(state.current_page, 3);

        state.clamp_to(0);
        assert_eq!(state.current_page, 1);

        state.current_page = 0;
        state.clamp_to(5);
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn test_zero_page_size_is_raised() {
        assert_eq!(PageState::new(0).page_size(), 1);
        assert_eq!(paginate(&[1, 2, 3], 0, 2).items, &[2]);
    }
}
