//! Page window computation and navigation rules for the pagination strip.

use super::types::Pagination;

/// Maximum number of page buttons shown at once.
pub const WINDOW_SIZE: u32 = 5;

/// Compute the page numbers shown around `current_page`.
///
/// Always yields `min(5, total_pages)` consecutive pages.
pub fn page_window(current_page: u32, total_pages: u32) -> Vec<u32> {
    if total_pages <= WINDOW_SIZE {
        return (1..=total_pages).collect();
    }

    let (start, end) = if current_page <= 3 {
        (1, WINDOW_SIZE)
    } else if current_page >= total_pages - 2 {
        (total_pages - 4, total_pages)
    } else {
        (current_page - 2, current_page + 2)
    };

    (start..=end).collect()
}

/// Whether the pagination strip is rendered at all.
pub fn show_pagination(enabled: bool, loading: bool, total_pages: u32) -> bool {
    enabled && !loading && total_pages > 1
}

impl Pagination {
    /// Whether `page` is a valid target for a page change.
    pub fn contains_page(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages
    }

    /// Whether the "previous" control is enabled.
    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Whether the "next" control is enabled.
    pub fn can_go_next(&self) -> bool {
        self.total_pages > 0 && self.current_page < self.total_pages
    }

    /// Clamp `page` into `[1, total_pages]` when there are pages, else to 1.
    pub fn clamp(&self, page: u32) -> u32 {
        if self.total_pages == 0 {
            page.max(1)
        } else {
            page.clamp(1, self.total_pages)
        }
    }

    /// The page buttons for the current state.
    pub fn window(&self) -> Vec<u32> {
        page_window(self.current_page, self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagination(current_page: u32, total_pages: u32) -> Pagination {
        Pagination {
            current_page,
            total_pages,
            total_items: 0,
            items_per_page: 4,
        }
    }

    #[test]
    fn test_window_small_totals() {
        assert!(page_window(1, 0).is_empty());
        assert_eq!(page_window(1, 1), vec![1]);
        assert_eq!(page_window(2, 2), vec![1, 2]);
        assert_eq!(page_window(5, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_window_six_pages() {
        assert_eq!(page_window(1, 6), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(3, 6), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(4, 6), vec![2, 3, 4, 5, 6]);
        assert_eq!(page_window(6, 6), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_window_middle_slides() {
        assert_eq!(page_window(5, 10), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(7, 10), vec![5, 6, 7, 8, 9]);
        assert_eq!(page_window(8, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_window_always_bounded() {
        for total in 0..=12 {
            for current in 1..=total.max(1) {
                let window = page_window(current, total);
                assert_eq!(window.len() as u32, total.min(WINDOW_SIZE));
                assert!(window.iter().all(|p| *p >= 1 && *p <= total));
                if total > 0 {
                    assert!(window.contains(&current), "{current}/{total}");
                }
            }
        }
    }

    #[test]
    fn test_prev_next_bounds() {
        let first = pagination(1, 3);
        assert!(!first.can_go_prev());
        assert!(first.can_go_next());

        let last = pagination(3, 3);
        assert!(last.can_go_prev());
        assert!(!last.can_go_next());

        let empty = pagination(1, 0);
        assert!(!empty.can_go_prev());
        assert!(!empty.can_go_next());
    }

    #[test]
    fn test_contains_and_clamp() {
        let p = pagination(2, 4);
        assert!(!p.contains_page(0));
        assert!(p.contains_page(1));
        assert!(p.contains_page(4));
        assert!(!p.contains_page(5));

        assert_eq!(p.clamp(9), 4);
        assert_eq!(p.clamp(0), 1);
        assert_eq!(pagination(1, 0).clamp(3), 3);
    }

    #[test]
    fn test_show_pagination() {
        assert!(show_pagination(true, false, 2));
        assert!(!show_pagination(true, false, 1));
        assert!(!show_pagination(true, true, 5));
        assert!(!show_pagination(false, false, 5));
    }
}
