// ── Pagination ──

/// `ceil(len / page_size)`; zero for an empty list.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Clamp a 1-based page number into `[1, max(total_pages, 1)]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// The slice `[(page-1)*page_size, page*page_size)`, cut short at the end.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(11, 5), 3);
    }

    #[test]
    fn clamp_stays_in_range() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(7, 3), 3);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(4, 0), 1);
    }

    #[test]
    fn pages_reconstruct_the_list() {
        let items: Vec<u32> = (0..12).collect();
        for size in 1..=13 {
            let pages = total_pages(items.len(), size);
            let joined: Vec<u32> = (1..=pages)
                .flat_map(|p| page_slice(&items, p, size).iter().copied())
                .collect();
            assert_eq!(joined, items, "page size {size}");
        }
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let items = [1, 2, 3];
        assert!(page_slice(&items, 5, 2).is_empty());
        assert_eq!(page_slice(&items, 2, 2), &[3]);
    }
}
