/// Slice of a filtered list plus the metadata list views need.
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub start_index: usize,
}

/// Token in a page-number strip: a clickable number or an ellipsis gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    Page(usize),
    Ellipsis,
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 || count == 0 {
        return 1;
    }
    count.div_ceil(page_size)
}

/// Validate a requested page number. Out-of-range requests are rejected
/// silently; the caller keeps whatever page it already had.
pub fn accept_page(requested: usize, total_pages: usize) -> Option<usize> {
    if (1..=total_pages).contains(&requested) {
        Some(requested)
    } else {
        None
    }
}

/// `page` must already be validated via `accept_page`; anything out of range
/// degrades to an empty slice rather than panicking.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let total_items = items.len();
    let total = total_pages(total_items, page_size);
    let start_index = (page.max(1) - 1) * page_size;
    let end = (start_index + page_size).min(total_items);
    let slice = if start_index < total_items {
        &items[start_index..end]
    } else {
        &items[0..0]
    };
    Page {
        items: slice,
        page,
        total_pages: total,
        total_items,
        start_index,
    }
}

/// Page numbers to display: always 1 and the last page, everything within
/// `radius` of the current page, one ellipsis per collapsed gap.
pub fn page_window(current: usize, total_pages: usize, radius: usize) -> Vec<PageToken> {
    let mut tokens = Vec::new();
    for p in 1..=total_pages {
        let keep = p == 1 || p == total_pages || p.abs_diff(current) <= radius;
        if keep {
            tokens.push(PageToken::Page(p));
        } else if tokens.last() != Some(&PageToken::Ellipsis) {
            tokens.push(PageToken::Ellipsis);
        }
    }
    tokens
}
