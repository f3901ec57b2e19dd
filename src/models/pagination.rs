use serde::Serialize;

pub const MAX_PER_PAGE: usize = 100;

/// Generic paginated response wrapper for API endpoints.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Slice one page out of `items`. `page` is 1-based and clamped to at least 1;
/// `per_page` is clamped to 1..=100. Pages past the end are empty.
pub fn paginate<T: Serialize>(items: Vec<T>, page: Option<usize>, per_page: Option<usize>, default_per_page: usize) -> Page<T> {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(default_per_page).clamp(1, MAX_PER_PAGE);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);

    let start = (page - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(start).take(per_page).collect();

    Page { items, page, per_page, total, total_pages }
}
