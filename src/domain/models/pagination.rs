use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(params: &PageParams, total: i64) -> Self {
        let limit = params.limit();
        Self {
            page: params.page(),
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    /// Slices an already-filtered and sorted list down to the requested page.
    pub fn from_vec(items: Vec<T>, params: &PageParams) -> Self {
        let pagination = Pagination::new(params, items.len() as i64);
        let data = items
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        Self { data, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let params = PageParams { page: Some(0), limit: Some(500) };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 100);
        assert_eq!(PageParams::default().limit(), 10);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let params = PageParams { page: Some(i64::MAX), limit: Some(10) };
        assert_eq!(params.offset(), i64::MAX);

        let page = Paginated::from_vec(vec![1, 2, 3], &params);
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 3);
    }

    #[test]
    fn test_from_vec_slices_page() {
        let params = PageParams { page: Some(2), limit: Some(3) };
        let page = Paginated::from_vec((1..=8).collect::<Vec<i32>>(), &params);
        assert_eq!(page.data, vec![4, 5, 6]);
        assert_eq!(page.pagination, Pagination { page: 2, limit: 3, total: 8, total_pages: 3 });
    }
}
