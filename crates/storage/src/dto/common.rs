use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

impl PaginationParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".to_string());
        }
        if self.page_size < 1 || self.page_size > 100 {
            return Err("page_size must be between 1 and 100".to_string());
        }
        Ok(())
    }

    /// Items to skip. Saturates instead of overflowing for absurd page numbers.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }

    pub fn limit(&self) -> usize {
        self.page_size as usize
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(page: u32, page_size: u32, total_items: i64) -> Self {
        let total_pages = ((total_items as f64) / (page_size as f64)).ceil() as u32;
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, page_size: u32, total_items: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, page_size, total_items),
        }
    }

    /// Cut one page out of an already filtered and ordered list
    pub fn from_items(items: Vec<T>, params: &PaginationParams) -> Self {
        let total_items = items.len() as i64;
        let data = items
            .into_iter()
            .skip(params.offset())
            .take(params.limit())
            .collect();

        Self::new(data, params.page, params.page_size, total_items)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        let params = PaginationParams {
            page: 0,
            page_size: 10,
        };
        assert!(params.validate().is_err());

        let params = PaginationParams {
            page: 1,
            page_size: 101,
        };
        assert!(params.validate().is_err());
        assert!(PaginationParams::default().validate().is_ok());
    }

    #[test]
    fn test_from_items_slices_last_page() {
        let params = PaginationParams {
            page: 3,
            page_size: 4,
        };
        let page = PaginatedResponse::from_items((1..=10).collect::<Vec<u32>>(), &params);

        assert_eq!(page.data, vec![9, 10]);
        assert_eq!(page.pagination.total_items, 10);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[test]
    fn test_page_far_past_the_end_is_empty() {
        let params = PaginationParams {
            page: 50_000_000,
            page_size: 100,
        };
        assert!(params.validate().is_ok());

        let page = PaginatedResponse::from_items(vec![1u32, 2, 3], &params);

        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total_items, 3);
        assert_eq!(page.pagination.page, 50_000_000);
    }

    #[test]
    fn test_offset_saturates_at_max_page() {
        let params = PaginationParams {
            page: u32::MAX,
            page_size: 100,
        };
        assert_eq!(params.offset(), (u32::MAX as usize - 1).saturating_mul(100));
    }
}
