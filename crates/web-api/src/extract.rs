//! 查询参数提取

use domain::Pagination;
use serde::Deserialize;

/// 1 基分页参数 `{amount, page}`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationQuery {
    pub amount: Option<u32>,
    pub page: Option<u32>,
}

impl PaginationQuery {
    pub fn into_pagination(self) -> Pagination {
        Pagination::new(self.amount.unwrap_or(20), self.page.unwrap_or(1))
    }
}

/// 搜索参数
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let q = PaginationQuery {
            amount: None,
            page: None,
        };
        let p = q.into_pagination();
        assert_eq!((p.amount, p.page), (20, 1));
    }

    #[test]
    fn test_passthrough_and_clamp() {
        let q = PaginationQuery {
            amount: Some(1_000),
            page: Some(0),
        };
        let p = q.into_pagination();
        assert_eq!(p.amount, Pagination::MAX_AMOUNT);
        assert_eq!(p.page, 1);
    }
}
