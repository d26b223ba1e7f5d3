//! 通用类型定义

use serde::{Deserialize, Serialize};
use shiroha_errors::{AppError, AppResult};

/// 默认页码
pub const DEFAULT_PAGE: u32 = 1;

/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// 创建分页参数，页码和每页条数都必须大于 0
    pub fn new(page: u32, page_size: u32) -> AppResult<Self> {
        if page == 0 {
            return Err(AppError::validation("page must be at least 1"));
        }
        if page_size == 0 {
            return Err(AppError::validation("pageSize must be at least 1"));
        }
        Ok(Self { page, page_size })
    }

    /// 从查询字符串解析分页参数
    ///
    /// 缺省时使用默认值；出现但不是整数时返回校验错误
    pub fn parse(page: Option<&str>, page_size: Option<&str>, max_page_size: u32) -> AppResult<Self> {
        let page = parse_param(page, "page", DEFAULT_PAGE)?;
        let page_size = parse_param(page_size, "pageSize", DEFAULT_PAGE_SIZE)?;

        if page < 1 {
            return Err(AppError::validation("page must be at least 1"));
        }
        if page_size < 1 {
            return Err(AppError::validation("pageSize must be at least 1"));
        }
        if page_size > i64::from(max_page_size) {
            return Err(AppError::validation(format!(
                "pageSize must not exceed {}",
                max_page_size
            )));
        }
        if page > i64::from(u32::MAX) {
            return Err(AppError::validation("page is out of range"));
        }

        Ok(Self {
            page: page as u32,
            page_size: page_size as u32,
        })
    }

    /// SQL OFFSET
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// SQL LIMIT
    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

fn parse_param(raw: Option<&str>, name: &str, default: u32) -> AppResult<i64> {
    match raw {
        None => Ok(i64::from(default)),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| AppError::validation(format!("{} must be int", name))),
    }
}

/// 计算总页数（向上取整）
pub fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size))
}

/// 分页元信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub page_size: u32,
    pub pages: u64,
    pub total_count: u64,
}

impl PageInfo {
    pub fn new(pagination: &Pagination, total_count: u64) -> Self {
        Self {
            current_page: pagination.page,
            page_size: pagination.page_size,
            pages: total_pages(total_count, pagination.page_size),
            total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let p = Pagination::parse(None, None, 100).unwrap();
        assert_eq!(p, Pagination::default());
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 10);
    }

    #[test]
    fn test_non_integer_params() {
        let err = Pagination::parse(Some("abc"), None, 100).unwrap_err();
        assert_eq!(err.client_message(), "page must be int");

        let err = Pagination::parse(Some("2"), Some("1.5"), 100).unwrap_err();
        assert_eq!(err.client_message(), "pageSize must be int");

        // 参数出现但为空也视为非法
        assert!(Pagination::parse(Some(""), None, 100).is_err());
    }

    #[test]
    fn test_out_of_range_params() {
        assert!(Pagination::parse(Some("0"), None, 100).is_err());
        assert!(Pagination::parse(Some("-1"), None, 100).is_err());
        assert!(Pagination::parse(None, Some("0"), 100).is_err());
        assert!(Pagination::parse(None, Some("101"), 100).is_err());
        assert!(Pagination::parse(None, Some("100"), 100).is_ok());
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(1, 10).unwrap().offset(), 0);
        assert_eq!(Pagination::new(3, 10).unwrap().offset(), 20);
        assert_eq!(Pagination::new(2, 25).unwrap().offset(), 25);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_page_info_serializes_camel_case() {
        let info = PageInfo::new(&Pagination::new(2, 10).unwrap(), 25);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["pages"], 3);
        assert_eq!(json["totalCount"], 25);
    }
}
