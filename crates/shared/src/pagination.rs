//! Offset-based pagination utilities.

use serde::Deserialize;
use thiserror::Error;

/// Error type for page parameter handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Offset cannot be negative")]
    NegativeOffset,
    #[error("Limit must be positive")]
    NonPositiveLimit,
}

/// Raw offset/limit pair as supplied by a caller.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved page window, safe to bind into `OFFSET`/`LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl PageParams {
    /// Resolves the caller's parameters into a bounded page.
    ///
    /// A missing limit falls back to `default_limit`; limits above
    /// `max_limit` are clamped down.
    pub fn resolve(self, default_limit: i64, max_limit: i64) -> Result<Page, PageError> {
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(PageError::NegativeOffset);
        }

        let limit = self.limit.unwrap_or(default_limit);
        if limit <= 0 {
            return Err(PageError::NonPositiveLimit);
        }

        Ok(Page {
            offset,
            limit: limit.min(max_limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let page = PageParams::default().resolve(50, 500).unwrap();
        assert_eq!(page, Page { offset: 0, limit: 50 });
    }

    #[test]
    fn test_resolve_explicit_values() {
        let params = PageParams {
            offset: Some(20),
            limit: Some(10),
        };
        assert_eq!(
            params.resolve(50, 500).unwrap(),
            Page {
                offset: 20,
                limit: 10
            }
        );
    }

    #[test]
    fn test_resolve_clamps_limit() {
        let params = PageParams {
            offset: None,
            limit: Some(10_000),
        };
        assert_eq!(params.resolve(50, 500).unwrap().limit, 500);
    }

    #[test]
    fn test_resolve_negative_offset() {
        let params = PageParams {
            offset: Some(-1),
            limit: None,
        };
        assert_eq!(params.resolve(50, 500), Err(PageError::NegativeOffset));
    }

    #[test]
    fn test_resolve_zero_limit() {
        let params = PageParams {
            offset: None,
            limit: Some(0),
        };
        assert_eq!(params.resolve(50, 500), Err(PageError::NonPositiveLimit));
    }

    #[test]
    fn test_page_params_deserialize_partial() {
        let params: PageParams = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(params.offset, None);
        assert_eq!(params.limit, Some(5));
    }
}
