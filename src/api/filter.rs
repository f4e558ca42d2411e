//! List filters, pagination and sort order

use crate::error::{IamError, Result};
use crate::validation::{valid_order, valid_org, valid_path};
use serde::{Deserialize, Serialize};

/// Page size when the caller does not ask for one
pub const DEFAULT_LIMIT_SIZE: usize = 20;
/// Largest page a caller may ask for
pub const MAX_LIMIT_SIZE: usize = 1000;

/// Sortable user columns
pub const USER_COLUMNS: &[&str] = &["externalID", "path", "urn", "createAt", "updateAt"];
/// Sortable group columns
pub const GROUP_COLUMNS: &[&str] = &["name", "path", "org", "urn", "createAt", "updateAt"];
/// Sortable policy columns
pub const POLICY_COLUMNS: &[&str] = &["name", "path", "org", "urn", "createAt", "updateAt"];

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// Validated sort order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl OrderBy {
    /// Parse `column-asc` / `column-desc`, accepting only whitelisted columns
    pub fn parse(order: &str, valid_columns: &[&str]) -> Result<Self> {
        if !valid_order(order) {
            return Err(IamError::InvalidParameter(format!("OrderBy {}", order)));
        }

        // valid_order guarantees exactly one '-' followed by asc|desc
        let (column, direction) = match order.rsplit_once('-') {
            Some((column, "asc")) => (column, Direction::Asc),
            Some((column, _)) => (column, Direction::Desc),
            None => return Err(IamError::InvalidParameter(format!("OrderBy {}", order))),
        };

        if !valid_columns.contains(&column) {
            return Err(IamError::InvalidParameter(format!(
                "OrderBy column {}",
                column
            )));
        }

        Ok(OrderBy {
            column: column.to_string(),
            direction,
        })
    }
}

/// Raw list parameters as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Filter {
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub path_prefix: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub order_by: Option<String>,
}

/// Filter after validation, ready for a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub org: Option<String>,
    pub path_prefix: String,
    pub offset: usize,
    pub limit: usize,
    pub order_by: Option<OrderBy>,
}

impl Default for ListFilter {
    fn default() -> Self {
        ListFilter {
            org: None,
            path_prefix: "/".to_string(),
            offset: 0,
            limit: DEFAULT_LIMIT_SIZE,
            order_by: None,
        }
    }
}

impl Filter {
    /// Validate the filter and fill in defaults
    pub fn validate(self, valid_columns: &[&str]) -> Result<ListFilter> {
        let org = match self.org {
            Some(org) if org.is_empty() => None,
            Some(org) if !valid_org(&org) => {
                return Err(IamError::InvalidParameter(format!("org {}", org)));
            }
            other => other,
        };

        let path_prefix = match self.path_prefix {
            None => "/".to_string(),
            Some(prefix) if prefix.is_empty() => "/".to_string(),
            Some(prefix) if !valid_path(&prefix) => {
                return Err(IamError::InvalidParameter(format!(
                    "pathPrefix {}",
                    prefix
                )));
            }
            Some(prefix) => prefix,
        };

        let limit = match self.limit {
            0 => DEFAULT_LIMIT_SIZE,
            limit if limit > MAX_LIMIT_SIZE => {
                return Err(IamError::InvalidParameter(format!(
                    "limit {}, max limit allowed: {}",
                    limit, MAX_LIMIT_SIZE
                )));
            }
            limit => limit,
        };

        let order_by = match self.order_by.as_deref() {
            None | Some("") => None,
            Some(order) => Some(OrderBy::parse(order, valid_columns)?),
        };

        Ok(ListFilter {
            org,
            path_prefix,
            offset: self.offset,
            limit,
            order_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let filter = Filter::default().validate(GROUP_COLUMNS).unwrap();
        assert_eq!(filter, ListFilter::default());
    }

    #[test]
    fn test_limit_bounds() {
        let filter = Filter {
            limit: MAX_LIMIT_SIZE,
            ..Default::default()
        };
        assert_eq!(filter.validate(GROUP_COLUMNS).unwrap().limit, MAX_LIMIT_SIZE);

        let filter = Filter {
            limit: MAX_LIMIT_SIZE + 1,
            ..Default::default()
        };
        assert_eq!(
            filter.validate(GROUP_COLUMNS).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );
    }

    #[test]
    fn test_invalid_org_and_path() {
        let filter = Filter {
            org: Some("bad org".to_string()),
            ..Default::default()
        };
        assert!(filter.validate(GROUP_COLUMNS).is_err());

        let filter = Filter {
            path_prefix: Some("/no//double/".to_string()),
            ..Default::default()
        };
        assert!(filter.validate(GROUP_COLUMNS).is_err());
    }

    #[test]
    fn test_order_by_is_structured() {
        let filter = Filter {
            order_by: Some("createAt-desc".to_string()),
            ..Default::default()
        };
        let filter = filter.validate(GROUP_COLUMNS).unwrap();
        assert_eq!(
            filter.order_by,
            Some(OrderBy {
                column: "createAt".to_string(),
                direction: Direction::Desc,
            })
        );
    }

    #[test]
    fn test_order_by_rejects_unknown_column() {
        assert!(OrderBy::parse("name-asc", USER_COLUMNS).is_err());
        assert!(OrderBy::parse("externalID-asc", USER_COLUMNS).is_ok());
        assert!(OrderBy::parse("name;drop-asc", GROUP_COLUMNS).is_err());
        assert!(OrderBy::parse("name", GROUP_COLUMNS).is_err());
    }
}
