//! Shared domain enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "price")]
    Price,
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "areaSqft")]
    AreaSqft,
    #[serde(rename = "bedrooms")]
    Bedrooms,
    #[serde(rename = "bathrooms")]
    Bathrooms,
}

impl SortField {
    /// Wire name, also used verbatim inside listing cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::CreatedAt => "createdAt",
            SortField::AreaSqft => "areaSqft",
            SortField::Bedrooms => "bedrooms",
            SortField::Bathrooms => "bathrooms",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::CreatedAt => "created_at",
            SortField::AreaSqft => "area_sqft",
            SortField::Bedrooms => "bedrooms",
            SortField::Bathrooms => "bathrooms",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SortField {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "price" => Ok(SortField::Price),
            "createdAt" => Ok(SortField::CreatedAt),
            "areaSqft" => Ok(SortField::AreaSqft),
            "bedrooms" => Ok(SortField::Bedrooms),
            "bathrooms" => Ok(SortField::Bathrooms),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
