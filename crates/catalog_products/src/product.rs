use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Category as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// Product as returned by the catalog API. Every field may be absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub category: Option<CategoryResponse>,
    pub image: Option<i32>,
}

impl ProductResponse {
    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().and_then(|c| c.id)
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().and_then(|c| c.name.as_deref())
    }
}

/// Parse a page of products from its JSON array form.
pub fn parse_products(json: &str) -> Result<Vec<ProductResponse>> {
    serde_json::from_str(json).context("Failed to parse product list")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products() {
        let json = r#"[
            {"id": 1, "name": "Widget", "price": 9.99, "description": "basic",
             "category": {"id": 10, "name": "Tools"}},
            {"id": 2, "name": "Loose", "price": 1.5}
        ]"#;
        let products = parse_products(json).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].category_id(), Some(10));
        assert_eq!(products[0].category_name(), Some("Tools"));
        assert_eq!(products[1].category, None);
        assert_eq!(products[1].description, None);
        assert_eq!(products[1].category_name(), None);
    }

    #[test]
    fn test_parse_products_rejects_garbage() {
        assert!(parse_products("{").is_err());
    }
}
