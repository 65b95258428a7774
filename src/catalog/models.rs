//! Menu Catalog Models
//!
//! This module contains the catalog entity and the payloads used to create
//! and update it.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::CatalogError;

/// Highest price a menu item may carry.
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

// =============================================================================
// Catalog Domain Models
// =============================================================================

/// Menu section an item is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hot,
    Cold,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Cold => "cold",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(Self::Hot),
            "cold" => Ok(Self::Cold),
            other => Err(CatalogError::Validation(format!(
                "category must be `hot` or `cold`, got `{other}`"
            ))),
        }
    }
}

/// A purchasable menu item as stored in the `Coffee` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    /// Non-negative, currency agnostic
    pub price: Decimal,

    pub description: String,

    /// Image URI
    pub image: String,

    pub category: Category,

    #[serde(default)]
    pub popular: bool,
}

/// A validated item that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMenuItem {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub image: String,
    pub category: Category,
    pub popular: bool,
}

impl From<MenuItem> for NewMenuItem {
    fn from(item: MenuItem) -> Self {
        Self {
            name: item.name,
            price: item.price,
            description: item.description,
            image: item.image,
            category: item.category,
            popular: item.popular,
        }
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Loosely typed item fields as they arrive over the wire.
///
/// Every field is optional so that missing and malformed values can be
/// reported as validation failures rather than decode errors. Creation needs
/// all required fields; an update applies whichever fields are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemFields {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub popular: Option<bool>,
}

impl MenuItemFields {
    /// Builds a new item, requiring name, price, description, image and
    /// category. `popular` defaults to false.
    pub fn into_new_item(self) -> Result<NewMenuItem, CatalogError> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.image.is_none() {
            missing.push("image");
        }
        if self.category.is_none() {
            missing.push("category");
        }

        let (Some(name), Some(price), Some(description), Some(image), Some(category)) = (
            self.name,
            self.price,
            self.description,
            self.image,
            self.category,
        ) else {
            return Err(CatalogError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        };

        let item = NewMenuItem {
            name,
            price,
            description,
            image,
            category: category.parse()?,
            popular: self.popular.unwrap_or(false),
        };
        item.validate()?;

        Ok(item)
    }

    /// Overlays the present fields onto an existing item.
    pub fn apply_to(self, mut item: NewMenuItem) -> Result<NewMenuItem, CatalogError> {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(image) = self.image {
            item.image = image;
        }
        if let Some(category) = self.category {
            item.category = category.parse()?;
        }
        if let Some(popular) = self.popular {
            item.popular = popular;
        }
        item.validate()?;

        Ok(item)
    }
}

impl NewMenuItem {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation("name must not be empty".into()));
        }
        if self.price < Decimal::ZERO {
            return Err(CatalogError::Validation(format!(
                "price must not be negative, got {}",
                self.price
            )));
        }
        if self.price > MAX_PRICE {
            return Err(CatalogError::Validation(format!(
                "price must not exceed {MAX_PRICE}, got {}",
                self.price
            )));
        }

        Ok(())
    }
}
