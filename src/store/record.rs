//! Record types

use serde::{Deserialize, Serialize};

/// Business fields of a record, without its identity
///
/// This is what callers hand to `add`; the gateway assigns the `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: u32,
}

impl RecordFields {
    /// Check the fields a remote source would refuse
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name cannot be empty".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("price must be a non-negative number, got {}", self.price));
        }
        Ok(())
    }
}

/// A record with its server-assigned identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: RecordFields,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: RecordFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Partial update of a record's fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl RecordPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the set fields on top of `fields`
    pub fn apply_to(&self, fields: &mut RecordFields) {
        if let Some(name) = &self.name {
            fields.name = name.clone();
        }
        if let Some(description) = &self.description {
            fields.description = description.clone();
        }
        if let Some(price) = self.price {
            fields.price = price;
        }
        if let Some(category) = &self.category {
            fields.category = category.clone();
        }
        if let Some(stock) = self.stock {
            fields.stock = stock;
        }
    }
}
