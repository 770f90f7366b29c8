//! Shared product catalogue. Readable by every user, writable by admins.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::resource::{ListQuery, Resource};
use crate::shared::state::Stores;
use crate::shared::store::{Filter, IndexSpec, Record, RecordStore};
use crate::shared::utils::date_util::DateTime;
use crate::shared::validation::{FieldRules, FieldValue, Rule, Validate};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Record for Product {
    const COLLECTION: &'static str = "products";
    const INDEXES: &'static [IndexSpec] = &[
        IndexSpec::ascending("name"),
        IndexSpec::ascending("category"),
        IndexSpec::descending("createdAt"),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime {
        self.created_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: u32,
}

impl Validate for CreateProductRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "name",
            rules: &[Rule::Required, Rule::MaxLength(200)],
        },
        FieldRules {
            field: "description",
            rules: &[Rule::MaxLength(2000)],
        },
        FieldRules {
            field: "price",
            rules: &[Rule::Min(0.0)],
        },
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => (&self.name).into(),
            "description" => (&self.description).into(),
            "price" => self.price.into(),
            _ => FieldValue::Absent,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
    pub stock: Option<u32>,
}

impl Validate for UpdateProductRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules {
            field: "name",
            rules: &[Rule::MinLength(1), Rule::MaxLength(200)],
        },
        FieldRules {
            field: "description",
            rules: &[Rule::MaxLength(2000)],
        },
        FieldRules {
            field: "price",
            rules: &[Rule::Min(0.0)],
        },
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => self.name.as_ref().into(),
            "description" => self.description.as_ref().into(),
            "price" => self.price.into(),
            _ => FieldValue::Absent,
        }
    }
}

impl Resource for Product {
    const NAME: &'static str = "Product";
    const OWNED: bool = false;
    const ADMIN_WRITES: bool = true;

    type Create = CreateProductRequest;
    type Update = UpdateProductRequest;

    fn store(stores: &Stores) -> Arc<dyn RecordStore<Self>> {
        stores.products.clone()
    }

    fn create(_owner_id: &str, input: CreateProductRequest, now: DateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            price: input.price,
            images: input.images,
            category: input.category,
            stock: input.stock,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateProductRequest, now: DateTime) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        if let Some(price) = input.price {
            self.price = price;
        }
        if let Some(images) = input.images {
            self.images = images;
        }
        if let Some(category) = input.category {
            self.category = category;
        }
        if let Some(stock) = input.stock {
            self.stock = stock;
        }
        self.updated_at = now;
    }

    fn filters(query: &ListQuery, mut filter: Filter) -> Filter {
        if let Some(category) = &query.category {
            filter = filter.eq("category", category.as_str());
        }
        if let Some(term) = query.search_term() {
            filter = filter.contains("name", term);
        }
        filter
    }
}
