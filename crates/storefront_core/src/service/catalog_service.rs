//! Product change-form service.
//!
//! Turns a submitted product form into a validated insert, filling the slug
//! from the title the way the product admin declares it.

use crate::admin::ModelAdmin;
use crate::model::collection::CollectionId;
use crate::model::money::Money;
use crate::model::product::{NewProduct, Product};
use crate::repo::product_repo::ProductRepository;
use crate::repo::RepoError;
use log::info;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("missing form field `{0}`")]
    MissingField(&'static str),
    #[error("invalid value `{value}` for form field `{field}`")]
    InvalidField { field: &'static str, value: String },
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("inconsistent product state: {0}")]
    InconsistentState(&'static str),
}

pub struct CatalogService<'a, R: ProductRepository> {
    repo: R,
    admin: &'a ModelAdmin,
}

impl<'a, R: ProductRepository> CatalogService<'a, R> {
    pub fn new(repo: R, admin: &'a ModelAdmin) -> Self {
        Self { repo, admin }
    }

    /// Creates a product from form fields `title`, `slug`, `description`,
    /// `unit_price`, `inventory` and `collection`.
    pub fn create_product_from_form(
        &self,
        mut form: BTreeMap<String, String>,
    ) -> Result<Product, CatalogError> {
        self.admin.prepopulate(&mut form);

        let collection_id: CollectionId = parse_field(&form, "collection", |v| v.parse().ok())?;
        let product = NewProduct {
            title: required(&form, "title")?.to_string(),
            slug: form.get("slug").cloned().unwrap_or_default(),
            description: form
                .get("description")
                .map(|text| text.trim())
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            unit_price: parse_field(&form, "unit_price", Money::parse)?,
            inventory: parse_field(&form, "inventory", |v| v.parse().ok())?,
            collection_id,
        };

        let id = self.repo.create_product(&product)?;
        info!(
            "event=product_create module=service status=ok product_id={} collection_id={}",
            id, collection_id
        );
        self.repo
            .get_product(id)?
            .ok_or(CatalogError::InconsistentState(
                "created product not found in read-back",
            ))
    }
}

fn required<'f>(form: &'f BTreeMap<String, String>, field: &'static str) -> Result<&'f str, CatalogError> {
    form.get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or(CatalogError::MissingField(field))
}

fn parse_field<T>(
    form: &BTreeMap<String, String>,
    field: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, CatalogError> {
    let value = required(form, field)?;
    parse(value).ok_or_else(|| CatalogError::InvalidField {
        field,
        value: value.to_string(),
    })
}
