// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use url::Url;

use crate::{CategoryId, Product};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateProductForm {
    pub title: String,
    pub price: String,
    pub description: String,
    pub category_id: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProductInput {
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category_id: CategoryId,
    pub image_url: String,
}

impl CreateProductForm {
    pub const FIELD_LABELS: [&'static str; 5] =
        ["title", "price", "description", "category id", "image url"];

    pub fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.title,
            1 => &self.price,
            2 => &self.description,
            3 => &self.category_id,
            _ => &self.image_url,
        }
    }

    pub fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.title,
            1 => &mut self.price,
            2 => &mut self.description,
            3 => &mut self.category_id,
            _ => &mut self.image_url,
        }
    }

    pub fn validate(&self) -> Result<CreateProductInput> {
        let title = self.title.trim();
        if title.is_empty() {
            bail!("product title is required -- enter a title and retry");
        }
        let description = self.description.trim();
        if description.is_empty() {
            bail!("product description is required -- enter a description and retry");
        }
        let image_url = self.image_url.trim();
        if image_url.is_empty() {
            bail!("image url is required -- enter an image url and retry");
        }
        if Url::parse(image_url).is_err() {
            bail!("image url must be a valid url");
        }
        Ok(CreateProductInput {
            title: title.to_owned(),
            price: parse_price(&self.price)?,
            description: description.to_owned(),
            category_id: parse_category_id(&self.category_id)?,
            image_url: image_url.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditProductForm {
    pub title: String,
    pub price: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditProductInput {
    pub title: String,
    pub price: f64,
    pub description: String,
}

impl EditProductForm {
    pub const FIELD_LABELS: [&'static str; 3] = ["title", "price", "description"];

    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price.to_string(),
            description: product.description.clone().unwrap_or_default(),
        }
    }

    pub fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.title,
            1 => &self.price,
            _ => &self.description,
        }
    }

    pub fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.title,
            1 => &mut self.price,
            _ => &mut self.description,
        }
    }

    pub fn validate(&self) -> Result<EditProductInput> {
        let title = self.title.trim();
        if title.is_empty() {
            bail!("product title is required -- enter a title and retry");
        }
        Ok(EditProductInput {
            title: title.to_owned(),
            price: parse_price(&self.price)?,
            description: self.description.trim().to_owned(),
        })
    }
}

fn parse_price(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("product price is required -- enter a price and retry");
    }
    let Ok(price) = raw.parse::<f64>() else {
        bail!("product price must be a positive number");
    };
    if !price.is_finite() || price <= 0.0 {
        bail!("product price must be a positive number");
    }
    Ok(price)
}

fn parse_category_id(raw: &str) -> Result<CategoryId> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("category id is required -- enter a category id and retry");
    }
    let Ok(id) = raw.parse::<i64>() else {
        bail!("category id must be an integer");
    };
    Ok(CategoryId::new(id))
}
