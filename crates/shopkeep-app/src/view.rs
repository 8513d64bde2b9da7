// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Product, ProductId};

pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/50";
pub const MISSING_CATEGORY_LABEL: &str = "N/A";
pub const MISSING_DESCRIPTION_TEXT: &str = "No description";

#[derive(Debug, Clone, PartialEq)]
pub struct RowDescriptor {
    pub id: ProductId,
    pub image_url: String,
    pub title: String,
    pub price: f64,
    pub category_name: String,
    pub description: String,
}

pub fn row_descriptors(products: &[Product]) -> Vec<RowDescriptor> {
    products.iter().map(row_descriptor).collect()
}

pub fn row_descriptor(product: &Product) -> RowDescriptor {
    RowDescriptor {
        id: product.id,
        image_url: sanitize_image_url(product.images.first().map(String::as_str)),
        title: product.title.clone(),
        price: product.price,
        category_name: product
            .category_name()
            .unwrap_or(MISSING_CATEGORY_LABEL)
            .to_owned(),
        description: match product.description.as_deref() {
            Some(text) if !text.is_empty() => text.to_owned(),
            _ => MISSING_DESCRIPTION_TEXT.to_owned(),
        },
    }
}

/// The first image URL sometimes arrives wrapped in stray quote/bracket
/// characters; those are stripped wherever they appear. A missing image, or
/// one that is nothing but wrapping, falls back to the placeholder.
pub fn sanitize_image_url(raw: Option<&str>) -> String {
    let cleaned = raw
        .map(|url| url.replace(['"', '[', ']'], ""))
        .unwrap_or_default();
    if cleaned.is_empty() {
        PLACEHOLDER_IMAGE_URL.to_owned()
    } else {
        cleaned
    }
}

pub fn page_status(page: usize, total_pages: usize, view_len: usize) -> String {
    format!("page {page} of {total_pages} (total {view_len} items)")
}

pub fn price_label(price: f64) -> String {
    format!("${price}")
}
