// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use shopkeep_app::{CategoryId, CreateProductInput, EditProductInput, Product, ProductId};

pub const DEFAULT_BASE_URL: &str = "https://api.escuelajs.co/api/v1";

/// Failure taxonomy for catalog calls. `Network` is a transport-level
/// failure before any response arrived; `Api` is a non-2xx response with the
/// body already normalized into one display string; `Decode` is a 2xx body
/// that did not match the expected schema. Nothing is retried.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot reach {url} -- check the network and catalog.base_url ({source})")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("catalog rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("decode catalog response: {source}")]
    Decode {
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub title: String,
    pub price: f64,
    pub description: String,
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
    pub images: Vec<String>,
}

impl From<&CreateProductInput> for NewProduct {
    fn from(input: &CreateProductInput) -> Self {
        Self {
            title: input.title.clone(),
            price: input.price,
            description: input.description.clone(),
            category_id: input.category_id,
            images: vec![input.image_url.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPatch {
    pub title: String,
    pub price: f64,
    pub description: String,
}

impl From<&EditProductInput> for ProductPatch {
    fn from(input: &EditProductInput) -> Self {
        Self {
            title: input.title.clone(),
            price: input.price,
            description: input.description.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("catalog.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url).context("parse catalog.base_url")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("catalog.base_url must be an http(s) url");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the entire collection; the API has no pagination parameters.
    /// An empty vec comes back only when the server actually returned an
    /// empty collection.
    pub fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .http
            .get(format!("{}/products", self.base_url))
            .send()
            .map_err(|error| self.network_error(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(api_error(status, &body));
        }

        response
            .json()
            .map_err(|source| CatalogError::Decode { source })
    }

    pub fn create(&self, product: &NewProduct) -> Result<Product, CatalogError> {
        let response = self
            .http
            .post(format!("{}/products", self.base_url))
            .json(product)
            .send()
            .map_err(|error| self.network_error(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(api_error(status, &body));
        }

        response
            .json()
            .map_err(|source| CatalogError::Decode { source })
    }

    pub fn update(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, CatalogError> {
        let response = self
            .http
            .put(format!("{}/products/{}", self.base_url, id.get()))
            .json(patch)
            .send()
            .map_err(|error| self.network_error(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(api_error(status, &body));
        }

        response
            .json()
            .map_err(|source| CatalogError::Decode { source })
    }

    fn network_error(&self, source: reqwest::Error) -> CatalogError {
        CatalogError::Network {
            url: self.base_url.clone(),
            source,
        }
    }
}

fn api_error(status: StatusCode, body: &str) -> CatalogError {
    CatalogError::Api {
        status: status.as_u16(),
        message: normalize_error_body(status, body),
    }
}

// The API reports rejections as `{"message": "..."}` or
// `{"message": ["...", "..."]}`; list entries are joined with ", ". Short
// plain-text bodies pass through; anything else collapses to the status.
fn normalize_error_body(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body)
        && let Some(message) = envelope.message
    {
        let text = message.joined();
        if !text.is_empty() {
            return text;
        }
    }

    let trimmed = body.trim();
    if trimmed.len() < 100 && !trimmed.contains('{') && !trimmed.is_empty() {
        return trimmed.to_owned();
    }

    format!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    message: Option<ApiErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ApiErrorMessage {
    fn joined(&self) -> String {
        match self {
            Self::One(message) => message.clone(),
            Self::Many(messages) => messages.join(", "),
        }
    }
}
