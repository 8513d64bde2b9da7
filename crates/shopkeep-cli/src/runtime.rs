// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use shopkeep_app::{Category, CategoryId, CreateProductInput, EditProductInput, Product, ProductId};
use shopkeep_catalog::{Client, NewProduct, ProductPatch};
use shopkeep_testkit::ProductFaker;
use shopkeep_tui::{CatalogEvent, CatalogRuntime, InternalEvent};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

/// Runtime backed by the remote catalog API. Each `spawn_*` override runs
/// the call on a worker thread so the event loop keeps polling while the
/// request is in flight; the clone shares the underlying connection pool.
pub struct HttpRuntime {
    client: Client,
    export_dir: PathBuf,
}

impl HttpRuntime {
    pub fn new(client: Client, export_dir: PathBuf) -> Self {
        Self { client, export_dir }
    }
}

impl CatalogRuntime for HttpRuntime {
    fn fetch_products(&mut self) -> Result<Vec<Product>> {
        Ok(self.client.list_all()?)
    }

    fn create_product(&mut self, input: &CreateProductInput) -> Result<Product> {
        Ok(self.client.create(&NewProduct::from(input))?)
    }

    fn update_product(&mut self, id: ProductId, input: &EditProductInput) -> Result<Product> {
        Ok(self.client.update(id, &ProductPatch::from(input))?)
    }

    fn export_csv(&mut self, file_name: &str, contents: &str) -> Result<PathBuf> {
        write_export(&self.export_dir, file_name, contents)
    }

    fn spawn_fetch(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let result = client.list_all().map_err(|error| error.to_string());
            let _ = tx.send(InternalEvent::Catalog(CatalogEvent::Fetched {
                request_id,
                result,
            }));
        });
        Ok(())
    }

    fn spawn_create(
        &mut self,
        request_id: u64,
        input: &CreateProductInput,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let product = NewProduct::from(input);
        thread::spawn(move || {
            let result = client.create(&product).map_err(|error| error.to_string());
            let _ = tx.send(InternalEvent::Catalog(CatalogEvent::Created {
                request_id,
                result,
            }));
        });
        Ok(())
    }

    fn spawn_update(
        &mut self,
        request_id: u64,
        id: ProductId,
        input: &EditProductInput,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let patch = ProductPatch::from(input);
        thread::spawn(move || {
            let result = client.update(id, &patch).map_err(|error| error.to_string());
            let _ = tx.send(InternalEvent::Catalog(CatalogEvent::Updated {
                request_id,
                result,
            }));
        });
        Ok(())
    }
}

/// Offline runtime for `--demo`: a seeded catalog held in memory, with
/// create/update mutating the local collection. The trait's inline spawn
/// defaults deliver resolutions immediately.
pub struct DemoRuntime {
    products: Vec<Product>,
    next_id: i64,
    export_dir: PathBuf,
}

impl DemoRuntime {
    pub fn with_seed(seed: u64, count: usize, export_dir: PathBuf) -> Self {
        let products = ProductFaker::new(seed).catalog(count);
        let next_id = count as i64 + 1;
        Self {
            products,
            next_id,
            export_dir,
        }
    }
}

impl CatalogRuntime for DemoRuntime {
    fn fetch_products(&mut self) -> Result<Vec<Product>> {
        Ok(self.products.clone())
    }

    fn create_product(&mut self, input: &CreateProductInput) -> Result<Product> {
        let product = Product {
            id: ProductId::new(self.next_id),
            title: input.title.clone(),
            price: input.price,
            description: Some(input.description.clone()),
            category: Some(demo_category(input.category_id)),
            images: vec![input.image_url.clone()],
        };
        self.next_id += 1;
        self.products.push(product.clone());
        Ok(product)
    }

    fn update_product(&mut self, id: ProductId, input: &EditProductInput) -> Result<Product> {
        let Some(product) = self.products.iter_mut().find(|product| product.id == id) else {
            bail!("product {} does not exist in the demo catalog", id.get());
        };
        product.title = input.title.clone();
        product.price = input.price;
        product.description = Some(input.description.clone());
        Ok(product.clone())
    }

    fn export_csv(&mut self, file_name: &str, contents: &str) -> Result<PathBuf> {
        write_export(&self.export_dir, file_name, contents)
    }
}

// The demo has no category lookup endpoint; ids wrap onto the seeded names.
fn demo_category(id: CategoryId) -> Category {
    let names = shopkeep_testkit::category_names();
    let index = (id.get() - 1).rem_euclid(names.len() as i64) as usize;
    Category {
        id,
        name: names[index].to_owned(),
    }
}

fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create export directory {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, contents).with_context(|| format!("write export {}", path.display()))?;
    Ok(path)
}
