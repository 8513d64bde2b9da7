// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use shopkeep_app::{CategoryId, ProductId};
use shopkeep_catalog::{CatalogError, Client, NewProduct, ProductPatch};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};

#[test]
fn unreachable_hosts_report_the_base_url() {
    let client = Client::new("http://127.0.0.1:1/api/v1", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .list_all()
        .expect_err("list should fail for unreachable endpoint");
    assert!(matches!(error, CatalogError::Network { .. }));
    let message = error.to_string();
    assert!(message.contains("http://127.0.0.1:1/api/v1"));
    assert!(message.contains("check the network"));
}

#[test]
fn list_all_decodes_the_product_collection() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api/v1", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/v1/products");
        let body = concat!(
            r#"[{"id":1,"title":"Lamp","price":29.99,"description":"Warm light","#,
            r#""category":{"id":3,"name":"Furniture"},"images":["https://img.example.com/lamp.jpg"]},"#,
            r#"{"id":2,"title":"Mug","price":4.5}]"#,
        );
        let response = Response::from_string(body)
            .with_status_code(200)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let products = client.list_all()?;
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].title, "Lamp");
    assert_eq!(products[0].category_name(), Some("Furniture"));
    assert_eq!(products[1].id, ProductId::new(2));
    assert_eq!(products[1].category_name(), None);
    assert!(products[1].images.is_empty());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn create_posts_the_catalog_payload() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api/v1", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/v1/products");
        assert_eq!(request.method(), &Method::Post);
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read request body");
        assert!(body.contains(r#""categoryId":4"#), "body: {body}");
        assert!(
            body.contains(r#""images":["https://img.example.com/mug.jpg"]"#),
            "body: {body}",
        );

        let created = concat!(
            r#"{"id":201,"title":"Mug","price":4.5,"description":"Stoneware","#,
            r#""category":{"id":4,"name":"Miscellaneous"},"#,
            r#""images":["https://img.example.com/mug.jpg"]}"#,
        );
        let response = Response::from_string(created)
            .with_status_code(201)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let created = client.create(&NewProduct {
        title: "Mug".to_owned(),
        price: 4.5,
        description: "Stoneware".to_owned(),
        category_id: CategoryId::new(4),
        images: vec!["https://img.example.com/mug.jpg".to_owned()],
    })?;
    assert_eq!(created.id, ProductId::new(201));
    assert_eq!(created.category_name(), Some("Miscellaneous"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn update_puts_to_the_product_path() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api/v1", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/v1/products/7");
        assert_eq!(request.method(), &Method::Put);
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read request body");
        assert!(body.contains(r#""price":12.5"#), "body: {body}");
        assert!(!body.contains("images"), "body: {body}");

        let updated = r#"{"id":7,"title":"Brass Lamp","price":12.5,"description":"Rewired"}"#;
        let response = Response::from_string(updated)
            .with_status_code(200)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let updated = client.update(
        ProductId::new(7),
        &ProductPatch {
            title: "Brass Lamp".to_owned(),
            price: 12.5,
            description: "Rewired".to_owned(),
        },
    )?;
    assert_eq!(updated.title, "Brass Lamp");
    assert_eq!(updated.price, 12.5);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn rejections_surface_the_joined_validation_messages() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api/v1", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let body = r#"{"message":["title is required","price must be positive"]}"#;
        let response = Response::from_string(body)
            .with_status_code(400)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .create(&NewProduct {
            title: String::new(),
            price: -5.0,
            description: String::new(),
            category_id: CategoryId::new(1),
            images: Vec::new(),
        })
        .expect_err("server rejection should surface");

    match error {
        CatalogError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "title is required, price must be positive");
        }
        other => panic!("unexpected error variant: {other}"),
    }

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn malformed_success_bodies_are_decode_errors() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api/v1", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(r#"{"not":"a product list"}"#)
            .with_status_code(200)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .list_all()
        .expect_err("schema mismatch should surface");
    assert!(matches!(error, CatalogError::Decode { .. }));

    handle.join().expect("server thread should join");
    Ok(())
}
