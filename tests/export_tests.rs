//! Listing exports: CSV, XLSX and PDF downloads

mod common;

use axum::http::{StatusCode, header};
use common::{product_payload, spawn_app};
use serde_json::Value;

async fn seed_products(app: &common::TestApp) -> Vec<Value> {
    let mut products = Vec::new();
    for (name, code, price) in [
        ("Cimento CP-II", "CIM-01", 32.9),
        ("Areia Média", "ARE-01", 80.0),
        ("Brita 1", "BRI-01", 95.5),
    ] {
        products.push(app.create("products", product_payload(name, code, price)).await);
    }
    products
}

#[tokio::test]
async fn test_csv_export_is_the_default() {
    let app = spawn_app().await;
    seed_products(&app).await;

    let response = app
        .server
        .get("/products/export")
        .add_query_param("sort", "code")
        .authorization_bearer(&app.admin_token)
        .await;
    response.assert_status_ok();

    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "text/csv; charset=utf-8"
    );
    let disposition = response.header(header::CONTENT_DISPOSITION);
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"products-"));
    assert!(disposition.ends_with(".csv\""));

    let text = response.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Code,Name,Unit,Price (R$),Stock,Status");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("ARE-01,Areia Média,un,80.00,10.00,"));
    assert!(lines[3].starts_with("CIM-01,Cimento CP-II,un,32.90,"));
}

#[tokio::test]
async fn test_export_follows_search_and_ignores_pagination() {
    let app = spawn_app().await;
    seed_products(&app).await;

    let text = app
        .server
        .get("/products/export")
        .add_query_param("search", "areia")
        .add_query_param("page_size", 1)
        .add_query_param("page", 3)
        .authorization_bearer(&app.admin_token)
        .await
        .text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("Areia Média"));
}

#[tokio::test]
async fn test_export_of_a_selection() {
    let app = spawn_app().await;
    let products = seed_products(&app).await;
    let selection = format!(
        "{},{}",
        products[0]["id"].as_str().unwrap(),
        products[2]["id"].as_str().unwrap()
    );

    let text = app
        .server
        .get("/products/export")
        .add_query_param("ids", &selection)
        .add_query_param("sort", "name")
        .authorization_bearer(&app.admin_token)
        .await
        .text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Brita 1"));
    assert!(lines[2].contains("Cimento CP-II"));
}

#[tokio::test]
async fn test_xlsx_export() {
    let app = spawn_app().await;
    seed_products(&app).await;

    let response = app
        .server
        .get("/products/export")
        .add_query_param("format", "xlsx")
        .authorization_bearer(&app.admin_token)
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(response.as_bytes().starts_with(b"PK"));
}

#[tokio::test]
async fn test_pdf_export() {
    let app = spawn_app().await;
    seed_products(&app).await;

    let response = app
        .server
        .get("/products/export")
        .add_query_param("format", "pdf")
        .authorization_bearer(&app.admin_token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");
    assert!(response.as_bytes().starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_client_export_masks_documents() {
    let app = spawn_app().await;
    app.create(
        "clients",
        common::client_payload("Maria da Silva", "52998224725", "São Paulo"),
    )
    .await;

    let text = app
        .server
        .get("/clients/export")
        .authorization_bearer(&app.admin_token)
        .await
        .text();
    assert!(text.contains("529.982.247-25"));
    assert!(text.contains("(11) 98765-4321"));
    assert!(text.contains("01310-100"));
}

#[tokio::test]
async fn test_unknown_format_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .get("/products/export")
        .add_query_param("format", "docx")
        .authorization_bearer(&app.admin_token)
        .expect_failure()
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_QUERY");
}

#[tokio::test]
async fn test_export_requires_a_session() {
    let app = spawn_app().await;

    app.server
        .get("/products/export")
        .expect_failure()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
