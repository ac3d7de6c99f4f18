#![allow(clippy::unwrap_used)]
// Integration tests for the legacy and v2 endpoint families using wiremock.

use std::sync::Arc;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use petal_api::legacy::LegacyPage;
use petal_api::v2::{
    InventoryOperation, InventoryQuery, NewProduct, OrderListBody, OrderStatus, PriceChange,
    ProductKind, ProductProperties, ProductQuery, SortOrder, StatusFlags,
};
use petal_api::{LegacyApi, MultipartPart, RequestExecutor, V2Api};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LegacyApi, V2Api) {
    let server = MockServer::start().await;
    let exec = Arc::new(RequestExecutor::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        Some(SecretString::from("tok".to_owned())),
    ));
    (server, LegacyApi::new(exec.clone()), V2Api::new(exec))
}

// ── Legacy ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_customers() {
    let (server, legacy, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": [
                {"ID": "1", "LOGIN": "anna", "NAME": "Анна", "LAST_NAME": "Петрова"},
                {"ID": 2, "LOGIN": "+77010000000", "PERSONAL_PHONE": "+77010000000"}
            ],
            "timestamp": "2024-03-12T10:00:00+05:00"
        })))
        .mount(&server)
        .await;

    let customers = legacy
        .list_customers(LegacyPage {
            limit: Some(20),
            offset: None,
        })
        .await
        .unwrap();

    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0].name.as_deref(), Some("Анна"));
    assert_eq!(customers[1].id, 2);
}

#[tokio::test]
async fn test_customer_orders_reads_unwrapped_body() {
    let (server, legacy, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/orders.php"))
        .and(query_param("CUSTOMER_ID", "469"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": [
                {"id": 10, "number": "A-10", "date": "12.03.2024 10:00:00", "total": 15000, "status_id": "F"},
                {"ID": "11", "PRICE": "9000", "DATE_INSERT": {"value": "13.03.2024 11:00:00"}}
            ],
            "total": 2
        })))
        .mount(&server)
        .await;

    let orders = legacy.customer_orders(469, 50).await.unwrap();

    assert_eq!(orders.total, Some(2));
    assert_eq!(orders.orders[0].total, Some(15_000.0));
    assert_eq!(orders.orders[1].id, 11);
    assert_eq!(orders.orders[1].total, Some(9_000.0));
}

#[tokio::test]
async fn test_product_list_unwraps_items() {
    let (server, legacy, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/product/list/"))
        .and(query_param("type", "vitrina"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"items": [
                {"id": 5, "created_at": "01.02.2024 09:15:00", "updated_at": "03.02.2024 12:00:00"},
                {"id": 6, "created_at": "00.00.0000 00:00:00", "updated_at": "04.02.2024 08:00:00"}
            ]}
        })))
        .mount(&server)
        .await;

    let query = ProductQuery {
        kind: Some(ProductKind::Vitrina),
        ..ProductQuery::default()
    };
    let items = legacy.product_list(&query).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].created_at.as_deref(), Some("00.00.0000 00:00:00"));
}

// ── v2 ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_customers_with_stats() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/with-stats/"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "20"))
        .and(query_param("only_with_orders", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": true,
            "data": {
                "customers": [{
                    "id": 469, "login": "+77011234567", "name": "Чингис Алекенов",
                    "phone": "+77011234567", "member_since": "2023-05-01",
                    "total_orders": 8, "completed_orders": 7, "pending_orders": 1,
                    "total_spent": 125000, "status": "vip", "average_check": 15625
                }],
                "pagination": {"total": null, "page": 2, "limit": 20, "pages": 3},
                "filters": {"only_with_orders": true}
            }
        })))
        .mount(&server)
        .await;

    let page = v2.customers_with_stats(2, 20, true).await.unwrap();

    assert_eq!(page.customers.len(), 1);
    assert_eq!(page.customers[0].total_orders, Some(8));
    assert_eq!(page.pagination.total, None);
    assert_eq!(page.pagination.pages, Some(3));
}

#[tokio::test]
async fn test_customer_detail_includes_orders() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/1/"))
        .and(query_param("include_orders", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "id": 1, "name": "Анна", "last_name": "Петрова",
                "total_orders": 12, "total_spent": 156000, "status": "vip", "is_active": true,
                "orders": [{"id": 77, "number": "77", "status": "delivered", "total": 13000, "currency": "KZT", "is_paid": true}]
            }
        })))
        .mount(&server)
        .await;

    let detail = v2.customer_detail(1).await.unwrap();

    assert_eq!(detail.orders.len(), 1);
    assert_eq!(detail.orders[0].currency.as_deref(), Some("KZT"));
    assert_eq!(detail.is_active, Some(true));
}

#[tokio::test]
async fn test_customer_orders_rest_alias() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/469/orders"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"id": 501, "date": "2024-09-01 15:20:00", "total": "25000", "status_id": "N"}
            ],
            "pagination": {"total": 8, "page": 1, "limit": 20, "pages": 1}
        })))
        .mount(&server)
        .await;

    let (orders, pagination) = v2.customer_orders(469, 1, 20).await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total, Some(25_000.0));
    assert_eq!(orders[0].status_id.as_deref(), Some("N"));
    assert_eq!(pagination.unwrap().total, Some(8));
}

#[tokio::test]
async fn test_list_products_returns_pagination() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/products"))
        .and(query_param("limit", "2"))
        .and(query_param("isAvailable", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"id": 1, "title": "Розы", "price": "18000", "isAvailable": true, "createdAt": "2024-02-01T09:15:00+05:00", "type": "catalog"},
                {"id": 2, "title": "Тюльпаны", "price": "12000", "isAvailable": true, "createdAt": null, "type": "catalog"}
            ],
            "pagination": {"total": 40, "limit": 2, "offset": 0, "hasMore": true}
        })))
        .mount(&server)
        .await;

    let query = ProductQuery {
        is_available: Some(true),
        limit: Some(2),
        ..ProductQuery::default()
    };
    let (products, pagination) = v2.list_products(&query).await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[1].created_at, None);
    assert_eq!(pagination.unwrap().has_more, Some(true));
}

#[tokio::test]
async fn test_product_detail() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/products/detail"))
        .and(query_param("id", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 9, "title": "Пионы", "createdAt": "2024-05-05T10:00:00+05:00", "isReady": true}
        })))
        .mount(&server)
        .await;

    let product = v2.product_detail(9).await.unwrap();

    assert_eq!(product.created_at.as_deref(), Some("2024-05-05T10:00:00+05:00"));
    assert_eq!(product.extra.get("isReady"), Some(&json!(true)));
}

#[tokio::test]
async fn test_update_product_status_posts_flags() {
    let (server, _, v2) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/product/update-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let flags = StatusFlags {
        active: Some(true),
        ..StatusFlags::default()
    };
    v2.update_product_status(4, flags).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({"id": 4, "active": "Y"}));
}

#[tokio::test]
async fn test_upload_images_renames_fields() {
    let (server, _, v2) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/uploads/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "urls": ["https://cdn.example.com/a.jpg"]
        })))
        .mount(&server)
        .await;

    let part = MultipartPart::file("photo", "a.jpg", Bytes::from_static(b"jpeg"));
    let uploaded = v2.upload_images(vec![part]).await.unwrap();

    assert_eq!(uploaded.urls, vec!["https://cdn.example.com/a.jpg".to_owned()]);
    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"files[]\""));
}

async fn posted_json(server: &MockServer) -> serde_json::Value {
    let requests = server.received_requests().await.unwrap();
    serde_json::from_slice(&requests.last().unwrap().body).unwrap()
}

// ── Customer search ─────────────────────────────────────────────────

#[tokio::test]
async fn test_search_customers_by_phone() {
    let (server, legacy, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/customers/"))
        .and(query_param("phone", "+77011234567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": [{"ID": "469", "NAME": "Чингис", "PERSONAL_PHONE": "+77011234567"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let found = legacy.search_customers_by_phone("+77011234567").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 469);
}

// ── Orders ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_orders_sends_backend_status_code() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/orders"))
        .and(query_param("status", "DE"))
        .and(query_param("limit", "30"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{
                "id": 5120,
                "number": "5120",
                "status": "in-transit",
                "deliveryCity": "Алматы",
                "paymentAmount": "25 000 ₸",
                "paymentStatus": "Оплачен",
                "executors": [{"name": "Айгерим"}]
            }],
            "pagination": {"total": 41, "limit": 30, "offset": 0, "hasMore": true}
        })))
        .mount(&server)
        .await;

    let (body, pagination) = v2
        .list_orders(30, 0, Some(OrderStatus::InTransit))
        .await
        .unwrap();

    let OrderListBody::Normalized(rows) = body else {
        panic!("expected normalized rows, got {body:?}");
    };
    assert_eq!(rows[0].executors[0].name.as_deref(), Some("Айгерим"));
    assert_eq!(pagination.unwrap().total, Some(41));
}

#[tokio::test]
async fn test_legacy_order_list_unwraps_orders() {
    let (server, legacy, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/order/order-list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"orders": [{"id": "77", "status_id": "N", "payed": "N"}]}
        })))
        .mount(&server)
        .await;

    let orders = legacy.order_list(30, 0).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status_id.as_deref(), Some("N"));
}

#[tokio::test]
async fn test_order_detail_with_and_without_wrapper() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/orders/detail/"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "id": 1,
                "status": "paid",
                "deliveryType": "pickup",
                "selectedProduct": {"id": 7, "title": "Пионы"},
                "additionalItems": [{"productId": 8, "productTitle": "Открытка", "quantity": 2}],
                "recipient": {"name": "Анна", "phone": "+77010000000"},
                "payment": {"amount": "25 000 ₸", "status": "paid"},
                "history": [{"date": "2024-03-12", "description": "Создан"}]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/orders/detail/"))
        .and(query_param("id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "anonymous": "Y"})))
        .mount(&server)
        .await;

    let wrapped = v2.order_detail(1).await.unwrap();
    assert_eq!(wrapped.selected_product.unwrap().id.as_deref(), Some("7"));
    assert_eq!(wrapped.additional_items[0].quantity, Some(2));
    assert_eq!(wrapped.history.len(), 1);

    let bare = v2.order_detail(2).await.unwrap();
    assert_eq!(bare.id, 2);
    assert!(bare.anonymous);
}

#[tokio::test]
async fn test_order_status_workflow_calls() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/order/allowed-statuses"))
        .and(query_param("id", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"id": 9, "current": "N", "allowed": ["PD", "AP"]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/order/change-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true, "data": {}})))
        .expect(2)
        .mount(&server)
        .await;

    let allowed = v2.allowed_statuses(9).await.unwrap();
    assert_eq!(allowed.current.as_deref(), Some("N"));
    assert_eq!(allowed.allowed, vec!["PD".to_owned(), "AP".to_owned()]);

    v2.change_order_status(9, OrderStatus::Paid, None).await.unwrap();
    assert_eq!(posted_json(&server).await, json!({"id": 9, "statusId": "PD"}));

    v2.change_order_status(9, OrderStatus::Accepted, Some("звонок клиенту"))
        .await
        .unwrap();
    assert_eq!(
        posted_json(&server).await,
        json!({"id": 9, "statusId": "AP", "comment": "звонок клиенту"})
    );
}

#[tokio::test]
async fn test_delete_order_is_not_retried() {
    let (server, _, v2) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/orders/delete"))
        .and(query_param("id", "9"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = v2.delete_order(9).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

// ── Inventory ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_inventory_forwards_filters() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/inventory/"))
        .and(query_param("limit", "20"))
        .and(query_param("search", "роза"))
        .and(query_param("sort_order", "desc"))
        .and(query_param("service", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{
                "id": 3, "name": "Роза Эквадор 60см", "cost": 900, "quantity": "120",
                "markup": 2.5, "location": "холодильник", "image": null, "images": null,
                "service": false, "flower": "roses", "deactivate": false
            }],
            "pagination": {"total": 1, "limit": 20, "offset": 0, "hasMore": false}
        })))
        .mount(&server)
        .await;

    let query = InventoryQuery {
        search: Some("роза".into()),
        service: Some(false),
        sort_order: Some(SortOrder::Desc),
        ..InventoryQuery::default()
    };
    let (items, pagination) = v2.list_inventory(&query).await.unwrap();

    assert_eq!(items[0].quantity, Some(120.0));
    assert_eq!(items[0].images, None);
    assert_eq!(pagination.unwrap().has_more, Some(false));
}

#[tokio::test]
async fn test_inventory_item_and_history() {
    let (server, _, v2) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/inventory/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 3, "name": "Эвкалипт", "flower": "eucalyptus"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/inventory/history/"))
        .and(query_param("id", "3"))
        .and(query_param("limit", "50"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"operation": "acceptance", "data": [{"id": 3, "name": "Эвкалипт", "quantity": 40}],
                 "date": "2024-03-10", "user": "Айгерим", "shopId": "17", "orderId": false},
                {"operation": "consumption", "data": [], "date": "2024-03-11",
                 "user": null, "shopId": "17", "orderId": "5120"}
            ],
            "pagination": {"total": 2, "limit": 50, "offset": 0, "hasMore": false}
        })))
        .mount(&server)
        .await;

    let item = v2.inventory_item(3).await.unwrap();
    assert_eq!(item.flower.as_deref(), Some("eucalyptus"));

    let (history, _) = v2.inventory_history(3, 50, 0).await.unwrap();
    assert_eq!(history[0].operation, InventoryOperation::Acceptance);
    assert_eq!(history[1].order_id.as_deref(), Some("5120"));
}

// ── Product writes ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_product_returns_new_id() {
    let (server, _, v2) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/product/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 901}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut product = NewProduct::new(ProductKind::Vitrina);
    product.price = Some(25_000.0);
    product.images = vec!["https://cdn.example.com/a.jpg".into()];
    let id = v2.create_product(&product).await.unwrap();

    assert_eq!(id, Some(901));
    assert_eq!(
        posted_json(&server).await,
        json!({"type": "vitrina", "price": 25000.0, "images": ["https://cdn.example.com/a.jpg"]})
    );
}

#[tokio::test]
async fn test_price_and_property_writes() {
    let (server, _, v2) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/product/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/product/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let change = PriceChange {
        price: None,
        percent: Some(15.0),
    };
    v2.set_product_price(4, change).await.unwrap();
    assert_eq!(posted_json(&server).await, json!({"id": 4, "percent": 15.0}));

    let props = ProductProperties {
        width: Some("40".into()),
        height: None,
    };
    v2.update_product_properties(4, &props).await.unwrap();
    assert_eq!(posted_json(&server).await, json!({"id": 4, "width": "40"}));
}

#[tokio::test]
async fn test_delete_product() {
    let (server, _, v2) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/products/delete"))
        .and(query_param("id", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    v2.delete_product(4).await.unwrap();
}

#[tokio::test]
async fn test_upload_video_uses_file_field() {
    let (server, _, v2) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/uploads/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "url": "https://cdn.example.com/v.mp4"
        })))
        .mount(&server)
        .await;

    let part = MultipartPart::file("video", "v.mp4", Bytes::from_static(b"mp4"));
    let uploaded = v2.upload_video(part).await.unwrap();

    assert_eq!(uploaded.url.as_deref(), Some("https://cdn.example.com/v.mp4"));
    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
}
