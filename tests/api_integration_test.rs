mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, id_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn health_and_status_endpoints_respond() {
    let app = TestApp::new().await;

    let (status, body) = app.request_json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app.request_json(Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn customer_crud_flow() {
    let app = TestApp::new().await;

    let (status, created) = app
        .request_json(
            Method::POST,
            "/api/v1/customers",
            Some(json!({
                "name": "Al Noor Packaging",
                "phone": "+20 100 555 0101",
                "address": "Industrial Zone 3"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let customer_id = id_of(&created);

    let (status, fetched) = app
        .request_json(Method::GET, &format!("/api/v1/customers/{customer_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Al Noor Packaging");

    let (status, updated) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/customers/{customer_id}"),
            Some(json!({ "phone": "+20 100 555 0202" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "+20 100 555 0202");
    assert_eq!(updated["name"], "Al Noor Packaging");

    let (status, listing) = app
        .request_json(Method::GET, "/api/v1/customers?page=1&per_page=10", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);

    let (status, _) = app
        .request_json(Method::DELETE, &format!("/api/v1/customers/{customer_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request_json(Method::GET, &format!("/api/v1/customers/{customer_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_with_orders_cannot_be_deleted() {
    let app = TestApp::new().await;

    let customer_id = app.seed_customer("Sticky Customer").await;
    app.seed_order(customer_id).await;

    let (status, _) = app
        .request_json(Method::DELETE, &format!("/api/v1/customers/{customer_id}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn customer_name_is_required() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_json(Method::POST, "/api/v1/customers", Some(json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_creation_generates_numbers_and_checks_the_customer() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Numbered Orders Co").await;

    let (status, order) = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "customer_id": customer_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(order["order_number"]
        .as_str()
        .expect("order number")
        .starts_with("ORD-"));
    assert_eq!(order["status"], "Pending");

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "customer_id": 999999 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Listing scoped to the customer.
    let (status, listing) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders?customer_id={customer_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
}

#[tokio::test]
async fn job_order_creation_initializes_aggregates() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Fresh Jobs Ltd").await;
    let order_id = app.seed_order(customer_id).await;

    let (status, job) = app
        .request_json(
            Method::POST,
            "/api/v1/job-orders",
            Some(json!({
                "order_id": order_id,
                "quantity": 25,
                "size_details": "40cm x 60cm, 30 micron"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{job}");
    assert_eq!(job["customer_id"], customer_id);
    assert_eq!(decimal_field(&job, "produced_quantity"), dec!(0));
    assert_eq!(decimal_field(&job, "waste_quantity"), dec!(0));
    assert_eq!(job["production_status"], "Not Started");
    assert_eq!(job["status"], "Pending");

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/job-orders",
            Some(json!({ "order_id": order_id, "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/job-orders",
            Some(json!({ "order_id": 999999, "quantity": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Listing scoped to the order.
    let (status, listing) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/job-orders?order_id={order_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
}

#[tokio::test]
async fn machines_validate_their_section() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/machines",
            Some(json!({ "name": "Mystery Machine", "section": "lamination" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, machine) = app
        .request_json(
            Method::POST,
            "/api/v1/machines",
            Some(json!({ "name": "Extruder A", "section": "extruding" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(machine["identifier"]
        .as_str()
        .expect("machine identifier")
        .starts_with("MCH-"));
    assert_eq!(machine["status"], "Operational");

    app.request_json(
        Method::POST,
        "/api/v1/machines",
        Some(json!({ "name": "Cutter B", "section": "cutting" })),
    )
    .await;

    let (status, listing) = app
        .request_json(Method::GET, "/api/v1/machines?section=extruding", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["machines"][0]["name"], "Extruder A");
}

#[tokio::test]
async fn maintenance_reports_follow_the_open_resolved_workflow() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/maintenance",
            Some(json!({ "machine_id": 999999, "description": "Phantom fault" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, machine) = app
        .request_json(
            Method::POST,
            "/api/v1/machines",
            Some(json!({ "name": "Printer C", "section": "printing" })),
        )
        .await;
    let machine_id = id_of(&machine);

    let (status, record) = app
        .request_json(
            Method::POST,
            "/api/v1/maintenance",
            Some(json!({
                "machine_id": machine_id,
                "description": "Registration drift on cylinder 2"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["status"], "Open");
    assert!(record["resolved_at"].is_null());
    let record_id = id_of(&record);

    let (status, resolved) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/maintenance/{record_id}/resolve"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "Resolved");
    assert!(!resolved["resolved_at"].is_null());

    // Resolving twice is an invalid transition.
    let (status, _) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/maintenance/{record_id}/resolve"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Listing scoped to the machine.
    let (status, listing) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/maintenance?machine_id={machine_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
}

#[tokio::test]
async fn deleting_an_order_cascades_to_its_job_orders() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Cascade Test Co").await;
    let order_id = app.seed_order(customer_id).await;
    let job_order_id = app.seed_job_order(order_id, 10).await;

    let (status, _) = app
        .request_json(Method::DELETE, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request_json(Method::GET, &format!("/api/v1/job-orders/{job_order_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_pagination_slices_results() {
    let app = TestApp::new().await;

    for i in 0..5 {
        app.seed_customer(&format!("Paginated Customer {i}")).await;
    }

    let (status, listing) = app
        .request_json(Method::GET, "/api/v1/customers?page=2&per_page=2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 5);
    assert_eq!(listing["page"], 2);
    assert_eq!(listing["customers"].as_array().map(Vec::len), Some(2));
}
