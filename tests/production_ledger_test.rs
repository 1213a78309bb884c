mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, id_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

/// Walks a job order through the full roll lifecycle and checks the derived
/// aggregates after every mutation.
#[tokio::test]
async fn roll_lifecycle_drives_job_order_aggregates() {
    let app = TestApp::new().await;

    let customer_id = app.seed_customer("Lifecycle Films").await;
    let order_id = app.seed_order(customer_id).await;
    let job_order_id = app.seed_job_order(order_id, 10).await;

    // A roll with extruded output but not yet received contributes nothing
    // to produced quantity.
    let (status, roll) = app
        .request_json(
            Method::POST,
            "/api/v1/rolls",
            Some(json!({ "job_order_id": job_order_id, "extruding_qty": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{roll}");
    let roll_id = id_of(&roll);

    let (status, job) = app
        .request_json(Method::GET, &format!("/api/v1/job-orders/{job_order_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&job, "produced_quantity"), dec!(0));
    assert_eq!(decimal_field(&job, "waste_quantity"), dec!(0));
    assert_eq!(job["production_status"], "Not Started");
    // The coarse status tracks extruded output only: 10 extruded >= 10 ordered.
    assert_eq!(job["status"], "Completed");

    // Receiving the roll with 7 kg cut: produced 7, waste 3, in progress.
    let (status, _) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/rolls/{roll_id}"),
            Some(json!({ "status": "Received", "cutting_qty": 7 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, job) = app
        .request_json(Method::GET, &format!("/api/v1/job-orders/{job_order_id}"), None)
        .await;
    assert_eq!(decimal_field(&job, "produced_quantity"), dec!(7));
    assert_eq!(decimal_field(&job, "waste_quantity"), dec!(3));
    assert_eq!(job["production_status"], "In Progress");

    // Cutting the full 10 kg completes the job order with zero waste.
    app.request_json(
        Method::PUT,
        &format!("/api/v1/rolls/{roll_id}"),
        Some(json!({ "cutting_qty": 10 })),
    )
    .await;

    let (_, job) = app
        .request_json(Method::GET, &format!("/api/v1/job-orders/{job_order_id}"), None)
        .await;
    assert_eq!(decimal_field(&job, "produced_quantity"), dec!(10));
    assert_eq!(decimal_field(&job, "waste_quantity"), dec!(0));
    assert_eq!(job["production_status"], "Completed");

    // Cutting beyond the extruded total: waste clamps at zero, never negative.
    app.request_json(
        Method::PUT,
        &format!("/api/v1/rolls/{roll_id}"),
        Some(json!({ "cutting_qty": 12 })),
    )
    .await;

    let (_, job) = app
        .request_json(Method::GET, &format!("/api/v1/job-orders/{job_order_id}"), None)
        .await;
    assert_eq!(decimal_field(&job, "produced_quantity"), dec!(12));
    assert_eq!(decimal_field(&job, "waste_quantity"), dec!(0));
    assert_eq!(job["production_status"], "Overproduced");

    // Deleting the roll returns the job order to a clean slate.
    let (status, _) = app
        .request_json(Method::DELETE, &format!("/api/v1/rolls/{roll_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, job) = app
        .request_json(Method::GET, &format!("/api/v1/job-orders/{job_order_id}"), None)
        .await;
    assert_eq!(decimal_field(&job, "produced_quantity"), dec!(0));
    assert_eq!(decimal_field(&job, "waste_quantity"), dec!(0));
    assert_eq!(job["production_status"], "Not Started");
}

#[tokio::test]
async fn only_received_rolls_count_toward_produced_quantity() {
    let app = TestApp::new().await;

    let customer_id = app.seed_customer("Selective Counting Co").await;
    let order_id = app.seed_order(customer_id).await;
    let job_order_id = app.seed_job_order(order_id, 20).await;

    let (_, received) = app
        .request_json(
            Method::POST,
            "/api/v1/rolls",
            Some(json!({
                "job_order_id": job_order_id,
                "extruding_qty": 8,
                "cutting_qty": 5
            })),
        )
        .await;
    app.request_json(
        Method::PUT,
        &format!("/api/v1/rolls/{}", id_of(&received)),
        Some(json!({ "status": "Received" })),
    )
    .await;

    // A pending roll with cut output stays out of the produced total.
    app.request_json(
        Method::POST,
        "/api/v1/rolls",
        Some(json!({
            "job_order_id": job_order_id,
            "extruding_qty": 6,
            "cutting_qty": 4
        })),
    )
    .await;

    let (_, job) = app
        .request_json(Method::GET, &format!("/api/v1/job-orders/{job_order_id}"), None)
        .await;
    assert_eq!(decimal_field(&job, "produced_quantity"), dec!(5));
    // Waste spans all rolls: 8 + 6 extruded minus 5 produced.
    assert_eq!(decimal_field(&job, "waste_quantity"), dec!(9));
    assert_eq!(job["production_status"], "In Progress");
}

#[tokio::test]
async fn job_order_waste_endpoint_reports_stored_aggregates() {
    let app = TestApp::new().await;

    let customer_id = app.seed_customer("Waste Reports Ltd").await;
    let order_id = app.seed_order(customer_id).await;
    let job_order_id = app.seed_job_order(order_id, 10).await;

    let (_, roll) = app
        .request_json(
            Method::POST,
            "/api/v1/rolls",
            Some(json!({ "job_order_id": job_order_id, "extruding_qty": 10 })),
        )
        .await;
    app.request_json(
        Method::PUT,
        &format!("/api/v1/rolls/{}", id_of(&roll)),
        Some(json!({ "status": "Received", "cutting_qty": 7 })),
    )
    .await;

    let (status, totals) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/job-orders/{job_order_id}/waste"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&totals, "quantity"), dec!(10));
    assert_eq!(decimal_field(&totals, "produced_quantity"), dec!(7));
    assert_eq!(decimal_field(&totals, "waste_quantity"), dec!(3));
    assert_eq!(totals["production_status"], "In Progress");

    let (status, _) = app
        .request_json(Method::GET, "/api/v1/job-orders/999999/waste", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn roll_waste_endpoint_clamps_at_zero() {
    let app = TestApp::new().await;

    let customer_id = app.seed_customer("Clamp Industries").await;
    let order_id = app.seed_order(customer_id).await;
    let job_order_id = app.seed_job_order(order_id, 100).await;

    let (_, roll) = app
        .request_json(
            Method::POST,
            "/api/v1/rolls",
            Some(json!({
                "job_order_id": job_order_id,
                "extruding_qty": 10,
                "cutting_qty": 7
            })),
        )
        .await;
    let roll_id = id_of(&roll);

    let (status, waste) = app
        .request_json(Method::GET, &format!("/api/v1/rolls/{roll_id}/waste"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&waste, "waste_qty"), dec!(3));

    // Cut exceeding extruded clamps the per-roll waste at zero.
    app.request_json(
        Method::PUT,
        &format!("/api/v1/rolls/{roll_id}"),
        Some(json!({ "cutting_qty": 12 })),
    )
    .await;
    let (_, waste) = app
        .request_json(Method::GET, &format!("/api/v1/rolls/{roll_id}/waste"), None)
        .await;
    assert_eq!(decimal_field(&waste, "waste_qty"), dec!(0));

    // Missing stage quantities count as zero.
    let (_, bare) = app
        .request_json(
            Method::POST,
            "/api/v1/rolls",
            Some(json!({ "job_order_id": job_order_id })),
        )
        .await;
    let (_, waste) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/rolls/{}/waste", id_of(&bare)),
            None,
        )
        .await;
    assert_eq!(decimal_field(&waste, "extruding_qty"), dec!(0));
    assert_eq!(decimal_field(&waste, "waste_qty"), dec!(0));
}

#[tokio::test]
async fn roll_numbers_are_assigned_sequentially_per_job_order() {
    let app = TestApp::new().await;

    let customer_id = app.seed_customer("Sequencer Inc").await;
    let order_id = app.seed_order(customer_id).await;
    let first_job = app.seed_job_order(order_id, 50).await;
    let second_job = app.seed_job_order(order_id, 50).await;

    for expected in 1..=3 {
        let (_, roll) = app
            .request_json(
                Method::POST,
                "/api/v1/rolls",
                Some(json!({ "job_order_id": first_job })),
            )
            .await;
        assert_eq!(roll["roll_number"], expected);
    }

    // Numbering is scoped to the job order, not global.
    let (_, roll) = app
        .request_json(
            Method::POST,
            "/api/v1/rolls",
            Some(json!({ "job_order_id": second_job })),
        )
        .await;
    assert_eq!(roll["roll_number"], 1);
}

#[tokio::test]
async fn negative_stage_quantities_are_rejected() {
    let app = TestApp::new().await;

    let customer_id = app.seed_customer("Strict Validation BV").await;
    let order_id = app.seed_order(customer_id).await;
    let job_order_id = app.seed_job_order(order_id, 10).await;

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/rolls",
            Some(json!({ "job_order_id": job_order_id, "extruding_qty": -1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, roll) = app
        .request_json(
            Method::POST,
            "/api/v1/rolls",
            Some(json!({ "job_order_id": job_order_id })),
        )
        .await;
    let (status, _) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/rolls/{}", id_of(&roll)),
            Some(json!({ "cutting_qty": -5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rolls_for_missing_job_order_are_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/rolls",
            Some(json!({ "job_order_id": 424242 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
