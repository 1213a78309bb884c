mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, id_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

async fn material_balance(app: &TestApp, material_id: i32) -> rust_decimal::Decimal {
    let (status, body) = app
        .request_json(Method::GET, &format!("/api/v1/materials/{material_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    decimal_field(&body, "current_balance_kg")
}

#[tokio::test]
async fn input_create_and_delete_restore_the_exact_balance() {
    let app = TestApp::new().await;
    let material_id = app.seed_material("LDPE Granulate", None).await;

    assert_eq!(material_balance(&app, material_id).await, dec!(0));

    let (status, input) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/materials/{material_id}/inputs"),
            Some(json!({ "quantity_kg": 200 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{input}");
    assert!(input["input_identifier"]
        .as_str()
        .expect("input identifier")
        .starts_with("INP-"));

    assert_eq!(material_balance(&app, material_id).await, dec!(200));

    let (status, _) = app
        .request_json(
            Method::DELETE,
            &format!("/api/v1/material-inputs/{}", id_of(&input)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(material_balance(&app, material_id).await, dec!(0));
}

#[tokio::test]
async fn mix_consumes_balances_and_rejects_shortfalls() {
    let app = TestApp::new().await;
    let material_id = app.seed_material("HDPE Granulate", None).await;

    app.request_json(
        Method::POST,
        &format!("/api/v1/materials/{material_id}/inputs"),
        Some(json!({ "quantity_kg": 200 })),
    )
    .await;

    let (status, mix) = app
        .request_json(
            Method::POST,
            "/api/v1/mixes",
            Some(json!({
                "items": [{ "material_id": material_id, "quantity_kg": 150 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{mix}");
    assert!(mix["mix"]["mix_identifier"]
        .as_str()
        .expect("mix identifier")
        .starts_with("MIX-"));
    assert_eq!(mix["items"].as_array().map(Vec::len), Some(1));

    assert_eq!(material_balance(&app, material_id).await, dec!(50));

    // 80 kg against a 50 kg balance: the whole mix is refused and nothing
    // is consumed.
    let (status, error) = app
        .request_json(
            Method::POST,
            "/api/v1/mixes",
            Some(json!({
                "items": [{ "material_id": material_id, "quantity_kg": 80 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{error}");
    let message = error["message"].as_str().expect("error message");
    assert!(
        message.contains("Insufficient inventory"),
        "unexpected message: {message}"
    );
    assert!(message.contains("HDPE Granulate"), "unexpected message: {message}");

    assert_eq!(material_balance(&app, material_id).await, dec!(50));
}

#[tokio::test]
async fn multi_item_mix_is_all_or_nothing() {
    let app = TestApp::new().await;
    let rich = app.seed_material("Masterbatch White", Some(100)).await;
    let poor = app.seed_material("Masterbatch Blue", Some(5)).await;

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/mixes",
            Some(json!({
                "items": [
                    { "material_id": rich, "quantity_kg": 40 },
                    { "material_id": poor, "quantity_kg": 10 }
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // The covered item is untouched by the failed mix.
    assert_eq!(material_balance(&app, rich).await, dec!(100));
    assert_eq!(material_balance(&app, poor).await, dec!(5));
}

#[tokio::test]
async fn mix_rejects_empty_and_non_positive_items() {
    let app = TestApp::new().await;
    let material_id = app.seed_material("Regrind", Some(100)).await;

    let (status, _) = app
        .request_json(Method::POST, "/api/v1/mixes", Some(json!({ "items": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/mixes",
            Some(json!({
                "items": [{ "material_id": material_id, "quantity_kg": 0 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(material_balance(&app, material_id).await, dec!(100));
}

#[tokio::test]
async fn material_with_recorded_inputs_cannot_be_deleted() {
    let app = TestApp::new().await;
    let material_id = app.seed_material("PP Homopolymer", None).await;

    let (_, input) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/materials/{material_id}/inputs"),
            Some(json!({ "quantity_kg": 25 })),
        )
        .await;

    let (status, _) = app
        .request_json(Method::DELETE, &format!("/api/v1/materials/{material_id}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.request_json(
        Method::DELETE,
        &format!("/api/v1/material-inputs/{}", id_of(&input)),
        None,
    )
    .await;

    let (status, _) = app
        .request_json(Method::DELETE, &format!("/api/v1/materials/{material_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn updates_cannot_touch_ledger_balances() {
    let app = TestApp::new().await;
    let material_id = app.seed_material("CaCO3 Filler", Some(75)).await;

    let (status, updated) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/materials/{material_id}"),
            Some(json!({
                "name": "CaCO3 Filler (fine)",
                "low_stock_threshold_kg": 10
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "CaCO3 Filler (fine)");
    assert_eq!(decimal_field(&updated, "current_balance_kg"), dec!(75));
    assert_eq!(decimal_field(&updated, "starting_balance_kg"), dec!(75));
}

#[tokio::test]
async fn low_stock_listing_reflects_thresholds() {
    let app = TestApp::new().await;

    let watched = app.seed_material("Antiblock Additive", Some(100)).await;
    app.request_json(
        Method::PUT,
        &format!("/api/v1/materials/{watched}"),
        Some(json!({ "low_stock_threshold_kg": 50 })),
    )
    .await;

    // Threshold zero means the material never appears in the listing.
    let unwatched = app.seed_material("Bulk Resin", Some(1)).await;

    let (status, body) = app
        .request_json(Method::GET, "/api/v1/materials/low-stock", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    // Consuming below the threshold surfaces the material.
    app.request_json(
        Method::POST,
        "/api/v1/mixes",
        Some(json!({
            "items": [{ "material_id": watched, "quantity_kg": 60 }]
        })),
    )
    .await;

    let (_, body) = app
        .request_json(Method::GET, "/api/v1/materials/low-stock", None)
        .await;
    let listed: Vec<i64> = body
        .as_array()
        .expect("low stock listing should be an array")
        .iter()
        .map(|m| m["id"].as_i64().expect("material id"))
        .collect();
    assert!(listed.contains(&(watched as i64)));
    assert!(!listed.contains(&(unwatched as i64)));
}

#[tokio::test]
async fn negative_and_zero_inputs_are_rejected() {
    let app = TestApp::new().await;
    let material_id = app.seed_material("EVA Copolymer", None).await;

    for quantity in [0, -10] {
        let (status, _) = app
            .request_json(
                Method::POST,
                &format!("/api/v1/materials/{material_id}/inputs"),
                Some(json!({ "quantity_kg": quantity })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/materials",
            Some(json!({ "name": "Bad Opening", "starting_balance_kg": -5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
