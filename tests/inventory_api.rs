//! End-to-end checks of the `/phone` routes and fault classification.

mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

async fn create(server: &TestServer, body: Value) -> (StatusCode, Value) {
    let response = server
        .client
        .post(server.url("/phone/add"))
        .json(&body)
        .send()
        .await
        .unwrap();
    (response.status(), response.json().await.unwrap())
}

async fn get(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let response = server.client.get(server.url(path)).send().await.unwrap();
    (response.status(), response.json().await.unwrap())
}

async fn seed(server: &TestServer, count: usize) {
    for i in 1..=count {
        let (status, _) = create(
            server,
            json!({"name": format!("Phone {i:02}"), "price": 100.0 + i as f64, "stock": i}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_second_page_of_twelve() {
    let server = common::spawn_server().await;
    seed(&server, 12).await;

    let (status, body) = get(&server, "/phone?page=2&pageSize=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["pagination"],
        json!({"page": 2, "pageSize": 5, "total": 12, "totalPages": 3})
    );
    let names: Vec<_> = body["data"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Phone 06", "Phone 07", "Phone 08", "Phone 09", "Phone 10"]);
}

#[tokio::test]
async fn test_default_pagination() {
    let server = common::spawn_server().await;
    seed(&server, 3).await;

    let (_, body) = get(&server, "/phone").await;
    assert_eq!(
        body["data"]["pagination"],
        json!({"page": 1, "pageSize": 10, "total": 3, "totalPages": 1})
    );
}

#[tokio::test]
async fn test_soft_deleted_rows_disappear() {
    let server = common::spawn_server().await;
    let (_, created) = create(&server, json!({"name": "Fold", "price": 1799.5, "stock": 2})).await;
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["isDeleted"], false);

    let response = server
        .client
        .delete(server.url(&format!("/phone/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["isDeleted"], true);

    let (_, listed) = get(&server, "/phone").await;
    assert_eq!(listed["data"]["pagination"]["total"], 0);
    assert_eq!(listed["data"]["data"], json!([]));

    let response = server
        .client
        .patch(server.url(&format!("/phone/{id}")))
        .json(&json!({"stock": 9}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_changes_only_given_fields() {
    let server = common::spawn_server().await;
    let (_, created) = create(&server, json!({"name": "Nova", "price": 299.0, "stock": 5})).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = server
        .client
        .patch(server.url(&format!("/phone/{id}")))
        .json(&json!({"stock": 3, "isDiscount": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["data"],
        json!({
            "id": id,
            "name": "Nova",
            "price": 299.0,
            "stock": 3,
            "isDiscount": true,
            "isDeleted": false
        })
    );
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let server = common::spawn_server().await;
    let response = server
        .client
        .patch(server.url("/phone/12345"))
        .json(&json!({"price": 1.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "No matching record found, please verify the query conditions."
        })
    );
}

#[tokio::test]
async fn test_duplicate_name_is_bad_request() {
    let server = common::spawn_server().await;
    let phone = json!({"name": "Edge", "price": 499.0, "stock": 1});
    assert_eq!(create(&server, phone.clone()).await.0, StatusCode::CREATED);

    let (status, body) = create(&server, phone).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": "Data already exists, please check the input."})
    );
}

#[tokio::test]
async fn test_unknown_argument_names_the_field() {
    let server = common::spawn_server().await;
    let (status, body) = create(
        &server,
        json!({"name": "X", "price": 1.0, "stock": 1, "foo": true}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Unrecognized parameter foo, please verify the parameter name."
    );
}

#[tokio::test]
async fn test_invalid_value_names_field_and_types() {
    let server = common::spawn_server().await;
    let (status, body) = create(&server, json!({"name": 42, "price": 1.0, "stock": 1})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("name"));
    assert!(message.contains("String"));
    assert!(message.contains("Int"));
}

#[tokio::test]
async fn test_invalid_page_parameters() {
    let server = common::spawn_server().await;

    let (status, body) = get(&server, "/phone?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "page must be at least 1");

    let (status, body) = get(&server, "/phone?pageSize=abc").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("pageSize"));
}

#[tokio::test]
async fn test_list_filters() {
    let server = common::spawn_server().await;
    seed(&server, 6).await;
    create(&server, json!({"name": "Other", "price": 50.0, "stock": 100})).await;

    let (_, body) = get(&server, "/phone?namePrefix=Phone&maxPrice=103.5").await;
    assert_eq!(body["data"]["pagination"]["total"], 3);

    let (_, body) = get(&server, "/phone?minStock=5").await;
    assert_eq!(body["data"]["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_unmatched_route_names_method_and_path() {
    let server = common::spawn_server().await;
    let response = server
        .client
        .delete(server.url("/phones/all"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"success": false, "message": "Cannot DELETE /phones/all"})
    );
}

#[tokio::test]
async fn test_health() {
    let server = common::spawn_server().await;
    let (status, body) = get(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"status": "ok"}));
}
