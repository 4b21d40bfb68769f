//! 商品 API 集成测试（归属与角色校验）

use axum::http::StatusCode;
use marketplace_api::repository::ListingRepository;
use serde_json::{json, Value};
use uuid::Uuid;

mod common;
use common::{body_json, create_test_app, empty_request, json_request, TestApp};

fn sample_listing() -> Value {
    json!({
        "name": "Standing desk",
        "price": 4500.0,
        "seller": "Office Depot",
        "sellerPhone": "0911222333",
        "place": "Addis Ababa",
        "quality": "good",
        "color": "black",
        "category": "furniture",
        "curved": false,
        "multifunctional": true
    })
}

async fn add_listing(app: &TestApp, token: &str, body: Value) -> Uuid {
    let response = app
        .send(json_request("POST", "/api/items/add", Some(token), body))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    json["data"]["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_add_and_list_listings() {
    let app = create_test_app();
    let token = app.register_and_login("Owner", "owner@example.com", None).await;

    let id = add_listing(&app, &token, sample_listing()).await;

    let response = app.send(empty_request("GET", "/api/items", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id.to_string());
    assert_eq!(items[0]["sellerPhone"], "0911222333");

    let owner = app.state.jwt_service.validate_access_token(&token).unwrap();
    assert_eq!(items[0]["addedBy"], owner.sub);
}

#[tokio::test]
async fn test_add_listing_reports_missing_fields() {
    let app = create_test_app();
    let token = app.register_and_login("Owner", "owner@example.com", None).await;

    let response = app
        .send(json_request(
            "POST",
            "/api/items/add",
            Some(&token),
            json!({"name": "Chair", "price": 0}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    let message = json["error"]["message"].as_str().unwrap();
    assert!(message.contains("price"));
    assert!(message.contains("sellerPhone"));
    assert!(!message.contains("name"));
}

#[tokio::test]
async fn test_add_duplicate_listing_conflicts() {
    let app = create_test_app();
    let token = app.register_and_login("Owner", "owner@example.com", None).await;

    add_listing(&app, &token, sample_listing()).await;

    let response = app
        .send(json_request("POST", "/api/items/add", Some(&token), sample_listing()))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 颜色不同则不算重复
    let mut other_color = sample_listing();
    other_color["color"] = json!("white");
    add_listing(&app, &token, other_color).await;
}

#[tokio::test]
async fn test_listing_mutations_require_owner_or_admin() {
    let app = create_test_app();
    let owner = app.register_and_login("Owner", "owner@example.com", None).await;
    let other = app.register_and_login("Other", "other@example.com", None).await;
    let head = app.register_and_login("Head", "head@example.com", Some("head")).await;
    let admin = app.register_and_login("Admin", "admin@example.com", Some("admin")).await;

    let id = add_listing(&app, &owner, sample_listing()).await;
    let uri = format!("/api/items/{}", id);

    // 其他初级账户与主管都不能修改
    for token in [&other, &head] {
        let response = app
            .send(json_request("PUT", &uri, Some(token), json!({"price": 1.0})))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["error"]["kind"], "FORBIDDEN");

        let response = app.send(empty_request("DELETE", &uri, Some(token))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    let unchanged = app.listings.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(unchanged.price, 4500.0);

    // 所有者可以修改，addedBy 不可被覆盖
    let response = app
        .send(json_request(
            "PUT",
            &uri,
            Some(&owner),
            json!({"price": 4000.0, "addedBy": Uuid::new_v4().to_string()}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Item updated successfully");
    assert_eq!(json["data"]["price"], 4000.0);
    assert_eq!(json["data"]["addedBy"], unchanged.added_by.to_string());

    // 管理员可以修改和删除任何商品
    let response = app
        .send(json_request("PUT", &uri, Some(&admin), json!({"quality": "best"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["quality"], "best");

    let response = app.send(empty_request("DELETE", &uri, Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Item deleted successfully");

    assert!(app.listings.find_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_owner_can_delete_own_listing() {
    let app = create_test_app();
    let owner = app.register_and_login("Owner", "owner@example.com", None).await;

    let id = add_listing(&app, &owner, sample_listing()).await;

    let response = app
        .send(empty_request("DELETE", &format!("/api/items/{}", id), Some(&owner)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_listing_is_not_found() {
    let app = create_test_app();
    let token = app.register_and_login("Owner", "owner@example.com", None).await;

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/items/{}", Uuid::new_v4()),
            Some(&token),
            json!({"price": 1.0}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(empty_request("DELETE", "/api/items/not-a-uuid", Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_routes_require_authentication() {
    let app = create_test_app();

    let response = app.send(empty_request("GET", "/api/items", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(json_request("POST", "/api/items/add", None, sample_listing()))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_edit_cannot_blank_required_fields() {
    let app = create_test_app();
    let owner = app.register_and_login("Owner", "owner@example.com", None).await;
    let id = add_listing(&app, &owner, sample_listing()).await;

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/items/{}", id),
            Some(&owner),
            json!({"name": "", "seller": "   ", "place": "", "category": ""}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["kind"], "VALIDATION_ERROR");

    let stored = app.listings.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Standing desk");
    assert_eq!(stored.seller, "Office Depot");
}

#[tokio::test]
async fn test_edit_can_clear_color() {
    let app = create_test_app();
    let owner = app.register_and_login("Owner", "owner@example.com", None).await;
    let id = add_listing(&app, &owner, sample_listing()).await;
    let uri = format!("/api/items/{}", id);

    let response = app
        .send(json_request("PUT", &uri, Some(&owner), json!({"price": 4200.0})))
        .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["color"], "black");

    let response = app
        .send(json_request("PUT", &uri, Some(&owner), json!({"color": null})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["color"].is_null());
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = create_test_app();
    let token = app.register_and_login("Owner", "owner@example.com", None).await;

    let mut body = sample_listing();
    body["price"] = json!("cheap");
    let response = app
        .send(json_request("POST", "/api/items/add", Some(&token), body))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], 400);
    assert_eq!(json["error"]["kind"], "VALIDATION_ERROR");
    assert!(json["error"]["request_id"].is_string());

    let id = add_listing(&app, &token, sample_listing()).await;
    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/items/{}", id),
            Some(&token),
            json!({"curved": "yes"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["kind"], "VALIDATION_ERROR");
}
