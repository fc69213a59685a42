use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use petmatch_api::{AppStateInner, JwtVerifier, router};
use petmatch_db::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    router(AppStateInner::new(db, Arc::new(JwtVerifier::new(SECRET, None))))
}

fn token(sub: &str) -> String {
    let claims = json!({ "sub": sub, "exp": chrono::Utc::now().timestamp() + 3600 });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, who: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(sub) = who {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token(sub)));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn sign_up(app: &Router, sub: &str, name: &str) -> Value {
    let (status, user) = send(
        app,
        "POST",
        "/users/sync",
        Some(sub),
        Some(json!({ "email": format!("{sub}@example.com"), "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    user
}

fn listing(name: &str, kind: &str, age: u8) -> Value {
    json!({
        "name": name,
        "type": kind,
        "breed": "SRD",
        "age": age,
        "size": "medium",
        "gender": "female",
        "description": format!("{name} loves walks"),
        "images": ["https://img.example/a.jpg"],
        "activityLevel": "high",
        "goodWithKids": true,
        "goodWithPets": false,
        "isHouseTrained": true,
        "isCastrado": true,
        "location": "Recife, PE"
    })
}

async fn list_pet(app: &Router, owner: &str, body: Value) -> String {
    let (status, created) = send(app, "POST", "/pets", Some(owner), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    created["id"].as_str().unwrap().to_string()
}

fn names(pets: &Value) -> Vec<&str> {
    pets.as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect()
}

#[tokio::test]
async fn health_and_public_browsing_need_no_token() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, pets) = send(&app, "GET", "/pets", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pets, json!([]));
}

#[tokio::test]
async fn protected_routes_reject_missing_bad_and_unsynced_tokens() {
    let app = app();
    let (status, body) = send(&app, "GET", "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let req = Request::get("/users/me")
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::UNAUTHORIZED);

    // valid token, but the identity never synced
    let (status, _) = send(&app, "GET", "/pets/recommended", Some("idp|ghost"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_search_and_filters() {
    let app = app();
    sign_up(&app, "idp|ana", "Ana").await;
    let rex = list_pet(&app, "idp|ana", listing("Rex", "cachorro", 1)).await;
    list_pet(&app, "idp|ana", listing("Mia", "cat", 5)).await;
    list_pet(&app, "idp|ana", listing("Bob", "dog", 9)).await;

    let (_, all) = send(&app, "GET", "/pets", None, None).await;
    assert_eq!(names(&all), ["Rex", "Mia", "Bob"]);
    assert_eq!(all[0]["type"], "dog");
    assert_eq!(all[0]["isNeutered"], true);
    assert_eq!(all[0]["isAvailable"], true);

    let (_, dogs) = send(&app, "GET", "/pets/search?type=dog&size=all", None, None).await;
    assert_eq!(names(&dogs), ["Rex", "Bob"]);

    let (_, pups) = send(&app, "GET", "/pets/search?search=CACHORRO&age=filhote", None, None).await;
    assert_eq!(names(&pups), ["Rex"]);

    let (_, any_age) = send(&app, "GET", "/pets/search?age=ancient&goodWithPets=maybe", None, None).await;
    assert_eq!(names(&any_age), ["Rex", "Mia", "Bob"]);

    let (_, located) = send(&app, "GET", "/pets/search?location=recife", None, None).await;
    assert_eq!(located.as_array().unwrap().len(), 3);

    let (status, body) = send(&app, "GET", "/pets/search?type=dragon", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("dragon"));

    let (status, pet) = send(&app, "GET", &format!("/pets/{rex}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pet["name"], "Rex");

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/pets/{missing}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_listings_are_rejected() {
    let app = app();
    sign_up(&app, "idp|ana", "Ana").await;

    let mut no_images = listing("Rex", "dog", 2);
    no_images["images"] = json!([]);
    let (status, _) = send(&app, "POST", "/pets", Some("idp|ana"), Some(no_images)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/pets", Some("idp|ana"), Some(listing("Old", "dog", 31))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = send(&app, "GET", "/pets", None, None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn recommendations_follow_saved_preferences() {
    let app = app();
    sign_up(&app, "idp|ana", "Ana").await;
    sign_up(&app, "idp|bia", "Bia").await;
    list_pet(&app, "idp|ana", listing("Rex", "dog", 1)).await;
    list_pet(&app, "idp|ana", listing("Mia", "cat", 5)).await;
    list_pet(&app, "idp|bia", listing("Own", "cat", 5)).await;

    // no preferences: everything but own pets
    let (_, recs) = send(&app, "GET", "/pets/recommended", Some("idp|bia"), None).await;
    assert_eq!(names(&recs), ["Rex", "Mia"]);

    let (status, me) = send(
        &app,
        "PATCH",
        "/users/me",
        Some("idp|bia"),
        Some(json!({ "preferences": { "petType": ["gato"], "activityLevel": "all" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["preferences"]["petType"], json!(["cat"]));
    assert_eq!(me["preferences"]["activityLevel"], Value::Null);

    let (_, recs) = send(&app, "GET", "/pets/recommended", Some("idp|bia"), None).await;
    assert_eq!(names(&recs), ["Mia"]);

    // nothing matches birds, so recommendations fall back to every other pet
    send(&app, "PATCH", "/users/me", Some("idp|bia"), Some(json!({ "preferences": { "petType": ["bird"] } }))).await;
    let (_, recs) = send(&app, "GET", "/pets/recommended", Some("idp|bia"), None).await;
    assert_eq!(names(&recs), ["Rex", "Mia"]);

    let (status, _) = send(
        &app,
        "PATCH",
        "/users/me",
        Some("idp|bia"),
        Some(json!({ "preferences": { "size": ["huge"] } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_owner_edits_or_removes_a_pet() {
    let app = app();
    sign_up(&app, "idp|ana", "Ana").await;
    sign_up(&app, "idp|bia", "Bia").await;
    let rex = list_pet(&app, "idp|ana", listing("Rex", "dog", 1)).await;
    let uri = format!("/pets/{rex}");

    let (status, _) = send(&app, "PATCH", &uri, Some("idp|bia"), Some(json!({ "name": "Mine" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "PATCH", &uri, Some("idp|ana"), Some(json!({ "age": 40 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, pet) = send(&app, "PATCH", &uri, Some("idp|ana"), Some(json!({ "isAvailable": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pet["isAvailable"], false);
    let (_, all) = send(&app, "GET", "/pets", None, None).await;
    assert_eq!(all, json!([]));

    let (status, _) = send(&app, "DELETE", &uri, Some("idp|bia"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &uri, Some("idp|ana"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn adoption_flow_from_application_to_decision() {
    let app = app();
    let ana = sign_up(&app, "idp|ana", "Ana").await;
    sign_up(&app, "idp|bia", "Bia").await;
    sign_up(&app, "idp|caio", "Caio").await;
    let rex = list_pet(&app, "idp|ana", listing("Rex", "dog", 1)).await;

    let application = json!({
        "petId": rex,
        "applicationData": {
            "experience": "some",
            "livingSpace": "house-large-yard",
            "otherPets": "none",
            "reason": "Rex would love our garden"
        }
    });

    let (status, _) = send(&app, "POST", "/applications", Some("idp|ana"), Some(application.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, app_body) = send(&app, "POST", "/applications", Some("idp|bia"), Some(application.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app_body["status"], "pending");
    assert_eq!(app_body["ownerId"], ana["id"]);
    let app_id = app_body["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "POST", "/applications", Some("idp|bia"), Some(application)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, mine) = send(&app, "GET", &format!("/pets/{rex}/applications/mine"), Some("idp|bia"), None).await;
    assert_eq!(mine["id"], app_id.as_str());
    let (_, none) = send(&app, "GET", &format!("/pets/{rex}/applications/mine"), Some("idp|caio"), None).await;
    assert_eq!(none, Value::Null);

    let (_, received) = send(&app, "GET", "/applications/received", Some("idp|ana"), None).await;
    assert_eq!(received.as_array().unwrap().len(), 1);
    let (_, sent) = send(&app, "GET", "/applications/sent", Some("idp|bia"), None).await;
    assert_eq!(sent[0]["applicationData"]["reason"], "Rex would love our garden");

    // the owner was notified
    let (_, count) = send(&app, "GET", "/notifications/unread-count", Some("idp|ana"), None).await;
    assert_eq!(count["count"], 1);
    let (_, inbox) = send(&app, "GET", "/notifications", Some("idp|ana"), None).await;
    assert_eq!(inbox[0]["type"], "adoption_request");
    assert_eq!(inbox[0]["relatedId"], app_id.as_str());
    let note = inbox[0]["id"].as_str().unwrap();

    let (status, _) = send(&app, "POST", &format!("/notifications/{note}/read"), Some("idp|bia"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "POST", &format!("/notifications/{note}/read"), Some("idp|ana"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, count) = send(&app, "GET", "/notifications/unread-count", Some("idp|ana"), None).await;
    assert_eq!(count["count"], 0);

    // messaging between the two parties only
    let thread = format!("/applications/{app_id}/messages");
    let (status, _) = send(&app, "POST", &thread, Some("idp|bia"), Some(json!({ "content": "Oi!" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", &thread, Some("idp|ana"), Some(json!({ "content": "Olá" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", &thread, Some("idp|ana"), Some(json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "POST", &thread, Some("idp|caio"), Some(json!({ "content": "me too" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "GET", &thread, Some("idp|caio"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, messages) = send(&app, "GET", &thread, Some("idp|ana"), None).await;
    let contents: Vec<_> = messages.as_array().unwrap().iter().map(|m| m["content"].as_str().unwrap()).collect();
    assert_eq!(contents, ["Oi!", "Olá"]);

    // decision
    let status_uri = format!("/applications/{app_id}/status");
    let (status, _) = send(&app, "PATCH", &status_uri, Some("idp|bia"), Some(json!({ "status": "accepted" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, decided) = send(&app, "PATCH", &status_uri, Some("idp|ana"), Some(json!({ "status": "aceita" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["status"], "accepted");
    let (status, _) = send(&app, "PATCH", &status_uri, Some("idp|ana"), Some(json!({ "status": "rejected" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn closing_an_account_removes_its_footprint() {
    let app = app();
    sign_up(&app, "idp|ana", "Ana").await;
    let bia = sign_up(&app, "idp|bia", "Bia").await;
    let rex = list_pet(&app, "idp|ana", listing("Rex", "dog", 1)).await;
    let luna = list_pet(&app, "idp|bia", listing("Luna", "cat", 4)).await;

    let details = json!({
        "experience": "first-time",
        "livingSpace": "apartment",
        "otherPets": "cats",
        "reason": "Company"
    });
    send(&app, "POST", "/applications", Some("idp|bia"), Some(json!({ "petId": rex, "applicationData": details.clone() }))).await;
    send(&app, "POST", "/applications", Some("idp|ana"), Some(json!({ "petId": luna, "applicationData": details }))).await;

    let (status, report) = send(&app, "DELETE", "/users/me", Some("idp|ana"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({ "pets": 1, "applications": 2, "messages": 0, "notifications": 2 }));

    let (status, _) = send(&app, "GET", "/users/me", Some("idp|ana"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, all) = send(&app, "GET", "/pets", None, None).await;
    assert_eq!(names(&all), ["Luna"]);
    let (_, received) = send(&app, "GET", "/applications/received", Some("idp|bia"), None).await;
    assert_eq!(received, json!([]));
    let (_, inbox) = send(&app, "GET", "/notifications", Some("idp|bia"), None).await;
    assert_eq!(inbox, json!([]));

    let bia_id = bia["id"].as_str().unwrap();
    let (_, pets) = send(&app, "GET", &format!("/users/{bia_id}/pets"), Some("idp|bia"), None).await;
    assert_eq!(names(&pets), ["Luna"]);
}
