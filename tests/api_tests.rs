use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use digital_library::{
    api::{create_router, AppState},
    db::create_memory_pool,
};

const DEFAULT_COVER: &str = "/static/default_cover.jpg";

async fn create_test_server() -> TestServer {
    let pool = create_memory_pool().await.unwrap();
    let state = AppState::offline(pool, DEFAULT_COVER);
    let app = create_router(Arc::new(state));
    TestServer::new(app).unwrap()
}

async fn add_author(server: &TestServer, name: &str) -> i64 {
    let response = server
        .post("/api/authors")
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    created["id"].as_i64().unwrap()
}

async fn add_book(server: &TestServer, title: &str, author_id: i64, year: i32, rating: f64) -> i64 {
    let response = server
        .post("/api/books")
        .json(&json!({
            "title": title,
            "author_id": author_id,
            "publication_year": year,
            "rating": rating
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    created["id"].as_i64().unwrap()
}

fn titles(books: &[Value]) -> Vec<&str> {
    books.iter().map(|b| b["title"].as_str().unwrap()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_and_list_authors() {
    let server = create_test_server().await;

    let response = server
        .post("/api/authors")
        .json(&json!({
            "name": "  Ursula K. Le Guin ",
            "birth_date": "1929-10-21",
            "date_of_death": "2018-01-22"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["name"], "Ursula K. Le Guin");
    assert_eq!(created["birth_date"], "1929-10-21");

    add_author(&server, "Frank Herbert").await;

    let response = server.get("/api/authors").await;
    response.assert_status_ok();
    let authors: Vec<Value> = response.json();
    let names: Vec<&str> = authors.iter().map(|a| a["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Frank Herbert", "Ursula K. Le Guin"]);
}

#[tokio::test]
async fn test_duplicate_author_conflicts() {
    let server = create_test_server().await;
    add_author(&server, "Frank Herbert").await;

    let response = server
        .post("/api/authors")
        .json(&json!({ "name": "Frank Herbert" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "Author already exists.");
}

#[tokio::test]
async fn test_blank_author_rejected() {
    let server = create_test_server().await;

    let response = server
        .post("/api/authors")
        .json(&json!({ "name": "   " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Author name cannot be empty.");
}

#[tokio::test]
async fn test_book_validation() {
    let server = create_test_server().await;
    let author_id = add_author(&server, "Frank Herbert").await;

    // Missing title
    let response = server
        .post("/api/books")
        .json(&json!({ "title": "", "author_id": author_id }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Title and author are required.");

    // Rating out of range
    let response = server
        .post("/api/books")
        .json(&json!({ "title": "Dune", "author_id": author_id, "rating": 11 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Rating must be a number between 0 and 10.");

    // Unknown author
    let response = server
        .post("/api/books")
        .json(&json!({ "title": "Dune", "author_id": 999 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_and_sort_books() {
    let server = create_test_server().await;
    let herbert = add_author(&server, "Frank Herbert").await;
    let le_guin = add_author(&server, "Ursula K. Le Guin").await;

    add_book(&server, "Dune", herbert, 1965, 9.0).await;
    add_book(&server, "The Dispossessed", le_guin, 1974, 9.5).await;
    add_book(&server, "A Wizard of Earthsea", le_guin, 1968, 8.0).await;

    let response = server.get("/api/books").await;
    response.assert_status_ok();
    let books: Vec<Value> = response.json();
    assert_eq!(
        titles(&books),
        vec!["A Wizard of Earthsea", "Dune", "The Dispossessed"]
    );
    assert_eq!(books[1]["author_name"], "Frank Herbert");

    let response = server.get("/api/books?sort=year").await;
    let books: Vec<Value> = response.json();
    assert_eq!(
        titles(&books),
        vec!["The Dispossessed", "A Wizard of Earthsea", "Dune"]
    );

    let response = server.get("/api/books?sort=rating").await;
    let books: Vec<Value> = response.json();
    assert_eq!(books[0]["title"], "The Dispossessed");

    // Search matches author names too, case-insensitively
    let response = server.get("/api/books?q=le%20guin").await;
    let books: Vec<Value> = response.json();
    assert_eq!(books.len(), 2);

    let response = server.get("/api/books?q=DUNE").await;
    let books: Vec<Value> = response.json();
    assert_eq!(titles(&books), vec!["Dune"]);
}

#[tokio::test]
async fn test_deleting_last_book_removes_author() {
    let server = create_test_server().await;
    let herbert = add_author(&server, "Frank Herbert").await;
    let le_guin = add_author(&server, "Ursula K. Le Guin").await;

    let dune = add_book(&server, "Dune", herbert, 1965, 9.0).await;
    let earthsea = add_book(&server, "A Wizard of Earthsea", le_guin, 1968, 8.0).await;
    add_book(&server, "The Dispossessed", le_guin, 1974, 9.5).await;

    let response = server.delete(&format!("/api/books/{}", earthsea)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["author_removed"], false);

    let response = server.delete(&format!("/api/books/{}", dune)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Book deleted successfully.");
    assert_eq!(body["author_removed"], true);

    let authors: Vec<Value> = server.get("/api/authors").await.json();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0]["name"], "Ursula K. Le Guin");

    let response = server.delete(&format!("/api/books/{}", dune)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_author_cascades_to_books() {
    let server = create_test_server().await;
    let le_guin = add_author(&server, "Ursula K. Le Guin").await;
    add_book(&server, "The Dispossessed", le_guin, 1974, 9.5).await;

    let response = server.delete(&format!("/api/authors/{}", le_guin)).await;
    response.assert_status_ok();

    let books: Vec<Value> = server.get("/api/books").await.json();
    assert!(books.is_empty());

    let response = server.delete(&format!("/api/authors/{}", le_guin)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recommend_on_empty_library() {
    let server = create_test_server().await;

    let response = server.get("/recommend").await;
    response.assert_status_ok();
    let rec: Value = response.json();
    assert_eq!(rec["title"], "No books available");
    assert_eq!(rec["author"], "");
    assert_eq!(rec["cover_url"], DEFAULT_COVER);
    assert!(rec.get("reason").is_none());
}

#[tokio::test]
async fn test_recommend_picks_from_library() {
    let server = create_test_server().await;
    let herbert = add_author(&server, "Frank Herbert").await;
    add_book(&server, "Dune", herbert, 1965, 9.0).await;

    let response = server.get("/recommend").await;
    response.assert_status_ok();
    let rec: Value = response.json();
    assert_eq!(rec["title"], "Dune");
    assert_eq!(rec["author"], "Frank Herbert");
    assert_eq!(rec["cover_url"], DEFAULT_COVER);
    assert_eq!(rec["reason"], "Random suggestion from your library");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server().await;

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-42"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trace-42");

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}
