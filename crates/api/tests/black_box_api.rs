use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = andamio_api::app::build_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_structure(client: &reqwest::Client, base_url: &str, name: &str, stock: u32) -> String {
    let res = client
        .post(format!("{}/structures", base_url))
        .json(&json!({ "name": name, "stock": stock }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    created["id"].as_str().unwrap().to_string()
}

async fn create_project(client: &reqwest::Client, base_url: &str) -> String {
    let res = client
        .post(format!("{}/projects", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    created["id"].as_str().unwrap().to_string()
}

async fn add_line(
    client: &reqwest::Client,
    base_url: &str,
    project_id: &str,
    structure_id: &str,
    quantity: u32,
) -> reqwest::Response {
    client
        .post(format!("{}/projects/{}/lines", base_url, project_id))
        .json(&json!({ "structure_id": structure_id, "quantity": quantity }))
        .send()
        .await
        .unwrap()
}

async fn get_structure(
    client: &reqwest::Client,
    base_url: &str,
    structure_id: &str,
) -> serde_json::Value {
    let res = client
        .get(format!("{}/structures/{}", base_url, structure_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn full_lifecycle_reserve_dispatch_release() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Stock of 10 scaffolding frames.
    let structure_id = create_structure(&client, &srv.base_url, "Frame 2m", 10).await;

    // Draft project reserves nothing yet.
    let project_id = create_project(&client, &srv.base_url).await;
    let res = add_line(&client, &srv.base_url, &project_id, &structure_id, 6).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let line: serde_json::Value = res.json().await.unwrap();
    let line_id = line["id"].as_str().unwrap().to_string();

    let s = get_structure(&client, &srv.base_url, &structure_id).await;
    assert_eq!(s["available"], 10);
    assert_eq!(s["in_use"], 0);

    // Activation locks the reservation.
    let res = client
        .post(format!("{}/projects/{}/activate", srv.base_url, project_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let s = get_structure(&client, &srv.base_url, &structure_id).await;
    assert_eq!(s["available"], 4);
    assert_eq!(s["in_use"], 0);

    // Dispatch 4 of the 6 reserved units.
    let res = client
        .post(format!("{}/dispatches", srv.base_url))
        .json(&json!({
            "project_id": project_id,
            "first_name": "Juan",
            "last_name": "Pérez",
            "tax_id": "20-12345678-9",
            "license_plate": "AB123CD",
            "items": [{ "line_id": line_id, "quantity": 4 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let dispatch_id = created["id"].as_str().unwrap().to_string();

    let s = get_structure(&client, &srv.base_url, &structure_id).await;
    assert_eq!(s["available"], 4);
    assert_eq!(s["in_use"], 4);

    let res = client
        .get(format!("{}/projects/{}", srv.base_url, project_id))
        .send()
        .await
        .unwrap();
    let project: serde_json::Value = res.json().await.unwrap();
    assert_eq!(project["lines"][0]["dispatched_quantity"], 4);
    assert_eq!(project["lines"][0]["remaining"], 2);

    // Deleting the dispatch restores the pre-dispatch figures.
    let res = client
        .delete(format!("{}/dispatches/{}", srv.base_url, dispatch_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let s = get_structure(&client, &srv.base_url, &structure_id).await;
    assert_eq!(s["available"], 4);
    assert_eq!(s["in_use"], 0);

    // Deleting the project releases the reservation entirely.
    let res = client
        .delete(format!("{}/projects/{}", srv.base_url, project_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let s = get_structure(&client, &srv.base_url, &structure_id).await;
    assert_eq!(s["available"], 10);
    assert_eq!(s["in_use"], 0);
}

#[tokio::test]
async fn over_allocation_is_unprocessable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let structure_id = create_structure(&client, &srv.base_url, "Platform 1m", 5).await;
    let project_id = create_project(&client, &srv.base_url).await;

    let res = add_line(&client, &srv.base_url, &project_id, &structure_id, 8).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "over_allocation");
}

#[tokio::test]
async fn duplicate_line_for_same_structure_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let structure_id = create_structure(&client, &srv.base_url, "Guardrail", 20).await;
    let project_id = create_project(&client, &srv.base_url).await;

    let res = add_line(&client, &srv.base_url, &project_id, &structure_id, 5).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = add_line(&client, &srv.base_url, &project_id, &structure_id, 3).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_allocation");
}

#[tokio::test]
async fn dispatch_from_draft_project_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let structure_id = create_structure(&client, &srv.base_url, "Coupler", 50).await;
    let project_id = create_project(&client, &srv.base_url).await;
    let res = add_line(&client, &srv.base_url, &project_id, &structure_id, 10).await;
    let line: serde_json::Value = res.json().await.unwrap();
    let line_id = line["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/dispatches", srv.base_url))
        .json(&json!({
            "project_id": project_id,
            "first_name": "Ana",
            "last_name": "Gómez",
            "tax_id": "27-87654321-0",
            "license_plate": "XY987ZW",
            "items": [{ "line_id": line_id, "quantity": 1 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn shrinking_stock_below_commitments_fails() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let structure_id = create_structure(&client, &srv.base_url, "Base jack", 10).await;
    let project_id = create_project(&client, &srv.base_url).await;
    let res = add_line(&client, &srv.base_url, &project_id, &structure_id, 7).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    client
        .post(format!("{}/projects/{}/activate", srv.base_url, project_id))
        .send()
        .await
        .unwrap();

    let res = client
        .patch(format!("{}/structures/{}/stock", srv.base_url, structure_id))
        .json(&json!({ "stock": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "capacity_error");

    // Shrinking down to exactly the committed quantity is allowed.
    let res = client
        .patch(format!("{}/structures/{}/stock", srv.base_url, structure_id))
        .json(&json!({ "stock": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["available"], 0);
}

#[tokio::test]
async fn unknown_ids_map_to_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/projects/{}",
            srv.base_url,
            uuid::Uuid::now_v7()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/structures/not-a-uuid", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
