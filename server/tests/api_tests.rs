//! End-to-end tests of the REST API: session handling, role checks and the
//! attendance workflow, run against an in-memory database.

use attendance_server::backend::config::AppConfig;
use attendance_server::backend::storage::DbConnection;
use attendance_server::{create_router, AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shared::Role;
use tower::util::ServiceExt; // for `oneshot`

struct TestApp {
    router: Router,
    state: AppState,
}

struct TestResponse {
    status: StatusCode,
    cookie: Option<String>,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

async fn setup_test_app() -> TestApp {
    setup_test_app_with(AppConfig::default()).await
}

/// State and router built from the same configuration, as `serve` does
async fn setup_test_app_with(config: AppConfig) -> TestApp {
    let db = DbConnection::init_test().await.expect("Failed to create test database");
    let state = AppState::new(db, &config);
    TestApp {
        router: create_router(state.clone(), &config).unwrap(),
        state,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            cookie,
            headers,
            body,
        }
    }

    async fn create_account(&self, username: &str, password: &str, role: Role) {
        self.state
            .user_service
            .bootstrap_account(username, password, role)
            .await
            .unwrap();
    }

    /// Log in and return the session cookie
    async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.cookie.expect("login sets a session cookie")
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = setup_test_app().await;

    let response = app.send(Method::GET, "/api/health/db", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_login() {
    let app = setup_test_app().await;

    let response = app.send(Method::GET, "/api/dashboard", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "unauthorized");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = setup_test_app().await;
    app.create_account("root", "s3cret", Role::Root).await;

    let response = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "username": "root", "password": "wrong" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "invalid_credentials");

    let unknown = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "username": "nobody", "password": "wrong" })),
            None,
        )
        .await;
    assert_eq!(unknown.json(), response.json());
}

#[tokio::test]
async fn test_me_and_logout() {
    let app = setup_test_app().await;
    app.create_account("ana", "pw", Role::Operative).await;
    let cookie = app.login("ana", "pw").await;

    let me = app.send(Method::GET, "/api/auth/me", None, Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["username"], "ana");
    assert_eq!(me.json()["role"], "OPERATIVE");

    let logout = app.send(Method::POST, "/api/auth/logout", None, Some(&cookie)).await;
    assert_eq!(logout.status, StatusCode::OK);

    let after = app.send(Method::GET, "/api/auth/me", None, Some(&cookie)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_second_login_supersedes_first_session() {
    let app = setup_test_app().await;
    app.create_account("ana", "pw", Role::Operative).await;

    let first = app.login("ana", "pw").await;
    let second = app.login("ana", "pw").await;

    let stale = app.send(Method::GET, "/api/dashboard", None, Some(&first)).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
    let notice = stale.json();
    assert_eq!(notice["reason"], "session_superseded");
    assert_eq!(notice["redirect"], "/login");

    let current = app.send(Method::GET, "/api/dashboard", None, Some(&second)).await;
    assert_eq!(current.status, StatusCode::OK);
    assert_eq!(current.json()["principal"]["username"], "ana");
}

#[tokio::test]
async fn test_idle_session_is_closed() {
    let config = AppConfig {
        idle_minutes: 0,
        ..AppConfig::default()
    };
    let app = setup_test_app_with(config).await;
    app.create_account("ana", "pw", Role::Operative).await;

    let cookie = app.login("ana", "pw").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let response = app.send(Method::GET, "/api/dashboard", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["reason"], "idle_timeout");
    assert_eq!(response.json()["redirect"], "/login");

    // The session was flushed, so the same cookie is now simply logged out
    let again = app.send(Method::GET, "/api/dashboard", None, Some(&cookie)).await;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);
    assert_eq!(again.json()["error"], "unauthorized");
}

#[tokio::test]
async fn test_operatives_cannot_reach_admin_routes() {
    let app = setup_test_app().await;
    app.create_account("ana", "pw", Role::Operative).await;
    let cookie = app.login("ana", "pw").await;

    for uri in ["/api/admin/users", "/api/admin/barrios", "/api/admin/services"] {
        let response = app.send(Method::GET, uri, None, Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(response.json()["error"], "forbidden");
    }
}

#[tokio::test]
async fn test_attendance_workflow() {
    let app = setup_test_app().await;
    app.create_account("root", "rootpw", Role::Root).await;
    app.create_account("op", "oppw", Role::Operative).await;
    let root = app.login("root", "rootpw").await;
    let op = app.login("op", "oppw").await;

    // Barrio and youth
    let barrio = app
        .send(Method::POST, "/api/admin/barrios", Some(json!({ "name": " Alaska " })), Some(&root))
        .await;
    assert_eq!(barrio.status, StatusCode::CREATED);
    let barrio_id = barrio.json()["barrio"]["id"].as_i64().unwrap();

    let youth = app
        .send(
            Method::POST,
            "/api/youth",
            Some(json!({
                "cedula": "1-1234-0567",
                "full_name": "Maria Rojas",
                "phone": "8888-7777",
                "barrio_id": barrio_id,
                "birth_date": "2008-09-15"
            })),
            Some(&op),
        )
        .await;
    assert_eq!(youth.status, StatusCode::CREATED);
    assert_eq!(youth.json()["youth"]["cedula"], "112340567");

    // Service, opened by an admin-level account
    let service = app
        .send(
            Method::POST,
            "/api/admin/services",
            Some(json!({ "title": "Culto", "service_date": "2024-05-03", "start_time": "19:00" })),
            Some(&root),
        )
        .await;
    assert_eq!(service.status, StatusCode::CREATED);
    let service_id = service.json()["service"]["id"].as_i64().unwrap();

    let closed = app
        .send(Method::POST, &format!("/api/attendance/{}", service_id), Some(json!({ "cedula": "112340567" })), Some(&op))
        .await;
    assert_eq!(closed.status, StatusCode::NOT_FOUND);

    let toggled = app
        .send(Method::POST, &format!("/api/admin/services/{}/toggle", service_id), None, Some(&root))
        .await;
    assert_eq!(toggled.json()["service"]["is_active"], true);

    // Attendance
    let registered = app
        .send(Method::POST, &format!("/api/attendance/{}", service_id), Some(json!({ "cedula": "112340567" })), Some(&op))
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.json()["entry"]["registered_by"], "op");

    let duplicate = app
        .send(Method::POST, &format!("/api/attendance/{}", service_id), Some(json!({ "cedula": "112340567" })), Some(&op))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let live = app
        .send(Method::GET, &format!("/api/attendance/{}?q=maria", service_id), None, Some(&op))
        .await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.json()["entries"].as_array().unwrap().len(), 1);
    assert_eq!(live.json()["candidates"][0]["full_name"], "Maria Rojas");

    // Stats only for managers
    let op_list = app.send(Method::GET, "/api/youth", None, Some(&op)).await;
    assert_eq!(op_list.json()["rows"][0]["streak"], Value::Null);

    let root_list = app.send(Method::GET, "/api/youth?q=8888", None, Some(&root)).await.json();
    let row = &root_list["rows"][0];
    assert_eq!(row["streak"], 1);
    assert_eq!(row["attendance_count"], 1);
    assert_eq!(row["cedula_display"], "1-1234-0567");

    // Report and export
    let report = app
        .send(Method::GET, &format!("/api/admin/attendance/{}", service_id), None, Some(&root))
        .await;
    assert_eq!(report.status, StatusCode::OK);
    assert_eq!(report.json()["entries"][0]["barrio_name"], "Alaska");

    let export = app
        .send(Method::GET, &format!("/api/admin/attendance/{}/export.csv", service_id), None, Some(&root))
        .await;
    assert_eq!(export.status, StatusCode::OK);
    assert!(export.headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    assert!(export.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("asistencia_2024-05-03.csv"));
    let csv = String::from_utf8(export.body.clone()).unwrap();
    assert!(csv.starts_with("cedula,nombre,contacto,barrio,whatsapp\n"));
    assert!(csv.contains("1-1234-0567,Maria Rojas,8888-7777,Alaska,https://wa.me/50688887777"));

    let op_export = app
        .send(Method::GET, &format!("/api/admin/attendance/{}/export.csv", service_id), None, Some(&op))
        .await;
    assert_eq!(op_export.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_root_manages_users() {
    let app = setup_test_app().await;
    app.create_account("root", "rootpw", Role::Root).await;
    let root = app.login("root", "rootpw").await;

    let created = app
        .send(
            Method::POST,
            "/api/admin/users",
            Some(json!({ "username": "ana", "role": "ADMIN", "password": "pw" })),
            Some(&root),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let ana_id = created.json()["user"]["id"].as_i64().unwrap();
    assert!(created.json()["user"].get("password_hash").is_none());

    let duplicate = app
        .send(
            Method::POST,
            "/api/admin/users",
            Some(json!({ "username": "ana", "role": "ADMIN", "password": "pw" })),
            Some(&root),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    // Deactivating ends ana's session
    let ana = app.login("ana", "pw").await;
    let toggled = app
        .send(Method::POST, &format!("/api/admin/users/{}/toggle", ana_id), None, Some(&root))
        .await;
    assert_eq!(toggled.json()["user"]["is_active"], false);
    let kicked = app.send(Method::GET, "/api/dashboard", None, Some(&ana)).await;
    assert_eq!(kicked.status, StatusCode::UNAUTHORIZED);

    let listed = app.send(Method::GET, "/api/admin/users", None, Some(&root)).await.json();
    let names: Vec<&str> = listed["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["root", "ana"]);

    let deleted = app
        .send(Method::DELETE, &format!("/api/admin/users/{}", ana_id), None, Some(&root))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
}
