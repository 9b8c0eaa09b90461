#[cfg(test)]
mod http_flow_tests {
    use axum::body::Body;
    use axum::http::{header, HeaderMap, Method, Request, StatusCode};
    use axum::Router;
    use helpdesk::config::AppConfig;
    use helpdesk::drive::{MemoryObjectStore, ObjectStore};
    use helpdesk::{build_router, AppState};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const ADMIN_EMAIL: &str = "it-lead@example.com";
    const BOUNDARY: &str = "helpdesk-test-boundary";

    fn app() -> Router {
        let mut config = AppConfig::in_memory();
        config.auth.admin_emails = vec![ADMIN_EMAIL.to_string()];
        let storage: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new(
            config.drive.public_base_url.clone(),
            config.drive.bucket.clone(),
        ));
        let state = AppState::in_memory(config, storage).expect("state");
        build_router(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, headers, String::from_utf8_lossy(&bytes).to_string())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .expect("request")
    }

    fn authorized(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        }
    }

    fn location(headers: &HeaderMap) -> &str {
        headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    fn session_cookie(headers: &HeaderMap) -> String {
        headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
            .expect("session cookie")
    }

    async fn department_id(app: &Router, name: &str) -> String {
        let (status, _, body) = send(app, get("/api/departments")).await;
        assert_eq!(status, StatusCode::OK);
        let departments: Value = serde_json::from_str(&body).expect("json");
        departments
            .as_array()
            .expect("array")
            .iter()
            .find(|d| d["name"] == name)
            .and_then(|d| d["id"].as_str())
            .map(str::to_string)
            .expect("department")
    }

    /// Registers through the API and returns the bearer token.
    async fn register(app: &Router, name: &str, email: &str) -> (String, Value) {
        let department_id = department_id(app, "IT").await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "name": name,
                    "email": email,
                    "password": "secret1",
                    "confirmPassword": "secret1",
                    "departmentId": department_id,
                })
                .to_string(),
            ))
            .expect("request");
        let (status, _, body) = send(app, request).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let json: Value = serde_json::from_str(&body).expect("json");
        let token = json["session"]["token"].as_str().expect("token").to_string();
        (token, json["user"].clone())
    }

    fn multipart_ticket(token: &str, fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content_type, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"attachment\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/tickets")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    async fn create_ticket(app: &Router, token: &str) -> Value {
        let department_id = department_id(app, "IT").await;
        let request = multipart_ticket(
            token,
            &[
                ("subject", "Cannot access email"),
                ("description", "Outlook rejects my password since this morning"),
                ("priority", "high"),
                ("department_id", &department_id),
            ],
            None,
        );
        let (status, _, body) = send(app, request).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        serde_json::from_str(&body).expect("json")
    }

    #[tokio::test]
    async fn test_anonymous_pages_redirect_to_login() {
        let app = app();
        for path in ["/dashboard", "/my-tickets", "/new-ticket", "/admin/dashboard", "/settings"] {
            let (status, headers, _) = send(&app, get(path)).await;
            assert_eq!(status, StatusCode::SEE_OTHER, "{path}");
            assert_eq!(location(&headers), "/login", "{path}");
        }
    }

    #[tokio::test]
    async fn test_public_pages_render() {
        let app = app();
        let (status, _, body) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("IT Helpdesk"));

        let (status, _, body) = send(&app, get("/login")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Sign in"));

        let (status, _, body) = send(&app, get("/register")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Operations"));

        let (status, headers, _) = send(&app, get("/static/helpdesk.css")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(location(&headers).is_empty());

        let (status, _, body) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("healthy"));

        let (status, _, body) = send(&app, get("/no/such/page")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Page not found"));
    }

    #[tokio::test]
    async fn test_register_form_signs_in_and_gates_admin_screens() {
        let app = app();
        let department_id = department_id(&app, "HR").await;
        let form = format!(
            "name=Jamie+Rivera&email=jamie%40example.com&password=secret1&confirm_password=secret1&department_id={}",
            department_id
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .expect("request");
        let (status, headers, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location(&headers), "/dashboard");
        let cookie = session_cookie(&headers);

        let (status, _, body) = send(&app, get_with_cookie("/dashboard", &cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Welcome back, Jamie Rivera"));

        let (status, headers, _) = send(&app, get_with_cookie("/admin/tickets", &cookie)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location(&headers), "/dashboard");

        let (status, headers, _) = send(&app, get_with_cookie("/login", &cookie)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location(&headers), "/dashboard");
    }

    #[tokio::test]
    async fn test_register_form_password_mismatch() {
        let app = app();
        let department_id = department_id(&app, "HR").await;
        let form = format!(
            "name=Jamie&email=jamie%40example.com&password=secret1&confirm_password=secret2&department_id={}",
            department_id
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .expect("request");
        let (status, headers, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location(&headers).starts_with("/register?error=Passwords%20do%20not%20match"));
        assert!(headers.get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_api_gate_status_codes() {
        let app = app();
        let (status, _, body) = send(&app, get("/api/tickets")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("error"));

        let (token, _) = register(&app, "Jamie", "jamie@example.com").await;
        let (status, _, _) = send(&app, authorized(Method::GET, "/api/admin/stats", &token, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(&app, authorized(Method::GET, "/api/tickets", &token, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(&app, authorized(Method::GET, "/api/tickets", "not-a-token", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ticket_lifecycle_and_internal_notes() {
        let app = app();
        let (user_token, _) = register(&app, "Jamie", "jamie@example.com").await;
        let (admin_token, admin) = register(&app, "Ada Admin", ADMIN_EMAIL).await;
        assert_eq!(admin["role"], "admin");

        let ticket = create_ticket(&app, &user_token).await;
        assert_eq!(ticket["status"], "open");
        assert_eq!(ticket["comments"].as_array().map(Vec::len), Some(0));
        assert_eq!(ticket["attachments"].as_array().map(Vec::len), Some(0));
        let id = ticket["id"].as_str().expect("id").to_string();

        // Users cannot mark their comments internal.
        let (status, _, body) = send(
            &app,
            authorized(
                Method::POST,
                &format!("/api/tickets/{id}/comments"),
                &user_token,
                Some(json!({ "content": "Any update?", "isInternal": true })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let comment: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(comment["isInternal"], false);

        let (status, _, _) = send(
            &app,
            authorized(
                Method::POST,
                &format!("/api/tickets/{id}/comments"),
                &admin_token,
                Some(json!({ "content": "Mailbox is locked, resetting", "isInternal": true })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, _) = send(
            &app,
            authorized(
                Method::POST,
                &format!("/api/tickets/{id}/comments"),
                &admin_token,
                Some(json!({ "content": "   " })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, _, body) = send(&app, authorized(Method::GET, &format!("/api/tickets/{id}"), &user_token, None)).await;
        let seen_by_user: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(seen_by_user["comments"].as_array().map(Vec::len), Some(1));

        let (_, _, body) = send(&app, authorized(Method::GET, &format!("/api/tickets/{id}"), &admin_token, None)).await;
        let seen_by_admin: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(seen_by_admin["comments"].as_array().map(Vec::len), Some(2));

        let admin_id = admin["id"].as_str().expect("admin id");
        let (status, _, body) = send(
            &app,
            authorized(
                Method::PUT,
                &format!("/api/tickets/{id}/assign"),
                &admin_token,
                Some(json!({ "assigneeId": admin_id })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let assigned: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(assigned["status"], "in-progress");
        assert_eq!(assigned["assignedTo"], admin_id);

        for status_value in ["resolved", "closed"] {
            let (status, _, body) = send(
                &app,
                authorized(
                    Method::PUT,
                    &format!("/api/tickets/{id}/status"),
                    &admin_token,
                    Some(json!({ "status": status_value })),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            let updated: Value = serde_json::from_str(&body).expect("json");
            assert_eq!(updated["status"], status_value);
        }

        let (status, _, _) = send(
            &app,
            authorized(
                Method::PUT,
                &format!("/api/tickets/{id}/status"),
                &user_token,
                Some(json!({ "status": "open" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, _, body) = send(&app, authorized(Method::GET, "/api/admin/stats", &admin_token, None)).await;
        let stats: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(stats["total"], 1);
    }

    #[tokio::test]
    async fn test_other_users_tickets_are_hidden() {
        let app = app();
        let (owner_token, _) = register(&app, "Jamie", "jamie@example.com").await;
        let (other_token, _) = register(&app, "Sam", "sam@example.com").await;
        let ticket = create_ticket(&app, &owner_token).await;
        let id = ticket["id"].as_str().expect("id");

        let (status, _, _) = send(&app, authorized(Method::GET, &format!("/api/tickets/{id}"), &other_token, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, _, body) = send(&app, authorized(Method::GET, "/api/tickets", &other_token, None)).await;
        let list: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(list["total"], 0);

        let cookie = format!("helpdesk_session={}", other_token);
        let (status, _, body) = send(&app, get_with_cookie(&format!("/ticket/{id}"), &cookie)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Ticket not found"));
    }

    #[tokio::test]
    async fn test_ticket_form_rules_and_attachments() {
        let app = app();
        let (token, _) = register(&app, "Jamie", "jamie@example.com").await;
        let department_id = department_id(&app, "IT").await;

        let request = multipart_ticket(
            &token,
            &[
                ("subject", "Help"),
                ("description", "Outlook rejects my password since this morning"),
                ("priority", "high"),
                ("department_id", &department_id),
            ],
            None,
        );
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Subject must be at least 5 characters"));

        let request = multipart_ticket(
            &token,
            &[
                ("subject", "Screen flickers"),
                ("description", "The external monitor flickers every few seconds"),
                ("priority", "low"),
                ("department_id", &department_id),
            ],
            Some(("notes.txt", "text/plain", b"flicker starts after lunch")),
        );
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let ticket: Value = serde_json::from_str(&body).expect("json");
        let attachments = ticket["attachments"].as_array().expect("attachments");
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0]["fileName"], "notes.txt");
        assert!(attachments[0]["filePath"]
            .as_str()
            .expect("path")
            .starts_with("http://localhost:9000/ticket-attachments/"));

        let request = multipart_ticket(
            &token,
            &[
                ("subject", "Screen flickers"),
                ("description", "The external monitor flickers every few seconds"),
                ("priority", "low"),
                ("department_id", &department_id),
            ],
            Some(("clip.gif", "image/gif", b"GIF89a....")),
        );
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("File type must be JPEG, PNG, PDF, or TXT"));
    }

    #[tokio::test]
    async fn test_attachment_size_limit() {
        const LIMIT: usize = 5 * 1024 * 1024;
        let app = app();
        let (token, _) = register(&app, "Jamie", "jamie@example.com").await;
        let department_id = department_id(&app, "IT").await;
        let fields = [
            ("subject", "VPN drops every hour"),
            ("description", "The client log from this morning is attached below"),
            ("priority", "medium"),
            ("department_id", department_id.as_str()),
        ];

        let exact = vec![b'a'; LIMIT];
        let request = multipart_ticket(&token, &fields, Some(("vpn.txt", "text/plain", exact.as_slice())));
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let ticket: Value = serde_json::from_str(&body).expect("json");
        let attachments = ticket["attachments"].as_array().expect("attachments");
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0]["fileSize"], LIMIT as u64);

        for size in [LIMIT + 1, LIMIT + LIMIT / 5] {
            let oversized = vec![b'a'; size];
            let request =
                multipart_ticket(&token, &fields, Some(("vpn.txt", "text/plain", oversized.as_slice())));
            let (status, _, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{size}: {body}");
            assert!(body.contains("File size must be less than 5MB"), "{size}: {body}");
        }

        let (_, _, body) = send(&app, authorized(Method::GET, "/api/tickets", &token, None)).await;
        let list: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(list["total"], 1);
    }

    #[tokio::test]
    async fn test_assignment_targets_are_admins() {
        let app = app();
        let (admin_token, admin) = register(&app, "Ada Admin", ADMIN_EMAIL).await;
        let (user_token, user) = register(&app, "Jamie", "jamie@example.com").await;
        let ticket = create_ticket(&app, &user_token).await;
        let id = ticket["id"].as_str().expect("id");
        let user_id = user["id"].as_str().expect("user id");

        let (status, _, body) = send(
            &app,
            authorized(
                Method::PUT,
                &format!("/api/tickets/{id}/assign"),
                &admin_token,
                Some(json!({ "assigneeId": user_id })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Tickets can only be assigned to admins"));

        let cookie = format!("helpdesk_session={}", admin_token);
        let assign_form = |ticket_id: &str, assignee: &str| {
            Request::builder()
                .method(Method::POST)
                .uri(format!("/admin/ticket/{ticket_id}/assign"))
                .header(header::COOKIE, cookie.as_str())
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("assignee_id={assignee}")))
                .expect("request")
        };

        let unknown = uuid::Uuid::new_v4().to_string();
        let (status, headers, _) = send(&app, assign_form(id, &unknown)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(
            location(&headers).starts_with(&format!("/admin/ticket/{id}?error=Assignee%20")),
            "{}",
            location(&headers)
        );

        let (_, headers, _) = send(&app, assign_form(id, user_id)).await;
        assert!(location(&headers).starts_with(&format!("/admin/ticket/{id}?error=")));

        let missing = uuid::Uuid::new_v4().to_string();
        let admin_id = admin["id"].as_str().expect("admin id");
        let (_, headers, _) = send(&app, assign_form(&missing, admin_id)).await;
        assert_eq!(location(&headers), "/admin/tickets");

        let (_, headers, _) = send(&app, assign_form(id, admin_id)).await;
        assert!(location(&headers).starts_with(&format!("/admin/ticket/{id}?notice=")));
        let (_, _, body) = send(&app, authorized(Method::GET, &format!("/api/tickets/{id}"), &admin_token, None)).await;
        let assigned: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(assigned["status"], "in-progress");
    }

    #[tokio::test]
    async fn test_logout_revokes_session() {
        let app = app();
        let (token, _) = register(&app, "Jamie", "jamie@example.com").await;

        let (status, _, _) = send(&app, authorized(Method::GET, "/api/auth/me", &token, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, headers, _) = send(&app, authorized(Method::POST, "/api/auth/logout", &token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(session_cookie(&headers).ends_with('='));

        let (status, _, _) = send(&app, authorized(Method::GET, "/api/auth/me", &token, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = app();
        register(&app, "Jamie", "jamie@example.com").await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "jamie@example.com", "password": "wrong-one" }).to_string(),
            ))
            .expect("request");
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid email or password"));
    }
}
