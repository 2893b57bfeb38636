//! End-to-end HTTP flows through the full middleware stack

mod common;

use std::net::SocketAddr;

use common::TestApp;
use http::StatusCode;
use serde_json::json;
use shared::util::now_millis;
use siaf_server::ErrorCode;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn api_requires_a_token() {
    let app = TestApp::new().await;
    let (status, _) = app.send("GET", "/api/inventory", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("GET", "/api/inventory", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials_uniformly() {
    let app = TestApp::new().await;

    let (status, wrong_password) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "Incorrecta1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "nadie", "password": "Incorrecta1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["message"], unknown_user["message"]);
}

#[tokio::test]
async fn login_returns_token_and_profile() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin", "password": common::ADMIN_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap();
    let (status, me) = app.send("GET", "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "admin");
}

#[tokio::test]
async fn requisition_lifecycle_keeps_words_in_sync() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, created) = app
        .send(
            "POST",
            "/api/requisitions",
            Some(&token),
            Some(json!({
                "request_type": "transferencia",
                "amount": 2500.5,
                "payable_to": "Proveedora del Caribe",
                "concept": "Refacciones de aire acondicionado",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["amount_in_words"], "DOS MIL QUINIENTOS 50/100 MN");
    assert_eq!(created["status"], "pending");
    assert_eq!(created["department"], "SISTEMAS");
    assert_eq!(created["currency"], "MXN");
    assert!(
        created["requisition_code"]
            .as_str()
            .unwrap()
            .starts_with("REQ-")
    );
    let id = created["id"].as_str().unwrap().to_string();

    // A new amount brings new words
    let (status, updated) = app
        .send(
            "PUT",
            &format!("/api/requisitions/{id}"),
            Some(&token),
            Some(json!({ "amount": 21000 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["amount_in_words"], "VEINTIÚN MIL 00/100 MN");

    let (status, pdf) = app
        .send("GET", &format!("/api/requisitions/{id}/pdf"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pdf["pdf_data"]["title"], "Solicitud de TRANSFERENCIA");
    assert_eq!(pdf["pdf_data"]["hotel"], "BEACHSCAPE KIN HA VILLAS & SUITES");

    // Completing before approval is refused
    let (status, body) = app
        .send("PUT", &format!("/api/requisitions/{id}/complete"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::RequisitionNotApproved.code());

    let (status, approved) = app
        .send(
            "PUT",
            &format!("/api/requisitions/{id}/approve"),
            Some(&token),
            Some(json!({ "approved": true, "notes": "Autorizado" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert!(approved["approval_date"].as_i64().is_some());

    // Second approval finds nothing pending
    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/requisitions/{id}/approve"),
            Some(&token),
            Some(json!({ "approved": false })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No longer editable or deletable
    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/requisitions/{id}"),
            Some(&token),
            Some(json!({ "amount": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .send("DELETE", &format!("/api/requisitions/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, completed) = app
        .send("PUT", &format!("/api/requisitions/{id}/complete"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");

    let (status, stats) = app
        .send("GET", "/api/requisitions/stats/overview", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["totalAmount"], 21000.0);
}

#[tokio::test]
async fn requisition_amount_is_validated() {
    let app = TestApp::with_config(|config| {
        config.requisition_max_amount = rust_decimal::Decimal::new(50_000, 0);
    })
    .await;
    let token = app.admin_token().await;

    let base = json!({
        "request_type": "efectivo",
        "payable_to": "Caja chica",
        "concept": "Viáticos",
    });
    let with_amount = |amount: serde_json::Value| {
        let mut body = base.clone();
        body["amount"] = amount;
        body
    };

    let (status, _) = app
        .send("POST", "/api/requisitions", Some(&token), Some(with_amount(json!(-1))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            "POST",
            "/api/requisitions",
            Some(&token),
            Some(with_amount(json!(50_000.01))),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::RequisitionAmountExceedsLimit.code());

    let (status, body) = app
        .send("POST", "/api/requisitions", Some(&token), Some(with_amount(json!(100))))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amount_in_words"], "CIEN 00/100 MN");
}

#[tokio::test]
async fn regular_users_cannot_reach_admin_routes() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (_, token) = app.regular_user(&admin, "recepcion").await;

    for (method, uri) in [
        ("GET", "/api/audit-log"),
        ("GET", "/api/audit-log/verify"),
        ("GET", "/api/auth/users"),
        ("POST", "/api/system/backup"),
    ] {
        let (status, _) = app.send(method, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
    }

    // Day-to-day modules stay open
    let (status, _) = app.send("GET", "/api/incidents", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .send("GET", "/api/reports/dashboard", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn responsive_form_approval_hands_over_the_asset() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (user_id, _) = app.regular_user(&admin, "camarista").await;

    let (status, asset) = app
        .send(
            "POST",
            "/api/inventory",
            Some(&admin),
            Some(json!({ "asset_code": "LAP-001", "name": "Laptop recepción" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{asset}");
    let asset_id = asset["id"].as_str().unwrap().to_string();

    let (status, form) = app
        .send(
            "POST",
            "/api/responsive-forms",
            Some(&admin),
            Some(json!({
                "asset_id": asset_id,
                "new_responsible_id": user_id,
                "reason": "Asignación a nuevo turno",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{form}");
    assert_eq!(form["status"], "pending");
    let form_id = form["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/responsive-forms/{form_id}/approve"),
            Some(&admin),
            Some(json!({ "approved": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, asset) = app
        .send("GET", &format!("/api/inventory/{asset_id}"), Some(&admin), None)
        .await;
    assert_eq!(asset["responsible_user_id"], user_id.as_str());

    let (status, history) = app
        .send(
            "GET",
            &format!("/api/responsive-forms/asset/{asset_id}/history"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/responsive-forms/{form_id}/approve"),
            Some(&admin),
            Some(json!({ "approved": false })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audit_chain_verifies_after_activity() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, _) = app
        .send(
            "POST",
            "/api/clients",
            Some(&token),
            Some(json!({ "name": "Agencia Riviera" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .send(
            "POST",
            "/api/clients",
            Some(&token),
            Some(json!({ "name": "Agencia Riviera" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.settle_audit().await;

    let (status, list) = app
        .send("GET", "/api/audit-log?module=clients", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["action"], "client_created");

    let (status, verification) = app
        .send("GET", "/api/audit-log/verify", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verification["chain_intact"], true);
    assert!(verification["total_entries"].as_u64().unwrap() >= 2);
}

#[tokio::test]
async fn reports_require_user_for_activity() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, _) = app
        .send("GET", "/api/reports/user-activity", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            "GET",
            "/api/reports/inventory?date_from=2025-01-01&date_to=2025-12-31",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total"], 0);

    let (status, _) = app
        .send(
            "GET",
            "/api/reports/incidents?date_from=2025-12-31&date_to=2025-01-01",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_is_rate_limited() {
    let app = TestApp::with_config(|config| {
        config.login_rate = siaf_server::auth::RateLimitRule::new(2, 900);
    })
    .await;

    let attempt = json!({ "username": "admin", "password": "Incorrecta1" });
    for _ in 0..2 {
        let (status, _) = app
            .send("POST", "/api/auth/login", None, Some(attempt.clone()))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _) = app
        .send("POST", "/api/auth/login", None, Some(attempt))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn forwarded_header_does_not_reset_login_limit() {
    let app = TestApp::with_config(|config| {
        config.login_rate = siaf_server::auth::RateLimitRule::new(5, 900);
    })
    .await;
    let peer: SocketAddr = "203.0.113.50:51000".parse().unwrap();

    for i in 0..5 {
        let status = app
            .login_from(peer, &format!("10.1.1.{i}"), "admin", "Incorrecta1")
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let status = app
        .login_from(peer, "10.1.1.99", "admin", "Incorrecta1")
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn trusted_proxy_forwards_client_address() {
    let proxy: SocketAddr = "10.0.0.2:8443".parse().unwrap();
    let app = TestApp::with_config(|config| {
        config.login_rate = siaf_server::auth::RateLimitRule::new(1, 900);
        config.trusted_proxy = Some(proxy.ip());
    })
    .await;

    // Each forwarded client gets its own window behind the proxy
    for client in ["198.51.100.1", "198.51.100.2"] {
        let status = app
            .login_from(proxy, client, "admin", "Incorrecta1")
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let status = app
        .login_from(proxy, "198.51.100.1", "admin", "Incorrecta1")
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn malformed_bodies_get_the_error_envelope() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .post_raw(
            "/api/requisitions",
            &token,
            r#"{"request_type":"efectivo","amount":"abc","payable_to":"Caja","concept":"Viáticos"}"#,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed.code());
    assert!(body["details"]["body"].as_str().is_some());

    let (status, body) = app
        .post_raw(
            "/api/requisitions",
            &token,
            r#"{"request_type":"efectivo","amount":10,"payable_to":"Caja"}"#,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["code"].is_u64());

    let (status, body) = app.post_raw("/api/clients", &token, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    // Numeric strings are amounts too
    let (status, created) = app
        .post_raw(
            "/api/requisitions",
            &token,
            r#"{"request_type":"efectivo","amount":"1500.00","payable_to":"Caja","concept":"Viáticos"}"#,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["amount"], 1500.0);
    assert_eq!(created["amount_in_words"], "MIL QUINIENTOS 00/100 MN");
}

async fn create_requisition(app: &TestApp, token: &str, amount: f64) -> String {
    let (status, body) = app
        .send(
            "POST",
            "/api/requisitions",
            Some(token),
            Some(json!({
                "request_type": "pago_linea",
                "amount": amount,
                "payable_to": "Telecomunicaciones del Sureste",
                "concept": "Enlace de internet",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requisition_reports_sum_amounts() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let approved = create_requisition(&app, &token, 1200.5).await;
    create_requisition(&app, &token, 300.25).await;
    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/requisitions/{approved}/approve"),
            Some(&token),
            Some(json!({ "approved": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, report) = app
        .send("GET", "/api/reports/requisitions", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["data"].as_array().unwrap().len(), 2);
    assert_eq!(report["summary"]["total"], 2);
    assert_eq!(report["summary"]["totalAmount"], 1500.75);
    assert_eq!(report["summary"]["approvedValue"], 1200.5);
    assert_eq!(report["summary"]["byType"]["pago_linea"], 2);

    let (_, pending_only) = app
        .send(
            "GET",
            "/api/reports/requisitions?status=pending",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(pending_only["summary"]["total"], 1);
    assert_eq!(pending_only["summary"]["approvedValue"], 0.0);

    let (status, dashboard) = app
        .send("GET", "/api/reports/dashboard", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["pendingRequisitions"], 1);
    assert_eq!(dashboard["approvedRequisitionsValue"], 1200.5);

    let (_, me) = app.send("GET", "/api/auth/me", Some(&token), None).await;
    let user_id = me["id"].as_str().unwrap();
    let (status, activity) = app
        .send(
            "GET",
            &format!("/api/reports/user-activity?user_id={user_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{activity}");
    assert_eq!(activity["user_id"], user_id);
    assert_eq!(activity["activity"]["requisitions_made"], 2);
    assert_eq!(activity["activity"]["incidents_reported"], 0);
}

#[tokio::test]
async fn maintenance_upcoming_and_overdue_lists() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let now = now_millis();

    for (title, offset_days) in [("Revisión de UPS", 5), ("Limpieza de servidores", -3)] {
        let (status, body) = app
            .send(
                "POST",
                "/api/maintenance",
                Some(&token),
                Some(json!({
                    "title": title,
                    "type": "preventive",
                    "scheduled_date": now + offset_days * DAY_MS,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, upcoming) = app
        .send("GET", "/api/maintenance/upcoming/list?days=30", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let upcoming = upcoming.as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["title"], "Revisión de UPS");

    let (status, overdue) = app
        .send("GET", "/api/maintenance/overdue/list", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let overdue = overdue.as_array().unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["title"], "Limpieza de servidores");
}

#[tokio::test]
async fn backup_writes_an_export_file() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, info) = app
        .send("POST", "/api/system/backup", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{info}");

    let path = std::path::Path::new(info["path"].as_str().unwrap());
    assert!(path.starts_with(app.state.config.backups_dir()));
    let file_name = info["file_name"].as_str().unwrap();
    assert!(file_name.starts_with("backup_") && file_name.ends_with(".surql"));

    let size = std::fs::metadata(path).unwrap().len();
    assert!(size > 0);
    assert_eq!(info["size_bytes"], size);
}
