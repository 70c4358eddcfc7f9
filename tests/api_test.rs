//! End-to-end tests for the dashboard API.
//!
//! Each test spins up the real Axum router on an ephemeral port over a
//! temporary copy of a small dataset, then drives it with `reqwest`.

use std::net::SocketAddr;
use std::path::PathBuf;

use kpidash::config::AppConfig;
use kpidash::db::{Dataset, Store};
use kpidash::AppState;
use reqwest::{header, multipart, Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

const ADMIN_EMAIL: &str = "admin@dashboard.test";
const ADMIN_PASS: &str = "Admin123!";
const MANAGER_EMAIL: &str = "manager@dashboard.test";
const MANAGER_PASS: &str = "Manager123!";

fn kpi(value: f64, previous: f64) -> Value {
    json!({ "value": value, "previousValue": previous, "changePercent": 0.0, "trend": "up" })
}

fn fixture() -> Value {
    json!({
        "stats": [{
            "id": "stats-30d",
            "period": "30d",
            "label": "Last 30 Days",
            "kpis": {
                "totalRevenue": kpi(1200.0, 1000.0),
                "totalUsers": kpi(500.0, 400.0),
                "orders": kpi(90.0, 80.0),
                "conversionRate": kpi(3.2, 3.0)
            }
        }],
        "revenue": [
            { "id": "r1", "period": "30d", "userType": "all",
              "data": [{ "label": "Week 1", "revenue": 700 }, { "label": "Week 2", "revenue": 500 }] },
            { "id": "r2", "period": "30d", "userType": "premium",
              "data": [{ "label": "Week 1", "revenue": 600 }, { "label": "Week 2", "revenue": 450 }] }
        ],
        "orders": [
            { "id": "o1", "period": "30d", "userType": "all",
              "data": [{ "label": "Week 1", "orders": 50 }] },
            { "id": "o2", "period": "30d", "userType": "premium",
              "data": [{ "label": "Week 1", "orders": 40 }] }
        ],
        "users": [
            { "id": "u1", "period": "30d", "distribution": [
                { "segment": "Free", "count": 300, "color": "#94a3b8" },
                { "segment": "Premium", "count": 150, "color": "#6366f1" },
                { "segment": "Enterprise", "count": 50, "color": "#0ea5e9" }
            ] }
        ],
        "traffic": [
            { "id": "t1", "period": "7d", "sources": [
                { "source": "Direct", "visitors": 1200, "percentage": 60.0 },
                { "source": "Email", "visitors": 800, "percentage": 40.0 }
            ] }
        ],
        "profiles": [
            { "id": "1", "name": "Ada Admin", "email": ADMIN_EMAIL, "password": ADMIN_PASS, "role": "ADMIN" },
            { "id": "2", "name": "Max Manager", "email": MANAGER_EMAIL, "password": MANAGER_PASS, "role": "MANAGER" }
        ]
    })
}

struct TestServer {
    base: String,
    dir: TempDir,
    data_path: PathBuf,
}

/// Spin up the full Axum app on a random port over a fresh dataset file.
async fn start_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("db.json");
    tokio::fs::write(&data_path, fixture().to_string()).await.unwrap();

    let config = AppConfig {
        data_path: data_path.clone(),
        public_dir: dir.path().join("public"),
        uploads_dir: dir.path().join("public/uploads"),
        jwt_secret: "test-jwt-secret-for-integration-tests-only".to_string(),
        ..AppConfig::default()
    };

    let store = Store::load(&config.data_path).await.unwrap();
    let app = kpidash::routes::router(AppState::new(store, config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    TestServer {
        base: format!("http://{addr}"),
        dir,
        data_path,
    }
}

fn client() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

/// Log in with a cookie-storing client and return it.
async fn login_as(base: &str, email: &str, password: &str) -> Client {
    let client = client();
    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    client
}

async fn get_json(client: &Client, url: String) -> Value {
    let resp = client.get(url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn health_endpoints() {
    let server = start_server().await;
    let client = client();

    let resp = client
        .get(format!("{}/health/live", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.text().await.unwrap(), "OK");

    let ready = get_json(&client, format!("{}/health/ready", server.base)).await;
    assert_eq!(ready["data"]["status"], "ok");
    assert_eq!(ready["data"]["dataset"]["profiles"], 2);
}

#[tokio::test]
async fn login_sets_cookie_and_me_reads_it() {
    let server = start_server().await;
    let client = client();

    let resp = client
        .post(format!("{}/api/auth/login", server.base))
        .json(&json!({ "email": MANAGER_EMAIL, "password": MANAGER_PASS, "redirect": "/admin/dashboard" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "MANAGER");
    // Admin pages are not a valid landing spot for a manager.
    assert_eq!(body["data"]["redirectTo"], "/manager/dashboard");

    let me = get_json(&client, format!("{}/api/auth/me", server.base)).await;
    assert_eq!(me["data"]["email"], MANAGER_EMAIL);
    assert!(me["data"].get("password").is_none());

    let resp = client
        .post(format!("{}/api/auth/logout", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/api/auth/me", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_input() {
    let server = start_server().await;
    let client = client();
    let url = format!("{}/api/auth/login", server.base);

    let resp = client
        .post(&url)
        .json(&json!({ "email": ADMIN_EMAIL }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(&url)
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Invalid email or password");

    let resp = client
        .post(&url)
        .json(&json!({ "email": ADMIN_EMAIL.to_uppercase(), "password": ADMIN_PASS }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn data_endpoints_require_session() {
    let server = start_server().await;
    let resp = client()
        .get(format!("{}/api/stats?period=30d", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stats_baseline_and_segments() {
    let server = start_server().await;
    let client = login_as(&server.base, ADMIN_EMAIL, ADMIN_PASS).await;
    let base = &server.base;

    let resp = client
        .get(format!("{base}/api/stats?period=30d"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let baseline: Value = resp.json().await.unwrap();
    assert_eq!(baseline, json!([fixture()["stats"][0]]));

    let all = get_json(&client, format!("{base}/api/stats?period=30d&userType=all")).await;
    assert_eq!(all, baseline);

    let everything = get_json(&client, format!("{base}/api/stats")).await;
    assert_eq!(everything, baseline);

    let revenue = get_json(&client, format!("{base}/api/revenue")).await;
    assert_eq!(revenue.as_array().unwrap().len(), 2);

    let missing = get_json(&client, format!("{base}/api/stats?period=12m")).await;
    assert_eq!(missing, json!([]));

    let premium = get_json(&client, format!("{base}/api/stats?period=30d&userType=premium")).await;
    let kpis = &premium[0]["kpis"];
    assert_eq!(premium[0]["id"], "stats-30d");
    assert_eq!(kpis["totalRevenue"]["value"], 1050.0);
    assert_eq!(kpis["totalRevenue"]["previousValue"], 1000.0);
    assert_eq!(kpis["totalRevenue"]["changePercent"], 5.0);
    assert_eq!(kpis["totalRevenue"]["trend"], "up");
    assert_eq!(kpis["orders"]["value"], 40.0);
    assert_eq!(kpis["orders"]["changePercent"], -50.0);
    assert_eq!(kpis["orders"]["trend"], "down");
    assert_eq!(kpis["totalUsers"]["value"], 150.0);
    assert_eq!(kpis["conversionRate"]["value"], 6.8);

    let shouted = get_json(&client, format!("{base}/api/stats?period=30d&userType=%20PREMIUM%20")).await;
    assert_eq!(shouted, premium);

    let vip = get_json(&client, format!("{base}/api/stats?period=30d&userType=vip")).await;
    assert_eq!(vip[0]["kpis"]["totalUsers"]["value"], 0.0);
    assert_eq!(vip[0]["kpis"]["conversionRate"]["value"], 3.2);

    let filtered = get_json(&client, format!("{base}/api/stats?period=7d&userType=free")).await;
    assert_eq!(filtered[0]["id"], "7d-free");
    assert_eq!(filtered[0]["label"], "Filtered 7d");
}

#[tokio::test]
async fn collection_filters() {
    let server = start_server().await;
    let client = login_as(&server.base, MANAGER_EMAIL, MANAGER_PASS).await;
    let base = &server.base;

    let revenue = get_json(&client, format!("{base}/api/revenue?period=30d&userType=all")).await;
    assert_eq!(revenue.as_array().unwrap().len(), 1);
    assert_eq!(revenue[0]["id"], "r1");

    let orders = get_json(&client, format!("{base}/api/orders?userType=premium")).await;
    assert_eq!(orders[0]["id"], "o2");

    let users = get_json(&client, format!("{base}/api/users?period=30d")).await;
    assert_eq!(users[0]["distribution"][1]["segment"], "Premium");

    let traffic = get_json(&client, format!("{base}/api/traffic?period=30d")).await;
    assert_eq!(traffic, json!([]));
}

#[tokio::test]
async fn csv_export_uses_role_prefix() {
    let server = start_server().await;
    let client = login_as(&server.base, MANAGER_EMAIL, MANAGER_PASS).await;

    let resp = client
        .get(format!("{}/api/export/traffic?period=7d", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"manager_traffic_report.csv\""
    );
    assert_eq!(
        resp.text().await.unwrap(),
        "Source,Sessions,DateRange\nDirect,1200,7d\nEmail,800,7d\n"
    );

    let resp = client
        .get(format!("{}/api/export/invoices", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profiles_listing_is_admin_only() {
    let server = start_server().await;

    let manager = login_as(&server.base, MANAGER_EMAIL, MANAGER_PASS).await;
    let resp = manager
        .get(format!("{}/api/profiles", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = login_as(&server.base, ADMIN_EMAIL, ADMIN_PASS).await;
    let managers = get_json(&admin, format!("{}/api/profiles?role=manager", server.base)).await;
    assert_eq!(managers.as_array().unwrap().len(), 1);
    assert_eq!(managers[0]["id"], "2");
    assert!(!managers.to_string().contains("password"));
}

#[tokio::test]
async fn profile_update_json_persists_to_disk() {
    let server = start_server().await;
    let client = login_as(&server.base, ADMIN_EMAIL, ADMIN_PASS).await;

    let resp = client
        .post(format!("{}/api/profiles/update", server.base))
        .json(&json!({ "name": "Ada <Lovelace>", "contactNumber": "+44 20 7946 0000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Profile updated");
    assert_eq!(body["data"]["name"], "Ada &lt;Lovelace&gt;");

    let raw = tokio::fs::read_to_string(&server.data_path).await.unwrap();
    let on_disk = Dataset::from_json(&raw).unwrap();
    let profile = on_disk.find_profile("1").unwrap();
    assert_eq!(profile.contact_number.as_deref(), Some("+44 20 7946 0000"));
    assert!(profile.password.starts_with("$argon2"));

    let resp = client
        .post(format!("{}/api/profiles/update", server.base))
        .json(&json!({ "name": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_update_multipart_avatar() {
    let server = start_server().await;
    let client = login_as(&server.base, MANAGER_EMAIL, MANAGER_PASS).await;
    let url = format!("{}/api/profiles/update", server.base);

    let gif = multipart::Part::bytes(b"GIF89a".to_vec())
        .file_name("a.gif")
        .mime_str("image/gif")
        .unwrap();
    let resp = client
        .post(&url)
        .multipart(multipart::Form::new().part("avatar", gif))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let mut png = Vec::new();
    image::DynamicImage::new_rgb8(8, 8)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let part = multipart::Part::bytes(png)
        .file_name("me.png")
        .mime_str("image/png")
        .unwrap();
    let form = multipart::Form::new()
        .text("name", "Max M.")
        .part("avatar", part);

    let resp = client.post(&url).multipart(form).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Max M.");

    let avatar = body["data"]["avatar"].as_str().unwrap();
    assert!(avatar.starts_with("/uploads/2-avatar-"));
    assert!(server
        .dir
        .path()
        .join("public")
        .join(avatar.trim_start_matches('/'))
        .exists());

    // Uploaded avatars are served back as static files.
    let resp = client
        .get(format!("{}{avatar}", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn access_gate_and_navigation() {
    let server = start_server().await;
    let anonymous = client();

    let decision = get_json(
        &anonymous,
        format!("{}/api/access/check?path=/manager/dashboard", server.base),
    )
    .await;
    assert_eq!(decision["data"]["action"], "redirect");
    assert_eq!(
        decision["data"]["location"],
        "/login?redirect=%2Fmanager%2Fdashboard"
    );

    let admin = login_as(&server.base, ADMIN_EMAIL, ADMIN_PASS).await;
    let decision = get_json(
        &admin,
        format!("{}/api/access/check?path=/login", server.base),
    )
    .await;
    assert_eq!(decision["data"]["location"], "/admin/dashboard");

    let decision = get_json(
        &admin,
        format!("{}/api/access/check?path=/admin/dashboard/orders", server.base),
    )
    .await;
    assert_eq!(decision["data"]["action"], "allow");

    let nav = get_json(&admin, format!("{}/api/access/navigation", server.base)).await;
    assert_eq!(nav["data"][1]["items"][0]["href"], "/admin/dashboard/revenue");
}

#[test]
fn shipped_seed_dataset_is_complete() {
    let dataset = Dataset::from_json(include_str!("../server/db.json")).unwrap();
    for period in ["7d", "30d", "12m"] {
        assert!(dataset.stats.iter().any(|s| s.period == period), "stats for {period}");
        assert!(dataset.users.iter().any(|u| u.period == period), "users for {period}");
        assert!(dataset.traffic.iter().any(|t| t.period == period), "traffic for {period}");
        for user_type in ["all", "free", "premium", "enterprise"] {
            assert!(dataset
                .revenue
                .iter()
                .any(|r| r.period == period && r.user_type == user_type));
            assert!(dataset
                .orders
                .iter()
                .any(|o| o.period == period && o.user_type == user_type));
        }
    }
    assert!(dataset.profiles.iter().any(|p| p.role == kpidash::models::user::Role::Admin));
    assert!(dataset.profiles.iter().any(|p| p.role == kpidash::models::user::Role::Manager));
}
