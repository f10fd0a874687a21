//! End-to-end flows through the full router: sign-up, cart, checkout,
//! payment confirmation, webhook and dashboard permissions.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use foa_server::auth::service::bootstrap_admin;
use foa_server::db::DocStore;
use foa_server::payment::{PaymentError, PaymentGateway, Verification};
use foa_server::{Config, ServerState, api};
use hmac::{Hmac, Mac};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sha2::Sha512;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@foa.test";
const ADMIN_PASSWORD: &str = "super-secret";

/// Reports every reference as paid with the amount set by the test
struct ScriptedGateway {
    amount_minor: Mutex<i64>,
}

impl ScriptedGateway {
    fn set_paid(&self, amount: i64) {
        *self.amount_minor.lock().unwrap() = amount;
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn verify(&self, reference: &str) -> Result<Verification, PaymentError> {
        Ok(Verification {
            reference: reference.to_string(),
            status: "success".into(),
            amount_minor: *self.amount_minor.lock().unwrap(),
            currency: "GHS".into(),
        })
    }

    fn public_key(&self) -> &str {
        "pk_test_scripted"
    }
}

struct TestApp {
    app: Router,
    gateway: Arc<ScriptedGateway>,
    config: Config,
    _dir: tempfile::TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::development(dir.path());
        let store = DocStore::open_in_memory().unwrap();
        bootstrap_admin(&store, ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();

        let gateway = Arc::new(ScriptedGateway {
            amount_minor: Mutex::new(0),
        });
        let state = ServerState::new(config.clone(), store, gateway.clone());
        Self {
            app: api::build_app(&state),
            gateway,
            config,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        dispatch(self.app.clone(), request).await
    }

    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn admin_token(&self) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/staff/login",
                None,
                Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn customer_token(&self, email: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({
                    "firstName": "Ama",
                    "lastName": "Mensah",
                    "email": email,
                    "password": "secret123",
                    "contact": "0240000000",
                    "address": "Legon Hall",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Food at 15.00 and an active location with a 7.50 fee
    async fn seed_catalog(&self, admin: &str) -> (String, String) {
        let (status, food) = self
            .call(
                "POST",
                "/api/admin/foods",
                Some(admin),
                Some(json!({ "name": "Jollof", "price": 15.0, "categories": [] })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{food}");

        let (status, location) = self
            .call(
                "POST",
                "/api/admin/locations",
                Some(admin),
                Some(json!({ "name": "Legon", "price": 7.5 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{location}");

        (
            food["id"].as_str().unwrap().to_string(),
            location["id"].as_str().unwrap().to_string(),
        )
    }
}

async fn dispatch(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

#[tokio::test]
async fn health_and_public_catalog_need_no_token() {
    let app = TestApp::new();

    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call("GET", "/api/foods", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = app.call("GET", "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn customers_cannot_reach_the_dashboard() {
    let app = TestApp::new();
    let customer = app.customer_token("ama@foa.test").await;

    let (status, body) = app.call("GET", "/api/admin/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2001);

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/staff/login",
            None,
            Some(json!({ "email": "ama@foa.test", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let app = TestApp::new();
    app.customer_token("kofi@foa.test").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "firstName": "Kofi",
                "lastName": "Boateng",
                "email": "KOFI@foa.test",
                "password": "secret123",
                "contact": "0550000000",
                "address": "Madina",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1006);
}

#[tokio::test]
async fn checkout_confirm_is_idempotent() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (food_id, location_id) = app.seed_catalog(&admin).await;
    let customer = app.customer_token("esi@foa.test").await;

    let (status, _) = app
        .call(
            "POST",
            "/api/cart",
            Some(&customer),
            Some(json!({ "foodId": food_id, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, cart) = app.call("GET", "/api/cart", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["subtotal"], 30.0);

    let (status, session) = app
        .call(
            "POST",
            "/api/checkout/initialize",
            Some(&customer),
            Some(json!({ "orderType": "delivery", "location": location_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{session}");
    assert_eq!(session["amountMinor"], 3750);
    assert_eq!(session["publicKey"], "pk_test_scripted");
    let reference = session["reference"].as_str().unwrap().to_string();

    // Underpaid: nothing is written
    app.gateway.set_paid(100);
    let (status, body) = app
        .call(
            "POST",
            "/api/checkout/confirm",
            Some(&customer),
            Some(json!({ "reference": reference })),
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], 5002);

    app.gateway.set_paid(3750);
    let (status, order) = app
        .call(
            "POST",
            "/api/checkout/confirm",
            Some(&customer),
            Some(json!({ "reference": reference })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{order}");
    assert_eq!(order["totalPrice"], 37.5);
    assert_eq!(order["orderType"], "delivery");

    let (status, again) = app
        .call(
            "POST",
            "/api/checkout/confirm",
            Some(&customer),
            Some(json!({ "reference": reference })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], order["id"]);

    let (_, cart) = app.call("GET", "/api/cart", Some(&customer), None).await;
    assert!(cart["lines"].as_array().unwrap().is_empty());

    let (_, page) = app.call("GET", "/api/me/orders?page=1", Some(&customer), None).await;
    assert_eq!(page["total"], 1);

    let (_, orders) = app.call("GET", "/api/admin/orders", Some(&admin), None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_requires_a_valid_signature() {
    let app = TestApp::new();
    let payload = json!({ "event": "charge.success", "data": { "reference": "FOA-missing" } }).to_string();

    let unsigned = Request::builder()
        .method("POST")
        .uri("/api/payments/paystack/webhook")
        .body(Body::from(payload.clone()))
        .unwrap();
    let (status, body) = app.send(unsigned).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5005);

    let forged = Request::builder()
        .method("POST")
        .uri("/api/payments/paystack/webhook")
        .header("x-paystack-signature", sign(payload.as_bytes(), "wrong-key"))
        .body(Body::from(payload.clone()))
        .unwrap();
    let (status, _) = app.send(forged).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Other events are acknowledged without touching orders
    let ignored = json!({ "event": "transfer.success", "data": {} }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/payments/paystack/webhook")
        .header(
            "x-paystack-signature",
            sign(ignored.as_bytes(), &app.config.paystack_secret_key),
        )
        .body(Body::from(ignored))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
}

#[tokio::test]
async fn webhook_settles_a_pending_checkout_once() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (food_id, _) = app.seed_catalog(&admin).await;
    let customer = app.customer_token("yaw@foa.test").await;

    app.call(
        "POST",
        "/api/cart",
        Some(&customer),
        Some(json!({ "foodId": food_id })),
    )
    .await;
    let (status, session) = app
        .call(
            "POST",
            "/api/checkout/initialize",
            Some(&customer),
            Some(json!({ "orderType": "pickup", "pickupTime": "13:30" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{session}");
    app.gateway.set_paid(session["amountMinor"].as_i64().unwrap());

    let payload = json!({
        "event": "charge.success",
        "data": { "reference": session["reference"] },
    })
    .to_string();
    let signature = sign(payload.as_bytes(), &app.config.paystack_secret_key);

    let mut order_ids = Vec::new();
    for _ in 0..2 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/payments/paystack/webhook")
            .header("x-paystack-signature", signature.as_str())
            .body(Body::from(payload.clone()))
            .unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        order_ids.push(body["orderId"].as_str().unwrap().to_string());
    }
    assert_eq!(order_ids[0], order_ids[1]);

    let (_, order) = app
        .call("GET", &format!("/api/admin/orders/{}", order_ids[0]), Some(&admin), None)
        .await;
    assert_eq!(order["orderType"], "pickup");
    assert_eq!(order["claimed"], false);
    assert_eq!(order["token"].as_str().unwrap().len(), 8);

    let (status, claimed) = app
        .call("POST", &format!("/api/admin/orders/{}/claim", order_ids[0]), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(claimed["claimed"], true);
}

#[tokio::test]
async fn customer_messages_reach_the_staff_inbox() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let customer = app.customer_token("akua@foa.test").await;

    let (status, _) = app
        .call(
            "POST",
            "/api/me/messages",
            Some(&customer),
            Some(json!({ "subject": "Late order", "content": "Still waiting" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, inbox) = app.call("GET", "/api/admin/messages/inbox", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let inbox = inbox.as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["email"], "akua@foa.test");

    let (_, unread) = app.call("GET", "/api/me/messages/unread", Some(&customer), None).await;
    assert_eq!(unread["count"], 0);
}

#[tokio::test]
async fn exports_reject_unknown_formats() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app.call("GET", "/api/admin/exports/orders/csv", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5);

    let request = Request::builder()
        .uri("/api/admin/exports/customers/xlsx")
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"customers.xlsx\""
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn confirm_racing_webhooks_yields_one_order() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (food_id, _) = app.seed_catalog(&admin).await;
    let customer = app.customer_token("kofi@foa.test").await;

    app.call(
        "POST",
        "/api/cart",
        Some(&customer),
        Some(json!({ "foodId": food_id, "quantity": 3 })),
    )
    .await;
    let (status, session) = app
        .call(
            "POST",
            "/api/checkout/initialize",
            Some(&customer),
            Some(json!({ "orderType": "pickup" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{session}");
    app.gateway.set_paid(session["amountMinor"].as_i64().unwrap());

    let payload = json!({
        "event": "charge.success",
        "data": { "reference": session["reference"] },
    })
    .to_string();
    let signature = sign(payload.as_bytes(), &app.config.paystack_secret_key);

    let mut tasks = tokio::task::JoinSet::new();
    let confirm = Request::builder()
        .method("POST")
        .uri("/api/checkout/confirm")
        .header(header::AUTHORIZATION, format!("Bearer {customer}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "reference": session["reference"] }).to_string()))
        .unwrap();
    tasks.spawn(dispatch(app.app.clone(), confirm));
    for _ in 0..3 {
        let webhook = Request::builder()
            .method("POST")
            .uri("/api/payments/paystack/webhook")
            .header("x-paystack-signature", signature.as_str())
            .body(Body::from(payload.clone()))
            .unwrap();
        tasks.spawn(dispatch(app.app.clone(), webhook));
    }

    let mut order_ids = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (status, body) = joined.unwrap();
        assert_eq!(status, StatusCode::OK, "{body}");
        let id = body.get("orderId").or_else(|| body.get("id")).and_then(Value::as_str).unwrap();
        order_ids.push(id.to_string());
    }
    order_ids.dedup();
    assert_eq!(order_ids.len(), 1);

    let (_, orders) = app.call("GET", "/api/admin/orders", Some(&admin), None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (_, counts) = app.call("GET", "/api/admin/foods/counts", Some(&admin), None).await;
    assert_eq!(counts[0]["foodId"], food_id);
    assert_eq!(counts[0]["count"], 3);

    let (_, cart) = app.call("GET", "/api/cart", Some(&customer), None).await;
    assert!(cart["lines"].as_array().unwrap().is_empty());
}
