//! Fake backend for the integration tests.
//!
//! Serves the REST endpoints the client talks to from an `actix-web` server bound to an
//! ephemeral port, with just enough behaviour to drive the session flows and services.

#![allow(dead_code)]

use actix_web::{http::header, web, HttpRequest, HttpResponse, HttpServer};
use buildforge::{config::Config, storage::MemoryStore, App};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SECRET: &[u8] = b"integration-test-secret";
pub const ENGINEER_EMAIL: &str = "engineer@example.com";
pub const CLIENT_EMAIL: &str = "client@example.com";
pub const PASSWORD: &str = "Password123!";
pub const VALID_OTP: &str = "123456";
/// Login with this email answers 400 with an array of validation messages.
pub const INVALID_FORM_EMAIL: &str = "not-an-email";
/// Login with this email answers 500 with an empty body.
pub const BROKEN_EMAIL: &str = "broken@example.com";
pub const RESET_REDIRECT_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mints a token for `sub` expiring `ttl_secs` from now (negative for an expired token).
pub fn mint_token(sub: &str, email: &str, ttl_secs: i64) -> String {
    mint_token_with(sub, email, ttl_secs, SECRET)
}

pub fn mint_token_with(sub: &str, email: &str, ttl_secs: i64, secret: &[u8]) -> String {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: sub.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .expect("Failed to mint test token")
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: Value,
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct Backend {
    accounts: Mutex<HashMap<String, Account>>,
    /// `Authorization` header of every authenticated-endpoint request, in order.
    pub authorizations: Mutex<Vec<Option<String>>>,
    pub uploads: Mutex<Vec<Upload>>,
    pub otp_requests: Mutex<Vec<String>>,
}

impl Backend {
    fn seeded() -> Self {
        let backend = Self::default();
        backend.add_account("u-1", ENGINEER_EMAIL, "site_engineer", "Sam", "Engineer");
        backend.add_account("u-2", CLIENT_EMAIL, "client", "Cleo", "Client");
        backend
    }

    fn add_account(&self, id: &str, email: &str, role: &str, first: &str, last: &str) -> Value {
        let user = json!({
            "id": id,
            "email": email,
            "role": role,
            "firstName": first,
            "lastName": last,
            "phone": "555-0100",
            "company": "BuildCo",
            "isActive": true
        });
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: PASSWORD.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    /// Deletes the account so its tokens stop resolving to a user.
    pub fn remove_account(&self, email: &str) {
        self.accounts.lock().unwrap().remove(email);
    }

    fn account(&self, email: &str) -> Option<Account> {
        self.accounts.lock().unwrap().get(email).cloned()
    }

    fn user_by_id(&self, id: &str) -> Option<Value> {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.user["id"] == id)
            .map(|a| a.user.clone())
    }

    fn authorize(&self, req: &HttpRequest) -> Result<Value, HttpResponse> {
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.authorizations.lock().unwrap().push(header.clone());

        header
            .as_deref()
            .and_then(|h| h.strip_prefix("Bearer "))
            .and_then(|token| {
                decode::<TokenClaims>(
                    token,
                    &DecodingKey::from_secret(SECRET),
                    &Validation::default(),
                )
                .ok()
            })
            .and_then(|data| self.user_by_id(&data.claims.sub))
            .ok_or_else(|| {
                HttpResponse::Unauthorized().json(json!({ "message": "Unauthorized" }))
            })
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.authorizations.lock().unwrap().last().cloned().flatten()
    }
}

fn auth_response(user: &Value) -> Value {
    let id = user["id"].as_str().unwrap_or_default();
    let email = user["email"].as_str().unwrap_or_default();
    json!({ "access_token": mint_token(id, email, 3600), "user": user })
}

fn project(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "name": "Riverside Tower",
        "description": "Twelve-storey residential block",
        "location": "Riverside",
        "startDate": "2024-01-15",
        "status": status
    })
}

async fn login(backend: web::Data<Backend>, body: web::Json<Value>) -> HttpResponse {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if email == INVALID_FORM_EMAIL {
        return HttpResponse::BadRequest().json(json!({
            "message": ["email must be an email", "password is too short"]
        }));
    }
    if email == BROKEN_EMAIL {
        return HttpResponse::InternalServerError().finish();
    }
    match backend.account(email) {
        Some(account) if account.password == password => {
            HttpResponse::Ok().json(auth_response(&account.user))
        }
        _ => HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" })),
    }
}

async fn register(backend: web::Data<Backend>, body: web::Json<Value>) -> HttpResponse {
    let email = body["email"].as_str().unwrap_or_default();
    if backend.account(email).is_some() {
        return HttpResponse::Conflict().json(json!({ "message": "Email already exists" }));
    }
    let id = format!("u-{}", backend.accounts.lock().unwrap().len() + 1);
    let user = backend.add_account(
        &id,
        email,
        body["role"].as_str().unwrap_or("client"),
        body["firstName"].as_str().unwrap_or_default(),
        body["lastName"].as_str().unwrap_or_default(),
    );
    HttpResponse::Created().json(auth_response(&user))
}

async fn forgot_password(backend: web::Data<Backend>, body: web::Json<Value>) -> HttpResponse {
    let email = body["email"].as_str().unwrap_or_default();
    if backend.account(email).is_none() {
        return HttpResponse::NotFound().json(json!({ "message": "User not found" }));
    }
    backend.otp_requests.lock().unwrap().push(email.to_string());
    HttpResponse::Ok().json(json!({ "message": "OTP sent" }))
}

async fn verify_otp(body: web::Json<Value>) -> HttpResponse {
    if body["otp"] == VALID_OTP {
        HttpResponse::Ok().json(json!({ "verified": true }))
    } else {
        HttpResponse::BadRequest().json(json!({ "message": "Invalid OTP" }))
    }
}

async fn reset_password(body: web::Json<Value>) -> HttpResponse {
    if body["otp"] != VALID_OTP {
        return HttpResponse::BadRequest().json(json!({ "message": "Invalid OTP" }));
    }
    if body["password"] != body["password_confirmation"] {
        return HttpResponse::BadRequest().json(json!({ "message": "Passwords do not match" }));
    }
    HttpResponse::NoContent().finish()
}

async fn me(backend: web::Data<Backend>, req: HttpRequest) -> HttpResponse {
    match backend.authorize(&req) {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(resp) => resp,
    }
}

async fn list_projects(backend: web::Data<Backend>, req: HttpRequest) -> HttpResponse {
    match backend.authorize(&req) {
        Ok(_) => HttpResponse::Ok().json(json!([project(1, "in_progress"), project(2, "pending")])),
        Err(resp) => resp,
    }
}

async fn get_project(
    backend: web::Data<Backend>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> HttpResponse {
    if let Err(resp) = backend.authorize(&req) {
        return resp;
    }
    match path.into_inner() {
        1 => HttpResponse::Ok().json(project(1, "in_progress")),
        _ => HttpResponse::NotFound().json(json!({ "message": "Project not found" })),
    }
}

async fn delete_project(backend: web::Data<Backend>, req: HttpRequest) -> HttpResponse {
    match backend.authorize(&req) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(resp) => resp,
    }
}

async fn accept_project(
    backend: web::Data<Backend>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> HttpResponse {
    match backend.authorize(&req) {
        Ok(_) => HttpResponse::Ok().json(project(path.into_inner(), "accepted")),
        Err(resp) => resp,
    }
}

async fn create_task(
    backend: web::Data<Backend>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Err(resp) = backend.authorize(&req) {
        return resp;
    }
    let mut task = body.into_inner();
    task["id"] = json!("t-1");
    if task.get("status").is_none() {
        task["status"] = json!("pending");
    }
    HttpResponse::Created().json(task)
}

async fn update_task(
    backend: web::Data<Backend>,
    req: HttpRequest,
    path: web::Path<(i64, String)>,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Err(resp) = backend.authorize(&req) {
        return resp;
    }
    let (_, id) = path.into_inner();
    let mut task = json!({ "id": id, "title": "Pour foundation", "status": "pending" });
    if let (Some(task), Some(changes)) = (task.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            task.insert(key.clone(), value.clone());
        }
    }
    HttpResponse::Ok().json(task)
}

async fn add_dependency(
    backend: web::Data<Backend>,
    req: HttpRequest,
    path: web::Path<(i64, String)>,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Err(resp) = backend.authorize(&req) {
        return resp;
    }
    let (_, id) = path.into_inner();
    HttpResponse::Ok().json(json!({
        "id": id,
        "title": "Frame walls",
        "dependencies": [body["dependencyId"]]
    }))
}

async fn delete_task(backend: web::Data<Backend>, req: HttpRequest) -> HttpResponse {
    match backend.authorize(&req) {
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Task deleted" })),
        Err(resp) => resp,
    }
}

async fn upload_document(
    backend: web::Data<Backend>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Err(resp) = backend.authorize(&req) {
        return resp;
    }
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    backend.uploads.lock().unwrap().push(Upload {
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
    });
    HttpResponse::Created().json(json!({ "id": "d-1", "name": "Site plan" }))
}

async fn pay_invoice(
    backend: web::Data<Backend>,
    req: HttpRequest,
    path: web::Path<(i64, String)>,
) -> HttpResponse {
    if let Err(resp) = backend.authorize(&req) {
        return resp;
    }
    let (_, id) = path.into_inner();
    HttpResponse::Ok().json(json!({
        "id": id,
        "amount": 1250.5,
        "status": "paid",
        "paidAt": "2024-04-02T10:00:00Z"
    }))
}

async fn list_vendors(backend: web::Data<Backend>, req: HttpRequest) -> HttpResponse {
    match backend.authorize(&req) {
        Ok(_) => HttpResponse::Ok().json(json!([
            { "id": "v-1", "name": "Concrete Supply Ltd", "email": "sales@concrete.example" }
        ])),
        Err(resp) => resp,
    }
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/login", web::post().to(login))
        .route("/auth/forgot-password", web::post().to(forgot_password))
        .route("/auth/verify-otp", web::post().to(verify_otp))
        .route("/auth/reset-password", web::post().to(reset_password))
        .route("/users", web::post().to(register))
        .route("/users/me", web::get().to(me))
        .route("/projects", web::get().to(list_projects))
        .route("/projects/my-projects", web::get().to(list_projects))
        .service(
            web::resource("/projects/{id}")
                .route(web::get().to(get_project))
                .route(web::delete().to(delete_project)),
        )
        .route("/projects/{id}/accept", web::post().to(accept_project))
        .route("/projects/{project_id}/tasks", web::post().to(create_task))
        .service(
            web::resource("/projects/{project_id}/tasks/{id}")
                .route(web::patch().to(update_task))
                .route(web::delete().to(delete_task)),
        )
        .route(
            "/projects/{project_id}/tasks/{id}/dependencies",
            web::post().to(add_dependency),
        )
        .route("/projects/{project_id}/documents", web::post().to(upload_document))
        .route(
            "/projects/{project_id}/invoices/{id}/pay",
            web::patch().to(pay_invoice),
        )
        .route("/vendors", web::get().to(list_vendors));
}

pub struct TestServer {
    pub base_url: String,
    pub backend: web::Data<Backend>,
}

impl TestServer {
    /// A fresh application context against this server, with in-memory storage.
    pub fn app(&self) -> (App, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        (self.app_with(storage.clone()), storage)
    }

    pub fn app_with(&self, storage: Arc<MemoryStore>) -> App {
        let mut config = Config::new(self.base_url.clone());
        config.request_timeout = Duration::from_secs(5);
        config.reset_redirect_delay = RESET_REDIRECT_DELAY;
        App::new(config, storage).expect("Failed to build application context")
    }
}

/// Starts the fake backend on an ephemeral port. Must run inside an actix system.
pub fn spawn_backend() -> TestServer {
    let backend = web::Data::new(Backend::seeded());
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test listener");
    let port = listener
        .local_addr()
        .expect("Failed to read listener address")
        .port();

    let data = backend.clone();
    let server = HttpServer::new(move || {
        actix_web::App::new()
            .app_data(data.clone())
            .configure(configure)
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to start test server")
    .run();
    actix_rt::spawn(server);

    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        backend,
    }
}

/// Signs the seeded site engineer in and commits the resulting navigation.
pub async fn signed_in(server: &TestServer) -> (App, Arc<MemoryStore>) {
    let (app, storage) = server.app();
    app.session()
        .login(&buildforge::models::LoginCredentials {
            email: ENGINEER_EMAIL.into(),
            password: PASSWORD.into(),
            remember_me: None,
        })
        .await;
    assert!(
        app.session().is_authenticated(),
        "Login failed: {:?}",
        app.session().snapshot().error
    );
    app.process_navigation()
        .expect("Post-login navigation failed");
    (app, storage)
}
