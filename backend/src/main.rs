use std::env;
use std::sync::{Arc, Mutex};

use auth_client::Credentials;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use sha2::Sha256;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

const DB_PATH_ENV: &str = "REPORTMOA_DB";
const STATIC_DIR_ENV: &str = "REPORTMOA_STATIC";
const BIND_ADDR_ENV: &str = "REPORTMOA_ADDR";

const DEFAULT_DB_PATH: &str = "reports.db";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

const PBKDF2_ITERATIONS: u32 = 200_000;
const PASSWORD_MIN_CHARS: usize = 6;
const PASSWORD_MAX_CHARS: usize = 80;

type ApiReply = (StatusCode, Json<serde_json::Value>);

// ---------- User store --------------------------------------------------------

struct UserStore {
    conn: Connection,
}

impl UserStore {
    fn open(path: &str) -> rusqlite::Result<UserStore> {
        let conn = Connection::open(path)?;
        let store = UserStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn open_memory() -> rusqlite::Result<UserStore> {
        let conn = Connection::open_in_memory()?;
        let store = UserStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 email TEXT NOT NULL UNIQUE,
                 password_hash TEXT NOT NULL
             );",
        )
    }

    fn find_password_hash(&self, email: &str) -> rusqlite::Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT password_hash FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()
    }

    fn insert_user(&self, email: &str, password_hash: &str) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO users (email, password_hash) VALUES (?1, ?2)",
            params![email, password_hash],
        )?;
        Ok(())
    }
}

// ---------- Password hashing --------------------------------------------------

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// Stored as `pbkdf2-sha256$<iterations>$<salt b64>$<key b64>` so old rows
/// stay verifiable if the iteration count ever changes.
fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "pbkdf2-sha256${}${}${}",
        PBKDF2_ITERATIONS,
        B64.encode(salt),
        B64.encode(key)
    )
}

fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(key)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != "pbkdf2-sha256" || parts.next().is_some() {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(salt) = B64.decode(salt) else {
        return false;
    };
    let derived = derive_key(password, &salt, iterations.max(1));
    B64.encode(derived) == key
}

// ---------- Request validation ------------------------------------------------

/// Shape check only: `local@domain` with a dotted domain. Full address
/// validation is not this API's job.
fn valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.split_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}

fn validate_credentials(credentials: &Credentials) -> Result<(), ApiReply> {
    if !valid_email(&credentials.email) {
        return Err(detail_reply(
            StatusCode::BAD_REQUEST,
            "올바른 이메일 주소를 입력해 주세요.",
        ));
    }
    let chars = credentials.password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&chars) {
        return Err(detail_reply(
            StatusCode::BAD_REQUEST,
            "비밀번호는 6자 이상 80자 이하여야 합니다.",
        ));
    }
    Ok(())
}

// ---------- Handlers ----------------------------------------------------------

#[derive(Clone)]
struct ServerState {
    store: Arc<Mutex<UserStore>>,
}

fn detail_reply(status: StatusCode, text: &str) -> ApiReply {
    (status, Json(json!({ "detail": text })))
}

fn message_reply(text: &str) -> ApiReply {
    (StatusCode::OK, Json(json!({ "message": text })))
}

fn internal_error(context: &str, err: rusqlite::Error) -> ApiReply {
    eprintln!("{}: {}", context, err);
    detail_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "내부 오류가 발생했습니다.",
    )
}

async fn signup_handler(
    State(state): State<ServerState>,
    Json(credentials): Json<Credentials>,
) -> ApiReply {
    if let Err(reply) = validate_credentials(&credentials) {
        return reply;
    }
    // Hash outside the lock; the lookup and insert share one critical
    // section so concurrent signups cannot both pass the duplicate check.
    let password_hash = hash_password(&credentials.password);

    let store = state.store.lock().unwrap();
    match store.find_password_hash(&credentials.email) {
        Ok(Some(_)) => detail_reply(StatusCode::BAD_REQUEST, "이미 가입된 이메일입니다."),
        Ok(None) => match store.insert_user(&credentials.email, &password_hash) {
            Ok(()) => message_reply("회원가입 성공"),
            Err(err) => internal_error("signup insert failed", err),
        },
        Err(err) => internal_error("signup lookup failed", err),
    }
}

async fn login_handler(
    State(state): State<ServerState>,
    Json(credentials): Json<Credentials>,
) -> ApiReply {
    if let Err(reply) = validate_credentials(&credentials) {
        return reply;
    }
    let lookup = state
        .store
        .lock()
        .unwrap()
        .find_password_hash(&credentials.email);
    match lookup {
        Ok(None) => detail_reply(StatusCode::BAD_REQUEST, "가입되지 않은 이메일입니다."),
        Ok(Some(stored)) => {
            if verify_password(&credentials.password, &stored) {
                message_reply("로그인 성공")
            } else {
                detail_reply(StatusCode::BAD_REQUEST, "비밀번호가 일치하지 않습니다.")
            }
        }
        Err(err) => internal_error("login lookup failed", err),
    }
}

#[tokio::main]
async fn main() {
    let db_path = env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let static_dir = env::var(STATIC_DIR_ENV).unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_string());
    let addr = env::var(BIND_ADDR_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let store = UserStore::open(&db_path).expect("open user database");
    let state = ServerState {
        store: Arc::new(Mutex::new(store)),
    };

    // The pages are served from this same process by default, but an open
    // CORS policy keeps dev setups working when they are served elsewhere.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/signup", post(signup_handler))
        .route("/api/login", post(login_handler))
        .fallback_service(ServeDir::new(&static_dir))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind listen address");
    println!(
        "reportmoa backend listening on http://{} (pages + API); db: {}",
        addr, db_path
    );
    axum::serve(listener, app).await.expect("server failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trips() {
        let stored = hash_password("secret1");
        assert!(stored.starts_with("pbkdf2-sha256$200000$"));
        assert!(verify_password("secret1", &stored));
        assert!(!verify_password("secret2", &stored));
    }

    #[test]
    fn same_password_hashes_differently() {
        // Fresh salt per call.
        assert_ne!(hash_password("secret1"), hash_password("secret1"));
    }

    #[test]
    fn verify_rejects_malformed_hashes() {
        assert!(!verify_password("secret1", ""));
        assert!(!verify_password("secret1", "nonsense"));
        assert!(!verify_password("secret1", "md5$1000$abc$def"));
        assert!(!verify_password("secret1", "pbkdf2-sha256$notanumber$YQ==$YQ=="));
        assert!(!verify_password("secret1", "pbkdf2-sha256$1000$!!!$YQ=="));
        assert!(!verify_password("secret1", "pbkdf2-sha256$1000$YQ==$YQ==$extra"));
    }

    #[test]
    fn email_shape_check() {
        assert!(valid_email("user@example.com"));
        assert!(valid_email("u.ser+tag@mail.example.co"));
        assert!(!valid_email(""));
        assert!(!valid_email("userexample.com"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("user@"));
        assert!(!valid_email("user@example"));
        assert!(!valid_email("user@.com"));
        assert!(!valid_email("user@example."));
        assert!(!valid_email("us er@example.com"));
        assert!(!valid_email("user@ex@ample.com"));
    }

    #[test]
    fn credential_validation_bounds() {
        let ok = Credentials::new("a@b.co", "123456");
        assert!(validate_credentials(&ok).is_ok());

        let short = Credentials::new("a@b.co", "12345");
        assert!(validate_credentials(&short).is_err());

        let max = Credentials::new("a@b.co", "x".repeat(80));
        assert!(validate_credentials(&max).is_ok());

        let long = Credentials::new("a@b.co", "x".repeat(81));
        assert!(validate_credentials(&long).is_err());

        let bad_email = Credentials::new("not-an-email", "123456");
        assert!(validate_credentials(&bad_email).is_err());
    }

    #[test]
    fn store_inserts_and_finds_users() {
        let store = UserStore::open_memory().unwrap();
        assert_eq!(store.find_password_hash("a@b.co").unwrap(), None);

        store.insert_user("a@b.co", "hash-1").unwrap();
        assert_eq!(
            store.find_password_hash("a@b.co").unwrap().as_deref(),
            Some("hash-1")
        );

        // Unique email constraint.
        assert!(store.insert_user("a@b.co", "hash-2").is_err());
    }

    #[test]
    fn signup_then_login_against_the_store() {
        let store = UserStore::open_memory().unwrap();
        let stored = hash_password("password123");
        store.insert_user("user@example.com", &stored).unwrap();

        let fetched = store
            .find_password_hash("user@example.com")
            .unwrap()
            .unwrap();
        assert!(verify_password("password123", &fetched));
        assert!(!verify_password("password124", &fetched));
    }

    fn memory_state() -> ServerState {
        ServerState {
            store: Arc::new(Mutex::new(UserStore::open_memory().unwrap())),
        }
    }

    #[tokio::test]
    async fn signup_handler_rejects_duplicate_email() {
        let state = memory_state();
        let creds = Credentials::new("user@example.com", "password123");

        let (status, Json(body)) =
            signup_handler(State(state.clone()), Json(creds.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "회원가입 성공");

        let (status, Json(body)) = signup_handler(State(state), Json(creds)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "이미 가입된 이메일입니다.");
    }

    #[tokio::test]
    async fn login_handler_verdicts() {
        let state = memory_state();
        let creds = Credentials::new("user@example.com", "password123");

        let (status, Json(body)) =
            login_handler(State(state.clone()), Json(creds.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "가입되지 않은 이메일입니다.");

        let (status, _) = signup_handler(State(state.clone()), Json(creds.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let wrong = Credentials::new("user@example.com", "password124");
        let (status, Json(body)) = login_handler(State(state.clone()), Json(wrong)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "비밀번호가 일치하지 않습니다.");

        let (status, Json(body)) = login_handler(State(state), Json(creds)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "로그인 성공");
    }
}
