use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Where the account API lives. Every endpoint is derived from `api_base`,
/// so overriding it (page global, test server) moves the whole surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub api_base: String,
}

impl AuthConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            // A trailing slash in an override would double up in the urls.
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn login_url(&self) -> String {
        format!("{}/api/login", self.api_base)
    }

    pub fn signup_url(&self) -> String {
        format!("{}/api/signup", self.api_base)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    /// Transport failure: the request never produced an HTTP reply. The
    /// page maps every value of this to one generic message.
    #[error("request failed: {0}")]
    Network(String),
}

/// JSON body both `/api/login` and `/api/signup` accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Whatever the server put in the reply body. Both fields are optional and
/// an unparseable body decodes as if it carried neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl AuthReply {
    /// Text for a 2xx reply: server message, else the caller's fallback.
    pub fn success_text<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }

    /// Text for a non-2xx reply: `detail` wins over `message`, then the
    /// caller's fallback.
    pub fn failure_text<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.detail
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or(fallback)
    }
}

/// One finished request: HTTP-level verdict plus the decoded body. A non-2xx
/// status is an outcome, not an error; `AuthError` is reserved for requests
/// that never completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub ok: bool,
    pub status: u16,
    pub reply: AuthReply,
}

#[cfg(target_arch = "wasm32")]
mod http {
    use super::{AuthConfig, AuthError, AuthOutcome, AuthReply, Credentials};
    use gloo_net::http::Request;

    pub async fn login(
        config: &AuthConfig,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, AuthError> {
        post_credentials(&config.login_url(), credentials).await
    }

    pub async fn signup(
        config: &AuthConfig,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, AuthError> {
        post_credentials(&config.signup_url(), credentials).await
    }

    async fn post_credentials(
        url: &str,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, AuthError> {
        let body = serde_json::to_string(credentials)?;
        let response = Request::post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .map_err(|err| AuthError::Network(err.to_string()))?
            .send()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))?;

        let ok = response.ok();
        let status = response.status();
        // Replies without a JSON body (or with junk) count as empty.
        let reply = response.json::<AuthReply>().await.unwrap_or_default();

        Ok(AuthOutcome { ok, status, reply })
    }
}

#[cfg(target_arch = "wasm32")]
pub use http::{login, signup};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_local_api() {
        let config = AuthConfig::default();
        assert_eq!(config.login_url(), "http://127.0.0.1:8000/api/login");
        assert_eq!(config.signup_url(), "http://127.0.0.1:8000/api/signup");
    }

    #[test]
    fn config_trims_trailing_slash() {
        let config = AuthConfig::new("https://api.example.com/");
        assert_eq!(config.login_url(), "https://api.example.com/api/login");
    }

    #[test]
    fn credentials_serialize_to_the_wire_shape() {
        let creds = Credentials::new("a@b.com", "secret1");
        let value = serde_json::to_value(&creds).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"email": "a@b.com", "password": "secret1"})
        );
    }

    #[test]
    fn reply_text_precedence() {
        let empty = AuthReply::default();
        assert_eq!(empty.success_text("로그인 성공"), "로그인 성공");
        assert_eq!(empty.failure_text("로그인 실패"), "로그인 실패");

        let with_message = AuthReply {
            message: Some("환영합니다".to_string()),
            detail: None,
        };
        assert_eq!(with_message.success_text("로그인 성공"), "환영합니다");
        assert_eq!(with_message.failure_text("로그인 실패"), "환영합니다");

        let with_both = AuthReply {
            message: Some("m".to_string()),
            detail: Some("비밀번호가 일치하지 않습니다.".to_string()),
        };
        assert_eq!(
            with_both.failure_text("로그인 실패"),
            "비밀번호가 일치하지 않습니다."
        );
        assert_eq!(with_both.success_text("로그인 성공"), "m");
    }

    #[test]
    fn reply_decodes_from_server_json() {
        let reply: AuthReply =
            serde_json::from_str(r#"{"detail": "이미 가입된 이메일입니다."}"#).unwrap();
        assert_eq!(reply.detail.as_deref(), Some("이미 가입된 이메일입니다."));
        assert_eq!(reply.message, None);
    }
}
