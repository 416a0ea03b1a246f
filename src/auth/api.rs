//! Login endpoints.

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth::session::Session;
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, RequestOptions};

/// Dashboard login credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// Login and logout against `/api/auth/*`.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
    session: Session,
}

impl AuthApi {
    pub fn new(client: ApiClient, session: Session) -> Self {
        Self { client, session }
    }

    /// Exchange credentials for a token and store it in the session.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let options = RequestOptions::default().skip_auth();
        let response = match self
            .client
            .send_json(Method::POST, "/api/auth/login", credentials, options)
            .await
        {
            Ok(response) => response,
            // a 401 here means bad credentials, not an expired session
            Err(ApiError::AuthExpired) => {
                return Err(ApiError::Validation {
                    status: StatusCode::UNAUTHORIZED,
                    body: "Invalid email or password".to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        let login: LoginResponse = response.json()?;
        self.session.login(&login.token)?;
        tracing::info!(email = %credentials.email, "Logged in");
        Ok(login)
    }

    /// Forget the local token.
    pub fn logout(&self) -> ApiResult<()> {
        self.session.logout()?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
