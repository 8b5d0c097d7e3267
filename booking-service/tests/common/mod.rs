use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::HashCost;
use auth::SigningKey;
use auth::TokenTtl;
use booking_service::config::AuthMode;
use booking_service::domain::user::models::AccountType;
use booking_service::domain::user::models::EmailAddress;
use booking_service::domain::user::models::NewUser;
use booking_service::domain::user::models::PersonName;
use booking_service::domain::user::models::User;
use booking_service::domain::user::ports::UserRepository;
use booking_service::domain::user::service::UserService;
use booking_service::inbound::http::router::create_router;
use booking_service::outbound::repositories::InMemoryUserRepository;
use booking_service::outbound::sessions::InMemorySessionStore;
use chrono::Utc;
use serde_json::json;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "pass_word!";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub repository: Arc<InMemoryUserRepository>,
    pub sessions: Arc<InMemorySessionStore>,
}

impl TestApp {
    /// Spawn the application with bearer tokens and session tracking
    pub async fn spawn() -> Self {
        Self::spawn_with(AuthMode::Bearer).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with(auth_mode: AuthMode) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let signing_key = SigningKey::new(TEST_SECRET).expect("Test secret is long enough");
        let authenticator = Arc::new(
            Authenticator::configured(&signing_key, HashCost::minimal(), TokenTtl::default())
                .expect("Minimal hash cost is valid"),
        );

        let repository = Arc::new(InMemoryUserRepository::new());
        let sessions = Arc::new(InMemorySessionStore::new());

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Some(Arc::clone(&sessions)),
            Arc::clone(&authenticator),
            Duration::from_secs(2),
        ));

        let router = create_router(user_service, Arc::clone(&authenticator), auth_mode);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            authenticator,
            repository,
            sessions,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register an individual account through the API
    pub async fn register(&self, email: &str) -> serde_json::Value {
        let response = self
            .post("/api/users")
            .json(&json!({
                "email": email,
                "password": TEST_PASSWORD,
                "first_name": "Nicola",
                "last_name": "Rossi",
                "account_type": "individual"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        response.json().await.expect("Failed to parse response")
    }

    /// Log in through the API and return the access token
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .post("/api/auth/login")
            .json(&json!({
                "email": email,
                "password": TEST_PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("Access token in login response")
            .to_string()
    }

    /// Insert an admin directly, since admins cannot self-register
    pub async fn seed_admin(&self, email: &str) -> User {
        let password_hash = self
            .authenticator
            .hash_password(TEST_PASSWORD)
            .expect("Failed to hash password");

        self.repository
            .create(NewUser {
                email: EmailAddress::new(email.to_string()).unwrap(),
                password_hash,
                account_type: AccountType::Admin,
                first_name: PersonName::new("Ada".to_string()).unwrap(),
                last_name: PersonName::new("Admin".to_string()).unwrap(),
                business_id: None,
                created_at: Utc::now(),
            })
            .await
            .expect("Failed to seed admin")
    }
}
