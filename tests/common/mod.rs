#![allow(dead_code)]

use std::net::TcpListener;
use std::path::PathBuf;

use chirpy::configuration::{
    ApplicationSettings, JwtSettings, PolkaSettings, Settings, StoreSettings,
};
use chirpy::startup::run;
use chirpy::store::Store;
use serde_json::{json, Value};

pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const JWT_SECRET: &str = "integration-test-secret-key-at-least-32-chars";

pub struct TestApp {
    pub address: String,
    pub store: Store,
    pub store_path: PathBuf,
    pub static_dir: PathBuf,
    pub client: reqwest::Client,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.store_path);
        let _ = std::fs::remove_dir_all(&self.static_dir);
    }
}

pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let run_id = uuid::Uuid::new_v4();
    let store_path = std::env::temp_dir().join(format!("chirpy-it-{}.json", run_id));
    let static_dir = std::env::temp_dir().join(format!("chirpy-it-static-{}", run_id));
    std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
    std::fs::write(static_dir.join("index.html"), "<html><body>Welcome to Chirpy</body></html>")
        .expect("Failed to write index.html");

    let settings = Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port,
            static_dir: static_dir.to_string_lossy().into_owned(),
        },
        store: StoreSettings {
            path: store_path.to_string_lossy().into_owned(),
        },
        jwt: JwtSettings {
            secret: JWT_SECRET.to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 60 * 24 * 3600,
        },
        polka: PolkaSettings {
            api_key: POLKA_KEY.to_string(),
        },
    };

    let store = Store::open(&store_path).await.expect("Failed to open store");
    let server = run(listener, store.clone(), settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        store_path,
        static_dir,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn post_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/users", &self.address))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/login", &self.address))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register and log in; returns the login response body.
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        let response = self.post_user(email, password).await;
        assert_eq!(201, response.status().as_u16());

        let response = self.post_login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse login response")
    }

    pub async fn post_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/chirps", &self.address))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn token_of(login: &Value) -> &str {
    login["token"].as_str().expect("token missing")
}

pub fn refresh_token_of(login: &Value) -> &str {
    login["refresh_token"].as_str().expect("refresh_token missing")
}

pub fn id_of(value: &Value) -> u64 {
    value["id"].as_u64().expect("id missing")
}
