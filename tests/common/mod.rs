use std::sync::Arc;
use std::time::Duration;

use menu_rs::{
    create_app, repositories::InMemoryMenuRepository, services::MenuService, Metrics,
};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const MAX_REQUEST_SIZE: usize = 64 * 1024;

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
}

impl TestEnvironment {
    /// Serve a freshly seeded app on an ephemeral port
    pub async fn new() -> Self {
        let repository =
            Arc::new(InMemoryMenuRepository::seeded().expect("Failed to seed menu store"));
        let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));
        let app = create_app(
            Arc::new(MenuService::new(repository)),
            metrics,
            MAX_REQUEST_SIZE,
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to serve app");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_menu(&self) -> Vec<Value> {
        let response = self
            .client
            .get(self.url("/api/menu"))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status().as_u16(), 200);

        response.json().await.expect("Failed to parse response")
    }
}

/// The create payload from the service documentation
pub fn veggie_wrap() -> Value {
    json!({
        "name": "Veggie Wrap",
        "description": "Grilled veggies in a wrap",
        "price": 8.5,
        "category": "entree",
        "ingredients": ["lettuce", "pepper"]
    })
}
