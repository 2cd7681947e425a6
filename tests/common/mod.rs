#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use userbase::config::Config;

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;
    config.security.session_secret = Some("k".repeat(64));
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;
    config
}

pub async fn spawn_app() -> Router {
    let state = userbase::api::create_app_state_from_config(test_config(), None)
        .await
        .expect("Failed to create app state");
    userbase::api::router(state)
}

/// Drives the router like a browser: the session cookie is carried between
/// requests.
pub struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    pub async fn new() -> Self {
        Self {
            app: spawn_app().await,
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response {
        self.post_form(uri, None, fields).await
    }

    pub async fn post_with_referer(
        &mut self,
        uri: &str,
        referer: &str,
        fields: &[(&str, &str)],
    ) -> Response {
        self.post_form(uri, Some(referer), fields).await
    }

    async fn post_form(
        &mut self,
        uri: &str,
        referer: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Response {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let mut builder = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(referer) = referer {
            builder = builder.header(header::REFERER, referer);
        }

        let request = builder.body(Body::from(body)).unwrap();
        self.send(request).await
    }

    /// Follows one redirect and returns the body of the page it lands on.
    pub async fn follow(&mut self, response: Response) -> String {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = location(&response);
        let page = self.get(&location).await;
        assert_eq!(page.status(), StatusCode::OK, "GET {location}");
        body_string(page).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> Response {
        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default().trim();
            let value = pair.split_once('=').map(|(_, v)| v).unwrap_or_default();
            self.cookie = if value.is_empty() {
                None
            } else {
                Some(pair.to_string())
            };
        }

        response
    }
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_string(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub const ALICE: [(&str, &str); 6] = [
    ("username", "alice"),
    ("first_name", "Alice"),
    ("last_name", "Liddell"),
    ("email", "alice@example.com"),
    ("password", "secret1"),
    ("confirm", "secret1"),
];
