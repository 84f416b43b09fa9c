use actix_web::web;

use crate::handlers::{generate_handler, redirect_handler, shorten_handler, stats_handler};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/shorten", web::post().to(shorten_handler))
            .route("/generate", web::get().to(generate_handler))
            .route("/{code}/stats", web::get().to(stats_handler)),
    );
    cfg.route("/{code}", web::get().to(redirect_handler));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{
        http::{header::LOCATION, StatusCode},
        test, web, App,
    };
    use chrono::Utc;
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::cache::DisabledCodePool;
    use crate::config::LinkConfig;
    use crate::models::ShortLink;
    use crate::repositories::memory::InMemoryShortLinkRepository;
    use crate::routes::json_config;
    use crate::services::{CancelHandle, ClickRecorder, CodeGenerator, ShortLinkService};

    fn build(repo: Arc<InMemoryShortLinkRepository>) -> (web::Data<ShortLinkService>, ClickRecorder) {
        let (clicks, recorder) = ClickRecorder::start(repo.clone(), Duration::from_secs(1));
        let service = ShortLinkService::new(
            repo,
            CodeGenerator::new(Arc::new(DisabledCodePool)),
            clicks,
            Arc::new(CancelHandle::new()),
            LinkConfig::default(),
        );
        (web::Data::new(service), recorder)
    }

    macro_rules! app {
        ($service:expr) => {
            test::init_service(
                App::new()
                    .app_data($service.clone())
                    .app_data(json_config())
                    .configure(super::configure_routes),
            )
            .await
        };
    }

    /// Polls until the background worker has applied the expected clicks
    async fn wait_for_clicks(repo: &InMemoryShortLinkRepository, code: &str, expected: i64) {
        for _ in 0..100 {
            if repo.get(code).map(|l| l.click_count) == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[actix_web::test]
    async fn test_shorten_redirect_and_stats_end_to_end() {
        let repo = Arc::new(InMemoryShortLinkRepository::new());
        let (service, _recorder) = build(repo.clone());
        let app = app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/shorten")
            .set_json(json!({ "url": "https://example.com/very/long/path" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let code = body["short_code"].as_str().unwrap().to_string();
        assert!(code.len() <= 8);
        assert_eq!(body["original_url"], "https://example.com/very/long/path");
        assert_eq!(body["short_url"], format!("http://localhost:8080/{}", code));
        assert!(body.get("expires_at").is_none());

        let req = test::TestRequest::get().uri(&format!("/{}", code)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get(LOCATION).unwrap(),
            "https://example.com/very/long/path"
        );

        wait_for_clicks(&repo, &code, 1).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/{}/stats", code))
            .to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["click_count"], 1);
        assert_eq!(stats["short_code"], code.as_str());
        assert_eq!(stats["is_active"], true);
        assert!(stats["id"].is_string());
        assert!(stats["created_at"].is_string());
    }

    #[actix_web::test]
    async fn test_shorten_twice_returns_same_code() {
        let repo = Arc::new(InMemoryShortLinkRepository::new());
        let (service, _recorder) = build(repo.clone());
        let app = app!(service);

        let mut codes = Vec::new();
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/v1/shorten")
                .set_json(json!({ "url": "https://example.com/again" }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            codes.push(body["short_code"].as_str().unwrap().to_string());
        }

        assert_eq!(codes[0], codes[1]);
        assert_eq!(repo.len(), 1);
    }

    #[actix_web::test]
    async fn test_shorten_rejects_invalid_url() {
        let (service, _recorder) = build(Arc::new(InMemoryShortLinkRepository::new()));
        let app = app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/shorten")
            .set_json(json!({ "url": "example.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status_code"], 400);
    }

    #[actix_web::test]
    async fn test_shorten_rejects_malformed_body() {
        let (service, _recorder) = build(Arc::new(InMemoryShortLinkRepository::new()));
        let app = app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/shorten")
            .set_json(json!({ "link": "https://example.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_shorten_with_expiry_reports_deadline() {
        let (service, _recorder) = build(Arc::new(InMemoryShortLinkRepository::new()));
        let app = app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/shorten")
            .set_json(json!({ "url": "https://example.com/soon", "expires_in": 2 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["expires_at"].is_string());
    }

    #[actix_web::test]
    async fn test_expired_link_is_gone() {
        let (service, _recorder) = build(Arc::new(InMemoryShortLinkRepository::new()));
        let app = app!(service);

        let req = test::TestRequest::post()
            .uri("/api/v1/shorten")
            .set_json(json!({ "url": "https://example.com/stale", "expires_in": -1 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let code = body["short_code"].as_str().unwrap();

        let req = test::TestRequest::get().uri(&format!("/{}", code)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::GONE);
    }

    #[actix_web::test]
    async fn test_inactive_link_is_gone() {
        let repo = Arc::new(InMemoryShortLinkRepository::new());
        repo.insert(ShortLink {
            id: Uuid::new_v4(),
            original_url: "https://example.com/hidden".to_string(),
            short_code: "hidden".to_string(),
            created_at: Utc::now(),
            expires_at: None,
            click_count: 0,
            is_active: false,
        });
        let (service, _recorder) = build(repo);
        let app = app!(service);

        let req = test::TestRequest::get().uri("/hidden").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::GONE);
    }

    #[actix_web::test]
    async fn test_unknown_code_is_not_found() {
        let (service, _recorder) = build(Arc::new(InMemoryShortLinkRepository::new()));
        let app = app!(service);

        let req = test::TestRequest::get().uri("/nope42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/v1/nope42/stats").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_generate_returns_code() {
        let repo = Arc::new(InMemoryShortLinkRepository::new());
        let (service, _recorder) = build(repo.clone());
        let app = app!(service);

        let req = test::TestRequest::get().uri("/api/v1/generate").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["short_code"].as_str().unwrap().len(), 8);
        assert_eq!(repo.len(), 0);
    }
}
