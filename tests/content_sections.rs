//! Content sections, the section editor, catalog collections and login.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use site_content_client::auth::{AuthApi, Credentials, MemoryTokenStore, TokenStore};
use site_content_client::content::{Collection, ContentApi, Product, SectionEditor, SectionKey};
use site_content_client::upload::{UploadFile, UploadKind, Uploader};
use site_content_client::{ApiClient, ApiError, NoAuth, Session};

mod common;
use common::{MockResponse, start_mock_backend, start_programmable_backend, test_config};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Hero {
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_image: Option<String>,
}

fn authed_client(backend: &common::MockBackend, token: &str) -> ApiClient {
    let session = Session::new(Arc::new(MemoryTokenStore::with_token(token)));
    ApiClient::new(&test_config(backend), Arc::new(session)).unwrap()
}

#[tokio::test]
async fn test_upsert_section_posts_section_and_page_type() {
    let backend = start_mock_backend(MockResponse::json(200, json!({ "success": true }))).await;
    let content = ContentApi::new(authed_client(&backend, "tok"));

    let key = SectionKey::new("about-us-stats", "about");
    content
        .upsert_section(&key, &json!({ "years": 25, "projects": 1200 }))
        .await
        .unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/api/content");
    assert_eq!(request.header("authorization").as_deref(), Some("Bearer tok"));
    assert_eq!(
        request.json(),
        json!({
            "section": "about-us-stats",
            "pageType": "about",
            "content": { "years": 25, "projects": 1200 }
        })
    );
}

#[tokio::test]
async fn test_patch_section_sends_content_only() {
    let backend = start_mock_backend(MockResponse::json(200, json!({}))).await;
    let content = ContentApi::new(authed_client(&backend, "tok"));

    content
        .patch_section(&SectionKey::new("hero", "home"), &json!({ "title": "New" }))
        .await
        .unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/api/content/hero/home");
    assert_eq!(request.json(), json!({ "content": { "title": "New" } }));
}

#[tokio::test]
async fn test_missing_section_is_none() {
    let backend = start_mock_backend(MockResponse::new(404, "not found")).await;
    let content = ContentApi::new(ApiClient::new(&test_config(&backend), Arc::new(NoAuth)).unwrap());

    let hero: Option<Hero> = content
        .get_section_opt(&SectionKey::new("hero", "home"))
        .await
        .unwrap();

    assert!(hero.is_none());
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_upsert_section_next_uses_fixed_schedule() {
    let count = Arc::new(AtomicU32::new(0));
    let backend = start_programmable_backend(move |_| {
        let count = count.clone();
        async move {
            if count.fetch_add(1, Ordering::SeqCst) == 0 {
                // header is ignored on this path
                MockResponse::new(429, "").header("retry-after", "30")
            } else {
                MockResponse::json(200, json!({ "success": true }))
            }
        }
    })
    .await;
    let content = ContentApi::new(authed_client(&backend, "tok"));

    content
        .upsert_section_next(&SectionKey::new("hero", "home"), &json!({ "title": "T" }))
        .await
        .unwrap();

    assert_eq!(backend.hits(), 2);
    let gap = backend.gaps()[0];
    assert!(gap >= Duration::from_secs(2), "waited {:?}", gap);
    assert!(gap < Duration::from_secs(10), "waited {:?}", gap);
}

#[tokio::test]
async fn test_upsert_section_next_gives_up_after_two_rate_limit_retries() {
    let backend = start_mock_backend(MockResponse::new(429, "").header("retry-after", "0")).await;
    let content = ContentApi::new(authed_client(&backend, "tok"));

    let err = content
        .upsert_section_next(&SectionKey::new("hero", "home"), &json!({ "title": "T" }))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::RateLimited { .. }), "got {:?}", err);
    assert_eq!(backend.hits(), 3);
    let gaps = backend.gaps();
    assert!(gaps[0] >= Duration::from_secs(2), "first wait {:?}", gaps[0]);
    assert!(gaps[1] >= Duration::from_secs(4), "second wait {:?}", gaps[1]);
}

#[tokio::test]
async fn test_upsert_section_next_does_not_retry_server_errors() {
    let backend = start_mock_backend(MockResponse::new(502, "bad gateway")).await;
    let content = ContentApi::new(authed_client(&backend, "tok"));

    let err = content
        .upsert_section_next(&SectionKey::new("hero", "home"), &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Server { status, .. } if status == StatusCode::BAD_GATEWAY));
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_editor_starts_from_default_and_saves_once() {
    let backend = start_programmable_backend(|req| async move {
        if req.method == Method::GET {
            MockResponse::new(404, "")
        } else {
            MockResponse::json(200, json!({ "success": true }))
        }
    })
    .await;
    let api = ContentApi::new(authed_client(&backend, "tok"));

    let mut editor: SectionEditor<Hero> = SectionEditor::load(api, SectionKey::new("hero", "home"))
        .await
        .unwrap();
    assert_eq!(editor.value(), &Hero::default());
    assert!(!editor.is_dirty());

    editor.edit(|hero| hero.title = "Building materials you can trust".into());
    assert!(editor.is_dirty());
    editor.save().await.unwrap();
    assert!(!editor.is_dirty());

    // nothing changed, no request
    editor.save().await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].json()["content"]["title"],
        "Building materials you can trust"
    );
}

#[tokio::test]
async fn test_editor_reset_discards_edits() {
    let backend =
        start_mock_backend(MockResponse::json(200, json!({ "content": { "title": "Saved" } }))).await;
    let api = ContentApi::new(authed_client(&backend, "tok"));

    let mut editor: SectionEditor<Hero> =
        SectionEditor::load(api, SectionKey::new("hero", "home")).await.unwrap();
    assert_eq!(editor.value().title, "Saved");

    editor.edit(|hero| hero.title = "Draft".into());
    editor.reset();
    assert_eq!(editor.value().title, "Saved");
    assert!(!editor.is_dirty());
}

#[tokio::test]
async fn test_editor_upload_then_save_embeds_url() {
    let backend = start_programmable_backend(|req| async move {
        match (req.method.as_str(), req.path.as_str()) {
            ("GET", _) => MockResponse::json(200, json!({ "content": { "title": "Hi" } })),
            ("POST", "/api/upload/image") => MockResponse::json(
                200,
                json!({ "success": true, "imageUrl": "/uploads/hero.png" }),
            ),
            _ => MockResponse::json(200, json!({ "success": true })),
        }
    })
    .await;
    let client = authed_client(&backend, "tok");
    let uploader = Uploader::new(client.clone(), Default::default());
    let mut editor: SectionEditor<Hero> =
        SectionEditor::load(ContentApi::new(client), SectionKey::new("hero", "home"))
            .await
            .unwrap();

    let file = UploadFile::new("hero.png", "image/png", vec![0x89, b'P', b'N', b'G']);
    editor
        .save_with_upload(&uploader, UploadKind::Image, file, |hero, url| {
            hero.background_image = Some(url)
        })
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);

    let upload = &requests[1];
    assert_eq!(upload.path, "/api/upload/image");
    assert!(upload
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    assert!(upload.body_text().contains("name=\"image\""));
    assert_eq!(upload.header("authorization").as_deref(), Some("Bearer tok"));

    let save = requests[2].json();
    assert_eq!(save["content"]["backgroundImage"], "/uploads/hero.png");
    assert_eq!(save["content"]["title"], "Hi");
}

#[tokio::test]
async fn test_products_list_and_create() {
    let backend = start_programmable_backend(|req| async move {
        if req.method == Method::GET {
            MockResponse::json(
                200,
                json!({ "products": [
                    { "_id": "p1", "name": "Rebar 12mm", "category": "steel" },
                    { "_id": "p2", "name": "Portland cement" }
                ] }),
            )
        } else {
            let mut created = req.json();
            created["_id"] = json!("p3");
            MockResponse::json(201, created)
        }
    })
    .await;
    let products = Collection::<Product>::new(authed_client(&backend, "tok"));

    let list = products.list().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id.as_deref(), Some("p1"));
    assert_eq!(list[1].name, "Portland cement");

    let created = products
        .create(&Product {
            name: "Gravel".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id.as_deref(), Some("p3"));
    assert_eq!(created.name, "Gravel");
    assert_eq!(backend.requests()[1].path, "/api/products");
}

#[tokio::test]
async fn test_login_stores_token_and_skips_auth_header() {
    let backend = start_mock_backend(MockResponse::json(200, json!({ "token": "fresh-token" }))).await;
    let store = Arc::new(MemoryTokenStore::with_token("stale"));
    let session = Session::new(store.clone());
    let client = ApiClient::new(&test_config(&backend), Arc::new(session.clone())).unwrap();
    let auth = AuthApi::new(client, session);

    auth.login(&Credentials {
        email: "admin@example.com".into(),
        password: "hunter2".into(),
    })
    .await
    .unwrap();

    assert_eq!(store.get().as_deref(), Some("fresh-token"));
    let request = &backend.requests()[0];
    assert_eq!(request.path, "/api/auth/login");
    assert!(request.header("authorization").is_none());
    assert_eq!(request.json()["email"], "admin@example.com");
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let backend = start_mock_backend(MockResponse::new(401, "nope")).await;
    let session = Session::new(Arc::new(MemoryTokenStore::new()));
    let client = ApiClient::new(&test_config(&backend), Arc::new(session.clone())).unwrap();
    let auth = AuthApi::new(client, session);

    let err = auth
        .login(&Credentials {
            email: "admin@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.user_message(), "Invalid email or password");
    assert_eq!(backend.hits(), 1);
}
