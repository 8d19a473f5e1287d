use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, LOCATION};
use actix_web::{App, test};
use serde_json::Value;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::memory::InMemoryStore;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{Comment, CommentDraft};
use crate::domain::post::{Post, PostDraft};
use crate::domain::query::PostQuery;
use crate::domain::user::{Author, User};
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers::routes;
use crate::presentation::middleware::{IdentityMiddleware, RequestTracing};
use crate::state::AppServices;

struct Blog {
    store: Arc<InMemoryStore>,
    services: AppServices,
}

impl Blog {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let services = AppServices::with_store(store.clone(), JwtKeys::new("test".into()));
        Self { store, services }
    }

    /// Stores a user directly and returns it with a bearer header value.
    async fn user(&self, name: &str) -> (Author, String) {
        let user = User::new(name.into(), format!("{name}@example.com"), "unused".into());
        let user = UserRepository::create(self.store.as_ref(), user)
            .await
            .unwrap();
        let token = self.services.auth.issue_token(user.id).unwrap();
        (user.as_author(), format!("Bearer {token}"))
    }

    async fn post(&self, author: &Author, title: &str, tags: &str) -> Post {
        let draft = PostDraft::parse(title, "some content", tags).unwrap();
        PostRepository::create(self.store.as_ref(), Post::new(author.clone(), draft))
            .await
            .unwrap()
    }

    async fn comment(&self, post: &Post, author: &Author, text: &str) -> Comment {
        let comment = Comment::new(post.id, author.clone(), CommentDraft::parse(text).unwrap());
        CommentRepository::create(self.store.as_ref(), comment)
            .await
            .unwrap()
    }
}

macro_rules! app {
    ($blog:expr) => {{
        let services = $blog.services.clone();
        test::init_service(
            App::new()
                .wrap(IdentityMiddleware)
                .wrap(RequestTracing)
                .configure(move |cfg| services.register(cfg))
                .configure(routes),
        )
        .await
    }};
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn list_is_public_and_carries_tags() {
    let blog = Blog::new();
    let (alice, _) = blog.user("alice").await;
    blog.post(&alice, "first", "rust").await;
    blog.post(&alice, "second", "web").await;
    let app = app!(blog);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(body["posts"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["tags"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn create_post_navigates_to_its_detail_page() {
    let blog = Blog::new();
    let (_, bearer) = blog.user("alice").await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/post/new/")
        .insert_header((AUTHORIZATION, bearer))
        .set_form([("title", "Hello"), ("content", "World"), ("tags", "rust, web")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let detail_url = location(&resp);
    assert!(detail_url.starts_with("/post/") && detail_url.ends_with('/'));

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&detail_url).to_request())
            .await;
    assert_eq!(body["post"]["title"], "Hello");
    assert_eq!(body["post"]["author"]["username"], "alice");
    assert_eq!(body["post"]["tags"], serde_json::json!(["rust", "web"]));
    assert_eq!(body["comments"], serde_json::json!([]));
}

#[actix_web::test]
async fn anonymous_create_is_sent_to_login() {
    let blog = Blog::new();
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/post/new/")
        .set_form([("title", "Hello"), ("content", "World")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login/?next=/post/new/");
    assert!(blog.store.query_posts(&PostQuery::All).await.unwrap().is_empty());
}

#[actix_web::test]
async fn invalid_post_form_is_redisplayed_with_errors() {
    let blog = Blog::new();
    let (_, bearer) = blog.user("alice").await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/post/new/")
        .insert_header((AUTHORIZATION, bearer))
        .set_form([("title", ""), ("content", "kept input")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["form"]["content"], "kept input");
    assert!(body["errors"]["title"].is_array());
    assert!(blog.store.query_posts(&PostQuery::All).await.unwrap().is_empty());
}

#[actix_web::test]
async fn only_the_author_may_update_or_delete_a_post() {
    let blog = Blog::new();
    let (alice, alice_bearer) = blog.user("alice").await;
    let (_, bob_bearer) = blog.user("bob").await;
    let post = blog.post(&alice, "original", "").await;
    let app = app!(blog);

    for bearer in [Some(bob_bearer), None] {
        for path in ["update", "delete"] {
            let mut req = test::TestRequest::post()
                .uri(&format!("/post/{}/{}/", post.id, path))
                .set_form([("title", "hijacked"), ("content", "x")]);
            if let Some(bearer) = bearer.clone() {
                req = req.insert_header((AUTHORIZATION, bearer));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{path}");
        }
    }

    let req = test::TestRequest::post()
        .uri(&format!("/post/{}/update/", post.id))
        .insert_header((AUTHORIZATION, alice_bearer))
        .set_form([("title", "edited"), ("content", "new body"), ("tags", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/post/{}/", post.id));

    let stored = PostRepository::find_by_id(blog.store.as_ref(), post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "edited");
    assert_eq!(stored.author, alice);
    assert_eq!(stored.published_date, post.published_date);
}

#[actix_web::test]
async fn edit_form_is_prefilled_for_the_author() {
    let blog = Blog::new();
    let (alice, bearer) = blog.user("alice").await;
    let post = blog.post(&alice, "draft", "b, a").await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri(&format!("/post/{}/update/", post.id))
        .insert_header((AUTHORIZATION, bearer))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["form"]["title"], "draft");
    assert_eq!(body["form"]["tags"], "a, b");
}

#[actix_web::test]
async fn deleting_a_post_removes_its_comments() {
    let blog = Blog::new();
    let (alice, bearer) = blog.user("alice").await;
    let post = blog.post(&alice, "doomed", "").await;
    blog.comment(&post, &alice, "first!").await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/post/{}/delete/", post.id))
        .insert_header((AUTHORIZATION, bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    assert!(blog.store.list_for_post(post.id).await.unwrap().is_empty());
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/post/{}/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn anonymous_comment_is_redirected_and_not_saved() {
    let blog = Blog::new();
    let (alice, _) = blog.user("alice").await;
    let post = blog.post(&alice, "open", "").await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/post/{}/", post.id))
        .set_form([("content", "drive-by")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        format!("/auth/login/?next=/post/{}/", post.id)
    );
    assert!(blog.store.list_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn comment_is_added_and_labelled() {
    let blog = Blog::new();
    let (alice, _) = blog.user("alice").await;
    let (_, bob_bearer) = blog.user("bob").await;
    let post = blog.post(&alice, "Rust tips", "").await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/post/{}/", post.id))
        .insert_header((AUTHORIZATION, bob_bearer))
        .set_form([("content", "great read")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/post/{}/", post.id));

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/post/{}/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(body["comments"][0]["content"], "great read");
    assert_eq!(body["comments"][0]["label"], "Comment by bob on Rust tips");
}

#[actix_web::test]
async fn blank_comment_redisplays_the_post_with_errors() {
    let blog = Blog::new();
    let (alice, bearer) = blog.user("alice").await;
    let post = blog.post(&alice, "open", "").await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/post/{}/", post.id))
        .insert_header((AUTHORIZATION, bearer))
        .set_form([("content", "   ")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["post"]["title"], "open");
    assert_eq!(body["comment_form"]["form"]["content"], "   ");
    assert!(body["comment_form"]["errors"]["content"].is_array());
    assert!(blog.store.list_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn deleting_a_comment_returns_to_its_post() {
    let blog = Blog::new();
    let (alice, alice_bearer) = blog.user("alice").await;
    let (bob, bob_bearer) = blog.user("bob").await;
    let post = blog.post(&alice, "thread", "").await;
    let comment = blog.comment(&post, &bob, "mine").await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/comment/{}/delete/", comment.id))
        .insert_header((AUTHORIZATION, alice_bearer))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::post()
        .uri(&format!("/comment/{}/delete/", comment.id))
        .insert_header((AUTHORIZATION, bob_bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/post/{}/", post.id));

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&location(&resp)).to_request(),
    )
    .await;
    assert_eq!(body["comments"], serde_json::json!([]));

    let req = test::TestRequest::post()
        .uri(&format!("/comment/{}/delete/", Uuid::new_v4()))
        .insert_header((AUTHORIZATION, bob_bearer))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn unknown_tag_is_not_found() {
    let blog = Blog::new();
    let (alice, _) = blog.user("alice").await;
    blog.post(&alice, "tagged", "Web Dev").await;
    let app = app!(blog);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/tag/nope/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/tag/web-dev/").to_request(),
    )
    .await;
    assert_eq!(body["tag"]["name"], "Web Dev");
    assert_eq!(body["posts"][0]["title"], "tagged");
}

#[actix_web::test]
async fn search_needs_a_query_and_deduplicates() {
    let blog = Blog::new();
    let (alice, _) = blog.user("alice").await;
    blog.post(&alice, "Rust in production", "").await;
    blog.post(&alice, "Gardening", "").await;
    let both = PostDraft::parse("Rusty tools", "a rusty wrench", "").unwrap();
    PostRepository::create(blog.store.as_ref(), Post::new(alice.clone(), both))
        .await
        .unwrap();
    let app = app!(blog);

    for uri in ["/search/", "/search/?q="] {
        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request())
                .await;
        assert_eq!(body["posts"], serde_json::json!([]), "{uri}");
    }

    // "Rusty tools" matches in title and content and must be listed once
    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/search/?q=RUST").to_request(),
    )
    .await;
    let mut titles: Vec<&str> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["title"].as_str())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Rust in production", "Rusty tools"]);
    assert_eq!(body["query"], "RUST");
}

#[actix_web::test]
async fn invalid_token_is_rejected() {
    let blog = Blog::new();
    let app = app!(blog);

    for header in ["Bearer not-a-jwt", "Basic YWxpY2U6cHc="] {
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHORIZATION, header))
            .insert_header(("x-request-id", "req-42"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{header}");
        assert_eq!(
            resp.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("req-42")
        );
        assert!(resp.headers().contains_key("server-timing"));
    }
}

#[actix_web::test]
async fn register_then_login_returns_tokens() {
    let blog = Blog::new();
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/auth/register/")
        .set_json(serde_json::json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "hunter2hunter2",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(serde_json::json!({ "username": "carol", "password": "hunter2hunter2" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[actix_web::test]
async fn unchanged_edit_form_keeps_multi_word_tag() {
    let blog = Blog::new();
    let (alice, bearer) = blog.user("alice").await;
    let post = blog.post(&alice, "draft", "rust lang,").await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri(&format!("/post/{}/update/", post.id))
        .insert_header((AUTHORIZATION, bearer.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let form = &body["form"];
    let field = |name: &str| form[name].as_str().unwrap_or_default().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/post/{}/update/", post.id))
        .insert_header((AUTHORIZATION, bearer))
        .set_form([
            ("title", field("title")),
            ("content", field("content")),
            ("tags", field("tags")),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let stored = PostRepository::find_by_id(blog.store.as_ref(), post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.tags, post.tags);
}

#[actix_web::test]
async fn gate_runs_before_the_body_is_read() {
    let blog = Blog::new();
    let (alice, alice_bearer) = blog.user("alice").await;
    let (_, bob_bearer) = blog.user("bob").await;
    let post = blog.post(&alice, "original", "").await;
    let app = app!(blog);

    // no body at all
    let req = test::TestRequest::post().uri("/post/new/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login/?next=/post/new/");

    let comment_url = format!("/post/{}/", post.id);
    let req = test::TestRequest::post().uri(&comment_url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/auth/login/?next={comment_url}"));

    let update_url = format!("/post/{}/update/", post.id);
    let json = serde_json::json!({ "title": "hijacked", "content": "x" });
    let req = test::TestRequest::post()
        .uri(&update_url)
        .insert_header((AUTHORIZATION, bob_bearer))
        .set_json(&json)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&update_url)
        .set_json(&json)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // the owner gets the body error once the gate passes
    let req = test::TestRequest::post()
        .uri(&update_url)
        .insert_header((AUTHORIZATION, alice_bearer))
        .set_json(&json)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    );

    let stored = PostRepository::find_by_id(blog.store.as_ref(), post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "original");
}
