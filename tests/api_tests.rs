//! Resource endpoints: paths, query strings, bodies and envelope unwrapping.

mod auth_support;

use pretty_assertions::assert_eq;
use serde_json::json;
use stanza::types::{
    ActivityType, CreateCollection, InterestType, PageQuery, SearchKind, SortBy, SortOrder,
    TargetType, TrackEngagementRequest, UpdatePoem, User,
};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_support::{client_for, envelope, memory_store};

fn poem(id: u64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "content": "…",
        "tags": ["night"],
        "isPublic": true,
        "likesCount": 4,
        "bookmarksCount": 1
    })
}

#[tokio::test]
async fn list_poems_sends_only_present_query_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/poems"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "12"))
        .and(query_param("search", "rain"))
        .and(query_param("sortBy", "likesCount"))
        .and(query_param("sortOrder", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "data": [poem(1, "Rain"), poem(2, "After Rain")],
            "total": 14,
            "page": 2,
            "limit": 12,
            "totalPages": 2
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, memory_store());
    let query = PageQuery::builder()
        .limit(12)
        .sort_by(SortBy::LikesCount)
        .sort_order(SortOrder::Desc)
        .build()
        .with_search("rain")
        .with_page(2);
    let page = client.list_poems(&query).await.expect("poems");

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].id, "1");
    assert!(!page.has_more());

    let requests = server.received_requests().await.unwrap();
    let url = &requests[0].url;
    assert!(url.query_pairs().all(|(k, _)| k != "categoryId" && k != "tags"));
}

#[tokio::test]
async fn poem_crud_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/poems/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(poem(7, "Ode"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/poems/7"))
        .and(body_json(json!({"title": "Ode, revised"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(poem(7, "Ode, revised"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/poems/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, memory_store());
    assert_eq!(client.get_poem("7").await.unwrap().title, "Ode");
    let changes = UpdatePoem {
        title: Some("Ode, revised".into()),
        ..Default::default()
    };
    assert_eq!(client.update_poem("7", &changes).await.unwrap().title, "Ode, revised");
    client.delete_poem("7").await.unwrap();
}

#[tokio::test]
async fn like_and_bookmark_toggle_by_method() {
    let server = MockServer::start().await;
    for (verb, action) in [("POST", "like"), ("DELETE", "like"), ("POST", "bookmark"), ("DELETE", "bookmark")] {
        Mock::given(method(verb))
            .and(path(format!("/api/poems/3/{action}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"liked": true}))))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server, memory_store());
    client.like_poem("3").await.unwrap();
    client.unlike_poem("3").await.unwrap();
    client.bookmark_poem("3").await.unwrap();
    client.unbookmark_poem("3").await.unwrap();
}

#[tokio::test]
async fn collections_manage_membership() {
    let server = MockServer::start().await;
    let collection = json!({"id": "c1", "name": "Night", "isPublic": false, "poemsCount": 1});
    Mock::given(method("POST"))
        .and(path("/api/collections"))
        .and(body_json(json!({"name": "Night", "isPublic": false})))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(collection.clone())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/collections/c1/poems"))
        .and(body_json(json!({"poemId": "p9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(collection)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/collections/c1/poems/p9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, memory_store());
    let created = client
        .create_collection(&CreateCollection {
            name: "Night".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, "c1");
    let updated = client.add_poem_to_collection("c1", "p9").await.unwrap();
    assert_eq!(updated.poems_count, 1);
    client.remove_poem_from_collection("c1", "p9").await.unwrap();
}

#[tokio::test]
async fn user_listings_and_bookmarks() {
    let server = MockServer::start().await;
    let empty_page = envelope(json!({"data": [], "total": 0, "page": 1, "limit": 10, "totalPages": 0}));
    for route in ["/api/users/u1/poems", "/api/users/u1/collections", "/api/users/bookmarks"] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(empty_page.clone()))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"id": "u1", "email": "u@x.y"}))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, memory_store());
    let query = PageQuery::first(10);
    assert_eq!(client.get_user("u1").await.unwrap().email, "u@x.y");
    assert!(client.user_poems("u1", &query).await.unwrap().is_empty());
    assert!(client.user_collections("u1", &query).await.unwrap().is_empty());
    assert!(client.bookmarked_poems(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn catalog_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "raven"))
        .and(query_param("type", "poets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "poets": [{"id": 1, "name": "Edgar Allan Poe", "birthYear": 1809, "deathYear": 1849}]
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "data": [{"id": 1, "name": "Romantic"}],
            "total": 1,
            "totalPages": 1
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{"id": 4, "name": "sea"}]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/poets/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"id": 1, "name": "Poe"}))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, memory_store());
    let results = client.search("raven", Some(SearchKind::Poets)).await.unwrap();
    assert_eq!(results.poets[0].lifespan().as_deref(), Some("1809–1849"));
    assert!(results.poems.is_empty());

    let categories = client.list_categories(&PageQuery::default()).await.unwrap();
    assert_eq!(categories.data[0].name, "Romantic");
    assert_eq!(categories.page, 1);

    assert_eq!(client.list_tags().await.unwrap()[0].name, "sea");
    assert_eq!(client.get_poet("1").await.unwrap().name, "Poe");
}

#[tokio::test]
async fn interests_and_engagement() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile/interests/POET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{
            "id": 1, "interestType": "POET", "interestId": 5, "interestName": "Poe", "strength": 0.8
        }]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/profile/interests/POET/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/profile/engagement/track"))
        .and(body_json(json!({"activityType": "VIEW", "targetType": "POEM", "targetId": 42})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 9, "activityType": "VIEW", "targetType": "POEM", "targetId": 42,
            "activityTimestamp": "2024-05-01T10:00:00Z"
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile/engagement/recent"))
        .and(query_param("days", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile/engagement/top/POET"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, memory_store());
    let interests = client.interests_by_type(InterestType::Poet).await.unwrap();
    assert_eq!(interests[0].interest_name, "Poe");
    client.remove_interest(InterestType::Poet, 5).await.unwrap();

    let tracked = client
        .track_engagement(
            &TrackEngagementRequest::builder()
                .activity_type(ActivityType::View)
                .target_type(TargetType::Poem)
                .target_id(42)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(tracked.id, 9);
    assert!(client.recent_engagement(None).await.unwrap().is_empty());
    assert!(client
        .top_engaged_content(TargetType::Poet, Some(7))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn bootstrap_profile_seeds_then_completes_onboarding() {
    let server = MockServer::start().await;
    let profile = json!({"id": "u1", "email": "ada.l@example.com", "onboardingCompleted": true});
    Mock::given(method("PUT"))
        .and(path("/api/profile"))
        .and(body_json(json!({
            "fullName": "Ada Lovelace",
            "username": "ada.l",
            "preferredLanguage": "en",
            "readingLevel": "BEGINNER",
            "profileVisibility": "PUBLIC"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(profile.clone())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/profile/complete-onboarding"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(profile)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, memory_store());
    let mut user = User::new("u1", "ada.l@example.com");
    user.full_name = Some("Ada Lovelace".into());
    let extended = client.bootstrap_profile(&user).await.unwrap();
    assert!(extended.onboarding_completed);
    assert_eq!(extended.preferred_language, "en");
}
