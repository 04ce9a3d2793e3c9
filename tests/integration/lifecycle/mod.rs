//! End-to-end project lifecycle through the HTTP router

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use voyage_artworks::MockArtworkLookup;
use voyage_projects::{PlaceChanges, ProjectStatus};

use crate::common::TestApp;

fn places_body(ids: &[&str]) -> serde_json::Value {
    json!(ids.iter().map(|id| json!({ "external_id": id })).collect::<Vec<_>>())
}

mod test_create {
    use super::*;

    #[tokio::test]
    async fn test_create_project_resolves_artworks() {
        let app = TestApp::new().await.unwrap();

        let (status, body) = app
            .request(
                Method::POST,
                "/v1/projects",
                Some(json!({
                    "name": "Chicago weekend",
                    "start_date": "2026-05-01",
                    "places": places_body(&["100", "200"]),
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        let project_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
        app.track(project_id);

        assert_eq!(body["status"], "active");
        assert_eq!(body["places"].as_array().unwrap().len(), 2);
        assert_eq!(body["places"][0]["title"], "Artwork 100");
        assert_eq!(body["places"][1]["artist"], "Artist 200");
        assert_eq!(app.artworks.call_count(), 2);

        let (status, fetched) = app
            .request(Method::GET, &format!("/v1/projects/{}", project_id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["places"].as_array().unwrap().len(), 2);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_with_unknown_artwork_persists_nothing() {
        let app = TestApp::with_artworks(MockArtworkLookup::new().with_missing(["404404"]))
            .await
            .unwrap();
        let name = format!("Doomed {}", Uuid::new_v4().simple());

        let (status, body) = app
            .request(
                Method::POST,
                "/v1/projects",
                Some(json!({ "name": name, "places": places_body(&["100", "404404"]) })),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["details"]["places"]["404404"]["reason"],
            "NOT_FOUND"
        );
        assert_eq!(app.projects_named(&name).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_with_duplicate_ids_persists_nothing() {
        let app = TestApp::new().await.unwrap();
        let name = format!("Twice {}", Uuid::new_v4().simple());

        let (status, body) = app
            .request(
                Method::POST,
                "/v1/projects",
                Some(json!({ "name": name, "places": places_body(&["100", "200", "100"]) })),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["places"]["100"]["reason"], "DUPLICATE");
        assert_eq!(app.artworks.call_count(), 0);
        assert_eq!(app.projects_named(&name).await.unwrap(), 0);
    }
}

mod test_place_collection {
    use super::*;

    #[tokio::test]
    async fn test_add_until_cap() {
        let app = TestApp::new().await.unwrap();
        let ids: Vec<String> = (1..=9).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let project = app.create_project("Capped", &refs).await.unwrap();
        let uri = format!("/v1/projects/{}/places", project.project.id);

        let (status, body) = app
            .request(Method::POST, &uri, Some(json!({ "external_id": "10" })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["external_id"], "10");
        assert_eq!(body["visited"], false);

        let calls_before = app.artworks.call_count();
        let (status, body) = app
            .request(Method::POST, &uri, Some(json!({ "external_id": "11" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["reason"], "MAX_REACHED");
        assert_eq!(app.artworks.call_count(), calls_before);
        assert_eq!(app.place_count(project.project.id).await.unwrap(), 10);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_add_duplicate_rejected() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Dupes", &["100"]).await.unwrap();
        let uri = format!("/v1/projects/{}/places", project.project.id);

        let (status, body) = app
            .request(Method::POST, &uri, Some(json!({ "external_id": "100" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["reason"], "DUPLICATE");
        assert_eq!(app.place_count(project.project.id).await.unwrap(), 1);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_add_unavailable_artwork() {
        let app = TestApp::with_artworks(MockArtworkLookup::new().with_unavailable(["503"]))
            .await
            .unwrap();
        let project = app.create_project("Flaky", &["100"]).await.unwrap();
        let uri = format!("/v1/projects/{}/places", project.project.id);

        let (status, body) = app
            .request(Method::POST, &uri, Some(json!({ "external_id": "503" })))
            .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["reason"], "UNAVAILABLE");
        assert_eq!(app.place_count(project.project.id).await.unwrap(), 1);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_add_to_missing_project() {
        let app = TestApp::new().await.unwrap();
        let uri = format!("/v1/projects/{}/places", Uuid::new_v4());

        let (status, _) = app
            .request(Method::POST, &uri, Some(json!({ "external_id": "100" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(app.artworks.call_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_last_place_conflicts() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Solo", &["100", "200"]).await.unwrap();
        let base = format!("/v1/projects/{}/places", project.project.id);

        let (status, _) = app
            .request(Method::DELETE, &format!("{}/200", base), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = app
            .request(Method::DELETE, &format!("{}/100", base), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["reason"], "LAST_PLACE");
        assert_eq!(app.place_count(project.project.id).await.unwrap(), 1);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_unknown_place() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Missing", &["100", "200"]).await.unwrap();
        let uri = format!("/v1/projects/{}/places/999", project.project.id);

        let (status, _) = app.request(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(app.place_count(project.project.id).await.unwrap(), 2);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_add_then_remove_round_trip() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Round trip", &["100"]).await.unwrap();
        let id = project.project.id;

        app.service
            .add_place(id, "200".to_string(), Some("Gallery 240".to_string()))
            .await
            .unwrap();
        assert_eq!(app.place_count(id).await.unwrap(), 2);

        app.service.remove_place(id, "200").await.unwrap();
        assert_eq!(app.place_count(id).await.unwrap(), 1);

        let places = app.service.list_places(id).await.unwrap();
        assert_eq!(places[0].external_id, "100");

        app.cleanup().await.unwrap();
    }
}

mod test_status {
    use super::*;

    async fn set_visited(app: &TestApp, project_id: Uuid, external_id: &str, visited: bool) {
        app.service
            .update_place(
                project_id,
                external_id,
                PlaceChanges {
                    notes: None,
                    visited: Some(visited),
                },
            )
            .await
            .unwrap();
    }

    async fn status_of(app: &TestApp, project_id: Uuid) -> ProjectStatus {
        app.service.get_project(project_id).await.unwrap().project.status
    }

    #[tokio::test]
    async fn test_visiting_every_place_completes_project() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Visits", &["100", "200"]).await.unwrap();
        let id = project.project.id;

        set_visited(&app, id, "100", true).await;
        assert_eq!(status_of(&app, id).await, ProjectStatus::Active);

        let uri = format!("/v1/projects/{}/places/200", id);
        let (status, body) = app
            .request(Method::PATCH, &uri, Some(json!({ "visited": true })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["visited"], true);
        assert_eq!(status_of(&app, id).await, ProjectStatus::Completed);

        set_visited(&app, id, "200", false).await;
        assert_eq!(status_of(&app, id).await, ProjectStatus::Active);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_adding_place_reopens_completed_project() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Reopen", &["100"]).await.unwrap();
        let id = project.project.id;

        set_visited(&app, id, "100", true).await;
        assert_eq!(status_of(&app, id).await, ProjectStatus::Completed);

        app.service.add_place(id, "200".to_string(), None).await.unwrap();
        assert_eq!(status_of(&app, id).await, ProjectStatus::Active);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_removing_unvisited_place_completes_project() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Trim", &["100", "200"]).await.unwrap();
        let id = project.project.id;

        set_visited(&app, id, "100", true).await;
        assert_eq!(status_of(&app, id).await, ProjectStatus::Active);

        app.service.remove_place(id, "200").await.unwrap();
        assert_eq!(status_of(&app, id).await, ProjectStatus::Completed);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_sync_repairs_drift_once() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Drift", &["100"]).await.unwrap();
        let id = project.project.id;

        let first = app.service.sync_status(id).await.unwrap();
        assert_eq!(first.status, ProjectStatus::Active);
        assert!(!first.changed);

        sqlx::query("UPDATE travel_projects SET status = 'completed' WHERE id = $1")
            .bind(id)
            .execute(&app.pool)
            .await
            .unwrap();

        let (status, body) = app
            .request(Method::POST, &format!("/v1/projects/{}/sync", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");
        assert_eq!(body["changed"], true);

        let again = app.service.sync_status(id).await.unwrap();
        assert_eq!(again.status, ProjectStatus::Active);
        assert!(!again.changed);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_status_cannot_be_patched() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Readonly", &["100"]).await.unwrap();
        let id = project.project.id;

        let (status, body) = app
            .request(
                Method::PATCH,
                &format!("/v1/projects/{}", id),
                Some(json!({ "name": "Renamed", "status": "completed" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Renamed");
        assert_eq!(body["status"], "active");

        app.cleanup().await.unwrap();
    }
}

mod test_update_project {
    use super::*;

    #[tokio::test]
    async fn test_patch_sets_then_clears_optional_fields() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Clearable", &["100"]).await.unwrap();
        let uri = format!("/v1/projects/{}", project.project.id);

        let (status, body) = app
            .request(
                Method::PATCH,
                &uri,
                Some(json!({ "description": "Loop tour", "start_date": "2026-05-01" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "Loop tour");
        assert_eq!(body["start_date"], "2026-05-01");

        let (status, body) = app
            .request(Method::PATCH, &uri, Some(json!({ "name": "Renamed" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "Loop tour");
        assert_eq!(body["start_date"], "2026-05-01");

        let (status, body) = app
            .request(
                Method::PATCH,
                &uri,
                Some(json!({ "description": null, "start_date": null })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["description"].is_null());
        assert!(body["start_date"].is_null());
        assert_eq!(body["name"], "Renamed");

        let stored = app.service.get_project(project.project.id).await.unwrap();
        assert!(stored.project.description.is_none());
        assert!(stored.project.start_date.is_none());

        app.cleanup().await.unwrap();
    }
}

mod test_delete {
    use super::*;

    #[tokio::test]
    async fn test_delete_blocked_by_visited_places() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Memories", &["100", "200"]).await.unwrap();
        let id = project.project.id;
        let uri = format!("/v1/projects/{}", id);

        app.service
            .update_place(
                id,
                "100",
                PlaceChanges {
                    notes: None,
                    visited: Some(true),
                },
            )
            .await
            .unwrap();

        let (status, body) = app.request(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["reason"], "HAS_VISITED_PLACES");
        assert_eq!(app.place_count(id).await.unwrap(), 2);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unvisited_project_cascades() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Scrapped", &["100", "200"]).await.unwrap();
        let id = project.project.id;
        let uri = format!("/v1/projects/{}", id);

        let (status, _) = app.request(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(app.place_count(id).await.unwrap(), 0);

        let (status, _) = app.request(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod test_listing {
    use super::*;

    #[tokio::test]
    async fn test_search_matches_name() {
        let app = TestApp::new().await.unwrap();
        let project = app.create_project("Searchable", &["100"]).await.unwrap();
        let needle = project.project.name.clone();

        let (status, body) = app
            .request(
                Method::GET,
                &format!("/v1/projects?search={}&ordering=-name", needle.replace(' ', "%20")),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], project.project.id.to_string());
        assert_eq!(items[0]["places"].as_array().unwrap().len(), 1);

        app.cleanup().await.unwrap();
    }
}
