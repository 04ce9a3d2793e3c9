//! Racing mutations on one project must never break the place bounds

use tokio::task::JoinSet;
use voyage_projects::{Rejection, MAX_PLACES};

use crate::common::TestApp;

fn reason_of<T>(result: &voyage_common::Result<T>) -> Option<&'static str> {
    result.as_ref().err().and_then(|e| e.reason())
}

#[tokio::test]
async fn test_concurrent_adds_at_nine_admit_one() {
    let app = TestApp::new().await.unwrap();
    let project = app
        .create_project("Race to ten", &["1", "2", "3", "4", "5", "6", "7", "8", "9"])
        .await
        .unwrap();
    let id = project.project.id;

    let (a, b) = tokio::join!(
        app.service.add_place(id, "20".to_string(), None),
        app.service.add_place(id, "21".to_string(), None),
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let rejected = if a.is_err() { reason_of(&a) } else { reason_of(&b) };
    assert_eq!(rejected, Some("MAX_REACHED"));
    assert_eq!(app.place_count(id).await.unwrap(), MAX_PLACES);

    app.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_removes_at_two_keep_one() {
    let app = TestApp::new().await.unwrap();
    let project = app.create_project("Race to one", &["100", "200"]).await.unwrap();
    let id = project.project.id;

    let (a, b) = tokio::join!(
        app.service.remove_place(id, "100"),
        app.service.remove_place(id, "200"),
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let rejected = if a.is_err() { reason_of(&a) } else { reason_of(&b) };
    assert_eq!(rejected, Some("LAST_PLACE"));
    assert_eq!(app.place_count(id).await.unwrap(), 1);

    app.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_adds_of_same_artwork_store_one() {
    let app = TestApp::new().await.unwrap();
    let project = app.create_project("Same artwork", &["100"]).await.unwrap();
    let id = project.project.id;

    let (a, b) = tokio::join!(
        app.service.add_place(id, "300".to_string(), None),
        app.service.add_place(id, "300".to_string(), None),
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let rejected = if a.is_err() { reason_of(&a) } else { reason_of(&b) };
    assert_eq!(rejected, Some(Rejection::Duplicate { external_id: "300".to_string() }.reason()));
    assert_eq!(app.place_count(id).await.unwrap(), 2);

    app.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_burst_of_adds_stops_at_cap() {
    let app = TestApp::new().await.unwrap();
    let project = app.create_project("Burst", &["1"]).await.unwrap();
    let id = project.project.id;

    let mut tasks = JoinSet::new();
    for n in 100..115 {
        let service = app.service.clone();
        tasks.spawn(async move { service.add_place(id, n.to_string(), None).await });
    }
    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.unwrap());
    }

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted as i64, MAX_PLACES - 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| reason_of(r) == Some("MAX_REACHED")));
    assert_eq!(app.place_count(id).await.unwrap(), MAX_PLACES);

    app.cleanup().await.unwrap();
}
