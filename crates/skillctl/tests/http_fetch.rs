//! HTTP integration tests for catalog and resource fetching.
//!
//! Serves a small skills site with axum on a random local port and drives
//! the real `HttpFetcher` against it.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use skillctl::client::HttpFetcher;
use skills_core::resolve::{fetch_skill_resources, load_catalog, CatalogError, FetchError, Fetcher, Location, ResourceSources, SkillResources};
use std::time::Duration;
use tempfile::TempDir;

const CATALOG: &str = r#"{
    "total_skills": 2,
    "skills": {
        "alpha": {"category": "ai", "description": "First skill", "version": "1.0.0", "backends": ["openai"]},
        "beta": {"category": "ai", "description": "Second skill", "version": "2.0.0", "backends": ["local"]}
    },
    "categories": {"ai": {"description": "AI-powered skills", "skill_count": 2}}
}"#;

async fn serve() -> String {
    let app = Router::new()
        .route("/catalog.json", get(|| async { CATALOG }))
        .route(
            "/broken/catalog.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/invalid/catalog.json", get(|| async { "<html>not json</html>" }))
        .route("/site/alpha/README.md", get(|| async { "# alpha\n" }))
        .route("/site/alpha/pipeline-cli.yaml", get(|| async { "input:\n  stdin: {}\n" }))
        .route(
            "/repo/skills/ai/alpha/skill.yaml",
            get(|| async { "name: alpha\nversion: 1.0.0\n" }),
        )
        .route(
            "/repo/skills/ai/alpha/README.md",
            get(|| async { "# categorized copy\n" }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn catalog_falls_through_failed_sources() {
    let base = serve().await;
    let tmp = TempDir::new().unwrap();

    let candidates = vec![
        Location::File(tmp.path().join("catalog.json")),
        Location::parse(&format!("{base}/broken/catalog.json")),
        Location::parse(&format!("{base}/invalid/catalog.json")),
        Location::parse(&format!("{base}/catalog.json")),
    ];

    let catalog = load_catalog(&fetcher(), &candidates).await.unwrap();
    let names: Vec<_> = catalog.skills.names().collect();
    assert_eq!(names, vec!["alpha", "beta"]);
}

#[tokio::test]
async fn local_catalog_wins_over_remote() {
    let base = serve().await;
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("catalog.json");
    std::fs::write(
        &local,
        r#"{"total_skills": 1, "skills": {"gamma": {"category": "utilities", "description": "Local", "version": "0.1.0"}}}"#,
    )
    .unwrap();

    let candidates = vec![
        Location::File(local),
        Location::parse(&format!("{base}/catalog.json")),
    ];
    let catalog = load_catalog(&fetcher(), &candidates).await.unwrap();
    assert!(catalog.get("gamma").is_some());
    assert!(catalog.get("alpha").is_none());
}

#[tokio::test]
async fn catalog_unavailable_when_every_source_fails() {
    let base = serve().await;
    let candidates = vec![
        Location::parse(&format!("{base}/broken/catalog.json")),
        Location::parse(&format!("{base}/missing/catalog.json")),
    ];

    let Err(CatalogError::Unavailable { attempts }) = load_catalog(&fetcher(), &candidates).await else {
        panic!("expected catalog to be unavailable");
    };
    assert_eq!(attempts.len(), 2);
    assert!(matches!(attempts[0], FetchError::Status { status: 500, .. }));
    assert!(matches!(attempts[1], FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let base = serve().await;
    let err = fetcher()
        .fetch_text(&Location::parse(&format!("{base}/nope.txt")))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn resources_prefer_flat_layout_then_categorized() {
    let base = serve().await;
    let fetcher = fetcher();
    let catalog = load_catalog(&fetcher, &[Location::parse(&format!("{base}/catalog.json"))])
        .await
        .unwrap();
    let sources = ResourceSources {
        site_base: Location::parse(&format!("{base}/site")),
        remote_base: Location::parse(&format!("{base}/repo")),
    };

    let alpha = catalog.get("alpha").unwrap();
    let resources = fetch_skill_resources(&fetcher, &sources, "alpha", alpha).await;
    assert_eq!(resources.readme.as_deref(), Some("# alpha\n"));
    assert_eq!(resources.definition.as_deref(), Some("name: alpha\nversion: 1.0.0\n"));
    assert_eq!(resources.cli_pipeline.as_deref(), Some("input:\n  stdin: {}\n"));
    assert_eq!(resources.mcp_pipeline, None);

    let beta = catalog.get("beta").unwrap();
    let resources = fetch_skill_resources(&fetcher, &sources, "beta", beta).await;
    assert_eq!(resources, SkillResources::default());
}
