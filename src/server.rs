use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing, Json, Router,
};
use serde_json::json;
use tower_http::services::ServeDir;

use crate::aggregator::Aggregator;
use crate::error::{supported_platforms, QueryError};
use crate::models::Contest;
use crate::scraping::SourceInfo;

const FRONTEND_MISSING: &str =
    "<h1>Frontend not found!</h1><p>Please ensure 'static/index.html' exists.</p>";

#[derive(Clone)]
struct StaticDir(Arc<PathBuf>);

pub fn create_router(aggregator: Aggregator, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/", routing::get(index))
        .route("/contests", routing::get(all_contests))
        .route("/contests/:platform", routing::get(contests_by_platform))
        .route("/platforms", routing::get(platforms))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(Extension(Arc::new(aggregator)))
        .layer(Extension(StaticDir(Arc::new(static_dir))))
}

async fn index(Extension(StaticDir(dir)): Extension<StaticDir>) -> Response {
    match tokio::fs::read_to_string(dir.join("index.html")).await {
        Ok(page) => Html(page).into_response(),
        Err(err) => {
            tracing::warn!("index page unavailable in {}: {err}", dir.display());
            (StatusCode::NOT_FOUND, Html(FRONTEND_MISSING)).into_response()
        }
    }
}

async fn all_contests(Extension(aggregator): Extension<Arc<Aggregator>>) -> Json<Vec<Contest>> {
    Json(aggregator.all().await)
}

async fn contests_by_platform(
    Extension(aggregator): Extension<Arc<Aggregator>>,
    Path(platform): Path<String>,
) -> Result<Json<Vec<Contest>>, QueryError> {
    Ok(Json(aggregator.by_source(&platform).await?))
}

async fn platforms(Extension(aggregator): Extension<Arc<Aggregator>>) -> Json<Vec<SourceInfo>> {
    Json(aggregator.sources())
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        match self {
            QueryError::UnknownSource(name) => {
                tracing::info!("request for unknown platform {name:?}");
                let detail = format!(
                    "Platform not found. Supported platforms are: {}.",
                    supported_platforms()
                );
                (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
            }
        }
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tests::stub_aggregator;
    use axum::{body::Body, http::Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn router(codeforces_up: bool, static_dir: PathBuf) -> Router {
        create_router(stub_aggregator(codeforces_up), static_dir)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn lists_all_contests() {
        let (status, body) = get(router(true, PathBuf::from("static")), "/contests").await;
        assert_eq!(status, StatusCode::OK);

        let value: Value = serde_json::from_slice(&body).unwrap();
        let contests = value.as_array().unwrap();
        assert_eq!(contests.len(), 5);
        assert_eq!(contests[0]["name"], "Round 999");
        assert_eq!(contests[0]["platform"], "Codeforces");
        assert_eq!(contests[0]["start_time"], "2099-03-02T14:00:00Z");
        assert_eq!(contests[0]["duration_seconds"], 7200);
    }

    #[tokio::test]
    async fn filters_by_platform_name() {
        let (status, body) = get(router(true, PathBuf::from("static")), "/contests/LEETCODE").await;
        assert_eq!(status, StatusCode::OK);

        let contests: Vec<Contest> = serde_json::from_slice(&body).unwrap();
        assert_eq!(contests.len(), 1);
        assert_eq!(contests[0].name, "Weekly 500");
    }

    #[tokio::test]
    async fn unavailable_platform_is_an_empty_list() {
        let (status, body) = get(router(false, PathBuf::from("static")), "/contests/codeforces").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn unknown_platform_is_not_found() {
        let (status, body) = get(router(true, PathBuf::from("static")), "/contests/topcoder").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value["detail"],
            "Platform not found. Supported platforms are: Codeforces, LeetCode, CodeChef."
        );
    }

    #[tokio::test]
    async fn lists_platforms() {
        let (status, body) = get(router(true, PathBuf::from("static")), "/platforms").await;
        assert_eq!(status, StatusCode::OK);

        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value[1]["id"], "leetcode");
        assert_eq!(value[1]["name"], "LeetCode");
    }

    #[tokio::test]
    async fn index_falls_back_when_frontend_is_missing() {
        let missing = std::env::temp_dir().join("contest-scrape-no-frontend");
        let (status, body) = get(router(true, missing), "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, FRONTEND_MISSING.as_bytes());
    }

    #[tokio::test]
    async fn serves_index_and_assets() {
        let dir = std::env::temp_dir().join(format!("contest-scrape-static-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<h1>Upcoming contests</h1>").unwrap();
        std::fs::write(dir.join("script.js"), "fetchContests();").unwrap();

        let (status, body) = get(router(true, dir.clone()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<h1>Upcoming contests</h1>");

        let (status, body) = get(router(true, dir.clone()), "/static/script.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"fetchContests();");

        std::fs::remove_dir_all(&dir).ok();
    }
}
