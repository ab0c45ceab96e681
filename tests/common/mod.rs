//! Local stand-ins for the search endpoint and the documentation host.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::Query,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};

use kestra_docs_mcp_server::core::config::DocsConfig;
use kestra_docs_mcp_server::domains::docs::DocsPipeline;

/// How long `/docs/slow` takes to answer.
pub const SLOW_PAGE_DELAY: Duration = Duration::from_millis(500);

/// How long `/docs/sleepy` takes, past [`IMPATIENT_TIMEOUT_SECS`].
pub const SLEEPY_PAGE_DELAY: Duration = Duration::from_secs(3);

/// Outbound timeout used by [`impatient_pipeline`].
pub const IMPATIENT_TIMEOUT_SECS: u64 = 1;

pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn html(body: &'static str) -> Response {
    ([(header::CONTENT_TYPE, "text/html")], body).into_response()
}

fn hits_for(query: &str) -> Option<Value> {
    let hits = match query {
        "workflow" => json!([
            {
                "url": "/docs/workflow-components/flow",
                "type": "page",
                "title": "Flow",
                "highlights": [
                    "A <mark>workflow</mark> is called a flow",
                    "Flows are defined in YAML<br/>and versioned"
                ]
            },
            {
                "url": "/docs/tutorial",
                "type": "page",
                "title": "Tutorial",
                "highlights": ["Build your first <em>workflow</em>"]
            }
        ]),
        "missing-page" => json!([
            {
                "url": "/docs/does-not-exist",
                "title": "Gone",
                "highlights": ["This <mark>page</mark> moved"]
            },
            { "url": "https://kestra.io/docs/elsewhere" }
        ]),
        "many" => Value::Array(
            (1..=7)
                .map(|i| {
                    json!({
                        "url": format!("/docs/gone-{}", i),
                        "title": format!("Hit {}", i),
                        "highlights": [format!("match {}", i)]
                    })
                })
                .collect(),
        ),
        "slow" => json!([{ "url": "/docs/slow", "title": "Slow" }]),
        "sleepy" => json!([
            { "url": "/docs/sleepy", "title": "Sleepy", "highlights": ["<mark>sleepy</mark> page"] }
        ]),
        "wrapped" => json!({ "results": [{ "url": "/docs/introduction.md", "title": "Intro" }] }),
        "boom" => return None,
        _ => json!([]),
    };
    Some(hits)
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
    let query = params.get("q").map(String::as_str).unwrap_or_default();
    match hits_for(query) {
        Some(hits) => Json(hits).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "search backend down").into_response(),
    }
}

/// Router serving `/search` plus a handful of pages under `/docs/`.
pub fn docs_site() -> Router {
    Router::new()
        .route("/search", get(search))
        .route(
            "/docs/workflow-components/flow",
            get(|| async {
                html(
                    "<html><body><nav>Menu</nav><main>\
                     <h1>Flow</h1>\
                     <p>A flow is a container for tasks.</p>\
                     </main></body></html>",
                )
            }),
        )
        .route(
            "/docs/introduction.md",
            get(|| async {
                html(
                    "<html><body><article>\
                     <h1>Welcome to Kestra</h1>\
                     <p>Kestra is an orchestration platform.</p>\
                     </article></body></html>",
                )
            }),
        )
        .route(
            "/docs/slow",
            get(|| async {
                tokio::time::sleep(SLOW_PAGE_DELAY).await;
                html("<html><body><main><h1>Slow</h1><p>Finally.</p></main></body></html>")
            }),
        )
        .route(
            "/docs/sleepy",
            get(|| async {
                tokio::time::sleep(SLEEPY_PAGE_DELAY).await;
                html("<html><body><main><h1>Sleepy</h1></main></body></html>")
            }),
        )
}

/// Documentation settings pointing at a fixture started with [`serve`].
pub fn docs_config(addr: SocketAddr) -> DocsConfig {
    DocsConfig {
        base_url: format!("http://{}/docs/", addr),
        site_url: format!("http://{}", addr),
        search_url: format!("http://{}/search", addr),
        timeout_secs: 5,
        ..Default::default()
    }
}

pub async fn fixture_pipeline() -> (SocketAddr, DocsPipeline) {
    let addr = serve(docs_site()).await;
    let pipeline = DocsPipeline::from_config(&docs_config(addr)).unwrap();
    (addr, pipeline)
}

/// Like [`fixture_pipeline`], but gives up on upstream requests after
/// [`IMPATIENT_TIMEOUT_SECS`].
pub async fn impatient_pipeline() -> (SocketAddr, DocsPipeline) {
    let addr = serve(docs_site()).await;
    let config = DocsConfig {
        timeout_secs: IMPATIENT_TIMEOUT_SECS,
        ..docs_config(addr)
    };
    let pipeline = DocsPipeline::from_config(&config).unwrap();
    (addr, pipeline)
}
