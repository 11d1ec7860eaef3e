use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use streamdex_core::{
    UpstreamError,
    upstream::{Upstream, UpstreamRequest},
};

/// Deterministic stand-in for the TMDB API.
///
/// Discover pages hold 20 titles each, numbered from `page * 100`; detail,
/// series and season requests are answered from the id in the path.
#[derive(Debug, Default)]
pub struct ScriptedUpstream {
    calls: Mutex<Vec<String>>,
}

impl ScriptedUpstream {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }

    fn discover_page(page: i64) -> Value {
        let results: Vec<Value> = (0..20)
            .map(|offset| {
                let id = page * 100 + offset;
                json!({
                    "id": id,
                    "title": format!("Title {id}"),
                    "poster_path": format!("/p{id}.jpg"),
                    "release_date": "2024-05-01"
                })
            })
            .collect();
        json!({ "page": page, "total_pages": 50, "total_results": 1000, "results": results })
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn get_json(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError> {
        let page = request.get_param("page").unwrap_or("-");
        self.calls
            .lock()
            .expect("calls lock")
            .push(format!("{}?page={page}", request.path()));

        let segments: Vec<&str> = request.path().split('/').collect();
        match segments.as_slice() {
            ["", "discover", _] => {
                let page = page.parse().map_err(|_| UpstreamError::ParseError(page.into()))?;
                Ok(Self::discover_page(page))
            }
            ["", "movie", id] => Ok(json!({
                "id": id.parse::<i64>().map_err(|_| UpstreamError::NotFound)?,
                "title": format!("Title {id}"),
                "runtime": 95,
                "videos": { "results": [] },
                "credits": { "cast": [], "crew": [] },
                "external_ids": { "imdb_id": format!("tt{id}") }
            })),
            ["", "tv", id] => Ok(json!({
                "id": id.parse::<i64>().map_err(|_| UpstreamError::NotFound)?,
                "name": format!("Show {id}"),
                "number_of_seasons": 1,
                "episode_run_time": [42]
            })),
            ["", "tv", _, "season", season] => Ok(json!({
                "episodes": [{
                    "id": 9001,
                    "season_number": season.parse::<i64>().unwrap_or(1),
                    "episode_number": 1,
                    "name": "Pilot"
                }]
            })),
            _ => Err(UpstreamError::NotFound),
        }
    }
}
