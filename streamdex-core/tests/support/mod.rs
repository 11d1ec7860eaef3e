#![allow(dead_code)]

pub mod upstream;

use std::sync::Arc;

use streamdex_core::{
    CatalogConfig, CatalogServices, database::sqlite::SqliteCatalogStore,
};

use self::upstream::ScriptedUpstream;

pub async fn services(
    upstream: Arc<ScriptedUpstream>,
    regions: &[&str],
) -> CatalogServices {
    let poster_dir =
        std::env::temp_dir().join(format!("streamdex-posters-{}", uuid::Uuid::new_v4().simple()));
    let config = CatalogConfig {
        watch_regions: regions.iter().map(|r| r.to_string()).collect(),
        dispatcher_concurrency: 4,
        poster_dir,
        ..CatalogConfig::default()
    };
    let store = SqliteCatalogStore::connect_in_memory()
        .await
        .expect("in-memory store");
    CatalogServices::build(config, store, upstream).expect("services")
}
