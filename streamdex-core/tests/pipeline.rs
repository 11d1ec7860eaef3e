mod support;

use std::sync::Arc;

use streamdex_core::{
    CallerContext, MediaKind,
    discover::DiscoverQuery,
};

use support::{services, upstream::ScriptedUpstream};

fn movies_query(skip: i64) -> DiscoverQuery {
    DiscoverQuery {
        kind: MediaKind::Movie,
        provider_ids: vec![8],
        sort_by: "popularity.desc".into(),
        genre_id: None,
        age_range: None,
        skip,
        context: CallerContext::new("en-US"),
    }
}

fn first_id(page: &streamdex_core::discover::CatalogPage) -> i64 {
    page.results[0]["id"].as_i64().expect("id")
}

#[tokio::test]
async fn skip_walks_upstream_pages_and_repeats_are_cached() {
    let upstream = Arc::new(ScriptedUpstream::default());
    let services = services(upstream.clone(), &["FR"]).await;

    let first = services.discover.discover(&movies_query(0)).await.expect("skip 0");
    let second = services.discover.discover(&movies_query(20)).await.expect("skip 20");
    let third = services.discover.discover(&movies_query(40)).await.expect("skip 40");
    let again = services.discover.discover(&movies_query(20)).await.expect("skip 20 again");

    assert_eq!(first_id(&first), 100);
    assert_eq!(first_id(&second), 200);
    assert_eq!(first_id(&third), 300);
    assert_eq!(again, second);
    assert_eq!(upstream.calls_to("/discover/"), 3);
}

#[tokio::test]
async fn titles_are_enriched_once_and_served_by_lookup() {
    let upstream = Arc::new(ScriptedUpstream::default());
    let services = services(upstream.clone(), &["FR", "US"]).await;

    let page = services.discover.discover(&movies_query(0)).await.expect("discover");
    assert_eq!(page.results.len(), 20);
    assert_eq!(page.total_results(), Some(1000));
    assert_eq!(upstream.calls_to("/movie/"), 20);

    services.discover.discover(&movies_query(0)).await.expect("discover again");
    assert_eq!(upstream.calls_to("/movie/"), 20);

    let found = services
        .lookup
        .lookup(MediaKind::Movie, "tt:105", &services.default_context())
        .await
        .expect("cached title");
    assert_eq!(found.record.runtime.as_deref(), Some("1h35"));
    assert_eq!(found.record.imdb_id.as_deref(), Some("tt105"));
}

#[tokio::test]
async fn series_lookup_syncs_episodes() {
    let upstream = Arc::new(ScriptedUpstream::default());
    let services = services(upstream.clone(), &[]).await;
    let context = services.default_context();

    services
        .enricher
        .enrich(1399, MediaKind::Series, &context)
        .await
        .expect("enrich series");

    let found = services
        .lookup
        .lookup(MediaKind::Series, "1399", &context)
        .await
        .expect("cached series");

    assert_eq!(found.record.title.as_deref(), Some("Show 1399"));
    assert_eq!(found.record.runtime.as_deref(), Some("42min"));
    assert_eq!(found.episodes.len(), 1);
    assert_eq!(found.episodes[0].show_id, 1399);
}
