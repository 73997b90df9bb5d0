//! End-to-end resolution scenarios across the full engine surface.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tsunagi_core::{
    CandidateRecord, CatalogProfile, Format, MatchMethod, MemoryCatalog, ProfileSet, Resolver,
    SeasonCandidate, SourceIdentity, TtlCache,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn resolver() -> Resolver {
    Resolver::new(CatalogProfile::default()).unwrap()
}

fn date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[tokio::test]
async fn rezero_second_season_picks_the_right_entry() {
    init_tracing();

    let catalog = MemoryCatalog::new(vec![
        CandidateRecord {
            id: "rz-s1".into(),
            title: "Re:Zero Season 1".into(),
            episodes: Some(25),
            years: vec![2016],
            ..CandidateRecord::default()
        },
        CandidateRecord {
            id: "rz-s2".into(),
            title: "Re:Zero Season 2".into(),
            episodes: Some(25),
            years: vec![2020],
            ..CandidateRecord::default()
        },
    ]);

    let source = SourceIdentity {
        titles: vec![
            "Re:ZERO -Starting Life in Another World- 2nd Season".into(),
            "Re:Zero kara Hajimeru Isekai Seikatsu 2nd Season".into(),
        ],
        format: Some(Format::Tv),
        episodes: Some(25),
        year: Some(2020),
        ..SourceIdentity::default()
    };

    let result = resolver().resolve_identity(&source, &catalog).await;
    assert_eq!(result.foreign_id.as_deref(), Some("rz-s2"));
    assert!(matches!(
        result.method,
        MatchMethod::Year | MatchMethod::ExactEpisodeFormat
    ));
    assert!(result.score >= 0.4);
}

#[tokio::test]
async fn split_cour_source_lands_on_second_part() {
    init_tracing();

    let seasons = vec![
        SeasonCandidate {
            label: "Season 1".into(),
            slug: "s1".into(),
            episodes: Some(24),
            season_number: Some(1),
            air_date: date("2020-01-01"),
            ..SeasonCandidate::default()
        },
        SeasonCandidate {
            label: "Season 1 Part 2".into(),
            slug: "s1-p2".into(),
            episodes: Some(12),
            season_number: Some(1),
            part_number: Some(2),
            air_date: date("2020-07-01"),
            ..SeasonCandidate::default()
        },
    ];
    let catalog = MemoryCatalog::new(vec![]).with_seasons("show-1", seasons);

    let source = SourceIdentity {
        titles: vec!["Some Adventure".into()],
        episodes: Some(12),
        ..SourceIdentity::default()
    };

    let result = resolver().resolve_season("show-1", &source, &catalog).await;
    assert_eq!(result.slug.as_deref(), Some("s1-p2"));
    assert!(result.split_cour);
}

#[tokio::test]
async fn overlord_does_not_match_overlord_wars() {
    init_tracing();

    let catalog = MemoryCatalog::new(vec![CandidateRecord {
        id: "w1".into(),
        title: "Overlord Wars".into(),
        ..CandidateRecord::default()
    }]);

    let source = SourceIdentity {
        titles: vec!["Overlord".into()],
        ..SourceIdentity::default()
    };

    let result = resolver().resolve_identity(&source, &catalog).await;
    assert_eq!(result.method, MatchMethod::None);
    assert_eq!(result.foreign_id, None);
    assert_eq!(result.score, 0.0);
}

#[tokio::test]
async fn french_profile_resolves_saison_titles() {
    init_tracing();

    let profiles = ProfileSet::embedded().unwrap();
    let resolver = Resolver::new(profiles.get("french").unwrap().clone()).unwrap();

    let catalog = MemoryCatalog::new(vec![
        CandidateRecord {
            id: "fr-1".into(),
            title: "L'Attaque des Titans Saison 1".into(),
            ..CandidateRecord::default()
        },
        CandidateRecord {
            id: "fr-3".into(),
            title: "L'Attaque des Titans Saison 3".into(),
            ..CandidateRecord::default()
        },
    ]);

    let source = SourceIdentity {
        titles: vec!["L'Attaque des Titans Season 3".into()],
        format: Some(Format::Tv),
        ..SourceIdentity::default()
    };

    let result = resolver.resolve_identity(&source, &catalog).await;
    assert_eq!(result.foreign_id.as_deref(), Some("fr-3"));
}

#[tokio::test]
async fn shared_cache_and_concurrent_resolutions() {
    init_tracing();

    let cache = Arc::new(TtlCache::new(64, Duration::from_secs(300)));
    let resolver = Arc::new(
        Resolver::new(CatalogProfile::default())
            .unwrap()
            .with_cache(cache.clone()),
    );
    let catalog = Arc::new(MemoryCatalog::new(vec![
        CandidateRecord {
            id: "a1".into(),
            title: "Sousou no Frieren".into(),
            ..CandidateRecord::default()
        },
        CandidateRecord {
            id: "a2".into(),
            title: "Cowboy Bebop".into(),
            ..CandidateRecord::default()
        },
    ]));

    // Resolutions for different identities are independent; run them
    // concurrently against the shared resolver.
    let mut handles = Vec::new();
    for titles in [vec!["Sousou no Frieren"], vec!["Cowboy Bebop"]] {
        let resolver = resolver.clone();
        let catalog = catalog.clone();
        let source = SourceIdentity {
            titles: titles.into_iter().map(String::from).collect(),
            ..SourceIdentity::default()
        };
        handles.push(tokio::spawn(async move {
            resolver.resolve_identity(&source, &*catalog).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let result = handle.await.unwrap();
        ids.push(result.foreign_id.unwrap());
    }
    ids.sort();
    assert_eq!(ids, vec!["a1".to_string(), "a2".to_string()]);

    // Both results are now served from the cache.
    let source = SourceIdentity {
        titles: vec!["Cowboy Bebop".into()],
        ..SourceIdentity::default()
    };
    resolver.resolve_identity(&source, &*catalog).await;
    assert!(cache.stats().hits >= 1);
}
