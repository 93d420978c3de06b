use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::catalog::{CatalogError, DetailCache, EntityDetail, EntitySummary, SortKey, ViewMode};
use crate::controller::{total_pages, Navigation, ResultSetController};
use crate::session::{fetch_filter, fetch_page, Session, SessionOptions};
use crate::source::{fetch_details, CatalogSource, FetchLimit, HttpCatalog, HttpCatalogOptions};

fn entity(id: u32, name: &str) -> EntitySummary {
    EntitySummary {
        id,
        name: name.to_string(),
        detail_url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
    }
}

fn numbered(n: u32) -> Vec<EntitySummary> {
    (1..=n).map(|id| entity(id, &format!("mon-{id}"))).collect()
}

fn detail(id: u32, categories: &[&str]) -> EntityDetail {
    EntityDetail {
        id,
        categories: categories.iter().map(|c| c.to_string()).collect(),
        ..Default::default()
    }
}

fn ids(entities: &[&EntitySummary]) -> Vec<u32> {
    entities.iter().map(|e| e.id).collect()
}

#[derive(Default)]
struct FakeCatalog {
    summaries: Vec<EntitySummary>,
    details: HashMap<u32, EntityDetail>,
    fail_list: bool,
    calls: Mutex<Vec<u32>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeCatalog {
    fn with(summaries: Vec<EntitySummary>, details: Vec<EntityDetail>) -> Self {
        Self {
            summaries,
            details: details.into_iter().map(|d| (d.id, d)).collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

impl CatalogSource for FakeCatalog {
    async fn fetch_summaries(&self) -> Result<Vec<EntitySummary>, CatalogError> {
        if self.fail_list {
            return Err(CatalogError::Status {
                url: "https://pokeapi.co/api/v2/pokemon?limit=20000".to_string(),
                status: 503,
            });
        }
        Ok(self.summaries.clone())
    }

    async fn fetch_detail(&self, id: u32) -> Option<EntityDetail> {
        self.calls.lock().unwrap().push(id);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.details.get(&id).cloned()
    }
}

async fn loaded_session(source: FakeCatalog, page_size: usize) -> Session<FakeCatalog> {
    let mut session = Session::new(
        source,
        SessionOptions {
            page_size,
            concurrency: 4,
        },
    )
    .unwrap();
    session.load().await.unwrap();
    session
}

#[test]
fn total_pages_is_ceiling_with_a_floor_of_one() {
    for page_size in 1..=15usize {
        for n in 0..=60usize {
            let expected = std::cmp::max(1, (n + page_size - 1) / page_size);
            assert_eq!(total_pages(n, page_size), expected, "n={n} size={page_size}");
        }
    }
}

#[test]
fn twenty_five_entities_make_three_pages_and_clamp() {
    let mut c = ResultSetController::with_entities(numbered(25), 12);
    assert_eq!(c.total_pages(), 3);

    assert!(c.go_to_page(5));
    assert_eq!(c.current_page(), 3);
    assert_eq!(ids(&c.current_page_slice()), vec![25]);

    assert!(c.go_to_page(0));
    assert_eq!(c.current_page(), 1);
    assert_eq!(c.current_page_slice().len(), 12);
}

#[test]
fn go_to_page_twice_changes_state_once() {
    let mut c = ResultSetController::with_entities(numbered(25), 12);
    let before = c.generation();
    assert!(c.go_to_page(2));
    assert!(!c.go_to_page(2));
    assert_eq!(c.generation(), before + 1);
    assert_eq!(c.current_page(), 2);
}

#[test]
fn navigation_moves_between_boundaries() {
    let mut c = ResultSetController::with_entities(numbered(30), 12);
    assert!(!c.navigate(Navigation::Previous));
    assert!(!c.navigate(Navigation::First));
    assert!(c.navigate(Navigation::Last));
    assert_eq!(c.current_page(), 3);
    assert!(!c.navigate(Navigation::Next));
    assert!(c.navigate(Navigation::Previous));
    assert_eq!(c.current_page(), 2);
    assert!(c.navigate(Navigation::GoTo(99)));
    assert_eq!(c.current_page(), 3);
}

#[test]
fn pagination_flags_follow_the_current_page() {
    let mut c = ResultSetController::with_entities(numbered(25), 12);
    let first = c.pagination();
    assert!(first.first_disabled && first.prev_disabled);
    assert!(!first.next_disabled && !first.last_disabled);

    c.navigate(Navigation::Last);
    let last = c.pagination();
    assert!(!last.first_disabled && !last.prev_disabled);
    assert!(last.next_disabled && last.last_disabled);
    assert_eq!(last.total_items, 25);
}

#[test]
fn typed_page_input_outside_the_range_is_rejected() {
    let mut c = ResultSetController::with_entities(numbered(25), 12);
    c.go_to_page(2);
    assert_eq!(c.go_to_input("7"), Err(2));
    assert_eq!(c.go_to_input("0"), Err(2));
    assert_eq!(c.go_to_input("abc"), Err(2));
    assert_eq!(c.current_page(), 2);
    assert_eq!(c.go_to_input(" 3 "), Ok(true));
    assert_eq!(c.go_to_input("3"), Ok(false));
}

#[test]
fn id_descending_is_the_exact_reverse_of_ascending() {
    let mut c = ResultSetController::with_entities(
        vec![
            entity(7, "squirtle"),
            entity(1, "bulbasaur"),
            entity(25, "pikachu"),
            entity(4, "charmander"),
        ],
        12,
    );
    c.set_sort(SortKey::IdAsc);
    let asc = ids(&c.active_view());
    assert_eq!(asc, vec![1, 4, 7, 25]);
    c.set_sort(SortKey::IdDesc);
    let mut desc = ids(&c.active_view());
    desc.reverse();
    assert_eq!(desc, asc);
}

#[test]
fn name_sort_folds_case_and_keeps_ties_in_prior_order() {
    let mut c = ResultSetController::with_entities(
        vec![
            entity(3, "ditto"),
            entity(2, "Abra"),
            entity(9, "ditto"),
            entity(1, "ditto"),
            entity(5, "beedrill"),
        ],
        12,
    );
    // installed in id order, so the dittos start out as 1, 3, 9
    c.set_sort(SortKey::NameAsc);
    assert_eq!(ids(&c.active_view()), vec![2, 5, 1, 3, 9]);
    c.set_sort(SortKey::NameDesc);
    assert_eq!(ids(&c.active_view()), vec![1, 3, 9, 5, 2]);
}

#[test]
fn name_sort_orders_by_code_point() {
    let mut c = ResultSetController::with_entities(
        vec![entity(1, "Élan"), entity(2, "zubat"), entity(3, "abra")],
        12,
    );
    c.set_sort(SortKey::NameAsc);
    assert_eq!(ids(&c.active_view()), vec![3, 2, 1]);
}

#[test]
fn sort_keeps_the_current_page() {
    let mut c = ResultSetController::with_entities(numbered(40), 12);
    c.go_to_page(3);
    c.set_sort(SortKey::IdDesc);
    assert_eq!(c.current_page(), 3);
    assert_eq!(c.current_page_slice()[0].id, 16);
    assert_eq!(c.sort_key(), SortKey::IdDesc);
}

#[test]
fn search_pika_matches_only_pikachu() {
    let mut c = ResultSetController::with_entities(
        vec![entity(25, "pikachu"), entity(26, "raichu")],
        12,
    );
    c.set_search_term("pika");
    assert_eq!(ids(&c.active_view()), vec![25]);
}

#[test]
fn search_is_case_insensitive_and_matches_ids() {
    let mut c = ResultSetController::with_entities(
        vec![
            entity(1, "bulbasaur"),
            entity(25, "pikachu"),
            entity(125, "electabuzz"),
            entity(172, "pichu"),
            entity(250, "ho-oh"),
            entity(300, "skitty25"),
        ],
        12,
    );
    c.set_search_term("25");
    assert_eq!(ids(&c.active_view()), vec![25, 125, 250, 300]);
    c.set_search_term("PICHU");
    assert_eq!(ids(&c.active_view()), vec![172]);
}

#[test]
fn search_resets_to_the_first_page() {
    let mut c = ResultSetController::with_entities(numbered(40), 12);
    c.go_to_page(3);
    c.set_search_term("mon");
    assert_eq!(c.current_page(), 1);
    assert_eq!(c.active_len(), 40);
}

#[test]
fn clearing_search_restores_the_sorted_collection() {
    let mut c = ResultSetController::with_entities(numbered(30), 12);
    c.set_sort(SortKey::IdDesc);
    let before = ids(&c.active_view());
    c.set_search_term("mon-1");
    assert!(c.active_len() < 30);
    c.set_search_term("   ");
    assert_eq!(c.mode(), &ViewMode::All);
    assert_eq!(ids(&c.active_view()), before);
}

#[test]
fn zero_match_category_yields_one_empty_page() {
    let mut c = ResultSetController::with_entities(numbered(25), 12);
    let details: DetailCache = (1..=25).map(|id| (id, Some(detail(id, &["grass"])))).collect();
    assert_eq!(c.set_category_filter(Some("dragon"), &details), 0);
    assert_eq!(c.total_pages(), 1);
    assert!(c.current_page_slice().is_empty());

    assert!(!c.navigate(Navigation::Next));
    assert!(!c.navigate(Navigation::Last));
    assert!(!c.go_to_page(4));
    assert_eq!(c.go_to_input("2"), Err(1));
    assert!(c.current_page_slice().is_empty());
    assert_eq!(c.current_page(), 1);
}

#[test]
fn category_filter_excludes_entities_without_details() {
    let mut c = ResultSetController::with_entities(numbered(4), 12);
    let mut details = DetailCache::new();
    details.insert(1, Some(detail(1, &["Fire"])));
    details.insert(2, None);
    details.insert(3, Some(detail(3, &["water", "fire"])));
    assert_eq!(c.set_category_filter(Some("fire"), &details), 2);
    assert_eq!(ids(&c.active_view()), vec![1, 3]);
    assert_eq!(c.mode(), &ViewMode::Category("fire".to_string()));
}

#[test]
fn search_and_category_replace_each_other() {
    let mut c = ResultSetController::with_entities(numbered(12), 5);
    let details: DetailCache = (1..=12)
        .map(|id| {
            let kind = if id % 2 == 0 { "water" } else { "fire" };
            (id, Some(detail(id, &[kind])))
        })
        .collect();

    c.set_category_filter(Some("water"), &details);
    assert_eq!(c.active_len(), 6);

    c.set_search_term("mon-1");
    assert_eq!(c.mode(), &ViewMode::Search("mon-1".to_string()));
    assert_eq!(ids(&c.active_view()), vec![1, 10, 11, 12]);

    c.set_category_filter(Some("fire"), &details);
    assert_eq!(ids(&c.active_view()), vec![1, 3, 5, 7, 9, 11]);

    // an empty search term only leaves search mode
    c.set_search_term("");
    assert_eq!(c.mode(), &ViewMode::Category("fire".to_string()));
    c.set_category_filter(None, &details);
    assert_eq!(c.mode(), &ViewMode::All);
    assert_eq!(c.active_len(), 12);
}

#[test]
fn sorting_under_a_filter_keeps_the_filter() {
    let mut c = ResultSetController::with_entities(numbered(6), 12);
    let details: DetailCache = (1..=6)
        .map(|id| (id, Some(detail(id, if id > 3 { &["ice"] } else { &["rock"] }))))
        .collect();
    c.set_category_filter(Some("ice"), &details);
    c.set_sort(SortKey::IdDesc);
    assert_eq!(ids(&c.active_view()), vec![6, 5, 4]);
}

#[test]
fn find_resolves_ids_and_names() {
    let c = ResultSetController::with_entities(
        vec![entity(25, "pikachu"), entity(26, "raichu")],
        12,
    );
    assert_eq!(c.find("#0025").map(|e| e.id), Some(25));
    assert_eq!(c.find("26").map(|e| e.id), Some(26));
    assert_eq!(c.find("Raichu").map(|e| e.id), Some(26));
    assert!(c.find("mew").is_none());
}

#[tokio::test]
async fn page_load_fetches_only_the_visible_details_once() {
    let source = FakeCatalog::with(
        numbered(25),
        (1..=25).map(|id| detail(id, &["normal"])).collect(),
    );
    let mut session = loaded_session(source, 12).await;

    let view = session.page().await.unwrap();
    assert_eq!(view.entries.len(), 12);
    assert!(view.entries.iter().all(|e| e.detail.is_some()));
    let mut calls = session.source().calls();
    calls.sort_unstable();
    assert_eq!(calls, (1..=12).collect::<Vec<_>>());

    session.page().await.unwrap();
    assert_eq!(session.source().calls().len(), 12);
}

#[tokio::test]
async fn failed_detail_keeps_the_entity_without_badges() {
    let source = FakeCatalog::with(
        vec![entity(1, "bulbasaur"), entity(2, "ivysaur")],
        vec![detail(1, &["grass", "poison"])],
    );
    let mut session = loaded_session(source, 12).await;
    let view = session.page().await.unwrap();
    assert_eq!(view.entries.len(), 2);
    assert!(view.entries[1].detail.is_none());

    let cards = crate::output::build_records(&view.entries, "https://img.example");
    assert_eq!(cards[0].categories, vec!["grass", "poison"]);
    assert!(cards[1].categories.is_empty());
    assert_eq!(cards[1].label, "#0002");
    assert_eq!(cards[1].name, "Ivysaur");
}

#[tokio::test]
async fn superseded_page_load_is_discarded() {
    let source = FakeCatalog::with(numbered(25), Vec::new());
    let mut session = loaded_session(source, 12).await;

    let first = session.begin_page();
    assert!(session.navigate(Navigation::Next));
    let second = session.begin_page();

    let stale = fetch_page(session.source(), first, session.limit()).await;
    let fresh = fetch_page(session.source(), second, session.limit()).await;

    let view = session.commit_page(fresh).unwrap();
    assert_eq!(view.pagination.current_page, 2);
    assert_eq!(view.entries[0].summary.id, 13);
    assert!(session.commit_page(stale).is_none());
    // the discarded load still fills the cache
    assert_eq!(session.details().len(), 24);
}

#[tokio::test]
async fn category_filter_fans_out_over_the_whole_collection() {
    let source = FakeCatalog::with(
        numbered(20),
        (1..=20)
            .filter(|id| id % 5 != 0)
            .map(|id| detail(id, if id % 2 == 0 { &["water"] } else { &["fire"] }))
            .collect(),
    );
    let mut session = loaded_session(source, 12).await;

    let matches = session.filter(Some("Water")).await;
    // 10 and 20 failed to load, so they never match
    assert_eq!(matches, 8);
    assert_eq!(session.source().calls().len(), 20);
    assert!(session.source().peak_in_flight.load(Ordering::SeqCst) <= 4);
    assert_eq!(session.categories(), vec!["fire", "water"]);

    let view = session.page().await.unwrap();
    assert_eq!(view.entries.len(), 8);
    assert_eq!(session.source().calls().len(), 20);

    session.filter(Some("ghost")).await;
    let empty = session.page().await.unwrap();
    assert!(matches!(empty.results(), Err(CatalogError::NoResults)));
    assert_eq!(empty.pagination.total_pages, 1);
}

#[tokio::test]
async fn fetch_details_keeps_input_order_and_bounds_concurrency() {
    let source = FakeCatalog::with(Vec::new(), (1..=10).map(|id| detail(id, &["bug"])).collect());
    let ids: Vec<u32> = vec![9, 3, 7, 1, 10, 2, 8, 4, 6, 5, 11];
    let out = fetch_details(&source, &ids, &FetchLimit::new(3)).await;
    assert_eq!(out.iter().map(|(id, _)| *id).collect::<Vec<_>>(), ids);
    assert!(out[10].1.is_none());
    assert!(source.peak_in_flight.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn overlapping_page_loads_share_one_request_bound() {
    use futures::stream::{FuturesUnordered, StreamExt};

    let source = FakeCatalog::with(numbered(60), Vec::new());
    let mut session = loaded_session(source, 12).await;

    let loads = FuturesUnordered::new();
    loads.push(fetch_page(session.source(), session.begin_page(), session.limit()));
    for _ in 0..3 {
        session.navigate(Navigation::Next);
        loads.push(fetch_page(session.source(), session.begin_page(), session.limit()));
    }
    let fetches: Vec<_> = loads.collect().await;

    assert_eq!(fetches.len(), 4);
    assert_eq!(session.source().calls().len(), 48);
    assert!(session.source().peak_in_flight.load(Ordering::SeqCst) <= 4);
}

#[tokio::test]
async fn category_filter_overtaken_by_a_search_is_discarded() {
    let source = FakeCatalog::with(
        numbered(6),
        (1..=6).map(|id| detail(id, &["fire"])).collect(),
    );
    let mut session = loaded_session(source, 12).await;

    let request = session.begin_filter(Some("fire"));
    assert_eq!(request.missing().len(), 6);
    session.search("mon-2");
    let fetch = fetch_filter(session.source(), request, session.limit()).await;

    assert_eq!(session.commit_filter(fetch), None);
    assert_eq!(session.controller().mode(), &ViewMode::Search("mon-2".to_string()));
    assert_eq!(session.details().len(), 6);

    let request = session.begin_filter(Some("fire"));
    assert!(request.missing().is_empty());
    let fetch = fetch_filter(session.source(), request, session.limit()).await;
    assert_eq!(session.commit_filter(fetch), Some(6));
    assert_eq!(session.source().calls().len(), 6);
}

#[tokio::test]
async fn reloading_applies_the_current_sort() {
    let source = FakeCatalog::with(numbered(5), Vec::new());
    let mut session = loaded_session(source, 12).await;
    session.sort(SortKey::IdDesc);
    session.load().await.unwrap();

    assert_eq!(session.controller().sort_key(), SortKey::IdDesc);
    assert_eq!(ids(&session.controller().active_view()), vec![5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn list_failure_leaves_an_empty_session() {
    let source = FakeCatalog {
        fail_list: true,
        ..Default::default()
    };
    let mut session = Session::new(source, SessionOptions::default()).unwrap();
    let err = session.load().await.unwrap_err();
    assert!(matches!(err, CatalogError::Status { status: 503, .. }));
    let view = session.page().await.unwrap();
    assert!(view.results().is_err());
    assert_eq!(view.pagination.total_pages, 1);
}

#[tokio::test]
async fn inspect_uses_the_cache_and_reports_unknown_entities() {
    let source = FakeCatalog::with(
        vec![entity(25, "pikachu")],
        vec![EntityDetail {
            id: 25,
            categories: vec!["electric".to_string()],
            weight: Some(60),
            height: Some(4),
            abilities: vec!["static".to_string(), "lightning-rod".to_string()],
            sprite_url: None,
        }],
    );
    let mut session = loaded_session(source, 12).await;

    let (summary, found) = session.inspect("pikachu").await.unwrap();
    assert_eq!(summary.id, 25);
    assert_eq!(found.weight, Some(60));
    session.inspect("#25").await.unwrap();
    assert_eq!(session.source().calls(), vec![25]);

    assert!(matches!(
        session.inspect("mew").await,
        Err(CatalogError::NotFound { .. })
    ));
}

#[test]
fn session_rejects_zero_sizes() {
    let zero_page = SessionOptions {
        page_size: 0,
        concurrency: 1,
    };
    assert!(Session::new(FakeCatalog::default(), zero_page).is_err());
    let zero_concurrency = SessionOptions {
        page_size: 12,
        concurrency: 0,
    };
    assert!(Session::new(FakeCatalog::default(), zero_concurrency).is_err());
}

#[test]
fn list_parsing_skips_alternate_forms_and_bad_urls() {
    let body = r#"{
        "count": 4,
        "results": [
            {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
            {"name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon/25/"},
            {"name": "broken", "url": "https://pokeapi.co/api/v2/pokemon/broken/"},
            {"name": "venusaur-mega", "url": "https://pokeapi.co/api/v2/pokemon/10033/"}
        ]
    }"#;
    let out = crate::source::parse_summaries(body, 10000).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[1].id, 25);
    assert_eq!(out[1].name, "pikachu");
    assert_eq!(out[1].detail_url, "https://pokeapi.co/api/v2/pokemon/25/");
}

#[test]
fn detail_parsing_orders_types_by_slot() {
    let body = r#"{
        "id": 6,
        "name": "charizard",
        "weight": 905,
        "height": 17,
        "types": [
            {"slot": 2, "type": {"name": "flying", "url": ""}},
            {"slot": 1, "type": {"name": "fire", "url": ""}}
        ],
        "abilities": [{"ability": {"name": "blaze", "url": ""}, "is_hidden": false}],
        "sprites": {"front_default": "https://img.example/6.png"}
    }"#;
    let d = crate::source::parse_detail(body).unwrap();
    assert_eq!(d.id, 6);
    assert_eq!(d.categories, vec!["fire", "flying"]);
    assert_eq!(d.abilities, vec!["blaze"]);
    assert_eq!(d.sprite_url.as_deref(), Some("https://img.example/6.png"));
    assert!(crate::source::parse_detail("{\"name\": \"x\"}").is_err());
}

#[tokio::test]
async fn text_and_json_pages_show_cards_or_the_empty_message() {
    colored::control::set_override(false);
    let source = FakeCatalog::with(
        vec![entity(25, "pikachu"), entity(26, "raichu")],
        vec![detail(25, &["electric"])],
    );
    let mut session = loaded_session(source, 12).await;
    let view = session.page().await.unwrap();

    let text = crate::output::render_text(&view, "https://img.example/home");
    assert!(text.contains("#0025  Pikachu"));
    assert!(text.contains("[electric]"));
    assert!(text.contains("https://img.example/home/26.png"));
    assert!(text.contains("Page 1 of 1"));

    let json: serde_json::Value =
        serde_json::from_slice(&crate::output::render_json(&view, "https://img.example")).unwrap();
    assert_eq!(json["cards"][0]["label"], "#0025");
    assert_eq!(json["pagination"]["total_pages"], 1);
    assert_eq!(json["sort"], "id-asc");

    session.search("zzz");
    let empty = session.page().await.unwrap();
    let text = crate::output::render_text(&empty, "https://img.example");
    assert!(text.contains("no entities match the current search or filter"));
    let json: serde_json::Value =
        serde_json::from_slice(&crate::output::render_json(&empty, "https://img.example")).unwrap();
    assert_eq!(json["cards"].as_array().map(Vec::len), Some(0));
    assert_eq!(json["mode"]["mode"], "search");
}

#[tokio::test]
async fn html_cards_are_escaped_and_boundary_buttons_disabled() {
    let source = FakeCatalog::with(vec![entity(1, "<mr>&mime")], Vec::new());
    let mut session = loaded_session(source, 12).await;
    let view = session.page().await.unwrap();
    let html = String::from_utf8(crate::output::render_html(&view, "https://img.example")).unwrap();
    assert!(html.contains("&lt;mr&gt;&amp;mime"));
    assert!(!html.contains("<mr>"));
    assert!(html.contains("<div class=\"card__id\">#0001</div>"));
    assert!(html.contains("id=\"nextButton\" class=\"pagination__button\" disabled"));
    assert!(html.contains("Page 1 of 1"));
}

#[tokio::test]
async fn writer_sink_renders_details_as_json() {
    use crate::output::{OutputFormat, RenderSink, WriterSink};

    let mut buf: Vec<u8> = Vec::new();
    let mut sink = WriterSink::new(&mut buf, OutputFormat::Json, "https://img.example");
    let d = EntityDetail {
        id: 25,
        categories: vec!["electric".to_string()],
        weight: Some(60),
        height: Some(4),
        abilities: vec!["static".to_string()],
        sprite_url: None,
    };
    sink.render_detail(&entity(25, "pikachu"), &d).unwrap();
    drop(sink);
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(value["name"], "pikachu");
    assert_eq!(value["weight"], 60);
    assert_eq!(value["categories"][0], "electric");
}

#[test]
fn prompt_commands_parse() {
    use crate::cli::command::{parse_command, Command};

    assert_eq!(parse_command("   ").unwrap(), None);
    assert_eq!(
        parse_command("search Pika").unwrap(),
        Some(Command::Search("Pika".to_string()))
    );
    assert_eq!(parse_command("search").unwrap(), Some(Command::Search(String::new())));
    assert_eq!(parse_command("filter none").unwrap(), Some(Command::Filter(None)));
    assert_eq!(
        parse_command("filter fire").unwrap(),
        Some(Command::Filter(Some("fire".to_string())))
    );
    assert_eq!(
        parse_command("sort name-desc").unwrap(),
        Some(Command::Sort(SortKey::NameDesc))
    );
    assert_eq!(
        parse_command("NEXT").unwrap(),
        Some(Command::Navigate(Navigation::Next))
    );
    assert_eq!(parse_command("go 4").unwrap(), Some(Command::GoTo("4".to_string())));
    assert_eq!(parse_command("quit").unwrap(), Some(Command::Quit));
    assert!(parse_command("sort sideways").is_err());
    assert!(parse_command("show").is_err());
    assert!(parse_command("dance").is_err());
}

#[test]
fn default_config_file_parses() {
    let cfg = crate::config::parse_config(&crate::config::default_config_yaml()).unwrap();
    assert_eq!(cfg.page_size, Some(12));
    assert_eq!(cfg.max_id, Some(10000));
    assert_eq!(cfg.output_format.as_deref(), Some("text"));
    assert!(cfg.proxy.is_none());
}

#[test]
fn sort_keys_parse_their_labels() {
    for key in [
        SortKey::IdAsc,
        SortKey::IdDesc,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ] {
        assert_eq!(SortKey::parse(key.label()), Some(key));
    }
    assert_eq!(SortKey::parse("name"), Some(SortKey::NameAsc));
    assert_eq!(SortKey::parse("weight"), None);
}

// answers each request path with a canned status and body
async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, status, body)| (*status, *body))
                    .unwrap_or((404, "{}"));
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    format!("http://{addr}/api/v2")
}

fn http_catalog(api_base: String, list_limit: u32) -> HttpCatalog {
    HttpCatalog::new(&HttpCatalogOptions {
        api_base,
        list_limit,
        rate: 1000,
        timeout_seconds: 5,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn http_catalog_maps_statuses_and_bodies() {
    let base = serve(vec![
        ("/api/v2/pokemon?limit=5", 503, "{}"),
        (
            "/api/v2/pokemon?limit=3",
            200,
            r#"{"results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "venusaur-mega", "url": "https://pokeapi.co/api/v2/pokemon/10033/"}
            ]}"#,
        ),
        ("/api/v2/pokemon?limit=4", 200, "<html>maintenance</html>"),
        (
            "/api/v2/pokemon/1",
            200,
            r#"{"id": 1, "types": [{"slot": 1, "type": {"name": "grass"}}]}"#,
        ),
        ("/api/v2/pokemon/2", 200, "not json"),
        ("/api/v2/pokemon/3", 500, "{}"),
    ])
    .await;

    let failing = http_catalog(base.clone(), 5);
    match failing.fetch_summaries().await {
        Err(CatalogError::Status { url, status }) => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/api/v2/pokemon?limit=5"));
        }
        other => panic!("expected a status error, got {other:?}"),
    }

    let listing = http_catalog(base.clone(), 3);
    let summaries = listing.fetch_summaries().await.unwrap();
    assert_eq!(summaries, vec![entity(1, "bulbasaur")]);

    let garbled = http_catalog(base.clone(), 4);
    assert!(matches!(
        garbled.fetch_summaries().await,
        Err(CatalogError::Decode { .. })
    ));

    let found = listing.fetch_detail(1).await.unwrap();
    assert_eq!(found.categories, vec!["grass"]);
    assert!(listing.fetch_detail(2).await.is_none());
    assert!(listing.fetch_detail(3).await.is_none());
}

#[test]
fn http_catalog_rejects_zero_rate() {
    let options = HttpCatalogOptions {
        rate: 0,
        ..Default::default()
    };
    assert!(matches!(
        HttpCatalog::new(&options),
        Err(CatalogError::InvalidOptions { field: "rate", .. })
    ));
}
