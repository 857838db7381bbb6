//! Mock PokeAPI for integration tests.
//!
//! Serves a synthetic catalog of `total` entities. A handful of ids carry
//! real names; the rest get digit-free synthetic names so that numeric
//! search terms only ever match by id.

#![allow(dead_code)]

use pokedex_server::config::{AppConfig, UpstreamConfig};
use pokedex_server::{AppState, build_app};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const KNOWN: &[(u64, &str, &str, &str)] = &[
    (1, "bulbasaur", "フシギダネ", "grass"),
    (2, "ivysaur", "フシギソウ", "grass"),
    (3, "venusaur", "フシギバナ", "grass"),
    (4, "charmander", "ヒトカゲ", "fire"),
    (5, "charmeleon", "リザード", "fire"),
    (6, "charizard", "リザードン", "fire"),
    (25, "pikachu", "ピカチュウ", "electric"),
    (26, "raichu", "ライチュウ", "electric"),
];

pub fn romanized_name(id: u64) -> String {
    match KNOWN.iter().find(|k| k.0 == id) {
        Some(k) => k.1.to_string(),
        None => {
            let letters: String = id
                .to_string()
                .chars()
                .map(|d| (b'a' + d.to_digit(10).unwrap_or(0) as u8) as char)
                .collect();
            format!("mon-{letters}")
        }
    }
}

pub fn localized_name(id: u64) -> String {
    const KANA: [char; 10] = ['ア', 'イ', 'ウ', 'エ', 'オ', 'カ', 'キ', 'ク', 'ケ', 'コ'];
    match KNOWN.iter().find(|k| k.0 == id) {
        Some(k) => k.2.to_string(),
        None => {
            let kana: String = id
                .to_string()
                .chars()
                .map(|d| KANA[d.to_digit(10).unwrap_or(0) as usize])
                .collect();
            format!("モン{kana}")
        }
    }
}

fn category_of(id: u64) -> &'static str {
    KNOWN.iter().find(|k| k.0 == id).map(|k| k.3).unwrap_or("normal")
}

fn query_u64(req: &Request, key: &str) -> Option<u64> {
    req.url
        .query_pairs()
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| v.parse().ok())
}

fn trailing_id(req: &Request) -> Option<u64> {
    req.url.path_segments()?.next_back()?.parse().ok()
}

struct Listing {
    total: u64,
}

impl Respond for Listing {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        let offset = query_u64(req, "offset").unwrap_or(0);
        let limit = query_u64(req, "limit").unwrap_or(20);
        let end = (offset + limit).min(self.total);
        let results: Vec<Value> = (offset + 1..=end)
            .map(|id| {
                json!({
                    "name": romanized_name(id),
                    "url": format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
                })
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "count": self.total, "results": results }))
    }
}

struct BaseRecord;

impl Respond for BaseRecord {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        let Some(id) = trailing_id(req) else {
            return ResponseTemplate::new(404);
        };
        ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "name": romanized_name(id),
            "height": 7,
            "weight": 69,
            "sprites": {
                "front_default": format!("https://img.example/sprites/{id}.png"),
                "other": { "official-artwork": { "front_default": format!("https://img.example/art/{id}.png") } }
            },
            "types": [{ "slot": 1, "type": { "name": category_of(id), "url": "" } }],
            "abilities": [{ "ability": { "name": "overgrow", "url": "" }, "is_hidden": false }],
            "stats": [{ "base_stat": 45, "stat": { "name": "hp", "url": "" } }],
            "species": {
                "name": romanized_name(id),
                "url": format!("https://pokeapi.co/api/v2/pokemon-species/{id}/")
            }
        }))
    }
}

struct SpeciesRecord;

impl Respond for SpeciesRecord {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        let Some(id) = trailing_id(req) else {
            return ResponseTemplate::new(404);
        };
        ResponseTemplate::new(200).set_body_json(json!({
            "names": [
                { "language": { "name": "ja", "url": "" }, "name": localized_name(id) },
                { "language": { "name": "en", "url": "" }, "name": romanized_name(id) }
            ],
            "habitat": { "name": "grassland", "url": "" },
            "color": { "name": "green", "url": "" },
            "shape": { "name": "quadruped", "url": "" },
            "varieties": [{
                "is_default": true,
                "pokemon": { "name": romanized_name(id), "url": format!("https://pokeapi.co/api/v2/pokemon/{id}/") }
            }]
        }))
    }
}

pub struct MockPokeApi {
    pub server: MockServer,
    pub total: u64,
}

impl MockPokeApi {
    /// Catalog of `total` entities; ids in `failing` answer 500 on their base record.
    pub async fn start(total: u64, failing: &[u64]) -> Self {
        let server = MockServer::start().await;

        for id in failing {
            Mock::given(method("GET"))
                .and(path(format!("/pokemon/{id}")))
                .respond_with(ResponseTemplate::new(500))
                .with_priority(1)
                .mount(&server)
                .await;
        }

        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .respond_with(Listing { total })
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/pokemon/\d+$"))
            .respond_with(BaseRecord)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/pokemon-species/\d+$"))
            .respond_with(SpeciesRecord)
            .mount(&server)
            .await;
        for (key, name) in [
            ("grass", "くさ"),
            ("fire", "ほのお"),
            ("electric", "でんき"),
            ("normal", "ノーマル"),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("/type/{key}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "names": [{ "language": { "name": "ja-Hrkt", "url": "" }, "name": name }]
                })))
                .mount(&server)
                .await;
        }

        Self { server, total }
    }

    /// Config pointing at this mock, with prefetching and startup indexing off.
    pub fn config(&self) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.upstream = UpstreamConfig {
            base_url: self.server.uri(),
            ..UpstreamConfig::default()
        };
        cfg.aggregator.prefetch_pages = 0;
        cfg.index.build_on_startup = false;
        cfg
    }

    /// Requests received so far whose path starts with `prefix`.
    pub async fn requests_to(&self, prefix: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.path().starts_with(prefix))
            .count()
    }

    /// Full-listing requests (those asking for every entity at once).
    pub async fn full_listing_requests(&self) -> usize {
        let total = self.total.to_string();
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| {
                req.url.path() == "/pokemon"
                    && req.url.query_pairs().any(|(k, v)| k == "limit" && v == total.as_str())
            })
            .count()
    }

    pub async fn total_requests(&self) -> usize {
        self.server.received_requests().await.unwrap_or_default().len()
    }
}

/// Poll until `check` holds or two seconds pass.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    check()
}

pub async fn start_server(state: AppState) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(state);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}
