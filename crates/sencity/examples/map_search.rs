//! Interactive search box against the live services.
//!
//! Reads one query per line from stdin. `:history`, `:select <id>`, `:remove <id>` and
//! `:places` inspect or edit state; anything else is dispatched as a search.
//!
//! ```sh
//! SENCITY_BACKEND_URL=http://localhost:8000/api GOOGLE_API_KEY=... \
//!     cargo run --example map_search
//! ```
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use sencity::services::ServiceEndpoints;
use sencity::services::http::{GooglePlacesClient, SencityBackend};
use sencity::{
    CollectingNotifier, DispatchOutcome, MapSurface, Marker, ResolvedPlace, SearchConfig,
    SearchDispatcher, Viewport,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, info};

struct ConsoleMap;

impl MapSurface for ConsoleMap {
    fn render(&self, viewport: &Viewport, markers: &[Marker]) {
        println!(
            "map centred on {:.5},{:.5} (±{}) with {} markers",
            viewport.lat,
            viewport.lng,
            viewport.lat_delta,
            markers.len()
        );
    }
}

fn initial_places() -> [ResolvedPlace; 2] {
    [
        ResolvedPlace::new("init1", "카페", "서울특별시 중구 을지로 100", 37.5665, 126.978),
        ResolvedPlace::new("init2", "공원", "서울특별시 성동구 왕십리로 20", 37.5635, 127.036),
    ]
}

fn print_outcome(outcome: &DispatchOutcome, dispatcher: &SearchDispatcher) {
    match outcome {
        DispatchOutcome::Species { .. } => {
            if let Some(profile) = dispatcher.profile() {
                println!("{} ({})", profile.name, profile.english_name);
                for feature in &profile.features {
                    println!("  - {feature}");
                }
                for precaution in &profile.precautions {
                    println!("  ! {precaution}");
                }
            }
        }
        DispatchOutcome::Place { id, added } => {
            let verb = if *added { "added" } else { "already cached" };
            println!("place {id} {verb}");
        }
        DispatchOutcome::Rejected(failure) | DispatchOutcome::Failed(failure) => {
            println!("{}: {failure}", failure.title());
        }
        DispatchOutcome::Superseded => println!("superseded by a newer search"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    sencity::init_logging(Level::INFO)?;

    let endpoints = ServiceEndpoints::from_env();
    info!(backend = %endpoints.backend_url, "Connecting to services");
    let backend = Arc::new(SencityBackend::new(endpoints.clone())?);
    let places = Arc::new(GooglePlacesClient::new(endpoints)?);

    let notifier = Rc::new(CollectingNotifier::new());
    let config = SearchConfig::builder()
        .initial_places(initial_places())
        .build();
    let dispatcher = SearchDispatcher::builder()
        .history_service(backend.clone())
        .animal_service(backend)
        .place_service(places)
        .config(config)
        .notifier(notifier.clone())
        .map_surface(Rc::new(ConsoleMap))
        .build()?;

    dispatcher.load_history().await;
    dispatcher.render_map();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').unwrap_or((line, "")) {
            (":history", _) => {
                for entry in dispatcher.history() {
                    let marker = if dispatcher.selected_history() == Some(entry.id) {
                        '*'
                    } else {
                        ' '
                    };
                    println!("{marker} {:>4} {}", entry.id, entry.keyword);
                }
            }
            (":places", _) => {
                for place in dispatcher.places() {
                    println!("{place}");
                }
            }
            (":select", id) => match id.trim().parse() {
                Ok(id) => {
                    let outcome = dispatcher.select_history(id).await;
                    print_outcome(&outcome, &dispatcher);
                }
                Err(e) => println!("invalid id: {e}"),
            },
            (":remove", id) => match id.trim().parse() {
                Ok(id) => {
                    if dispatcher.remove_history(id).await {
                        println!("removed {id}");
                    }
                }
                Err(e) => println!("invalid id: {e}"),
            },
            _ => {
                let outcome = dispatcher.dispatch(line).await;
                print_outcome(&outcome, &dispatcher);
            }
        }

        for notification in notifier.take() {
            println!("[{}] {}", notification.title, notification.message);
        }
    }

    Ok(())
}
