// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Facility map, headless driver.
//!
//! Mounts the map controller on an in-memory canvas backed by the live
//! facility API and geocoder, then reads commands from stdin:
//!
//! ```text
//! search <text>        type <name|*>        press <lng> <lat>
//! touch <x> <y> <ms>   radius <km>          dismiss
//! uploaded             status               quit
//! ```

use facility_map::{
    config::Config,
    controller::ui::TracingUi,
    models::{LngLat, ScreenPoint},
    render::{HeadlessCanvas, SurfaceEvent},
    services::{HttpFacilityApi, NominatimGeocoder},
    MapController, MapHandle,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CANVAS_WIDTH: f64 = 1280.0;
const CANVAS_HEIGHT: f64 = 800.0;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(
        api = %config.api_base_url,
        geocoder = %config.geocoder_url,
        "Starting facility map"
    );
    tracing::debug!(style = %config.style_url(), "Map style");

    let canvas = Arc::new(HeadlessCanvas::new(
        config.initial_viewport,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
    ));
    let api = HttpFacilityApi::new(&config.api_base_url);
    let geocoder = NominatimGeocoder::new(&config.geocoder_url)?;

    let (controller, handle) =
        MapController::mount(canvas.clone(), api, geocoder, Arc::new(TracingUi), &config);
    let controller = tokio::spawn(controller.run());
    canvas.finish_loading();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match dispatch(line.trim(), &handle, &canvas).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => tracing::warn!(error = %e, "Command failed"),
        }
    }

    handle.shutdown().ok();
    controller.await?;
    Ok(())
}

/// Run one stdin command. Returns false on `quit`.
async fn dispatch(
    line: &str,
    handle: &MapHandle,
    canvas: &HeadlessCanvas,
) -> anyhow::Result<bool> {
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    match verb {
        "" => {}
        "search" => handle.search(rest)?,
        "type" => handle.select_facility_type(if rest == "*" { "" } else { rest })?,
        "press" => {
            let [lng, lat] = parse_args::<2>(&args)?;
            canvas.emit(SurfaceEvent::ContextMenu {
                lng_lat: LngLat::new(lng, lat),
            });
        }
        "touch" => {
            let [x, y, ms] = parse_args::<3>(&args)?;
            canvas.emit(SurfaceEvent::TouchStart {
                touches: vec![ScreenPoint::new(x, y)],
            });
            tokio::time::sleep(Duration::from_millis(ms.max(0.0) as u64)).await;
            canvas.emit(SurfaceEvent::TouchEnd);
        }
        "radius" => {
            let [km] = parse_args::<1>(&args)?;
            let viewport = handle.submit_radius(km).await?;
            println!("{}", serde_json::to_string(&viewport)?);
        }
        "dismiss" => handle.dismiss_radius()?,
        "uploaded" => handle.upload_succeeded(None)?,
        "status" => {
            let snapshot = handle.snapshot().await?;
            println!(
                "{}",
                serde_json::json!({
                    "viewport": snapshot.viewport,
                    "standard": snapshot.standard_count,
                    "uploaded": snapshot.uploaded_count,
                    "shown": snapshot.filtered.len(),
                    "type": snapshot.selected_type,
                    "types": snapshot.facility_types,
                    "pendingQuery": snapshot.pending_query.map(|q| [q.center.lng, q.center.lat]),
                    "loading": snapshot.loading,
                    "searching": snapshot.searching,
                })
            );
        }
        "quit" => return Ok(false),
        other => anyhow::bail!("unknown command: {}", other),
    }
    Ok(true)
}

fn parse_args<const N: usize>(args: &[&str]) -> anyhow::Result<[f64; N]> {
    if args.len() != N {
        anyhow::bail!("expected {} numeric arguments, got {}", N, args.len());
    }
    let mut values = [0.0; N];
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg.parse()?;
    }
    Ok(values)
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("facility_map=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
