//! Headless runner: loads every bundled scene, prints network power, and
//! checks that building the same scene twice issues identical render calls.
//!
//! Run with: `cargo run --package mechpower-data --example headless_runner`
//! Set `RUST_LOG=mechpower=debug` to see merges and aggregation passes.

use std::path::Path;

use mechpower_core::fixed::fixed64_to_f64;
use mechpower_data::{build_grid, load_scene};
use mechpower_power::render::RecordingRenderer;
use tracing_subscriber::prelude::*;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mechpower=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let scenes_dir = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/scenes"));
    let mut paths: Vec<_> = std::fs::read_dir(scenes_dir)
        .expect("failed to read scenes directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    for path in &paths {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        println!("--- {name} ---");

        let scene = load_scene(path).unwrap_or_else(|e| panic!("failed to load {name}: {e}"));
        let mut grid = build_grid(&scene, RecordingRenderer::new())
            .unwrap_or_else(|e| panic!("failed to build {name}: {e}"));

        for network in grid.all_networks() {
            let power = grid.network_power(network);
            println!(
                "    {network}: {} nodes, total={:.3}, consumers={}, drive={:.3}",
                grid.members_of(network).len(),
                fixed64_to_f64(power.total_power),
                power.consumer_count,
                fixed64_to_f64(power.drive_speed),
            );
        }

        // Determinism: a second build must issue the same renderer calls.
        let mut again = build_grid(&scene, RecordingRenderer::new())
            .unwrap_or_else(|e| panic!("failed to rebuild {name}: {e}"));
        let first = grid.renderer_mut().take();
        let second = again.renderer_mut().take();
        if first == second {
            println!("    Determinism: PASS ({} render calls)", first.len());
        } else {
            println!("    Determinism: FAIL!");
            std::process::exit(1);
        }
        println!();
    }

    println!("All {} scenes passed.", paths.len());
}
