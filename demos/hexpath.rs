//! Find a path across generated terrain and print it as an ASCII hex map.
//!
//! Run: cargo run --bin hexpath -- [seed] [rocks]
//! Set `RUST_LOG=debug` to watch the search.

use std::sync::Arc;

use hexnav_core::{HexGrid, HexPoint};
use hexnav_demos::{Terrain, Walker, ZoneKind, describe, render};
use hexnav_paths::{PathFinder, PathSearchTask, SearchConfig};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let rocks = args.next().and_then(|s| s.parse().ok()).unwrap_or(40);

    let grid = HexGrid::default();
    let src = grid.to_world(HexPoint::new(-22, -20));
    let dst = grid.to_world(HexPoint::new(22, 20));

    let terrain = Arc::new(
        Terrain::generate(seed, rocks, &[src, dst], 3.0).with_zone(
            ZoneKind::LockedGate,
            0.0,
            0.0,
            4.0,
        ),
    );
    let (Some(src), Some(dst)) = (
        terrain.ground_point(grid.from_world(src)),
        terrain.ground_point(grid.from_world(dst)),
    ) else {
        eprintln!("Error: endpoints outside the terrain");
        std::process::exit(1);
    };

    let config = SearchConfig {
        iteration_limit: 20_000,
        ..Default::default()
    };
    let finder = match PathFinder::new(grid, terrain.clone(), terrain.clone()).with_config(config) {
        Ok(finder) => Arc::new(finder),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    log::info!("seed {seed}, {rocks} rocks, searching {src} -> {dst}");
    let task = match PathSearchTask::spawn(finder, Walker::default(), src, dst) {
        Ok(task) => task,
        Err(e) => {
            eprintln!("Error: failed to start search: {e}");
            std::process::exit(1);
        }
    };
    let result = task.join();

    print!("{}", render(&terrain, &result, src, dst));
    print!("{}", describe(&result));
    if !result.is_ok() {
        std::process::exit(2);
    }
}
