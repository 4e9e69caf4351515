//! Headless Tiler tool
//!
//! Prints the merged collision boxes of a saved map as JSON.
//!
//! Run with: tiler <map.json> [colliders|navmesh]

use std::path::PathBuf;
use std::process::ExitCode;
use tiler_core::{map_boxes, BoxKind};
use tiler_editor::store::load_map;

const USAGE: &str = "Usage: tiler <map.json> [colliders|navmesh]";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    let kind = match args.next().as_deref() {
        None | Some("colliders") => BoxKind::Collider,
        Some("navmesh") => BoxKind::NavBlocker,
        Some(other) => {
            eprintln!("Unknown box kind '{}'. {}", other, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let map = match load_map(&path) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Failed to load {:?}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&map_boxes(&map, kind)) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize boxes: {}", e);
            ExitCode::FAILURE
        }
    }
}
