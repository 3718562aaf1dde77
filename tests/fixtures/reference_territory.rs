//! Reference territory: 22 bricks served by 4 representatives.
//!
//! Index values are normalized so the total workload is 4.0 (1.0 per rep).

use std::collections::HashMap;

use territory_planner::territory::Territory;

pub const REPS: [u32; 4] = [1, 2, 3, 4];

/// (brick, index value)
pub const INDEX_VALUES: [(u32, f64); 22] = [
    (1, 0.1609),
    (2, 0.1164),
    (3, 0.1026),
    (4, 0.1516),
    (5, 0.0939),
    (6, 0.1320),
    (7, 0.0687),
    (8, 0.0930),
    (9, 0.2116),
    (10, 0.2529),
    (11, 0.0868),
    (12, 0.0828),
    (13, 0.0975),
    (14, 0.8177),
    (15, 0.4115),
    (16, 0.3795),
    (17, 0.0710),
    (18, 0.0427),
    (19, 0.1043),
    (20, 0.0997),
    (21, 0.1698),
    (22, 0.2531),
];

/// (brick, [distance to rep 1, rep 2, rep 3, rep 4])
pub const DISTANCES: [(u32, [f64; 4]); 22] = [
    (1, [16.16, 24.08, 24.32, 21.12]),
    (2, [19.00, 26.47, 27.24, 17.33]),
    (3, [25.29, 32.49, 33.42, 12.25]),
    (4, [0.00, 7.93, 8.31, 36.12]),
    (5, [3.07, 6.44, 7.56, 37.36]),
    (6, [1.22, 7.51, 8.19, 36.29]),
    (7, [2.80, 10.31, 10.95, 33.50]),
    (8, [2.87, 5.07, 5.67, 38.80]),
    (9, [3.80, 8.01, 7.41, 38.16]),
    (10, [12.35, 4.52, 4.35, 48.27]),
    (11, [11.11, 3.48, 2.97, 47.14]),
    (12, [21.99, 22.02, 24.07, 39.86]),
    (13, [8.82, 3.30, 5.36, 43.31]),
    (14, [7.93, 0.00, 2.07, 43.75]),
    (15, [9.34, 2.25, 1.11, 45.43]),
    (16, [8.31, 2.07, 0.00, 44.43]),
    (17, [7.31, 2.44, 1.11, 43.43]),
    (18, [7.55, 0.75, 1.53, 43.52]),
    (19, [11.13, 18.41, 19.26, 25.40]),
    (20, [17.49, 23.44, 24.76, 23.21]),
    (21, [11.03, 18.93, 19.28, 25.43]),
    (22, [36.12, 43.75, 44.43, 0.00]),
];

/// Current assignment, grouped by representative.
pub const BASELINE: [(u32, &[u32]); 4] = [
    (1, &[4, 5, 6, 7, 8, 15]),
    (2, &[10, 11, 12, 13, 14]),
    (3, &[9, 16, 17, 18]),
    (4, &[1, 2, 3, 19, 20, 21, 22]),
];

pub fn reference_territory() -> Territory<u32, u32> {
    let bricks = INDEX_VALUES.iter().map(|(brick, _)| *brick).collect();
    let mut territory = Territory::new(bricks, REPS.to_vec()).unwrap();
    for (brick, value) in INDEX_VALUES {
        territory.set_index_value(brick, value);
    }
    for (brick, row) in DISTANCES {
        for (rep, distance) in REPS.iter().zip(row) {
            territory.set_distance(brick, *rep, distance);
        }
    }
    territory
}

pub fn reference_baseline() -> HashMap<u32, u32> {
    BASELINE
        .iter()
        .flat_map(|(rep, bricks)| bricks.iter().map(move |brick| (*brick, *rep)))
        .collect()
}

/// Path of a file under the crate's `data/` directory.
pub fn data_file(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}
