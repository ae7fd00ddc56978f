//! FloorSim Headless Simulation Harness
//!
//! Exercises the warehouse core end to end and drives a floor tick by tick.
//! Everything the core leaves to its host lives here: reading snapshot and
//! path files, looping ticks, printing what happened.
//!
//! Usage:
//!   cargo run -p floorsim-simtest
//!   cargo run -p floorsim-simtest -- --verbose
//!   cargo run -p floorsim-simtest -- --snapshot floor.json --path V1=v1.csv --ticks 30

use floorsim_core::config::validate_config;
use floorsim_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::filter::LevelFilter;

// ── Demo floor (same JSON format the snapshot loader reads) ─────────────
const DEMO_FLOOR_JSON: &str = include_str!("../../../data/demo_floor.json");
const DEMO_PATH_V1: &str = include_str!("../../../data/paths/V1.csv");
const DEMO_PATH_V2: &str = include_str!("../../../data/paths/V2.csv");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Default)]
struct Options {
    verbose: bool,
    snapshot: Option<String>,
    config: Option<String>,
    paths: Vec<(String, String)>,
    ticks: u64,
    seed: u64,
}

fn parse_args() -> Result<Options, String> {
    let mut opts = Options {
        ticks: 20,
        seed: 42,
        ..Options::default()
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => opts.verbose = true,
            "--snapshot" => opts.snapshot = Some(args.next().ok_or("--snapshot needs a file")?),
            "--config" => opts.config = Some(args.next().ok_or("--config needs a file")?),
            "--path" => {
                let arg = args.next().ok_or("--path needs ID=file.csv")?;
                let (id, file) = arg
                    .split_once('=')
                    .ok_or_else(|| format!("bad --path {:?}, expected ID=file.csv", arg))?;
                opts.paths.push((id.to_string(), file.to_string()));
            }
            "--ticks" => {
                let n = args.next().ok_or("--ticks needs a number")?;
                opts.ticks = n.parse().map_err(|_| format!("bad --ticks {:?}", n))?;
            }
            "--seed" => {
                let n = args.next().ok_or("--seed needs a number")?;
                opts.seed = n.parse().map_err(|_| format!("bad --seed {:?}", n))?;
            }
            other => return Err(format!("unknown argument {:?}", other)),
        }
    }
    Ok(opts)
}

/// The check suite provokes rejections on purpose, so its warnings only
/// show with `--verbose`. Driving a real floor keeps them.
fn log_level(opts: &Options) -> LevelFilter {
    if opts.verbose {
        LevelFilter::DEBUG
    } else if opts.snapshot.is_some() {
        LevelFilter::WARN
    } else {
        LevelFilter::ERROR
    }
}

fn main() {
    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level(&opts))
        .init();

    if opts.snapshot.is_some() {
        if let Err(msg) = run_floor(&opts) {
            eprintln!("error: {}", msg);
            std::process::exit(1);
        }
        return;
    }

    let verbose = opts.verbose;
    println!("=== FloorSim Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Geometry predicates
    results.extend(validate_geometry(verbose));

    // 2. Placement rules
    results.extend(validate_placement(verbose));

    // 3. Reference scenario
    results.extend(validate_reference_scenario(verbose));

    // 4. Inventory batches
    results.extend(validate_inventory(verbose));

    // 5. Snapshot formats
    results.extend(validate_snapshots(verbose));

    // 6. Demo floor run
    results.extend(validate_demo_run(verbose));

    // 7. Random placement sweep
    results.extend(validate_random_placement(verbose, opts.seed));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Floor driver ────────────────────────────────────────────────────────

/// Waypoints from a headerless two-column CSV. Blank lines are skipped; any
/// other row that is not a pair of numbers fails the file with its line number.
fn read_waypoints<R: std::io::Read>(source: R) -> Result<Vec<(f64, f64)>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut rows = Vec::new();
    let mut bad = Vec::new();
    for row in reader.deserialize::<(f64, f64)>() {
        match row {
            Ok(point) => rows.push(point),
            Err(e) => bad.push(e.to_string()),
        }
    }
    if bad.is_empty() {
        Ok(rows)
    } else {
        Err(bad.join("; "))
    }
}

fn load_config(path: Option<&str>) -> Result<SimConfig, String> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    let config = SimConfig::from_json_str(&text).map_err(|e| format!("{}: {}", path, e))?;
    let problems = validate_config(&config);
    if !problems.is_empty() {
        let list: Vec<String> = problems.iter().map(|p| p.to_string()).collect();
        return Err(format!("invalid config: {}", list.join("; ")));
    }
    Ok(config)
}

fn run_floor(opts: &Options) -> Result<(), String> {
    let config = load_config(opts.config.as_deref())?;
    let snapshot_path = opts.snapshot.as_deref().unwrap_or_default();
    let file = std::fs::File::open(snapshot_path).map_err(|e| format!("{}: {}", snapshot_path, e))?;
    let (mut warehouse, report) =
        Warehouse::load_json(std::io::BufReader::new(file), config).map_err(|e| e.to_string())?;

    println!(
        "Loaded {}: {} storage units, {} vehicles",
        warehouse.layout_description().unwrap_or_else(|| "no layout".into()),
        warehouse.storage().len(),
        warehouse.vehicles().len()
    );
    for rejected in report.rejected_storage.iter().chain(&report.rejected_vehicles) {
        println!("  skipped {}", rejected);
    }

    for (id, file) in &opts.paths {
        let source = std::fs::File::open(file).map_err(|e| format!("{}: {}", file, e))?;
        let waypoints = match read_waypoints(source) {
            Ok(waypoints) => waypoints,
            Err(e) => {
                println!("Skipped {} for {}: {}", file, id, e);
                continue;
            }
        };
        match warehouse.assign_path(id, waypoints) {
            Ok(()) => println!("Assigned {} to {}", file, id),
            Err(e) => println!("Could not assign {} to {}: {}", file, id, e),
        }
    }

    for _ in 0..opts.ticks {
        let report = warehouse.tick();
        for trip in &report.arrivals {
            println!(
                "[tick {}] Vehicle ID#{} arrived at {} ({} waypoints, {:.2} travelled)",
                report.tick, trip.vehicle_id, trip.destination, trip.waypoints, trip.distance
            );
        }
        for hit in &report.collisions {
            println!("[tick {}] {}", report.tick, hit);
        }
    }

    println!();
    for row in warehouse.vehicles().summaries() {
        println!("  {}", row);
    }
    for row in warehouse.storage().summaries() {
        println!("  {}", row);
    }
    Ok(())
}

// ── 1. Geometry ─────────────────────────────────────────────────────────

fn validate_geometry(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let square = |x: f64, y: f64, side: f64| {
        Shape::square(side, Position::new(x, y), RefPointType::Center)
    };

    match (square(0.0, 0.0, 2.0), square(2.0, 0.0, 2.0), square(2.1, 0.0, 2.0)) {
        (Ok(a), Ok(touching), Ok(apart)) => {
            results.push(TestResult::check(
                "geometry_touching_interferes",
                a.interferes(&touching) && touching.interferes(&a),
                "shared edge counts as contact",
            ));
            results.push(TestResult::check(
                "geometry_gap_is_clear",
                !a.interferes(&apart),
                "0.1 gap does not interfere",
            ));
        }
        _ => results.push(TestResult::check("geometry_build", false, "square construction failed")),
    }

    match (square(5.0, 5.0, 10.0), square(5.0, 5.0, 2.0), square(0.5, 5.0, 1.0)) {
        (Ok(outer), Ok(inner), Ok(on_edge)) => {
            results.push(TestResult::check(
                "geometry_contains_properly",
                outer.contains(&inner) && !outer.contains(&on_edge),
                "inner inside, edge-touching not",
            ));
        }
        _ => results.push(TestResult::check("geometry_build", false, "square construction failed")),
    }

    let bad = Shape::rectangle(-1.0, 2.0, Position::ORIGIN, RefPointType::Corner);
    results.push(TestResult::check(
        "geometry_rejects_negative",
        bad.is_err(),
        format!("{:?}", bad.err()),
    ));

    let angle = Orientation::new(3.0 * std::f64::consts::FRAC_PI_2).radians();
    results.push(TestResult::check(
        "geometry_orientation_normalized",
        (angle + std::f64::consts::FRAC_PI_2).abs() < 1e-9,
        format!("3π/2 → {:.4}", angle),
    ));

    if verbose {
        println!("  Geometry: {} checks", results.len());
    }
    results
}

// ── 2. Placement ────────────────────────────────────────────────────────

fn validate_placement(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut w = match Warehouse::with_layout(10.0, 10.0, Position::ORIGIN) {
        Ok(w) => w,
        Err(e) => return vec![TestResult::check("placement_layout", false, e.to_string())],
    };

    let outside = w
        .new_vehicle("V9", Position::new(12.0, 5.0), (1.0, 1.0))
        .map(|v| v.placed_at(Position::new(5.0, 5.0)));
    let reasons = match outside {
        Ok(v) => w.add_vehicle_unit(v).err().map(|e| e.reasons()).unwrap_or_default(),
        Err(e) => vec![e.to_string()],
    };
    results.push(TestResult::check(
        "placement_dock_out_of_bounds",
        reasons.iter().any(|r| r.contains("Out of bound")) && w.vehicles().is_empty(),
        reasons.join("; "),
    ));

    let docked = w.new_vehicle("V1", Position::new(2.0, 2.0), (1.0, 1.0));
    let parked_away = docked.map(|v| v.placed_at(Position::new(7.0, 7.0)));
    let first = parked_away.map_err(|e| e.to_string()).and_then(|v| {
        w.add_vehicle_unit(v).map_err(|e| e.to_string())
    });
    let second = w
        .new_vehicle("V2", Position::new(2.0, 2.5), (1.0, 1.0))
        .map_err(|e| e.to_string())
        .and_then(|v| w.add_vehicle_unit(v).map_err(|e| e.to_string()));
    results.push(TestResult::check(
        "placement_dock_reserved",
        first.is_ok() && matches!(&second, Err(msg) if msg.contains("Docking location violation")),
        format!("{:?} / {:?}", first, second),
    ));

    if verbose {
        println!("  Placement: {} vehicles on floor", w.vehicles().len());
    }
    results
}

// ── 3. Reference scenario ───────────────────────────────────────────────

fn validate_reference_scenario(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut w = match Warehouse::with_layout(10.0, 10.0, Position::ORIGIN) {
        Ok(w) => w,
        Err(e) => return vec![TestResult::check("scenario_layout", false, e.to_string())],
    };

    let shelf = |id: &str| {
        StorageUnit::new(id, Position::new(2.0, 2.0), Position::new(2.0, 3.0), 1.0, 100.0)
    };
    let added = shelf("S1").map(|s| w.add_storage_unit(s).is_ok()).unwrap_or(false);
    results.push(TestResult::check(
        "scenario_add_shelf",
        added && w.storage().len() == 1,
        format!("{} shelves", w.storage().len()),
    ));

    let duplicate = shelf("S1")
        .map_err(|e| e.to_string())
        .and_then(|s| w.add_storage_unit(s).map_err(|e| e.to_string()));
    results.push(TestResult::check(
        "scenario_duplicate_shelf",
        matches!(&duplicate, Err(msg) if msg.contains("already in the dataframe")),
        format!("{:?}", duplicate),
    ));

    let vehicle_added = w
        .new_vehicle("V1", Position::new(9.0, 9.0), (1.0, 1.0))
        .map(|v| w.add_vehicle_unit(v).is_ok())
        .unwrap_or(false);
    let assigned = w.assign_path("V1", [(5.0, 5.0), (1.0, 1.0)]).is_ok();
    results.push(TestResult::check(
        "scenario_vehicle_ready",
        vehicle_added && assigned,
        "V1 docked at (9, 9) with a two-point path",
    ));

    w.advance_tick();
    let after_one = w
        .vehicles()
        .get("V1")
        .map(|v| (v.position(), v.trail().to_vec()));
    results.push(TestResult::check(
        "scenario_first_tick",
        after_one == Some((Position::new(5.0, 5.0), vec![Position::new(9.0, 9.0)])),
        format!("{:?}", after_one),
    ));

    let arrivals = w.advance_tick();
    let after_two = w
        .vehicles()
        .get("V1")
        .map(|v| (v.position(), v.trail().is_empty(), v.path().is_empty()));
    results.push(TestResult::check(
        "scenario_second_tick",
        after_two == Some((Position::new(1.0, 1.0), true, true)) && arrivals.len() == 1,
        format!("{:?}, {} arrivals", after_two, arrivals.len()),
    ));

    if verbose {
        println!("  Scenario: tick count {}", w.tick_count());
    }
    results
}

// ── 4. Inventory ────────────────────────────────────────────────────────

fn validate_inventory(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let (mut w, _) = match demo_floor() {
        Ok(loaded) => loaded,
        Err(e) => return vec![TestResult::check("inventory_demo", false, e)],
    };
    let loads = |w: &Warehouse| -> Vec<f64> { w.storage().iter().map(|s| s.load()).collect() };
    let before = loads(&w);

    let outcome = w.storage_load_change(&[
        LoadEntry::new("S2", LoadAction::Load, 30.0),
        LoadEntry::raw("S1", "Unload", "-5"),
    ]);
    results.push(TestResult::check(
        "inventory_negative_rolls_back",
        !outcome.success && loads(&w) == before && outcome.change_log.is_empty(),
        outcome.message.clone(),
    ));

    let outcome = w.storage_load_change(&[
        LoadEntry::new("S2", LoadAction::Load, 30.0),
        LoadEntry::new("S4", LoadAction::Unload, 50.0),
    ]);
    let after = loads(&w);
    results.push(TestResult::check(
        "inventory_commit",
        outcome.success && after[1] == 30.0 && after[3] == 0.0,
        outcome.change_log.join(" | "),
    ));

    let outcome = w.storage_load_change(&[LoadEntry::new("S3", LoadAction::Load, 61.0)]);
    results.push(TestResult::check(
        "inventory_overflow",
        !outcome.success && outcome.message == "Overflow shelf S3's capacity",
        outcome.message.clone(),
    ));

    if verbose {
        for row in w.storage().summaries() {
            println!("  {}", row);
        }
    }
    results
}

// ── 5. Snapshots ────────────────────────────────────────────────────────

fn demo_floor() -> Result<(Warehouse, LoadReport), String> {
    Warehouse::load_json(DEMO_FLOOR_JSON.as_bytes(), SimConfig::default())
        .map_err(|e| e.to_string())
}

fn validate_snapshots(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let (w, report) = match demo_floor() {
        Ok(loaded) => loaded,
        Err(e) => return vec![TestResult::check("snapshot_demo_loads", false, e)],
    };
    results.push(TestResult::check(
        "snapshot_demo_loads",
        report.is_clean() && w.storage().len() == 4 && w.vehicles().len() == 2,
        format!("rejected {:?}", report.rejected_ids()),
    ));

    let mut json = Vec::new();
    let json_ok = w.save_json(&mut json).is_ok()
        && Warehouse::load_json(json.as_slice(), SimConfig::default())
            .map(|(back, _)| back.snapshot() == w.snapshot())
            .unwrap_or(false);
    results.push(TestResult::check(
        "snapshot_json_round_trip",
        json_ok,
        format!("{} bytes", json.len()),
    ));

    let mut bin = Vec::new();
    let bin_ok = w.save_binary(&mut bin).is_ok()
        && Warehouse::load_binary(bin.as_slice())
            .map(|(back, _)| back.snapshot() == w.snapshot())
            .unwrap_or(false);
    results.push(TestResult::check(
        "snapshot_binary_round_trip",
        bin_ok,
        format!("{} bytes", bin.len()),
    ));

    if verbose {
        println!("  Snapshot: json {} bytes, binary {} bytes", json.len(), bin.len());
    }
    results
}

// ── 6. Demo run ─────────────────────────────────────────────────────────

fn validate_demo_run(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let (mut w, _) = match demo_floor() {
        Ok(loaded) => loaded,
        Err(e) => return vec![TestResult::check("demo_run", false, e)],
    };
    let assigned = [("V1", DEMO_PATH_V1), ("V2", DEMO_PATH_V2)]
        .into_iter()
        .map(|(id, csv)| {
            let waypoints = read_waypoints(csv.as_bytes())?;
            w.assign_path(id, waypoints).map_err(|e| e.to_string())
        })
        .collect::<Result<Vec<()>, String>>();
    results.push(TestResult::check(
        "demo_paths_assigned",
        assigned.is_ok(),
        assigned.err().unwrap_or_else(|| "V1, V2 from CSV".into()),
    ));

    let mut collisions = Vec::new();
    let mut arrivals = Vec::new();
    for _ in 0..6 {
        let report = w.tick();
        if verbose {
            for hit in &report.collisions {
                println!("  [tick {}] {}", report.tick, hit);
            }
        }
        collisions.extend(report.collisions);
        arrivals.extend(report.arrivals);
    }

    // both vehicles reach (14, 6) on tick 2; V1 is checked first and stops
    results.push(TestResult::check(
        "demo_single_collision",
        collisions.len() == 1
            && collisions[0].vehicle_id == "V1"
            && collisions[0].other == OccupantId::vehicle("V2"),
        collisions.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("; "),
    ));
    results.push(TestResult::check(
        "demo_v2_arrives",
        arrivals.len() == 1 && arrivals[0].vehicle_id == "V2" && arrivals[0].distance > 0.0,
        format!("{:?}", arrivals.first().map(|a| a.destination)),
    ));
    let v1_stopped = w.vehicles().get("V1").map(|v| !v.is_active()).unwrap_or(false);
    results.push(TestResult::check(
        "demo_v1_refuses_new_path",
        v1_stopped && w.assign_path("V1", [(17.0, 2.0)]).is_err(),
        "inactive vehicles keep their place",
    ));
    results
}

// ── 7. Random placement ─────────────────────────────────────────────────

fn validate_random_placement(verbose: bool, seed: u64) -> Vec<TestResult> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut w = match Warehouse::with_layout(30.0, 20.0, Position::ORIGIN) {
        Ok(w) => w,
        Err(e) => return vec![TestResult::check("random_layout", false, e.to_string())],
    };

    let mut attempts = 0;
    let mut rejected = 0;
    for i in 0..200 {
        let center = Position::new(rng.gen_range(-1.0..31.0), rng.gen_range(-1.0..21.0));
        let side = rng.gen_range(0.5..3.0);
        let Ok(unit) = StorageUnit::new(format!("R{}", i), center, center, side, 10.0) else {
            continue;
        };
        attempts += 1;
        if w.add_storage_unit(unit).is_err() {
            rejected += 1;
        }
    }

    let units: Vec<&StorageUnit> = w.storage().iter().collect();
    let layout_ok = w
        .layout()
        .map(|layout| units.iter().all(|u| layout.contains(u.shape())))
        .unwrap_or(false);
    let mut overlaps = 0;
    for (i, a) in units.iter().enumerate() {
        for b in &units[i + 1..] {
            if a.shape().interferes(b.shape()) {
                overlaps += 1;
            }
        }
    }

    if verbose {
        println!(
            "  Random placement (seed {}): {} placed, {} rejected",
            seed,
            units.len(),
            rejected
        );
    }
    vec![
        TestResult::check(
            "random_all_contained",
            layout_ok,
            format!("{} placed of {}", units.len(), attempts),
        ),
        TestResult::check(
            "random_no_overlap",
            overlaps == 0 && w.occupied_zones().len() == units.len(),
            format!("{} overlapping pairs", overlaps),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_paths_parse() {
        assert_eq!(
            read_waypoints(DEMO_PATH_V1.as_bytes()).unwrap(),
            vec![(14.0, 2.0), (14.0, 6.0), (7.0, 6.0), (7.0, 2.0)]
        );
        assert_eq!(read_waypoints(DEMO_PATH_V2.as_bytes()).unwrap().len(), 3);
    }

    #[test]
    fn test_waypoints_trim_and_skip_blank_lines() {
        let rows = read_waypoints(" 1.5 , 2\n\n3,4\n".as_bytes()).unwrap();
        assert_eq!(rows, vec![(1.5, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_bad_waypoint_rows_are_reported() {
        let err = read_waypoints("1,2\nx,3\n4\n5,6\n".as_bytes()).unwrap_err();
        assert_eq!(err.split("; ").count(), 2);
        assert!(read_waypoints("1,2\n".as_bytes()).is_ok());
    }

    #[test]
    fn test_check_suite_hides_warnings() {
        let mut opts = Options::default();
        assert_eq!(log_level(&opts), LevelFilter::ERROR);
        opts.snapshot = Some("floor.json".into());
        assert_eq!(log_level(&opts), LevelFilter::WARN);
        opts.verbose = true;
        assert_eq!(log_level(&opts), LevelFilter::DEBUG);
    }
}
