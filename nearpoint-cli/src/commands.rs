//! Search, demo and benchmark modes

use crate::cli::{Mode, RunConfig};
use anyhow::Context;
use nearpoint_algorithms::{as_millis_f64, find, run_repeated, timed, SearchResult, Strategy};
use nearpoint_core::{Point3f, TriangleMesh};
use nearpoint_visualization::{format_coords, show_result, Viewer};
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const DEMO_RADIUS: f32 = 100.0;
pub const DEMO_RESOLUTION: usize = 1000;
pub const DEMO_QUERY: [f32; 3] = [20.29, 83.58, 26.50];
pub const BENCHMARK_QUERY: [f32; 3] = [-48.97, 11.73, 56.77];

/// Run the mode selected by `config`, writing the report to `out`
pub fn execute<W: Write>(config: &RunConfig, out: &mut W) -> anyhow::Result<()> {
    match &config.mode {
        Mode::Search { mesh_path, query } => {
            info!(path = %mesh_path.display(), strategy = %config.strategy, "search mode");
            let mesh = load_mesh(mesh_path)?;
            search_and_show(&mesh, query, config, out)?;
        }
        Mode::Demo => {
            info!(strategy = %config.strategy, "demo mode");
            let mesh = demo_mesh()?;
            let [x, y, z] = DEMO_QUERY;
            search_and_show(&mesh, &Point3f::new(x, y, z), config, out)?;
        }
        Mode::Benchmark { mesh_path, runs } => {
            info!(path = %mesh_path.display(), runs, "benchmark mode");
            let [x, y, z] = BENCHMARK_QUERY;
            benchmark(mesh_path, &Point3f::new(x, y, z), *runs, out)?;
        }
    }
    Ok(())
}

/// The generated sphere searched in demo mode
pub fn demo_mesh() -> anyhow::Result<TriangleMesh> {
    TriangleMesh::uv_sphere(DEMO_RADIUS, DEMO_RESOLUTION, DEMO_RESOLUTION)
        .context("failed to generate the demo sphere")
}

fn load_mesh(path: &Path) -> anyhow::Result<TriangleMesh> {
    nearpoint_io::read_mesh(path).with_context(|| format!("failed to load {}", path.display()))
}

/// One line summary printed after every search
pub fn result_line(query: &Point3f, result: &SearchResult) -> String {
    format!(
        "Query Point: {}, Closest Point: {}, Distance: {:.2} mm.",
        format_coords(query),
        format_coords(&result.point),
        result.distance
    )
}

/// Search `mesh` for `query`, report the timing and result, then show the scene
pub fn search_and_show<W: Write>(
    mesh: &TriangleMesh,
    query: &Point3f,
    config: &RunConfig,
    out: &mut W,
) -> anyhow::Result<SearchResult> {
    writeln!(out, "Using method: {}.", config.strategy)?;
    let (result, elapsed) = timed(|| find(&mesh.vertices, query, config.strategy));
    let result = result?;
    writeln!(out, "Elapsed time: {:.2} ms.", as_millis_f64(elapsed))?;
    writeln!(out, "{}", result_line(query, &result))?;

    let viewer = match &config.export {
        Some(path) => Viewer::new().with_export(path),
        None => Viewer::new(),
    };
    show_result(mesh, query, &result, config.show, &viewer, out)?;
    Ok(result)
}

/// Time every strategy on `mesh_path`, loading the file again on each run
pub fn benchmark<W: Write>(
    mesh_path: &Path,
    query: &Point3f,
    runs: usize,
    out: &mut W,
) -> anyhow::Result<Vec<(Strategy, SearchResult)>> {
    let mut results = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let (stats, result) = run_repeated(runs, || {
            let mesh = nearpoint_io::read_mesh(mesh_path)?;
            find(&mesh.vertices, query, strategy)
        })
        .with_context(|| format!("benchmark of {} failed", strategy))?;

        writeln!(out, "{}: {}", strategy, stats)?;
        writeln!(
            out,
            "Index: {}, Coordinates: {}, Distance: {:.2} mm",
            result.index,
            format_coords(&result.point),
            result.distance
        )?;
        results.push((strategy, result));
    }
    Ok(results)
}
