//! Visualization of closest point results
//!
//! A [`Scene`] describes what gets displayed for one search: the mesh drawn
//! semi-transparent, a red marker on the query point, a blue marker on the
//! closest vertex, an overlay text with the enabled fields and a legend.
//! A [`Viewer`] shows the scene as text and can export it as a colored PLY
//! file for any mesh viewer.

pub mod scene;
pub mod viewer;

pub use scene::*;
pub use viewer::*;

use nearpoint_algorithms::SearchResult;
use nearpoint_core::{Point3f, Result, TriangleMesh};
use std::io::Write;

/// Build the scene for `result` and show it on `out`
pub fn show_result<W: Write>(
    mesh: &TriangleMesh,
    query: &Point3f,
    result: &SearchResult,
    show: ShowFields,
    viewer: &Viewer,
    out: &mut W,
) -> Result<()> {
    let scene = Scene::for_result(mesh, query, result, show);
    viewer.show(&scene, out)
}
