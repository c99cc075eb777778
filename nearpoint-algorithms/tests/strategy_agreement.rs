//! Integration tests checking that every strategy finds the true closest point
//!
//! The brute force scan is the oracle. The other strategies must agree with
//! it on the distance everywhere, and on the index whenever the minimum is
//! not shared by several points.

use approx::assert_relative_eq;
use nearpoint_algorithms::{find, find_by_name, find_many, Strategy};
use nearpoint_core::{distance, Error, Point3f, TriangleMesh};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random points in a cube of half-width `extent`
fn random_cloud(rng: &mut StdRng, n: usize, extent: f32) -> Vec<Point3f> {
    (0..n)
        .map(|_| {
            Point3f::new(
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
            )
        })
        .collect()
}

/// Exact minimum distance and the number of points attaining it
fn oracle(points: &[Point3f], query: &Point3f) -> (f32, usize) {
    let min = points
        .iter()
        .map(|p| distance(p, query))
        .fold(f32::INFINITY, f32::min);
    let ties = points.iter().filter(|p| distance(p, query) == min).count();
    (min, ties)
}

fn unit_cube() -> Vec<Point3f> {
    vec![
        Point3f::new(0.0, 0.0, 0.0),
        Point3f::new(1.0, 0.0, 0.0),
        Point3f::new(0.0, 1.0, 0.0),
        Point3f::new(0.0, 0.0, 1.0),
        Point3f::new(1.0, 1.0, 0.0),
        Point3f::new(1.0, 0.0, 1.0),
        Point3f::new(0.0, 1.0, 1.0),
        Point3f::new(1.0, 1.0, 1.0),
    ]
}

#[test]
fn test_brute_force_distance_is_exact_minimum() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let points = random_cloud(&mut rng, 500, 100.0);
        let query = Point3f::new(
            rng.gen_range(-150.0..150.0),
            rng.gen_range(-150.0..150.0),
            rng.gen_range(-150.0..150.0),
        );
        let (min, _) = oracle(&points, &query);
        let result = find(&points, &query, Strategy::BruteForce).unwrap();
        assert_eq!(result.distance, min);
        assert_eq!(result.point, points[result.index]);
    }
}

#[test]
fn test_strategies_agree_without_ties() {
    let mut rng = StdRng::seed_from_u64(2024);
    let points = random_cloud(&mut rng, 5_000, 50.0);

    for _ in 0..100 {
        let query = Point3f::new(
            rng.gen_range(-80.0..80.0),
            rng.gen_range(-80.0..80.0),
            rng.gen_range(-80.0..80.0),
        );
        let (min, ties) = oracle(&points, &query);
        let reference = find(&points, &query, Strategy::BruteForce).unwrap();

        for strategy in [Strategy::BuiltinLocator, Strategy::SpatialTree] {
            let result = find(&points, &query, strategy).unwrap();
            assert_relative_eq!(result.distance, min, max_relative = 1e-6);
            assert_relative_eq!(result.distance, reference.distance, max_relative = 1e-6);
            if ties == 1 {
                assert_eq!(result.index, reference.index, "{} disagrees", strategy);
            }
        }
    }
}

#[test]
fn test_tied_points_report_the_same_distance() {
    // Query at the cube center is equidistant from all eight corners; which
    // corner comes back is strategy dependent.
    let points = unit_cube();
    let center = Point3f::new(0.5, 0.5, 0.5);

    let reference = find(&points, &center, Strategy::BruteForce).unwrap();
    assert_eq!(reference.index, 0);

    for strategy in Strategy::ALL {
        let result = find(&points, &center, strategy).unwrap();
        assert!(result.index < points.len());
        assert_relative_eq!(result.distance, 0.75f32.sqrt(), max_relative = 1e-6);
    }
}

#[test]
fn test_repeated_calls_are_identical() {
    let mut rng = StdRng::seed_from_u64(9);
    let points = random_cloud(&mut rng, 1_000, 10.0);
    let query = Point3f::new(1.5, -2.5, 3.5);

    for strategy in Strategy::ALL {
        let first = find(&points, &query, strategy).unwrap();
        for _ in 0..3 {
            let again = find(&points, &query, strategy).unwrap();
            assert_eq!(again.index, first.index);
            assert_eq!(again.point, first.point);
            assert_eq!(again.distance.to_bits(), first.distance.to_bits());
        }
    }
}

#[test]
fn test_single_point_any_query() {
    let point = Point3f::new(-3.0, 7.0, 2.5);
    let query = Point3f::new(100.0, -40.0, 0.0);
    for strategy in Strategy::ALL {
        let result = find(&[point], &query, strategy).unwrap();
        assert_eq!(result.index, 0);
        assert_eq!(result.point, point);
        assert_relative_eq!(result.distance, (query - point).norm(), max_relative = 1e-6);
    }
}

#[test]
fn test_query_on_vertex_has_zero_distance() {
    let mut rng = StdRng::seed_from_u64(3);
    let points = random_cloud(&mut rng, 2_000, 20.0);
    for &target in &[0usize, 777, 1_999] {
        for strategy in Strategy::ALL {
            let result = find(&points, &points[target], strategy).unwrap();
            assert_eq!(result.distance, 0.0);
            assert_eq!(result.point, points[target]);
        }
    }
}

#[test]
fn test_unit_cube_scenario() {
    let points = unit_cube();
    let query = Point3f::new(0.1, 0.1, 0.1);
    for strategy in Strategy::ALL {
        let result = find(&points, &query, strategy).unwrap();
        assert_eq!(result.index, 0);
        assert_eq!(result.point, Point3f::new(0.0, 0.0, 0.0));
        assert_relative_eq!(result.distance, 0.1732, epsilon = 1e-4);
    }
}

#[test]
fn test_far_query_resolves_to_boundary_point() {
    // Hull vertices on a sphere of radius 10, interior points within radius 5.
    let mut points = TriangleMesh::uv_sphere(10.0, 24, 24).unwrap().vertices;
    let hull_count = points.len();
    let mut rng = StdRng::seed_from_u64(77);
    while points.len() < hull_count + 500 {
        let p = Point3f::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        );
        if p.coords.norm() <= 5.0 {
            points.push(p);
        }
    }

    let queries = [
        Point3f::new(1_000.0, 200.0, -300.0),
        Point3f::new(-500.0, -500.0, 20.0),
        Point3f::new(0.0, 0.0, 10_000.0),
    ];
    for strategy in Strategy::ALL {
        for result in find_many(&points, &queries, strategy).unwrap() {
            assert!(result.index < hull_count, "{} picked an interior point", strategy);
            assert_relative_eq!(result.point.coords.norm(), 10.0, max_relative = 1e-5);
        }
    }
}

#[test]
fn test_bogus_method_is_rejected_before_searching() {
    let err = find_by_name(&unit_cube(), &Point3f::origin(), "bogus").unwrap_err();
    assert!(matches!(err, Error::UnsupportedStrategy(name) if name == "bogus"));
}

#[test]
fn test_demo_sphere_query() {
    let sphere = TriangleMesh::uv_sphere(100.0, 200, 200).unwrap();
    let query = Point3f::new(20.29, 83.58, 26.50);
    let expected = 100.0 - query.coords.norm();

    let results: Vec<_> = Strategy::ALL
        .iter()
        .map(|&strategy| find(&sphere.vertices, &query, strategy).unwrap())
        .collect();
    for result in &results {
        assert_relative_eq!(result.distance, results[0].distance, max_relative = 1e-6);
        // The closest vertex cannot be nearer than the sphere surface itself.
        assert!(result.distance >= expected - 1e-3);
        assert!(result.distance < expected + 1.0);
    }
}
