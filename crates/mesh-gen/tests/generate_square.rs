//! End-to-end generation scenarios on a unit square.

mod common;

use common::BowyerWatson;
use nalgebra::Point2;

use mesh_gen::{generate_mesh, GenerateOptions, Rectangle, SerialComm, SignedDistance, Verbosity};
use mesh_geom::{cell_centroid, cell_volume, TriMesh};

fn unit_square() -> Rectangle {
    Rectangle::new(0.0, 1.0, 0.0, 1.0).unwrap()
}

fn quiet_options() -> GenerateOptions<2> {
    GenerateOptions {
        max_iter: 20,
        verbose: Verbosity::Silent,
        ..GenerateOptions::default()
    }
}

fn mesh_unit_square(opts: &GenerateOptions<2>) -> TriMesh {
    generate_mesh(&unit_square(), &0.1_f64, &SerialComm, BowyerWatson::new, opts).unwrap()
}

#[test]
fn test_unit_square_mesh_is_interior_and_positive() {
    let rect = unit_square();
    let mesh = mesh_unit_square(&quiet_options());

    assert!(mesh.cell_count() > 100, "got {} cells", mesh.cell_count());
    let mut total_area = 0.0;
    for cell in &mesh.cells {
        let centroid = cell_centroid(&mesh.points, cell);
        assert!(rect.eval(&centroid) < 0.0, "centroid left the domain");
        total_area += cell_volume(&mesh.points, cell).abs();
    }
    // The triangles tile most of the square without overshooting it.
    assert!(total_area > 0.9 && total_area < 1.0 + 1e-9, "area {total_area}");
}

#[test]
fn test_generation_is_seed_deterministic() {
    // A graded sizing field makes the rejection sampler actually reject,
    // so the seed participates in the outcome.
    let graded = |p: &Point2<f64>| 0.1 + 0.1 * p.y;
    let run = |seed: u64| {
        let opts = GenerateOptions {
            seed,
            h0: Some(0.1),
            ..quiet_options()
        };
        generate_mesh(&unit_square(), &graded, &SerialComm, BowyerWatson::new, &opts).unwrap()
    };

    assert_eq!(run(0), run(0));
    assert_ne!(run(0), run(42));
}

#[test]
fn test_fixed_points_survive_untouched() {
    // None of these coincide with a lattice site.
    let anchors = vec![
        Point2::new(0.5, 0.5),
        Point2::new(0.25, 0.75),
        Point2::new(0.75, 0.25),
        Point2::new(0.33, 0.33),
    ];
    let opts = GenerateOptions {
        fixed_points: anchors.clone(),
        ..quiet_options()
    };
    let mesh = mesh_unit_square(&opts);
    for anchor in &anchors {
        assert!(
            mesh.points.iter().any(|p| p == anchor),
            "anchor {anchor} missing from the final mesh"
        );
    }
}

#[test]
fn test_lint_pass_leaves_positively_oriented_cells() {
    let opts = GenerateOptions {
        perform_checks: true,
        ..quiet_options()
    };
    let mesh = mesh_unit_square(&opts);
    assert!(!mesh.is_empty());
    for cell in &mesh.cells {
        assert!(cell_volume(&mesh.points, cell) > 0.0);
    }
}
