mod common;

use common::synthetic::{height_field, max_offset_error, render, ring_lights};
use photometric_stereo::depth::{axis_integrals, compute_slopes, integrate_normals};
use photometric_stereo::image::{ImageF32, ImageView};
use photometric_stereo::{DepthParams, GrazingPolicy, IntegrationScheme, ReconstructionParams, Reconstructor};

fn separable(x: usize, y: usize) -> f32 {
    let (u, v) = (x as f32, y as f32);
    3.0 * (u / 7.0).sin() + 0.01 * v * v - 0.2 * v
}

fn saddle(x: usize, y: usize) -> f32 {
    let (u, v) = (x as f32 - 12.0, y as f32 - 10.0);
    0.004 * (u * u - v * v) + 0.5 * (u / 9.0).cos() * (v / 11.0).sin()
}

#[test]
fn axis_sum_recovers_separable_height_up_to_offset() {
    let (heights, normals) = height_field(32, 24, separable);
    let result = integrate_normals(&normals, &DepthParams::default());
    let err = max_offset_error(&result.depth, &heights);
    assert!(err < 1e-3, "max error after offset removal: {err}");
}

#[test]
fn row_then_column_recovers_any_smooth_height_up_to_offset() {
    let (heights, normals) = height_field(25, 21, saddle);
    let params = DepthParams {
        integration: IntegrationScheme::RowThenColumn,
        ..Default::default()
    };
    let result = integrate_normals(&normals, &params);
    let err = max_offset_error(&result.depth, &heights);
    assert!(err < 1e-3, "max error after offset removal: {err}");

    let curl = result.curl.expect("integrability check enabled by default");
    assert!(curl.stats.max_abs < 1e-4, "curl {:?}", curl.stats);
}

#[test]
fn first_row_and_column_of_axis_integrals_hold_the_zero_seed() {
    let (_, normals) = height_field(9, 7, saddle);
    let slopes = compute_slopes(&normals, 1e-3, GrazingPolicy::Clamp);
    let ints = axis_integrals(&slopes);
    assert!(ints.rows.row(0).iter().all(|&v| v == 0.0));
    assert!((0..7).all(|y| ints.cols.get(0, y) == 0.0));

    let result = integrate_normals(&normals, &DepthParams::default());
    assert_eq!(result.depth.get(0, 0), 0.0);
    // Along the seed row and column the two schemes coincide.
    let path = integrate_normals(
        &normals,
        &DepthParams {
            integration: IntegrationScheme::RowThenColumn,
            ..Default::default()
        },
    );
    for x in 0..9 {
        assert_eq!(result.depth.get(x, 0), path.depth.get(x, 0));
    }
    for y in 0..7 {
        assert_eq!(result.depth.get(0, y), path.depth.get(0, y));
    }
}

#[test]
fn axis_sum_depth_edges_carry_the_running_slope_sums() {
    let (_, normals) = height_field(9, 7, saddle);
    let slopes = compute_slopes(&normals, 1e-3, GrazingPolicy::Clamp);
    let ints = axis_integrals(&slopes);
    let depth = integrate_normals(&normals, &DepthParams::default()).depth;

    let mut sum_p = 0.0f32;
    for x in 0..9 {
        if x > 0 {
            sum_p += slopes.p.get(x, 0);
        }
        assert_eq!(depth.get(x, 0), ints.cols.get(x, 0));
        assert!((depth.get(x, 0) - sum_p).abs() < 1e-5);
    }
    let mut sum_q = 0.0f32;
    for y in 0..7 {
        if y > 0 {
            sum_q += slopes.q.get(0, y);
        }
        assert_eq!(depth.get(0, y), ints.rows.get(0, y));
        assert!((depth.get(0, y) - sum_q).abs() < 1e-5);
    }
    // The saddle has slope along the seed row, so the edge is not zero.
    assert!((1..9).any(|x| depth.get(x, 0) != 0.0));
}

#[test]
fn grazing_normals_never_produce_non_finite_depth() {
    let (_, mut normals) = height_field(8, 8, separable);
    normals.set(3, 3, nalgebra::Vector3::new(1.0, 0.0, 0.0));
    normals.set(5, 2, nalgebra::Vector3::new(0.0, -1.0, 1e-6).normalize());
    for policy in [
        GrazingPolicy::Clamp,
        GrazingPolicy::Hole,
        GrazingPolicy::FillFromNeighbors,
    ] {
        let params = DepthParams {
            grazing_policy: policy,
            ..Default::default()
        };
        let result = integrate_normals(&normals, &params);
        assert!(
            result.depth.data.iter().all(|d| d.is_finite()),
            "non-finite depth under {policy:?}"
        );
        let stats = result.slopes.stats();
        assert_eq!(stats.clamped + stats.holes + stats.filled, 2, "{policy:?}: {stats:?}");
    }
}

#[test]
fn end_to_end_depth_from_rendered_images() {
    let (heights, normals) = height_field(24, 20, saddle);
    let albedo = ImageF32::from_fn(24, 20, |x, _| 0.5 + 0.01 * x as f32);
    let samples = render(&normals, &albedo, &ring_lights());

    let params = ReconstructionParams {
        depth: DepthParams {
            integration: IntegrationScheme::RowThenColumn,
            ..Default::default()
        },
        ..Default::default()
    };
    let rec = Reconstructor::new(params).run(&samples).unwrap();
    let err = max_offset_error(&rec.depth, &heights);
    assert!(err < 5e-3, "max error after offset removal: {err}");
    assert_eq!(rec.report.normals.degenerate_pixels, 0);
}
