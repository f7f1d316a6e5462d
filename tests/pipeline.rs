mod common;

use common::synthetic::{render, ring_lights};
use image::{GrayImage, Luma};
use nalgebra::Vector3;
use photometric_stereo::export::{write_ply, PlyOptions};
use photometric_stereo::image::io::load_dataset;
use photometric_stereo::image::{ImageF32, NormalMap};
use photometric_stereo::{Error, LightSample, ReconstructionParams, Reconstructor};
use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("photometric-stereo-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn flat_samples(count: usize, w: usize, h: usize) -> Vec<LightSample> {
    let mut normals = NormalMap::new(w, h);
    for n in normals.data.iter_mut() {
        *n = Vector3::new(0.0, 0.0, 1.0);
    }
    let albedo = ImageF32::from_fn(w, h, |_, _| 1.0);
    let lights: Vec<_> = ring_lights().into_iter().take(count).collect();
    render(&normals, &albedo, &lights)
}

#[test]
fn two_lights_is_a_configuration_error() {
    let samples = flat_samples(2, 4, 4);
    match Reconstructor::default().run(&samples) {
        Err(Error::TooFewLights { count: 2, required: 3 }) => {}
        other => panic!("expected TooFewLights, got {other:?}"),
    }
}

#[test]
fn mismatched_image_sizes_abort_the_run() {
    let mut samples = flat_samples(4, 6, 5);
    samples[2].image = ImageF32::new(5, 6);
    let err = Reconstructor::default().run(&samples).unwrap_err();
    assert!(
        matches!(err, Error::DimensionMismatch { index: 2, .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn dataset_directory_round_trips_through_the_pipeline() {
    let dir = scratch_dir("dataset");
    let directions = [(0, 0, 10), (5, 0, 10), (0, 5, 10), (-5, -5, 10)];
    let mut descriptor = String::new();
    for (k, (x, y, z)) in directions.iter().enumerate() {
        let index = k + 1;
        descriptor.push_str(&format!("pic{index}: ({x},{y},{z})\n"));
        let d = Vector3::new(*x as f32, *y as f32, *z as f32).normalize();
        let value = (200.0 * d.z).round() as u8;
        let img = GrayImage::from_fn(8, 6, |_, _| Luma([value]));
        img.save(dir.join(format!("pic{index}.bmp"))).unwrap();
    }
    fs::write(dir.join("LightSource.txt"), descriptor).unwrap();

    let samples = load_dataset(&dir, 1.0 / 255.0).unwrap();
    assert_eq!(samples.len(), 4);
    assert_eq!(samples[1].direction, Vector3::new(5.0, 0.0, 10.0));

    let params = ReconstructionParams {
        normalize_directions: true,
        ..Default::default()
    };
    let rec = Reconstructor::new(params).run(&samples).unwrap();
    let n = rec.normals.get(4, 3);
    assert!((n - Vector3::new(0.0, 0.0, 1.0)).norm() < 0.02, "normal {n:?}");

    let ply = dir.join("out").join("result.ply");
    let count = write_ply(&ply, &rec.depth, &rec.normals, &rec.albedo, &PlyOptions::default())
        .unwrap();
    assert_eq!(count, 48);
    let text = fs::read_to_string(&ply).unwrap();
    assert!(text.contains("element vertex 48"));
    assert_eq!(text.lines().count(), 48 + 13);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_image_is_data_unavailable() {
    let dir = scratch_dir("missing");
    fs::write(dir.join("LightSource.txt"), "pic1: (0,0,1)\npic2: (1,0,1)\npic3: (0,1,1)\n").unwrap();
    match load_dataset(&dir, 1.0) {
        Err(Error::DataUnavailable { path, .. }) => {
            assert!(path.ends_with("pic1.bmp"), "{}", path.display())
        }
        other => panic!("expected DataUnavailable, got {other:?}"),
    }
    let _ = fs::remove_dir_all(&dir);
}
