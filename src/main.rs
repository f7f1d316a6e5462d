use log::info;
use photometric_stereo::config;
use photometric_stereo::export::write_ply;
use photometric_stereo::image::io::{
    load_dataset, save_normal_map_rgb, save_normalized_f32, write_json_file,
};
use photometric_stereo::{Reconstruction, Reconstructor, Result};
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = config::parse_args(env::args().skip(1))?;
    let input_dir = config.input_dir()?;

    let samples = load_dataset(input_dir, config.params.intensity_scale)?;
    info!(
        "loaded {} light samples from {}",
        samples.len(),
        input_dir.display()
    );

    let reconstructor = Reconstructor::new(config.params.clone());
    let rec = reconstructor.run(&samples)?;
    println!("{}", rec.report.summary());

    let vertices = write_ply(
        &config.output.ply,
        &rec.depth,
        &rec.normals,
        &rec.albedo,
        &config.ply,
    )?;
    println!(
        "Saved {} points to {}",
        vertices,
        config.output.ply.display()
    );

    if let Some(path) = &config.output.report_json {
        write_json_file(path, &rec.report)?;
        println!("Report written to {}", path.display());
    }

    if let Some(dir) = &config.output.debug_dir {
        save_debug_artifacts(dir, &rec)?;
        println!("Debug images written to {}", dir.display());
    }

    Ok(())
}

fn save_debug_artifacts(dir: &Path, rec: &Reconstruction) -> Result<()> {
    save_normalized_f32(&rec.albedo, &dir.join("albedo.png"))?;
    save_normalized_f32(&rec.depth, &dir.join("depth.png"))?;
    save_normal_map_rgb(&rec.normals, &dir.join("normals.png"))?;
    if let Some(curl) = &rec.curl {
        save_normalized_f32(&curl.map, &dir.join("curl.png"))?;
    }
    Ok(())
}
