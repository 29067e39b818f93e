use std::{
    fs::{self, File},
    io::{stdout, BufWriter, Write},
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;
use layer_slicer::{
    format::{write_json, SvgFile},
    mesh::load_mesh,
    perimeter::Perimeter,
    slicer::Slicer,
};

mod args;

fn main() -> Result<()> {
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("layer_slicer", LevelFilter::INFO)
        .with_target("mesh_format", LevelFilter::INFO)
        .with_target("common", LevelFilter::INFO);
    let format = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();

    let args = Args::parse();
    let slice_config = args.slice_config()?;

    let ext = (args.mesh.extension())
        .map(|x| x.to_string_lossy())
        .unwrap_or_default();
    let data = fs::read(&args.mesh)
        .with_context(|| format!("Can't read mesh `{}`", args.mesh.display()))?;
    let mesh = load_mesh(&data, &ext)?;

    let (min, max) = mesh.bounds();
    println!(
        "Loaded `{}`. {{ face: {}, z: {}..{} }}",
        args.mesh.display(),
        mesh.triangle_count(),
        min,
        max
    );
    if !mesh.is_manifold() {
        warn!("Mesh is not manifold, some perimeters may stay open");
    }

    let now = Instant::now();
    let slicer = Slicer::new(slice_config, mesh)?;
    let progress = slicer.progress();

    // Slicing is multithreaded on its own, this thread just reports progress.
    let result = thread::scope(|s| -> Result<_> {
        let handle = s.spawn(|| slicer.slice());

        while !handle.is_finished() {
            print!(
                "\rLayer: {}/{}, {:.1}%",
                progress.completed(),
                progress.total(),
                progress.progress() * 100.0
            );
            stdout().flush()?;
            thread::sleep(Duration::from_millis(50));
        }

        handle.join().map_err(|_| anyhow!("Slicing thread panicked"))
    })?;

    println!(
        "\rLayer: {0}/{0}\nDone. {1} of {0} layers hit the mesh, {2} open perimeters. Elapsed: {3:.1}s",
        result.layers.len(),
        result.non_empty_layers(),
        result.open_perimeters(),
        now.elapsed().as_secs_f32()
    );

    if let Some(index) = args.layer {
        let layer = result
            .layers
            .get(index as usize)
            .with_context(|| format!("No layer {index}, only {}", result.layers.len()))?;

        println!("Layer {} at z = {}", layer.index, layer.height);
        match &layer.outer {
            Some(outer) => print_perimeter("Outer", outer),
            None => println!(" \\ Empty"),
        }
        for inner in &layer.inners {
            print_perimeter("Inner", inner);
        }
    }

    if let Some(path) = &args.json {
        let file = File::create(path)
            .with_context(|| format!("Can't create `{}`", path.display()))?;
        write_json(BufWriter::new(file), &result)?;
        println!("Wrote layers to `{}`", path.display());
    }

    if let Some(path) = &args.svg {
        let file = File::create(path)
            .with_context(|| format!("Can't create `{}`", path.display()))?;
        let svg = SvgFile::from_slice_result(&result);
        svg.write(BufWriter::new(file))?;
        println!("Wrote {} layers to `{}`", svg.layer_count(), path.display());
    }

    Ok(())
}

fn print_perimeter(kind: &str, perimeter: &Perimeter) {
    let state = if perimeter.is_closed() { "closed" } else { "open" };
    println!(" \\ {kind} ({} segments, {state})", perimeter.len());
    for segment in perimeter.segments() {
        println!(
            "   ({}, {}) -> ({}, {})",
            segment.a.x, segment.a.y, segment.b.x, segment.b.y
        );
    }
}
