use anyhow::{anyhow, bail, Context, Result};
use crabshot::testing::{EventRecorder, RecordedEvent, SyntheticCamera};
use crabshot::{CameraController, CameraProps, FacingMode};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    crabshot::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: crabshot-cli <command> [args]");
        eprintln!("Commands: snapshot, default-config");
        std::process::exit(1);
    }

    let command = &args[1];
    match command.as_str() {
        "snapshot" => cmd_snapshot(&args).await,
        "default-config" => cmd_default_config(&args),
        _ => {
            eprintln!("Unknown command: {}", command);
            std::process::exit(1);
        }
    }
}

fn arg_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

async fn cmd_snapshot(args: &[String]) -> Result<()> {
    // snapshot [--config <path>] [--facing user|environment] [--max] [--out <file>] [--json]
    let mut config_path = None;
    let mut facing_mode = None;
    let mut max_resolution = false;
    let mut out = None;
    let mut json = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(arg_value(args, i, "--config")?));
            }
            "--facing" => {
                i += 1;
                let mode = arg_value(args, i, "--facing")?
                    .parse::<FacingMode>()
                    .map_err(|e| anyhow!(e))?;
                facing_mode = Some(mode);
            }
            "--max" => max_resolution = true,
            "--out" => {
                i += 1;
                out = Some(PathBuf::from(arg_value(args, i, "--out")?));
            }
            "--json" => json = true,
            other => bail!("Unknown argument: {}", other),
        }
        i += 1;
    }

    let mut props = match config_path {
        Some(path) => CameraProps::load_from_file(&path)?,
        None => CameraProps::load_or_default(),
    };
    if let Some(mode) = facing_mode {
        props.ideal_facing_mode = Some(mode);
    }
    if max_resolution {
        props.is_max_resolution = true;
    }
    let out = out
        .unwrap_or_else(|| PathBuf::from(format!("snapshot.{}", props.image_type.extension())));

    let recorder = EventRecorder::new();
    let mut camera = CameraController::mount_with_shutter(
        Arc::new(SyntheticCamera::new()),
        props,
        recorder.callbacks(),
        recorder.shutter(),
    )?;
    camera.settled().await?;

    let photo = camera.take_photo();
    let snapshot = camera.snapshot();
    camera.teardown().await;

    let image = photo.context("Failed to take photo")?;
    std::fs::write(&out, &image.data)
        .with_context(|| format!("Failed to write photo to {}", out.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "Captured {}x{} {} ({} bytes) -> {}",
        image.width,
        image.height,
        image.mime_type(),
        image.size_bytes(),
        out.display()
    );
    println!("Camera: {}", snapshot.lifecycle);
    for event in recorder.events() {
        match event {
            RecordedEvent::CameraStart(stream) => {
                println!("  start  {}x{} ({})", stream.width, stream.height, stream.id)
            }
            RecordedEvent::CameraStop => println!("  stop"),
            RecordedEvent::CameraError(e) => println!("  error  {}", e),
            RecordedEvent::TakePhoto(photo) => println!("  photo  {} bytes", photo.size_bytes()),
            RecordedEvent::TakePhotoAnimationDone(_) => println!("  photo  shown"),
            RecordedEvent::ShutterPlayed => println!("  click"),
        }
    }
    Ok(())
}

fn cmd_default_config(args: &[String]) -> Result<()> {
    let path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(CameraProps::default_path);

    CameraProps::default().save_to_file(&path)?;
    println!("Wrote default camera props to {}", path.display());
    Ok(())
}
