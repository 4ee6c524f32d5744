use anyhow::{bail, Context};
use snapcam::config::SnapCamConfig;
use snapcam::headless;
use snapcam::platform::{CaptureBackend, NativeBackend};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = "Usage: snapcam-cli <command> [args]

Commands:
  list-devices [--json]
  grab-frame <out.png> [--device ID]
  take-photo <out.jpg> [--device ID]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "snapcam=warn");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let backend: Arc<dyn CaptureBackend> = Arc::new(NativeBackend::new());
    let command = &args[1];
    match command.as_str() {
        "list-devices" => cmd_list_devices(backend, &args),
        "grab-frame" => cmd_grab_frame(backend, &args).await,
        "take-photo" => cmd_take_photo(backend, &args).await,
        _ => {
            eprintln!("Unknown command: {}\n\n{}", command, USAGE);
            std::process::exit(1);
        }
    }
}

fn cmd_list_devices(backend: Arc<dyn CaptureBackend>, args: &[String]) -> anyhow::Result<()> {
    let devices = headless::list_devices(backend.as_ref());
    if args.contains(&"--json".to_string()) {
        println!("{}", serde_json::to_string(&devices)?);
    } else {
        for d in devices {
            println!("{}: {}", d.device_id, d.label);
        }
    }
    Ok(())
}

async fn cmd_grab_frame(backend: Arc<dyn CaptureBackend>, args: &[String]) -> anyhow::Result<()> {
    let (output, device) = parse_capture_args(args)?;
    let controller = headless::open(backend, SnapCamConfig::load_or_default(), device.as_deref())
        .await
        .context("failed to open camera")?;

    let view = controller.grab_frame().await.context("failed to grab frame")?;
    let path = controller.save_frame_to_disk(Some(output)).await?;
    controller.shutdown().await;

    println!("{} ({}x{})", path.display(), view.width, view.height);
    Ok(())
}

async fn cmd_take_photo(backend: Arc<dyn CaptureBackend>, args: &[String]) -> anyhow::Result<()> {
    let (output, device) = parse_capture_args(args)?;
    let controller = headless::open(backend, SnapCamConfig::load_or_default(), device.as_deref())
        .await
        .context("failed to open camera")?;

    let photo = controller.take_photo().await.context("failed to take photo")?;
    let path = controller.save_photo_to_disk(Some(output)).await?;
    controller.shutdown().await;

    println!(
        "{} ({}x{}, {} bytes)",
        path.display(),
        photo.handle.width,
        photo.handle.height,
        photo.handle.size_bytes
    );
    Ok(())
}

/// `<out> [--device ID]`
fn parse_capture_args(args: &[String]) -> anyhow::Result<(PathBuf, Option<String>)> {
    let mut output = None;
    let mut device = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--device" => {
                i += 1;
                let Some(id) = args.get(i) else {
                    bail!("--device requires a value");
                };
                device = Some(id.clone());
            }
            other => {
                if output.is_none() {
                    output = Some(PathBuf::from(other));
                }
            }
        }
        i += 1;
    }

    let output = output.context("output path required")?;
    Ok((output, device))
}
