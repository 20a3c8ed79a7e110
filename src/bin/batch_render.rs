//! Batch render entry point.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use ai2rpr::launcher::{run_batch, LauncherConfig};

/// Render every active test scene from a JSON manifest.
#[derive(Parser, Debug)]
#[command(name = "batch_render", version, about)]
struct Args {
    /// JSON manifest of test scenes.
    #[arg(long)]
    tests_list: PathBuf,

    /// Path to the renderer executable.
    #[arg(long)]
    render_path: PathBuf,

    /// Directory holding the test scenes.
    #[arg(long)]
    scene_path: PathBuf,

    /// Directory for per-test render logs.
    #[arg(long)]
    output_dir: PathBuf,

    /// Directory for rendered images, created if missing.
    #[arg(long)]
    output_img_dir: PathBuf,

    /// Output image format extension.
    #[arg(long, default_value = "jpg")]
    output_file_ext: String,

    /// Per-test render deadline in seconds.
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = LauncherConfig {
        tests_list: args.tests_list,
        render_path: args.render_path,
        scene_path: args.scene_path,
        output_dir: args.output_dir,
        output_img_dir: args.output_img_dir,
        output_file_ext: args.output_file_ext,
        timeout: Duration::from_secs(args.timeout_secs),
    };

    match run_batch(&config) {
        Ok(completed) => log::info!("batch done, {} renders completed", completed),
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    }
}
