use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use env_logger::Env;
use log::{debug, info, warn};
use rayon::prelude::*;

mod bounce;
use bounce::core::{BounceParams, Scene, Termination, MAX_BOUNCES, PROBE_REACH};
use bounce::render::{Animation, EscapeMap};
use bounce::scene::{Ring, SceneConfig};
use bounce::view::Viewport;
use bounce::Vec2;

#[derive(Debug, Parser)]
#[command(version, about = "Rays bouncing among mirrored circles", long_about = None)]
struct Args {
    /// leave the center circle out of the scene
    #[arg(long, global = true)]
    hollow: bool,
    /// a ring of circles as "count,radius", repeatable; replaces the reference rings
    #[arg(long = "ring", global = true, value_parser = parse_ring)]
    rings: Vec<Ring>,
    /// radius of every circle in the scene
    #[arg(long, global = true, default_value_t = 1.0, value_parser = parse_positive)]
    circle_radius: f64,
    /// bounces before a chain is considered a closed orbit
    #[arg(long, global = true, default_value_t = MAX_BOUNCES)]
    max_bounces: u32,
    /// length of the probe sent out after each reflection
    #[arg(long, global = true, default_value_t = PROBE_REACH, value_parser = parse_positive)]
    reach: f64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// draw one bounce chain per frame, its start drifting a little every frame
    Animate(AnimateArgs),
    /// color every (launch angle, heading) pair by the direction the ray escapes in
    Scan(ScanArgs),
}

#[derive(Debug, clap::Args)]
struct AnimateArgs {
    /// directory receiving one image per frame
    #[arg(short, long, default_value = "out")]
    output: PathBuf,
    /// image format of the frames, by file extension
    #[arg(long, default_value = "ppm")]
    format: String,
    #[arg(long, default_value_t = 96, value_parser = clap::value_parser!(u32).range(1..))]
    frames: u32,
    #[arg(long, default_value_t = 1920, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,
    #[arg(long, default_value_t = 1080, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,
    /// lower-left corner of the visible window, as "x,y"
    #[arg(long, default_value = "-14.22,-8", value_parser = parse_point, allow_hyphen_values = true)]
    view_min: Vec2,
    /// upper-right corner of the visible window, as "x,y"
    #[arg(long, default_value = "14.22,8", value_parser = parse_point, allow_hyphen_values = true)]
    view_max: Vec2,
    /// where the ray starts, as "x,y"
    #[arg(long, default_value = "7,7", value_parser = parse_point, allow_hyphen_values = true)]
    start: Vec2,
    /// where the first probe points to, as "x,y"
    #[arg(long, default_value = "-3,-4", value_parser = parse_point, allow_hyphen_values = true)]
    target: Vec2,
    /// vertical drift of the start point over the whole animation
    #[arg(long, default_value_t = 0.0000005)]
    wobble: f64,
}

#[derive(Debug, clap::Args)]
struct ScanArgs {
    /// the path where the escape map is saved, format chosen by extension
    #[arg(short, long, default_value = "out.ppm")]
    output: PathBuf,
    #[arg(long, default_value_t = 1080, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,
    #[arg(long, default_value_t = 1080, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,
    /// smallest launch angle and heading, in degrees, as "launch,heading"
    #[arg(long, default_value = "210,40", value_parser = parse_point, allow_hyphen_values = true)]
    angles_min: Vec2,
    /// largest launch angle and heading, in degrees, as "launch,heading"
    #[arg(long, default_value = "246,76", value_parser = parse_point, allow_hyphen_values = true)]
    angles_max: Vec2,
    /// radius of the circle rays are launched from
    #[arg(long, default_value_t = 8.0)]
    launch_radius: f64,
}

fn parse_point(value: &str) -> Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got \"{}\"", value))?;
    let x = x.trim().parse::<f64>().map_err(|err| err.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|err| err.to_string())?;
    Ok(Vec2::new(x, y))
}

fn parse_positive(value: &str) -> Result<f64, String> {
    let number = value.trim().parse::<f64>().map_err(|err| err.to_string())?;
    if number > 0.0 && number.is_finite() {
        Ok(number)
    } else {
        Err(format!("expected a positive length, got {}", number))
    }
}

fn parse_ring(value: &str) -> Result<Ring, String> {
    let (count, radius) = value
        .split_once(',')
        .ok_or_else(|| format!("expected \"count,radius\", got \"{}\"", value))?;
    let count = match count.trim().parse::<u32>() {
        Ok(count) if count > 0 => count,
        _ => return Err(format!("expected a positive circle count, got \"{}\"", count)),
    };
    let radius = parse_positive(radius)?;
    Ok(Ring { count, radius })
}

/// Both corners must be finite and differ on each axis.
fn check_window(name: &str, min: Vec2, max: Vec2) -> Result<(), String> {
    if !min.is_finite() || !max.is_finite() {
        return Err(format!("--{}-min and --{}-max must be finite", name, name));
    }
    if min.x == max.x || min.y == max.y {
        return Err(format!(
            "--{}-min {},{} and --{}-max {},{} do not span an area",
            name, min.x, min.y, name, max.x, max.y
        ));
    }
    Ok(())
}

impl Command {
    fn validate(&self) -> Result<(), String> {
        match self {
            Command::Animate(args) => check_window("view", args.view_min, args.view_max),
            Command::Scan(args) => check_window("angles", args.angles_min, args.angles_max),
        }
    }
}

/// The reference scene unless one of the scene flags changes it.
fn build_scene(args: &Args) -> Scene {
    if args.rings.is_empty() && !args.hollow && args.circle_radius == 1.0 {
        return Scene::reference();
    }
    Scene::build(&scene_config(args))
}

fn scene_config(args: &Args) -> SceneConfig {
    let reference = SceneConfig::default();
    SceneConfig {
        center: !args.hollow,
        rings: if args.rings.is_empty() {
            reference.rings
        } else {
            args.rings.clone()
        },
        circle_radius: args.circle_radius,
    }
}

fn animate(
    scene: &Scene,
    params: BounceParams,
    args: &AnimateArgs,
) -> Result<(), Box<dyn Error>> {
    let animation = Animation {
        view: Viewport::new(args.view_min, args.view_max, args.width, args.height),
        frames: args.frames,
        start: args.start,
        target: args.target,
        wobble: args.wobble,
        params,
    };
    fs::create_dir_all(&args.output)?;

    let start = Instant::now();
    // frames are independent: each one owns its buffer
    let terminations = (0..args.frames)
        .into_par_iter()
        .map(|frame| -> Result<Termination, image::ImageError> {
            let (buffer, termination) = animation.render_frame(scene, frame);
            let path = args.output.join(format!("{:03}.{}", frame, args.format));
            buffer.save(&path)?;
            debug!("frame {} saved to {} ({:?})", frame, path.display(), termination);
            Ok(termination)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let orbits = terminations
        .iter()
        .filter(|t| **t == Termination::Exhausted)
        .count();
    let degenerate = terminations
        .iter()
        .filter(|t| **t == Termination::Degenerate)
        .count();
    if degenerate > 0 {
        warn!("{} frames stopped on degenerate geometry", degenerate);
    }
    info!(
        "Rendered {} frames into {} in {:?} ({} closed orbits)",
        args.frames,
        args.output.display(),
        start.elapsed(),
        orbits
    );
    Ok(())
}

fn scan(scene: &Scene, params: BounceParams, args: &ScanArgs) -> Result<(), Box<dyn Error>> {
    let map = EscapeMap {
        window: Viewport::new(args.angles_min, args.angles_max, args.width, args.height),
        launch_radius: args.launch_radius,
        reach: params.reach,
        params,
    };

    let start = Instant::now();
    let (buffer, stats) = map.render(scene);
    if stats.degenerate > 0 {
        warn!("{} rays stopped on degenerate geometry", stats.degenerate);
    }
    info!(
        "Rendered {} in {:?}: {} escaped, {} closed orbits",
        args.output.display(),
        start.elapsed(),
        stats.escaped,
        stats.exhausted
    );

    buffer.save(&args.output)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(message) = args.command.validate() {
        Args::command().error(ErrorKind::ValueValidation, message).exit();
    }

    let scene = build_scene(&args);
    info!("scene with {} circles", scene.circles.len());
    let params = BounceParams {
        max_bounces: args.max_bounces,
        reach: args.reach,
    };

    match &args.command {
        Command::Animate(animate_args) => animate(&scene, params, animate_args),
        Command::Scan(scan_args) => scan(&scene, params, scan_args),
    }
}
