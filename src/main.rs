use std::fs;
use std::time::Instant;
use std::error::Error;

use image::{ImageBuffer, Rgb};

use clap::{Parser, ValueEnum};

use log::{info, LevelFilter};

mod raytracing;
use raytracing::core::{render, ShadowScan};
use raytracing::math::Vec3;
use raytracing::parser::{SceneData, SceneParser};

/// Log levels selectable from the command line.
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input path to the scene file
    scene: String,
    /// the path where is saved the rendered image
    #[arg(short, long, default_value = "output.png")]
    output: String,
    /// consult only the first shadow caster when testing occlusion
    #[arg(long, default_value = "false")]
    first_caster_shadows: bool,
    /// the logging level
    #[arg(long, default_value = "info")]
    debug_level: LogLevel,
}

impl From<Vec3> for image::Rgb<u8> {
    fn from(value: Vec3) -> Self {
        // shading math is unclamped, colors saturate only here
        let r = (value.x.clamp(0.0, 1.0) * 255.0) as u8;
        let g = (value.y.clamp(0.0, 1.0) * 255.0) as u8;
        let b = (value.z.clamp(0.0, 1.0) * 255.0) as u8;
        image::Rgb([r, g, b])
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.debug_level.into())
        .init();

    let content = fs::read_to_string(&args.scene)?;
    let mut parser = SceneParser::new(&content);
    let parser_result = parser.parse_scene();
    if let Err(parser_error) = parser_result {
        parser_error.print_error_location(&content);
        return Err(Box::from(format!("parser error {}", parser_error.message)));
    }

    let SceneData {
        width,
        height,
        camera,
        mut scene,
    } = parser_result.unwrap();
    if args.first_caster_shadows {
        scene.shadow_scan = ShadowScan::First;
    }

    info!(
        "rendering {} objects ({} shadow casters) at {}x{}",
        scene.objects.len(),
        scene.shadow_casters.len(),
        width,
        height
    );

    // measure time
    let start = Instant::now();
    let pixels = render(&scene, &camera, width, height);
    let total_time = start.elapsed();
    info!("resolved {} pixels in {:?}", pixels.len(), total_time);

    // write the raytracing result into the ImageBuffer
    let mut buffer: ImageBuffer<Rgb<u8>, Vec<_>> = ImageBuffer::new(width, height);
    for pixel in &pixels {
        buffer.put_pixel(pixel.screen_x, pixel.screen_y, pixel.color.into());
    }

    buffer.save(&args.output)?;
    info!("saved {}", args.output);
    Ok(())
}
