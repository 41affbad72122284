//! Thin CLI: `scanline <file.png> <operation> <out-path>`.
//!
//! Argument validation beyond "enough arguments were given" is left to the library's own
//! `DecodeError`/`InvalidArgument` reporting; this binary carries no business logic of its own.

use scanline::pixmap::transform::ScaleMethod;
use scanline::{DecodeError, Rgb};
use std::env;
use std::process::ExitCode;

fn usage(program_name: &str) -> String {
    format!(
        "USAGE: {program_name} <file.png> <ppm|ascii|grayscale-ppm|rotate-cw-ppm|rotate-ccw-ppm|scale-ppm> <out-path>"
    )
}

fn run() -> Result<(), DecodeError> {
    let mut args = env::args();
    let program_name = args.next().unwrap_or_else(|| "scanline".to_string());

    let in_path = args
        .next()
        .ok_or(DecodeError::InvalidArgument("missing input PNG path"))?;
    let operation = args
        .next()
        .ok_or(DecodeError::InvalidArgument("missing operation name"))?;
    let out_path = args
        .next()
        .ok_or(DecodeError::InvalidArgument("missing output path"))?;

    if args.next().is_some() {
        log::warn!("extra arguments ignored; {}", usage(&program_name));
    }

    let handle = scanline::open(&in_path)?;
    let pixmap = scanline::parse(&handle)?;
    handle.close()?;

    match operation.as_str() {
        "ppm" => pixmap.to_ppm(&out_path, Rgb::new(0, 0, 0))?,
        "ascii" => pixmap.to_ascii(&out_path)?,
        "grayscale-ppm" => pixmap.to_grayscale().to_ppm(&out_path, Rgb::new(0, 0, 0))?,
        "rotate-cw-ppm" => pixmap.rotate_cw().to_ppm(&out_path, Rgb::new(0, 0, 0))?,
        "rotate-ccw-ppm" => pixmap.rotate_ccw().to_ppm(&out_path, Rgb::new(0, 0, 0))?,
        "scale-ppm" => {
            let scaled =
                pixmap.scale(pixmap.width() * 2, pixmap.height() * 2, ScaleMethod::Nearest)?;
            scaled.to_ppm(&out_path, Rgb::new(0, 0, 0))?
        }
        _ => {
            log::error!("unknown operation `{operation}`; {}", usage(&program_name));
            return Err(DecodeError::InvalidArgument("unknown operation"));
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
