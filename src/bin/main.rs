// pulp-view entry point
//
// Usage: pulp-view <image>
// Decodes the file, renders it into a host framebuffer and logs a summary.
// Exit status: 0 on success, 1 on decode failure, 2 on bad usage.
// RUST_LOG selects log verbosity (default info); PULP_VIEW_VERIFY_CRC=1
// turns on chunk CRC checks.

use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info};

use pulp_view::{VERIFY_CRC_ENV, load, options_from_env};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args_os().skip(1);
    let (Some(path), None) = (args.next(), args.next()) else {
        eprintln!("usage: pulp-view <image>");
        return ExitCode::from(2);
    };
    let path = PathBuf::from(path);

    let crc_env = std::env::var(VERIFY_CRC_ENV).ok();
    let opts = options_from_env(crc_env.as_deref());

    match load(&path, &opts) {
        Ok((image, fb)) => {
            let opaque = image.pixels().iter().filter(|p| p.a == 255).count();
            info!(
                "{}: {}x{}, {} of {} pixels opaque, framebuffer pitch {}",
                path.display(),
                image.width(),
                image.height(),
                opaque,
                image.pixels().len(),
                fb.pitch()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}
