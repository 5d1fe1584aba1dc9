use crate::cli::GeneratorArgs;
use gasket_kernel::{Circle, GasketConfig, Preset};
use serde::Serialize;
use std::fmt::Display;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GASKET_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the stderr subscriber. `--log-level` beats `GASKET_LOG`; an
/// unparsable filter falls back to the default.
pub fn init_tracing(log_level: Option<&str>) {
    let filter = log_level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_ENV).ok())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn exit_on_error<T, E: Display>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn load_config_or_exit(path: Option<&str>) -> GasketConfig {
    match path {
        Some(path) => exit_on_error(GasketConfig::load(path)),
        None => GasketConfig::default(),
    }
}

pub fn parse_circle_or_exit(text: &str) -> Circle {
    text.parse().unwrap_or_else(|e| {
        eprintln!("error: invalid --circle `{text}`: {e}");
        std::process::exit(1);
    })
}

pub fn parse_preset_or_exit(name: &str) -> Preset {
    exit_on_error(name.parse::<Preset>())
}

/// Pick the generators: three `--circle` flags, then `--preset`, then
/// whatever the config file names.
pub fn resolve_generators_or_exit(args: &GeneratorArgs, config: &GasketConfig) -> [Circle; 3] {
    if !args.circles.is_empty() {
        let circles: Vec<Circle> = args
            .circles
            .iter()
            .map(|text| parse_circle_or_exit(text))
            .collect();
        return match <[Circle; 3]>::try_from(circles) {
            Ok(generators) => generators,
            Err(circles) => {
                eprintln!(
                    "error: expected exactly 3 --circle values, got {}",
                    circles.len()
                );
                std::process::exit(1);
            }
        };
    }

    if let Some(name) = args.preset.as_deref() {
        let preset = parse_preset_or_exit(name);
        return exit_on_error(preset.generators());
    }

    match exit_on_error(config.configured_generators()) {
        Some(generators) => generators,
        None => {
            eprintln!("error: no generators given; pass three --circle values, --preset, or a config naming one");
            std::process::exit(1);
        }
    }
}

pub fn print_json<T: Serialize>(payload: &T) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|err| {
        eprintln!("error: failed to render json output: {err}");
        std::process::exit(2);
    });
    println!("{rendered}");
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub fn print_circle_block(title: &str, circles: &[Circle]) {
    println!("  {title}:");
    if circles.is_empty() {
        println!("    (none)");
        return;
    }
    for circle in circles {
        println!("    - {circle}");
    }
}
