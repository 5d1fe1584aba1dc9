use crate::cli::GeneratorArgs;
use crate::support::{
    exit_on_error, load_config_or_exit, print_circle_block, print_json,
    resolve_generators_or_exit,
};
use gasket_kernel::{GasketBuilder, expected_circle_count};
use serde_json::json;
use std::time::Instant;

pub struct Args {
    pub generators: GeneratorArgs,
    pub max_level: Option<u32>,
    pub parallelism: Option<usize>,
    pub no_validate: bool,
    pub list: bool,
    pub summary_only: bool,
    pub json: bool,
}

pub fn run(args: Args) {
    let config = load_config_or_exit(args.generators.config.as_deref());
    let generators = resolve_generators_or_exit(&args.generators, &config);

    let mut builder = GasketBuilder::from_config(generators, &config);
    if let Some(max_level) = args.max_level {
        builder = builder.with_max_level(max_level);
    }
    if let Some(workers) = args.parallelism {
        builder = builder.with_parallelism(workers);
    }
    if args.no_validate {
        builder = builder.with_validation(false);
    }

    let started = Instant::now();
    let gasket = exit_on_error(builder.build());
    tracing::info!(
        circles = gasket.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "gasket generated"
    );

    let digest = gasket.digest();
    let levels = gasket.level_histogram();

    if args.json {
        let mut payload = json!({
            "max_level": gasket.max_level(),
            "circle_count": gasket.len(),
            "expected_count": expected_circle_count(gasket.max_level()),
            "levels": levels,
            "digest": digest,
            "generators": gasket.generators(),
        });
        if !args.summary_only {
            payload["circles"] = json!(gasket.circles());
        }
        print_json(&payload);
        return;
    }

    println!("gasket generate --max-level {}", gasket.max_level());
    print_circle_block("Generators", gasket.generators());
    print_circle_block("Children", gasket.children());
    println!("  Circles: {}", gasket.len());
    for (level, count) in &levels {
        println!("    level {level}: {count}");
    }
    println!("  Digest: {digest}");
    if args.list {
        print_circle_block("All circles", gasket.circles());
    }
}
