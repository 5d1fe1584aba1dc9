use crate::cli::GeneratorArgs;
use crate::support::{
    exit_on_error, load_config_or_exit, print_json, resolve_generators_or_exit, yes_no,
};
use gasket_kernel::{GasketBuilder, audit};

pub fn run(
    generators: GeneratorArgs,
    max_level: Option<u32>,
    tolerance: Option<f64>,
    json_output: bool,
) {
    let config = load_config_or_exit(generators.config.as_deref());
    let triple = resolve_generators_or_exit(&generators, &config);

    let mut builder = GasketBuilder::from_config(triple, &config);
    if let Some(max_level) = max_level {
        builder = builder.with_max_level(max_level);
    }
    if let Some(tolerance) = tolerance {
        builder = builder.with_tolerance(tolerance);
    }

    let report = exit_on_error(audit(&builder));
    let sound = report.is_sound();

    if json_output {
        print_json(&report);
    } else {
        println!("gasket audit --max-level {}", report.max_level);
        println!("  Circles: {}", report.circle_count);
        println!("  Tolerance: {:e}", report.tolerance);
        println!("  Max tangency residual: {:e}", report.max_residual);
        if let Some(worst) = report.worst_circle {
            println!("  Worst circle: {worst}");
        }
        println!(
            "  Max Descartes residual: {:e}",
            report.max_descartes_residual
        );
        println!("  Untangent: {}", report.untangent_count);
        println!("  Curvature monotone: {}", yes_no(report.curvature_monotone));
        println!("  Sound: {}", yes_no(sound));
    }

    if !sound {
        std::process::exit(1);
    }
}
