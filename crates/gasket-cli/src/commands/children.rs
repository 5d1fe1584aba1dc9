use crate::cli::GeneratorArgs;
use crate::support::{
    exit_on_error, load_config_or_exit, print_circle_block, print_json,
    resolve_generators_or_exit, yes_no,
};
use gasket_kernel::descartes::complex_descartes;
use gasket_kernel::tangency::{relative_residual, validate_generators};
use serde_json::json;

pub fn run(generators: GeneratorArgs, json_output: bool) {
    let config = load_config_or_exit(generators.config.as_deref());
    let [a1, a2, a3] = resolve_generators_or_exit(&generators, &config);
    if config.validate {
        exit_on_error(validate_generators(&[a1, a2, a3], config.tolerance));
    }

    let (outer, inner) = exit_on_error(complex_descartes(&a1, &a2, &a3));
    let residual = [outer, inner]
        .iter()
        .flat_map(|child| [a1, a2, a3].map(|a| relative_residual(child, &a)))
        .fold(0.0_f64, f64::max);
    let tangent = residual <= config.tolerance;

    if json_output {
        print_json(&json!({
            "generators": [a1, a2, a3],
            "children": [outer, inner],
            "max_residual": residual,
            "tangent": tangent,
        }));
        return;
    }

    println!("gasket children");
    print_circle_block("Generators", &[a1, a2, a3]);
    print_circle_block("Children", &[outer, inner]);
    println!("  Max residual: {residual:e}");
    println!("  Tangent: {}", yes_no(tangent));
}
