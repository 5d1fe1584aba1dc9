use crate::support::print_json;
use gasket_kernel::Preset;
use serde_json::json;

pub fn run(json_output: bool) {
    if json_output {
        let presets: Vec<_> = Preset::ALL
            .iter()
            .map(|preset| {
                json!({
                    "name": preset.name(),
                    "description": preset.description(),
                    "generators": preset.generators().ok(),
                })
            })
            .collect();
        print_json(&json!({ "presets": presets }));
        return;
    }

    println!("gasket presets");
    for preset in Preset::ALL {
        println!("  {:<14} {}", preset.name(), preset.description());
        if let Ok(generators) = preset.generators() {
            for circle in generators {
                println!("    - {circle}");
            }
        }
    }
}
