use crate::support::{exit_with, load_config_or_exit, print_json, read_json_or_exit};
use protomix_kernel::Value;
use serde_json::json;

pub fn run(object_path: String, interface_name: String, config_path: String, json_output: bool) {
    let config = load_config_or_exit(&config_path);
    let classifier = config.classifier().unwrap_or_else(|e| exit_with(e, 1));
    let interface = config
        .interface(&interface_name)
        .unwrap_or_else(|e| exit_with(e, 1));
    let value = Value::from_json(&read_json_or_exit(&object_path));

    match interface.matches_with(&classifier, &value) {
        Ok(()) => {
            if json_output {
                print_json(
                    &json!({ "interface": interface.name(), "matches": true }),
                    false,
                );
                return;
            }
            println!("protomix check");
            println!("  Interface: {}", interface.name());
            println!("  Properties: {}", interface.len());
            println!("  Result: match");
        }
        Err(err) => {
            tracing::debug!(interface = interface.name(), error = %err, "check failed");
            if json_output {
                print_json(
                    &json!({
                        "interface": interface.name(),
                        "matches": false,
                        "error": { "kind": err.kind(), "message": err.to_string() },
                    }),
                    false,
                );
                std::process::exit(1);
            }
            exit_with(err, 1);
        }
    }
}
