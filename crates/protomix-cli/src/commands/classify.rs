use crate::support::{exit_with, load_config_or_exit, print_json, read_json_or_exit};
use protomix_kernel::Value;
use serde_json::json;

pub fn run(value_path: String, config_path: String, json_output: bool) {
    let config = load_config_or_exit(&config_path);
    let classifier = config.classifier().unwrap_or_else(|e| exit_with(e, 1));
    let value = Value::from_json(&read_json_or_exit(&value_path));

    let tag = classifier.classify(&value);
    if json_output {
        print_json(&json!({ "tag": tag }), false);
        return;
    }
    println!("{tag}");
}
