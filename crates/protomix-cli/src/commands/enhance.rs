use crate::support::{exit_with, print_json, read_json_or_exit};
use protomix_kernel::{BACK_REFERENCE, Namespace, Object, Value};
use serde_json::Value as Json;

fn object_or_exit(path: &str) -> Object {
    match Value::from_json(&read_json_or_exit(path)) {
        Value::Object(object) => object,
        _ => exit_with(format!("{path} must contain a JSON object"), 1),
    }
}

pub fn run(template_path: String, overlay_path: String, compact: bool) {
    let template = object_or_exit(&template_path);
    let overlay = object_or_exit(&overlay_path);

    let enhanced = Namespace::new()
        .enhance(&template, &overlay, None)
        .unwrap_or_else(|e| exit_with(e, 1));

    let mut rendered = Value::from(enhanced).to_json();
    // The back-reference is the template itself; printing it would repeat
    // the input.
    if let Json::Object(map) = &mut rendered {
        map.shift_remove(BACK_REFERENCE);
    }
    print_json(&rendered, compact);
}
