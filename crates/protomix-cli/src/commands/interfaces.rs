use crate::support::{exit_with, load_config_or_exit, print_json};

pub fn run(config_path: String, json_output: bool) {
    let config = load_config_or_exit(&config_path);
    let interfaces = config
        .declared_interfaces()
        .unwrap_or_else(|e| exit_with(e, 1));

    if json_output {
        print_json(&interfaces, false);
        return;
    }

    println!("protomix interfaces");
    if interfaces.is_empty() {
        println!("  (none)");
    }
    for interface in &interfaces {
        let members: Vec<String> = interface
            .properties()
            .map(|(property, tag)| format!("{property}: {tag}"))
            .collect();
        println!("  {} {{ {} }}", interface.name(), members.join(", "));
    }
}
