use tri_ngin::config::ViewerConfig;

/// Usage: `cargo run --example viewer [config.json]`
fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::from_json(&std::fs::read_to_string(&path)?)?,
        None => ViewerConfig::default(),
    };
    tri_ngin::flow::run(config)
}
