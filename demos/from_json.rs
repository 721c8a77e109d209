use grantc::Schema;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/schema.json".to_owned());

    let schema = Schema::from_file(&path).expect("failed to load schema");
    println!("{schema}");

    let grants = schema.compile().expect("failed to compile grants");
    let module = grants.to_module().expect("failed to render grants module");
    println!("{}:", module.path().display());
    println!("{}", module.code());
}
