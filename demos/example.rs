use serde::{Deserialize, Serialize};
use yamlenv::Loader;

#[derive(Debug, Default, Serialize, Deserialize)]
struct AppConfig {
    name: String,
    debug: bool,
    database: DatabaseSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DatabaseSection {
    host: String,
    port: u16,
    name: String,
}

fn main() -> Result<(), yamlenv::Error> {
    // Fill an existing value in place
    let mut config = AppConfig::default();
    let environment = Loader::new().load_file("demos/config.yml", &mut config)?;
    println!("[{environment}] {} (debug={})", config.name, config.debug);

    // Or bind a fresh value together with its environment
    let ctx = Loader::new().resolve_file::<AppConfig>("demos/config.yml")?;
    let db = &ctx.config().database;
    println!("[{}] database {}:{}/{}", ctx.environment(), db.host, db.port, db.name);

    Ok(())
}
