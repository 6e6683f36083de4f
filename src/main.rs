use env_logger::Env;
use simdeck::{AppConfig, SimDeckApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let app = SimDeckApp::new(AppConfig::default())?;
    app.run()
}
