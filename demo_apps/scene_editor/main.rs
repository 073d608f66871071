//! Umbra scene editor.
//!
//! Usage: `scene_editor [config.json]` (or set `UMBRA_CONFIG`).

use umbra::app::App;
use umbra::config::EditorConfig;

fn main() -> umbra::errors::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EditorConfig::from_args()?;
    log::info!("Starting {}", config.title);
    App::new(config).run()
}
