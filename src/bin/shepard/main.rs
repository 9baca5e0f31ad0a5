//! shepard - endless rising tone on the default output device
//!
//! Run with: cargo run -- [config.toml] [--headless]

mod app;
mod controls;

use app::Shepard;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use shepard_dsp::ToneConfig;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut headless = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--headless" => headless = true,
            _ => config_path = Some(arg),
        }
    }

    let config = match config_path {
        Some(path) => load_config(&path)?,
        None => ToneConfig::default(),
    };

    Shepard::new(config).headless(headless).run()
}

#[cfg(feature = "serde")]
fn load_config(path: &str) -> EyreResult<ToneConfig> {
    let text = std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {path}"))?;
    ToneConfig::from_toml_str(&text).wrap_err_with(|| format!("invalid config in {path}"))
}

#[cfg(not(feature = "serde"))]
fn load_config(path: &str) -> EyreResult<ToneConfig> {
    Err(color_eyre::eyre::eyre!(
        "cannot load {path}: rebuild with the `serde` feature for config files"
    ))
    .wrap_err("config files unsupported")
}
