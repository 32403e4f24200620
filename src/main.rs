use bevy::prelude::*;
use clap::Parser;

use glyph_shatter::{EffectConfig, EffectPlugin};

#[derive(Parser, Debug)]
#[command(name = "glyph_shatter", about = "Interactive shattered-text physics effect")]
struct Cli {
    /// RON config path.
    #[arg(long, default_value = "assets/config/effect.ron")]
    config: String,
    /// Override the displayed text.
    #[arg(long)]
    text: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    // Load configuration (fall back to defaults if missing); logging is not
    // up yet, so report through stderr.
    let (mut cfg, load_err) = EffectConfig::load_or_default(&cli.config);
    if let Some(e) = load_err {
        eprintln!("config '{}' not used ({e}); running with defaults", cli.config);
    }
    if let Some(text) = cli.text {
        cfg.text.content = text;
    }
    for warning in cfg.validate() {
        eprintln!("config warning: {warning}");
    }

    App::new()
        .insert_resource(cfg.clone())
        .add_plugins(
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: cfg.window.title.clone(),
                    resolution: (cfg.window.width, cfg.window.height).into(),
                    resizable: true,
                    ..default()
                }),
                ..default()
            }),
        )
        .add_plugins(EffectPlugin)
        .run();
}
