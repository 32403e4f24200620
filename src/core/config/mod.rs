pub mod config;

pub use config::EffectConfig;
