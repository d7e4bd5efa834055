//! CLI parser
use clap::{Args, Parser};
use std::num::NonZeroU16;
use url::Url;

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_QUALITY, DEFAULT_IMAGE_SIZE,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::prompt::PromptMode;

#[derive(Args, Clone, Debug)]
/// How mandalas are requested from the image API, shared by every binary.
pub struct GenerationOptions {
    #[clap(long, default_value = DEFAULT_API_BASE, env = "MANDALA_API_BASE")]
    /// Base URL of the OpenAI-compatible API, defaults to `https://api.openai.com/v1/`.
    /// Env: MANDALA_API_BASE
    pub api_base: Url,

    #[clap(long, default_value = DEFAULT_IMAGE_MODEL, env = "MANDALA_IMAGE_MODEL")]
    /// Image model, defaults to `dall-e-3`.
    /// Env: MANDALA_IMAGE_MODEL
    pub image_model: String,

    #[clap(long, default_value = DEFAULT_IMAGE_SIZE, env = "MANDALA_IMAGE_SIZE")]
    /// Output resolution, defaults to `1024x1024`.
    /// Env: MANDALA_IMAGE_SIZE
    pub image_size: String,

    #[clap(long, default_value = DEFAULT_IMAGE_QUALITY, env = "MANDALA_IMAGE_QUALITY")]
    /// Quality tier, defaults to `standard`.
    /// Env: MANDALA_IMAGE_QUALITY
    pub image_quality: String,

    #[clap(
        long,
        default_value_t = DEFAULT_TIMEOUT_SECONDS,
        value_parser = clap::value_parser!(u64).range(1..),
        env = "MANDALA_TIMEOUT_SECS"
    )]
    /// Timeout for each outbound request in seconds, defaults to `120`.
    /// Env: MANDALA_TIMEOUT_SECS
    pub timeout_secs: u64,

    #[clap(long, value_enum, default_value_t, env = "MANDALA_PROMPT_MODE")]
    /// Prompt template, defaults to `emphatic`.
    /// Env: MANDALA_PROMPT_MODE
    pub prompt_mode: PromptMode,
}

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "MANDALA_DEBUG")]
    /// Enable debug logging. Env: MANDALA_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "MANDALA_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: MANDALA_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "MANDALA_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: MANDALA_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(flatten)]
    /// Image API settings
    pub generation: GenerationOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_openai() {
        let cli = CliOptions::try_parse_from(["mandala"]).expect("parse defaults");
        assert_eq!(cli.port.get(), 9000);
        assert_eq!(cli.generation.api_base.as_str(), DEFAULT_API_BASE);
        assert_eq!(cli.generation.image_model, "dall-e-3");
        assert_eq!(cli.generation.prompt_mode, PromptMode::Emphatic);
        assert_eq!(cli.generation.timeout_secs, DEFAULT_TIMEOUT_SECONDS);
    }

    #[test]
    fn overrides_apply() {
        let cli = CliOptions::try_parse_from([
            "mandala",
            "--prompt-mode",
            "simple",
            "--timeout-secs",
            "5",
            "--api-base",
            "http://127.0.0.1:8080/v1/",
        ])
        .expect("parse overrides");
        assert_eq!(cli.generation.prompt_mode, PromptMode::Simple);
        assert_eq!(cli.generation.timeout_secs, 5);
        assert_eq!(cli.generation.api_base.port(), Some(8080));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(CliOptions::try_parse_from(["mandala", "--timeout-secs", "0"]).is_err());
    }
}
