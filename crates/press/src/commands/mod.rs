//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod render;

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use press_config::{CliSettings, Config};
use press_render::{PostDraft, PublishSettings};

use crate::error::CliError;

pub(crate) use check::CheckArgs;
pub(crate) use render::RenderArgs;

/// Post and site options shared by every command.
#[derive(Args, Debug)]
pub(crate) struct DraftArgs {
    /// Markdown file to read (default: stdin; `-` also means stdin).
    input: Option<PathBuf>,

    /// Post title, used for the hero image alt text.
    #[arg(short, long, default_value = "")]
    title: String,

    /// SEO focus keyphrase, used for alt text and the internal link label.
    #[arg(short, long)]
    keyphrase: Option<String>,

    /// Hero image URL to insert after the first paragraph.
    #[arg(long)]
    hero_image: Option<String>,

    /// Site base URL for the internal link (overrides config).
    #[arg(long, env = "PRESS_SITE_BASE")]
    site_base: Option<String>,

    /// Internal link label when there is no keyphrase (overrides config).
    #[arg(long)]
    fallback_label: Option<String>,

    /// Path to configuration file (default: auto-discover press.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (conversion and post-processing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl DraftArgs {
    /// Load configuration with this command's overrides applied.
    fn load_config(&self, min_html_length: Option<usize>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            site_base: self.site_base.clone(),
            fallback_label: self.fallback_label.clone(),
            min_html_length,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Read the markdown source from the input file or stdin.
    fn read_markdown(&self) -> Result<String, CliError> {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(path)?),
            _ => {
                let mut markdown = String::new();
                std::io::stdin().read_to_string(&mut markdown)?;
                Ok(markdown)
            }
        }
    }

    /// Name of the input for status messages.
    fn source_name(&self) -> String {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => path.display().to_string(),
            _ => "<stdin>".to_owned(),
        }
    }

    fn draft(&self, markdown: String) -> PostDraft {
        PostDraft {
            title: self.title.clone(),
            markdown,
            keyphrase: self.keyphrase.clone(),
            hero_image: self.hero_image.clone(),
        }
    }
}

/// Publishing settings derived from loaded configuration.
fn publish_settings(config: &Config) -> PublishSettings {
    PublishSettings {
        site_base: config.site_base().map(str::to_owned),
        fallback_label: config.site.fallback_label.clone(),
        min_html_length: config.content.min_html_length,
    }
}
