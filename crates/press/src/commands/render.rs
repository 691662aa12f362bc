//! `press render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use press_render::{PublishSettings, Publisher};

use super::{DraftArgs, publish_settings};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    pub draft: DraftArgs,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the input or output cannot
    /// be accessed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.draft.load_config(None)?;
        let settings = PublishSettings {
            // Rendering never rejects a post; length is checked by `press check`.
            min_html_length: 0,
            ..publish_settings(&config)
        };
        if settings.site_base.is_none() {
            tracing::info!("No site base URL configured, internal link disabled");
        }

        let markdown = self.draft.read_markdown()?;
        let draft = self.draft.draft(markdown);
        let post = Publisher::new(settings).prepare(&draft)?;

        for warning in &post.warnings {
            output.warning(&format!("{}: {warning}", self.draft.source_name()));
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, format!("{}\n", post.html))?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(post.html.as_bytes())?;
                stdout.write_all(b"\n")?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}
