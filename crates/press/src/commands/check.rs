//! `press check` command implementation.

use std::io::Write;

use clap::Args;
use press_render::{PreparedPost, Publisher};
use serde::Serialize;

use super::{DraftArgs, publish_settings};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub draft: DraftArgs,

    /// Minimum converted HTML length in characters (overrides config).
    #[arg(long)]
    min_html_length: Option<usize>,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

/// Machine-readable check result.
#[derive(Serialize)]
struct CheckReport<'a> {
    source: String,
    #[serde(flatten)]
    post: &'a PreparedPost,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read, or
    /// the converted post is too short.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.draft.load_config(self.min_html_length)?;
        let publisher = Publisher::new(publish_settings(&config));

        let source = self.draft.source_name();
        let markdown = self.draft.read_markdown()?;
        let post = publisher.prepare(&self.draft.draft(markdown))?;

        if self.json {
            let report = CheckReport {
                source,
                post: &post,
            };
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            stdout.write_all(b"\n")?;
            return Ok(());
        }

        print_report(&output, &source, &post, publisher.settings().min_html_length);
        Ok(())
    }
}

fn print_report(output: &Output, source: &str, post: &PreparedPost, minimum: usize) {
    output.success(&format!("{source}: ready to publish"));
    output.field("Markdown", &format!("{} chars", post.markdown_length));
    output.field(
        "HTML",
        &format!("{} chars (minimum {minimum})", post.html_length),
    );
    output.field("Code blocks", &post.code_blocks.to_string());
    output.field("Alt text", &post.alt_text);

    if post.warnings.is_empty() {
        output.info("No warnings.");
    } else {
        for warning in &post.warnings {
            output.warning(&format!("  {warning}"));
        }
    }
}
