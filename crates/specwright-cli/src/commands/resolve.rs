//! `specwright resolve`: complete a draft spec.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use specwright_runtime::Runtime;
use specwright_spec::DraftSpec;

use crate::output;

/// Arguments for the `resolve` command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Draft spec as JSON; `-` reads standard input.
    #[arg(default_value = "-")]
    pub file: PathBuf,

    /// Image to use when the draft names none.
    #[arg(long)]
    pub image: Option<String>,
}

/// Executes the `resolve` command.
///
/// # Errors
///
/// Returns an error if the draft cannot be read or resolution fails.
pub fn execute(runtime: &Runtime, args: ResolveArgs) -> anyhow::Result<()> {
    let mut draft = read_draft(&args.file)?;
    if let Some(image) = args.image {
        if !draft.uses_image() {
            draft.image = Some(image);
        }
    }

    let warnings = specwright_generate::complete_spec(runtime, &mut draft)
        .context("failed to resolve spec")?;
    output::print_warnings(&warnings);
    output::print_json(&draft)
}

fn read_draft(file: &Path) -> anyhow::Result<DraftSpec> {
    let content = if file.as_os_str() == "-" {
        let mut buf = String::new();
        let _ = std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read draft from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?
    };
    serde_json::from_str(&content).context("draft is not valid JSON")
}
