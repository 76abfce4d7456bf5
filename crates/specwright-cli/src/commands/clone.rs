//! `specwright clone`: build a draft spec from an existing container.

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use specwright_generate::{NameKind, check_name, config_to_spec};
use specwright_runtime::Runtime;
use specwright_spec::DraftSpec;
use specwright_spec::infra::InfraInherit;

use crate::output;

/// Arguments for the `clone` command.
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Name or ID of the container to clone.
    pub container: String,

    /// Name of the clone; derived from the source name when omitted.
    #[arg(long)]
    pub name: Option<String>,

    /// Image for the clone instead of the source's image.
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Serialize)]
struct CloneOutput {
    source: String,
    spec: DraftSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    infra: Option<InfraInherit>,
}

/// Executes the `clone` command.
///
/// # Errors
///
/// Returns an error if the container or one of its networks is unknown.
pub fn execute(runtime: &Runtime, args: CloneArgs) -> anyhow::Result<()> {
    let overrides = args.image.map(DraftSpec::from_image);
    let cloned = config_to_spec(runtime, overrides, &args.container)
        .with_context(|| format!("failed to clone container {}", args.container))?;

    let mut spec = cloned.spec;
    let source = cloned.container.name().to_string();
    spec.name = Some(
        args.name
            .unwrap_or_else(|| check_name(runtime, &source, NameKind::Container)),
    );
    tracing::info!(source = %source, clone = spec.name.as_deref().unwrap_or_default(), "clone prepared");

    output::print_json(&CloneOutput {
        source,
        spec,
        infra: cloned.infra,
    })
}
