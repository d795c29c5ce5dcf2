use super::read_file;
use crate::argparse::{ApplyArgs, ConvertArgs, PayloadArgs, WireForm};
use anyhow::{Context, Result};
use tm_filter::{
    apply_all, parse_canonical, parse_script, render_tree, serialize_flat, serialize_tree,
    FilterTree, SearchRequest, StrategyRegistry, DEFAULT_PAGE,
};
use tm_search::Config;
use tracing::info;

pub fn handle_render_command(args: PayloadArgs, registry: &StrategyRegistry) -> Result<()> {
    println!("{}", render_payload(&read_file(&args.file)?, registry)?);
    Ok(())
}

pub fn handle_convert_command(args: ConvertArgs) -> Result<()> {
    println!("{}", convert_payload(&read_file(&args.file)?, args.to)?);
    Ok(())
}

pub fn handle_apply_command(
    args: ApplyArgs,
    registry: &StrategyRegistry,
    config: &Config,
) -> Result<()> {
    let start = args.start.as_deref().map(read_file).transpose()?;
    let script = read_file(&args.script)?;
    println!(
        "{}",
        apply_script(&script, start.as_deref(), registry, config.search.per_page)?
    );
    Ok(())
}

pub(crate) fn render_payload(payload: &str, registry: &StrategyRegistry) -> Result<String> {
    let request = parse_canonical(payload).context("Invalid query payload")?;
    Ok(render_tree(&registry.normalize(&request.filter_tree)))
}

pub(crate) fn convert_payload(payload: &str, to: WireForm) -> Result<String> {
    let request = parse_canonical(payload).context("Invalid query payload")?;
    let out = match to {
        WireForm::Nested => serialize_tree(&request)?,
        WireForm::Flat => {
            let flat = request
                .to_flat()
                .context("Query has nesting the flat form cannot express")?;
            serialize_flat(&flat)?
        }
    };
    Ok(out)
}

pub(crate) fn apply_script(
    script: &str,
    start: Option<&str>,
    registry: &StrategyRegistry,
    per_page: u32,
) -> Result<String> {
    let mut request = match start {
        Some(payload) => parse_canonical(payload).context("Invalid start payload")?,
        None => SearchRequest::new(FilterTree::new(), DEFAULT_PAGE, per_page),
    };
    let commands = parse_script(script).context("Invalid edit script")?;
    let applied = apply_all(&mut request.filter_tree, registry, &commands)
        .context("Edit script failed")?;
    info!(
        "Applied {} of {} edits: {}",
        applied,
        commands.len(),
        render_tree(&request.filter_tree)
    );
    Ok(serialize_tree(&request)?)
}
