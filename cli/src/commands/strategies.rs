use crate::argparse::StrategiesArgs;
use anyhow::Result;
use strum::IntoEnumIterator;
use tabular::{Row, Table};
use tm_filter::{Section, StrategyRegistry};

pub fn handle_strategies_command(args: StrategiesArgs, registry: &StrategyRegistry) -> Result<()> {
    print!("{}", strategies_table(registry, args.section));
    Ok(())
}

/// Strategies grouped by section, in registry order within each section.
pub(crate) fn strategies_table(registry: &StrategyRegistry, section: Option<Section>) -> String {
    let sections: Vec<Section> = match section {
        Some(section) => vec![section],
        None => Section::iter().collect(),
    };

    let mut table = Table::new("{:<}  {:<}  {:<}  {:<}").with_row(Row::from_cells(
        ["ID", "Label", "Kind", "Section"].iter().cloned(),
    ));
    for section in sections {
        for def in registry.by_section(section) {
            table.add_row(
                Row::new()
                    .with_cell(&def.id)
                    .with_cell(&def.label)
                    .with_cell(def.kind)
                    .with_cell(section),
            );
        }
    }
    table.to_string()
}
