//! Parameter listing command.

use clap::Args;
use peq_core::{ParamDescriptor, ParamScale};
use peq_engine::EqParam;
use serde::Serialize;

#[derive(Args)]
pub struct ParamsArgs {
    /// Print as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// One parameter as printed by `peq params --json`.
#[derive(Debug, Serialize)]
pub struct ParamRow {
    pub index: usize,
    pub id: u32,
    pub string_id: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub step: f32,
    pub logarithmic: bool,
}

impl ParamRow {
    fn new(index: usize, desc: &ParamDescriptor) -> Self {
        Self {
            index,
            id: desc.id.0,
            string_id: desc.string_id,
            name: desc.name,
            unit: desc.unit.suffix().trim(),
            min: desc.min,
            max: desc.max,
            default: desc.default,
            step: desc.step,
            logarithmic: desc.scale == ParamScale::Logarithmic,
        }
    }
}

/// Rows for every parameter in layout order.
pub fn rows() -> Vec<ParamRow> {
    EqParam::ALL
        .iter()
        .map(|p| ParamRow::new(p.index(), &p.descriptor()))
        .collect()
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let rows = rows();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Parameters");
    println!("==========");
    println!();
    println!(
        "  {:>3}  {:>4}  {:12}  {:18}  {:>10}  {:>18}",
        "#", "Id", "Key", "Name", "Default", "Range"
    );
    println!(
        "  {:>3}  {:>4}  {:12}  {:18}  {:>10}  {:>18}",
        "-", "--", "---", "----", "-------", "-----"
    );

    for row in &rows {
        let range = format!("{} .. {} {}", row.min, row.max, row.unit);
        println!(
            "  {:>3}  {:>4}  {:12}  {:18}  {:>10}  {:>18}",
            row.index, row.id, row.string_id, row.name, row.default, range
        );
    }

    println!();
    println!("Example usage:");
    println!();
    println!("  peq process in.wav out.wav --lo-mid-gain -3 --hp-freq 80");
    println!("  peq response --param hi_gain=4 --json");

    Ok(())
}
