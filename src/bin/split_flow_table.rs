// 流表拆分工具: 按 Layer 1 + Stock/Flow ID 把完整 rm_output.csv 拆成若干子表
//
// 用法:
//   split-flow-table --input data/rm_output.csv --output-dir data/split --definitions splits.json
//
// splits.json: [{"name": "LIB", "layer1_values": ["battLiNMC"], "stockflow_ids": ["F1_2"]}, ...]

use anyhow::{Context, Result};
use clap::Parser;
use mfa_lci_builder::importer::{write_splits, FlowTableLoader, SplitDefinition};
use mfa_lci_builder::logging;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "split-flow-table")]
#[command(about = "Split an MFA flow table into per-route tables", long_about = None)]
struct Args {
    /// 完整流表 (CSV)
    #[arg(short, long)]
    input: PathBuf,

    /// 输出目录
    #[arg(short, long)]
    output_dir: PathBuf,

    /// 拆分定义 (JSON 列表)
    #[arg(short, long)]
    definitions: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init();

    let definitions_text = fs::read_to_string(&args.definitions)
        .with_context(|| format!("无法读取拆分定义 {}", args.definitions.display()))?;
    let definitions: Vec<SplitDefinition> = serde_json::from_str(&definitions_text)
        .with_context(|| format!("拆分定义格式错误 {}", args.definitions.display()))?;

    let table = FlowTableLoader.load(&args.input)?;
    info!(input = %args.input.display(), rows = table.len(), "流表已加载");

    for (path, rows) in write_splits(&definitions, &table, &args.output_dir)? {
        println!("{}\t{}", path.display(), rows);
    }
    Ok(())
}
