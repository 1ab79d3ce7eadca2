// ==========================================
// MFA→LCI 过程图构建 - 批处理主入口
// ==========================================
// 用法:
//   mfa-lci-builder --config mfa_lci_config.json [--output-dir out/] [--dry-run]
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use mfa_lci_builder::config::{BuilderConfig, CONFIG_PATH_ENV, OUTPUT_DIR_ENV};
use mfa_lci_builder::engine::{BatchOrchestrator, ReferenceResolver, ResolutionCache};
use mfa_lci_builder::exporter::GraphExport;
use mfa_lci_builder::importer::{load_price_table, FileInputSource};
use mfa_lci_builder::logging::{self, LogFormat};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "mfa-lci-builder")]
#[command(about = "Build LCI process graphs from MFA output tables", long_about = None)]
#[command(version)]
struct Args {
    /// 批处理配置文件 (JSON)
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// 输出目录（覆盖配置文件）
    #[arg(short, long, env = OUTPUT_DIR_ENV)]
    output_dir: Option<PathBuf>,

    /// 只构建与校验，不写出结果
    #[arg(long)]
    dry_run: bool,

    /// JSON 格式日志
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_with_format(if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    info!("==================================================");
    info!("{} {}", mfa_lci_builder::APP_NAME, mfa_lci_builder::VERSION);
    info!("==================================================");

    let config_path = BuilderConfig::resolve_path(args.config.as_deref());
    let mut config = BuilderConfig::load(&config_path)
        .with_context(|| format!("无法加载配置 {}", config_path.display()))?;
    if let Some(dir) = args.output_dir {
        config.output_dir = Some(dir);
    }
    config.validate()?;
    info!(config = %config_path.display(), input_dir = %config.input_dir.display(), "配置已加载");

    let stores = config
        .catalogs
        .iter()
        .map(|source| {
            source
                .load()
                .with_context(|| format!("无法加载外部目录库 {}", source.path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let resolver = ReferenceResolver::new(stores, ResolutionCache::new(config.cache_capacity));
    let mut orchestrator = BatchOrchestrator::new(
        FileInputSource::new(&config.input_dir),
        config.graph_builder(),
        resolver,
        config.scenario_resolver()?,
    );

    let result = orchestrator.run(&config.batch_request())?;

    if let Some(price_path) = &config.price_table {
        let prices = load_price_table(price_path)
            .with_context(|| format!("无法加载价格表 {}", price_path.display()))?;
        let missing = result.materials_without_price(&prices);
        if !missing.is_empty() {
            warn!(materials = ?missing, "以下回收材料缺少价格，下游分配将无法处理");
        }
    }

    if args.dry_run {
        info!(
            combinations = result.lcis.len(),
            processes = result.graph.len(),
            "dry-run: 构建完成，未写出结果"
        );
        return Ok(());
    }

    let export = GraphExport::from_batch(&result, chrono::Local::now());
    let path = export.write_to_dir(&config.resolved_output_dir())?;
    info!(path = %path.display(), "完成");
    Ok(())
}
