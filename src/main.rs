//! PawStars 命令行入口
//!
//! 只做参数解析、数据载入和 JSON 输出，分析逻辑全部在 `pawstars::core`。

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pawstars::core::analyzer::PetAnalyzer;
use pawstars::core::context::{shared_table, AnalysisContext};
use pawstars::core::error::{AnalysisError, ErrorKind};
use pawstars::core::models::{AppConfig, PetProfile, PetRef};
use pawstars::storage::config::ConfigManager;
use pawstars::storage::database::CalendarDatabase;
use pawstars::storage::dataset::{load_rows_from, load_table, save_json, DatasetFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_INVALID_INPUT: u8 = 2;
const EXIT_NOT_FOUND: u8 = 3;
const EXIT_INTERNAL: u8 = 70;

#[derive(Parser)]
#[command(author, version, about = "万岁历三柱宠物分析", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径
    #[arg(short, long, global = true, env = "PAWSTARS_CONFIG")]
    config: Option<PathBuf>,

    /// 万岁历数据路径，覆盖配置文件
    #[arg(short, long, global = true, env = "PAWSTARS_DATASET")]
    dataset: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 转换万岁历数据集：CSV / JSON / SQLite → SQLite 或 JSON
    Import {
        /// 输入数据集
        input: PathBuf,
        /// 输出路径（.db / .sqlite / .json）
        output: PathBuf,
    },

    /// 显示当前配置
    Config {
        /// 重置为默认配置
        #[arg(long)]
        reset: bool,
    },

    #[command(flatten)]
    Query(QueryCommand),
}

/// 需要万岁历数据表的命令
#[derive(Subcommand)]
enum QueryCommand {
    /// 查询某天的三柱
    Pillars {
        /// 日期 (YYYY-MM-DD)
        date: String,
    },

    /// 数据集覆盖范围与状态
    Range,

    /// 按干支片段搜索日期
    Search {
        /// 例如 "甲申日"
        pattern: String,
    },

    /// 登记并分析宠物
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        breed: String,
        /// male / female
        #[arg(long)]
        gender: String,
        /// 出生日期 (YYYY-MM-DD)
        #[arg(long)]
        birth_date: String,
    },

    /// 两只宠物的五行궁합
    Compatibility {
        #[arg(long)]
        name1: String,
        #[arg(long)]
        birth_date1: String,
        #[arg(long)]
        name2: String,
        #[arg(long)]
        birth_date2: String,
    },

    /// 每日运势
    Fortune {
        #[arg(long)]
        name: String,
        #[arg(long)]
        birth_date: String,
        /// 目标日期，默认今天
        #[arg(long)]
        date: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(config_path: Option<PathBuf>, dataset: Option<PathBuf>) -> Result<AppConfig> {
    let path = config_path.unwrap_or_else(ConfigManager::default_path);
    let mut config = ConfigManager::new(path).load()?;
    if dataset.is_some() {
        config.dataset_path = dataset;
    }
    Ok(config)
}

fn build_analyzer(config: &AppConfig) -> Result<PetAnalyzer> {
    let table = shared_table(|| load_table(config))?;
    let context = AnalysisContext::new(table)
        .with_policy(config.birth_policy)
        .with_default_breed(config.default_breed.clone());
    Ok(PetAnalyzer::new(context))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn import_dataset(input: &Path, output: &Path) -> Result<()> {
    let rows = load_rows_from(input)?;

    let total = match DatasetFormat::from_path(output) {
        Some(DatasetFormat::Json) => {
            save_json(output, &rows)?;
            rows.len()
        }
        Some(DatasetFormat::Sqlite) => {
            let mut db = CalendarDatabase::open(output)
                .with_context(|| format!("无法打开数据库: {}", output.display()))?;
            db.import(&rows)?;
            db.count()?
        }
        _ => bail!("不支持的输出格式: {}", output.display()),
    };

    print_json(&serde_json::json!({
        "imported": rows.len(),
        "total": total,
    }))
}

fn analyze(config: &AppConfig, command: QueryCommand) -> Result<()> {
    let analyzer = build_analyzer(config)?;

    match command {
        QueryCommand::Pillars { date } => print_json(&analyzer.lookup_pillars(&date)?),
        QueryCommand::Range => print_json(&analyzer.status()),
        QueryCommand::Search { pattern } => {
            let dates: Vec<String> = analyzer
                .search_by_pattern(&pattern)
                .iter()
                .map(|d| d.to_string())
                .collect();
            print_json(&dates)
        }
        QueryCommand::Register {
            name,
            breed,
            gender,
            birth_date,
        } => {
            let profile = PetProfile::new(&name, &breed, &gender, &birth_date);
            print_json(&analyzer.analyze(&profile)?)
        }
        QueryCommand::Compatibility {
            name1,
            birth_date1,
            name2,
            birth_date2,
        } => {
            let report = analyzer.compatibility(
                &PetRef::new(&name1, &birth_date1),
                &PetRef::new(&name2, &birth_date2),
            )?;
            print_json(&report)
        }
        QueryCommand::Fortune {
            name,
            birth_date,
            date,
        } => {
            let pet = PetRef::new(&name, &birth_date);
            print_json(&analyzer.daily_fortune(&pet, date.as_deref())?)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Import { input, output } => import_dataset(&input, &output),
        Commands::Config { reset } => {
            let manager = ConfigManager::new(cli.config.unwrap_or_else(ConfigManager::default_path));
            let config = if reset { manager.reset()? } else { manager.load()? };
            print_json(&serde_json::json!({
                "path": manager.path(),
                "config": config,
            }))
        }
        Commands::Query(command) => {
            let config = load_config(cli.config, cli.dataset)?;
            analyze(&config, command)
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<AnalysisError>().map(AnalysisError::kind) {
        Some(ErrorKind::InvalidInput) => EXIT_INVALID_INPUT,
        Some(ErrorKind::NotFound) => EXIT_NOT_FOUND,
        _ => EXIT_INTERNAL,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::debug!("启动 PawStars");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = exit_code(&e);
            if code == EXIT_INTERNAL {
                tracing::error!("内部错误: {:#}", e);
            }
            eprintln!("错误: {:#}", e);
            ExitCode::from(code)
        }
    }
}
