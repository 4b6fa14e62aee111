//! url-tagger 命令行入口
//!
//! 运行命令：
//! url-tagger --rules rules.json https://github.com/mheap
//!
//! 环境变量 URL_TAGGER_MAX_CONTENT_SIZE 可覆盖正文提取上限（字节，或如 `5MiB`）。

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::error;
use url_tagger::{CacheConfig, RuleLoader, SettingsSource, TaggerConfig, UrlTagger};

/// 缓存后端选项
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CacheKind {
    Memory,
    File,
}

#[derive(Debug, Parser)]
#[command(name = "url-tagger", version, about = "Tag URLs with regex rules matched against the URL, its HTML and its text")]
struct Cli {
    /// 规则定义文件（JSON）
    #[arg(short, long)]
    rules: PathBuf,

    /// 仅对 URL 字符串求值，不抓取内容
    #[arg(long)]
    url_only: bool,

    /// 内容缓存后端
    #[arg(long, value_enum)]
    cache: Option<CacheKind>,

    /// 文件缓存目录
    #[arg(long, default_value = ".cache/url-tagger")]
    cache_dir: PathBuf,

    /// 以 JSON 行输出
    #[arg(long)]
    json: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    /// 待打标的 URL
    #[arg(required = true)]
    urls: Vec<String>,
}

/// 进程环境变量设置源
struct EnvSettings;

impl SettingsSource for EnvSettings {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<TaggerConfig> {
    let mut config = TaggerConfig::from_settings(&EnvSettings).context("读取环境配置失败")?;
    config.cache = cli.cache.map(|kind| match kind {
        CacheKind::Memory => CacheConfig::Memory,
        CacheKind::File => CacheConfig::File {
            dir: cli.cache_dir.clone(),
        },
    });
    Ok(config)
}

fn print_tags(url: &str, tags: &[String], json: bool) {
    if json {
        println!("{}", serde_json::json!({ "url": url, "tags": tags }));
    } else {
        println!("{}\t{}", url, tags.join(","));
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let defs = RuleLoader::load_file(&cli.rules)
        .await
        .with_context(|| format!("加载规则文件失败：{}", cli.rules.display()))?;
    let config = build_config(&cli)?;
    let tagger = UrlTagger::new(&defs, config).context("构建打标器失败")?;

    let mut all_ok = true;
    for url in &cli.urls {
        if cli.url_only {
            print_tags(url, &tagger.run_url(url), cli.json);
            continue;
        }

        match tagger.run(url).await {
            Ok(tags) => print_tags(url, &tags, cli.json),
            Err(e) => {
                error!("打标失败：{}，错误：{}", url, e);
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("错误：{:#}", e);
            ExitCode::FAILURE
        }
    }
}
