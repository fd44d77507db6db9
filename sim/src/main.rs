//! 無畫面的冒險模擬器
//!
//! 以腳本玩家跑完整場冒險，事件流透過 tracing 輸出。
//! 執行：`RUST_LOG=debug cargo run -p sim -- --seed 7`

mod autoplay;

use anyhow::{Context, Result};
use cards_lib::CardLibrary;
use clap::Parser;
use std::path::PathBuf;
use tactics_lib::{GameConfig, GameManager};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sim")]
#[command(about = "Play a whole run with a scripted player", long_about = None)]
#[command(version)]
struct Cli {
    /// 冒險種子
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// 覆寫地圖層數
    #[arg(long)]
    floors: Option<usize>,

    /// 戰鬥平衡設定（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 卡牌庫（TOML），預設為內建卡牌
    #[arg(long)]
    cards: Option<PathBuf>,

    /// 單場戰鬥回合上限，超過即放棄
    #[arg(long, default_value_t = 40)]
    max_turns: u32,

    /// 造訪節點上限
    #[arg(long, default_value_t = 100)]
    max_nodes: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(floors) = cli.floors {
        config.run.floors = floors;
    }

    let library = match &cli.cards {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading cards {}", path.display()))?;
            CardLibrary::from_toml_str(&content)
                .with_context(|| format!("parsing cards {}", path.display()))?
        }
        None => CardLibrary::builtin().context("loading builtin cards")?,
    };

    let mut gm = GameManager::new(config, library);
    gm.subscribe(|event| tracing::debug!(target: "sim::events", "{event:?}"));

    let summary = autoplay::play_run(&mut gm, cli.seed, cli.max_turns, cli.max_nodes)?;
    tracing::info!(
        "run finished: status {}, floor {}, gold {}, hp {}/{}, deck {} cards, {} wins, {} defeats",
        summary.status,
        summary.floor,
        summary.gold,
        summary.hp,
        summary.max_hp,
        summary.deck_size,
        summary.victories,
        summary.defeats
    );
    Ok(())
}
