//! 測試輔助：load_from_ascii 與事件記錄器
//!
//! 用 ASCII art 定義戰鬥佈局，取代手寫座標。
#![allow(dead_code)]

use cards_lib::CardLibrary;
use run_lib::{EncounterDescriptor, NodeType};
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use tactics_lib::*;

pub const TURRET_HP: i32 = 10;
pub const NEUTRAL_HP: i32 = 5;

/// 從 ASCII 格式載入戰鬥佈局
///
/// 每行用空格分隔的符號：
/// - `.` = 空格
/// - `#` = 石塊障礙物
/// - `P` = 英雄出生點
/// - `M` / `R` / `B` = 近戰 / 遠程 / Boss 敵人（生命取預設設定的第 0 層數值）
/// - `T` = 砲塔，`N` = 中立的可破壞障礙單位
/// - 其他符號只記錄位置
///
/// 返回：(佈局, 標記映射)
///
/// 例如：
/// ```text
/// P . .
/// . # M
/// ```
pub fn load_from_ascii(ascii: &str) -> (EncounterLayout, HashMap<String, Vec<Pos>>) {
    let config = GameConfig::default();
    let lines: Vec<&str> = ascii
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    assert!(!lines.is_empty(), "棋盤為空");

    let width = lines[0].split_whitespace().count();
    let height = lines.len();
    let mut layout = EncounterLayout {
        width,
        height,
        hero_spawn: Pos::new(0, 0),
        enemies: Vec::new(),
        extra_units: Vec::new(),
        obstacles: Vec::new(),
    };
    let mut markers: HashMap<String, Vec<Pos>> = HashMap::new();

    for (y, line) in lines.iter().enumerate() {
        for (x, cell) in line.split_whitespace().enumerate() {
            let pos = Pos::new(x, y);
            match cell {
                "." => continue,
                "#" => layout.obstacles.push((pos, ObstacleKind::Rock)),
                "P" => layout.hero_spawn = pos,
                "M" | "R" | "B" => {
                    let kind = match cell {
                        "M" => UnitKind::Melee,
                        "R" => UnitKind::Ranged,
                        _ => UnitKind::Boss,
                    };
                    layout.enemies.push(UnitSpawn {
                        kind,
                        pos,
                        hp: config.enemy_hp(kind, 0),
                    });
                }
                "T" => layout.extra_units.push(UnitSpawn {
                    kind: UnitKind::Turret,
                    pos,
                    hp: TURRET_HP,
                }),
                "N" => layout.extra_units.push(UnitSpawn {
                    kind: UnitKind::Obstacle,
                    pos,
                    hp: NEUTRAL_HP,
                }),
                _ => {}
            }
            markers.entry(cell.to_string()).or_default().push(pos);
        }
    }
    (layout, markers)
}

/// 直接由佈局建出棋盤，不經過 GameManager
pub fn build_board(layout: &EncounterLayout) -> Board {
    let config = GameConfig::default();
    let mut board = Board::new(layout.grid(&config));
    board
        .add_unit(Unit::new(UnitKind::Player, 30), layout.hero_spawn)
        .unwrap();
    for spawn in layout.enemies.iter().chain(layout.extra_units.iter()) {
        board
            .add_unit(Unit::new(spawn.kind, spawn.hp), spawn.pos)
            .unwrap();
    }
    board
}

pub fn fight(node_id: &str) -> EncounterDescriptor {
    EncounterDescriptor {
        node_id: node_id.to_string(),
        node_type: NodeType::Fight,
        floor: 0,
    }
}

/// 內建卡牌庫，但起始牌組換成指定的 key
pub fn library_with_deck(deck: &[&str]) -> CardLibrary {
    let mut library = CardLibrary::builtin().unwrap();
    library.starter_deck = deck.iter().map(|key| key.to_string()).collect();
    library
}

pub type EventLog = Rc<RefCell<Vec<GameEvent>>>;

pub fn record_events(gm: &mut GameManager) -> EventLog {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    gm.subscribe({
        let log = log.clone();
        move |event| log.borrow_mut().push(event.clone())
    });
    log
}

pub fn count_events(log: &EventLog, pred: impl Fn(&GameEvent) -> bool) -> usize {
    log.borrow().iter().filter(|event| pred(event)).count()
}

/// 不經冒險直接開始戰鬥
pub fn start_encounter(
    config: GameConfig,
    library: CardLibrary,
    ascii: &str,
) -> (GameManager, EventLog, HashMap<String, Vec<Pos>>) {
    let (layout, markers) = load_from_ascii(ascii);
    let mut gm = GameManager::new(config, library);
    let log = record_events(&mut gm);
    gm.start_encounter_with_layout(fight("test"), layout).unwrap();
    (gm, log, markers)
}

pub fn hand_index(gm: &GameManager, key: &str) -> usize {
    gm.hand()
        .iter()
        .position(|card| card.key == key)
        .unwrap_or_else(|| panic!("手牌中沒有 {key}"))
}

pub fn unit_at(gm: &GameManager, pos: Pos) -> UnitID {
    gm.board
        .unit_id_at(pos)
        .unwrap_or_else(|| panic!("{pos:?} 沒有單位"))
}
