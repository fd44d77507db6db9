//! encounter.rs：
//! - 由戰鬥描述與節點種子決定一場戰鬥的佈局：英雄出生點、敵人組成、障礙物。
//! - 同一個種子永遠產生同一個佈局。
//! - 障礙物只有在英雄仍能走到每個敵人時才保留。
use crate::*;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use run_lib::{EncounterDescriptor, Seed};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UnitSpawn {
    pub kind: UnitKind,
    pub pos: Pos,
    pub hp: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EncounterLayout {
    pub width: usize,
    pub height: usize,
    pub hero_spawn: Pos,
    pub enemies: Vec<UnitSpawn>,
    /// 敵人以外的單位，例如預先放置的砲塔或可破壞的石塊
    #[serde(default)]
    pub extra_units: Vec<UnitSpawn>,
    #[serde(default)]
    pub obstacles: Vec<(Pos, ObstacleKind)>,
}

impl EncounterLayout {
    /// 只含障礙物的棋盤幾何
    pub fn grid(&self, config: &GameConfig) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        for (pos, kind) in &self.obstacles {
            grid.place_obstacle(*pos, config.obstacle(*kind));
        }
        grid
    }

    /// 英雄能否走到每個敵人旁邊
    pub fn is_connected(&self, config: &GameConfig) -> bool {
        let mut board = Board::new(self.grid(config));
        let spawns = self.enemies.iter().chain(self.extra_units.iter());
        for spawn in spawns {
            if board.add_unit(Unit::new(spawn.kind, spawn.hp), spawn.pos).is_err() {
                return false;
            }
        }
        if board
            .add_unit(Unit::new(UnitKind::Player, 1), self.hero_spawn)
            .is_err()
        {
            return false;
        }
        self.enemies
            .iter()
            .all(|enemy| find_path(&board, self.hero_spawn, enemy.pos).is_some())
    }
}

pub fn generate_layout(
    descriptor: &EncounterDescriptor,
    config: &GameConfig,
    seed: Seed,
) -> Result<EncounterLayout> {
    let func = "generate_layout";

    let width = config.grid.width;
    let height = config.grid.height;
    if width < 2 || height == 0 {
        return Err(Error::InvalidGrid {
            func,
            width,
            height,
        });
    }
    let mut rng = StdRng::seed_from_u64(seed);

    let hero_spawn = Pos::new(0, rng.random_range(0..height));

    let mut kinds = Vec::new();
    if descriptor.is_boss() {
        kinds.push(UnitKind::Boss);
        kinds.extend(regular_kinds(config.encounter.boss_escorts));
    } else {
        let count = (1 + descriptor.floor / 2).min((height / 2).max(1));
        kinds.extend(regular_kinds(count));
    }
    kinds.truncate(height);

    let mut rows: Vec<usize> = (0..height).collect();
    rows.shuffle(&mut rng);
    let enemy_column = width - 1;
    let enemies = kinds
        .into_iter()
        .zip(rows)
        .map(|(kind, y)| UnitSpawn {
            kind,
            pos: Pos::new(enemy_column, y),
            hp: config.enemy_hp(kind, descriptor.floor),
        })
        .collect();

    let mut layout = EncounterLayout {
        width,
        height,
        hero_spawn,
        enemies,
        extra_units: Vec::new(),
        obstacles: Vec::new(),
    };

    let min = config.encounter.obstacles_min;
    let max = config.encounter.obstacles_max.max(min);
    let wanted = rng.random_range(min..=max);
    let mut cells: Vec<Pos> = (1..enemy_column)
        .flat_map(|x| (0..height).map(move |y| Pos::new(x, y)))
        .collect();
    cells.shuffle(&mut rng);
    for pos in cells {
        if layout.obstacles.len() >= wanted {
            break;
        }
        layout.obstacles.push((pos, ObstacleKind::Rock));
        if !layout.is_connected(config) {
            layout.obstacles.pop();
        }
    }

    tracing::debug!(
        "layout for {}: hero {:?}, {} enemies, {} obstacles",
        descriptor.node_id,
        layout.hero_spawn,
        layout.enemies.len(),
        layout.obstacles.len()
    );
    Ok(layout)
}

/// 一般敵人近戰、遠程交替
fn regular_kinds(count: usize) -> impl Iterator<Item = UnitKind> {
    (0..count).map(|i| {
        if i % 2 == 0 {
            UnitKind::Melee
        } else {
            UnitKind::Ranged
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use run_lib::NodeType;

    fn descriptor(node_type: NodeType, floor: usize) -> EncounterDescriptor {
        EncounterDescriptor {
            node_id: format!("{floor}-0"),
            node_type,
            floor,
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let config = GameConfig::default();
        let d = descriptor(NodeType::Fight, 2);
        let a = generate_layout(&d, &config, 7).unwrap();
        let b = generate_layout(&d, &config, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_enemy_composition() {
        let config = GameConfig::default();
        let test_data = [
            // (node type, floor, kinds)
            (NodeType::Fight, 0, vec![UnitKind::Melee]),
            (NodeType::Fight, 2, vec![UnitKind::Melee, UnitKind::Ranged]),
            (
                NodeType::Fight,
                4,
                vec![UnitKind::Melee, UnitKind::Ranged, UnitKind::Melee],
            ),
            (
                NodeType::Boss,
                8,
                vec![UnitKind::Boss, UnitKind::Melee, UnitKind::Ranged],
            ),
        ];
        for (node_type, floor, kinds) in test_data {
            let d = descriptor(node_type, floor);
            let layout = generate_layout(&d, &config, 11).unwrap();
            let got: Vec<UnitKind> = layout.enemies.iter().map(|e| e.kind).collect();
            assert_eq!(got, kinds, "{node_type} floor {floor}");
            for enemy in &layout.enemies {
                assert_eq!(enemy.pos.x, config.grid.width - 1);
                assert_eq!(enemy.hp, config.enemy_hp(enemy.kind, floor));
            }
        }
    }

    #[test]
    fn test_enemy_count_capped_by_height() {
        let mut config = GameConfig::default();
        config.grid.height = 2;
        let layout = generate_layout(&descriptor(NodeType::Fight, 8), &config, 3).unwrap();
        assert_eq!(layout.enemies.len(), 1);
    }

    #[test]
    fn test_layout_keeps_paths_open() {
        let config = GameConfig::default();
        for seed in 0..20 {
            let layout = generate_layout(&descriptor(NodeType::Fight, 4), &config, seed).unwrap();
            assert_eq!(layout.hero_spawn.x, 0);
            assert!(layout.is_connected(&config), "seed {seed}");
            assert!(layout.obstacles.len() <= config.encounter.obstacles_max);
            for (pos, _) in &layout.obstacles {
                assert!(pos.x >= 1 && pos.x < config.grid.width - 1, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_invalid_grid() {
        let mut config = GameConfig::default();
        config.grid.width = 1;
        let err = generate_layout(&descriptor(NodeType::Fight, 0), &config, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidGrid { width: 1, .. }));
    }
}
