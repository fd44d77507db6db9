//! 戰鬥平衡數值，所有區段皆可在 TOML 中省略而使用預設值
use crate::*;
use run_lib::{Gold, RunConfig};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub hand: HandConfig,
    pub player: PlayerConfig,
    pub melee: EnemyProfile,
    pub ranged: EnemyProfile,
    pub boss: EnemyProfile,
    pub turret: TurretConfig,
    pub encounter: EncounterConfig,
    pub rewards: RewardConfig,
    pub combat: CombatConfig,
    pub obstacles: ObstacleRules,
    pub run: RunConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HandConfig {
    pub limit: usize,
    pub opening: usize,
    pub draw_per_turn: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_hp: i32,
    pub max_mana: i32,
    pub move_points: Steps,
}

/// 攻擊距離為 Chebyshev 的 [min_range, max_range]
/// 在 TOML 中覆寫時必須寫完整的區段
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EnemyProfile {
    pub damage: i32,
    pub move_points: Steps,
    pub min_range: usize,
    pub max_range: usize,
    /// 玩家進入此距離內時逃跑，None 表示從不逃跑
    #[serde(default)]
    pub flee_radius: Option<usize>,
    #[serde(default)]
    pub flee_budget: Steps,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TurretConfig {
    pub damage: i32,
    pub min_range: usize,
    pub max_range: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EncounterConfig {
    pub enemy_hp_base: i32,
    pub enemy_hp_per_floor: i32,
    pub boss_hp_base: i32,
    pub boss_hp_per_floor: i32,
    pub boss_escorts: usize,
    pub obstacles_min: usize,
    pub obstacles_max: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RewardConfig {
    pub victory_gold_base: Gold,
    pub victory_gold_per_floor: Gold,
    pub boss_gold_multiplier: Gold,
    pub max_hp_growth: i32,
    pub max_hp_growth_chance: f64,
    pub boss_max_hp_growth: i32,
    /// 戰敗後回復到最大生命的百分比（至少 1）
    pub revive_percent: i32,
    pub defeat_gold_loss_percent: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CombatConfig {
    pub shield_cap: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct ObstacleRule {
    pub blocks_movement: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ObstacleRules {
    pub wall: ObstacleRule,
    pub rock: ObstacleRule,
    pub shrine: ObstacleRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            hand: HandConfig::default(),
            player: PlayerConfig::default(),
            melee: EnemyProfile::melee(),
            ranged: EnemyProfile::ranged(),
            boss: EnemyProfile::boss(),
            turret: TurretConfig::default(),
            encounter: EncounterConfig::default(),
            rewards: RewardConfig::default(),
            combat: CombatConfig::default(),
            obstacles: ObstacleRules::default(),
            run: RunConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 8,
        }
    }
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            opening: 5,
            draw_per_turn: 1,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_hp: 30,
            max_mana: 3,
            move_points: 3,
        }
    }
}

impl EnemyProfile {
    pub fn melee() -> Self {
        Self {
            damage: 6,
            move_points: 3,
            min_range: 1,
            max_range: 1,
            flee_radius: None,
            flee_budget: 0,
        }
    }

    pub fn ranged() -> Self {
        Self {
            damage: 4,
            move_points: 3,
            min_range: 2,
            max_range: 4,
            flee_radius: Some(1),
            flee_budget: 2,
        }
    }

    pub fn boss() -> Self {
        Self {
            damage: 9,
            move_points: 2,
            min_range: 1,
            max_range: 1,
            flee_radius: None,
            flee_budget: 0,
        }
    }

    pub fn in_range(&self, distance: usize) -> bool {
        (self.min_range..=self.max_range).contains(&distance)
    }
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            damage: 4,
            min_range: 1,
            max_range: 3,
        }
    }
}

impl TurretConfig {
    pub fn in_range(&self, distance: usize) -> bool {
        (self.min_range..=self.max_range).contains(&distance)
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            enemy_hp_base: 15,
            enemy_hp_per_floor: 2,
            boss_hp_base: 40,
            boss_hp_per_floor: 3,
            boss_escorts: 2,
            obstacles_min: 2,
            obstacles_max: 3,
        }
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            victory_gold_base: 10,
            victory_gold_per_floor: 3,
            boss_gold_multiplier: 2,
            max_hp_growth: 2,
            max_hp_growth_chance: 0.25,
            boss_max_hp_growth: 5,
            revive_percent: 50,
            defeat_gold_loss_percent: 25,
        }
    }
}

impl Default for ObstacleRules {
    fn default() -> Self {
        Self {
            wall: ObstacleRule {
                blocks_movement: true,
            },
            rock: ObstacleRule {
                blocks_movement: true,
            },
            shrine: ObstacleRule {
                blocks_movement: false,
            },
        }
    }
}

impl ObstacleRules {
    pub fn rule(&self, kind: ObstacleKind) -> ObstacleRule {
        match kind {
            ObstacleKind::Wall => self.wall,
            ObstacleKind::Rock => self.rock,
            ObstacleKind::Shrine => self.shrine,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let func = "GameConfig::from_toml_str";

        toml::from_str(content).map_err(|e| Error::ParseConfig {
            func,
            reason: e.to_string(),
        })
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let func = "GameConfig::from_file";

        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            func,
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| Error::Wrap {
            func,
            source: Box::new(e),
        })
    }

    pub fn profile(&self, kind: UnitKind) -> Option<&EnemyProfile> {
        match kind {
            UnitKind::Melee => Some(&self.melee),
            UnitKind::Ranged => Some(&self.ranged),
            UnitKind::Boss => Some(&self.boss),
            UnitKind::Player | UnitKind::Obstacle | UnitKind::Turret => None,
        }
    }

    pub fn obstacle(&self, kind: ObstacleKind) -> Obstacle {
        Obstacle {
            kind,
            blocks_movement: self.obstacles.rule(kind).blocks_movement,
        }
    }

    pub fn enemy_hp(&self, kind: UnitKind, floor: usize) -> i32 {
        let floor = floor as i32;
        match kind {
            UnitKind::Boss => self.encounter.boss_hp_base + self.encounter.boss_hp_per_floor * floor,
            _ => self.encounter.enemy_hp_base + self.encounter.enemy_hp_per_floor * floor,
        }
    }

    pub fn victory_gold(&self, floor: usize, is_boss: bool) -> Gold {
        let gold =
            self.rewards.victory_gold_base + self.rewards.victory_gold_per_floor * floor as Gold;
        if is_boss {
            gold * self.rewards.boss_gold_multiplier
        } else {
            gold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!((config.grid.width, config.grid.height), (4, 8));
        assert_eq!(config.hand.limit, 5);
        assert_eq!(config.player.max_hp, 30);
        assert_eq!(config.enemy_hp(UnitKind::Melee, 0), 15);
        assert_eq!(config.enemy_hp(UnitKind::Ranged, 3), 21);
        assert_eq!(config.enemy_hp(UnitKind::Boss, 8), 64);
        assert_eq!(config.victory_gold(2, false), 16);
        assert_eq!(config.victory_gold(8, true), 68);
        assert!(config.obstacle(ObstacleKind::Rock).blocks_movement);
        assert!(!config.obstacle(ObstacleKind::Shrine).blocks_movement);
        assert_eq!(config.combat.shield_cap, None);
    }

    #[test]
    fn test_partial_toml() {
        let content = r#"
[grid]
width = 6

[ranged]
damage = 5
move_points = 2
min_range = 2
max_range = 3

[combat]
shield_cap = 12

[obstacles.shrine]
blocks_movement = true

[run]
floors = 4
"#;
        let config = GameConfig::from_toml_str(content).unwrap();
        assert_eq!((config.grid.width, config.grid.height), (6, 8));
        assert_eq!(config.ranged.damage, 5);
        assert_eq!(config.ranged.max_range, 3);
        assert_eq!(config.ranged.flee_radius, None);
        assert_eq!(config.melee, EnemyProfile::melee());
        assert_eq!(config.combat.shield_cap, Some(12));
        assert!(config.obstacle(ObstacleKind::Shrine).blocks_movement);
        assert!(config.obstacle(ObstacleKind::Wall).blocks_movement);
        assert_eq!(config.run.floors, 4);
        assert_eq!(config.run.shop_price, 30);
    }

    #[test]
    fn test_incomplete_profile_rejected() {
        let err = GameConfig::from_toml_str("[boss]\ndamage = 20\n").unwrap_err();
        assert!(matches!(err, Error::ParseConfig { .. }));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("tactics-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[hand]\nlimit = 7\n").unwrap();
        let config = GameConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.hand.limit, 7);

        let missing = std::env::temp_dir().join("tactics-config-missing.toml");
        let err = GameConfig::from_file(&missing).unwrap_err();
        let Error::ReadConfig { path, source, .. } = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(path, missing);
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_profile_range() {
        let config = GameConfig::default();
        let test_data = [
            (UnitKind::Melee, 1, true),
            (UnitKind::Melee, 2, false),
            (UnitKind::Ranged, 1, false),
            (UnitKind::Ranged, 2, true),
            (UnitKind::Ranged, 4, true),
            (UnitKind::Ranged, 5, false),
            (UnitKind::Boss, 1, true),
        ];
        for (kind, distance, expected) in test_data {
            let profile = config.profile(kind).unwrap();
            assert_eq!(profile.in_range(distance), expected, "{kind} at {distance}");
        }
        assert!(config.profile(UnitKind::Turret).is_none());
    }
}
