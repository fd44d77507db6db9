//! board.rs：
//! - Grid 只描述棋盤幾何、障礙物與地形效果，查詢皆為 total function。
//! - Board 是一場戰鬥的完整狀態：Grid、所有單位（含剛死亡者）與佔位索引。
//! - 死亡單位會立刻移出佔位索引，之後任何座標查詢都找不到它。
use crate::*;
use cards_lib::TileEffectKind;
use std::collections::{BTreeMap, HashMap};

#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    EnumString,
    Display,
    EnumIter,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ObstacleKind {
    Wall,
    Rock,
    /// 裝飾用，預設不阻擋移動
    Shrine,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub blocks_movement: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct TileEffect {
    pub pos: Pos,
    pub kind: TileEffectKind,
    pub duration: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    /// 每格至多一個障礙物
    pub obstacles: BTreeMap<Pos, Obstacle>,
    pub tile_effects: Vec<TileEffect>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn is_in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// 只有 blocks_movement 的障礙物才算阻擋
    pub fn has_blocking_obstacle(&self, pos: Pos) -> bool {
        self.obstacles
            .get(&pos)
            .is_some_and(|obstacle| obstacle.blocks_movement)
    }

    pub fn obstacle_at(&self, pos: Pos) -> Option<&Obstacle> {
        self.obstacles.get(&pos)
    }

    /// 已有障礙物或超出棋盤時不放置
    pub fn place_obstacle(&mut self, pos: Pos, obstacle: Obstacle) -> bool {
        if !self.is_in_bounds(pos) || self.obstacles.contains_key(&pos) {
            return false;
        }
        self.obstacles.insert(pos, obstacle);
        true
    }

    /// 同格同種類的效果只保留一個，持續時間取較長者
    pub fn add_tile_effect(&mut self, pos: Pos, kind: TileEffectKind, duration: u32) {
        match self
            .tile_effects
            .iter_mut()
            .find(|e| e.pos == pos && e.kind == kind)
        {
            Some(effect) => effect.duration = effect.duration.max(duration),
            None => self.tile_effects.push(TileEffect {
                pos,
                kind,
                duration,
            }),
        }
    }

    pub fn tile_effect_at(&self, pos: Pos) -> Option<&TileEffect> {
        self.tile_effects.iter().find(|e| e.pos == pos)
    }

    /// 所有效果持續時間減一，回傳到期移除的效果
    pub fn tick_tile_effects(&mut self) -> Vec<TileEffect> {
        for effect in self.tile_effects.iter_mut() {
            effect.duration = effect.duration.saturating_sub(1);
        }
        let (expired, active): (Vec<TileEffect>, Vec<TileEffect>) = self
            .tile_effects
            .drain(..)
            .partition(|effect| effect.duration == 0);
        self.tile_effects = active;
        expired
    }
}

/// 座標與單位的雙向索引，只收錄存活單位
#[derive(Debug, Default, Clone)]
pub struct UnitMap {
    pos_to_unit: HashMap<Pos, UnitID>,
    unit_to_pos: HashMap<UnitID, Pos>,
}

impl UnitMap {
    pub fn insert(&mut self, unit_id: UnitID, pos: Pos) {
        self.pos_to_unit.insert(pos, unit_id);
        self.unit_to_pos.insert(unit_id, pos);
    }

    pub fn move_unit(&mut self, unit_id: UnitID, from: Pos, to: Pos) -> Result<()> {
        let func = "UnitMap::move_unit";

        if self.unit_to_pos.get(&unit_id) != Some(&from) {
            return Err(Error::UnitNotAtPos {
                func,
                unit_id,
                pos: from,
            });
        }
        if from == to {
            return Ok(());
        }
        if self.pos_to_unit.contains_key(&to) {
            return Err(Error::PosOccupied { func, pos: to });
        }
        self.pos_to_unit.remove(&from);
        self.pos_to_unit.insert(to, unit_id);
        self.unit_to_pos.insert(unit_id, to);
        Ok(())
    }

    pub fn remove(&mut self, unit_id: UnitID) -> Option<Pos> {
        let pos = self.unit_to_pos.remove(&unit_id)?;
        self.pos_to_unit.remove(&pos);
        Some(pos)
    }

    pub fn get_unit(&self, pos: Pos) -> Option<UnitID> {
        self.pos_to_unit.get(&pos).copied()
    }

    pub fn get_pos(&self, unit_id: UnitID) -> Option<Pos> {
        self.unit_to_pos.get(&unit_id).copied()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Board {
    pub grid: Grid,
    /// 依 id 排序即為生成順序；死亡單位保留到下一場戰鬥
    pub units: BTreeMap<UnitID, Unit>,
    pub unit_map: UnitMap,
    next_unit_id: UnitID,
}

impl Board {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            units: BTreeMap::new(),
            unit_map: UnitMap::default(),
            next_unit_id: 1,
        }
    }

    /// 放置單位並指定 id，目標格必須可通行
    pub fn add_unit(&mut self, mut unit: Unit, pos: Pos) -> Result<UnitID> {
        let func = "Board::add_unit";

        if !self.grid.is_in_bounds(pos) {
            return Err(Error::OutOfBounds { func, pos });
        }
        if self.unit_map.get_unit(pos).is_some() {
            return Err(Error::PosOccupied { func, pos });
        }
        if self.grid.has_blocking_obstacle(pos) {
            return Err(Error::NotWalkable { func, pos });
        }
        let unit_id = self.next_unit_id.max(1);
        self.next_unit_id = unit_id + 1;
        unit.id = unit_id;
        self.units.insert(unit_id, unit);
        self.unit_map.insert(unit_id, pos);
        Ok(unit_id)
    }

    /// 只回傳存活單位
    pub fn get_unit_at(&self, pos: Pos) -> Option<&Unit> {
        let unit_id = self.unit_map.get_unit(pos)?;
        self.units.get(&unit_id).filter(|unit| unit.is_alive())
    }

    pub fn unit_id_at(&self, pos: Pos) -> Option<UnitID> {
        self.get_unit_at(pos).map(|unit| unit.id)
    }

    pub fn unit(&self, unit_id: UnitID) -> Option<&Unit> {
        self.units.get(&unit_id)
    }

    pub fn unit_mut(&mut self, unit_id: UnitID) -> Option<&mut Unit> {
        self.units.get_mut(&unit_id)
    }

    pub fn live_unit(&self, unit_id: UnitID) -> Option<&Unit> {
        self.units.get(&unit_id).filter(|unit| unit.is_alive())
    }

    pub fn unit_pos(&self, unit_id: UnitID) -> Option<Pos> {
        self.unit_map.get_pos(unit_id)
    }

    /// 棋盤內、無阻擋障礙、無存活單位
    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.grid.is_in_bounds(pos)
            && !self.grid.has_blocking_obstacle(pos)
            && self.get_unit_at(pos).is_none()
    }

    pub fn player_id(&self) -> Option<UnitID> {
        self.units
            .values()
            .find(|unit| unit.kind == UnitKind::Player && unit.is_alive())
            .map(|unit| unit.id)
    }

    pub fn player(&self) -> Option<&Unit> {
        self.player_id().and_then(|id| self.units.get(&id))
    }

    /// 存活的指定陣營單位，依生成順序
    pub fn live_units_of(&self, team: Team) -> Vec<UnitID> {
        self.units
            .values()
            .filter(|unit| unit.team == team && unit.is_alive())
            .map(|unit| unit.id)
            .collect()
    }

    pub fn enemies(&self) -> Vec<UnitID> {
        self.live_units_of(Team::Enemy)
    }

    pub fn turrets(&self) -> Vec<UnitID> {
        self.units
            .values()
            .filter(|unit| unit.kind == UnitKind::Turret && unit.is_alive())
            .map(|unit| unit.id)
            .collect()
    }

    /// 移出佔位索引，回傳原本位置
    pub fn evict(&mut self, unit_id: UnitID) -> Option<Pos> {
        self.unit_map.remove(unit_id)
    }

    /// 只更新佔位，合法性由呼叫端負責
    pub fn relocate(&mut self, unit_id: UnitID, to: Pos) -> Result<Pos> {
        let func = "Board::relocate";

        let from = self
            .unit_map
            .get_pos(unit_id)
            .ok_or(Error::NoUnit { func, unit_id })?;
        if !self.grid.is_in_bounds(to) {
            return Err(Error::OutOfBounds { func, pos: to });
        }
        self.unit_map
            .move_unit(unit_id, from, to)
            .map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?;
        Ok(from)
    }
}
