//! 本檔案僅收錄「有名且有固定公式」的演算法，目前為八方向 BFS。
//! 只依賴 PathfindingBoard 介面，不認識單位或卡牌。
use crate::*;
use std::collections::{HashMap, VecDeque};

/// 固定的鄰格列舉順序，決定等長路徑的取捨
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// 路徑搜尋專用棋盤介面
pub trait PathfindingBoard {
    /// 判斷座標是否在棋盤內
    fn is_valid(&self, pos: Pos) -> bool;
    /// 判斷座標是否可通行
    fn is_passable(&self, pos: Pos) -> bool;
    /// 取得鄰近座標，預設為八方向
    fn get_neighbors(&self, pos: Pos) -> Vec<Pos> {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| pos.offset(dx, dy))
            .filter(|&next| self.is_valid(next))
            .collect()
    }
}

/// BFS 最短路徑，回傳包含起點的座標序列
/// 目標格即使不可通行也能作為終點
pub fn bfs_path(graph: &impl PathfindingBoard, start: Pos, target: Pos) -> Option<Vec<Pos>> {
    if !graph.is_valid(start) || !graph.is_valid(target) {
        return None;
    }
    if start == target {
        return Some(vec![start]);
    }

    let mut prev: HashMap<Pos, Pos> = HashMap::from([(start, start)]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in graph.get_neighbors(current) {
            if prev.contains_key(&next) {
                continue;
            }
            if next != target && !graph.is_passable(next) {
                continue;
            }
            prev.insert(next, current);
            if next == target {
                return Some(reconstruct(&prev, start, target));
            }
            queue.push_back(next);
        }
    }
    None
}

/// 步數上限內可抵達的座標（不含起點），只穿越可通行格
/// 回傳順序即 BFS 發現順序
pub fn bfs_reachable(graph: &impl PathfindingBoard, start: Pos, max_steps: Steps) -> Vec<(Pos, Steps)> {
    let mut seen: HashMap<Pos, Steps> = HashMap::from([(start, 0)]);
    let mut found = Vec::new();
    let mut queue = VecDeque::from([(start, 0)]);
    while let Some((current, steps)) = queue.pop_front() {
        if steps >= max_steps {
            continue;
        }
        for next in graph.get_neighbors(current) {
            if seen.contains_key(&next) || !graph.is_passable(next) {
                continue;
            }
            seen.insert(next, steps + 1);
            found.push((next, steps + 1));
            queue.push_back((next, steps + 1));
        }
    }
    found
}

use inner::*;
mod inner {
    use super::*;

    pub fn reconstruct(prev: &HashMap<Pos, Pos>, start: Pos, target: Pos) -> Vec<Pos> {
        let mut path = vec![target];
        let mut current = target;
        while current != start {
            match prev.get(&current) {
                Some(&p) => {
                    path.push(p);
                    current = p;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}
