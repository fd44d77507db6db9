//! movement.rs：
//! - 以 Board 的可通行判斷（棋盤範圍、阻擋障礙、存活單位）包裝 BFS。
//! - 僅處理路徑與可達範圍查詢，不修改任何狀態。
use crate::*;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ReachableTile {
    pub pos: Pos,
    pub steps: Steps,
}

struct WalkableBoardView<'a> {
    board: &'a Board,
}

impl<'a> PathfindingBoard for WalkableBoardView<'a> {
    fn is_valid(&self, pos: Pos) -> bool {
        self.board.grid.is_in_bounds(pos)
    }

    fn is_passable(&self, pos: Pos) -> bool {
        self.board.is_walkable(pos)
    }
}

/// 最短路徑（含起點），目標格被佔用時仍可作為終點
pub fn find_path(board: &Board, start: Pos, target: Pos) -> Option<Vec<Pos>> {
    bfs_path(&WalkableBoardView { board }, start, target)
}

/// 只穿越可通行格，不含起點
pub fn reachable_tiles(board: &Board, start: Pos, max_steps: Steps) -> Vec<ReachableTile> {
    bfs_reachable(&WalkableBoardView { board }, start, max_steps)
        .into_iter()
        .map(|(pos, steps)| ReachableTile { pos, steps })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_blocked_by_units_and_obstacles() {
        let mut grid = Grid::new(3, 3);
        grid.place_obstacle(
            Pos::new(1, 0),
            Obstacle {
                kind: ObstacleKind::Wall,
                blocks_movement: true,
            },
        );
        grid.place_obstacle(
            Pos::new(1, 2),
            Obstacle {
                kind: ObstacleKind::Shrine,
                blocks_movement: false,
            },
        );
        let mut board = Board::new(grid);
        board
            .add_unit(Unit::new(UnitKind::Melee, 10), Pos::new(1, 1))
            .unwrap();

        // 只能經過不阻擋的 shrine
        let path = find_path(&board, Pos::new(0, 0), Pos::new(2, 0)).unwrap();
        assert_eq!(path.len(), 5);
        assert!(path.contains(&Pos::new(1, 2)));

        // 佔用格可作為終點
        let path = find_path(&board, Pos::new(0, 0), Pos::new(1, 1)).unwrap();
        assert_eq!(path, vec![Pos::new(0, 0), Pos::new(1, 1)]);

        let reachable = reachable_tiles(&board, Pos::new(0, 0), 1);
        let positions: Vec<Pos> = reachable.iter().map(|t| t.pos).collect();
        assert_eq!(positions, vec![Pos::new(0, 1)]);
    }
}
