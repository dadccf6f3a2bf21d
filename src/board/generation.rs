use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::cell::{Cell, Color};
use crate::board::grid::Grid;
use crate::session::random::UniformSource;
use crate::session::{
    DEFAULT_INITIAL_PLAYER_X, DEFAULT_INITIAL_PLAYER_Y, DEFAULT_ORCHARD_HEIGHT,
    DEFAULT_ORCHARD_WIDTH, DEFAULT_POND_PERCENT, MAX_POND_PERCENT, SessionError,
};

/// A fruit kind that may be planted, with the color drivers draw it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FruitKind {
    pub name: String,
    pub color: Color,
}

impl FruitKind {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        FruitKind {
            name: name.into(),
            color,
        }
    }

    /// Apple, Banana and Peach.
    pub fn defaults() -> Vec<FruitKind> {
        vec![
            FruitKind::new("Apple", Color::RED),
            FruitKind::new("Banana", Color::YELLOW),
            FruitKind::new("Peach", Color::PINK),
        ]
    }
}

/// Parameters for filling a board at random.
///
/// `fruits` is ordered: the first entry is the kind planted under the
/// player's starting position.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomBoardParams {
    pub width: usize,
    pub height: usize,
    pub fruits: Vec<FruitKind>,
    pub pond_percent: u32,
    pub player_x: i32,
    pub player_y: i32,
}

impl RandomBoardParams {
    /// Default board size, pond share and start position for the given fruits.
    pub fn with_defaults(fruits: Vec<FruitKind>) -> Self {
        RandomBoardParams {
            width: DEFAULT_ORCHARD_WIDTH,
            height: DEFAULT_ORCHARD_HEIGHT,
            fruits,
            pond_percent: DEFAULT_POND_PERCENT,
            player_x: DEFAULT_INITIAL_PLAYER_X,
            player_y: DEFAULT_INITIAL_PLAYER_Y,
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.width == 0 || self.height == 0 {
            return Err(SessionError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.fruits.is_empty() {
            return Err(SessionError::NoFruitKinds);
        }
        let mut seen = HashSet::new();
        for fruit in &self.fruits {
            if !seen.insert(fruit.name.as_str()) {
                return Err(SessionError::DuplicateFruitKind(fruit.name.clone()));
            }
        }
        if self.pond_percent > MAX_POND_PERCENT {
            return Err(SessionError::PondPercentOutOfRange(self.pond_percent));
        }
        let on_board = usize::try_from(self.player_x).is_ok_and(|x| x < self.width)
            && usize::try_from(self.player_y).is_ok_and(|y| y < self.height);
        if !on_board {
            return Err(SessionError::PlayerOutOfBounds {
                x: self.player_x,
                y: self.player_y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Fill a board at random.
///
/// Each cell independently becomes a pond with probability
/// `pond_percent / 100`, otherwise an immature tree of a uniformly chosen
/// kind. The player's starting cell is then overwritten with a tree of the
/// first kind so the player never starts in a pond.
pub fn generate_board<R>(params: &RandomBoardParams, rng: &mut R) -> Result<Grid, SessionError>
where
    R: UniformSource + ?Sized,
{
    params.validate()?;

    let threshold = f64::from(params.pond_percent);
    let rows: Vec<Vec<Cell>> = (0..params.height)
        .map(|_| {
            (0..params.width)
                .map(|_| {
                    if rng.unit() * 100.0 < threshold {
                        Cell::Pond
                    } else {
                        let fruit = &params.fruits[rng.below(params.fruits.len())];
                        Cell::tree(fruit.name.clone(), fruit.color)
                    }
                })
                .collect()
        })
        .collect();

    let mut grid = Grid::new(&rows)?;
    let first = &params.fruits[0];
    let _ = grid.replace(
        params.player_x,
        params.player_y,
        Cell::tree(first.name.clone(), first.color),
    );

    debug!(
        width = params.width,
        height = params.height,
        pond_percent = params.pond_percent,
        "Generated random orchard"
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params() -> RandomBoardParams {
        RandomBoardParams {
            width: 6,
            height: 4,
            fruits: FruitKind::defaults(),
            pond_percent: 30,
            player_x: 2,
            player_y: 1,
        }
    }

    #[test]
    fn generated_board_has_requested_dimensions() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let grid = generate_board(&params(), &mut rng).unwrap();
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 4);
    }

    #[test]
    fn every_cell_is_pond_or_immature_known_tree() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let p = params();
        let grid = generate_board(&p, &mut rng).unwrap();
        for (_, cell) in grid.iter() {
            match cell {
                Cell::Pond => {}
                Cell::Tree(tree) => {
                    assert!(p.fruits.iter().any(|f| f.name == tree.kind()));
                    assert!(!tree.is_mature());
                }
                Cell::Empty => panic!("random boards have no empty cells"),
            }
        }
    }

    #[test]
    fn start_cell_is_first_kind_even_with_max_ponds() {
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut p = params();
            p.pond_percent = MAX_POND_PERCENT;
            let grid = generate_board(&p, &mut rng).unwrap();
            assert_eq!(grid.get(2, 1), Some(&Cell::tree("Apple", Color::RED)));
        }
    }

    #[test]
    fn zero_pond_percent_means_no_ponds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut p = params();
        p.pond_percent = 0;
        let grid = generate_board(&p, &mut rng).unwrap();
        assert!(grid.iter().all(|(_, cell)| !cell.is_pond()));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_board(&params(), &mut ChaCha8Rng::seed_from_u64(99)).unwrap();
        let b = generate_board(&params(), &mut ChaCha8Rng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_params_rejected() {
        let mut p = params();
        p.width = 0;
        assert!(matches!(p.validate(), Err(SessionError::InvalidDimensions { .. })));

        let mut p = params();
        p.fruits.clear();
        assert_eq!(p.validate(), Err(SessionError::NoFruitKinds));

        let mut p = params();
        p.fruits.push(FruitKind::new("Apple", Color::PINK));
        assert_eq!(
            p.validate(),
            Err(SessionError::DuplicateFruitKind("Apple".to_string()))
        );

        let mut p = params();
        p.pond_percent = MAX_POND_PERCENT + 1;
        assert_eq!(p.validate(), Err(SessionError::PondPercentOutOfRange(71)));

        let mut p = params();
        p.player_x = -1;
        assert!(matches!(p.validate(), Err(SessionError::PlayerOutOfBounds { .. })));

        let mut p = params();
        p.player_y = 4;
        assert!(matches!(p.validate(), Err(SessionError::PlayerOutOfBounds { .. })));
    }

    #[test]
    fn defaults_use_default_board() {
        let p = RandomBoardParams::with_defaults(FruitKind::defaults());
        assert_eq!(p.width, 15);
        assert_eq!(p.height, 15);
        assert_eq!(p.pond_percent, 10);
        assert_eq!((p.player_x, p.player_y), (7, 7));
        p.validate().unwrap();
    }
}
