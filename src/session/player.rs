use serde::{Deserialize, Serialize};

/// The player's position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerToken {
    x: i32,
    y: i32,
}

impl PlayerToken {
    pub fn new(x: i32, y: i32) -> Self {
        PlayerToken { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }
}
