use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::ledger::Ledger;

// === Color ===

/// Opaque display attribute carried by a fruit tree. The engine never
/// interprets it; drivers use it to pick a color when drawing the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const PINK: Color = Color::rgb(255, 175, 175);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Parse a `#rrggbb` hex string.
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| format!("color must start with '#', got '{}'", hex))?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(format!("color must look like #rrggbb, got '{}'", hex));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| format!("invalid hex digits in color '{}'", hex))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

// === Encounter ===

/// What happened when the player stepped onto a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encounter {
    /// Nothing to collect and nothing dangerous.
    Harmless,
    /// A ripe fruit was picked and recorded in the ledger.
    Collected,
    /// The player walked into a pond.
    Drowned,
    /// The player ate spoiled fruit.
    Poisoned,
}

impl Encounter {
    pub fn is_fatal(self) -> bool {
        matches!(self, Encounter::Drowned | Encounter::Poisoned)
    }
}

// === FruitTree ===

/// A fruit tree with a maturity/spoilage lifecycle.
///
/// `kind` and `color` never change after construction. A tree only counts
/// as spoiled while it is mature, so `is_spoiled()` implies `is_mature()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FruitTree {
    kind: String,
    color: Color,
    mature: bool,
    spoiled: bool,
}

impl FruitTree {
    /// An immature, unspoiled tree.
    pub fn new(kind: impl Into<String>, color: Color) -> Self {
        FruitTree {
            kind: kind.into(),
            color,
            mature: false,
            spoiled: false,
        }
    }

    /// Builder-style helper for setting up boards with ripe fruit.
    pub fn matured(mut self) -> Self {
        self.mature();
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_mature(&self) -> bool {
        self.mature
    }

    pub fn is_spoiled(&self) -> bool {
        self.mature && self.spoiled
    }

    /// Make the tree bear fruit. Spoilage is left untouched: a spoiled tree
    /// that matures again stays lethal.
    pub fn mature(&mut self) {
        self.mature = true;
    }

    /// Per-generation spoil step. Fruit that was ripe when the generation
    /// ended turns bad. Returns true if the tree spoiled just now.
    pub fn advance(&mut self) -> bool {
        if self.mature && !self.spoiled {
            self.spoiled = true;
            true
        } else {
            false
        }
    }

    /// Resolve the player stepping onto this tree.
    pub fn meet_player(&mut self, ledger: &mut Ledger) -> Encounter {
        if self.is_spoiled() {
            return Encounter::Poisoned;
        }
        if self.mature {
            ledger.record(&self.kind);
            self.mature = false;
            return Encounter::Collected;
        }
        Encounter::Harmless
    }
}

// === Cell ===

/// What occupies a grid position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Pond,
    Tree(FruitTree),
}

impl Cell {
    /// Shorthand for an immature tree cell.
    pub fn tree(kind: impl Into<String>, color: Color) -> Self {
        Cell::Tree(FruitTree::new(kind, color))
    }

    pub fn is_pond(&self) -> bool {
        matches!(self, Cell::Pond)
    }

    pub fn as_tree(&self) -> Option<&FruitTree> {
        match self {
            Cell::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// True when stepping here right now would end the session.
    pub fn is_deadly(&self) -> bool {
        match self {
            Cell::Pond => true,
            Cell::Tree(tree) => tree.is_spoiled(),
            Cell::Empty => false,
        }
    }

    pub fn meet_player(&mut self, ledger: &mut Ledger) -> Encounter {
        match self {
            Cell::Empty => Encounter::Harmless,
            Cell::Pond => Encounter::Drowned,
            Cell::Tree(tree) => tree.meet_player(ledger),
        }
    }

    /// Read-only projection for renderers.
    pub fn view(&self) -> CellView<'_> {
        match self {
            Cell::Empty => CellView::Empty,
            Cell::Pond => CellView::Pond,
            Cell::Tree(tree) => CellView::Tree {
                kind: &tree.kind,
                color: tree.color,
                mature: tree.is_mature(),
                spoiled: tree.is_spoiled(),
            },
        }
    }
}

/// Everything a renderer needs to draw a cell, without access to engine internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellView<'a> {
    Empty,
    Pond,
    Tree {
        kind: &'a str,
        color: Color,
        mature: bool,
        spoiled: bool,
    },
}
