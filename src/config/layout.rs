use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::board::{Cell, Color, FruitTree};

/// An explicit orchard described as text rows.
///
/// Glyphs: `.` empty, `~` pond, a lowercase legend letter is an immature
/// tree of that kind and the uppercase letter is the same tree bearing fruit.
///
/// ```toml
/// player_x = 1
/// player_y = 0
/// rows = [
///     "~pP",
///     "b~a",
/// ]
///
/// [legend]
/// a = { name = "Apple", color = "#ff0000" }
/// b = { name = "Banana", color = "#ffff00" }
/// p = { name = "Peach", color = "#ffafaf" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardLayout {
    pub rows: Vec<String>,
    pub player_x: i32,
    pub player_y: i32,
    #[serde(default)]
    pub legend: BTreeMap<String, LegendEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegendEntry {
    pub name: String,
    pub color: Color,
}

impl BoardLayout {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let layout: BoardLayout = toml::from_str(content)
            .map_err(|e| format!("Invalid TOML in {}: {}", source_path.display(), e))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Check the legend and every glyph. Reports all problems at once.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        for key in self.legend.keys() {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_lowercase() => {}
                _ => errors.push(format!(
                    "legend key '{}' must be a single lowercase letter",
                    key
                )),
            }
        }

        if self.rows.is_empty() {
            errors.push("rows must contain at least one row".to_string());
        }

        for (y, row) in self.rows.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate() {
                if let Err(e) = self.cell_for(glyph) {
                    errors.push(format!("row {} column {}: {}", y, x, e));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }

    fn cell_for(&self, glyph: char) -> Result<Cell, String> {
        match glyph {
            '.' => Ok(Cell::Empty),
            '~' => Ok(Cell::Pond),
            c if c.is_ascii_alphabetic() => {
                let key = c.to_ascii_lowercase().to_string();
                let entry = self
                    .legend
                    .get(&key)
                    .ok_or_else(|| format!("glyph '{}' has no legend entry", c))?;
                let tree = FruitTree::new(entry.name.clone(), entry.color);
                Ok(Cell::Tree(if c.is_ascii_uppercase() {
                    tree.matured()
                } else {
                    tree
                }))
            }
            other => Err(format!("unknown glyph '{}'", other)),
        }
    }

    /// The rows as cells, ready for `Session::new_from_board`. Row length
    /// is checked by the board itself.
    pub fn to_cells(&self) -> Result<Vec<Vec<Cell>>, String> {
        self.rows
            .iter()
            .map(|row| row.chars().map(|glyph| self.cell_for(glyph)).collect())
            .collect()
    }
}
