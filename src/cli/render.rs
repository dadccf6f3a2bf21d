use crate::board::CellView;
use crate::session::{MIN_GOAL_PER_TYPE, Session};

pub const PLAYER_GLYPH: char = '@';

/// Text glyph for a cell: `.` empty, `~` pond, `x` spoiled fruit, and the
/// first letter of the fruit kind, uppercase when it bears fruit.
pub fn glyph(view: CellView<'_>) -> char {
    match view {
        CellView::Empty => '.',
        CellView::Pond => '~',
        CellView::Tree { spoiled: true, .. } => 'x',
        CellView::Tree { kind, mature, .. } => {
            let initial = kind.chars().next().unwrap_or('?');
            if mature {
                initial.to_ascii_uppercase()
            } else {
                initial.to_ascii_lowercase()
            }
        }
    }
}

/// The whole board, one text line per row, with the player drawn on top.
pub fn render_board(session: &Session) -> String {
    let mut out = String::with_capacity((session.width() + 1) * session.height());
    for y in 0..session.height() as i32 {
        for x in 0..session.width() as i32 {
            if (x, y) == session.player().position() {
                out.push(PLAYER_GLYPH);
            } else if let Some(view) = session.cell_at(x, y) {
                out.push(glyph(view));
            }
        }
        out.push('\n');
    }
    out
}

/// Collection progress and generation count, e.g.
/// `Apple: 3/10  Banana: 0/10  Generation: 4/30`.
pub fn status_line(session: &Session, max_generations: u64) -> String {
    let mut parts: Vec<String> = session
        .ledger()
        .iter()
        .map(|(kind, count)| format!("{}: {}/{}", kind, count, MIN_GOAL_PER_TYPE))
        .collect();
    parts.push(format!(
        "Generation: {}/{}",
        session.generation(),
        max_generations
    ));
    parts.join("  ")
}
