/// Click/tap handling for the clicker screen.
///
/// Pure logic (coordinate conversion, target matching) kept apart from the
/// web_sys DOM access in `main.rs` so it can be unit tested.

/// A screen row that can be tapped to trigger the action bound to `key`.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub row: u16,
    pub key: char,
}

/// Shared state between the render loop and click handler.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_target(&mut self, row: u16, key: char) {
        self.targets.push(ClickTarget { row, key });
    }

    /// Bind every row of a panel to one key.
    pub fn add_area_target(&mut self, top: u16, height: u16, key: char) {
        for row in top..top.saturating_add(height) {
            self.add_target(row, key);
        }
    }

    /// The key bound to a terminal row. Later registrations win, so a small
    /// button drawn over a panel takes priority over the panel.
    pub fn find_target_key(&self, row: u16) -> Option<char> {
        self.targets.iter().rev().find(|t| t.row == row).map(|t| t.key)
    }
}

/// Convert a pixel Y coordinate to a terminal row index.
///
/// `click_y` is relative to the grid container's top edge.
/// Returns `None` if the click is outside the grid or inputs are invalid.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }

    let cell_height = grid_height / terminal_rows as f64;
    let row = (click_y / cell_height) as u16;

    if row >= terminal_rows {
        return None;
    }

    Some(row)
}

/// Whether a screen width (in columns) should use the stacked layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 70
}
