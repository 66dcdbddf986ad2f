use ambimix::shared::DisplayState;

// state local to the tui: which sound row the arrow keys act on
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub cursor: usize,
}

impl TuiState {
    pub fn move_cursor(&mut self, delta: isize, rows: usize) {
        if rows == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + delta).rem_euclid(rows as isize) as usize;
    }

    // keep the cursor on a real row if the sound list shrank
    pub fn clamp_to(&mut self, ds: &DisplayState) {
        self.cursor = self.cursor.min(ds.sounds.len().saturating_sub(1));
    }
}
