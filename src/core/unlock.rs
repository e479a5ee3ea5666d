//! Hidden key sequence that toggles the admin panel.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKey {
    Up,
    Down,
    Left,
    Right,
    Char(char),
    Other,
}

pub const ADMIN_SEQUENCE: [SecretKey; 9] = [
    SecretKey::Up,
    SecretKey::Up,
    SecretKey::Down,
    SecretKey::Down,
    SecretKey::Left,
    SecretKey::Right,
    SecretKey::Left,
    SecretKey::Right,
    SecretKey::Char('a'),
];

#[derive(Debug, Clone, Default)]
pub struct SecretSequence {
    progress: usize,
}

impl SecretSequence {
    /// Feed one key. Returns true when the sequence completes.
    pub fn feed(&mut self, key: SecretKey) -> bool {
        if ADMIN_SEQUENCE[self.progress] == key {
            self.progress += 1;
        } else {
            // A mismatch may still be the start of a new attempt.
            self.progress = usize::from(ADMIN_SEQUENCE[0] == key);
        }
        if self.progress == ADMIN_SEQUENCE.len() {
            self.progress = 0;
            return true;
        }
        false
    }

    pub fn progress(&self) -> usize {
        self.progress
    }
}
