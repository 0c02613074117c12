/// Class toggled on the menu button and the menu itself while open, and on
/// the nav link of the current section.
pub const ACTIVE_CLASS: &str = "active";

/// Open/closed state shared by the mobile menu button and the menu it controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Flip the menu; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Returns `true` when this call actually closed the menu.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_close_is_idempotent() {
        let mut menu = MenuState::default();
        assert!(!menu.is_open());
        assert!(menu.toggle());
        assert!(menu.close());
        assert!(!menu.close());
        assert!(!menu.is_open());
        assert!(menu.toggle());
        assert!(!menu.toggle());
    }
}
