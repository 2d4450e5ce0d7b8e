//! CSS selectors targeted by board datastar patches.

pub const BOARD: &str = "[data-role=\"board\"]";
