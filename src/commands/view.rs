use anyhow::Result;

use crate::tui::canvas::{self, ViewOptions};

pub fn run(demo: bool, api: Option<String>) -> Result<()> {
    canvas::run(ViewOptions { demo, api })
}
