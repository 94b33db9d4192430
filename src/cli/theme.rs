//! `theme` command.

use anyhow::Result;

use super::ThemeChoice;
use crate::log;
use crate::theme::{Theme, ThemeStore};

pub fn run_theme(choice: Option<ThemeChoice>, store: &ThemeStore) -> Result<()> {
    let theme = match choice {
        None => {
            println!("{}", store.load());
            return Ok(());
        }
        Some(ThemeChoice::Toggle) => store.toggle()?,
        Some(ThemeChoice::Light) => save(store, Theme::Light)?,
        Some(ThemeChoice::Dark) => save(store, Theme::Dark)?,
    };

    crate::logger::set_theme(theme);
    log!("theme"; "switched to {}", theme);
    Ok(())
}

fn save(store: &ThemeStore, theme: Theme) -> Result<Theme> {
    store.save(theme)?;
    Ok(theme)
}
