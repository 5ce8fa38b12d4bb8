//! dialoguer menus

use crate::types::MenuItem;
use dialoguer::{theme::ColorfulTheme, Input, Select};

/// Select an item from the menu. `None` when cancelled or empty.
pub fn select<T: Clone>(items: &[MenuItem<T>], prompt: &str) -> Option<T> {
    if items.is_empty() {
        return None;
    }

    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()
        .ok()
        .flatten()?;

    items.get(selection).map(|item| item.value.clone())
}

/// Ask for a seek position in percent
pub fn prompt_percent(prompt: &str) -> Option<f64> {
    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()
        .ok()?;
    parse_percent(&input)
}

/// "40", "40%", " 12.5 " are all fine. Range is not checked here.
fn parse_percent(input: &str) -> Option<f64> {
    input.trim().trim_end_matches('%').trim().parse().ok()
}
