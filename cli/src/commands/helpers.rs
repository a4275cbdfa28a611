use anyhow::{Context, Result};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};
use uuid::Uuid;

use basket_core::models::{CategoryIndex, Recipe, ShoppingListDto};

pub(crate) fn parse_uuid(s: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(s.trim()).with_context(|| format!("Invalid {what} id: '{s}'"))
}

pub(crate) fn parse_uuids(values: &[String], what: &str) -> Result<Vec<Uuid>> {
    values.iter().map(|v| parse_uuid(v, what)).collect()
}

pub(crate) fn print_recipe_table(recipes: &[Recipe], categories: &CategoryIndex) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Servings")]
        servings: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
        #[tabled(rename = "Steps")]
        steps: usize,
        #[tabled(rename = "Categories")]
        categories: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id.to_string(),
            title: truncate(&r.title, 35),
            servings: r.servings.map_or("-".into(), |s| s.to_string()),
            ingredients: r.ingredients().count(),
            steps: r.step_sections.iter().map(|s| s.steps.len()).sum(),
            categories: truncate(
                &categories
                    .categories_of(r.id)
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                30,
            ),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_shopping_list(list: &ShoppingListDto) {
    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "")]
        checked: &'static str,
        #[tabled(rename = "Item")]
        name: String,
        #[tabled(rename = "Total")]
        total: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "From")]
        from: String,
        #[tabled(rename = "ID")]
        id: String,
    }

    let name = &list.name;
    let checked = list.checked_count();
    let total = list.items.len();
    println!("{name} ({checked}/{total} checked)");
    println!("id: {}", list.id);

    if list.items.is_empty() {
        println!("\nNo items.");
        return;
    }

    let rows: Vec<ItemRow> = list
        .items
        .iter()
        .map(|item| ItemRow {
            checked: if item.is_checked { "[x]" } else { "[ ]" },
            name: truncate(&item.name, 30),
            total: item.total_amount.clone().unwrap_or_else(|| "-".into()),
            category: item.category.clone().unwrap_or_default(),
            from: truncate(
                &item
                    .breakdowns
                    .iter()
                    .map(|b| match &b.amount {
                        Some(amount) => format!("{} ({amount})", b.source_recipe_title),
                        None => b.source_recipe_title.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
                50,
            ),
            id: item.id.to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
