use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use basket_core::BasketService;
use basket_core::export::write_shopping_list_csv;
use basket_core::models::ShoppingListDto;

use super::helpers::{json_error, parse_uuid, parse_uuids, print_shopping_list, truncate};

pub(crate) async fn cmd_list_create(
    service: &BasketService,
    name: &str,
    recipes: &[String],
    json: bool,
) -> Result<()> {
    let recipe_ids = parse_uuids(recipes, "recipe")?;
    let list = service.create_shopping_list(name, &recipe_ids).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        print_shopping_list(&list);
    }
    Ok(())
}

async fn load_list(service: &BasketService, id: &str, json: bool) -> Result<ShoppingListDto> {
    let id = parse_uuid(id, "shopping list")?;
    match service.load_shopping_list(id).await? {
        Some(list) => Ok(list),
        None => {
            if json {
                println!("{}", json_error(&format!("Shopping list {id} not found")));
                process::exit(1);
            }
            bail!("Shopping list {id} not found");
        }
    }
}

pub(crate) async fn cmd_list_show(service: &BasketService, id: &str, json: bool) -> Result<()> {
    let list = load_list(service, id, json).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        print_shopping_list(&list);
    }
    Ok(())
}

pub(crate) async fn cmd_list_all(service: &BasketService, json: bool) -> Result<()> {
    let lists = service.load_all_shopping_lists().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }

    if lists.is_empty() {
        println!("No shopping lists yet.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct ListRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Recipes")]
        recipes: usize,
        #[tabled(rename = "Items")]
        items: usize,
        #[tabled(rename = "Checked")]
        checked: usize,
        #[tabled(rename = "Updated")]
        updated: String,
    }

    let rows: Vec<ListRow> = lists
        .iter()
        .map(|l| ListRow {
            id: l.id.to_string(),
            name: truncate(&l.name, 30),
            recipes: l.recipe_ids.len(),
            items: l.items.len(),
            checked: l.checked_count(),
            updated: l.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) async fn cmd_list_delete(service: &BasketService, id: &str, json: bool) -> Result<()> {
    let id = parse_uuid(id, "shopping list")?;
    service.delete_shopping_list(id).await?;
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted shopping list {id}");
    }
    Ok(())
}

pub(crate) async fn cmd_list_rename(
    service: &BasketService,
    id: &str,
    name: &str,
    json: bool,
) -> Result<()> {
    let id = parse_uuid(id, "shopping list")?;
    let list = service.rename_shopping_list(id, name).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        println!("Renamed shopping list {id} to {}", list.name);
    }
    Ok(())
}

pub(crate) async fn cmd_list_check(
    service: &BasketService,
    item: &str,
    is_checked: bool,
    json: bool,
) -> Result<()> {
    let item_id = parse_uuid(item, "item")?;
    service
        .update_shopping_item_checked(item_id, is_checked)
        .await?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "item_id": item_id, "is_checked": is_checked })
        );
    } else if is_checked {
        println!("Checked item {item_id}");
    } else {
        println!("Unchecked item {item_id}");
    }
    Ok(())
}

pub(crate) async fn cmd_list_tag(
    service: &BasketService,
    item: &str,
    category: Option<&str>,
    json: bool,
) -> Result<()> {
    let item_id = parse_uuid(item, "item")?;
    service
        .update_shopping_item_category(item_id, category)
        .await?;
    let category = category.map(str::trim).filter(|c| !c.is_empty());
    if json {
        println!(
            "{}",
            serde_json::json!({ "item_id": item_id, "category": category })
        );
    } else {
        match category {
            Some(c) => println!("Tagged item {item_id} as {c}"),
            None => println!("Cleared category of item {item_id}"),
        }
    }
    Ok(())
}

pub(crate) async fn cmd_list_export(
    service: &BasketService,
    id: &str,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let list = load_list(service, id, json).await?;

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            write_shopping_list_csv(&list, file)?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "list_id": list.id, "path": path.display().to_string() })
                );
            } else {
                println!("Exported '{}' to {}", list.name, path.display());
            }
        }
        None if json => println!("{}", serde_json::to_string_pretty(&list)?),
        None => write_shopping_list_csv(&list, std::io::stdout().lock())?,
    }
    Ok(())
}
