use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use basket_core::BasketService;

use super::helpers::{parse_uuid, truncate};

pub(crate) async fn cmd_category_create(service: &BasketService, name: &str, json: bool) -> Result<()> {
    let category = service.create_category(name).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&category)?);
    } else {
        println!("Created category: {} (id: {})", category.name, category.id);
    }
    Ok(())
}

pub(crate) async fn cmd_category_rename(
    service: &BasketService,
    id: &str,
    name: &str,
    json: bool,
) -> Result<()> {
    let id = parse_uuid(id, "category")?;
    let category = service.rename_category(id, name).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&category)?);
    } else {
        println!("Renamed category {id} to {}", category.name);
    }
    Ok(())
}

pub(crate) async fn cmd_category_delete(service: &BasketService, id: &str, json: bool) -> Result<()> {
    let id = parse_uuid(id, "category")?;
    service.delete_category(id).await?;
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted category {id}");
    }
    Ok(())
}

pub(crate) async fn cmd_category_list(service: &BasketService, json: bool) -> Result<()> {
    let index = service.load_all_categories().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    if index.categories.is_empty() {
        println!("No categories yet. Create one with: basket category create <name>");
        return Ok(());
    }

    #[derive(Tabled)]
    struct CategoryRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Recipes")]
        recipes: usize,
        #[tabled(rename = "Created")]
        created: String,
    }

    let rows: Vec<CategoryRow> = index
        .categories
        .iter()
        .map(|c| CategoryRow {
            id: c.id.to_string(),
            name: truncate(&c.name, 30),
            recipes: index.recipes_in(c.id).map_or(0, std::collections::HashSet::len),
            created: c.created_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) async fn cmd_category_add(
    service: &BasketService,
    recipe: &str,
    category: &str,
    json: bool,
) -> Result<()> {
    let recipe_id = parse_uuid(recipe, "recipe")?;
    let category_id = parse_uuid(category, "category")?;
    service.add_recipe_to_category(recipe_id, category_id).await?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "recipe_id": recipe_id, "category_id": category_id, "linked": true })
        );
    } else {
        println!("Added recipe {recipe_id} to category {category_id}");
    }
    Ok(())
}

pub(crate) async fn cmd_category_remove(
    service: &BasketService,
    recipe: &str,
    category: &str,
    json: bool,
) -> Result<()> {
    let recipe_id = parse_uuid(recipe, "recipe")?;
    let category_id = parse_uuid(category, "category")?;
    service
        .remove_recipe_from_category(recipe_id, category_id)
        .await?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "recipe_id": recipe_id, "category_id": category_id, "linked": false })
        );
    } else {
        println!("Removed recipe {recipe_id} from category {category_id}");
    }
    Ok(())
}
