use anyhow::{Result, bail};

use basket_core::BasketService;

pub(crate) async fn cmd_reset(service: &BasketService, yes: bool, json: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete all data without --yes");
    }

    let recipes = service.load_all_recipes().await?.len();
    let lists = service.load_all_shopping_lists().await?.len();
    let categories = service.load_all_categories().await?.categories.len();
    service.delete_all_data().await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "recipes_deleted": recipes,
                "shopping_lists_deleted": lists,
                "categories_deleted": categories,
            })
        );
    } else {
        println!(
            "Deleted {recipes} recipe(s), {lists} shopping list(s) and {categories} category(ies)"
        );
    }
    Ok(())
}
