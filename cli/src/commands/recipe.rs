use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process;

use basket_core::BasketService;
use basket_core::models::{Ingredient, IngredientSection, Recipe};
use basket_core::seed;

use super::helpers::{json_error, parse_uuid, print_recipe_table};

pub(crate) async fn cmd_recipe_import(service: &BasketService, file: &Path, json: bool) -> Result<()> {
    let recipes = seed::load_seed_file(file)?;
    for recipe in &recipes {
        service
            .save_recipe(recipe)
            .await
            .with_context(|| format!("Failed to save recipe '{}'", recipe.title))?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
    } else {
        let count = recipes.len();
        println!("Imported {count} recipe(s) from {}", file.display());
        for r in &recipes {
            println!("  {}  {}", r.id, r.title);
        }
    }
    Ok(())
}

pub(crate) async fn cmd_recipe_import_cook(
    service: &BasketService,
    file: &Path,
    title_override: Option<String>,
    servings_override: Option<u32>,
    json: bool,
) -> Result<()> {
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let (recipe_data, _report) = cooklang::parse(&input)
        .into_result()
        .map_err(|e| anyhow::anyhow!("Failed to parse Cooklang file: {e}"))?;

    let title = title_override
        .or_else(|| recipe_data.metadata.title().map(String::from))
        .or_else(|| file.file_stem().and_then(|s| s.to_str()).map(String::from))
        .context("Could not determine recipe title. Use --title to specify one")?;

    let servings = servings_override.or_else(|| {
        recipe_data
            .metadata
            .servings()
            .and_then(|s| s.as_number())
    });

    let converter = cooklang::Converter::default();
    let grouped = recipe_data.group_ingredients(&converter);
    let ingredients: Vec<Ingredient> = grouped.iter().map(cooklang_ingredient).collect();

    if ingredients.is_empty() {
        bail!("No ingredients found in recipe");
    }

    let mut recipe = Recipe::new(title);
    recipe.servings = servings;
    recipe.ingredient_sections.push(IngredientSection {
        header: None,
        ingredients,
    });
    service.save_recipe(&recipe).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        let title = &recipe.title;
        let count = recipe.ingredients().count();
        let id = recipe.id;
        println!("Imported recipe: {title} ({count} ingredients, id: {id})");
    }
    Ok(())
}

fn cooklang_ingredient(gi: &cooklang::ingredient_list::GroupedIngredient<'_>) -> Ingredient {
    // Only the first grouped quantity is kept
    let amount = gi
        .quantity
        .iter()
        .next()
        .and_then(|qty: &cooklang::Quantity| {
            let value = match qty.value() {
                cooklang::Value::Number(n) => format_number(n.value()),
                cooklang::Value::Range { start, end, .. } => {
                    format!("{}-{}", format_number(start.value()), format_number(end.value()))
                }
                cooklang::Value::Text(t) => t.clone(),
            };
            let amount = match qty.unit() {
                Some(unit) => format!("{value} {unit}"),
                None => value,
            };
            let amount = amount.trim().to_string();
            (!amount.is_empty()).then_some(amount)
        });

    Ingredient {
        name: gi.ingredient.display_name().to_string(),
        amount,
        is_modified: false,
    }
}

fn format_number(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    format!("{rounded}")
}

pub(crate) async fn cmd_recipe_list(
    service: &BasketService,
    category: Option<&str>,
    json: bool,
) -> Result<()> {
    let index = service.load_all_categories().await?;
    let mut recipes = service.load_all_recipes().await?;

    if let Some(category) = category {
        let category_id = parse_uuid(category, "category")?;
        let Some(members) = index.recipes_in(category_id) else {
            bail!("Category {category_id} not found");
        };
        recipes.retain(|r| members.contains(&r.id));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    if recipes.is_empty() {
        println!("No recipes found.");
        return Ok(());
    }
    print_recipe_table(&recipes, &index);
    Ok(())
}

pub(crate) async fn cmd_recipe_show(service: &BasketService, id: &str, json: bool) -> Result<()> {
    let id = parse_uuid(id, "recipe")?;
    let Some(recipe) = service.load_recipe(id).await? else {
        if json {
            println!("{}", json_error(&format!("Recipe {id} not found")));
            process::exit(1);
        }
        bail!("Recipe {id} not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    println!("{}", recipe.title);
    if let Some(description) = &recipe.description {
        println!("{description}");
    }
    if let Some(servings) = recipe.servings {
        println!("Servings: {servings}");
    }
    if let Some(url) = &recipe.source_url {
        println!("Source: {url}");
    }

    let index = service.load_all_categories().await?;
    let categories: Vec<&str> = index
        .categories_of(recipe.id)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    if !categories.is_empty() {
        println!("Categories: {}", categories.join(", "));
    }

    for section in &recipe.ingredient_sections {
        println!();
        println!("{}", section.header.as_deref().unwrap_or("Ingredients"));
        for ing in &section.ingredients {
            match &ing.amount {
                Some(amount) => println!("  - {amount} {}", ing.name),
                None => println!("  - {}", ing.name),
            }
        }
    }

    for section in &recipe.step_sections {
        println!();
        println!("{}", section.header.as_deref().unwrap_or("Steps"));
        for step in &section.steps {
            println!("  {}. {}", step.step_number, step.instruction);
        }
    }

    Ok(())
}

pub(crate) async fn cmd_recipe_delete(service: &BasketService, id: &str, json: bool) -> Result<()> {
    let id = parse_uuid(id, "recipe")?;
    service.delete_recipe(id).await?;
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted recipe {id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1.0 / 3.0), "0.333");
    }
}
