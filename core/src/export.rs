use std::io::Write;

use anyhow::{Context, Result};

use crate::models::ShoppingListDto;

const HEADER: [&str; 7] = [
    "Item",
    "Total",
    "Category",
    "Checked",
    "Recipe",
    "Amount",
    "Recipe ID",
];

/// Write a shopping list as CSV, one row per breakdown. Items without any
/// breakdown still get a single row with the recipe columns left empty.
pub fn write_shopping_list_csv<W: Write>(list: &ShoppingListDto, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)
        .context("Failed to write CSV header")?;

    for item in &list.items {
        let total = item.total_amount.as_deref().unwrap_or("");
        let category = item.category.as_deref().unwrap_or("");
        let checked = if item.is_checked { "yes" } else { "no" };

        if item.breakdowns.is_empty() {
            wtr.write_record([item.name.as_str(), total, category, checked, "", "", ""])
                .with_context(|| format!("Failed to write row for '{}'", item.name))?;
            continue;
        }

        for b in &item.breakdowns {
            let recipe_id = b.source_recipe_id.to_string();
            wtr.write_record([
                item.name.as_str(),
                total,
                category,
                checked,
                b.source_recipe_title.as_str(),
                b.amount.as_deref().unwrap_or(""),
                recipe_id.as_str(),
            ])
            .with_context(|| format!("Failed to write row for '{}'", item.name))?;
        }
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShoppingListItemBreakdownDto, ShoppingListItemDto};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_write_shopping_list_csv() {
        let recipe_a = Uuid::new_v4();
        let recipe_b = Uuid::new_v4();
        let now = Utc::now();
        let list = ShoppingListDto {
            id: Uuid::new_v4(),
            name: "weekly".to_string(),
            created_at: now,
            updated_at: now,
            recipe_ids: vec![recipe_a, recipe_b],
            items: vec![
                ShoppingListItemDto {
                    id: Uuid::new_v4(),
                    name: "chicken".to_string(),
                    total_amount: Some("500g".to_string()),
                    category: Some("Meat".to_string()),
                    is_checked: true,
                    breakdowns: vec![
                        ShoppingListItemBreakdownDto {
                            id: Uuid::new_v4(),
                            amount: Some("200g".to_string()),
                            source_recipe_id: recipe_a,
                            source_recipe_title: "Curry, mild".to_string(),
                        },
                        ShoppingListItemBreakdownDto {
                            id: Uuid::new_v4(),
                            amount: Some("300g".to_string()),
                            source_recipe_id: recipe_b,
                            source_recipe_title: "Stir fry".to_string(),
                        },
                    ],
                },
                ShoppingListItemDto {
                    id: Uuid::new_v4(),
                    name: "salt".to_string(),
                    total_amount: None,
                    category: None,
                    is_checked: false,
                    breakdowns: Vec::new(),
                },
            ],
        };

        let mut out = Vec::new();
        write_shopping_list_csv(&list, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Item,Total,Category,Checked,Recipe,Amount,Recipe ID");
        assert_eq!(
            lines[1],
            format!("chicken,500g,Meat,yes,\"Curry, mild\",200g,{recipe_a}")
        );
        assert_eq!(lines[2], format!("chicken,500g,Meat,yes,Stir fry,300g,{recipe_b}"));
        assert_eq!(lines[3], "salt,,,no,,,");
    }
}
