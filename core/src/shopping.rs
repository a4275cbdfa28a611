//! Shopping-list aggregation.
//!
//! Ingredients from several recipes are grouped by normalized name into one
//! line item each, with one breakdown per contributing recipe. This module is
//! pure; [`Database::create_shopping_list`](crate::db::Database::create_shopping_list)
//! loads the recipes and persists the resulting draft.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::models::Recipe;

#[derive(Debug, Clone, PartialEq)]
pub struct DraftBreakdown {
    pub amount: Option<String>,
    pub source_recipe_id: Uuid,
    pub source_recipe_title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    /// First-seen spelling of the ingredient, trimmed.
    pub name: String,
    /// Grouping key, see [`normalize_ingredient_name`].
    pub name_key: String,
    pub total_amount: Option<String>,
    pub breakdowns: Vec<DraftBreakdown>,
}

/// A shopping list that has been computed but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingListDraft {
    pub name: String,
    pub recipe_ids: Vec<Uuid>,
    pub items: Vec<DraftItem>,
}

/// Grouping key for ingredient names: trimmed, internal whitespace collapsed
/// to single spaces, lowercased.
#[must_use]
pub fn normalize_ingredient_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split an amount like `"200g"`, `"1/2 cup"` or `"3"` into its number and
/// unit. Returns `None` when there is no leading number (`"a pinch"`) or when
/// the unit does not start with a letter (`"2-3 cloves"`, `"1 1/2 cups"`,
/// `"1,5kg"`).
#[must_use]
pub fn parse_amount(amount: &str) -> Option<(f64, &str, bool)> {
    let amount = amount.trim();
    let split = amount
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '/'))
        .unwrap_or(amount.len());
    let (number, rest) = amount.split_at(split);
    if number.is_empty() {
        return None;
    }

    let value = if let Some((num, den)) = number.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        num / den
    } else {
        number.parse().ok()?
    };

    // Ranges, mixed fractions and decimal commas leave a unit that starts
    // with a digit or punctuation; those amounts are not numeric.
    let unit = rest.trim();
    if unit
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii() && !c.is_ascii_alphabetic())
    {
        return None;
    }

    let spaced = rest.starts_with(char::is_whitespace);
    Some((value, unit, spaced))
}

fn format_quantity(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    format!("{rounded}")
}

/// Combine the amounts listed for one ingredient.
///
/// A single amount is kept verbatim. Several amounts that all carry the same
/// unit are summed; anything else is joined with `" + "` in input order.
/// Missing amounts never take part in a sum. Units are never converted.
#[must_use]
pub fn combine_amounts(amounts: &[Option<&str>]) -> Option<String> {
    let present: Vec<&str> = amounts
        .iter()
        .flatten()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect();

    match present.as_slice() {
        [] => return None,
        [only] if amounts.len() == 1 => return Some((*only).to_string()),
        _ => {}
    }

    if present.len() == amounts.len() {
        let parsed: Option<Vec<(f64, &str, bool)>> =
            present.iter().map(|a| parse_amount(a)).collect();
        if let Some(parsed) = parsed {
            let (_, unit, spaced) = parsed[0];
            if parsed.iter().all(|(_, u, _)| u.eq_ignore_ascii_case(unit)) {
                let total: f64 = parsed.iter().map(|(v, _, _)| v).sum();
                let quantity = format_quantity(total);
                return Some(match (unit.is_empty(), spaced) {
                    (true, _) => quantity,
                    (false, true) => format!("{quantity} {unit}"),
                    (false, false) => format!("{quantity}{unit}"),
                });
            }
        }
    }

    Some(present.join(" + "))
}

struct PendingBreakdown<'a> {
    recipe: &'a Recipe,
    amounts: Vec<Option<&'a str>>,
}

struct PendingItem<'a> {
    name: String,
    name_key: String,
    breakdowns: Vec<PendingBreakdown<'a>>,
}

/// Group the ingredients of `recipes` into shopping-list items.
///
/// Items come out in first-seen order of their normalized names, scanning
/// recipes in the given order and ingredients in display order. A recipe that
/// lists the same ingredient twice contributes a single breakdown. Recipes
/// repeated in `recipes` are only counted once.
#[must_use]
pub fn build_draft(name: &str, recipes: &[Recipe]) -> ShoppingListDraft {
    let mut seen_recipes = HashSet::new();
    let mut recipe_ids = Vec::new();
    let mut items: Vec<PendingItem<'_>> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for recipe in recipes {
        if !seen_recipes.insert(recipe.id) {
            continue;
        }
        recipe_ids.push(recipe.id);

        for ingredient in recipe.ingredients() {
            let key = normalize_ingredient_name(&ingredient.name);
            if key.is_empty() {
                continue;
            }
            let idx = *by_key.entry(key.clone()).or_insert_with(|| {
                items.push(PendingItem {
                    name: ingredient.name.trim().to_string(),
                    name_key: key,
                    breakdowns: Vec::new(),
                });
                items.len() - 1
            });

            let item = &mut items[idx];
            let amount = ingredient.amount.as_deref();
            match item.breakdowns.last_mut() {
                Some(b) if b.recipe.id == recipe.id => b.amounts.push(amount),
                _ => item.breakdowns.push(PendingBreakdown {
                    recipe,
                    amounts: vec![amount],
                }),
            }
        }
    }

    let items = items
        .into_iter()
        .map(|item| {
            let breakdowns: Vec<DraftBreakdown> = item
                .breakdowns
                .into_iter()
                .map(|b| DraftBreakdown {
                    amount: combine_amounts(&b.amounts),
                    source_recipe_id: b.recipe.id,
                    source_recipe_title: b.recipe.title.clone(),
                })
                .collect();
            let amounts: Vec<Option<&str>> =
                breakdowns.iter().map(|b| b.amount.as_deref()).collect();
            DraftItem {
                name: item.name,
                name_key: item.name_key,
                total_amount: combine_amounts(&amounts),
                breakdowns,
            }
        })
        .collect();

    ShoppingListDraft {
        name: name.to_string(),
        recipe_ids,
        items,
    }
}
