use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::convert::{
    IngredientRecord, IngredientSectionRecord, RecipeRecord, RecipeRecords, StepRecord,
    StepSectionRecord, recipe_from_records, recipe_to_records,
};
use crate::error::{BasketError, Result};
use crate::models::{
    CategoryIndex, Recipe, RecipeCategory, ShoppingListDto, ShoppingListItemBreakdownDto,
    ShoppingListItemDto, validate_category_name, validate_list_name,
};
use crate::shopping::{ShoppingListDraft, build_draft};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.migrate()?;
        debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    #[allow(clippy::too_many_lines)]
    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS recipes (
                    id TEXT PRIMARY KEY NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT,
                    servings INTEGER,
                    source_url TEXT,
                    image_refs TEXT NOT NULL DEFAULT '[]',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS ingredient_sections (
                    id TEXT PRIMARY KEY NOT NULL,
                    recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    header TEXT,
                    sort_order INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS ingredients (
                    id TEXT PRIMARY KEY NOT NULL,
                    section_id TEXT NOT NULL REFERENCES ingredient_sections(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    amount TEXT,
                    is_modified INTEGER NOT NULL DEFAULT 0,
                    sort_order INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS step_sections (
                    id TEXT PRIMARY KEY NOT NULL,
                    recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    header TEXT,
                    sort_order INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS cooking_steps (
                    id TEXT PRIMARY KEY NOT NULL,
                    section_id TEXT NOT NULL REFERENCES step_sections(id) ON DELETE CASCADE,
                    step_number INTEGER NOT NULL,
                    instruction TEXT NOT NULL,
                    image_refs TEXT NOT NULL DEFAULT '[]',
                    is_modified INTEGER NOT NULL DEFAULT 0,
                    sort_order INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS recipe_categories (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS recipe_category_links (
                    category_id TEXT NOT NULL REFERENCES recipe_categories(id) ON DELETE CASCADE,
                    recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    PRIMARY KEY (category_id, recipe_id)
                );

                CREATE TABLE IF NOT EXISTS shopping_lists (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS shopping_list_recipes (
                    list_id TEXT NOT NULL REFERENCES shopping_lists(id) ON DELETE CASCADE,
                    recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    sort_order INTEGER NOT NULL,
                    PRIMARY KEY (list_id, recipe_id)
                );

                CREATE TABLE IF NOT EXISTS shopping_list_items (
                    id TEXT PRIMARY KEY NOT NULL,
                    list_id TEXT NOT NULL REFERENCES shopping_lists(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    name_key TEXT NOT NULL,
                    total_amount TEXT,
                    category TEXT,
                    is_checked INTEGER NOT NULL DEFAULT 0,
                    sort_order INTEGER NOT NULL,
                    UNIQUE (list_id, name_key)
                );

                -- source_recipe_id is a historical snapshot, deliberately not a foreign key
                CREATE TABLE IF NOT EXISTS shopping_list_item_breakdowns (
                    id TEXT PRIMARY KEY NOT NULL,
                    item_id TEXT NOT NULL REFERENCES shopping_list_items(id) ON DELETE CASCADE,
                    amount TEXT,
                    source_recipe_id TEXT NOT NULL,
                    source_recipe_title TEXT NOT NULL,
                    sort_order INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_ingredient_sections_recipe ON ingredient_sections(recipe_id);
                CREATE INDEX IF NOT EXISTS idx_ingredients_section ON ingredients(section_id);
                CREATE INDEX IF NOT EXISTS idx_step_sections_recipe ON step_sections(recipe_id);
                CREATE INDEX IF NOT EXISTS idx_cooking_steps_section ON cooking_steps(section_id);
                CREATE INDEX IF NOT EXISTS idx_category_links_recipe ON recipe_category_links(recipe_id);
                CREATE INDEX IF NOT EXISTS idx_list_recipes_recipe ON shopping_list_recipes(recipe_id);
                CREATE INDEX IF NOT EXISTS idx_list_items_list ON shopping_list_items(list_id);
                CREATE INDEX IF NOT EXISTS idx_breakdowns_item ON shopping_list_item_breakdowns(item_id);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn uuid_at(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Uuid> {
        let raw: String = row.get(idx)?;
        Uuid::parse_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn timestamp_at(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
        let raw: String = row.get(idx)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    // Malformed JSON is treated like an empty list; bad entries are dropped
    // later by the converter.
    fn image_refs_at(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Vec<String>> {
        let raw: String = row.get(idx)?;
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    fn category_from_row(row: &rusqlite::Row) -> rusqlite::Result<RecipeCategory> {
        Ok(RecipeCategory {
            id: Self::uuid_at(row, 0)?,
            name: row.get(1)?,
            created_at: Self::timestamp_at(row, 2)?,
        })
    }

    fn ids_from(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Uuid>> {
        let mut stmt = conn.prepare(sql)?;
        let ids = stmt
            .query_map(params, |row| Self::uuid_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    // --- Recipes ---

    /// Insert or overwrite a recipe with all of its sections, atomically.
    ///
    /// The recipe row is updated in place, so category links and shopping
    /// list references to it survive an overwrite. Section rows are replaced.
    pub fn save_recipe(&self, recipe: &Recipe) -> Result<()> {
        let records = recipe_to_records(recipe);
        let tx = self.conn.unchecked_transaction()?;

        let r = &records.recipe;
        tx.execute(
            "INSERT INTO recipes (id, title, description, servings, source_url, image_refs, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                servings = excluded.servings,
                source_url = excluded.source_url,
                image_refs = excluded.image_refs,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                r.id.to_string(),
                r.title,
                r.description,
                r.servings,
                r.source_url,
                serde_json::to_string(&r.image_refs)?,
                r.created_at.to_rfc3339(),
                r.updated_at.to_rfc3339(),
            ],
        )?;

        Self::delete_recipe_sections(&tx, recipe.id)?;
        Self::insert_recipe_sections(&tx, &records)?;
        tx.commit()?;

        debug!(
            recipe_id = %recipe.id,
            ingredients = records.ingredients.len(),
            steps = records.steps.len(),
            "saved recipe"
        );
        Ok(())
    }

    fn delete_recipe_sections(tx: &Transaction, recipe_id: Uuid) -> Result<()> {
        let id = recipe_id.to_string();
        tx.execute(
            "DELETE FROM ingredients WHERE section_id IN (
                SELECT id FROM ingredient_sections WHERE recipe_id = ?1
            )",
            params![id],
        )?;
        tx.execute(
            "DELETE FROM ingredient_sections WHERE recipe_id = ?1",
            params![id],
        )?;
        tx.execute(
            "DELETE FROM cooking_steps WHERE section_id IN (
                SELECT id FROM step_sections WHERE recipe_id = ?1
            )",
            params![id],
        )?;
        tx.execute("DELETE FROM step_sections WHERE recipe_id = ?1", params![id])?;
        Ok(())
    }

    fn insert_recipe_sections(tx: &Transaction, records: &RecipeRecords) -> Result<()> {
        for s in &records.ingredient_sections {
            tx.execute(
                "INSERT INTO ingredient_sections (id, recipe_id, header, sort_order) VALUES (?1, ?2, ?3, ?4)",
                params![s.id.to_string(), s.recipe_id.to_string(), s.header, s.sort_order],
            )?;
        }
        for i in &records.ingredients {
            tx.execute(
                "INSERT INTO ingredients (id, section_id, name, amount, is_modified, sort_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    i.id.to_string(),
                    i.section_id.to_string(),
                    i.name,
                    i.amount,
                    i.is_modified,
                    i.sort_order,
                ],
            )?;
        }
        for s in &records.step_sections {
            tx.execute(
                "INSERT INTO step_sections (id, recipe_id, header, sort_order) VALUES (?1, ?2, ?3, ?4)",
                params![s.id.to_string(), s.recipe_id.to_string(), s.header, s.sort_order],
            )?;
        }
        for s in &records.steps {
            tx.execute(
                "INSERT INTO cooking_steps (id, section_id, step_number, instruction, image_refs, is_modified, sort_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    s.id.to_string(),
                    s.section_id.to_string(),
                    s.step_number,
                    s.instruction,
                    serde_json::to_string(&s.image_refs)?,
                    s.is_modified,
                    s.sort_order,
                ],
            )?;
        }
        Ok(())
    }

    pub fn recipe_exists(&self, id: Uuid) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM recipes WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn get_recipe(&self, id: Uuid) -> Result<Option<Recipe>> {
        let key = id.to_string();
        let recipe = self
            .conn
            .query_row(
                "SELECT id, title, description, servings, source_url, image_refs, created_at, updated_at
                 FROM recipes WHERE id = ?1",
                params![key],
                |row| {
                    Ok(RecipeRecord {
                        id: Self::uuid_at(row, 0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        servings: row.get(3)?,
                        source_url: row.get(4)?,
                        image_refs: Self::image_refs_at(row, 5)?,
                        created_at: Self::timestamp_at(row, 6)?,
                        updated_at: Self::timestamp_at(row, 7)?,
                    })
                },
            )
            .optional()?;
        let Some(recipe) = recipe else {
            return Ok(None);
        };

        let ingredient_sections = {
            let mut stmt = self.conn.prepare(
                "SELECT id, recipe_id, header, sort_order FROM ingredient_sections WHERE recipe_id = ?1",
            )?;
            stmt.query_map(params![key], |row| {
                Ok(IngredientSectionRecord {
                    id: Self::uuid_at(row, 0)?,
                    recipe_id: Self::uuid_at(row, 1)?,
                    header: row.get(2)?,
                    sort_order: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        };

        let ingredients = {
            let mut stmt = self.conn.prepare(
                "SELECT i.id, i.section_id, i.name, i.amount, i.is_modified, i.sort_order
                 FROM ingredients i
                 JOIN ingredient_sections s ON i.section_id = s.id
                 WHERE s.recipe_id = ?1",
            )?;
            stmt.query_map(params![key], |row| {
                Ok(IngredientRecord {
                    id: Self::uuid_at(row, 0)?,
                    section_id: Self::uuid_at(row, 1)?,
                    name: row.get(2)?,
                    amount: row.get(3)?,
                    is_modified: row.get(4)?,
                    sort_order: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        };

        let step_sections = {
            let mut stmt = self.conn.prepare(
                "SELECT id, recipe_id, header, sort_order FROM step_sections WHERE recipe_id = ?1",
            )?;
            stmt.query_map(params![key], |row| {
                Ok(StepSectionRecord {
                    id: Self::uuid_at(row, 0)?,
                    recipe_id: Self::uuid_at(row, 1)?,
                    header: row.get(2)?,
                    sort_order: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        };

        let steps = {
            let mut stmt = self.conn.prepare(
                "SELECT c.id, c.section_id, c.step_number, c.instruction, c.image_refs, c.is_modified, c.sort_order
                 FROM cooking_steps c
                 JOIN step_sections s ON c.section_id = s.id
                 WHERE s.recipe_id = ?1",
            )?;
            stmt.query_map(params![key], |row| {
                Ok(StepRecord {
                    id: Self::uuid_at(row, 0)?,
                    section_id: Self::uuid_at(row, 1)?,
                    step_number: row.get(2)?,
                    instruction: row.get(3)?,
                    image_refs: Self::image_refs_at(row, 4)?,
                    is_modified: row.get(5)?,
                    sort_order: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(Some(recipe_from_records(RecipeRecords {
            recipe,
            ingredient_sections,
            ingredients,
            step_sections,
            steps,
        })))
    }

    /// All recipes in the order they were first saved.
    pub fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let ids = Self::ids_from(&self.conn, "SELECT id FROM recipes ORDER BY rowid", [])?;
        let mut recipes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(recipe) = self.get_recipe(id)? {
                recipes.push(recipe);
            }
        }
        Ok(recipes)
    }

    /// Delete a recipe and its sections. Category links and shopping list
    /// references to it are dropped; categories, lists, items and breakdowns
    /// are left alone.
    pub fn delete_recipe(&self, id: Uuid) -> Result<()> {
        if !self.recipe_exists(id)? {
            return Err(BasketError::RecipeNotFound(id));
        }
        let key = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        Self::delete_recipe_sections(&tx, id)?;
        tx.execute(
            "DELETE FROM recipe_category_links WHERE recipe_id = ?1",
            params![key],
        )?;
        tx.execute(
            "DELETE FROM shopping_list_recipes WHERE recipe_id = ?1",
            params![key],
        )?;
        tx.execute("DELETE FROM recipes WHERE id = ?1", params![key])?;
        tx.commit()?;
        debug!(recipe_id = %id, "deleted recipe");
        Ok(())
    }

    // --- Categories ---

    pub fn create_category(&self, name: &str) -> Result<RecipeCategory> {
        let name = validate_category_name(name)?;
        let category = RecipeCategory {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO recipe_categories (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![
                category.id.to_string(),
                category.name,
                category.created_at.to_rfc3339()
            ],
        )?;
        debug!(category_id = %category.id, name = %category.name, "created category");
        Ok(category)
    }

    pub fn get_category(&self, id: Uuid) -> Result<Option<RecipeCategory>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM recipe_categories WHERE id = ?1",
                params![id.to_string()],
                Self::category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    pub fn rename_category(&self, id: Uuid, new_name: &str) -> Result<RecipeCategory> {
        let Some(mut category) = self.get_category(id)? else {
            return Err(BasketError::CategoryNotFound(id));
        };
        category.name = validate_category_name(new_name)?;
        self.conn.execute(
            "UPDATE recipe_categories SET name = ?1 WHERE id = ?2",
            params![category.name, id.to_string()],
        )?;
        Ok(category)
    }

    /// Delete a category and its links. Tagged recipes are untouched.
    pub fn delete_category(&self, id: Uuid) -> Result<()> {
        if self.get_category(id)?.is_none() {
            return Err(BasketError::CategoryNotFound(id));
        }
        let key = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM recipe_category_links WHERE category_id = ?1",
            params![key],
        )?;
        tx.execute("DELETE FROM recipe_categories WHERE id = ?1", params![key])?;
        tx.commit()?;
        debug!(category_id = %id, "deleted category");
        Ok(())
    }

    /// Link a recipe to a category. Linking an already linked pair is a no-op.
    pub fn add_recipe_to_category(&self, recipe_id: Uuid, category_id: Uuid) -> Result<()> {
        if !self.recipe_exists(recipe_id)? {
            return Err(BasketError::RecipeNotFound(recipe_id));
        }
        if self.get_category(category_id)?.is_none() {
            return Err(BasketError::CategoryNotFound(category_id));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO recipe_category_links (category_id, recipe_id) VALUES (?1, ?2)",
            params![category_id.to_string(), recipe_id.to_string()],
        )?;
        Ok(())
    }

    pub fn remove_recipe_from_category(&self, recipe_id: Uuid, category_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM recipe_category_links WHERE category_id = ?1 AND recipe_id = ?2",
            params![category_id.to_string(), recipe_id.to_string()],
        )?;
        Ok(())
    }

    pub fn load_all_categories(&self) -> Result<CategoryIndex> {
        let categories = {
            let mut stmt = self
                .conn
                .prepare("SELECT id, name, created_at FROM recipe_categories ORDER BY rowid")?;
            stmt.query_map([], Self::category_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };

        let mut recipes_by_category: HashMap<Uuid, HashSet<Uuid>> = categories
            .iter()
            .map(|c| (c.id, HashSet::new()))
            .collect();

        let mut stmt = self
            .conn
            .prepare("SELECT category_id, recipe_id FROM recipe_category_links")?;
        let links = stmt
            .query_map([], |row| Ok((Self::uuid_at(row, 0)?, Self::uuid_at(row, 1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for (category_id, recipe_id) in links {
            recipes_by_category
                .entry(category_id)
                .or_default()
                .insert(recipe_id);
        }

        Ok(CategoryIndex {
            categories,
            recipes_by_category,
        })
    }

    // --- Shopping lists ---

    /// Aggregate the given recipes into a new shopping list and store it.
    ///
    /// Fails with `RecipeNotFound` on the first id that does not exist; nothing
    /// is written in that case. An empty id list produces an empty list.
    pub fn create_shopping_list(&self, name: &str, recipe_ids: &[Uuid]) -> Result<ShoppingListDto> {
        let name = validate_list_name(name)?;
        let mut recipes = Vec::with_capacity(recipe_ids.len());
        for &id in recipe_ids {
            let recipe = self
                .get_recipe(id)?
                .ok_or(BasketError::RecipeNotFound(id))?;
            recipes.push(recipe);
        }

        let draft = build_draft(&name, &recipes);
        let list = self.insert_shopping_list(&draft)?;
        info!(
            list_id = %list.id,
            recipes = list.recipe_ids.len(),
            items = list.items.len(),
            "created shopping list"
        );
        Ok(list)
    }

    /// Persist a computed draft as a new list with fresh ids.
    fn insert_shopping_list(&self, draft: &ShoppingListDraft) -> Result<ShoppingListDto> {
        let now = Utc::now();
        let list_id = Uuid::new_v4();
        let list_key = list_id.to_string();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO shopping_lists (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![list_key, draft.name, now.to_rfc3339(), now.to_rfc3339()],
        )?;

        for (order, recipe_id) in draft.recipe_ids.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO shopping_list_recipes (list_id, recipe_id, sort_order) VALUES (?1, ?2, ?3)",
                params![list_key, recipe_id.to_string(), order],
            )?;
        }

        let mut items = Vec::with_capacity(draft.items.len());
        for (order, item) in draft.items.iter().enumerate() {
            let item_id = Uuid::new_v4();
            tx.execute(
                "INSERT INTO shopping_list_items (id, list_id, name, name_key, total_amount, category, is_checked, sort_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL, 0, ?6)",
                params![
                    item_id.to_string(),
                    list_key,
                    item.name,
                    item.name_key,
                    item.total_amount,
                    order,
                ],
            )?;

            let mut breakdowns = Vec::with_capacity(item.breakdowns.len());
            for (b_order, b) in item.breakdowns.iter().enumerate() {
                let breakdown_id = Uuid::new_v4();
                tx.execute(
                    "INSERT INTO shopping_list_item_breakdowns (id, item_id, amount, source_recipe_id, source_recipe_title, sort_order)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        breakdown_id.to_string(),
                        item_id.to_string(),
                        b.amount,
                        b.source_recipe_id.to_string(),
                        b.source_recipe_title,
                        b_order,
                    ],
                )?;
                breakdowns.push(ShoppingListItemBreakdownDto {
                    id: breakdown_id,
                    amount: b.amount.clone(),
                    source_recipe_id: b.source_recipe_id,
                    source_recipe_title: b.source_recipe_title.clone(),
                });
            }

            items.push(ShoppingListItemDto {
                id: item_id,
                name: item.name.clone(),
                total_amount: item.total_amount.clone(),
                category: None,
                is_checked: false,
                breakdowns,
            });
        }
        tx.commit()?;

        Ok(ShoppingListDto {
            id: list_id,
            name: draft.name.clone(),
            created_at: now,
            updated_at: now,
            recipe_ids: draft.recipe_ids.clone(),
            items,
        })
    }

    pub fn get_shopping_list(&self, id: Uuid) -> Result<Option<ShoppingListDto>> {
        let key = id.to_string();
        let header = self
            .conn
            .query_row(
                "SELECT name, created_at, updated_at FROM shopping_lists WHERE id = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        Self::timestamp_at(row, 1)?,
                        Self::timestamp_at(row, 2)?,
                    ))
                },
            )
            .optional()?;
        let Some((name, created_at, updated_at)) = header else {
            return Ok(None);
        };

        let recipe_ids = Self::ids_from(
            &self.conn,
            "SELECT recipe_id FROM shopping_list_recipes WHERE list_id = ?1 ORDER BY sort_order",
            params![key],
        )?;

        let mut breakdowns_by_item: HashMap<Uuid, Vec<ShoppingListItemBreakdownDto>> =
            HashMap::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT b.item_id, b.id, b.amount, b.source_recipe_id, b.source_recipe_title
                 FROM shopping_list_item_breakdowns b
                 JOIN shopping_list_items i ON b.item_id = i.id
                 WHERE i.list_id = ?1
                 ORDER BY b.item_id, b.sort_order",
            )?;
            let rows = stmt.query_map(params![key], |row| {
                Ok((
                    Self::uuid_at(row, 0)?,
                    ShoppingListItemBreakdownDto {
                        id: Self::uuid_at(row, 1)?,
                        amount: row.get(2)?,
                        source_recipe_id: Self::uuid_at(row, 3)?,
                        source_recipe_title: row.get(4)?,
                    },
                ))
            })?;
            for row in rows {
                let (item_id, breakdown) = row?;
                breakdowns_by_item.entry(item_id).or_default().push(breakdown);
            }
        }

        let items = {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, total_amount, category, is_checked
                 FROM shopping_list_items WHERE list_id = ?1 ORDER BY sort_order",
            )?;
            stmt.query_map(params![key], |row| {
                Ok(ShoppingListItemDto {
                    id: Self::uuid_at(row, 0)?,
                    name: row.get(1)?,
                    total_amount: row.get(2)?,
                    category: row.get(3)?,
                    is_checked: row.get(4)?,
                    breakdowns: Vec::new(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        };
        let items = items
            .into_iter()
            .map(|mut item| {
                item.breakdowns = breakdowns_by_item.remove(&item.id).unwrap_or_default();
                item
            })
            .collect();

        Ok(Some(ShoppingListDto {
            id,
            name,
            created_at,
            updated_at,
            recipe_ids,
            items,
        }))
    }

    /// All shopping lists in creation order.
    pub fn list_shopping_lists(&self) -> Result<Vec<ShoppingListDto>> {
        let ids = Self::ids_from(&self.conn, "SELECT id FROM shopping_lists ORDER BY rowid", [])?;
        let mut lists = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(list) = self.get_shopping_list(id)? {
                lists.push(list);
            }
        }
        Ok(lists)
    }

    fn shopping_list_exists(&self, id: Uuid) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM shopping_lists WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Delete a list together with its items, their breakdowns and its
    /// recipe references.
    pub fn delete_shopping_list(&self, id: Uuid) -> Result<()> {
        if !self.shopping_list_exists(id)? {
            return Err(BasketError::ShoppingListNotFound(id));
        }
        let key = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM shopping_list_item_breakdowns WHERE item_id IN (
                SELECT id FROM shopping_list_items WHERE list_id = ?1
            )",
            params![key],
        )?;
        tx.execute(
            "DELETE FROM shopping_list_items WHERE list_id = ?1",
            params![key],
        )?;
        tx.execute(
            "DELETE FROM shopping_list_recipes WHERE list_id = ?1",
            params![key],
        )?;
        tx.execute("DELETE FROM shopping_lists WHERE id = ?1", params![key])?;
        tx.commit()?;
        debug!(list_id = %id, "deleted shopping list");
        Ok(())
    }

    /// Rename a list. The name is trimmed and must not be blank.
    pub fn rename_shopping_list(&self, id: Uuid, name: &str) -> Result<ShoppingListDto> {
        let name = validate_list_name(name)?;
        let rows = self.conn.execute(
            "UPDATE shopping_lists SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, Utc::now().to_rfc3339(), id.to_string()],
        )?;
        if rows == 0 {
            return Err(BasketError::ShoppingListNotFound(id));
        }
        self.get_shopping_list(id)?
            .ok_or(BasketError::ShoppingListNotFound(id))
    }

    fn item_state(&self, item_id: Uuid) -> Result<(bool, Option<String>)> {
        self.conn
            .query_row(
                "SELECT is_checked, category FROM shopping_list_items WHERE id = ?1",
                params![item_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or(BasketError::ShoppingItemNotFound(item_id))
    }

    fn touch_item_list(tx: &Transaction, item_key: &str) -> Result<()> {
        tx.execute(
            "UPDATE shopping_lists SET updated_at = ?1
             WHERE id = (SELECT list_id FROM shopping_list_items WHERE id = ?2)",
            params![Utc::now().to_rfc3339(), item_key],
        )?;
        Ok(())
    }

    /// Set an item's checked flag. Writing the current value changes nothing,
    /// not even the list's `updated_at`.
    pub fn set_item_checked(&self, item_id: Uuid, is_checked: bool) -> Result<()> {
        let (current, _) = self.item_state(item_id)?;
        if current == is_checked {
            return Ok(());
        }
        let key = item_id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE shopping_list_items SET is_checked = ?1 WHERE id = ?2",
            params![is_checked, key],
        )?;
        Self::touch_item_list(&tx, &key)?;
        tx.commit()?;
        Ok(())
    }

    /// Tag an item with a category label; blank clears it.
    pub fn set_item_category(&self, item_id: Uuid, category: Option<&str>) -> Result<()> {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);
        let (_, current) = self.item_state(item_id)?;
        if current == category {
            return Ok(());
        }
        let key = item_id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE shopping_list_items SET category = ?1 WHERE id = ?2",
            params![category, key],
        )?;
        Self::touch_item_list(&tx, &key)?;
        tx.commit()?;
        Ok(())
    }

    // --- Reset ---

    /// Remove every recipe, category and shopping list with everything they
    /// own, in one transaction.
    pub fn delete_all_data(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(
            "DELETE FROM shopping_list_item_breakdowns;
             DELETE FROM shopping_list_items;
             DELETE FROM shopping_list_recipes;
             DELETE FROM shopping_lists;
             DELETE FROM recipe_category_links;
             DELETE FROM recipe_categories;
             DELETE FROM ingredients;
             DELETE FROM ingredient_sections;
             DELETE FROM cooking_steps;
             DELETE FROM step_sections;
             DELETE FROM recipes;",
        )?;
        tx.commit()?;
        info!("deleted all recipes, categories and shopping lists");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CookingStep, CookingStepSection, ImageSource, Ingredient, IngredientSection};

    fn recipe_with(title: &str, ingredients: &[(&str, Option<&str>)]) -> Recipe {
        let mut recipe = Recipe::new(title);
        recipe.ingredient_sections.push(IngredientSection {
            header: None,
            ingredients: ingredients
                .iter()
                .map(|(name, amount)| Ingredient {
                    name: (*name).to_string(),
                    amount: amount.map(String::from),
                    is_modified: false,
                })
                .collect(),
        });
        recipe
    }

    fn full_recipe() -> Recipe {
        let mut recipe = recipe_with(
            "Chicken Curry",
            &[("chicken", Some("200g")), ("onion", Some("1"))],
        );
        recipe.description = Some("Weeknight curry".to_string());
        recipe.servings = Some(4);
        recipe.source_url = Some("https://example.com/curry".to_string());
        recipe.images = vec![
            ImageSource::Remote("https://example.com/curry.jpg".to_string()),
            ImageSource::Bitmap(vec![1, 2, 3]),
        ];
        recipe.ingredient_sections.push(IngredientSection {
            header: Some("To serve".to_string()),
            ingredients: vec![Ingredient {
                name: "rice".to_string(),
                amount: None,
                is_modified: true,
            }],
        });
        recipe.step_sections.push(CookingStepSection {
            header: Some("Method".to_string()),
            steps: vec![
                CookingStep {
                    step_number: 1,
                    instruction: "Brown the chicken".to_string(),
                    images: vec![ImageSource::Bundled("step1".to_string())],
                    is_modified: false,
                },
                CookingStep {
                    step_number: 2,
                    instruction: "Add onion and simmer".to_string(),
                    images: vec![ImageSource::LocalFile("/tmp/x.png".into())],
                    is_modified: true,
                },
            ],
        });
        recipe
    }

    fn count(db: &Database, table: &str) -> i64 {
        db.conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_save_and_load_recipe_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let recipe = full_recipe();
        db.save_recipe(&recipe).unwrap();

        let loaded = db.get_recipe(recipe.id).unwrap().unwrap();
        assert_eq!(loaded, recipe.persisted_view());
        assert_eq!(loaded.images.len(), 1);
        assert_eq!(loaded.step_sections[0].steps[0].images.len(), 1);
        assert!(loaded.step_sections[0].steps[1].images.is_empty());
    }

    #[test]
    fn test_round_trip_drops_non_canonical_images() {
        let db = Database::open_in_memory().unwrap();
        let mut recipe = recipe_with("Toast", &[]);
        recipe.images = vec![
            ImageSource::Remote(" https://e.com/a.jpg".to_string()),
            ImageSource::Remote("//cdn.e.com/a.jpg".to_string()),
            ImageSource::Remote("https://e.com/b.jpg".to_string()),
        ];
        db.save_recipe(&recipe).unwrap();

        let loaded = db.get_recipe(recipe.id).unwrap().unwrap();
        assert_eq!(loaded, recipe.persisted_view());
        assert_eq!(
            loaded.images,
            vec![ImageSource::Remote("https://e.com/b.jpg".to_string())]
        );
    }

    #[test]
    fn test_get_missing_recipe_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_recipe(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_save_recipe_overwrites_same_id() {
        let db = Database::open_in_memory().unwrap();
        let mut recipe = full_recipe();
        db.save_recipe(&recipe).unwrap();

        recipe.title = "Chicken Curry v2".to_string();
        recipe.ingredient_sections.truncate(1);
        recipe.step_sections.clear();
        db.save_recipe(&recipe).unwrap();

        let all = db.list_recipes().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], recipe.persisted_view());
        assert_eq!(count(&db, "ingredient_sections"), 1);
        assert_eq!(count(&db, "ingredients"), 2);
        assert_eq!(count(&db, "cooking_steps"), 0);
    }

    #[test]
    fn test_overwrite_keeps_category_links() {
        let db = Database::open_in_memory().unwrap();
        let mut recipe = full_recipe();
        db.save_recipe(&recipe).unwrap();
        let category = db.create_category("Dinner").unwrap();
        db.add_recipe_to_category(recipe.id, category.id).unwrap();

        recipe.title = "Renamed".to_string();
        db.save_recipe(&recipe).unwrap();

        let index = db.load_all_categories().unwrap();
        assert!(index.recipes_in(category.id).unwrap().contains(&recipe.id));
    }

    #[test]
    fn test_list_recipes_in_save_order() {
        let db = Database::open_in_memory().unwrap();
        let a = recipe_with("A", &[]);
        let b = recipe_with("B", &[]);
        db.save_recipe(&a).unwrap();
        db.save_recipe(&b).unwrap();
        db.save_recipe(&a).unwrap();

        let titles: Vec<String> = db
            .list_recipes()
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_delete_recipe_cascades_sections() {
        let db = Database::open_in_memory().unwrap();
        let recipe = full_recipe();
        db.save_recipe(&recipe).unwrap();
        db.delete_recipe(recipe.id).unwrap();

        assert!(db.get_recipe(recipe.id).unwrap().is_none());
        assert_eq!(count(&db, "ingredient_sections"), 0);
        assert_eq!(count(&db, "ingredients"), 0);
        assert_eq!(count(&db, "step_sections"), 0);
        assert_eq!(count(&db, "cooking_steps"), 0);
    }

    #[test]
    fn test_delete_missing_recipe() {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        assert_eq!(db.delete_recipe(id), Err(BasketError::RecipeNotFound(id)));
    }

    #[test]
    fn test_delete_recipe_keeps_categories() {
        let db = Database::open_in_memory().unwrap();
        let recipe = full_recipe();
        db.save_recipe(&recipe).unwrap();
        let category = db.create_category("Dinner").unwrap();
        db.add_recipe_to_category(recipe.id, category.id).unwrap();

        db.delete_recipe(recipe.id).unwrap();

        let index = db.load_all_categories().unwrap();
        assert_eq!(index.categories.len(), 1);
        assert!(index.recipes_in(category.id).unwrap().is_empty());
    }

    #[test]
    fn test_create_category_trims_and_validates() {
        let db = Database::open_in_memory().unwrap();
        let category = db.create_category("  Quick meals ").unwrap();
        assert_eq!(category.name, "Quick meals");
        assert_eq!(
            db.create_category("").unwrap_err(),
            BasketError::InvalidCategoryName
        );
        assert_eq!(
            db.create_category("   ").unwrap_err(),
            BasketError::InvalidCategoryName
        );
        assert_eq!(db.load_all_categories().unwrap().categories.len(), 1);
    }

    #[test]
    fn test_rename_category() {
        let db = Database::open_in_memory().unwrap();
        let category = db.create_category("Dinner").unwrap();
        let renamed = db.rename_category(category.id, "Supper").unwrap();
        assert_eq!(renamed.id, category.id);
        assert_eq!(renamed.name, "Supper");
        assert_eq!(
            db.get_category(category.id).unwrap().unwrap().name,
            "Supper"
        );
    }

    #[test]
    fn test_rename_missing_category() {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        assert_eq!(
            db.rename_category(id, "x").unwrap_err(),
            BasketError::CategoryNotFound(id)
        );
    }

    #[test]
    fn test_rename_category_rejects_blank() {
        let db = Database::open_in_memory().unwrap();
        let category = db.create_category("Dinner").unwrap();
        assert_eq!(
            db.rename_category(category.id, " ").unwrap_err(),
            BasketError::InvalidCategoryName
        );
    }

    #[test]
    fn test_add_recipe_to_category_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let recipe = recipe_with("A", &[]);
        db.save_recipe(&recipe).unwrap();
        let category = db.create_category("Dinner").unwrap();

        db.add_recipe_to_category(recipe.id, category.id).unwrap();
        db.add_recipe_to_category(recipe.id, category.id).unwrap();

        let index = db.load_all_categories().unwrap();
        assert_eq!(index.recipes_in(category.id).unwrap().len(), 1);
        assert_eq!(count(&db, "recipe_category_links"), 1);
    }

    #[test]
    fn test_add_recipe_to_category_requires_both_sides() {
        let db = Database::open_in_memory().unwrap();
        let recipe = recipe_with("A", &[]);
        db.save_recipe(&recipe).unwrap();
        let category = db.create_category("Dinner").unwrap();
        let missing = Uuid::new_v4();

        assert_eq!(
            db.add_recipe_to_category(missing, category.id).unwrap_err(),
            BasketError::RecipeNotFound(missing)
        );
        assert_eq!(
            db.add_recipe_to_category(recipe.id, missing).unwrap_err(),
            BasketError::CategoryNotFound(missing)
        );
    }

    #[test]
    fn test_remove_recipe_from_category() {
        let db = Database::open_in_memory().unwrap();
        let recipe = recipe_with("A", &[]);
        db.save_recipe(&recipe).unwrap();
        let category = db.create_category("Dinner").unwrap();
        db.add_recipe_to_category(recipe.id, category.id).unwrap();

        db.remove_recipe_from_category(recipe.id, category.id)
            .unwrap();
        // Absent link is a no-op
        db.remove_recipe_from_category(recipe.id, category.id)
            .unwrap();

        let index = db.load_all_categories().unwrap();
        assert!(index.recipes_in(category.id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_category_keeps_recipe() {
        let db = Database::open_in_memory().unwrap();
        let recipe = full_recipe();
        db.save_recipe(&recipe).unwrap();
        let dinner = db.create_category("Dinner").unwrap();
        let quick = db.create_category("Quick").unwrap();
        db.add_recipe_to_category(recipe.id, dinner.id).unwrap();

        db.delete_category(dinner.id).unwrap();

        assert_eq!(
            db.get_recipe(recipe.id).unwrap().unwrap(),
            recipe.persisted_view()
        );
        let index = db.load_all_categories().unwrap();
        assert_eq!(index.categories, vec![quick]);
        assert!(index.categories_of(recipe.id).is_empty());
        assert!(index.recipes_in(dinner.id).is_none());
        assert_eq!(count(&db, "recipe_category_links"), 0);
    }

    #[test]
    fn test_delete_missing_category() {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        assert_eq!(
            db.delete_category(id).unwrap_err(),
            BasketError::CategoryNotFound(id)
        );
    }

    #[test]
    fn test_create_shopping_list_groups_ingredients() {
        let db = Database::open_in_memory().unwrap();
        let a = recipe_with("A", &[("chicken", Some("200g"))]);
        let b = recipe_with("B", &[("chicken", Some("300g"))]);
        db.save_recipe(&a).unwrap();
        db.save_recipe(&b).unwrap();

        let list = db.create_shopping_list("weekly", &[a.id, b.id]).unwrap();
        assert_eq!(list.name, "weekly");
        assert_eq!(list.recipe_ids, vec![a.id, b.id]);
        assert_eq!(list.items.len(), 1);

        let item = &list.items[0];
        assert_eq!(item.name, "chicken");
        assert!(!item.is_checked);
        assert_eq!(item.breakdowns.len(), 2);
        assert_eq!(item.breakdowns[0].source_recipe_id, a.id);
        assert_eq!(item.breakdowns[0].amount.as_deref(), Some("200g"));
        assert_eq!(item.breakdowns[1].source_recipe_id, b.id);
        assert_eq!(item.breakdowns[1].amount.as_deref(), Some("300g"));

        let loaded = db.get_shopping_list(list.id).unwrap().unwrap();
        assert_eq!(loaded, list);
    }

    #[test]
    fn test_create_shopping_list_missing_recipe_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let a = recipe_with("A", &[("egg", Some("2"))]);
        db.save_recipe(&a).unwrap();
        let missing = Uuid::new_v4();

        assert_eq!(
            db.create_shopping_list("x", &[a.id, missing]).unwrap_err(),
            BasketError::RecipeNotFound(missing)
        );
        assert!(db.list_shopping_lists().unwrap().is_empty());
    }

    #[test]
    fn test_create_shopping_list_without_recipes() {
        let db = Database::open_in_memory().unwrap();
        let list = db.create_shopping_list("empty", &[]).unwrap();
        assert!(list.items.is_empty());
        assert!(db.get_shopping_list(list.id).unwrap().unwrap().items.is_empty());
    }

    #[test]
    fn test_create_shopping_list_trims_and_rejects_blank_name() {
        let db = Database::open_in_memory().unwrap();
        let list = db.create_shopping_list("  Saturday ", &[]).unwrap();
        assert_eq!(list.name, "Saturday");
        assert_eq!(
            db.create_shopping_list(" ", &[]).unwrap_err(),
            BasketError::InvalidShoppingListName
        );
        assert_eq!(db.list_shopping_lists().unwrap().len(), 1);
    }

    #[test]
    fn test_shopping_list_is_a_snapshot() {
        let db = Database::open_in_memory().unwrap();
        let mut a = recipe_with("Pancakes", &[("flour", Some("200g"))]);
        db.save_recipe(&a).unwrap();
        let list = db.create_shopping_list("brunch", &[a.id]).unwrap();

        a.title = "Crepes".to_string();
        a.ingredient_sections[0].ingredients[0].amount = Some("100g".to_string());
        db.save_recipe(&a).unwrap();

        let loaded = db.get_shopping_list(list.id).unwrap().unwrap();
        let breakdown = &loaded.items[0].breakdowns[0];
        assert_eq!(breakdown.source_recipe_title, "Pancakes");
        assert_eq!(breakdown.amount.as_deref(), Some("200g"));
        assert_eq!(loaded.recipe_ids, vec![a.id]);
    }

    #[test]
    fn test_delete_recipe_nullifies_list_reference() {
        let db = Database::open_in_memory().unwrap();
        let a = recipe_with("A", &[("chicken", Some("200g"))]);
        let b = recipe_with("B", &[("chicken", Some("300g"))]);
        db.save_recipe(&a).unwrap();
        db.save_recipe(&b).unwrap();
        let list = db.create_shopping_list("weekly", &[a.id, b.id]).unwrap();

        db.delete_recipe(a.id).unwrap();

        let loaded = db.get_shopping_list(list.id).unwrap().unwrap();
        assert_eq!(loaded.recipe_ids, vec![b.id]);
        assert_eq!(loaded.items, list.items);
        assert_eq!(loaded.items[0].breakdowns[0].source_recipe_id, a.id);
    }

    #[test]
    fn test_delete_shopping_list_cascades() {
        let db = Database::open_in_memory().unwrap();
        let a = recipe_with("A", &[("chicken", Some("200g")), ("rice", None)]);
        db.save_recipe(&a).unwrap();
        let list = db.create_shopping_list("weekly", &[a.id]).unwrap();

        db.delete_shopping_list(list.id).unwrap();

        assert!(db.get_shopping_list(list.id).unwrap().is_none());
        assert_eq!(count(&db, "shopping_list_items"), 0);
        assert_eq!(count(&db, "shopping_list_item_breakdowns"), 0);
        assert_eq!(count(&db, "shopping_list_recipes"), 0);
        assert!(db.get_recipe(a.id).unwrap().is_some());
        assert_eq!(
            db.delete_shopping_list(list.id).unwrap_err(),
            BasketError::ShoppingListNotFound(list.id)
        );
    }

    #[test]
    fn test_set_item_checked() {
        let db = Database::open_in_memory().unwrap();
        let a = recipe_with("A", &[("egg", Some("2")), ("milk", None)]);
        db.save_recipe(&a).unwrap();
        let list = db.create_shopping_list("x", &[a.id]).unwrap();
        let egg = list.items[0].id;

        db.set_item_checked(egg, true).unwrap();
        let after_first = db.get_shopping_list(list.id).unwrap().unwrap();
        db.set_item_checked(egg, true).unwrap();
        let after_second = db.get_shopping_list(list.id).unwrap().unwrap();

        assert!(after_first.item(egg).unwrap().is_checked);
        assert!(!after_first.items[1].is_checked);
        assert_eq!(after_first, after_second);
        assert_eq!(after_second.checked_count(), 1);

        db.set_item_checked(egg, false).unwrap();
        let unchecked = db.get_shopping_list(list.id).unwrap().unwrap();
        assert!(!unchecked.item(egg).unwrap().is_checked);
    }

    #[test]
    fn test_set_item_checked_missing_item() {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        assert_eq!(
            db.set_item_checked(id, true).unwrap_err(),
            BasketError::ShoppingItemNotFound(id)
        );
    }

    #[test]
    fn test_set_item_category() {
        let db = Database::open_in_memory().unwrap();
        let a = recipe_with("A", &[("egg", Some("2"))]);
        db.save_recipe(&a).unwrap();
        let list = db.create_shopping_list("x", &[a.id]).unwrap();
        let egg = list.items[0].id;

        db.set_item_category(egg, Some(" Dairy ")).unwrap();
        let loaded = db.get_shopping_list(list.id).unwrap().unwrap();
        assert_eq!(loaded.items[0].category.as_deref(), Some("Dairy"));

        db.set_item_category(egg, Some("")).unwrap();
        let loaded = db.get_shopping_list(list.id).unwrap().unwrap();
        assert_eq!(loaded.items[0].category, None);
    }

    #[test]
    fn test_rename_shopping_list() {
        let db = Database::open_in_memory().unwrap();
        let list = db.create_shopping_list("x", &[]).unwrap();
        let renamed = db.rename_shopping_list(list.id, "Saturday").unwrap();
        assert_eq!(renamed.name, "Saturday");
        assert!(renamed.updated_at >= list.updated_at);

        let trimmed = db.rename_shopping_list(list.id, "  Sunday ").unwrap();
        assert_eq!(trimmed.name, "Sunday");
        assert_eq!(
            db.rename_shopping_list(list.id, "   ").unwrap_err(),
            BasketError::InvalidShoppingListName
        );
        assert_eq!(db.get_shopping_list(list.id).unwrap().unwrap().name, "Sunday");

        let missing = Uuid::new_v4();
        assert_eq!(
            db.rename_shopping_list(missing, "y").unwrap_err(),
            BasketError::ShoppingListNotFound(missing)
        );
    }

    #[test]
    fn test_delete_all_data() {
        let db = Database::open_in_memory().unwrap();
        let a = full_recipe();
        db.save_recipe(&a).unwrap();
        let category = db.create_category("Dinner").unwrap();
        db.add_recipe_to_category(a.id, category.id).unwrap();
        db.create_shopping_list("weekly", &[a.id]).unwrap();

        db.delete_all_data().unwrap();

        assert!(db.list_recipes().unwrap().is_empty());
        assert!(db.list_shopping_lists().unwrap().is_empty());
        assert!(db.load_all_categories().unwrap().categories.is_empty());
        for table in [
            "ingredients",
            "cooking_steps",
            "recipe_category_links",
            "shopping_list_items",
            "shopping_list_item_breakdowns",
        ] {
            assert_eq!(count(&db, table), 0, "{table} not empty");
        }
    }

    #[test]
    fn test_open_file_database_persists() {
        let dir = std::env::temp_dir().join(format!("basket-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("basket.db");

        let recipe = full_recipe();
        {
            let db = Database::open(&path).unwrap();
            db.save_recipe(&recipe).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get_recipe(recipe.id).unwrap().unwrap(),
            recipe.persisted_view()
        );

        drop(db);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
