mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_category_add, cmd_category_create, cmd_category_delete, cmd_category_list,
    cmd_category_remove, cmd_category_rename, cmd_list_all, cmd_list_check, cmd_list_create,
    cmd_list_delete, cmd_list_export, cmd_list_rename, cmd_list_show, cmd_list_tag,
    cmd_recipe_delete, cmd_recipe_import, cmd_recipe_import_cook, cmd_recipe_list,
    cmd_recipe_show, cmd_reset,
};
use crate::config::Config;
use basket_core::BasketService;

#[derive(Parser)]
#[command(
    name = "basket",
    version,
    about = "A local-first recipe box and shopping list builder"
)]
struct Cli {
    /// Database file (default: platform data directory)
    #[arg(long, global = true, env = "BASKET_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Manage recipe categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Build and work through shopping lists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Delete every recipe, category and shopping list
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Import recipes from a JSON seed file
    Import {
        /// Path to the seed file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a recipe's ingredients from a Cooklang (.cook) file
    ImportCook {
        /// Path to the .cook file
        file: PathBuf,
        /// Title override (defaults to metadata title or filename)
        #[arg(long)]
        title: Option<String>,
        /// Servings override (defaults to metadata servings)
        #[arg(long)]
        servings: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all recipes
    List {
        /// Only recipes in this category (id)
        #[arg(short, long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe with its ingredients and steps
    Show {
        /// Recipe id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe
    Delete {
        /// Recipe id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Create a category
    Create {
        /// Category name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a category
    Rename {
        /// Category id
        id: String,
        /// New name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a category (its recipes are kept)
    Delete {
        /// Category id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List categories with recipe counts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a recipe to a category
    Add {
        /// Recipe id
        recipe: String,
        /// Category id
        category: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a recipe from a category
    Remove {
        /// Recipe id
        recipe: String,
        /// Category id
        category: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Build a shopping list from recipes
    Create {
        /// List name
        name: String,
        /// Recipe ids to aggregate
        recipes: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a shopping list
    Show {
        /// Shopping list id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all shopping lists
    All {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a shopping list
    Delete {
        /// Shopping list id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a shopping list
    Rename {
        /// Shopping list id
        id: String,
        /// New name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark an item as bought
    Check {
        /// Item id
        item: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark an item as not bought
    Uncheck {
        /// Item id
        item: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set or clear an item's aisle category
    Tag {
        /// Item id
        item: String,
        /// Category label (omit to clear)
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a shopping list as CSV (stdout unless --output is given)
    Export {
        /// Shopping list id
        id: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BASKET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    tracing::debug!(path = %config.db_path.display(), "using database");
    let service = BasketService::open(&config.db_path)?;
    let service = &service;

    match cli.command {
        Commands::Recipe { command } => match command {
            RecipeCommands::Import { file, json } => cmd_recipe_import(service, &file, json).await,
            RecipeCommands::ImportCook {
                file,
                title,
                servings,
                json,
            } => cmd_recipe_import_cook(service, &file, title, servings, json).await,
            RecipeCommands::List { category, json } => {
                cmd_recipe_list(service, category.as_deref(), json).await
            }
            RecipeCommands::Show { id, json } => cmd_recipe_show(service, &id, json).await,
            RecipeCommands::Delete { id, json } => cmd_recipe_delete(service, &id, json).await,
        },
        Commands::Category { command } => match command {
            CategoryCommands::Create { name, json } => {
                cmd_category_create(service, &name, json).await
            }
            CategoryCommands::Rename { id, name, json } => {
                cmd_category_rename(service, &id, &name, json).await
            }
            CategoryCommands::Delete { id, json } => cmd_category_delete(service, &id, json).await,
            CategoryCommands::List { json } => cmd_category_list(service, json).await,
            CategoryCommands::Add {
                recipe,
                category,
                json,
            } => cmd_category_add(service, &recipe, &category, json).await,
            CategoryCommands::Remove {
                recipe,
                category,
                json,
            } => cmd_category_remove(service, &recipe, &category, json).await,
        },
        Commands::List { command } => match command {
            ListCommands::Create {
                name,
                recipes,
                json,
            } => cmd_list_create(service, &name, &recipes, json).await,
            ListCommands::Show { id, json } => cmd_list_show(service, &id, json).await,
            ListCommands::All { json } => cmd_list_all(service, json).await,
            ListCommands::Delete { id, json } => cmd_list_delete(service, &id, json).await,
            ListCommands::Rename { id, name, json } => {
                cmd_list_rename(service, &id, &name, json).await
            }
            ListCommands::Check { item, json } => cmd_list_check(service, &item, true, json).await,
            ListCommands::Uncheck { item, json } => {
                cmd_list_check(service, &item, false, json).await
            }
            ListCommands::Tag {
                item,
                category,
                json,
            } => cmd_list_tag(service, &item, category.as_deref(), json).await,
            ListCommands::Export { id, output, json } => {
                cmd_list_export(service, &id, output.as_deref(), json).await
            }
        },
        Commands::Reset { yes, json } => cmd_reset(service, yes, json).await,
    }
}
