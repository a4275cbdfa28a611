mod category;
mod helpers;
mod list;
mod recipe;
mod reset;

pub(crate) use category::{
    cmd_category_add, cmd_category_create, cmd_category_delete, cmd_category_list,
    cmd_category_remove, cmd_category_rename,
};
pub(crate) use list::{
    cmd_list_all, cmd_list_check, cmd_list_create, cmd_list_delete, cmd_list_export,
    cmd_list_rename, cmd_list_show, cmd_list_tag,
};
pub(crate) use recipe::{
    cmd_recipe_delete, cmd_recipe_import, cmd_recipe_import_cook, cmd_recipe_list,
    cmd_recipe_show,
};
pub(crate) use reset::cmd_reset;
