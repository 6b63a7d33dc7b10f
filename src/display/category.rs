//! Category display formatting

use crate::ledger::CategoryTree;
use crate::models::{Category, CategoryId};

/// Format the hierarchy as an indented tree, children under their parents
pub fn format_category_tree(tree: &CategoryTree) -> String {
    if tree.is_empty() {
        return "No categories found.\n\nRun 'isave category add <NAME>' to create one.\n"
            .to_string();
    }

    let mut output = String::new();
    for root in tree.roots() {
        output.push_str(&category_line(root));
        output.push('\n');
        write_children(tree, root.id, "", &mut output);
    }
    output
}

fn write_children(tree: &CategoryTree, parent: CategoryId, indent: &str, output: &mut String) {
    let children: Vec<&Category> = tree.children(parent).collect();
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{}{}{}\n", indent, branch, category_line(child)));

        let next_indent = format!("{}{}", indent, if is_last { "    " } else { "│   " });
        write_children(tree, child.id, &next_indent, output);
    }
}

fn category_line(category: &Category) -> String {
    let mut line = category.name.clone();
    if let Some(limit) = category.monthly_limit {
        line.push_str(&format!(" (limit: {})", limit));
    }
    if category.archived {
        line.push_str(" [archived]");
    }
    line
}

/// Format category details, including the inherited limit
pub fn format_category_details(tree: &CategoryTree, category: &Category) -> String {
    let mut output = String::new();
    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("ID:       {}\n", category.id));

    let parent = category
        .parent_id
        .and_then(|id| tree.get(id))
        .map_or("(top level)".to_string(), |p| p.name.clone());
    output.push_str(&format!("Parent:   {}\n", parent));

    match (category.monthly_limit, tree.effective_limit(category.id).ok().flatten()) {
        (Some(own), _) => output.push_str(&format!("Limit:    {}\n", own)),
        (None, Some(inherited)) => {
            output.push_str(&format!("Limit:    {} (inherited)\n", inherited))
        }
        (None, None) => output.push_str("Limit:    none\n"),
    }

    if category.archived {
        output.push_str("Status:   archived\n");
    }
    output
}
