//! Depth-first navigation over the item tree
//!
//! All lookups are pre-order (parent before children) and stop at the first
//! item whose `linkId` matches. A document with duplicate `linkId`s is a
//! known limitation: the first match in traversal order wins and the rest
//! are never considered.

use crate::extension::Extension;
use crate::questionnaire::Item;

/// Find an item by `linkId`, depth-first pre-order
pub fn find_item<'a>(items: &'a [Item], link_id: &str) -> Option<&'a Item> {
    for item in items {
        if item.link_id.as_deref() == Some(link_id) {
            return Some(item);
        }
        if let Some(children) = &item.item {
            if let Some(found) = find_item(children, link_id) {
                return Some(found);
            }
        }
    }

    None
}

/// Mutable variant of [`find_item`]
pub fn find_item_mut<'a>(items: &'a mut [Item], link_id: &str) -> Option<&'a mut Item> {
    for item in items {
        if item.link_id.as_deref() == Some(link_id) {
            return Some(item);
        }
        if let Some(children) = &mut item.item {
            if let Some(found) = find_item_mut(children, link_id) {
                return Some(found);
            }
        }
    }

    None
}

/// Visit every item depth-first, parent before children. Used to build the
/// flat `linkId` → item registry in one pass.
pub fn for_each_item<'a>(items: &'a [Item], visit: &mut impl FnMut(&'a Item)) {
    for item in items {
        visit(item);
        if let Some(children) = &item.item {
            for_each_item(children, visit);
        }
    }
}

/// Append `entries` to the extension list of the first item matching
/// `link_id` (creating the list if absent). Returns false when no item
/// matched and nothing was inserted.
pub fn insert_extensions(items: &mut [Item], link_id: &str, entries: Vec<Extension>) -> bool {
    match find_item_mut(items, link_id) {
        Some(item) => {
            item.extension.get_or_insert_with(Vec::new).extend(entries);
            true
        }
        None => false,
    }
}
