use crate::model::ImportItem;
use std::collections::HashSet;
use uuid::Uuid;

/// Ordered, de-duplicated collection of items staged for upload
#[derive(Debug, Default)]
pub struct WorkingSet {
    items: Vec<ImportItem>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ImportItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&ImportItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut ImportItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// The staged item `item` would duplicate, if any
    pub fn find_duplicate(&self, item: &ImportItem) -> Option<&ImportItem> {
        self.items.iter().find(|existing| existing.same_identity(item))
    }

    /// Append unless an identity-equal item is already present
    pub fn insert_unique(&mut self, item: ImportItem) -> bool {
        if self.find_duplicate(&item).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Stable sort into display order
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| a.display_cmp(b));
    }

    /// Remove every item whose id is listed, in one pass
    pub fn remove_ids(&mut self, ids: &[Uuid]) -> usize {
        let ids: HashSet<&Uuid> = ids.iter().collect();
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id));
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
