//! Ordered element collection.
//!
//! Index ascending is paint order; hit testing walks the same order in
//! reverse, so the most recently pushed element is on top and wins the
//! pointer.
//!
//! Ids resolve through `ids` to a key, and the key to a position at lookup
//! time. Removing an element therefore never leaves a stale index behind.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::geometry::Vec2;
use crate::mode::UiMode;
use crate::scene::element::{Element, ElementKey};
use crate::scene::paint::Painter;

#[derive(Debug, Default)]
pub struct RenderList {
    elements: Vec<Element>,
    ids: HashMap<String, ElementKey>,
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends on top of everything already present.
    pub fn push(&mut self, element: Element) -> ElementKey {
        let key = element.key();
        if let Some(id) = element.id() {
            if let Some(prev) = self.ids.insert(id.to_string(), key) {
                if self.position(prev).is_some() {
                    warn!(id, "duplicate element id, newest element takes it");
                }
            }
        }
        self.elements.push(element);
        key
    }

    /// Appends a builder's output in one go. Returns the keys in push order.
    pub fn extend(&mut self, elements: impl IntoIterator<Item = Element>) -> Vec<ElementKey> {
        elements.into_iter().map(|el| self.push(el)).collect()
    }

    pub fn remove(&mut self, key: ElementKey) -> Option<Element> {
        let idx = self.position(key)?;
        self.remove_at(idx)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Element> {
        if index >= self.elements.len() {
            return None;
        }
        let removed = self.elements.remove(index);
        if let Some(id) = removed.id() {
            self.forget_id(id, removed.key());
        }
        Some(removed)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<Element> {
        let key = *self.ids.get(id)?;
        self.remove(key)
    }

    /// Removes every element for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&Element) -> bool) {
        let mut i = 0;
        while i < self.elements.len() {
            if keep(&self.elements[i]) {
                i += 1;
            } else {
                self.remove_at(i);
            }
        }
    }

    /// Drops `id` from the index if `key` holds it, handing it to any older
    /// element still carrying the same id.
    fn forget_id(&mut self, id: &str, key: ElementKey) {
        if self.ids.get(id) != Some(&key) {
            return;
        }
        let heir = self
            .elements
            .iter()
            .rev()
            .find(|el| el.id() == Some(id))
            .map(Element::key);
        match heir {
            Some(k) => {
                debug!(id, "id passed to remaining duplicate");
                self.ids.insert(id.to_string(), k);
            }
            None => {
                self.ids.remove(id);
            }
        }
    }

    pub fn index_of_id(&self, id: &str) -> Option<usize> {
        let key = self.ids.get(id)?;
        self.position(*key)
    }

    pub fn position(&self, key: ElementKey) -> Option<usize> {
        self.elements.iter().position(|el| el.key() == key)
    }

    pub fn contains(&self, key: ElementKey) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: ElementKey) -> Option<&Element> {
        self.elements.iter().find(|el| el.key() == key)
    }

    pub fn get_mut(&mut self, key: ElementKey) -> Option<&mut Element> {
        self.elements.iter_mut().find(|el| el.key() == key)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Element> {
        let key = self.ids.get(id)?;
        self.get(*key)
    }

    pub fn get_mut_by_id(&mut self, id: &str) -> Option<&mut Element> {
        let key = *self.ids.get(id)?;
        self.get_mut(key)
    }

    pub fn at(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Topmost visible element whose box contains `point`.
    pub fn hit_test(&self, point: Vec2) -> Option<ElementKey> {
        self.elements
            .iter()
            .rev()
            .find(|el| el.visible && el.bounds.contains(point))
            .map(Element::key)
    }

    pub fn paint(&self, painter: &mut dyn Painter, mode: &UiMode) {
        for el in self.elements.iter().filter(|el| el.visible) {
            el.draw(painter, mode);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.ids.clear();
    }
}
