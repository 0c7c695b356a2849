// ── Multi-select with shift-click ranges ──

use std::collections::HashSet;

/// Set of selected ids plus the anchor for range selection.
///
/// Ranges are resolved against the order of the collection passed to
/// [`select`](Self::select) at click time, so they follow whatever page
/// and ordering the store currently holds.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: HashSet<String>,
    last_selected: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn last_selected(&self) -> Option<&str> {
        self.last_selected.as_deref()
    }

    /// Selected ids in `order`, skipping ids no longer present.
    pub fn ids_in<'a, I>(&self, order: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        order
            .into_iter()
            .filter(|id| self.selected.contains(*id))
            .map(str::to_owned)
            .collect()
    }

    /// Flip one id and make it the new anchor.
    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_owned());
        }
        self.last_selected = Some(id.to_owned());
    }

    /// Handle a click on `id`.
    ///
    /// With `shift` held and both the anchor and `id` present in `order`,
    /// every id between them (inclusive, either direction) is selected.
    /// Otherwise this is a plain [`toggle`](Self::toggle).
    pub fn select<'a, I>(&mut self, id: &str, shift: bool, order: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if shift {
            if let Some(anchor) = self.last_selected.clone() {
                let ids: Vec<&str> = order.into_iter().collect();
                let start = ids.iter().position(|i| *i == anchor);
                let end = ids.iter().position(|i| *i == id);

                if let (Some(mut start), Some(mut end)) = (start, end) {
                    if start > end {
                        std::mem::swap(&mut start, &mut end);
                    }
                    self.selected
                        .extend(ids[start..=end].iter().map(|i| (*i).to_owned()));
                    self.last_selected = Some(id.to_owned());
                    return;
                }
            }
        }

        self.toggle(id);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.last_selected = None;
    }
}
