use crate::render::Pixel;

/// Index of an entry in a [`Catalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ItemId(pub(crate) usize);

#[derive(Clone, Debug)]
pub(crate) struct CatalogEntry {
    pub(crate) name: &'static str,
    pub(crate) glyph: char,
    pub(crate) color: Pixel,
}

#[derive(Clone, Debug)]
pub(crate) struct Catalog {
    entries: Vec<CatalogEntry>,
}

const fn rgb(r: u8, g: u8, b: u8) -> Pixel {
    Pixel { r, g, b, a: 235 }
}

impl Catalog {
    pub(crate) fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub(crate) fn fruits() -> Self {
        let entry = |name, glyph, color| CatalogEntry { name, glyph, color };
        Self::new(vec![
            entry("Apple", 'A', rgb(230, 40, 50)),
            entry("Banana", 'B', rgb(250, 220, 60)),
            entry("Grape", 'G', rgb(130, 60, 170)),
            entry("Orange", 'O', rgb(250, 150, 30)),
            entry("Lemon", 'L', rgb(240, 240, 110)),
            entry("Pear", 'P', rgb(190, 210, 80)),
            entry("Strawberry", 'S', rgb(240, 70, 100)),
            entry("Watermelon", 'W', rgb(60, 170, 70)),
            entry("Cherry", 'C', rgb(180, 20, 40)),
            entry("Pineapple", 'N', rgb(220, 180, 50)),
        ])
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Catalog order; the grid is always shown shuffled.
    pub(crate) fn ids(&self) -> Vec<ItemId> {
        (0..self.entries.len()).map(ItemId).collect()
    }

    pub(crate) fn contains(&self, id: ItemId) -> bool {
        id.0 < self.entries.len()
    }

    pub(crate) fn entry(&self, id: ItemId) -> Option<&CatalogEntry> {
        self.entries.get(id.0)
    }

    pub(crate) fn name(&self, id: ItemId) -> &'static str {
        self.entry(id).map(|e| e.name).unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fruit_catalog_has_ten_distinct_names() {
        let cat = Catalog::fruits();
        assert_eq!(cat.len(), 10);
        let names: HashSet<_> = cat.ids().into_iter().map(|id| cat.name(id)).collect();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn unknown_id_has_fallback_name() {
        let cat = Catalog::fruits();
        assert!(!cat.contains(ItemId(10)));
        assert_eq!(cat.name(ItemId(10)), "Unknown");
    }
}
