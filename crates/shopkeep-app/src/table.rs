// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::{DEFAULT_PAGE_SIZE, Product, SortDirection, SortKey, SortSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductTable {
    source: Vec<Product>,
    view: Vec<Product>,
    keyword: String,
    page: usize,
    page_size: usize,
    sort: Option<SortSpec>,
}

impl Default for ProductTable {
    fn default() -> Self {
        Self {
            source: Vec::new(),
            view: Vec::new(),
            keyword: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl ProductTable {
    pub fn with_page_size(page_size: usize) -> Self {
        let mut table = Self::default();
        table.set_page_size(page_size);
        table
    }

    /// Replaces the full collection after a fetch. The keyword is cleared so
    /// the view starts from the filter-less baseline; an active sort carries
    /// over; the page returns to 1.
    pub fn set_source(&mut self, records: Vec<Product>) {
        self.source = records;
        self.keyword.clear();
        self.page = 1;
        self.recompute_view();
    }

    pub fn apply_filter(&mut self, keyword: &str) {
        self.keyword = keyword.to_owned();
        self.page = 1;
        self.recompute_view();
    }

    /// Toggle rule: sorting the already-sorted key flips direction, any other
    /// key starts ascending. The page is not reset; the view length does not
    /// change under a re-sort.
    pub fn apply_sort(&mut self, key: SortKey) {
        self.sort = match self.sort {
            Some(spec) if spec.key == key => Some(SortSpec {
                key,
                direction: spec.direction.flipped(),
            }),
            _ => Some(SortSpec {
                key,
                direction: SortDirection::Asc,
            }),
        };
        self.recompute_view();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            return;
        }
        self.page_size = page_size;
        self.page = 1;
    }

    /// Moves `delta` pages relative to the current one. Requests that would
    /// land outside `[1, total_pages()]` leave the state untouched and
    /// report `false`.
    pub fn go_to_page(&mut self, delta: isize) -> bool {
        let target = self.page as isize + delta;
        if target < 1 || target > self.total_pages() as isize {
            return false;
        }
        self.page = target as usize;
        true
    }

    pub fn current_page_slice(&self) -> &[Product] {
        let start = ((self.page - 1) * self.page_size).min(self.view.len());
        let end = (start + self.page_size).min(self.view.len());
        &self.view[start..end]
    }

    pub fn total_pages(&self) -> usize {
        self.view.len().div_ceil(self.page_size).max(1)
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn view(&self) -> &[Product] {
        &self.view
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    // One fixed pipeline for every data-affecting mutation: filter the
    // source by the keyword, then stable-sort the survivors.
    fn recompute_view(&mut self) {
        let keyword = self.keyword.to_lowercase();
        self.view = self
            .source
            .iter()
            .filter(|product| keyword.is_empty() || product.title.to_lowercase().contains(&keyword))
            .cloned()
            .collect();
        if let Some(sort) = self.sort {
            self.view.sort_by(|left, right| {
                let ordering = compare_by_key(sort.key, left, right);
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }
    }
}

// Records missing the sorted field order before any record that has it;
// descending reverses the whole comparator, so they land last instead.
fn compare_by_key(key: SortKey, left: &Product, right: &Product) -> Ordering {
    match key {
        SortKey::Id => left.id.get().cmp(&right.id.get()),
        SortKey::Title => left.title.to_lowercase().cmp(&right.title.to_lowercase()),
        SortKey::Price => left.price.total_cmp(&right.price),
        SortKey::Category => match (left.category_name(), right.category_name()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(left_name), Some(right_name)) => {
                left_name.to_lowercase().cmp(&right_name.to_lowercase())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::ProductTable;
    use crate::{Category, CategoryId, Product, ProductId, SortDirection, SortKey};

    fn product(id: i64, title: &str, price: f64) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_owned(),
            price,
            description: None,
            category: None,
            images: Vec::new(),
        }
    }

    fn categorized(id: i64, title: &str, price: f64, category: &str) -> Product {
        Product {
            category: Some(Category {
                id: CategoryId::new(id),
                name: category.to_owned(),
            }),
            ..product(id, title, price)
        }
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|product| product.id.get()).collect()
    }

    fn twelve_records() -> Vec<Product> {
        (1..=12)
            .map(|n| product(n, &format!("Item {n:02}"), n as f64))
            .collect()
    }

    #[test]
    fn twelve_records_paginate_in_fives() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());

        assert_eq!(table.current_page_slice().len(), 5);
        assert_eq!(table.total_pages(), 3);

        assert!(table.go_to_page(1));
        assert_eq!(table.page(), 2);

        assert!(!table.go_to_page(5));
        assert_eq!(table.page(), 2);
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());

        assert!(table.go_to_page(2));
        assert_eq!(table.page(), 3);
        assert_eq!(ids(table.current_page_slice()), vec![11, 12]);
    }

    #[test]
    fn navigation_below_page_one_is_rejected() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());

        assert!(!table.go_to_page(-1));
        assert_eq!(table.page(), 1);
    }

    #[test]
    fn filter_keeps_only_case_insensitive_title_matches() {
        let mut table = ProductTable::default();
        table.set_source(vec![
            product(1, "Walnut Desk", 120.0),
            product(2, "Desk Lamp", 35.0),
            product(3, "Office Chair", 89.0),
        ]);

        table.apply_filter("DESK");
        assert_eq!(ids(table.view()), vec![1, 2]);

        table.apply_filter("");
        assert_eq!(ids(table.view()), vec![1, 2, 3]);
    }

    #[test]
    fn filtered_view_is_a_subsequence_of_source() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());
        table.apply_filter("1");

        let source_ids = ids(&twelve_records());
        let view_ids = ids(table.view());
        let mut cursor = source_ids.iter();
        for id in &view_ids {
            assert!(cursor.any(|candidate| candidate == id), "{id} out of order");
        }
        assert!(view_ids.iter().all(|id| source_ids.contains(id)));
    }

    #[test]
    fn filter_change_resets_the_page() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());
        table.go_to_page(2);

        table.apply_filter("item");
        assert_eq!(table.page(), 1);
    }

    #[test]
    fn sort_toggles_direction_on_the_same_key() {
        let mut table = ProductTable::default();
        table.set_source(vec![
            product(1, "banana", 3.0),
            product(2, "Apple", 5.0),
            product(3, "cherry", 1.0),
        ]);

        table.apply_sort(SortKey::Title);
        assert_eq!(ids(table.view()), vec![2, 1, 3]);
        assert_eq!(table.sort().map(|s| s.direction), Some(SortDirection::Asc));

        table.apply_sort(SortKey::Title);
        assert_eq!(ids(table.view()), vec![3, 1, 2]);
        assert_eq!(table.sort().map(|s| s.direction), Some(SortDirection::Desc));

        table.apply_sort(SortKey::Price);
        assert_eq!(ids(table.view()), vec![3, 1, 2]);
        assert_eq!(table.sort().map(|s| s.key), Some(SortKey::Price));
        assert_eq!(table.sort().map(|s| s.direction), Some(SortDirection::Asc));
    }

    #[test]
    fn double_sort_restores_the_strictly_ordered_view_reversed() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());

        table.apply_sort(SortKey::Id);
        let ascending = ids(table.view());
        table.apply_sort(SortKey::Id);
        let mut descending = ids(table.view());
        descending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn equal_sort_keys_preserve_fetch_order() {
        let mut table = ProductTable::default();
        table.set_source(vec![
            product(10, "first", 5.0),
            product(11, "second", 5.0),
            product(12, "third", 5.0),
            product(13, "cheap", 1.0),
        ]);

        table.apply_sort(SortKey::Price);
        assert_eq!(ids(table.view()), vec![13, 10, 11, 12]);
    }

    #[test]
    fn missing_category_sorts_before_present_ones_ascending() {
        let mut table = ProductTable::default();
        table.set_source(vec![
            categorized(1, "a", 1.0, "Tools"),
            product(2, "b", 2.0),
            categorized(3, "c", 3.0, "garden"),
        ]);

        table.apply_sort(SortKey::Category);
        assert_eq!(ids(table.view()), vec![2, 3, 1]);

        table.apply_sort(SortKey::Category);
        assert_eq!(ids(table.view()), vec![1, 3, 2]);
    }

    #[test]
    fn sort_applies_after_filter_and_keeps_the_page() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());
        table.apply_filter("item");
        table.go_to_page(1);

        table.apply_sort(SortKey::Price);
        table.apply_sort(SortKey::Price);
        assert_eq!(table.page(), 2);
        assert_eq!(ids(table.current_page_slice()), vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn set_source_clears_keyword_and_keeps_sort() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());
        table.apply_filter("item 01");
        table.apply_sort(SortKey::Price);
        table.apply_sort(SortKey::Price);

        table.set_source(vec![product(1, "x", 2.0), product(2, "y", 9.0)]);
        assert_eq!(table.keyword(), "");
        assert_eq!(table.page(), 1);
        assert_eq!(ids(table.view()), vec![2, 1]);
    }

    #[test]
    fn empty_view_still_reports_one_page() {
        let mut table = ProductTable::default();
        assert_eq!(table.total_pages(), 1);
        assert!(table.current_page_slice().is_empty());

        table.set_source(twelve_records());
        table.apply_filter("no such product");
        assert_eq!(table.total_pages(), 1);
        assert_eq!(table.page(), 1);
        assert!(table.current_page_slice().is_empty());
    }

    #[test]
    fn page_size_change_resets_the_page() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());
        table.go_to_page(2);

        table.set_page_size(10);
        assert_eq!(table.page(), 1);
        assert_eq!(table.total_pages(), 2);
        assert_eq!(table.current_page_slice().len(), 10);
    }

    #[test]
    fn zero_page_size_is_ignored() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());

        table.set_page_size(0);
        assert_eq!(table.page_size(), 5);
    }

    #[test]
    fn page_never_leaves_the_valid_range() {
        let mut table = ProductTable::default();
        table.set_source(twelve_records());

        for delta in [-3, -1, 0, 1, 2, 4, 100, -100] {
            table.go_to_page(delta);
            assert!(table.page() >= 1);
            assert!(table.page() <= table.total_pages());
        }
    }
}
