// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use shopkeep_app::{Category, CategoryId, Product, ProductId};

const TITLE_ADJECTIVES: [&str; 14] = [
    "Walnut",
    "Brushed Steel",
    "Compact",
    "Folding",
    "Vintage",
    "Ceramic",
    "Woven",
    "Modular",
    "Cordless",
    "Insulated",
    "Stackable",
    "Reclaimed",
    "Matte Black",
    "Travel",
];

const TITLE_NOUNS: [&str; 16] = [
    "Desk",
    "Lamp",
    "Chair",
    "Mug",
    "Backpack",
    "Keyboard",
    "Headphones",
    "Bookshelf",
    "Kettle",
    "Blanket",
    "Monitor Stand",
    "Planter",
    "Notebook",
    "Speaker",
    "Toolbox",
    "Water Bottle",
];

const CATEGORY_NAMES: [&str; 5] = [
    "Clothes",
    "Electronics",
    "Furniture",
    "Shoes",
    "Miscellaneous",
];

const DESCRIPTION_WORDS: [&str; 20] = [
    "sturdy",
    "lightweight",
    "hand",
    "finished",
    "everyday",
    "use",
    "ships",
    "assembled",
    "classic",
    "profile",
    "easy",
    "clean",
    "long",
    "lasting",
    "quiet",
    "compact",
    "storage",
    "friendly",
    "neutral",
    "tone",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone)]
pub struct ProductFaker {
    rng: DeterministicRng,
}

impl ProductFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// Builds a catalog of `count` products with ids `1..=count`. Edge shapes
    /// recur on a fixed cadence so tests can count on them: every 4th product
    /// has a bracket-wrapped first image, every 5th has no category, every
    /// 7th has no description.
    pub fn catalog(&mut self, count: usize) -> Vec<Product> {
        (1..=count as i64).map(|id| self.product(id)).collect()
    }

    pub fn product(&mut self, id: i64) -> Product {
        let adjective = self.pick(&TITLE_ADJECTIVES);
        let noun = self.pick(&TITLE_NOUNS);
        let price = (self.int_range_i64(199, 49_999) as f64) / 100.0;

        let category = (id % 5 != 0).then(|| {
            let index = self.rng.int_n(CATEGORY_NAMES.len());
            Category {
                id: CategoryId::new(index as i64 + 1),
                name: CATEGORY_NAMES[index].to_owned(),
            }
        });
        let description = (id % 7 != 0).then(|| self.sentence(4, 9));

        let clean_url = format!("https://img.example.com/products/{id}.jpg");
        let first_image = if id % 4 == 0 {
            format!("[\"{clean_url}\"]")
        } else {
            clean_url
        };

        Product {
            id: ProductId::new(id),
            title: format!("{adjective} {noun}"),
            price,
            description,
            category,
            images: vec![
                first_image,
                format!("https://img.example.com/products/{id}-alt.jpg"),
            ],
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let span = max_words - min_words + 1;
        let count = min_words + self.rng.int_n(span);
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&DESCRIPTION_WORDS).to_owned());
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

pub fn category_names() -> &'static [&'static str] {
    &CATEGORY_NAMES
}
