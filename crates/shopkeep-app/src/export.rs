// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Product;

pub const CSV_HEADER: &str = "ID,Title,Price,Category,Description";

/// Serializes one page of products, header first, rows joined with `\n` and
/// no trailing newline. Missing category/description export as empty fields.
pub fn page_csv(products: &[Product]) -> String {
    let mut lines = Vec::with_capacity(products.len() + 1);
    lines.push(CSV_HEADER.to_owned());
    for product in products {
        let row = [
            product.id.get().to_string(),
            csv_field(&product.title),
            product.price.to_string(),
            csv_field(product.category_name().unwrap_or("")),
            csv_field(product.description.as_deref().unwrap_or("")),
        ]
        .join(",");
        lines.push(row);
    }
    lines.join("\n")
}

pub fn export_file_name(page: usize) -> String {
    format!("products_page_{page}.csv")
}

// Fields carrying the delimiter, quotes, or newlines are wrapped in quotes
// with inner quotes doubled; everything else passes through bare.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{CSV_HEADER, export_file_name, page_csv};
    use crate::{Category, CategoryId, Product, ProductId};

    fn product(id: i64, title: &str, price: f64, category: &str, description: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_owned(),
            price,
            description: (!description.is_empty()).then(|| description.to_owned()),
            category: (!category.is_empty()).then(|| Category {
                id: CategoryId::new(1),
                name: category.to_owned(),
            }),
            images: Vec::new(),
        }
    }

    fn split_csv_line(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            if quoted {
                if ch == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        quoted = false;
                    }
                } else {
                    field.push(ch);
                }
            } else {
                match ch {
                    '"' => quoted = true,
                    ',' => fields.push(std::mem::take(&mut field)),
                    _ => field.push(ch),
                }
            }
        }
        fields.push(field);
        fields
    }

    #[test]
    fn header_and_plain_rows() {
        let csv = page_csv(&[product(1, "Mug", 4.5, "Kitchen", "Stoneware")]);
        assert_eq!(csv, format!("{CSV_HEADER}\n1,Mug,4.5,Kitchen,Stoneware"));
    }

    #[test]
    fn missing_category_and_description_export_empty() {
        let csv = page_csv(&[product(2, "Crate", 12.0, "", "")]);
        assert_eq!(csv.lines().nth(1), Some("2,Crate,12,,"));
    }

    #[test]
    fn fields_with_delimiters_and_quotes_are_escaped() {
        let csv = page_csv(&[product(
            3,
            "Desk, walnut",
            120.0,
            "Office",
            "The \"big\" one",
        )]);
        assert_eq!(
            csv.lines().nth(1),
            Some(r#"3,"Desk, walnut",120,Office,"The ""big"" one""#),
        );
    }

    #[test]
    fn empty_page_is_just_the_header() {
        assert_eq!(page_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn export_round_trips_through_a_quoted_csv_parser() {
        let products = vec![
            product(1, "Mug", 4.5, "Kitchen", "Stoneware"),
            product(2, "Desk, walnut", 129.99, "Office", "Has a \"hidden\" drawer"),
            product(3, "Crate", 12.0, "", ""),
        ];

        let csv = page_csv(&products);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));

        for (line, product) in lines.zip(&products) {
            let fields = split_csv_line(line);
            assert_eq!(fields.len(), 5);
            assert_eq!(fields[0], product.id.get().to_string());
            assert_eq!(fields[1], product.title);
            assert_eq!(fields[2], product.price.to_string());
            assert_eq!(fields[3], product.category_name().unwrap_or(""));
            assert_eq!(fields[4], product.description.as_deref().unwrap_or(""));
        }
    }

    #[test]
    fn file_name_carries_the_page_number() {
        assert_eq!(export_file_name(1), "products_page_1.csv");
        assert_eq!(export_file_name(12), "products_page_12.csv");
    }
}
