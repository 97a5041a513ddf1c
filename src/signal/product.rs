use derive_more::Display;
use itertools::Itertools;
use std::{collections::HashSet, fmt};

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum Outcome<T> {
    Success(T),
    Stopped,
    Failed,
}

/// What a step changed in the build output.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub enum Product {
    #[display("style {_0}")]
    Style(String),
    #[display("script {_0}")]
    Script(String),
    #[display("copy {_0}")]
    Copy(String),
    #[display("version")]
    Version,
    #[display("dump")]
    Dump,
    #[display("none")]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductSet(HashSet<Product>);

impl ProductSet {
    pub fn empty() -> Self {
        Self(HashSet::new())
    }

    pub fn insert(&mut self, product: Product) {
        if product != Product::None {
            self.0.insert(product);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn only_style(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|p| matches!(p, Product::Style(_)))
    }

    pub fn contains(&self, product: &Product) -> bool {
        self.0.contains(product)
    }

    /// site paths of the style bundles in the set
    pub fn styles(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|p| match p {
                Product::Style(site) => Some(site.as_str()),
                _ => None,
            })
            .sorted()
            .collect()
    }
}

impl fmt::Display for ProductSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0.iter().map(|p| p.to_string()).sorted().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_not_a_change() {
        let mut set = ProductSet::empty();
        set.insert(Product::None);
        set.insert(Product::None);
        assert!(set.is_empty());
        assert!(!set.only_style());
    }

    #[test]
    fn only_style_needs_every_product_to_be_style() {
        let mut set = ProductSet::empty();
        set.insert(Product::Style("css/main.css".to_string()));
        assert!(set.only_style());
        assert_eq!(set.styles(), ["css/main.css"]);

        set.insert(Product::Copy("view".to_string()));
        assert!(!set.only_style());
        assert_eq!(set.to_string(), "copy view, style css/main.css");
    }
}
