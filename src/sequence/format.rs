use serde::Serialize;
use std::collections::HashMap;

/// Entity kinds with a default code format.
pub mod kinds {
    pub const BRAND: &str = "Brand";
    pub const COLOR: &str = "Color";
    pub const SERIES: &str = "Series";
    pub const PRODUCT: &str = "Product";
    pub const PURCHASE_REQUEST: &str = "PurchaseRequest";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeFormat {
    pub prefix: String,
    pub width: usize,
}

impl CodeFormat {
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width,
        }
    }

    /// Renders `value` as prefix plus zero-padded digits.
    ///
    /// The width is a minimum: a value with more digits than `width` is
    /// written in full (`BRD1000` for width 3), never truncated.
    pub fn render(&self, value: i64) -> String {
        format!("{}{:0width$}", self.prefix, value, width = self.width)
    }
}

/// Maps entity kinds to their code format. Lookups are case-sensitive.
#[derive(Debug, Clone)]
pub struct KindRegistry {
    formats: HashMap<String, CodeFormat>,
}

impl KindRegistry {
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    pub fn insert(&mut self, kind: impl Into<String>, format: CodeFormat) {
        self.formats.insert(kind.into(), format);
    }

    pub fn get(&self, kind: &str) -> Option<&CodeFormat> {
        if kind.is_empty() {
            return None;
        }
        self.formats.get(kind)
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert(kinds::BRAND, CodeFormat::new("BRD", 3));
        registry.insert(kinds::COLOR, CodeFormat::new("CLR", 3));
        registry.insert(kinds::SERIES, CodeFormat::new("SER", 3));
        registry.insert(kinds::PRODUCT, CodeFormat::new("PRD", 3));
        registry.insert(kinds::PURCHASE_REQUEST, CodeFormat::new("PRQ", 3));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_width() {
        let format = CodeFormat::new("BRD", 3);
        assert_eq!(format.render(1), "BRD001");
        assert_eq!(format.render(42), "BRD042");
        assert_eq!(format.render(999), "BRD999");
    }

    #[test]
    fn grows_past_width_instead_of_truncating() {
        let format = CodeFormat::new("BRD", 3);
        assert_eq!(format.render(1000), "BRD1000");
        assert_eq!(format.render(123_456), "BRD123456");
    }

    #[test]
    fn zero_width_means_no_padding() {
        assert_eq!(CodeFormat::new("X", 0).render(7), "X7");
    }

    #[test]
    fn default_registry_knows_catalog_kinds() {
        let registry = KindRegistry::default();
        assert_eq!(registry.get("Brand"), Some(&CodeFormat::new("BRD", 3)));
        assert_eq!(registry.get("PurchaseRequest").map(|f| f.prefix.as_str()), Some("PRQ"));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn unknown_and_empty_kinds_are_absent() {
        let registry = KindRegistry::default();
        assert!(registry.get("Unicorn").is_none());
        assert!(registry.get("brand").is_none());
        assert!(registry.get("").is_none());
    }
}
