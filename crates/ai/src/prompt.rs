use stocktrack_inventory::{DEFAULT_CATEGORIES, DEFAULT_MIN_STOCK};

/// Fixed instruction wrapped around the user's text.
///
/// The defaults for unstated numbers live here, in the prompt, not in the
/// parser: the model is told what to fill in and the parser only checks shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPrompt {
    categories: Vec<String>,
    default_quantity: u32,
    default_min_stock: u32,
}

impl ExtractionPrompt {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            default_quantity: 1,
            default_min_stock: DEFAULT_MIN_STOCK,
        }
    }

    /// Replace the closed category set, keeping the numeric defaults.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_quantity(mut self, quantity: u32) -> Self {
        self.default_quantity = quantity;
        self
    }

    pub fn with_default_min_stock(mut self, min_stock: u32) -> Self {
        self.default_min_stock = min_stock;
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn render(&self, free_text: &str) -> String {
        let categories = self.categories.join(", ");
        format!(
            "You are an inventory assistant for a small business.\n\
             Extract exactly one stock item from the text below.\n\
             Reply with a single JSON object and nothing else, using exactly these keys:\n\
             {{\"name\": string, \"category\": string, \"quantity\": integer, \"unit\": string, \"minStock\": integer}}\n\
             Rules:\n\
             - \"category\" must be one of: {categories}.\n\
             - If the quantity is not stated, use {quantity}.\n\
             - If the minimum stock is not stated, use {min_stock}.\n\
             - Keep the unit as the user wrote it (for example \"rim\", \"Pcs\", \"Box\"); use \"Pcs\" if none is given.\n\
             - Numbers must be non-negative integers.\n\
             Text: \"\"\"{free_text}\"\"\"",
            quantity = self.default_quantity,
            min_stock = self.default_min_stock,
            free_text = free_text.trim(),
        )
    }
}

impl Default for ExtractionPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES)
    }
}
