/// A fixed display entry for an expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDefinition {
    pub name: &'static str,
    pub icon: &'static str,
    /// Hex color, e.g. `#E8A87C`.
    pub color: &'static str,
}

pub const OTHER: &str = "Other";

pub static CATEGORIES: [CategoryDefinition; 8] = [
    CategoryDefinition { name: "Food & Dining", icon: "🍽️", color: "#E8A87C" },
    CategoryDefinition { name: "Transport", icon: "🚗", color: "#85C1E9" },
    CategoryDefinition { name: "Shopping", icon: "🛍️", color: "#C39BD3" },
    CategoryDefinition { name: "Entertainment", icon: "🎬", color: "#82E0AA" },
    CategoryDefinition { name: "Health", icon: "💊", color: "#F1948A" },
    CategoryDefinition { name: "Housing", icon: "🏠", color: "#F7DC6F" },
    CategoryDefinition { name: "Education", icon: "📚", color: "#A9CCE3" },
    CategoryDefinition { name: OTHER, icon: "📦", color: "#BFC9CA" },
];

impl CategoryDefinition {
    pub fn all() -> &'static [CategoryDefinition] {
        &CATEGORIES
    }

    /// Exact-name lookup against the fixed table.
    pub fn lookup(name: &str) -> Option<&'static CategoryDefinition> {
        CATEGORIES.iter().find(|c| c.name == name)
    }

    pub fn other() -> &'static CategoryDefinition {
        &CATEGORIES[CATEGORIES.len() - 1]
    }

    /// Display entry for a stored category string. Unknown names get the
    /// `Other` styling; the stored string itself is left alone.
    pub fn display_for(name: &str) -> &'static CategoryDefinition {
        Self::lookup(name).unwrap_or_else(Self::other)
    }

    /// Canonicalize user input: case-insensitive match on the full name or
    /// its first word. Unknown input is returned trimmed but otherwise as typed.
    pub fn resolve(input: &str) -> String {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();
        CATEGORIES
            .iter()
            .find(|c| c.name.to_lowercase() == lower || c.short_name().to_lowercase() == lower)
            .map(|c| c.name.to_string())
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// First word of the name ("Food & Dining" -> "Food").
    pub fn short_name(&self) -> &'static str {
        self.name.split(' ').next().unwrap_or(self.name)
    }

    /// Position in the fixed table, used to cycle through categories.
    pub fn index_of(name: &str) -> Option<usize> {
        CATEGORIES.iter().position(|c| c.name == name)
    }
}

impl std::fmt::Display for CategoryDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
