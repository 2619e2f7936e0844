mod category;
mod expense;

pub use category::{CategoryDefinition, CATEGORIES, OTHER};
pub use expense::ExpenseRecord;

#[cfg(test)]
mod tests;
