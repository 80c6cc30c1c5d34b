pub mod loader;

pub use loader::{load_rulebook, parse_rulebook, validate_rulebook, RuleBookError, RuleBookLoader};
