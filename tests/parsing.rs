// Cross-language parser invariants.
#[path = "common/mod.rs"]
mod common;
#[path = "parsing/test_invariants.rs"]
mod test_invariants;
