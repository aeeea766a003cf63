pub mod cache;
pub mod calculator;
pub mod commission;
pub mod conditions;
pub mod deal;
pub mod document;
pub mod graph;
pub mod people;
pub mod recruit;
pub mod rules;
pub mod scope;
#[cfg(test)]
pub mod test_utils;
pub mod visibility;

pub use cache::RuleCache;
pub use calculator::Calculator;
pub use commission::Commissions;
pub use deal::Deals;
pub use document::Documents;
pub use graph::Graph;
pub use people::People;
pub use recruit::Recruits;
pub use rules::Rules;
pub use visibility::{Actor, EntityKind, Visibility, VisibilityScope};
