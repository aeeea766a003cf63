pub mod commission;
pub mod commission_rule;
pub mod deal;
pub mod document;
pub mod office;
pub mod pay_plan;
pub mod person;
pub mod person_pay_plan;
pub mod recruit;
pub mod region;
pub mod role;
pub mod team;

pub use commission::CommissionStatus;
pub use commission_rule::{CalcMethod, OverrideSource, RuleType};
pub use deal::DealStatus;
pub use person::PersonStatus;
pub use recruit::RecruitStatus;
