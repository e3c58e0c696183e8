pub mod decision;
pub mod gas;
pub mod plan;

pub use decision::make_decision;
pub use plan::{plan_days, plan_single, DayPlan};
