//! Payment schedule generation from payment-term templates.

pub mod generator;
pub mod types;

pub use generator::{
    item_label, plan_regeneration, plan_schedule, round_half_up, stage_amount, stage_due_date,
    RegenerationPlan,
};
pub use types::{
    CalculationBase, ExistingScheduleItem, PlannedScheduleItem, ScheduleItemStatus, TermStage,
    SCHEDULE_ITEM_MACHINE,
};
