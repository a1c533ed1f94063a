// Planning module - the bits of real logic behind the assistant:
// due date hints, task scoring and ranking.

pub mod due_date;
pub mod records;
pub mod scoring;

pub use due_date::parse_capture;
pub use records::{columns, SheetRecord};
pub use scoring::{parse_deadline, pick_next, DEFAULT_FOCUS_SIZE};
