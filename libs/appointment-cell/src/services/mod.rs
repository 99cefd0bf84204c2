pub mod appointments;
pub mod board;
pub mod classifier;
pub mod clock;
pub mod slot;
pub mod source;
pub mod stats;
pub mod status;

pub use appointments::AppointmentService;
pub use board::AppointmentBoard;
pub use classifier::{classify, ClassifiedAppointments, ViewRole};
pub use clock::{Clock, FixedClock, SystemClock};
pub use slot::{parse_slot, SlotParseError};
pub use source::{AppointmentSource, BackendAppointmentSource};
pub use stats::{compute_stats, doctor_overview};
pub use status::{label_status, StatusBadge, StatusLabel};
