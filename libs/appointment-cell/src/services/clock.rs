// libs/appointment-cell/src/services/clock.rs
use chrono::{Local, NaiveDateTime};

use crate::models::ClassifyError;

/// Source of "now" for classification, carried in the router state.
/// The binary runs on [`SystemClock`]; tests pin time with [`FixedClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<NaiveDateTime, ClassifyError>;
}

/// Wall-clock time in the server's local zone, matching how slots are stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<NaiveDateTime, ClassifyError> {
        Ok(Local::now().naive_local())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> Result<NaiveDateTime, ClassifyError> {
        Ok(self.0)
    }
}
