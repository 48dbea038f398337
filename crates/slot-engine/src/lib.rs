//! # slot-engine
//!
//! Expert availability resolution and conflict checking for meeting-scheduling
//! agents.
//!
//! Given an expert's weekly working hours, unavailability exceptions, and booked
//! appointments, the engine answers two questions: can this window be booked,
//! and if not, what are the nearest windows that can? Everything is computed in
//! UTC over a bounded horizon; timezones only matter when wall-clock rules are
//! expanded and at the caller's boundary.
//!
//! ## Modules
//!
//! - [`window`]: Half-open UTC windows and their set operations
//! - [`expander`]: Weekly rules and exceptions → concrete windows over a horizon
//! - [`dst`]: DST gap policies for wall-clock times
//! - [`availability`]: Rules minus exceptions → effective availability
//! - [`conflict`]: Containment and appointment-overlap checks
//! - [`suggest`]: Forward scan for the next bookable slots
//! - [`freebusy`]: Effective availability minus appointments
//! - [`schedule`]: One expert's snapshot and the pure operations over it
//! - [`store`]: Read-only data-access seam and an in-memory snapshot store
//! - [`engine`]: [`Scheduler`], the store-backed facade
//! - [`boundary`]: Local-time parsing and formatting for callers
//! - [`config`]: Engine tunables
//! - [`error`]: Error types

pub mod availability;
pub mod boundary;
pub mod config;
pub mod conflict;
pub mod dst;
pub mod engine;
pub mod error;
pub mod expander;
pub mod freebusy;
pub mod model;
pub mod schedule;
pub mod store;
pub mod suggest;
pub mod window;

pub use availability::{resolve_availability, EffectiveAvailability};
pub use config::EngineConfig;
pub use engine::{BookingDecision, Scheduler, UnavailableReason};
pub use error::{EngineError, Result};
pub use expander::{Horizon, LocalCalendar};
pub use model::{
    Appointment, AppointmentStatus, AvailabilityRule, ExceptionRecurrence, Expert, ExpertId,
    UnavailabilityException,
};
pub use schedule::ExpertSchedule;
pub use store::{ScheduleSnapshot, ScheduleStore};
pub use suggest::{ScanSettings, SuggestRequest};
pub use window::TimeWindow;
