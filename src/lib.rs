pub mod clock;
pub mod cns;
pub mod driver;
pub mod error;
pub mod ffi;
pub mod profile;
pub mod reading;
pub mod report;
pub mod session;

uniffi::setup_scaffolding!();

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{run_profile, ClockPacer, DiveSummary, DriverConfig, Pacer, SleepPacer};
pub use error::DiveError;
pub use ffi::DiveComputer;
pub use profile::{linear_descent, parse_profile, ProfileStep};
pub use reading::{Alert, DiveReading};
pub use report::{JsonLinesSink, ReportSink, TextSink, TracingSink};
pub use session::{DiveSession, DiveState, AIR_FO2, SAFE_STOP_DEPTH_M};
