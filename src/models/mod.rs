pub mod check_in;
pub mod export;
pub mod member;
pub mod pagination;
pub mod reconcile;
pub mod record;
pub mod roster;
pub mod service_day;
pub mod snapshot;
pub mod time_format;

pub use check_in::{CheckInPayload, Source};
pub use member::Member;
pub use pagination::{Page, paginate};
pub use reconcile::{AttendanceHistory, AttendanceStatus, ReconciledDay, SortOrder, reconcile};
pub use record::CheckInRecord;
pub use roster::{RosterEntry, RosterFilter};
pub use service_day::ServiceCalendar;
pub use snapshot::{RecordStore, Snapshot};
pub use time_format::format_time;
