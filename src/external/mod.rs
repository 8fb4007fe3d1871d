//! Collaborators the engine depends on but does not own.
//!
//! The employee directory, notification sink, attachment store and clock are
//! traits so the host service can plug in its own implementations. Each has a
//! small in-process implementation used by tests and embedded setups.

mod attachment;
mod clock;
mod directory;
mod notification;

pub use attachment::{AttachmentStore, StaticUrlAttachments};
pub use clock::{Clock, FixedClock, SystemClock};
pub use directory::{EmployeeDirectory, InMemoryDirectory};
pub use notification::{
    LogNotifier, NotificationEvent, NotificationKind, NotificationSink, RecordingNotifier,
};
