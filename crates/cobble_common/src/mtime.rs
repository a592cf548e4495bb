//! Filesystem modification timestamps.

use std::fmt;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// A modification timestamp, measured from the Unix epoch.
///
/// [`MTime::ZERO`] is the sentinel for a path that does not exist: it is
/// older than every real file, so a missing artifact is always stale and a
/// missing binary is always relinked.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MTime(Duration);

impl MTime {
    /// The epoch-zero sentinel.
    pub const ZERO: MTime = MTime(Duration::ZERO);

    /// Returns the modification time of `path`, or [`MTime::ZERO`] if it
    /// does not exist or cannot be inspected.
    ///
    /// Symlinks are followed.
    pub fn of(path: impl AsRef<Path>) -> MTime {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map(MTime::from_system)
            .unwrap_or(MTime::ZERO)
    }

    /// Returns the current wall-clock time.
    pub fn now() -> MTime {
        MTime::from_system(SystemTime::now())
    }

    /// Converts a [`SystemTime`]. Times before the epoch clamp to zero.
    pub fn from_system(time: SystemTime) -> MTime {
        MTime(time.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default())
    }

    /// Creates a timestamp a whole number of seconds after the epoch.
    pub fn from_secs(secs: u64) -> MTime {
        MTime(Duration::from_secs(secs))
    }

    /// Converts back to a [`SystemTime`], e.g. for `File::set_modified`.
    pub fn to_system(self) -> SystemTime {
        SystemTime::UNIX_EPOCH + self.0
    }

    /// Returns `true` for the does-not-exist sentinel.
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for MTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.0.as_secs(), self.0.subsec_nanos())
    }
}

impl fmt::Debug for MTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            f.write_str("MTime(ZERO)")
        } else {
            write!(f, "MTime({self})")
        }
    }
}
