use std::fmt;

/// Why a session came apart, as reported by the engine's detach signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetachReason {
    ApplicationRequested = 1,
    ProcessReplaced = 2,
    ProcessTerminated = 3,
    ServerTerminated = 4,
    ConnectionLost = 5,
}

impl DetachReason {
    /// Map the engine's raw enumeration value; reason codes start at 1.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            1 => Some(Self::ApplicationRequested),
            2 => Some(Self::ProcessReplaced),
            3 => Some(Self::ProcessTerminated),
            4 => Some(Self::ServerTerminated),
            5 => Some(Self::ConnectionLost),
            _ => None,
        }
    }
}

impl fmt::Display for DetachReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ApplicationRequested => "application-requested",
            Self::ProcessReplaced => "process-replaced",
            Self::ProcessTerminated => "process-terminated",
            Self::ServerTerminated => "server-terminated",
            Self::ConnectionLost => "connection-lost",
        };
        write!(f, "{name}")
    }
}

/// Kind of change reported by the engine's file monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileChangeKind {
    Changed = 0,
    ChangesDoneHint = 1,
    Deleted = 2,
    Created = 3,
    AttributeChanged = 4,
    PreMount = 5,
    Unmounted = 6,
    Moved = 7,
}

impl FileChangeKind {
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::Changed),
            1 => Some(Self::ChangesDoneHint),
            2 => Some(Self::Deleted),
            3 => Some(Self::Created),
            4 => Some(Self::AttributeChanged),
            5 => Some(Self::PreMount),
            6 => Some(Self::Unmounted),
            7 => Some(Self::Moved),
            _ => None,
        }
    }
}

impl fmt::Display for FileChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Changed => "changed",
            Self::ChangesDoneHint => "changes-done-hint",
            Self::Deleted => "deleted",
            Self::Created => "created",
            Self::AttributeChanged => "attribute-changed",
            Self::PreMount => "pre-mount",
            Self::Unmounted => "unmounted",
            Self::Moved => "moved",
        };
        write!(f, "{name}")
    }
}

/// A socket endpoint argument, already resolved to printable form by the
/// engine glue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketAddress {
    pub address: String,
    pub port: u16,
}

impl SocketAddress {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detach_reason_display() {
        assert_eq!(
            DetachReason::from_raw(3).unwrap().to_string(),
            "process-terminated"
        );
        assert!(DetachReason::from_raw(0).is_none());
        assert!(DetachReason::from_raw(6).is_none());
    }

    #[test]
    fn test_file_change_kind_table() {
        assert_eq!(FileChangeKind::from_raw(0).unwrap().to_string(), "changed");
        assert_eq!(FileChangeKind::from_raw(7).unwrap().to_string(), "moved");
        assert!(FileChangeKind::from_raw(8).is_none());
    }
}
