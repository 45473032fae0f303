//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Disks carry an identity that is independent of their size rank so a
//! presentation layer can follow the same disk across moves. Playback
//! sessions are identified the same way for log correlation. All IDs use
//! UUID v7 (time-ordered).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Declares a UUID v7 identifier that renders as `<prefix>-<uuid>` in
/// logs and serializes as the bare UUID.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(Uuid);

        impl $name {
            /// Log prefix for this kind of identifier.
            pub const PREFIX: &'static str = $prefix;

            /// Mint a fresh, time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Borrow the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Stable identity of a single disk, distinct from its size rank.
    DiskId => "disk"
}

define_id! {
    /// Identifier of one playback session, used to correlate log lines.
    SessionId => "session"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_v7() {
        let first = DiskId::new();
        let second = DiskId::new();
        assert_ne!(first, second);
        assert_eq!(first.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn display_carries_prefix() {
        let raw = Uuid::now_v7();
        let id = SessionId::from(raw);
        assert_eq!(id.as_uuid(), &raw);
        assert_eq!(id.to_string(), format!("session-{raw}"));
        assert!(DiskId::from(raw).to_string().starts_with("disk-"));
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let raw = Uuid::now_v7();
        let json = serde_json::to_value(SessionId::from(raw)).unwrap();
        assert_eq!(json, serde_json::Value::String(raw.to_string()));
        let back: SessionId = serde_json::from_value(json).unwrap();
        assert_eq!(back.as_uuid(), &raw);
    }
}
