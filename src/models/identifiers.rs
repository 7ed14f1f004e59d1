use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! impl_id_type {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_id_type!(ItemId);
impl_id_type!(UserId);
impl_id_type!(DeviceId);
impl_id_type!(PlaySessionId);

impl DeviceId {
    /// Fresh identifier for an installation that has none persisted yet.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl PlaySessionId {
    /// Every stream request gets its own play session.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}
