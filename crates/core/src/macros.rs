// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for the domain types.
//!
//! Identifiers in this protocol are peer-supplied opaque strings: task
//! ids come from clients, worker ids from workers. [`string_id!`]
//! therefore generates plain `String` newtypes with the usual
//! conversions and comparisons and no generated prefix or randomness.
//! [`display_as!`] maps enum variants to their wire-facing labels.

/// Implement `Display` by matching variants to string labels.
///
/// Arms are full patterns, so the message union's mix of newtype and
/// struct variants works the same way: `Kind::Unit => "..."`,
/// `Kind::Tuple(..) => "..."`, `Kind::Named { .. } => "..."`.
#[macro_export]
macro_rules! display_as {
    ($enum:ty { $( $arm:pat => $label:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( $arm => $label, )+
                })
            }
        }
    };
}

/// Define a newtype ID wrapper around `String`.
///
/// ```ignore
/// crate::string_id! {
///     /// Doc comment for the ID type.
///     pub struct TaskId;
/// }
/// ```
#[macro_export]
macro_rules! string_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
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

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}
