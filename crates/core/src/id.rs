// SPDX-License-Identifier: MIT
//! Prefixed, randomly generated identifiers used throughout the store and wire formats.

/// Define a newtype identifier backed by a `String`, carrying a short type prefix.
///
/// The wire format is `{prefix}{nanoid}`, e.g. `job_V1StGXR8_Z5jdHi6B-myT`.
/// Prefixes make ids self-describing in logs without a lookup.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random id with the type prefix.
            pub fn new() -> Self {
                Self(format!("{}{}", Self::PREFIX, nanoid::nanoid!(21)))
            }

            /// Wrap an existing string (parsing/deserialization, or a caller-supplied id).
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::define_id! {
        pub struct TestId("tst_");
    }

    #[test]
    fn new_ids_carry_prefix_and_are_distinct() {
        let a = TestId::new();
        let b = TestId::new();
        assert!(a.as_str().starts_with("tst_"));
        assert_ne!(a, b);
    }

    #[test]
    fn from_string_round_trips() {
        let id = TestId::from_string("tst_fixed");
        assert_eq!(id.to_string(), "tst_fixed");
    }
}
