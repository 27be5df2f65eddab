//! Closed string enumerations stored as `TEXT` columns.
//!
//! [`define_text_enum!`] generates an enum whose variants map one-to-one to
//! the wire/database spelling, plus parsing (with optional input aliases),
//! `Display`, serde support, and `TryFrom<String>` so db models can decode the
//! column with `#[sqlx(try_from = "String")]`.

/// Define a closed string enumeration.
///
/// ```ignore
/// define_text_enum! {
///     /// Lifecycle of a thing.
///     ThingStatus("thing status") {
///         Open = "open",
///         Closed = "closed" | "done",
///     }
/// }
/// ```
///
/// Aliases after `|` are accepted by [`parse`](#method.parse) but never emitted.
#[macro_export]
macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $text:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical wire / database spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }

            /// Parse the canonical spelling (or an accepted alias).
            pub fn parse(value: &str) -> Result<Self, $crate::error::CoreError> {
                match value {
                    $( $text $(| $alias)* => Ok($name::$variant), )+
                    other => Err($crate::error::CoreError::Validation(format!(
                        "Invalid {} '{}'. Must be one of: {}",
                        $label,
                        other,
                        Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::error::CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    define_text_enum! {
        /// Test-only enum.
        Light("light") {
            Red = "red",
            Green = "green" | "go",
        }
    }

    #[test]
    fn parses_canonical_and_alias() {
        assert_eq!(Light::parse("red").unwrap(), Light::Red);
        assert_eq!(Light::parse("go").unwrap(), Light::Green);
        assert_eq!(Light::Green.as_str(), "green");
    }

    #[test]
    fn unknown_value_lists_allowed_values() {
        let err = Light::parse("blue").unwrap_err().to_string();
        assert!(err.contains("Invalid light 'blue'"));
        assert!(err.contains("red, green"));
    }

    #[test]
    fn serde_uses_canonical_spelling() {
        let json = serde_json::to_string(&Light::Green).unwrap();
        assert_eq!(json, "\"green\"");
        let back: Light = serde_json::from_str("\"go\"").unwrap();
        assert_eq!(back, Light::Green);
        assert!(serde_json::from_str::<Light>("\"amber\"").is_err());
    }
}
