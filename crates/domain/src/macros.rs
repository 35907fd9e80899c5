//! Macro for implementing string conversions on fieldless domain enums
//!
//! Domain enums such as [`Capability`](crate::Capability) travel through
//! configuration files and log records as stable snake_case identifiers. This
//! macro generates the conversions in one place so the identifier table cannot
//! drift between `Display` and `FromStr`.
//!
//! # Example
//!
//! ```rust
//! use agendum_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Visibility {
//!     Public,
//!     Private,
//! }
//!
//! impl_domain_enum_conversions!(Visibility {
//!     Public => "public",
//!     Private => "private",
//! });
//!
//! assert_eq!(Visibility::Private.as_str(), "private");
//! assert_eq!("PUBLIC".parse::<Visibility>(), Ok(Visibility::Public));
//! ```

/// Implements `as_str`, `variants`, `Display` and `FromStr` for a fieldless
/// enum.
///
/// Parsing is case-insensitive and treats `-` as `_`, so `"get-in-period"`
/// and `"GET_IN_PERIOD"` both resolve to the variant declared as
/// `"get_in_period"`.
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stable identifier used in logs and configuration.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }

            /// Every variant in declaration order.
            #[must_use]
            pub const fn variants() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
