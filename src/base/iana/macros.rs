//! The macro behind all registry types.

/// Defines a registry type wrapping an integer.
///
/// Each entry gets an associated constant. Entries may list additional
/// mnemonics after their primary one. These are accepted when reading but
/// never written.
///
/// The `generic` line decides how values without a mnemonic appear in text:
/// either as a plain `decimal` number or as a number following a prefix,
/// such as `TYPE` in `TYPE1234`.
macro_rules! registry {
    (
        $(#[$attr:meta])*
        pub struct $name:ident($int:ident);
        generic $generic:tt;
        error $error:expr;
        $(
            $(#[$entry_attr:meta])*
            $entry:ident = $value:expr, $mnemonic:expr $(, $alias:expr)*;
        )*
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $name($int);

        impl $name {
            $(
                $(#[$entry_attr])*
                pub const $entry: $name = $name($value);
            )*

            /// Creates a value from the raw integer.
            #[must_use]
            pub const fn from_int(value: $int) -> Self {
                $name(value)
            }

            /// Returns the raw integer.
            #[must_use]
            pub const fn to_int(self) -> $int {
                self.0
            }

            /// Returns the primary mnemonic if the value has one.
            #[must_use]
            pub const fn mnemonic(self) -> Option<&'static str> {
                match self {
                    $( $name::$entry => Some($mnemonic), )*
                    _ => None,
                }
            }

            /// Looks up a mnemonic ignoring case.
            fn lookup(text: &str) -> Option<Self> {
                $(
                    if text.eq_ignore_ascii_case($mnemonic)
                        $( || text.eq_ignore_ascii_case($alias) )*
                    {
                        return Some($name::$entry);
                    }
                )*
                None
            }

            /// Takes a value from the beginning of a parser.
            pub fn parse(
                parser: &mut $crate::base::wire::Parser,
            ) -> Result<Self, $crate::base::wire::ParseError> {
                registry!(@parse $int, parser).map($name)
            }

            /// Appends the wire format of the value.
            pub fn compose(&self, target: &mut $crate::base::wire::Composer) {
                registry!(@compose $int, self.0, target)
            }
        }

        impl From<$int> for $name {
            fn from(value: $int) -> Self {
                $name(value)
            }
        }

        impl From<$name> for $int {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $name {
            type Err = FromStrError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::lookup(s)
                    .or_else(|| registry!(@from_generic $generic, s))
                    .ok_or(FromStrError)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                match self.mnemonic() {
                    Some(mnemonic) => f.write_str(mnemonic),
                    None => registry!(@to_generic $generic, f, self.0),
                }
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                match self.mnemonic() {
                    Some(mnemonic) => {
                        write!(f, "{}::{}", stringify!($name), mnemonic)
                    }
                    None => write!(f, "{}({})", stringify!($name), self.0),
                }
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let text = <String as serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }

        /// A string wasn’t a known mnemonic or number.
        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        pub struct FromStrError;

        impl core::fmt::Display for FromStrError {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                f.write_str($error)
            }
        }

        impl std::error::Error for FromStrError {}
    };

    (@parse u8, $parser:expr) => { $parser.parse_u8() };
    (@parse u16, $parser:expr) => { $parser.parse_u16() };
    (@compose u8, $value:expr, $target:expr) => { $target.append_u8($value) };
    (@compose u16, $value:expr, $target:expr) => {
        $target.append_u16($value)
    };

    (@from_generic decimal, $text:expr) => { $text.parse().ok().map(Self) };
    (@from_generic $prefix:literal, $text:expr) => {{
        let text: &str = $text;
        match text.get(..$prefix.len()) {
            Some(head)
                if head.eq_ignore_ascii_case($prefix)
                    && text.len() > $prefix.len()
                    && text[$prefix.len()..].bytes().all(|ch| {
                        ch.is_ascii_digit()
                    }) =>
            {
                text[$prefix.len()..].parse().ok().map(Self)
            }
            _ => None,
        }
    }};

    (@to_generic decimal, $f:expr, $value:expr) => { write!($f, "{}", $value) };
    (@to_generic $prefix:literal, $f:expr, $value:expr) => {
        write!($f, "{}{}", $prefix, $value)
    };
}
