//! Macros for use in rdata definitions.
//!
//! These macros are not public but are used by the super module only. They
//! are here so that `mod.rs` doesn’t become too unwieldly.

/// Creates the [`AllRecordData`] enum and its dispatch code.
///
/// Takes a list of modules with the record data types they define. Each
/// type must have an `RTYPE` via `RtypeRecordData`, `parse` and `scan`
/// functions, implement `ComposeRecordData` and `Display`.
macro_rules! rdata_types {
    ( $( $module:ident::{ $( $rtype:ident, )* } )* ) => {
        use $crate::base::rdata::RtypeRecordData;

        $(
            pub use self::$module::{ $( $rtype, )* };
        )*

        //------------- AllRecordData ----------------------------------------

        /// Record data for all record types.
        ///
        /// This enum collects the record data types for all currently
        /// implemented record types. Data of any other type ends up in the
        /// `Unknown` variant as raw octets.
        #[derive(Clone, Debug, Eq, PartialEq)]
        #[non_exhaustive]
        pub enum AllRecordData {
            $( $(
                $rtype($rtype),
            )* )*
            Unknown($crate::base::rdata::UnknownRecordData),
        }

        impl AllRecordData {
            /// Returns whether there is a dedicated type for `rtype`.
            pub fn is_known(rtype: $crate::base::iana::Rtype) -> bool {
                $( $(
                    if rtype == <$rtype as RtypeRecordData>::RTYPE {
                        return true
                    }
                )* )*
                false
            }

            /// Parses record data for the given type.
            ///
            /// The parser must be limited to the record data. If there is
            /// no dedicated type for `rtype`, the data becomes unknown data.
            pub fn parse(
                rtype: $crate::base::iana::Rtype,
                parser: &mut $crate::base::wire::Parser,
            ) -> Result<Self, $crate::base::wire::ParseError> {
                $( $(
                    if rtype == <$rtype as RtypeRecordData>::RTYPE {
                        return $rtype::parse(parser).map(AllRecordData::$rtype)
                    }
                )* )*
                Ok(AllRecordData::Unknown(
                    $crate::base::rdata::UnknownRecordData::parse(
                        rtype, parser
                    )
                ))
            }

            /// Scans record data of the given type.
            ///
            /// Data in the generic format of RFC 3597 is converted into the
            /// dedicated type for `rtype` if there is one.
            pub fn scan(
                rtype: $crate::base::iana::Rtype,
                scanner: &mut $crate::base::scan::Scanner,
            ) -> Result<Self, $crate::base::scan::ScanError> {
                if scanner.skip_if("\\#") {
                    let data = $crate::base::rdata::UnknownRecordData
                        ::scan_without_marker(rtype, scanner)?;
                    return Self::from_unknown(data).map_err(|_| {
                        $crate::base::scan::ScanError::custom(
                            "malformed generic record data"
                        )
                    })
                }
                $( $(
                    if rtype == <$rtype as RtypeRecordData>::RTYPE {
                        return $rtype::scan(scanner).map(AllRecordData::$rtype)
                    }
                )* )*
                $crate::base::rdata::UnknownRecordData::scan(rtype, scanner)
                    .map(AllRecordData::Unknown)
            }

            /// Converts unknown data into the dedicated type if possible.
            ///
            /// The data is parsed as wire format record data. It has to be
            /// consumed completely.
            pub fn from_unknown(
                data: $crate::base::rdata::UnknownRecordData,
            ) -> Result<Self, $crate::base::wire::ParseError> {
                if !Self::is_known(data.rtype()) {
                    return Ok(AllRecordData::Unknown(data))
                }
                let mut parser = $crate::base::wire::Parser::from_slice(
                    data.data()
                );
                let res = Self::parse(data.rtype(), &mut parser)?;
                if parser.remaining() != 0 {
                    return Err($crate::base::wire::ParseError::form_error(
                        "trailing record data"
                    ))
                }
                Ok(res)
            }
        }

        //--- From

        $( $(
            impl From<$rtype> for AllRecordData {
                fn from(value: $rtype) -> Self {
                    AllRecordData::$rtype(value)
                }
            }
        )* )*

        impl From<$crate::base::rdata::UnknownRecordData> for AllRecordData {
            fn from(value: $crate::base::rdata::UnknownRecordData) -> Self {
                AllRecordData::Unknown(value)
            }
        }

        //--- RecordData and ComposeRecordData

        impl $crate::base::rdata::RecordData for AllRecordData {
            fn rtype(&self) -> $crate::base::iana::Rtype {
                match *self {
                    $( $(
                        AllRecordData::$rtype(_) => {
                            <$rtype as RtypeRecordData>::RTYPE
                        }
                    )* )*
                    AllRecordData::Unknown(ref inner) => inner.rtype(),
                }
            }
        }

        impl $crate::base::rdata::ParseRecordData for AllRecordData {
            fn parse_rdata(
                rtype: $crate::base::iana::Rtype,
                parser: &mut $crate::base::wire::Parser,
            ) -> Result<Option<Self>, $crate::base::wire::ParseError> {
                Self::parse(rtype, parser).map(Some)
            }
        }

        impl $crate::base::rdata::ComposeRecordData for AllRecordData {
            fn compose_rdata(
                &self,
                target: &mut $crate::base::wire::Composer,
            ) -> Result<(), $crate::base::wire::ComposeError> {
                match *self {
                    $( $(
                        AllRecordData::$rtype(ref inner) => {
                            $crate::base::rdata::ComposeRecordData
                                ::compose_rdata(inner, target)
                        }
                    )* )*
                    AllRecordData::Unknown(ref inner) => {
                        $crate::base::rdata::ComposeRecordData
                            ::compose_rdata(inner, target)
                    }
                }
            }

            fn compose_canonical_rdata(
                &self,
                target: &mut $crate::base::wire::Composer,
            ) -> Result<(), $crate::base::wire::ComposeError> {
                match *self {
                    $( $(
                        AllRecordData::$rtype(ref inner) => {
                            $crate::base::rdata::ComposeRecordData
                                ::compose_canonical_rdata(inner, target)
                        }
                    )* )*
                    AllRecordData::Unknown(ref inner) => {
                        $crate::base::rdata::ComposeRecordData
                            ::compose_canonical_rdata(inner, target)
                    }
                }
            }
        }

        //--- Display

        impl core::fmt::Display for AllRecordData {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                match *self {
                    $( $(
                        AllRecordData::$rtype(ref inner) => {
                            core::fmt::Display::fmt(inner, f)
                        }
                    )* )*
                    AllRecordData::Unknown(ref inner) => {
                        core::fmt::Display::fmt(inner, f)
                    }
                }
            }
        }
    }
}

/// Creates a record data type containing exactly one domain name.
///
/// The `compressed` or `uncompressed` argument decides whether the name
/// may be compressed when composing.
macro_rules! name_type {
    (@compose compressed, $target:expr, $name:expr) => {
        $target.append_compressed_name($name)
    };
    (@compose uncompressed, $target:expr, $name:expr) => {{
        $target.append_uncompressed_name($name);
        Ok(())
    }};

    ( $(#[$attr:meta])* ( $target:ident, $rtype:ident, $field:ident,
                          $compress:ident ) ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub struct $target {
            $field: $crate::base::name::Name,
        }

        impl $target {
            pub fn new($field: $crate::base::name::Name) -> Self {
                $target { $field }
            }

            pub fn $field(&self) -> &$crate::base::name::Name {
                &self.$field
            }

            pub fn into_name(self) -> $crate::base::name::Name {
                self.$field
            }

            pub fn parse(
                parser: &mut $crate::base::wire::Parser,
            ) -> Result<Self, $crate::base::wire::ParseError> {
                $crate::base::name::Name::parse(parser).map(Self::new)
            }

            pub fn scan(
                scanner: &mut $crate::base::scan::Scanner,
            ) -> Result<Self, $crate::base::scan::ScanError> {
                scanner.scan_name().map(Self::new)
            }
        }

        //--- From and FromStr

        impl From<$crate::base::name::Name> for $target {
            fn from(name: $crate::base::name::Name) -> Self {
                Self::new(name)
            }
        }

        impl core::str::FromStr for $target {
            type Err = $crate::base::name::NameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$crate::base::name::Name as core::str::FromStr>::from_str(s)
                    .map(Self::new)
            }
        }

        //--- RtypeRecordData, ComposeRecordData

        impl $crate::base::rdata::RtypeRecordData for $target {
            const RTYPE: $crate::base::iana::Rtype =
                $crate::base::iana::Rtype::$rtype;
        }

        impl $crate::base::rdata::ComposeRecordData for $target {
            fn compose_rdata(
                &self,
                target: &mut $crate::base::wire::Composer,
            ) -> Result<(), $crate::base::wire::ComposeError> {
                name_type!(@compose $compress, target, &self.$field)
            }

            fn compose_canonical_rdata(
                &self,
                target: &mut $crate::base::wire::Composer,
            ) -> Result<(), $crate::base::wire::ComposeError> {
                target.append_canonical_name(&self.$field);
                Ok(())
            }
        }

        //--- Display

        impl core::fmt::Display for $target {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(f, "{}", self.$field.fqdn())
            }
        }
    };
}
