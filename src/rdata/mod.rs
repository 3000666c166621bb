//! Record data implementations.
//!
//! This module contains the implementations for the record data of all
//! supported record types.
//!
//! The types are named identically to the [`Rtype`] constant they
//! implement. They are grouped into submodules for the RFCs they are
//! defined in. All types are also re-exported at the top level here. Ie.,
//! for the AAAA record type, you can simply `use netdns::rdata::Aaaa`
//! instead of `use netdns::rdata::rfc3596::Aaaa` which nobody could
//! possibly remember. There are, however, some helper data types defined
//! here and there which are not re-exported to keep things somewhat tidy.
//!
//! The [`AllRecordData`] enum collects all these types plus raw data for
//! everything else. It is the record data type used by messages.
//!
//! [`Rtype`]: crate::base::iana::Rtype

#[macro_use]
mod macros;

pub mod rfc1035;
pub mod rfc1183;
pub mod rfc1706;
pub mod rfc1876;
pub mod rfc2163;
pub mod rfc2782;
pub mod rfc2845;
pub mod rfc2930;
pub mod rfc3403;
pub mod rfc3596;
pub mod rfc4255;
pub mod rfc4398;
pub mod rfc4408;
pub mod rfc6672;
pub mod rfc6891;

pub use self::rfc2845::Time48;
pub use self::rfc6891::OptOption;

rdata_types! {
    rfc1035::{
        A,
        Cname,
        Hinfo,
        Mb,
        Mg,
        Minfo,
        Mr,
        Mx,
        Ns,
        Null,
        Ptr,
        Soa,
        Txt,
    }
    rfc1183::{
        Afsdb,
        Isdn,
        Rp,
        Rt,
        X25,
    }
    rfc1706::{
        Nsap,
    }
    rfc1876::{
        Loc,
    }
    rfc2163::{
        Px,
    }
    rfc2782::{
        Srv,
    }
    rfc2845::{
        Tsig,
    }
    rfc2930::{
        Tkey,
    }
    rfc3403::{
        Naptr,
    }
    rfc3596::{
        Aaaa,
    }
    rfc4255::{
        Sshfp,
    }
    rfc4398::{
        Cert,
    }
    rfc4408::{
        Spf,
    }
    rfc6672::{
        Dname,
    }
    rfc6891::{
        Opt,
    }
}

//============ Testing =======================================================
