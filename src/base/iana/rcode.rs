//! DNS response codes.
//!
//! The response code of a response indicates what happend on the server
//! when trying to answer the query. The code is a four bit value in the
//! message header.

//------------ Rcode ---------------------------------------------------------

registry! {
    /// DNS Response Codes.
    ///
    /// This type covers the values that fit into the four bit RCODE field
    /// of the header. Values defined by RFC 2136 for UPDATE are included.
    pub struct Rcode(u8);
    generic decimal;
    error "unknown rcode";

    /// No error condition.
    NOERROR = 0, "NOERROR";

    /// Format error.
    ///
    /// The name server was unable to interpret the query.
    FORMERR = 1, "FORMERR";

    /// Server failure.
    ///
    /// The name server was unable to process this query due to a problem
    /// with the name server.
    SERVFAIL = 2, "SERVFAIL";

    /// Name error.
    ///
    /// The domain name given in the query does not exist at the name server.
    NXDOMAIN = 3, "NXDOMAIN";

    /// Not implemented.
    NOTIMP = 4, "NOTIMP";

    /// Query refused.
    REFUSED = 5, "REFUSED";

    /// Name exists when it should not.
    YXDOMAIN = 6, "YXDOMAIN";

    /// RR set exists when it should not.
    YXRRSET = 7, "YXRRSET";

    /// RR set that should exist does not.
    NXRRSET = 8, "NXRRSET";

    /// Server not authoritative for zone or client not authorized.
    NOTAUTH = 9, "NOTAUTH";

    /// Name not contained in zone.
    NOTZONE = 10, "NOTZONE";
}

impl Rcode {
    /// Returns whether a response with this code ends a query.
    ///
    /// These are the codes a resolver accepts right away. All others make
    /// it try the next server.
    pub fn is_final(self) -> bool {
        self == Rcode::NOERROR || self == Rcode::NXDOMAIN
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Rcode::NXDOMAIN.to_string(), "NXDOMAIN");
        assert_eq!(Rcode::from_int(12).to_string(), "12");
        assert_eq!("servfail".parse::<Rcode>(), Ok(Rcode::SERVFAIL));
    }

    #[test]
    fn is_final() {
        assert!(Rcode::NOERROR.is_final());
        assert!(Rcode::NXDOMAIN.is_final());
        assert!(!Rcode::SERVFAIL.is_final());
        assert!(!Rcode::REFUSED.is_final());
    }
}
