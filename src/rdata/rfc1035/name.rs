//! Records whose data is a single domain name.

//------------ Cname --------------------------------------------------------

name_type! {
    /// The canonical name of an alias (RFC 1035, 3.3.1).
    (Cname, CNAME, cname, compressed)
}

//------------ Mb -----------------------------------------------------------

name_type! {
    /// The host holding a mailbox (RFC 1035, 3.3.3). Experimental.
    (Mb, MB, madname, compressed)
}

//------------ Mg -----------------------------------------------------------

name_type! {
    /// A member of a mail group (RFC 1035, 3.3.6). Experimental.
    (Mg, MG, mgmname, compressed)
}

//------------ Mr -----------------------------------------------------------

name_type! {
    /// The new name of a renamed mailbox (RFC 1035, 3.3.8).
    /// Experimental.
    (Mr, MR, newname, compressed)
}

//------------ Ns -----------------------------------------------------------

name_type! {
    /// A name server authoritative for the owner (RFC 1035, 3.3.11).
    (Ns, NS, nsdname, compressed)
}

//------------ Ptr ----------------------------------------------------------

name_type! {
    /// A pointer to another place in the name space (RFC 1035, 3.3.12).
    ///
    /// Mostly used below `in-addr.arpa` and `ip6.arpa`.
    (Ptr, PTR, ptrdname, compressed)
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use crate::base::rdata::test::{test_compose_parse, test_display_scan};
    use crate::base::rdata::ComposeRecordData;
    use crate::base::wire::Composer;

    #[test]
    fn ns_compose_parse_scan() {
        let rdata = Ns::new(name("ns.example.com"));
        test_compose_parse(&rdata, Ns::parse);
        test_display_scan(&rdata, Ns::scan, "ns.example.com.");
    }

    #[test]
    fn cname_compresses() {
        let mut target = Composer::new();
        target.append_slice(&[0; 12]);
        target
            .append_compressed_name(&name("example.com"))
            .unwrap();
        Cname::new(name("www.example.com"))
            .compose_rdata(&mut target)
            .unwrap();
        assert_eq!(&target.as_slice()[25..], b"\x03www\xc0\x0c");
    }

    #[test]
    fn canonical_lowercases() {
        let rdata = Ptr::new(name("Host.Example"));
        assert_eq!(
            rdata.to_canonical_vec().unwrap(),
            b"\x04host\x07example\0"
        );
    }
}
