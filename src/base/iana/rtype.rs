//! Record types.

//------------ Rtype ---------------------------------------------------------

registry! {
    /// The type of a record or question.
    ///
    /// Besides the types of actual records, this also covers the query
    /// types such as AXFR or ANY that only appear in questions. Types
    /// without a mnemonic here are shown as `TYPE###`.
    pub struct Rtype(u16);
    generic "TYPE";
    error "unknown record type";

    /// A host address.
    A = 1, "A";

    /// An authoritative name server.
    NS = 2, "NS";

    /// A mail destination (obsolete – use MX).
    MD = 3, "MD";

    /// A mail forwarder (obsolete – use MX).
    MF = 4, "MF";

    /// The canonical name for an alias.
    CNAME = 5, "CNAME";

    /// Marks the start of a zone of authority.
    SOA = 6, "SOA";

    /// A mailbox domain name.
    MB = 7, "MB";

    /// A mail group member.
    MG = 8, "MG";

    /// A mail rename domain name.
    MR = 9, "MR";

    /// A null resource record.
    NULL = 10, "NULL";

    /// A well known service description.
    WKS = 11, "WKS";

    /// A domain name pointer.
    PTR = 12, "PTR";

    /// Host information.
    HINFO = 13, "HINFO";

    /// Mailbox or mail list information.
    MINFO = 14, "MINFO";

    /// Mail exchange.
    MX = 15, "MX";

    /// Text strings.
    TXT = 16, "TXT";

    /// For Responsible Person.
    RP = 17, "RP";

    /// For AFS Data Base location.
    AFSDB = 18, "AFSDB";

    /// For X.25 PSDN address.
    X25 = 19, "X25";

    /// For ISDN address.
    ISDN = 20, "ISDN";

    /// For Route Through.
    RT = 21, "RT";

    /// For NSAP address, NSAP style A record.
    NSAP = 22, "NSAP";

    /// For domain name pointer, NSAP style.
    NSAPPTR = 23, "NSAP-PTR", "NSAP_PTR";

    /// For security signature.
    SIG = 24, "SIG";

    /// For security key.
    KEY = 25, "KEY";

    /// X.400 mail mapping information.
    PX = 26, "PX";

    /// Geographical position.
    GPOS = 27, "GPOS";

    /// IPv6 address.
    AAAA = 28, "AAAA";

    /// Location information.
    LOC = 29, "LOC";

    /// Next domain (obsolete).
    NXT = 30, "NXT";

    /// Endpoint identifier.
    EID = 31, "EID";

    /// Nimrod locator.
    NIMLOC = 32, "NIMLOC";

    /// Server selection.
    SRV = 33, "SRV";

    /// ATM address.
    ATMA = 34, "ATMA";

    /// Naming authority pointer.
    NAPTR = 35, "NAPTR";

    /// Key exchanger.
    KX = 36, "KX";

    /// CERT
    CERT = 37, "CERT";

    /// DNAME.
    DNAME = 39, "DNAME";

    /// OPT.
    ///
    /// The pseudo-record carrying EDNS information.
    OPT = 41, "OPT";

    /// Delegation signer.
    DS = 43, "DS";

    /// SSH key fingerprint.
    SSHFP = 44, "SSHFP";

    /// RRSIG.
    RRSIG = 46, "RRSIG";

    /// NSEC.
    NSEC = 47, "NSEC";

    /// DNSKEY.
    DNSKEY = 48, "DNSKEY";

    /// Sender Policy Framework.
    SPF = 99, "SPF";

    /// Transaction key.
    TKEY = 249, "TKEY";

    /// Transaction signature.
    TSIG = 250, "TSIG";

    /// Incremental transfer.
    IXFR = 251, "IXFR";

    /// Transfer of entire zone.
    AXFR = 252, "AXFR";

    /// Mailbox-related RRs (MB, MG, or MR).
    MAILB = 253, "MAILB";

    /// Mail agent RRS (obsolete – see MX).
    MAILA = 254, "MAILA";

    /// A request for all records the server/cache has available.
    ANY = 255, "ANY";
}

impl Rtype {
    /// Returns whether the type may only appear in questions.
    pub fn is_qtype(self) -> bool {
        matches!(
            self,
            Rtype::IXFR | Rtype::AXFR | Rtype::MAILB | Rtype::MAILA | Rtype::ANY
        )
    }

    /// Returns whether this is a pseudo type that has no zone file form.
    pub fn is_pseudo(self) -> bool {
        matches!(self, Rtype::OPT | Rtype::TSIG | Rtype::TKEY)
    }
}

//============ Tests =========================================================
