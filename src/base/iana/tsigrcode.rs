//! Error codes of TSIG and TKEY records.

//------------ TsigRcode -----------------------------------------------------

registry! {
    /// Response codes carried in the error field of TSIG and TKEY records.
    ///
    /// These extend the header RCODE to 16 bits. Values below 16 have the
    /// same meaning as the header codes.
    pub struct TsigRcode(u16);
    generic decimal;
    error "unknown TSIG error";

    NOERROR = 0, "NOERROR";
    FORMERR = 1, "FORMERR";
    SERVFAIL = 2, "SERVFAIL";
    NXDOMAIN = 3, "NXDOMAIN";
    NOTIMP = 4, "NOTIMP";
    REFUSED = 5, "REFUSED";
    NOTAUTH = 9, "NOTAUTH";

    /// TSIG signature failure.
    BADSIG = 16, "BADSIG";

    /// Key not recognized.
    BADKEY = 17, "BADKEY";

    /// Signature out of time window.
    BADTIME = 18, "BADTIME";

    /// Bad TKEY mode.
    BADMODE = 19, "BADMODE";

    /// Duplicate key name.
    BADNAME = 20, "BADNAME";

    /// Algorithm not supported.
    BADALG = 21, "BADALG";
}

