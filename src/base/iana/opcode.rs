//! DNS OpCodes

//------------ Opcode --------------------------------------------------------

registry! {
    /// DNS OpCodes.
    ///
    /// The opcode specifies the kind of query to be performed. It is a four
    /// bit field in the header of a DNS message.
    pub struct Opcode(u8);
    generic decimal;
    error "unknown opcode";

    /// A standard query.
    ///
    /// This query requests all records matching the name, class, and record
    /// type given in the query’s question section.
    QUERY = 0, "QUERY";

    /// An inverse query (IQUERY) (obsolete).
    IQUERY = 1, "IQUERY";

    /// A server status request.
    STATUS = 2, "STATUS";

    /// A NOTIFY query.
    ///
    /// NOTIFY queries allow primary servers to inform secondary servers
    /// when a zone has changed.
    NOTIFY = 4, "NOTIFY", "NS_NOTIFY_OP";

    /// An UPDATE query.
    ///
    /// The UPDATE query can be used to alter zone content managed by an
    /// authoritative server.
    UPDATE = 5, "UPDATE";
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_str() {
        assert_eq!("update".parse::<Opcode>(), Ok(Opcode::UPDATE));
        assert_eq!("NS_NOTIFY_OP".parse::<Opcode>(), Ok(Opcode::NOTIFY));
        assert_eq!("3".parse::<Opcode>(), Ok(Opcode::from_int(3)));
        assert_eq!(Opcode::from_int(3).to_string(), "3");
    }
}
