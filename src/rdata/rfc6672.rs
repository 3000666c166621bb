//! Record data from [RFC 6672]: DNAME records.
//!
//! [RFC 6672]: https://tools.ietf.org/html/rfc6672

name_type! {
    /// Dname record data.
    ///
    /// The record redirects a whole subtree of the namespace to another
    /// domain. Its target must not be compressed.
    (Dname, DNAME, dname, uncompressed)
}

//============ Testing =======================================================
