//! DNS CLASSes.

//------------ Class ---------------------------------------------------------

registry! {
    /// The class of a record or question.
    ///
    /// Every class has its own name space, though only IN sees real use.
    /// NONE and ANY only appear in questions and UPDATE messages. Since the
    /// OPT record stores its UDP payload size here, any 16 bit value can
    /// show up.
    pub struct Class(u16);
    generic "CLASS";
    error "unknown class";

    /// Internet (IN).
    IN = 1, "IN";

    /// Chaosnet (CH).
    CH = 3, "CH", "CHAOS";

    /// Hesiod (HS).
    HS = 4, "HS", "HESIOD";

    /// Query class None.
    ///
    /// Used in UPDATE messages to mark records for deletion.
    NONE = 254, "NONE";

    /// Query class * (ANY).
    ANY = 255, "ANY";
}

//============ Tests =========================================================
