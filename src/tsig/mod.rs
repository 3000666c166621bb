//! Support for TSIG.
//!
//! This module provides support for signing messages with TSIG as defined
//! in [RFC 2845].
//!
//! TSIG is intended to provide authentication for message exchanges.
//! Messages are signed using a secret key shared between the two
//! participants. The party sending the request, the client, generates a
//! signature over the message it is about to send using that key and adds
//! it in a special record of record type [TSIG] to the additional section
//! of the message. When creating an answer, the server includes the
//! request’s signature in its own signature in order to bind request and
//! answer together.
//!
//! The actual signature function is provided through the [`Signer`] trait.
//! With the `tsig` feature enabled, the module also provides [`Key`], a
//! signer that uses HMAC with one of the SHA based algorithms of
//! [RFC 4635]. We don’t support HMAC-MD5.
//!
//! Use [`sign_request`] to sign an outgoing message and [`verify_answer`]
//! to check the signature of the answer to it.
//!
//! [RFC 2845]: https://tools.ietf.org/html/rfc2845
//! [RFC 4635]: https://tools.ietf.org/html/rfc4635
//! [TSIG]: crate::rdata::Tsig

use crate::base::header::{Header, HeaderCounts};
use crate::base::iana::{Class, TsigRcode};
use crate::base::message::{Message, Section};
use crate::base::name::Name;
use crate::base::question::Question;
use crate::base::record::Record;
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use crate::rdata::{AllRecordData, Time48, Tsig};
use bytes::Bytes;
use core::fmt;
use tracing::debug;

#[cfg(feature = "tsig")]
pub use self::hmac::{Algorithm, AlgorithmError, Key};

#[cfg(feature = "tsig")]
mod hmac;

/// The default fudge in seconds.
pub const DEFAULT_FUDGE: u16 = 300;

//------------ Signer --------------------------------------------------------

/// A type that can create TSIG signatures.
pub trait Signer {
    /// Returns the name of the key.
    fn key_name(&self) -> &Name;

    /// Returns the domain name of the signing algorithm.
    fn algorithm(&self) -> &Name;

    /// Creates a signature over `data`.
    fn sign(&self, data: &[u8]) -> Bytes;

    /// Checks that `mac` is the signature over `data`.
    fn verify(&self, data: &[u8], mac: &[u8]) -> bool {
        let expected = self.sign(data);
        expected.len() == mac.len()
            && expected
                .iter()
                .zip(mac)
                .fold(0u8, |acc, (left, right)| acc | (left ^ right))
                == 0
    }
}

impl<T: Signer + ?Sized> Signer for std::sync::Arc<T> {
    fn key_name(&self) -> &Name {
        (**self).key_name()
    }

    fn algorithm(&self) -> &Name {
        (**self).algorithm()
    }

    fn sign(&self, data: &[u8]) -> Bytes {
        (**self).sign(data)
    }

    fn verify(&self, data: &[u8], mac: &[u8]) -> bool {
        (**self).verify(data, mac)
    }
}

//------------ Signing -------------------------------------------------------

/// Signs a request.
///
/// Appends a TSIG record to the additional section of `message` and
/// returns the signature. This needs to be kept for checking the answer.
/// If the message already has a TSIG record, it is left alone and its
/// signature is returned.
pub fn sign_request(
    message: &mut Message,
    signer: &dyn Signer,
    time_signed: Time48,
    fudge: u16,
) -> Result<Bytes, ComposeError> {
    if let Some(AllRecordData::Tsig(tsig)) = message.tsig().map(Record::data)
    {
        return Ok(tsig.mac().clone());
    }
    let mut data = Composer::new();
    message.compose(&mut data)?;
    compose_variables(
        &mut data,
        signer,
        time_signed,
        fudge,
        TsigRcode::NOERROR,
        &[],
    );
    let mac = signer.sign(data.as_slice());
    debug!("signed message {} with key {}", message.id(), signer.key_name());
    message.push(
        Section::Additional,
        Record::new(
            signer.key_name().clone(),
            Class::ANY,
            0,
            Tsig::new(
                signer.algorithm().clone(),
                time_signed,
                fudge,
                mac.clone(),
                message.id(),
                TsigRcode::NOERROR,
                Bytes::new(),
            ),
        ),
    );
    Ok(mac)
}

/// Checks the signature of an answer in wire format.
///
/// The answer must end in a TSIG record for the signer’s key whose
/// signature covers the request signature `request_mac`, the answer
/// without the TSIG record and with the original ID, and the TSIG
/// variables. The time signed must be within the fudge of `now`.
pub fn verify_answer(
    answer: &[u8],
    request_mac: &[u8],
    signer: &dyn Signer,
    now: Time48,
) -> Result<(), ValidationError> {
    let (start, record) = find_tsig(answer)?;
    let tsig = match record.data() {
        AllRecordData::Tsig(tsig) => tsig,
        _ => return Err(ValidationError::Unsigned),
    };
    if record.owner() != signer.key_name()
        || tsig.algorithm() != signer.algorithm()
    {
        return Err(ValidationError::BadKey);
    }
    if tsig.error() != TsigRcode::NOERROR {
        return Err(ValidationError::ServerError(tsig.error()));
    }

    let mut data = Composer::without_compression();
    data.append_u16(request_mac.len() as u16);
    data.append_slice(request_mac);
    let body_start = data.len();
    data.append_slice(&answer[..start]);
    let header = &mut data.as_slice_mut()[body_start..];
    header[..2].copy_from_slice(&tsig.original_id().to_be_bytes());
    let arcount = u16::from_be_bytes([header[10], header[11]]);
    header[10..12].copy_from_slice(&arcount.saturating_sub(1).to_be_bytes());
    compose_variables(
        &mut data,
        signer,
        tsig.time_signed(),
        tsig.fudge(),
        tsig.error(),
        tsig.other(),
    );
    if !signer.verify(data.as_slice(), tsig.mac()) {
        return Err(ValidationError::BadSig);
    }
    if !tsig.is_valid_at(now) {
        return Err(ValidationError::BadTime);
    }
    Ok(())
}

/// Finds the TSIG record at the end of a message.
///
/// Returns the position of the record and the record itself.
fn find_tsig(message: &[u8]) -> Result<(usize, Record), ValidationError> {
    let mut parser = Parser::from_slice(message);
    Header::parse(&mut parser)?;
    let counts = HeaderCounts::parse(&mut parser)?;
    if counts.arcount() == 0 {
        return Err(ValidationError::Unsigned);
    }
    for _ in 0..counts.qdcount() {
        Question::parse(&mut parser)?;
    }
    let records = u32::from(counts.ancount())
        + u32::from(counts.nscount())
        + u32::from(counts.arcount());
    for _ in 1..records {
        Record::parse(&mut parser)?;
    }
    let start = parser.pos();
    let record = Record::parse(&mut parser)?;
    Ok((start, record))
}

/// Appends the TSIG variables to the data to be signed.
fn compose_variables(
    target: &mut Composer,
    signer: &dyn Signer,
    time_signed: Time48,
    fudge: u16,
    error: TsigRcode,
    other: &[u8],
) {
    target.append_canonical_name(signer.key_name());
    Class::ANY.compose(target);
    target.append_u32(0);
    target.append_canonical_name(signer.algorithm());
    time_signed.compose(target);
    target.append_u16(fudge);
    error.compose(target);
    target.append_u16(other.len() as u16);
    target.append_slice(other);
}

//------------ ValidationError -----------------------------------------------

/// A signed answer could not be validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// The answer has no TSIG record.
    Unsigned,

    /// The answer was signed with a different key.
    BadKey,

    /// The signature is wrong.
    BadSig,

    /// The signature is outside its validity period.
    BadTime,

    /// The server reported an error.
    ServerError(TsigRcode),

    /// The answer could not be parsed.
    Form(ParseError),
}

impl From<ParseError> for ValidationError {
    fn from(err: ParseError) -> Self {
        ValidationError::Form(err)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ValidationError::Unsigned => f.write_str("answer is not signed"),
            ValidationError::BadKey => f.write_str("unknown key"),
            ValidationError::BadSig => f.write_str("bad signature"),
            ValidationError::BadTime => f.write_str("signature expired"),
            ValidationError::ServerError(rcode) => {
                write!(f, "server error {}", rcode)
            }
            ValidationError::Form(ref err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ValidationError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::Rtype;
    use crate::base::name::test::name;

    /// A signer that “signs” by summing up the data.
    struct SumSigner {
        key: Name,
        alg: Name,
    }

    impl Signer for SumSigner {
        fn key_name(&self) -> &Name {
            &self.key
        }

        fn algorithm(&self) -> &Name {
            &self.alg
        }

        fn sign(&self, data: &[u8]) -> Bytes {
            let sum = data.iter().fold(0u32, |sum, ch| sum + u32::from(*ch));
            Bytes::copy_from_slice(&sum.to_be_bytes())
        }
    }

    fn signer() -> SumSigner {
        SumSigner {
            key: name("key.example"),
            alg: name("sum.example"),
        }
    }

    fn query() -> Message {
        Message::query(Question::new_in(name("example.com"), Rtype::A), 4711)
    }

    #[test]
    fn sign_adds_record() {
        let mut msg = query();
        let time = Time48::from_u64(1_700_000_000);
        let mac = sign_request(&mut msg, &signer(), time, DEFAULT_FUDGE).unwrap();
        let record = msg.tsig().unwrap();
        assert_eq!(record.owner(), &name("key.example"));
        assert_eq!(record.class(), Class::ANY);
        match record.data() {
            AllRecordData::Tsig(tsig) => {
                assert_eq!(tsig.mac(), &mac);
                assert_eq!(tsig.original_id(), 4711);
                assert_eq!(tsig.fudge(), 300);
            }
            _ => panic!("not a TSIG record"),
        }

        // Signing again leaves the message alone.
        let again = sign_request(&mut msg, &signer(), time, 10).unwrap();
        assert_eq!(again, mac);
        assert_eq!(msg.additional().len(), 1);
    }

    fn signed_answer(request_mac: &[u8], answer_id: u16) -> Bytes {
        let signer = signer();
        let time = Time48::now();
        let mut answer = Message::reply_to(&query());
        let mut data = Composer::without_compression();
        data.append_u16(request_mac.len() as u16);
        data.append_slice(request_mac);
        data.append_slice(&answer.to_wire().unwrap());
        compose_variables(
            &mut data,
            &signer,
            time,
            DEFAULT_FUDGE,
            TsigRcode::NOERROR,
            &[],
        );
        let mac = signer.sign(data.as_slice());
        answer.push(
            Section::Additional,
            Record::new(
                signer.key_name().clone(),
                Class::ANY,
                0,
                Tsig::new(
                    signer.algorithm().clone(),
                    time,
                    DEFAULT_FUDGE,
                    mac,
                    answer.id(),
                    TsigRcode::NOERROR,
                    Bytes::new(),
                ),
            ),
        );
        answer.set_id(answer_id);
        answer.to_wire().unwrap()
    }

    #[test]
    fn verify() {
        let request_mac = b"\x01\x02\x03\x04";
        let wire = signed_answer(request_mac, 4711);
        assert_eq!(
            verify_answer(&wire, request_mac, &signer(), Time48::now()),
            Ok(())
        );
        assert_eq!(
            verify_answer(&wire, b"\x01\x02\x03\x05", &signer(), Time48::now()),
            Err(ValidationError::BadSig)
        );
        assert_eq!(
            verify_answer(&wire, request_mac, &signer(), Time48::from_u64(0)),
            Err(ValidationError::BadTime)
        );

        // The ID may have been changed in transit.
        let wire = signed_answer(request_mac, 1);
        assert_eq!(
            verify_answer(&wire, request_mac, &signer(), Time48::now()),
            Ok(())
        );

        let unsigned = query().to_wire().unwrap();
        assert_eq!(
            verify_answer(&unsigned, request_mac, &signer(), Time48::now()),
            Err(ValidationError::Unsigned)
        );
    }
}
