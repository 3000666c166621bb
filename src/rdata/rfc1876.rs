//! Record data from [RFC 1876]: LOC records.
//!
//! [RFC 1876]: https://tools.ietf.org/html/rfc1876

use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::fmt;

/// The latitude or longitude value of the equator or prime meridian.
const REFERENCE_LATLON: u32 = 1 << 31;

/// The altitude value of 100,000 meters below the WGS 84 spheroid.
const REFERENCE_ALT: u32 = 10_000_000;

const CONV_SEC: u32 = 1000;
const CONV_MIN: u32 = 60 * CONV_SEC;
const CONV_DEG: u32 = 60 * CONV_MIN;

/// Default size in centimeters.
const DEFAULT_SIZE: u64 = 100;

/// Default horizontal precision in centimeters.
const DEFAULT_HORIZ_PRE: u64 = 1_000_000;

/// Default vertical precision in centimeters.
const DEFAULT_VERT_PRE: u64 = 1_000;

//------------ Loc ----------------------------------------------------------

/// Loc record data.
///
/// The record describes the location of the owner as latitude, longitude,
/// and altitude together with the size of the located entity and the
/// precision of the data. Values are kept in their wire encoding. Only
/// version 0 of the format exists.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Loc {
    size: u8,
    horiz_pre: u8,
    vert_pre: u8,
    latitude: u32,
    longitude: u32,
    altitude: u32,
}

impl Loc {
    /// Creates record data from wire values.
    pub fn new(
        size: u8,
        horiz_pre: u8,
        vert_pre: u8,
        latitude: u32,
        longitude: u32,
        altitude: u32,
    ) -> Self {
        Loc {
            size,
            horiz_pre,
            vert_pre,
            latitude,
            longitude,
            altitude,
        }
    }

    /// Creates record data from human friendly values.
    ///
    /// Latitude and longitude are given in thousandths of a second of arc
    /// with positive values north and east. The altitude is in centimeters
    /// above the reference spheroid. Size and precisions are in
    /// centimeters.
    pub fn from_values(
        latitude_msec: i64,
        longitude_msec: i64,
        altitude_cm: i64,
        size_cm: u64,
        horiz_pre_cm: u64,
        vert_pre_cm: u64,
    ) -> Self {
        Loc::new(
            precsize_valton(size_cm),
            precsize_valton(horiz_pre_cm),
            precsize_valton(vert_pre_cm),
            (i64::from(REFERENCE_LATLON) + latitude_msec) as u32,
            (i64::from(REFERENCE_LATLON) + longitude_msec) as u32,
            (i64::from(REFERENCE_ALT) + altitude_cm) as u32,
        )
    }

    pub fn version(&self) -> u8 {
        0
    }

    /// The diameter of the sphere enclosing the entity in centimeters.
    pub fn size(&self) -> u64 {
        precsize_ntoval(self.size)
    }

    /// The horizontal precision in centimeters.
    pub fn horiz_pre(&self) -> u64 {
        precsize_ntoval(self.horiz_pre)
    }

    /// The vertical precision in centimeters.
    pub fn vert_pre(&self) -> u64 {
        precsize_ntoval(self.vert_pre)
    }

    /// The raw latitude.
    pub fn latitude(&self) -> u32 {
        self.latitude
    }

    /// The raw longitude.
    pub fn longitude(&self) -> u32 {
        self.longitude
    }

    /// The raw altitude.
    pub fn altitude(&self) -> u32 {
        self.altitude
    }

    /// Returns latitude and longitude in degrees.
    pub fn latlon(&self) -> (f64, f64) {
        (latlon2deg(self.latitude), latlon2deg(self.longitude))
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        if parser.parse_u8()? != 0 {
            return Err(ParseError::form_error("unsupported LOC version"));
        }
        Ok(Loc::new(
            parser.parse_u8()?,
            parser.parse_u8()?,
            parser.parse_u8()?,
            parser.parse_u32()?,
            parser.parse_u32()?,
            parser.parse_u32()?,
        ))
    }

    /// Scans the presentation format.
    ///
    /// The format is `d1 [m1 [s1]] {N|S} d2 [m2 [s2]] {E|W} alt[m]
    /// [siz[m] [hp[m] [vp[m]]]]`.
    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let latitude = scan_latlon(scanner, "N", "S")?;
        let longitude = scan_latlon(scanner, "E", "W")?;
        let altitude = scan_meters(scanner)?;
        let size = scan_opt_precision(scanner, DEFAULT_SIZE)?;
        let horiz_pre = scan_opt_precision(scanner, DEFAULT_HORIZ_PRE)?;
        let vert_pre = scan_opt_precision(scanner, DEFAULT_VERT_PRE)?;
        Ok(Loc::from_values(
            latitude, longitude, altitude, size, horiz_pre, vert_pre,
        ))
    }
}

impl RtypeRecordData for Loc {
    const RTYPE: Rtype = Rtype::LOC;
}

impl ComposeRecordData for Loc {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_u8(0);
        target.append_u8(self.size);
        target.append_u8(self.horiz_pre);
        target.append_u8(self.vert_pre);
        target.append_u32(self.latitude);
        target.append_u32(self.longitude);
        target.append_u32(self.altitude);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_latlon(self.latitude, "N", "S", f)?;
        f.write_str(" ")?;
        fmt_latlon(self.longitude, "E", "W", f)?;
        f.write_str(" ")?;
        fmt_meters(i64::from(self.altitude) - i64::from(REFERENCE_ALT), f)?;
        for value in [self.size(), self.horiz_pre(), self.vert_pre()] {
            f.write_str(" ")?;
            fmt_meters(value as i64, f)?;
        }
        Ok(())
    }
}

//------------ Helper Functions ---------------------------------------------

/// Decodes the size and precision format into centimeters.
fn precsize_ntoval(prec: u8) -> u64 {
    let mantissa = u64::from((prec >> 4) % 10);
    let exponent = u32::from((prec & 0x0f) % 10);
    mantissa * 10u64.pow(exponent)
}

/// Encodes centimeters into the size and precision format.
fn precsize_valton(mut val: u64) -> u8 {
    let mut exponent = 0u8;
    while val >= 10 && exponent < 9 {
        val /= 10;
        exponent += 1;
    }
    ((val.min(9) as u8) << 4) | exponent
}

fn latlon2deg(raw: u32) -> f64 {
    (f64::from(raw) - f64::from(REFERENCE_LATLON)) / f64::from(CONV_DEG)
}

fn fmt_latlon(
    raw: u32,
    positive: &str,
    negative: &str,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    let (mut abs, hem) = if raw >= REFERENCE_LATLON {
        (raw - REFERENCE_LATLON, positive)
    } else {
        (REFERENCE_LATLON - raw, negative)
    };
    let deg = abs / CONV_DEG;
    abs -= deg * CONV_DEG;
    let min = abs / CONV_MIN;
    abs -= min * CONV_MIN;
    let sec = abs / CONV_SEC;
    let msec = abs - sec * CONV_SEC;
    write!(f, "{} {:02} {:02}.{:03} {}", deg, min, sec, msec, hem)
}

/// Writes a centimeter value as meters with two decimals.
fn fmt_meters(cm: i64, f: &mut fmt::Formatter) -> fmt::Result {
    let sign = if cm < 0 { "-" } else { "" };
    let cm = cm.unsigned_abs();
    write!(f, "{}{}.{:02}m", sign, cm / 100, cm % 100)
}

/// Parses a decimal number with up to `digits` fractional digits.
///
/// Returns the value scaled by `10^digits`.
fn parse_decimal(s: &str, digits: u32) -> Result<i64, ScanError> {
    let err = ScanError::custom("bad decimal number in LOC data");
    let (neg, s) = match s.strip_prefix('-') {
        Some(s) => (true, s),
        None => (false, s),
    };
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (s, ""),
    };
    if int.is_empty()
        || frac.len() > digits as usize
        || !int.bytes().chain(frac.bytes()).all(|ch| ch.is_ascii_digit())
    {
        return Err(err);
    }
    let int: i64 = int.parse().map_err(|_| err.clone())?;
    let mut frac_val: i64 = if frac.is_empty() {
        0
    } else {
        frac.parse().map_err(|_| err.clone())?
    };
    frac_val *= 10i64.pow(digits - frac.len() as u32);
    let res = int
        .checked_mul(10i64.pow(digits))
        .and_then(|v| v.checked_add(frac_val))
        .ok_or(err)?;
    Ok(if neg { -res } else { res })
}

/// Scans latitude or longitude in thousandths of arc seconds.
fn scan_latlon(
    scanner: &mut Scanner,
    positive: &str,
    negative: &str,
) -> Result<i64, ScanError> {
    let deg = i64::from(scanner.scan_u32()?);
    let mut min = 0;
    let mut msec = 0;
    let mut parts = 0;
    loop {
        if scanner.skip_if(positive) {
            break;
        }
        if scanner.skip_if(negative) {
            return Ok(-(deg * i64::from(CONV_DEG) + min * i64::from(CONV_MIN) + msec));
        }
        match parts {
            0 => min = i64::from(scanner.scan_u32()?),
            1 => msec = parse_decimal(scanner.scan_str()?, 3)?,
            _ => return Err(ScanError::custom("expected hemisphere in LOC data")),
        }
        parts += 1;
    }
    Ok(deg * i64::from(CONV_DEG) + min * i64::from(CONV_MIN) + msec)
}

/// Scans a value in meters with an optional trailing `m`.
fn scan_meters(scanner: &mut Scanner) -> Result<i64, ScanError> {
    let token = scanner.scan_str()?;
    let token = token
        .strip_suffix('m')
        .or_else(|| token.strip_suffix('M'))
        .unwrap_or(token);
    parse_decimal(token, 2)
}

fn scan_opt_precision(
    scanner: &mut Scanner,
    default: u64,
) -> Result<u64, ScanError> {
    if !scanner.continues() {
        return Ok(default);
    }
    let value = scan_meters(scanner)?;
    u64::try_from(value).map_err(|_| ScanError::custom("negative LOC precision"))
}

//============ Testing =======================================================
