//! Resolver configuration.
//!
//! The configuration of a [`Resolver`][super::Resolver] is collected in a
//! [`ResolvConf`]. It can be created from scratch, starting with its
//! defaults, or from the system configuration via [`ResolvConf::system`].
//!
//! The system configuration is read from a glibc-style configuration file,
//! commonly known as `/etc/resolv.conf`, followed by the files
//! `$HOME/.resolv.conf` and `./.resolv.conf`. Only the `nameserver`,
//! `domain`, and `search` directives are used from these files. Finally,
//! the environment variables `RES_NAMESERVERS`, `RES_SEARCHLIST`,
//! `LOCALDOMAIN`, and `RES_OPTIONS` override what was found in the files.

use crate::base::name::Name;
use std::io::{self, BufRead};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use std::{env, fmt, fs};
use tracing::debug;

/// The path of the system configuration file.
pub const RESOLV_CONF: &str = "/etc/resolv.conf";

/// The name of the per-user configuration files.
pub const DOTFILE: &str = ".resolv.conf";

//------------ ResolvConf ----------------------------------------------------

/// Resolver configuration.
///
/// The field names follow the names of the options that can be given via
/// `RES_OPTIONS`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolvConf {
    /// Addresses of the name servers to query.
    pub nameservers: Vec<IpAddr>,

    /// The port to send queries to.
    pub port: u16,

    /// The local address to send queries from.
    pub srcaddr: IpAddr,

    /// The local port to send queries from. Zero picks any port.
    pub srcport: u16,

    /// The domain appended to names without a dot.
    pub domain: Option<Name>,

    /// The domains tried by [`search`][super::Resolver::search].
    pub searchlist: Vec<Name>,

    /// The retransmission interval for UDP.
    pub retrans: Duration,

    /// The number of UDP rounds through all name servers.
    pub retry: usize,

    /// Always use TCP.
    pub usevc: bool,

    /// Keep TCP connections open between queries.
    pub stayopen: bool,

    /// Ignore truncation, don’t retry over TCP.
    pub igntc: bool,

    /// Set the RD bit in queries.
    pub recurse: bool,

    /// Append `domain` to names without a dot in
    /// [`query`][super::Resolver::query].
    pub defnames: bool,

    /// Try the search list in [`search`][super::Resolver::search].
    pub dnsrch: bool,

    /// Keep TCP sockets open and reuse them.
    pub persistent_tcp: bool,

    /// Keep UDP sockets open and reuse them.
    pub persistent_udp: bool,

    /// Ask for DNSSEC records by setting the DO bit.
    pub dnssec: bool,

    /// The advertised UDP payload size. Values up to 512 mean no EDNS.
    pub udppacketsize: u16,

    /// An overall limit on the time spent on the UDP rounds.
    pub udp_timeout: Option<Duration>,

    /// The time to wait for a TCP answer.
    pub tcp_timeout: Duration,

    /// Never talk to IPv6 name servers.
    pub force_v4: bool,

    /// Accept answers with a wrong ID or QR bit.
    ///
    /// This is for test setups only and must never be used otherwise.
    pub ignqrid: bool,
}

impl Default for ResolvConf {
    fn default() -> Self {
        ResolvConf {
            nameservers: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
            port: 53,
            srcaddr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            srcport: 0,
            domain: None,
            searchlist: Vec::new(),
            retrans: Duration::from_secs(5),
            retry: 4,
            usevc: false,
            stayopen: false,
            igntc: false,
            recurse: true,
            defnames: true,
            dnsrch: true,
            persistent_tcp: false,
            persistent_udp: false,
            dnssec: false,
            udppacketsize: 0,
            udp_timeout: None,
            tcp_timeout: Duration::from_secs(120),
            force_v4: false,
            ignqrid: false,
        }
    }
}

/// # Management
///
impl ResolvConf {
    /// The UDP payload size of a plain DNS message.
    pub const PACKETSZ: u16 = 512;

    /// Creates a new configuration with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the configuration for this system.
    ///
    /// Starts with the defaults, then reads `/etc/resolv.conf`,
    /// `$HOME/.resolv.conf`, and `./.resolv.conf` if they exist, and
    /// finally applies the environment.
    pub fn system() -> Result<Self, ConfError> {
        let mut res = Self::default();
        let mut paths = vec![RESOLV_CONF.into()];
        if let Some(home) = env::var_os("HOME") {
            paths.push(Path::new(&home).join(DOTFILE));
        }
        paths.push(Path::new(".").join(DOTFILE));
        for path in paths {
            match res.parse_file(&path) {
                Ok(()) => debug!("read resolver config {}", path.display()),
                Err(ConfError::Io(_)) => {}
                Err(err) => return Err(err),
            }
        }
        res.apply_env()?;
        res.finalize();
        Ok(res)
    }

    /// Fills in the domain and the search list from each other.
    ///
    /// If there is no domain, it becomes the first entry of the search
    /// list. If the search list is empty, it gets the domain as its only
    /// entry.
    pub fn finalize(&mut self) {
        if self.domain.is_none() {
            self.domain = self.searchlist.first().cloned();
        }
        if self.searchlist.is_empty() {
            if let Some(domain) = self.domain.clone() {
                self.searchlist.push(domain)
            }
        }
    }

    /// Returns the UDP payload size to use for receiving.
    pub fn packet_size(&self) -> u16 {
        self.udppacketsize.max(Self::PACKETSZ)
    }

    /// Enables or disables DNSSEC.
    ///
    /// Enabling raises the UDP payload size to at least 2048.
    pub fn set_dnssec(&mut self, value: bool) {
        self.dnssec = value;
        if value && self.udppacketsize < 2048 {
            self.udppacketsize = 2048
        }
    }
}

/// # Parsing Configuration Files
///
impl ResolvConf {
    /// Parses the configuration from a file.
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfError> {
        let file = fs::File::open(path)?;
        self.parse(&mut io::BufReader::new(file))
    }

    /// Parses the configuration from a reader.
    ///
    /// The format is that of the `/etc/resolv.conf` file. Everything after
    /// `;` or `#` is a comment. Directives other than `nameserver`,
    /// `domain`, and `search` are ignored. If the data contains
    /// `nameserver` directives, they replace the current name servers.
    pub fn parse<R: BufRead>(&mut self, reader: &mut R) -> Result<(), ConfError> {
        let mut nameservers = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = match line.find([';', '#']) {
                Some(pos) => &line[..pos],
                None => line.as_str(),
            };
            let mut words = line.split_whitespace();
            match words.next() {
                Some("nameserver") => {
                    for word in words {
                        nameservers.push(parse_nameserver(word)?);
                    }
                }
                Some("domain") => {
                    if let Some(word) = words.next() {
                        self.domain = Some(parse_name(word)?);
                    }
                }
                Some("search") => {
                    self.searchlist =
                        words.map(parse_name).collect::<Result<_, _>>()?;
                }
                _ => {}
            }
        }
        if !nameservers.is_empty() {
            self.nameservers = nameservers;
        }
        Ok(())
    }
}

/// # Environment
///
impl ResolvConf {
    /// Applies the resolver environment variables of the process.
    pub fn apply_env(&mut self) -> Result<(), ConfError> {
        self.apply_vars(|key| env::var(key).ok())
    }

    /// Applies resolver variables from the given source.
    ///
    /// `RES_NAMESERVERS` and `RES_SEARCHLIST` are space separated lists,
    /// `LOCALDOMAIN` is a domain name, and `RES_OPTIONS` is a space
    /// separated list of options in the form `name` or `name:value`.
    pub fn apply_vars<F>(&mut self, var: F) -> Result<(), ConfError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = var("RES_NAMESERVERS") {
            self.nameservers = value
                .split_whitespace()
                .map(parse_nameserver)
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = var("RES_SEARCHLIST") {
            self.searchlist = value
                .split_whitespace()
                .map(parse_name)
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = var("LOCALDOMAIN") {
            let value = value.trim();
            self.domain = if value.is_empty() {
                None
            } else {
                Some(parse_name(value)?)
            };
        }
        if let Some(value) = var("RES_OPTIONS") {
            for option in value.split_whitespace() {
                match option.split_once(':') {
                    Some((name, value)) => self.set_option(name, Some(value))?,
                    None => self.set_option(option, None)?,
                }
            }
        }
        Ok(())
    }

    /// Sets an option by name.
    ///
    /// A boolean option without a value is set to true. Durations are
    /// given in seconds.
    pub fn set_option(
        &mut self,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), ConfError> {
        match name {
            "nameservers" => {
                self.nameservers = value
                    .unwrap_or("")
                    .split(',')
                    .filter(|item| !item.is_empty())
                    .map(parse_nameserver)
                    .collect::<Result<_, _>>()?
            }
            "port" => self.port = parse_value(name, value)?,
            "srcaddr" => self.srcaddr = parse_value(name, value)?,
            "srcport" => self.srcport = parse_value(name, value)?,
            "domain" => {
                self.domain = Some(parse_name(require(name, value)?)?)
            }
            "searchlist" => {
                self.searchlist = require(name, value)?
                    .split(',')
                    .map(parse_name)
                    .collect::<Result<_, _>>()?
            }
            "retrans" => self.retrans = parse_secs(name, value)?,
            "retry" => self.retry = parse_value(name, value)?,
            "usevc" => self.usevc = parse_flag(name, value)?,
            "stayopen" => self.stayopen = parse_flag(name, value)?,
            "igntc" => self.igntc = parse_flag(name, value)?,
            "recurse" => self.recurse = parse_flag(name, value)?,
            "defnames" => self.defnames = parse_flag(name, value)?,
            "dnsrch" => self.dnsrch = parse_flag(name, value)?,
            "persistent_tcp" => self.persistent_tcp = parse_flag(name, value)?,
            "persistent_udp" => self.persistent_udp = parse_flag(name, value)?,
            "dnssec" => {
                let value = parse_flag(name, value)?;
                self.set_dnssec(value)
            }
            "udppacketsize" => self.udppacketsize = parse_value(name, value)?,
            "udp_timeout" => {
                self.udp_timeout = Some(parse_secs(name, value)?)
            }
            "tcp_timeout" => self.tcp_timeout = parse_secs(name, value)?,
            "force_v4" => self.force_v4 = parse_flag(name, value)?,
            "ignqrid" => self.ignqrid = parse_flag(name, value)?,
            "debug" => {}
            _ => return Err(ConfError::UnknownOption(name.into())),
        }
        Ok(())
    }
}

//--- Display

impl fmt::Display for ResolvConf {
    /// Formats the configuration in the format of `/etc/resolv.conf`.
    ///
    /// Options that differ from their defaults are given in the form
    /// accepted by `RES_OPTIONS`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for server in &self.nameservers {
            writeln!(f, "nameserver {}", server)?;
        }
        if let Some(ref domain) = self.domain {
            writeln!(f, "domain {}", domain)?;
        }
        if !self.searchlist.is_empty() {
            f.write_str("search")?;
            for name in &self.searchlist {
                write!(f, " {}", name)?;
            }
            f.write_str("\n")?;
        }

        let default = Self::default();
        let mut options = Vec::new();
        if self.port != default.port {
            options.push(format!("port:{}", self.port));
        }
        if self.retrans != default.retrans {
            options.push(format!("retrans:{}", self.retrans.as_secs()));
        }
        if self.retry != default.retry {
            options.push(format!("retry:{}", self.retry));
        }
        for (name, value, default) in [
            ("usevc", self.usevc, default.usevc),
            ("stayopen", self.stayopen, default.stayopen),
            ("igntc", self.igntc, default.igntc),
            ("recurse", self.recurse, default.recurse),
            ("defnames", self.defnames, default.defnames),
            ("dnsrch", self.dnsrch, default.dnsrch),
            ("persistent_tcp", self.persistent_tcp, default.persistent_tcp),
            ("persistent_udp", self.persistent_udp, default.persistent_udp),
            ("dnssec", self.dnssec, default.dnssec),
            ("force_v4", self.force_v4, default.force_v4),
            ("ignqrid", self.ignqrid, default.ignqrid),
        ] {
            if value != default {
                options.push(format!("{}:{}", name, u8::from(value)));
            }
        }
        if self.udppacketsize != default.udppacketsize {
            options.push(format!("udppacketsize:{}", self.udppacketsize));
        }
        if !options.is_empty() {
            writeln!(f, "options {}", options.join(" "))?;
        }
        Ok(())
    }
}

//------------ Private Helpers -----------------------------------------------

/// Parses a name server address. A plain `0` means `0.0.0.0`.
fn parse_nameserver(word: &str) -> Result<IpAddr, ConfError> {
    if word == "0" {
        return Ok(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }
    IpAddr::from_str(word).map_err(|_| ConfError::BadAddress(word.into()))
}

fn parse_name(word: &str) -> Result<Name, ConfError> {
    Name::from_str(word).map_err(|_| ConfError::BadName(word.into()))
}

fn require<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ConfError> {
    value.ok_or_else(|| ConfError::BadValue(name.into()))
}

fn parse_value<T: FromStr>(name: &str, value: Option<&str>) -> Result<T, ConfError> {
    require(name, value)?
        .parse()
        .map_err(|_| ConfError::BadValue(name.into()))
}

fn parse_secs(name: &str, value: Option<&str>) -> Result<Duration, ConfError> {
    parse_value(name, value).map(Duration::from_secs)
}

fn parse_flag(name: &str, value: Option<&str>) -> Result<bool, ConfError> {
    match value {
        None | Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(_) => Err(ConfError::BadValue(name.into())),
    }
}

//------------ ConfError -----------------------------------------------------

/// The configuration could not be read.
#[derive(Debug)]
pub enum ConfError {
    /// Reading a file failed.
    Io(io::Error),

    /// A name server address was invalid.
    BadAddress(String),

    /// A domain name was invalid.
    BadName(String),

    /// An option is not known.
    UnknownOption(String),

    /// The value of an option was missing or invalid.
    BadValue(String),
}

impl From<io::Error> for ConfError {
    fn from(err: io::Error) -> Self {
        ConfError::Io(err)
    }
}

impl fmt::Display for ConfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfError::Io(ref err) => fmt::Display::fmt(err, f),
            ConfError::BadAddress(ref addr) => {
                write!(f, "invalid name server address '{}'", addr)
            }
            ConfError::BadName(ref name) => {
                write!(f, "invalid domain name '{}'", name)
            }
            ConfError::UnknownOption(ref name) => {
                write!(f, "unknown option '{}'", name)
            }
            ConfError::BadValue(ref name) => {
                write!(f, "invalid value for option '{}'", name)
            }
        }
    }
}

impl std::error::Error for ConfError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let conf = ResolvConf::default();
        assert_eq!(conf.nameservers, [IpAddr::from([127, 0, 0, 1])]);
        assert_eq!(conf.port, 53);
        assert_eq!(conf.retrans, Duration::from_secs(5));
        assert_eq!(conf.retry, 4);
        assert!(conf.recurse && conf.defnames && conf.dnsrch);
        assert!(!conf.usevc && !conf.igntc && !conf.ignqrid);
        assert_eq!(conf.tcp_timeout, Duration::from_secs(120));
        assert_eq!(conf.udp_timeout, None);
        assert_eq!(conf.packet_size(), 512);
    }

    #[test]
    fn parse_resolv_conf() {
        let mut conf = ResolvConf::default();
        let data = "\
            ; a comment\n\
            # another comment\n\
            nameserver 192.0.2.1 ; trailing comment\n\
            nameserver 2001:db8::1\n\
            nameserver 0\n\
            domain example.com\n\
            search example.com example.net\n\
            options ndots:3 rotate\n\
            sortlist 130.155.160.0\n";
        conf.parse(&mut data.as_bytes()).unwrap();
        assert_eq!(
            conf.nameservers,
            [
                IpAddr::from([192, 0, 2, 1]),
                "2001:db8::1".parse::<IpAddr>().unwrap(),
                IpAddr::from([0, 0, 0, 0]),
            ]
        );
        assert_eq!(conf.domain, Some(name("example.com")));
        assert_eq!(conf.searchlist, [name("example.com"), name("example.net")]);

        let mut conf = ResolvConf::default();
        assert!(conf.parse(&mut "nameserver foo\n".as_bytes()).is_err());
        conf.parse(&mut "domain example.org\n".as_bytes()).unwrap();
        assert_eq!(conf.nameservers, ResolvConf::default().nameservers);
    }

    #[test]
    fn environment() {
        let vars: HashMap<_, _> = [
            ("RES_NAMESERVERS", "10.0.0.1 10.0.0.2"),
            ("RES_SEARCHLIST", "a.example b.example"),
            ("RES_OPTIONS", "retrans:3 retry:2 usevc igntc:0 debug"),
        ]
        .into_iter()
        .collect();
        let mut conf = ResolvConf::default();
        conf.apply_vars(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        conf.finalize();
        assert_eq!(conf.nameservers.len(), 2);
        assert_eq!(conf.domain, Some(name("a.example")));
        assert_eq!(conf.retrans, Duration::from_secs(3));
        assert_eq!(conf.retry, 2);
        assert!(conf.usevc);
        assert!(!conf.igntc);

        let mut conf = ResolvConf::default();
        let res = conf.apply_vars(|key| {
            (key == "RES_OPTIONS").then(|| "bogus:1".to_string())
        });
        assert!(matches!(res, Err(ConfError::UnknownOption(ref name)) if name == "bogus"));
        assert!(conf.set_option("retry", Some("many")).is_err());
    }

    #[test]
    fn domain_and_search_fill_each_other() {
        let mut conf = ResolvConf::default();
        conf.domain = Some(name("example.com"));
        conf.finalize();
        assert_eq!(conf.searchlist, [name("example.com")]);
    }

    #[test]
    fn dnssec_raises_packet_size() {
        let mut conf = ResolvConf::default();
        conf.set_dnssec(true);
        assert_eq!(conf.udppacketsize, 2048);
        assert_eq!(conf.packet_size(), 2048);
        conf.udppacketsize = 4096;
        conf.set_dnssec(true);
        assert_eq!(conf.udppacketsize, 4096);
    }

    #[test]
    fn display() {
        let mut conf = ResolvConf::default();
        conf.searchlist = vec![name("example.com")];
        conf.usevc = true;
        conf.retry = 2;
        assert_eq!(
            conf.to_string(),
            "nameserver 127.0.0.1\nsearch example.com\noptions retry:2 usevc:1\n"
        );
    }
}
