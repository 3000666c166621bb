//! The synchronous stub resolver.

use super::axfr::AxfrState;
use super::conf::ResolvConf;
use super::transport::{self, Transport};
use crate::base::header::IdGenerator;
use crate::base::iana::{Class, Opcode, Rtype};
use crate::base::message::{Message, Section};
use crate::base::name::Name;
use crate::base::question::Question;
use crate::base::record::{self, Record};
use crate::error::{Error, Result};
use crate::rdata::{AllRecordData, Time48};
use crate::tsig::{self, Signer, ValidationError};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use std::{fmt, io};
use tracing::{debug, trace, warn};

/// The last error before anything went wrong.
pub const DEFAULT_ERROR_STRING: &str = "unknown error or no error";

//------------ Exchange ------------------------------------------------------

/// Something that can ask a set of name servers a question.
///
/// This is the part of a resolver the [`Recursor`][super::Recursor]
/// needs. It is implemented by [`Resolver`].
pub trait Exchange {
    /// Asks `servers` the question and returns the answer.
    ///
    /// The RD flag of the query is set to `recurse`.
    fn exchange(
        &mut self,
        servers: &[IpAddr],
        question: &Question,
        recurse: bool,
    ) -> Result<Message>;

    /// Returns whether IPv6 servers should be ignored.
    fn force_v4(&self) -> bool {
        false
    }
}

//------------ Resolver ------------------------------------------------------

/// A synchronous stub resolver.
///
/// The resolver sends queries to the name servers of its configuration,
/// retrying over multiple rounds, and falls back to TCP if answers are
/// truncated. Every query blocks until an answer arrives or all servers
/// have been tried. For multiplexing several queries, the background
/// functions [`bgsend`][Self::bgsend] and friends can be used.
///
/// Besides returning a result, the resolver keeps a description of what
/// happened during the last query, available via
/// [`errorstring`][Self::errorstring].
pub struct Resolver {
    /// The configuration.
    pub(super) conf: ResolvConf,

    /// The sockets.
    pub(super) transport: Transport,

    /// Where message IDs come from.
    ids: Arc<IdGenerator>,

    /// The key for signing queries.
    tsig: Option<Arc<dyn Signer + Send + Sync>>,

    /// What happened during the last query.
    pub(super) errorstring: String,

    /// Where the last answer came from.
    answerfrom: Option<SocketAddr>,

    /// The size of the last answer.
    answersize: usize,

    /// A zone transfer in progress.
    pub(super) axfr: Option<AxfrState>,
}

/// # Creation and Configuration
///
impl Resolver {
    /// Creates a new resolver using the given configuration.
    ///
    /// Message IDs are taken from the process-wide generator.
    pub fn new(conf: ResolvConf) -> Self {
        Self::with_ids(conf, IdGenerator::shared())
    }

    /// Creates a new resolver that takes message IDs from `ids`.
    pub fn with_ids(conf: ResolvConf, ids: Arc<IdGenerator>) -> Self {
        Resolver {
            transport: Transport::new(
                conf.srcaddr,
                conf.srcport,
                conf.persistent_udp,
                conf.persistent_tcp || conf.stayopen,
            ),
            conf,
            ids,
            tsig: None,
            errorstring: DEFAULT_ERROR_STRING.into(),
            answerfrom: None,
            answersize: 0,
            axfr: None,
        }
    }

    /// Creates a new resolver using the system configuration.
    pub fn system() -> Result<Self> {
        Ok(Self::new(ResolvConf::system()?))
    }

    /// Returns a reference to the configuration.
    pub fn conf(&self) -> &ResolvConf {
        &self.conf
    }

    /// Returns a mutable reference to the configuration.
    pub fn conf_mut(&mut self) -> &mut ResolvConf {
        &mut self.conf
    }

    /// Returns the name servers that will be asked.
    ///
    /// If `force_v4` is set, IPv6 servers are left out.
    pub fn nameservers(&self) -> Vec<IpAddr> {
        self.conf
            .nameservers
            .iter()
            .copied()
            .filter(|addr| !(self.conf.force_v4 && addr.is_ipv6()))
            .collect()
    }

    /// Replaces the name servers.
    pub fn set_nameservers<I: IntoIterator<Item = IpAddr>>(
        &mut self,
        servers: I,
    ) {
        self.conf.nameservers = servers.into_iter().collect()
    }

    /// Replaces the name servers with servers given by address or name.
    ///
    /// A plain `0` means `0.0.0.0`. Host names are looked up using the
    /// current name servers. A name without a dot is tried with the
    /// search list, and CNAMEs in the answer are followed.
    pub fn set_nameservers_by_name(&mut self, names: &[&str]) -> Result<()> {
        let mut servers = Vec::new();
        for &name in names {
            if name == "0" {
                servers.push(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
                continue;
            }
            if let Ok(addr) = IpAddr::from_str(name) {
                servers.push(addr);
                continue;
            }
            let candidates = if name.contains('.') {
                vec![Name::from_str(name)?]
            } else if !self.conf.searchlist.is_empty() {
                self.conf
                    .searchlist
                    .iter()
                    .map(|domain| Name::from_str(name)?.append(domain))
                    .collect::<std::result::Result<_, _>>()?
            } else {
                let domain = self.conf.domain.clone().unwrap_or_else(Name::root);
                vec![Name::from_str(name)?.append(&domain)?]
            };
            if let Some(packet) = self.search(name, Rtype::A, Class::IN)? {
                servers.extend(Self::cname_addr(&candidates, &packet));
            }
        }
        self.conf.nameservers = servers;
        Ok(())
    }

    /// Sets the key for signing all queries.
    pub fn set_tsig<S: Signer + Send + Sync + 'static>(&mut self, signer: S) {
        self.tsig = Some(Arc::new(signer))
    }

    /// Stops signing queries.
    pub fn clear_tsig(&mut self) {
        self.tsig = None
    }

    /// Enables or disables DNSSEC.
    ///
    /// Enabling raises the UDP payload size to at least 2048.
    pub fn set_dnssec(&mut self, value: bool) {
        self.conf.set_dnssec(value)
    }

    /// Returns a description of what went wrong with the last query.
    ///
    /// After a query that received an answer, this is the mnemonic of the
    /// answer’s response code.
    pub fn errorstring(&self) -> &str {
        &self.errorstring
    }

    /// Returns the address of the server that sent the last answer.
    pub fn answerfrom(&self) -> Option<SocketAddr> {
        self.answerfrom
    }

    /// Returns the size in octets of the last answer.
    pub fn answersize(&self) -> usize {
        self.answersize
    }

    /// Returns the addresses for `names` in the answer of `packet`.
    ///
    /// CNAME records for one of the names add their target to the names
    /// looked for. The answer records are processed in order.
    pub fn cname_addr(names: &[Name], packet: &Message) -> Vec<IpAddr> {
        let mut names = names.to_vec();
        let mut res = Vec::new();
        for record in packet.answer() {
            if !names.contains(record.owner()) {
                continue;
            }
            match record.data() {
                AllRecordData::Cname(cname) => {
                    names.push(cname.cname().clone())
                }
                AllRecordData::A(a) => res.push(a.addr().into()),
                AllRecordData::Aaaa(aaaa) => res.push(aaaa.addr().into()),
                _ => {}
            }
        }
        res
    }
}

/// # Building Queries
///
impl Resolver {
    /// Creates a query message for a question.
    ///
    /// If the name is an IPv4 address in dotted-quad notation, the query
    /// will be for its PTR record instead.
    pub fn make_query_packet(
        &self,
        name: &str,
        rtype: Rtype,
        class: Class,
    ) -> Result<Message> {
        let (qname, rtype) = match Ipv4Addr::from_str(name) {
            Ok(addr) => (ipv4_ptr(addr), Rtype::PTR),
            Err(_) => (Name::from_str(name)?, rtype),
        };
        self.prepare_packet(Message::query(
            Question::new(qname, rtype, class),
            self.ids.next_id(),
        ))
    }

    /// Prepares a message for sending.
    ///
    /// For a query, the RD flag is set according to the configuration.
    /// The message receives an OPT record if DNSSEC is enabled or the UDP
    /// payload size is larger than 512 octets, and is signed if a TSIG
    /// key is set.
    pub fn prepare_packet(&self, mut msg: Message) -> Result<Message> {
        if msg.header().opcode() == Opcode::QUERY {
            msg.header_mut().set_rd(self.conf.recurse);
        }
        self.finish_packet(msg)
    }

    /// Adds the OPT and TSIG records as necessary.
    fn finish_packet(&self, mut msg: Message) -> Result<Message> {
        if msg.opt().is_none() {
            if self.conf.dnssec {
                debug!(
                    "adding EDNS with UDP payload size {} and DO bit",
                    self.conf.udppacketsize
                );
                msg.push(
                    Section::Additional,
                    Record::opt(
                        self.conf.udppacketsize,
                        0,
                        0,
                        Record::DNSSEC_OK,
                    ),
                );
            } else if self.conf.udppacketsize > ResolvConf::PACKETSZ {
                debug!(
                    "adding EDNS with UDP payload size {}",
                    self.conf.udppacketsize
                );
                msg.push(
                    Section::Additional,
                    Record::opt(self.conf.udppacketsize, 0, 0, 0),
                );
            }
        }
        if let Some(ref signer) = self.tsig {
            tsig::sign_request(
                &mut msg,
                signer.as_ref(),
                Time48::now(),
                tsig::DEFAULT_FUDGE,
            )?;
        }
        Ok(msg)
    }

    /// Returns the name and type to use for a `query`.
    fn query_name(&self, name: &str, rtype: Rtype) -> Result<(Name, Rtype)> {
        if let Ok(addr) = Ipv4Addr::from_str(name) {
            return Ok((ipv4_ptr(addr), Rtype::PTR));
        }
        if name.contains(':') {
            if let Ok(addr) = Ipv6Addr::from_str(name) {
                return Ok(match addr.to_ipv4_mapped() {
                    Some(addr) => (ipv4_ptr(addr), Rtype::PTR),
                    None => (ipv6_ptr(addr), Rtype::PTR),
                });
            }
            return Ok((Name::from_str(name)?, rtype));
        }
        if self.conf.defnames && !name.contains('.') {
            let domain = match self.conf.domain {
                Some(ref domain) => domain.clone(),
                None => Name::root(),
            };
            return Ok((Name::from_str(name)?.append(&domain)?, rtype));
        }
        Ok((Name::from_str(name)?, rtype))
    }
}

/// # Queries
///
impl Resolver {
    /// Looks up a name applying the search list.
    ///
    /// A name with at least one dot is first tried as is. If it doesn’t
    /// end in a dot and `dnsrch` is set, each domain of the search list is
    /// appended to it in turn. A name without any dots is finally tried as
    /// an absolute name. IPv4 addresses result in a PTR query and IPv6
    /// addresses are handed to [`query`][Self::query].
    ///
    /// Returns the first answer that actually has answer records. If there
    /// is none, returns `Ok(None)` unless none of the queries received an
    /// answer at all, in which case the last error is returned.
    pub fn search(
        &mut self,
        name: &str,
        rtype: Rtype,
        class: Class,
    ) -> Result<Option<Message>> {
        let (name, rtype) = match Ipv4Addr::from_str(name) {
            Ok(addr) => (ipv4_ptr(addr).fqdn().to_string(), Rtype::PTR),
            Err(_) => (name.to_string(), rtype),
        };

        if name.contains(':') && !name.contains('.') {
            let answer = self.query(&name, rtype, class)?;
            return Ok(has_answer(answer));
        }

        let mut candidates = Vec::new();
        if name.contains('.') {
            candidates.push(name.clone());
        }
        if !name.ends_with('.') && self.conf.dnsrch {
            for domain in &self.conf.searchlist {
                candidates.push(format!("{}.{}", name, domain.fqdn()));
            }
        }
        if !name.contains('.') {
            candidates.push(format!("{}.", name));
        }

        let mut answered = false;
        let mut last_err = None;
        for candidate in candidates {
            debug!("search({}, {}, {})", candidate, rtype, class);
            match self.query(&candidate, rtype, class) {
                Ok(answer) => match has_answer(answer) {
                    Some(answer) => return Ok(Some(answer)),
                    None => answered = true,
                },
                Err(err) => last_err = Some(err),
            }
        }
        match last_err {
            Some(err) if !answered => Err(err),
            _ => Ok(None),
        }
    }

    /// Looks up a name without the search list.
    ///
    /// If the name doesn’t contain a dot or colon and `defnames` is set,
    /// the default domain is appended. IPv4 addresses, IPv4 addresses
    /// mapped into IPv6, and IPv6 addresses are turned into PTR queries.
    ///
    /// Returns the answer whether it has answer records or not.
    pub fn query(
        &mut self,
        name: &str,
        rtype: Rtype,
        class: Class,
    ) -> Result<Message> {
        let (qname, rtype) = self.query_name(name, rtype)?;
        debug!("query({}, {}, {})", qname.fqdn(), rtype, class);
        let msg = Message::query(
            Question::new(qname, rtype, class),
            self.ids.next_id(),
        );
        self.send(msg)
    }

    /// Sends a question to the name servers.
    ///
    /// Neither the search list nor the default domain are applied.
    pub fn send_query(
        &mut self,
        name: &str,
        rtype: Rtype,
        class: Class,
    ) -> Result<Message> {
        let msg = self.make_query_packet(name, rtype, class)?;
        self.send_prepared(&msg)
    }

    /// Sends a message to the name servers and returns the answer.
    ///
    /// The message is prepared via [`prepare_packet`][Self::prepare_packet]
    /// first. It is sent over TCP if `usevc` is set or it is too large for
    /// UDP. Otherwise UDP is tried first, switching to TCP if the answer is
    /// truncated and `igntc` isn’t set.
    ///
    /// If no server gave a successful answer, the last unsuccessful answer
    /// is returned. If there wasn’t any answer at all, the error is
    /// [`Error::AllNameserversFailed`] or, if `udp_timeout` ran out,
    /// [`Error::Timeout`].
    pub fn send(&mut self, msg: Message) -> Result<Message> {
        let msg = self.prepare_packet(msg)?;
        self.send_prepared(&msg)
    }

    fn send_prepared(&mut self, query: &Message) -> Result<Message> {
        self.errorstring = DEFAULT_ERROR_STRING.into();
        self.sync_transport();
        let res = self.dispatch(query);
        if let Err(ref err) = res {
            if self.errorstring == DEFAULT_ERROR_STRING {
                self.errorstring = err.to_string()
            }
        }
        res
    }

    fn dispatch(&mut self, query: &Message) -> Result<Message> {
        let wire = query.to_wire()?;
        if self.conf.usevc || wire.len() > usize::from(self.conf.packet_size())
        {
            debug!("using TCP for query {}", query.id());
            return self.send_tcp(query, &wire);
        }
        let answer = self.send_udp(query, &wire)?;
        if answer.header().tc() && !self.conf.igntc {
            debug!("answer to {} truncated, retrying using TCP", query.id());
            return self.send_tcp(query, &wire);
        }
        Ok(answer)
    }

    /// Follows configuration changes of the sockets.
    pub(super) fn sync_transport(&mut self) {
        if self.transport.source() != (self.conf.srcaddr, self.conf.srcport) {
            self.transport = Transport::new(
                self.conf.srcaddr,
                self.conf.srcport,
                self.conf.persistent_udp,
                self.conf.persistent_tcp || self.conf.stayopen,
            );
        } else {
            self.transport.set_persistent(
                self.conf.persistent_udp,
                self.conf.persistent_tcp || self.conf.stayopen,
            );
        }
    }

    /// Returns the socket addresses of the name servers.
    pub(super) fn server_addrs(&self) -> Vec<SocketAddr> {
        self.nameservers()
            .into_iter()
            .map(|addr| SocketAddr::new(addr, self.conf.port))
            .collect()
    }

    /// Finishes a query that didn’t get a successful answer.
    fn exhausted(
        &mut self,
        lastanswer: Option<Message>,
        errorstring: &str,
        err: Error,
    ) -> Result<Message> {
        match lastanswer {
            Some(answer) => {
                self.errorstring = answer.header().rcode().to_string();
                Ok(answer)
            }
            None => {
                self.errorstring = errorstring.into();
                Err(err)
            }
        }
    }

    /// Records where an accepted answer came from.
    fn accept(&mut self, answer: &mut Message, from: SocketAddr, size: usize) {
        self.answerfrom = Some(from);
        self.answersize = size;
        answer.set_answer_from(from, size);
        self.errorstring = answer.header().rcode().to_string();
    }
}

/// # Talking UDP
///
impl Resolver {
    fn send_udp(&mut self, query: &Message, wire: &[u8]) -> Result<Message> {
        let servers = self.server_addrs();
        if servers.is_empty() {
            self.errorstring = "no nameservers".into();
            return Err(Error::AllNameserversFailed);
        }
        let stop_time = self.conf.udp_timeout.map(|t| Instant::now() + t);
        let mut failed = vec![false; servers.len()];
        let mut lastanswer = None;
        let mut sent = false;
        let mut retrans = self.conf.retrans;
        let mut buf = vec![0u8; usize::from(self.conf.packet_size())];

        for round in 0..self.conf.retry {
            if round > 0 {
                retrans *= 2;
            }
            let divisor = u32::try_from((round + 1) * servers.len())
                .unwrap_or(u32::MAX);
            let round_timeout =
                (retrans / divisor).max(Duration::from_secs(1));

            for (idx, &server) in servers.iter().enumerate() {
                if failed[idx] {
                    continue;
                }
                let mut timeout = round_timeout;
                if let Some(stop_time) = stop_time {
                    let now = Instant::now();
                    if stop_time <= now {
                        return self.exhausted(
                            lastanswer,
                            "query timed out",
                            Error::Timeout,
                        );
                    }
                    timeout = timeout.min(stop_time - now);
                }

                debug!(
                    "send_udp({}) query {} round {}",
                    server,
                    query.id(),
                    round
                );
                let sock = match self.transport.udp(server).and_then(|sock| {
                    sock.send_to(wire, server)?;
                    Ok(sock)
                }) {
                    Ok(sock) => sock,
                    Err(err) => {
                        debug!("send error to {}: {}", server, err);
                        self.errorstring = format!("Send error: {}", err);
                        failed[idx] = true;
                        continue;
                    }
                };
                sent = true;

                match self.wait_udp(&sock, query, &mut buf, timeout) {
                    Ok(Some(answer)) => {
                        if answer.is_success() {
                            return Ok(answer);
                        }
                        debug!(
                            "RCODE {} from {}; trying next nameserver",
                            answer.header().rcode(),
                            server
                        );
                        failed[idx] = true;
                        lastanswer = Some(answer);
                    }
                    Ok(None) => {
                        trace!("no answer from {} in {:?}", server, timeout);
                    }
                    Err(err) => {
                        debug!("receive error from {}: {}", server, err);
                        self.errorstring = format!("Recv error: {}", err);
                        failed[idx] = true;
                    }
                }
            }
        }

        let errorstring = if sent {
            "query timed out"
        } else {
            "all nameservers failed"
        };
        self.exhausted(lastanswer, errorstring, Error::AllNameserversFailed)
    }

    /// Waits for an answer to `query` on `sock`.
    ///
    /// Datagrams that can’t be parsed or don’t belong to the query are
    /// dropped. Returns `Ok(None)` if no acceptable answer arrived within
    /// `timeout`.
    fn wait_udp(
        &mut self,
        sock: &UdpSocket,
        query: &Message,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<Option<Message>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let (len, from) = match transport::recv_udp(sock, buf, remaining)? {
                Some(res) => res,
                None => return Ok(None),
            };
            trace!("answer from {}: {} bytes", from, len);
            let mut answer = match Message::from_wire(&buf[..len]) {
                Ok(answer) => answer,
                Err(err) => {
                    debug!("dropping bad datagram from {}: {}", from, err);
                    continue;
                }
            };
            if !self.matches(query, &answer) {
                continue;
            }
            if !self.check_tsig(query, &buf[..len]) {
                continue;
            }
            self.accept(&mut answer, from, len);
            return Ok(Some(answer));
        }
    }

    /// Checks whether `answer` is an answer to `query`.
    ///
    /// With `ignqrid`, anything goes.
    pub(super) fn matches(&self, query: &Message, answer: &Message) -> bool {
        if answer.header().qr() && answer.id() == query.id() {
            return true;
        }
        if self.conf.ignqrid {
            warn!(
                "accepting answer {} to query {} only because of ignqrid",
                answer.id(),
                query.id()
            );
            return true;
        }
        debug!(
            "ignoring answer {} (qr {}) to query {}",
            answer.id(),
            answer.header().qr(),
            query.id()
        );
        false
    }

    /// Checks the TSIG signature of an answer to a signed query.
    ///
    /// Unsigned answers are let through since servers answer requests
    /// with unknown keys unsigned.
    fn check_tsig(&self, query: &Message, wire: &[u8]) -> bool {
        let (signer, mac) = match (&self.tsig, query.tsig().map(Record::data)) {
            (Some(signer), Some(AllRecordData::Tsig(tsig))) => {
                (signer, tsig.mac())
            }
            _ => return true,
        };
        match tsig::verify_answer(wire, mac, signer.as_ref(), Time48::now()) {
            Ok(()) => true,
            Err(ValidationError::Unsigned) => {
                debug!("answer to signed query {} is unsigned", query.id());
                true
            }
            Err(err) => {
                warn!("dropping answer to {}: {}", query.id(), err);
                false
            }
        }
    }
}

/// # Talking TCP
///
impl Resolver {
    fn send_tcp(&mut self, query: &Message, wire: &[u8]) -> Result<Message> {
        let servers = self.server_addrs();
        if servers.is_empty() {
            self.errorstring = "no nameservers".into();
            return Err(Error::AllNameserversFailed);
        }
        let mut lastanswer = None;
        let mut lasterror = None;
        for server in servers {
            debug!("send_tcp({}) query {}", server, query.id());
            match self.tcp_exchange(server, query, wire) {
                Ok(answer) => {
                    if answer.is_success() {
                        return Ok(answer);
                    }
                    debug!(
                        "RCODE {} from {}; trying next nameserver",
                        answer.header().rcode(),
                        server
                    );
                    lastanswer = Some(answer);
                }
                Err(err) => {
                    debug!("TCP error with {}: {}", server, err);
                    self.transport.drop_tcp(server);
                    lasterror = Some(err.to_string());
                }
            }
        }
        let errorstring =
            lasterror.unwrap_or_else(|| "all nameservers failed".into());
        self.exhausted(lastanswer, &errorstring, Error::AllNameserversFailed)
    }

    fn tcp_exchange(
        &mut self,
        server: SocketAddr,
        query: &Message,
        wire: &[u8],
    ) -> Result<Message> {
        let mut stream = self.transport.tcp(server, self.conf.tcp_timeout)?;
        transport::write_frame(&mut stream, wire)?;
        let deadline = Instant::now() + self.conf.tcp_timeout;
        let buf = transport::read_frame(&mut stream, deadline)?;
        trace!("answer from {}: {} bytes", server, buf.len());
        let mut answer = Message::from_wire(&buf)?;
        if !self.matches(query, &answer) {
            return Err(Error::Form("answer doesn't match query".into()));
        }
        if !self.check_tsig(query, &buf) {
            return Err(Error::Form("bad TSIG on answer".into()));
        }
        self.accept(&mut answer, server, buf.len());
        Ok(answer)
    }
}

/// # Background Queries
///
impl Resolver {
    /// Sends a query without waiting for the answer.
    ///
    /// The query is prepared like in [`send`][Self::send] and sent over
    /// UDP to the first name server. The answer can be read via
    /// [`bgread`][Self::bgread] once the returned handle is ready.
    pub fn bgsend(&mut self, msg: Message) -> Result<BgHandle> {
        self.sync_transport();
        let msg = self.prepare_packet(msg)?;
        let server = match self.server_addrs().first() {
            Some(server) => *server,
            None => {
                self.errorstring = "no nameservers".into();
                return Err(Error::AllNameserversFailed);
            }
        };
        let wire = msg.to_wire()?;
        debug!("bgsend({}) query {}", server, msg.id());
        let sock = self.transport.bind_udp(server)?;
        sock.send_to(&wire, server)?;
        Ok(BgHandle {
            sock,
            id: msg.id(),
            server,
        })
    }

    /// Sends a question without waiting for the answer.
    pub fn bgsend_query(
        &mut self,
        name: &str,
        rtype: Rtype,
        class: Class,
    ) -> Result<BgHandle> {
        let msg = self.make_query_packet(name, rtype, class)?;
        self.bgsend(msg)
    }

    /// Returns whether the answer for a background query has arrived.
    pub fn bgisready(&self, handle: &BgHandle) -> bool {
        handle.is_ready()
    }

    /// Reads the answer for a background query.
    ///
    /// Waits at most for the retransmission interval if the answer hasn’t
    /// arrived yet.
    pub fn bgread(&mut self, handle: &BgHandle) -> Result<Message> {
        let mut buf = vec![0u8; usize::from(self.conf.packet_size())];
        let (len, from) =
            match transport::recv_udp(&handle.sock, &mut buf, self.conf.retrans)? {
                Some(res) => res,
                None => {
                    self.errorstring = "query timed out".into();
                    return Err(Error::Timeout);
                }
            };
        let mut answer = Message::from_wire(&buf[..len])?;
        if !answer.header().qr() || answer.id() != handle.id {
            if !self.conf.ignqrid {
                self.errorstring = "answer doesn't match query".into();
                return Err(Error::Form(self.errorstring.clone()));
            }
            warn!(
                "accepting answer {} to query {} only because of ignqrid",
                answer.id(),
                handle.id
            );
        }
        self.accept(&mut answer, from, len);
        Ok(answer)
    }
}

//------------ BgHandle ------------------------------------------------------

/// The handle of a query sent in the background.
///
/// Dropping the handle closes its socket and thus cancels the query.
#[derive(Debug)]
pub struct BgHandle {
    sock: UdpSocket,
    id: u16,
    server: SocketAddr,
}

impl BgHandle {
    /// Returns the message ID of the query.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Returns the server the query was sent to.
    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Returns whether data has arrived for the query.
    ///
    /// This never blocks.
    #[cfg(unix)]
    pub fn is_ready(&self) -> bool {
        use std::os::unix::io::AsRawFd;

        transport::poll_readable(&[self.sock.as_raw_fd()], Duration::ZERO)
            .map(|ready| ready.first().copied().unwrap_or(false))
            .unwrap_or(false)
    }

    /// Returns whether data has arrived for the query.
    ///
    /// This never blocks.
    #[cfg(not(unix))]
    pub fn is_ready(&self) -> bool {
        if self.sock.set_nonblocking(true).is_err() {
            return false;
        }
        let mut buf = [0u8; 1];
        let res = self.sock.peek_from(&mut buf).is_ok();
        let _ = self.sock.set_nonblocking(false);
        res
    }
}

/// Waits until at least one of the background queries is ready.
///
/// Returns the indexes of the ready handles, which is empty if `timeout`
/// passed without any answer arriving.
#[cfg(unix)]
pub fn bg_select(handles: &[BgHandle], timeout: Duration) -> Result<Vec<usize>> {
    use std::os::unix::io::AsRawFd;

    let fds: Vec<_> = handles.iter().map(|h| h.sock.as_raw_fd()).collect();
    let ready = transport::poll_readable(&fds, timeout)?;
    Ok(ready
        .into_iter()
        .enumerate()
        .filter_map(|(idx, ready)| ready.then_some(idx))
        .collect())
}

//--- Exchange

impl Exchange for Resolver {
    fn exchange(
        &mut self,
        servers: &[IpAddr],
        question: &Question,
        recurse: bool,
    ) -> Result<Message> {
        let mut msg = Message::query(question.clone(), self.ids.next_id());
        msg.header_mut().set_rd(recurse);
        let msg = self.finish_packet(msg)?;
        let saved =
            std::mem::replace(&mut self.conf.nameservers, servers.to_vec());
        let res = self.send_prepared(&msg);
        self.conf.nameservers = saved;
        res
    }

    fn force_v4(&self) -> bool {
        self.conf.force_v4
    }
}

//--- Debug

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("conf", &self.conf)
            .field("transport", &self.transport)
            .field("tsig", &self.tsig.as_ref().map(|key| key.key_name()))
            .field("errorstring", &self.errorstring)
            .finish()
    }
}

//------------ Convenience Lookups -------------------------------------------

/// Returns the MX records for a name ordered by preference.
pub fn mx(resolver: &mut Resolver, name: &str) -> Result<Vec<Record>> {
    let answer = resolver.query(name, Rtype::MX, Class::IN)?;
    Ok(record::rrsort_by(Rtype::MX, "preference", answer.answer()))
}

//------------ Helper Functions ----------------------------------------------

/// Returns the answer if it has answer records.
fn has_answer(answer: Message) -> Option<Message> {
    if answer.answer().is_empty() {
        None
    } else {
        Some(answer)
    }
}

/// Returns the PTR name for an IPv4 address.
pub(super) fn ipv4_ptr(addr: Ipv4Addr) -> Name {
    let octets = addr.octets();
    let labels: Vec<String> = octets
        .iter()
        .rev()
        .map(u8::to_string)
        .chain(["in-addr".into(), "arpa".into()])
        .collect();
    Name::from_labels(labels.iter().map(String::as_bytes))
        .unwrap_or_else(|_| Name::root())
}

/// Returns the PTR name for an IPv6 address.
fn ipv6_ptr(addr: Ipv6Addr) -> Name {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut labels = Vec::with_capacity(34);
    for octet in addr.octets().iter().rev() {
        labels.push([HEX[usize::from(octet & 0x0F)]]);
        labels.push([HEX[usize::from(octet >> 4)]]);
    }
    Name::from_labels(
        labels
            .iter()
            .map(|label| label.as_slice())
            .chain([b"ip6".as_slice(), b"arpa".as_slice()]),
    )
    .unwrap_or_else(|_| Name::root())
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use crate::rdata::{Cname, A};

    fn resolver() -> Resolver {
        Resolver::with_ids(ResolvConf::default(), Arc::new(IdGenerator::new(7)))
    }

    #[test]
    fn defaults() {
        let res = resolver();
        assert_eq!(res.errorstring(), DEFAULT_ERROR_STRING);
        assert_eq!(res.answerfrom(), None);
        assert_eq!(res.answersize(), 0);
        assert_eq!(res.nameservers(), [IpAddr::from([127, 0, 0, 1])]);
    }

    #[test]
    fn force_v4_filters_nameservers() {
        let mut res = resolver();
        res.set_nameservers([
            IpAddr::from([192, 0, 2, 1]),
            "2001:db8::1".parse().unwrap(),
        ]);
        assert_eq!(res.nameservers().len(), 2);
        res.conf_mut().force_v4 = true;
        assert_eq!(res.nameservers(), [IpAddr::from([192, 0, 2, 1])]);
    }

    #[test]
    fn query_packet() {
        let mut res = resolver();
        let msg = res.make_query_packet("example.com", Rtype::MX, Class::IN).unwrap();
        assert_eq!(msg.id(), 7);
        assert!(msg.header().rd());
        assert_eq!(msg.first_question().unwrap().qtype(), Rtype::MX);
        assert!(msg.opt().is_none());

        let msg = res.make_query_packet("192.0.2.10", Rtype::A, Class::IN).unwrap();
        let question = msg.first_question().unwrap();
        assert_eq!(question.qname(), &name("10.2.0.192.in-addr.arpa"));
        assert_eq!(question.qtype(), Rtype::PTR);

        res.conf_mut().recurse = false;
        res.conf_mut().udppacketsize = 1232;
        let msg = res.make_query_packet("example.com", Rtype::A, Class::IN).unwrap();
        assert!(!msg.header().rd());
        let opt = msg.opt().unwrap();
        assert_eq!(opt.udp_payload_size(), 1232);
        assert!(!opt.dnssec_ok());

        res.set_dnssec(true);
        let msg = res.make_query_packet("example.com", Rtype::A, Class::IN).unwrap();
        let opt = msg.opt().unwrap();
        assert_eq!(opt.udp_payload_size(), 2048);
        assert!(opt.dnssec_ok());
    }

    #[test]
    fn update_keeps_rd() {
        let res = resolver();
        let msg = Message::new_update(name("example.com"), Class::IN, 1);
        assert!(!res.prepare_packet(msg).unwrap().header().rd());
    }

    #[cfg(feature = "tsig")]
    #[test]
    fn signed_query_packet() {
        use crate::tsig::{Algorithm, Key};

        let mut res = resolver();
        res.set_tsig(Key::new(Algorithm::Sha256, b"secret", name("key.example")));
        let msg = res.make_query_packet("example.com", Rtype::A, Class::IN).unwrap();
        assert_eq!(msg.additional().len(), 1);
        assert_eq!(msg.tsig().unwrap().owner(), &name("key.example"));
    }

    #[test]
    fn query_names() {
        let mut res = resolver();
        res.conf_mut().domain = Some(name("example.com"));
        let check = |res: &Resolver, input: &str, expected: &str, rtype: Rtype| {
            assert_eq!(
                res.query_name(input, Rtype::A).unwrap(),
                (name(expected), rtype)
            );
        };
        check(&res, "host", "host.example.com", Rtype::A);
        check(&res, "host.sub", "host.sub", Rtype::A);
        check(&res, "10.1.2.3", "3.2.1.10.in-addr.arpa", Rtype::PTR);
        check(&res, "::ffff:10.1.2.3", "3.2.1.10.in-addr.arpa", Rtype::PTR);
        check(
            &res,
            "2001:db8::567:89ab",
            "b.a.9.8.7.6.5.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa",
            Rtype::PTR,
        );
        check(
            &res,
            "2001:0db8:0000:0000:0000:0000:0567:89ab",
            "b.a.9.8.7.6.5.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa",
            Rtype::PTR,
        );

        res.conf_mut().defnames = false;
        check(&res, "host", "host", Rtype::A);
    }

    #[test]
    fn cname_addresses() {
        let mut packet = Message::new();
        packet.push(
            Section::Answer,
            Record::new(name("ns.example.com"), Class::IN, 60, Cname::new(name("real.example.net"))),
        );
        packet.push(
            Section::Answer,
            Record::new(name("real.example.net"), Class::IN, 60, A::from_octets(192, 0, 2, 53)),
        );
        packet.push(
            Section::Answer,
            Record::new(name("other.example.net"), Class::IN, 60, A::from_octets(192, 0, 2, 99)),
        );
        assert_eq!(
            Resolver::cname_addr(&[name("NS.example.com")], &packet),
            [IpAddr::from([192, 0, 2, 53])]
        );
    }

    #[test]
    fn bgsend_follows_source_changes() {
        let server = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let mut res = resolver();
        res.conf_mut().port = server.local_addr().unwrap().port();
        res.conf_mut().srcaddr = IpAddr::from([127, 0, 0, 1]);
        let handle = res.bgsend_query("example.com", Rtype::A, Class::IN).unwrap();
        assert_eq!(res.transport.source(), (IpAddr::from([127, 0, 0, 1]), 0));

        let mut buf = [0u8; 512];
        let (len, peer) = server.recv_from(&mut buf).unwrap();
        assert_eq!(peer.ip(), IpAddr::from([127, 0, 0, 1]));
        assert_eq!(Message::from_wire(&buf[..len]).unwrap().id(), handle.id());
    }

    #[test]
    fn no_nameservers() {
        let mut res = resolver();
        res.set_nameservers(Vec::new());
        let err = res.send_query("example.com", Rtype::A, Class::IN).unwrap_err();
        assert!(matches!(err, Error::AllNameserversFailed));
        assert_eq!(res.errorstring(), "no nameservers");
    }
}
