//! Iterative resolution.
//!
//! A [`Recursor`] answers questions by itself rather than asking a
//! recursive resolver. Starting with the root servers from its hints, it
//! asks the servers of each zone on the way down the tree and follows
//! their referrals until it gets to an authoritative answer.

use super::resolver::{ipv4_ptr, Exchange};
use crate::base::iana::{Class, Rcode, Rtype};
use crate::base::message::Message;
use crate::base::name::Name;
use crate::base::question::Question;
use crate::error::{Error, Result};
use crate::rdata::AllRecordData;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// The maximum depth of the recursion before giving up.
pub const MAX_DEPTH: usize = 255;

/// The name servers of a zone and their addresses.
pub type Authorities = BTreeMap<Name, Vec<IpAddr>>;

//------------ RecursionContext ----------------------------------------------

/// The state of a single iterative resolution.
#[derive(Clone, Debug, Default)]
pub struct RecursionContext {
    /// The addresses of name servers learned so far.
    pub authority_cache: HashMap<Name, Vec<IpAddr>>,

    /// The deepest level the resolution went to.
    pub depth: usize,
}

//------------ Recursor ------------------------------------------------------

/// An iterative resolver.
///
/// The recursor uses an [`Exchange`], normally a
/// [`Resolver`][super::Resolver], to send its queries. Before it can be
/// used, it needs the addresses of the root servers, either given
/// directly via [`set_hints`][Self::set_hints] or learned from some
/// recursive resolvers via [`hints`][Self::hints].
pub struct Recursor<E> {
    /// The thing that sends the queries.
    exchange: E,

    /// The root servers.
    hints: Authorities,

    /// Called with every answer received.
    callback: Option<Box<dyn FnMut(&Message)>>,
}

impl<E: Exchange> Recursor<E> {
    /// Creates a new recursor without any hints.
    pub fn new(exchange: E) -> Self {
        Recursor {
            exchange,
            hints: Authorities::new(),
            callback: None,
        }
    }

    /// Returns a reference to the exchange.
    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    /// Returns a mutable reference to the exchange.
    pub fn exchange_mut(&mut self) -> &mut E {
        &mut self.exchange
    }

    /// Returns the root servers.
    pub fn root_hints(&self) -> &Authorities {
        &self.hints
    }

    /// Sets the root servers.
    pub fn set_hints(&mut self, hints: Authorities) {
        self.hints = hints
            .into_iter()
            .map(|(name, addrs)| (name.to_lowercase(), addrs))
            .collect()
    }

    /// Learns the root servers by asking `servers`.
    ///
    /// The servers are asked for the NS records of the root with
    /// recursion desired. The addresses of the root servers are taken
    /// from the additional section of the answer. Root servers without an
    /// address are dropped.
    pub fn hints(&mut self, servers: &[IpAddr]) -> Result<&Authorities> {
        debug!("verifying root zone with {:?}", servers);
        let question = Question::new(Name::root(), Rtype::NS, Class::IN);
        let packet = self.exchange.exchange(servers, &question, true)?;
        let mut hints = Authorities::new();
        for record in packet.answer() {
            if let AllRecordData::Ns(ns) = record.data() {
                if record.owner().is_root() {
                    trace!("found hint {}", ns.nsdname());
                    hints.insert(ns.nsdname().to_lowercase(), Vec::new());
                }
            }
        }
        let force_v4 = self.exchange.force_v4();
        for record in packet.additional() {
            let addr = match record.data() {
                AllRecordData::A(a) => IpAddr::from(a.addr()),
                AllRecordData::Aaaa(aaaa) if !force_v4 => aaaa.addr().into(),
                _ => continue,
            };
            if let Some(addrs) = hints.get_mut(&record.owner().to_lowercase()) {
                trace!("storing hint address {} {}", record.owner(), addr);
                addrs.push(addr)
            }
        }
        hints.retain(|_, addrs| !addrs.is_empty());
        if hints.is_empty() {
            warn!("servers {:?} did not give usable root hints", servers);
        }
        self.hints = hints;
        Ok(&self.hints)
    }

    /// Sets a function to be called with every answer received.
    pub fn set_callback<F: FnMut(&Message) + 'static>(&mut self, callback: F) {
        self.callback = Some(Box::new(callback))
    }

    /// Removes the callback.
    pub fn clear_callback(&mut self) {
        self.callback = None
    }

    /// Resolves a question iteratively, starting at the root.
    ///
    /// If `name` is an IPv4 address, its PTR record is looked up instead.
    /// Returns the first answer that either has answer records or says
    /// that the name doesn’t exist.
    pub fn query_dorecursion(
        &mut self,
        name: &str,
        rtype: Rtype,
        class: Class,
    ) -> Result<Message> {
        let question = match Ipv4Addr::from_str(name) {
            Ok(addr) => Question::new(ipv4_ptr(addr), Rtype::PTR, class),
            Err(_) => Question::new(Name::from_str(name)?, rtype, class),
        };
        let mut ctx = RecursionContext::default();
        let descent = Descent {
            question,
            zone: Name::root(),
            known: self.hints.clone(),
            depth: 0,
        };
        self.dorecursion(&mut ctx, descent)
    }

    /// Runs a descent to its end.
    ///
    /// Descents that get stuck on authorities without addresses wait on
    /// the `waiting` stack while those addresses are resolved from the
    /// root, so the call stack doesn’t grow with the depth.
    fn dorecursion(
        &mut self,
        ctx: &mut RecursionContext,
        mut descent: Descent,
    ) -> Result<Message> {
        let mut waiting: Vec<AuthorityLookup> = Vec::new();
        loop {
            let mut outcome = match self.descend(ctx, descent) {
                Step::Done(outcome) => Some(outcome),
                Step::Glueless(parent) => {
                    let force_v4 = self.exchange.force_v4();
                    waiting.push(AuthorityLookup::new(parent, force_v4));
                    None
                }
            };
            descent = loop {
                let lookup = match waiting.last_mut() {
                    Some(lookup) => lookup,
                    None => {
                        return outcome.unwrap_or(Err(Error::NoAuthorityFound))
                    }
                };
                match outcome.take() {
                    Some(Err(Error::RecursionTooDeep)) => {
                        return Err(Error::RecursionTooDeep)
                    }
                    Some(outcome) => lookup.record(outcome),
                    None => {}
                }
                if let Some(question) = lookup.next_question(ctx) {
                    break Descent {
                        question,
                        zone: Name::root(),
                        known: self.hints.clone(),
                        depth: lookup.parent.depth + 1,
                    };
                }
                match waiting.pop() {
                    Some(lookup) if lookup.found > 0 => {
                        let mut parent = lookup.parent;
                        parent.depth += 1;
                        break parent;
                    }
                    _ => {
                        debug!("no authority information could be obtained");
                        outcome = Some(Err(Error::NoAuthorityFound));
                    }
                }
            };
        }
    }

    /// Follows referrals down the tree.
    ///
    /// Stops with a result or when none of the known authorities has an
    /// address.
    fn descend(
        &mut self,
        ctx: &mut RecursionContext,
        mut descent: Descent,
    ) -> Step {
        loop {
            if descent.depth > MAX_DEPTH {
                debug!("recursion too deep, aborting");
                return Step::Done(Err(Error::RecursionTooDeep));
            }
            ctx.depth = ctx.depth.max(descent.depth);
            descent.zone = descent.zone.to_lowercase();

            let mut servers = descent.servers(ctx);
            if servers.is_empty() {
                debug!(
                    "no addresses for the authorities of {}",
                    descent.zone.fqdn()
                );
                return Step::Glueless(descent);
            }

            let split = rand::thread_rng().gen_range(0..servers.len());
            servers.rotate_left(split);
            trace!("cut deck of {} authorities at {}", servers.len(), split);

            let mut referred = None;
            for addrs in servers {
                debug!(
                    "asking {:?} for {} at depth {}",
                    addrs, descent.question, descent.depth
                );
                let packet = match self.exchange.exchange(
                    &addrs,
                    &descent.question,
                    false,
                ) {
                    Ok(packet) => packet,
                    Err(err) => {
                        debug!("no answer from {:?}: {}", addrs, err);
                        continue;
                    }
                };
                if let Some(ref mut callback) = self.callback {
                    callback(&packet)
                }

                if packet.header().rcode() == Rcode::NXDOMAIN {
                    debug!("returning NXDOMAIN");
                    return Step::Done(Ok(packet));
                }
                if !packet.answer().is_empty() {
                    debug!("answers were found");
                    return Step::Done(Ok(packet));
                }
                match referral(&packet, &descent.zone) {
                    Some(next) => {
                        referred = Some(next);
                        break;
                    }
                    None => {
                        debug!("deadbeat name server did not provide new information");
                    }
                }
            }
            match referred {
                Some((zone, known)) => {
                    debug!("descending into {}", zone.fqdn());
                    descent.zone = zone;
                    descent.known = known;
                    descent.depth += 1;
                }
                None => return Step::Done(Err(Error::NoAuthorityFound)),
            }
        }
    }
}

//------------ Descent -------------------------------------------------------

/// A question on its way down the tree.
#[derive(Debug)]
struct Descent {
    question: Question,

    /// The closest zone known so far.
    zone: Name,

    /// The authorities of `zone`.
    known: Authorities,

    depth: usize,
}

impl Descent {
    /// Returns the address sets of all authorities that have some.
    ///
    /// Addresses learned earlier are filled in from the context and new
    /// ones are added to it.
    fn servers(&mut self, ctx: &mut RecursionContext) -> Vec<Vec<IpAddr>> {
        let mut servers = Vec::new();
        for (name, addrs) in self.known.iter_mut() {
            if !addrs.is_empty() {
                ctx.authority_cache.insert(name.clone(), addrs.clone());
                servers.push(addrs.clone());
            } else if let Some(cached) = ctx.authority_cache.get(name) {
                if !cached.is_empty() {
                    addrs.clone_from(cached);
                    servers.push(cached.clone());
                }
            }
        }
        servers
    }
}

/// Where a descent ended.
enum Step {
    Done(Result<Message>),

    /// The descent needs the addresses of its authorities.
    Glueless(Descent),
}

//------------ AuthorityLookup -----------------------------------------------

/// Resolves the addresses of authorities that came without glue.
///
/// Each name is looked up from the root for every address type in turn.
/// Names whose addresses can’t be found are dropped from the parent’s
/// authorities.
#[derive(Debug)]
struct AuthorityLookup {
    /// The descent waiting for the addresses.
    parent: Descent,

    /// The names still to look up, last one first.
    names: Vec<Name>,

    /// The record types to ask for, last one first.
    rtypes: Vec<Rtype>,

    current: Option<NameLookup>,

    /// The number of addresses found so far.
    found: usize,
}

#[derive(Debug)]
struct NameLookup {
    name: Name,
    rtypes: Vec<Rtype>,
    asked: Rtype,

    /// The name and the CNAME targets found for it.
    aliases: Vec<Name>,
    addrs: Vec<IpAddr>,
}

impl AuthorityLookup {
    fn new(parent: Descent, force_v4: bool) -> Self {
        let mut names: Vec<_> = parent
            .known
            .iter()
            .filter(|(_, addrs)| addrs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.reverse();
        let rtypes = if force_v4 {
            vec![Rtype::A]
        } else {
            vec![Rtype::A, Rtype::AAAA]
        };
        AuthorityLookup {
            parent,
            names,
            rtypes,
            current: None,
            found: 0,
        }
    }

    /// Returns the next question to resolve from the root.
    ///
    /// Returns `None` once all names have been looked up.
    fn next_question(
        &mut self,
        ctx: &mut RecursionContext,
    ) -> Option<Question> {
        loop {
            if let Some(current) = self.current.as_mut() {
                if let Some(rtype) = current.rtypes.pop() {
                    current.asked = rtype;
                    return Some(Question::new(
                        current.name.clone(),
                        rtype,
                        Class::IN,
                    ));
                }
            }
            if let Some(done) = self.current.take() {
                self.finish(ctx, done)
            }
            let name = self.names.pop()?;
            debug!("manual lookup for authority {}", name.fqdn());
            self.current = Some(NameLookup {
                aliases: vec![name.clone()],
                name,
                rtypes: self.rtypes.clone(),
                asked: Rtype::A,
                addrs: Vec::new(),
            });
        }
    }

    /// Takes the addresses from the answer to the last question.
    fn record(&mut self, outcome: Result<Message>) {
        let current = match self.current.as_mut() {
            Some(current) => current,
            None => return,
        };
        let packet = match outcome {
            Ok(packet) => packet,
            Err(err) => {
                debug!(
                    "no {} for {}: {}",
                    current.asked,
                    current.name.fqdn(),
                    err
                );
                return;
            }
        };
        for record in packet.answer() {
            if !current.aliases.contains(record.owner()) {
                trace!("ignoring useless answer {}", record);
                continue;
            }
            match record.data() {
                AllRecordData::Cname(cname) => {
                    debug!(
                        "following CNAME {} -> {}",
                        current.name.fqdn(),
                        cname.cname().fqdn()
                    );
                    current.aliases.push(cname.cname().to_lowercase())
                }
                AllRecordData::A(a) => current.addrs.push(a.addr().into()),
                AllRecordData::Aaaa(aaaa) => {
                    current.addrs.push(aaaa.addr().into())
                }
                _ => trace!("ignoring useless answer {}", record),
            }
        }
    }

    fn finish(&mut self, ctx: &mut RecursionContext, done: NameLookup) {
        if done.addrs.is_empty() {
            debug!("could not find addresses for {}", done.name.fqdn());
            self.parent.known.remove(&done.name);
            return;
        }
        self.found += done.addrs.len();
        ctx.authority_cache.insert(done.name.clone(), done.addrs.clone());
        self.parent.known.insert(done.name, done.addrs);
    }
}

//--- Debug

impl<E: fmt::Debug> fmt::Debug for Recursor<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Recursor")
            .field("exchange", &self.exchange)
            .field("hints", &self.hints)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

//------------ Helper Functions ----------------------------------------------

/// Extracts a referral to a zone closer to the answer.
///
/// NS and SOA records in the authority section whose owner is below
/// `known_zone` name the new authorities. Their addresses come from A and
/// AAAA records in the additional section. A CNAME there makes an
/// authority use the addresses of the CNAME’s target.
fn referral(packet: &Message, known_zone: &Name) -> Option<(Name, Authorities)> {
    let mut zone = None;
    let mut auth = Authorities::new();
    for record in packet.authority() {
        let server = match record.data() {
            AllRecordData::Ns(ns) => ns.nsdname().to_lowercase(),
            AllRecordData::Soa(soa) => soa.mname().to_lowercase(),
            _ => {
                trace!("ignoring non-NS entry in authority section {}", record);
                continue;
            }
        };
        let owner = record.owner().to_lowercase();
        trace!("received authority {} {} {}", owner.fqdn(), record.rtype(), server.fqdn());
        if owner.label_count() <= known_zone.label_count() {
            continue;
        }
        if !owner.ends_with(known_zone) {
            debug!(
                "confused name server thinks {} is closer than {}",
                owner.fqdn(),
                known_zone.fqdn()
            );
            break;
        }
        debug!("found closer authority for {} at {}", owner.fqdn(), server.fqdn());
        auth.entry(server).or_default();
        zone = Some(owner);
    }
    let zone = zone?;

    let mut aliases = Vec::new();
    for record in packet.additional() {
        let owner = record.owner().to_lowercase();
        match record.data() {
            AllRecordData::Cname(cname) if auth.contains_key(&owner) => {
                let target = cname.cname().to_lowercase();
                auth.entry(target.clone()).or_default();
                aliases.push((owner, target));
            }
            AllRecordData::A(a) => {
                if let Some(addrs) = auth.get_mut(&owner) {
                    addrs.push(a.addr().into())
                }
            }
            AllRecordData::Aaaa(aaaa) => {
                if let Some(addrs) = auth.get_mut(&owner) {
                    addrs.push(aaaa.addr().into())
                }
            }
            _ => trace!("ignoring useless additional {}", record),
        }
    }
    for (alias, target) in aliases {
        if let Some(addrs) = auth.get(&target).cloned() {
            auth.entry(alias).or_default().extend(addrs);
        }
    }
    Some((zone, auth))
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::message::Section;
    use crate::base::name::test::name;
    use crate::base::record::Record;
    use crate::rdata::{Ns, A};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// An exchange that answers from a function.
    struct Mock<F> {
        answer: F,
        queries: usize,
    }

    impl<F> Exchange for Mock<F>
    where
        F: FnMut(&[IpAddr], &Question) -> Message,
    {
        fn exchange(
            &mut self,
            servers: &[IpAddr],
            question: &Question,
            _recurse: bool,
        ) -> Result<Message> {
            self.queries += 1;
            Ok((self.answer)(servers, question))
        }

        fn force_v4(&self) -> bool {
            true
        }
    }

    fn mock<F>(answer: F) -> Recursor<Mock<F>>
    where
        F: FnMut(&[IpAddr], &Question) -> Message,
    {
        let mut res = Recursor::new(Mock { answer, queries: 0 });
        let mut hints = Authorities::new();
        hints.insert(name("a.root-servers.net"), vec![IpAddr::from([198, 41, 0, 4])]);
        res.set_hints(hints);
        res
    }

    fn reply(question: &Question) -> Message {
        let mut msg = Message::query(question.clone(), 0);
        msg.header_mut().set_qr(true);
        msg
    }

    fn ns(owner: &str, target: &str) -> Record {
        Record::new(name(owner), Class::IN, 3600, Ns::new(name(target)))
    }

    fn a(owner: &str, addr: [u8; 4]) -> Record {
        Record::new(name(owner), Class::IN, 3600, A::new(addr.into()))
    }

    #[test]
    fn follows_referrals() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut res = mock(|servers: &[IpAddr], question: &Question| {
            let mut msg = reply(question);
            match servers[0] {
                IpAddr::V4(addr) if addr.octets() == [198, 41, 0, 4] => {
                    msg.push(Section::Authority, ns("com", "a.gtld-servers.net"));
                    msg.push(Section::Additional, a("a.gtld-servers.net", [192, 5, 6, 30]));
                }
                IpAddr::V4(addr) if addr.octets() == [192, 5, 6, 30] => {
                    msg.push(Section::Authority, ns("Example.COM", "ns.example.com"));
                    msg.push(Section::Additional, a("ns.example.com", [192, 0, 2, 53]));
                }
                _ => {
                    msg.header_mut().set_aa(true);
                    msg.push(Section::Answer, a("www.example.com", [192, 0, 2, 80]));
                }
            }
            msg
        });
        let log = seen.clone();
        res.set_callback(move |msg| log.borrow_mut().push(msg.answer().len()));
        let answer = res.query_dorecursion("www.example.com", Rtype::A, Class::IN).unwrap();
        assert_eq!(answer.each_address().collect::<Vec<_>>(), [IpAddr::from([192, 0, 2, 80])]);
        assert_eq!(*seen.borrow(), [0, 0, 1]);
        assert_eq!(res.exchange().queries, 3);
    }

    #[test]
    fn nxdomain_is_final() {
        let mut res = mock(|_: &[IpAddr], question: &Question| {
            let mut msg = reply(question);
            msg.header_mut().set_rcode(Rcode::NXDOMAIN);
            msg
        });
        let answer = res.query_dorecursion("nope.example", Rtype::A, Class::IN).unwrap();
        assert_eq!(answer.header().rcode(), Rcode::NXDOMAIN);
    }

    #[test]
    fn deadbeat_servers() {
        let mut res = mock(|_: &[IpAddr], question: &Question| {
            let mut msg = reply(question);
            // A referral to the zone we already know about.
            msg.push(Section::Authority, ns(".", "a.root-servers.net"));
            msg
        });
        assert!(matches!(
            res.query_dorecursion("www.example.com", Rtype::A, Class::IN),
            Err(Error::NoAuthorityFound)
        ));
    }

    #[test]
    fn glueless_delegation() {
        let mut res = mock(|servers: &[IpAddr], question: &Question| {
            let mut msg = reply(question);
            let root = IpAddr::from([198, 41, 0, 4]);
            if servers[0] == root && question.qname() == &name("ns.example.net") {
                msg.push(Section::Answer, a("ns.example.net", [192, 0, 2, 1]));
            } else if servers[0] == root {
                msg.push(Section::Authority, ns("example.com", "ns.example.net"));
            } else {
                msg.push(Section::Answer, a("www.example.com", [192, 0, 2, 80]));
            }
            msg
        });
        let answer = res.query_dorecursion("www.example.com", Rtype::A, Class::IN).unwrap();
        assert_eq!(answer.answer().len(), 1);
        assert_eq!(answer.answer()[0].owner(), &name("www.example.com"));
    }

    #[test]
    fn endless_delegation() {
        let mut res = mock(|_: &[IpAddr], question: &Question| {
            let mut msg = reply(question);
            msg.push(Section::Authority, ns("com", "ns.com"));
            msg
        });
        assert!(matches!(
            res.query_dorecursion("www.example.com", Rtype::A, Class::IN),
            Err(Error::RecursionTooDeep)
        ));
    }

    #[test]
    fn endless_delegation_on_small_stack() {
        std::thread::Builder::new()
            .stack_size(512 * 1024)
            .spawn(|| {
                let mut ctx = RecursionContext::default();
                let mut res = mock(|_: &[IpAddr], question: &Question| {
                    let mut msg = reply(question);
                    msg.push(Section::Authority, ns("com", "ns.com"));
                    msg
                });
                let descent = Descent {
                    question: Question::new(
                        name("www.example.com"),
                        Rtype::A,
                        Class::IN,
                    ),
                    zone: Name::root(),
                    known: res.root_hints().clone(),
                    depth: 0,
                };
                assert!(matches!(
                    res.dorecursion(&mut ctx, descent),
                    Err(Error::RecursionTooDeep)
                ));
                assert_eq!(ctx.depth, MAX_DEPTH);
            })
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn referral_with_cname_glue() {
        let mut msg = Message::new();
        msg.push(Section::Authority, ns("example.com", "ns.example.com"));
        msg.push(
            Section::Additional,
            Record::new(
                name("ns.example.com"),
                Class::IN,
                60,
                crate::rdata::Cname::new(name("real.example.com")),
            ),
        );
        msg.push(Section::Additional, a("real.example.com", [192, 0, 2, 7]));
        let (zone, auth) = referral(&msg, &Name::root()).unwrap();
        assert_eq!(zone, name("example.com"));
        assert_eq!(auth[&name("ns.example.com")], [IpAddr::from([192, 0, 2, 7])]);
        assert!(referral(&msg, &name("example.com")).is_none());
    }

    #[test]
    fn learn_hints() {
        let mut res = mock(|_: &[IpAddr], question: &Question| {
            let mut msg = reply(question);
            msg.push(Section::Answer, ns(".", "A.ROOT-SERVERS.NET"));
            msg.push(Section::Answer, ns(".", "b.root-servers.net"));
            msg.push(Section::Additional, a("a.root-servers.net", [198, 41, 0, 4]));
            msg
        });
        let hints = res.hints(&[IpAddr::from([127, 0, 0, 1])]).unwrap();
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[&name("a.root-servers.net")], [IpAddr::from([198, 41, 0, 4])]);
    }
}
