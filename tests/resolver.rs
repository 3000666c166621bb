//! The stub resolver against mock servers.

mod common;

use common::{init_logging, name, reply, MockServer, LOCALHOST};
use netdns::base::{Class, Message, Rcode, Rtype, Section};
use netdns::base::record::Record;
use netdns::rdata::{AllRecordData, Cname, A};
use netdns::Error;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

fn a_record(owner: &str, addr: [u8; 4]) -> Record {
    Record::new(name(owner), Class::IN, 300, A::new(Ipv4Addr::from(addr)))
}

/// Answers A queries for `www.example.com` and NXDOMAIN for anything else.
fn www(query: &Message) -> Option<Message> {
    let mut answer = reply(query);
    let question = query.first_question()?;
    if *question.qname() == name("www.example.com")
        && question.qtype() == Rtype::A
    {
        answer.push(Section::Answer, a_record("www.example.com", [192, 0, 2, 1]));
    } else {
        answer.header_mut().set_rcode(Rcode::NXDOMAIN);
    }
    Some(answer)
}

#[test]
fn simple_query() {
    init_logging();
    let server = MockServer::udp(www);
    let mut res = server.resolver();
    let answer = res.query("www.example.com", Rtype::A, Class::IN).unwrap();
    assert_eq!(
        answer.each_address().collect::<Vec<_>>(),
        [IpAddr::from([192, 0, 2, 1])]
    );
    assert_eq!(res.answerfrom(), Some(server.addr()));
    assert!(res.answersize() > 12);
    assert_eq!(res.errorstring(), "NOERROR");
    assert_eq!(server.udp_queries(), 1);
    assert_eq!(server.tcp_queries(), 0);
}

#[test]
fn always_timing_out() {
    init_logging();
    let server = MockServer::udp(|_| None);
    let mut res = server.resolver_with(2);
    let err = res.query("www.example.com", Rtype::A, Class::IN).unwrap_err();
    assert!(matches!(err, Error::AllNameserversFailed));
    assert_eq!(res.errorstring(), "query timed out");
    assert_eq!(server.udp_queries(), 2 * 2);
}

#[test]
fn udp_timeout_stops_early() {
    init_logging();
    let server = MockServer::udp(|_| None);
    let mut res = server.resolver_with(2);
    res.conf_mut().retry = 4;
    res.conf_mut().udp_timeout = Some(Duration::from_millis(1500));
    let err = res.query("www.example.com", Rtype::A, Class::IN).unwrap_err();
    assert!(matches!(err, Error::Timeout));
    assert!(server.udp_queries() < 2 * 4);
}

#[test]
fn truncated_answer_uses_tcp() {
    init_logging();
    let server = MockServer::start(
        |query| {
            let mut answer = reply(query);
            answer.header_mut().set_tc(true);
            answer.push(Section::Answer, a_record("big.example", [192, 0, 2, 6]));
            Some(answer)
        },
        |query| {
            let mut answer = reply(query);
            answer.push(Section::Answer, a_record("big.example", [192, 0, 2, 7]));
            vec![answer]
        },
    );
    let mut res = server.resolver();
    let answer = res.query("big.example", Rtype::A, Class::IN).unwrap();
    assert!(!answer.header().tc());
    assert_eq!(
        answer.each_address().collect::<Vec<_>>(),
        [IpAddr::from([192, 0, 2, 7])]
    );
    assert_eq!(server.udp_queries(), 1);
    assert_eq!(server.tcp_queries(), 1);

    res.conf_mut().igntc = true;
    let answer = res.query("big.example", Rtype::A, Class::IN).unwrap();
    assert!(answer.header().tc());
    assert_eq!(
        answer.each_address().collect::<Vec<_>>(),
        [IpAddr::from([192, 0, 2, 6])]
    );
    assert_eq!(server.udp_queries(), 2);
    assert_eq!(server.tcp_queries(), 1);
}

#[test]
fn usevc() {
    init_logging();
    let server = MockServer::tcp(|query| www(query).into_iter().collect());
    let mut res = server.resolver();
    res.conf_mut().usevc = true;
    let answer = res.query("www.example.com", Rtype::A, Class::IN).unwrap();
    assert_eq!(answer.answer().len(), 1);
    assert_eq!(server.udp_queries(), 0);
    assert_eq!(server.tcp_queries(), 1);
}

#[test]
fn last_answer_is_returned() {
    init_logging();
    let server = MockServer::udp(|query| {
        let mut answer = reply(query);
        answer.header_mut().set_rcode(Rcode::SERVFAIL);
        Some(answer)
    });
    let mut res = server.resolver_with(2);
    let answer = res.query("www.example.com", Rtype::A, Class::IN).unwrap();
    assert_eq!(answer.header().rcode(), Rcode::SERVFAIL);
    assert_eq!(res.errorstring(), "SERVFAIL");
    // Failed servers aren’t asked again in the second round.
    assert_eq!(server.udp_queries(), 2);
}

#[test]
fn search_list() {
    init_logging();
    let server = MockServer::udp(www);
    let mut res = server.resolver();
    res.conf_mut().searchlist = vec![name("foo.test"), name("example.com")];
    let answer = res.search("www", Rtype::A, Class::IN).unwrap().unwrap();
    assert_eq!(answer.answer().len(), 1);
    assert_eq!(server.udp_queries(), 2);

    assert!(res.search("ftp", Rtype::A, Class::IN).unwrap().is_none());
    // Two search list entries plus the name as is.
    assert_eq!(server.udp_queries(), 5);
}

#[test]
fn mismatched_ids_are_ignored() {
    init_logging();
    let server = MockServer::udp(|query| {
        let mut answer = www(query)?;
        answer.set_id(query.id().wrapping_add(1));
        Some(answer)
    });
    let mut res = server.resolver();
    res.conf_mut().retry = 1;
    assert!(res.query("www.example.com", Rtype::A, Class::IN).is_err());

    res.conf_mut().ignqrid = true;
    let answer = res.query("www.example.com", Rtype::A, Class::IN).unwrap();
    assert_eq!(answer.answer().len(), 1);
}

#[test]
fn long_cname_target() {
    init_logging();
    let target = format!(
        "{}.{}.{}.{}.com",
        "a".repeat(63),
        "b".repeat(63),
        "c".repeat(63),
        "d".repeat(40)
    );
    let cname = name(&target);
    let server = MockServer::udp(move |query| {
        let mut answer = reply(query);
        answer.push(
            Section::Answer,
            Record::new(
                name("t-cname.t.blop.info"),
                Class::IN,
                3600,
                Cname::new(cname.clone()),
            ),
        );
        Some(answer)
    });
    let mut res = server.resolver();
    let answer = res
        .send_query("t-cname.t.blop.info", Rtype::CNAME, Class::IN)
        .unwrap();
    assert_eq!(answer.header().rcode(), Rcode::NOERROR);
    assert_eq!(answer.counts().ancount(), 1);
    match answer.answer()[0].data() {
        AllRecordData::Cname(data) => {
            assert_eq!(data.cname().to_string(), target)
        }
        other => panic!("unexpected record data {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn background() {
    use netdns::resolv::bg_select;

    init_logging();
    let server = MockServer::udp(www);
    let mut res = server.resolver();
    let handles = vec![
        res.bgsend_query("www.example.com", Rtype::A, Class::IN).unwrap(),
        res.bgsend_query("nowhere.example.com", Rtype::A, Class::IN)
            .unwrap(),
    ];
    let mut pending: Vec<_> = (0..handles.len()).collect();
    while !pending.is_empty() {
        let ready = bg_select(&handles, Duration::from_secs(5)).unwrap();
        assert!(!ready.is_empty());
        for idx in ready {
            if !pending.contains(&idx) {
                continue;
            }
            assert!(res.bgisready(&handles[idx]));
            let answer = res.bgread(&handles[idx]).unwrap();
            assert_eq!(answer.id(), handles[idx].id());
            if idx == 0 {
                assert_eq!(answer.answer().len(), 1);
            } else {
                assert_eq!(answer.header().rcode(), Rcode::NXDOMAIN);
            }
            pending.retain(|&item| item != idx);
        }
    }
}

#[cfg(unix)]
#[test]
fn background_timeout() {
    use netdns::resolv::bg_select;

    init_logging();
    let server = MockServer::udp(|_| None);
    let mut res = server.resolver();
    let handle = res
        .bgsend_query("www.example.com", Rtype::A, Class::IN)
        .unwrap();
    assert!(!res.bgisready(&handle));
    assert!(bg_select(&[handle], Duration::from_millis(100))
        .unwrap()
        .is_empty());
}

#[test]
fn nameservers_by_name() {
    init_logging();
    let server = MockServer::udp(|query| {
        let mut answer = reply(query);
        answer.push(
            Section::Answer,
            a_record("ns.example.com", [127, 0, 0, 1]),
        );
        Some(answer)
    });
    let mut res = server.resolver();
    res.set_nameservers_by_name(&["ns.example.com", "192.0.2.53"])
        .unwrap();
    assert_eq!(
        res.nameservers(),
        [LOCALHOST, IpAddr::from([192, 0, 2, 53])]
    );
}
