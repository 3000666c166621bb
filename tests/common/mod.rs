//! Mock name servers on the loopback interface.
#![allow(dead_code)]

use netdns::base::{Message, Name};
use netdns::resolv::transport::{read_frame, write_frame};
use netdns::resolv::{ResolvConf, Resolver};
use std::net::{
    IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream, UdpSocket,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

pub fn name(s: &str) -> Name {
    s.parse().unwrap()
}

/// Installs a tracing subscriber honouring `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

//------------ MockServer ----------------------------------------------------

/// A name server answering from closures on a UDP socket and a TCP
/// listener sharing the same port.
///
/// The server threads run until the test process ends.
pub struct MockServer {
    pub port: u16,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    tcp_connections: Arc<AtomicUsize>,
}

impl MockServer {
    /// Starts a server.
    ///
    /// `udp` and `tcp` produce the answers to each query received. If they
    /// return `None`, the query isn’t answered. Over TCP, every returned
    /// message is sent.
    pub fn start<U, T>(udp: U, tcp: T) -> Self
    where
        U: Fn(&Message) -> Option<Message> + Send + 'static,
        T: Fn(&Message) -> Vec<Message> + Send + 'static,
    {
        let sock = UdpSocket::bind((LOCALHOST, 0)).unwrap();
        let port = sock.local_addr().unwrap().port();
        let listener = TcpListener::bind((LOCALHOST, port)).unwrap();
        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_connections = Arc::new(AtomicUsize::new(0));

        let count = udp_queries.clone();
        thread::spawn(move || {
            let mut buf = vec![0u8; 65535];
            while let Ok((len, peer)) = sock.recv_from(&mut buf) {
                count.fetch_add(1, Ordering::SeqCst);
                let query = match Message::from_wire(&buf[..len]) {
                    Ok(query) => query,
                    Err(_) => continue,
                };
                if let Some(answer) = udp(&query) {
                    let _ = sock.send_to(&answer.to_wire().unwrap(), peer);
                }
            }
        });

        let count = tcp_queries.clone();
        let connections = tcp_connections.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = match stream {
                    Ok(stream) => stream,
                    Err(_) => continue,
                };
                connections.fetch_add(1, Ordering::SeqCst);
                serve_tcp(&mut stream, &tcp, &count);
            }
        });

        MockServer {
            port,
            udp_queries,
            tcp_queries,
            tcp_connections,
        }
    }

    /// Starts a server that only answers over UDP.
    pub fn udp<U>(udp: U) -> Self
    where
        U: Fn(&Message) -> Option<Message> + Send + 'static,
    {
        Self::start(udp, |_| Vec::new())
    }

    /// Starts a server that only answers over TCP.
    pub fn tcp<T>(tcp: T) -> Self
    where
        T: Fn(&Message) -> Vec<Message> + Send + 'static,
    {
        Self::start(|_| None, tcp)
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_connections(&self) -> usize {
        self.tcp_connections.load(Ordering::SeqCst)
    }

    /// Returns a resolver talking to this server only.
    pub fn resolver(&self) -> Resolver {
        self.resolver_with(1)
    }

    /// Returns a resolver listing this server `count` times.
    pub fn resolver_with(&self, count: usize) -> Resolver {
        let mut conf = ResolvConf::default();
        conf.nameservers = vec![LOCALHOST; count];
        conf.port = self.port;
        conf.retry = 2;
        conf.retrans = Duration::from_secs(1);
        conf.tcp_timeout = Duration::from_secs(5);
        conf.searchlist.clear();
        conf.domain = None;
        Resolver::new(conf)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(LOCALHOST, self.port)
    }
}

fn serve_tcp<T>(stream: &mut TcpStream, tcp: &T, count: &AtomicUsize)
where
    T: Fn(&Message) -> Vec<Message>,
{
    loop {
        let deadline = Instant::now() + Duration::from_secs(10);
        let query = match read_frame(stream, deadline) {
            Ok(query) => query,
            Err(_) => return,
        };
        count.fetch_add(1, Ordering::SeqCst);
        let query = match Message::from_wire(&query) {
            Ok(query) => query,
            Err(_) => return,
        };
        for answer in tcp(&query) {
            if write_frame(stream, &answer.to_wire().unwrap()).is_err() {
                return;
            }
        }
    }
}

/// Creates the start of an answer to `query`.
pub fn reply(query: &Message) -> Message {
    Message::reply_to(query)
}
