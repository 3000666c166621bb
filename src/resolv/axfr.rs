//! Zone transfers.
//!
//! A zone transfer is an AXFR query sent over TCP that is answered with a
//! sequence of messages containing all the records of the zone. The
//! transfer starts and ends with the SOA record of the zone.
//!
//! A transfer can either be done in one go via [`Resolver::axfr`] or
//! record by record via [`Resolver::axfr_start`] and
//! [`Resolver::axfr_next`].

use super::resolver::Resolver;
use super::transport;
use crate::base::iana::{Class, Rcode, Rtype};
use crate::base::message::Message;
use crate::base::record::Record;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::io;
use std::net::{SocketAddr, TcpStream};
use std::time::Instant;
use tracing::{debug, trace};

//------------ AxfrState -----------------------------------------------------

/// A zone transfer in progress.
#[derive(Debug)]
pub(super) struct AxfrState {
    /// The connection to the server.
    stream: TcpStream,

    /// The server we are talking to.
    server: SocketAddr,

    /// The query that started the transfer.
    query: Message,

    /// Records received but not yet handed out.
    pending: VecDeque<Record>,

    /// The number of SOA records seen so far.
    soa_count: usize,
}

impl AxfrState {
    /// Returns whether the closing SOA has been received.
    fn is_complete(&self) -> bool {
        self.soa_count >= 2
    }

    /// Reads the next message from the server.
    ///
    /// Returns the error string if things go wrong.
    fn read_message(
        &mut self,
        deadline: Instant,
    ) -> std::result::Result<Message, String> {
        let mut len = [0u8; 2];
        match transport::read_full(&mut self.stream, &mut len, deadline) {
            Ok(2) => {}
            Ok(_) => return Err("truncated zone transfer".into()),
            Err(err) => return Err(read_error(err)),
        }
        let len = usize::from(u16::from_be_bytes(len));
        if len == 0 {
            return Err("truncated zone transfer".into());
        }
        let mut buf = vec![0u8; len];
        match transport::read_full(&mut self.stream, &mut buf, deadline) {
            Ok(got) if got == len => {}
            Ok(got) => {
                return Err(format!("expected {} bytes, received {}", len, got))
            }
            Err(err) => return Err(read_error(err)),
        }
        trace!("received {} bytes of zone transfer", len);
        Message::from_wire(&buf).map_err(|err| err.to_string())
    }

    /// Queues the records of a message belonging to the transfer.
    fn take_records(
        &mut self,
        answer: &Message,
    ) -> std::result::Result<(), String> {
        let rcode = answer.header().rcode();
        if rcode != Rcode::NOERROR {
            return Err(format!("Response code from server: {}", rcode));
        }
        if answer.answer().is_empty() {
            return Err("truncated zone transfer".into());
        }
        for record in answer.answer() {
            if record.rtype() == Rtype::SOA {
                self.soa_count += 1;
                if self.is_complete() {
                    break;
                }
            }
            self.pending.push_back(record.clone());
        }
        Ok(())
    }
}

fn read_error(err: io::Error) -> String {
    if transport::is_timeout(&err) {
        "timeout".into()
    } else {
        err.to_string()
    }
}

//------------ Resolver ------------------------------------------------------

/// # Zone Transfers
///
impl Resolver {
    /// Transfers a zone and returns all its records.
    ///
    /// The SOA record is included once, as the first record. If `zone` is
    /// `None`, the first entry of the search list is transferred.
    pub fn axfr(
        &mut self,
        zone: Option<&str>,
        class: Class,
    ) -> Result<Vec<Record>> {
        self.axfr_start(zone, class)?;
        let mut res = Vec::new();
        while let Some(record) = self.axfr_next()? {
            res.push(record)
        }
        debug!("zone transfer complete, {} records", res.len());
        Ok(res)
    }

    /// Starts a zone transfer.
    ///
    /// Sends the AXFR query over TCP to the first name server. The records
    /// can then be retrieved one by one via [`axfr_next`][Self::axfr_next].
    /// A transfer that is still in progress is abandoned and its
    /// connection closed.
    pub fn axfr_start(&mut self, zone: Option<&str>, class: Class) -> Result<()> {
        if let Some(state) = self.axfr.take() {
            if !state.is_complete() {
                debug!("abandoning unfinished zone transfer");
                self.transport.drop_tcp(state.server);
            }
        }
        self.sync_transport();
        let zone = match zone {
            Some(zone) => zone.to_string(),
            None => match self.conf.searchlist.first() {
                Some(zone) => zone.fqdn().to_string(),
                None => {
                    self.errorstring = "no zone".into();
                    return Err(Error::ZoneTransferAborted("no zone".into()));
                }
            },
        };
        debug!("axfr_start({}, {})", zone, class);
        let server = match self.server_addrs().first() {
            Some(server) => *server,
            None => {
                self.errorstring = "no nameservers".into();
                return Err(Error::AllNameserversFailed);
            }
        };
        let query = self.make_query_packet(&zone, Rtype::AXFR, class)?;
        let wire = query.to_wire()?;
        debug!("axfr_start nameserver = {}", server);

        let mut stream = match self
            .transport
            .tcp(server, self.conf.tcp_timeout)
            .and_then(|mut stream| {
                transport::write_frame(&mut stream, &wire)?;
                Ok(stream)
            }) {
            Ok(stream) => stream,
            Err(err) => {
                self.transport.drop_tcp(server);
                self.errorstring = err.to_string();
                return Err(err.into());
            }
        };
        stream.set_nodelay(true)?;
        self.axfr = Some(AxfrState {
            stream,
            server,
            query,
            pending: VecDeque::new(),
            soa_count: 0,
        });
        Ok(())
    }

    /// Returns the next record of the zone transfer.
    ///
    /// Returns `Ok(None)` once the transfer is complete. The closing SOA
    /// record is not returned. After an error, the transfer is over.
    pub fn axfr_next(&mut self) -> Result<Option<Record>> {
        let mut state = match self.axfr.take() {
            Some(state) => state,
            None => return Err(self.axfr_abort("no zone transfer in progress")),
        };
        loop {
            if let Some(record) = state.pending.pop_front() {
                self.axfr = Some(state);
                return Ok(Some(record));
            }
            if state.is_complete() {
                return Ok(None);
            }
            let deadline = Instant::now() + self.conf.tcp_timeout;
            let res = state.read_message(deadline).and_then(|answer| {
                if self.matches(&state.query, &answer) {
                    state.take_records(&answer)
                } else {
                    Ok(())
                }
            });
            if let Err(err) = res {
                self.transport.drop_tcp(state.server);
                return Err(self.axfr_abort(&err));
            }
        }
    }

    fn axfr_abort(&mut self, err: &str) -> Error {
        debug!("zone transfer failed: {}", err);
        self.errorstring = err.into();
        Error::ZoneTransferAborted(err.into())
    }
}

//============ Testing =======================================================
