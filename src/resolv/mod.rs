//! Resolving names.
//!
//! This module contains a synchronous stub resolver, the [`Resolver`],
//! that sends queries to the name servers given in its configuration,
//! [`ResolvConf`], and an iterative resolver, the [`Recursor`], that
//! walks the delegation chain starting at the root servers.
//!
//! ```no_run
//! use netdns::base::{Class, Rtype};
//! use netdns::resolv::Resolver;
//!
//! let mut resolver = Resolver::system().unwrap();
//! if let Some(answer) = resolver.search("www.example.com", Rtype::A, Class::IN).unwrap() {
//!     for addr in answer.each_address() {
//!         println!("{}", addr);
//!     }
//! }
//! ```

#[cfg(unix)]
pub use self::resolver::bg_select;
pub use self::conf::ResolvConf;
pub use self::recurse::{Authorities, RecursionContext, Recursor};
pub use self::resolver::{
    mx, BgHandle, Exchange, Resolver, DEFAULT_ERROR_STRING,
};

mod axfr;
pub mod conf;
pub mod recurse;
mod resolver;
pub mod transport;
