//! Routing Analyzer
//!
//! Walks the `Received` trail and pulls the first IPv4-looking token out of
//! each hop.

use crate::message::ParsedMessage;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const RECEIVED_HEADER: &str = "Received";

lazy_static! {
    // Syntactic only: octets above 255 still match.
    static ref IPV4_PATTERN: Regex = Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b")
        .expect("IPv4 pattern is valid");
}

/// One relay point, numbered from 1 in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingHop {
    pub index: usize,
    pub raw: String,
    pub ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingInfo {
    pub hops: Vec<RoutingHop>,
}

impl RoutingInfo {
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// False when the message carried no `Received` headers at all.
    pub fn has_routing_info(&self) -> bool {
        !self.hops.is_empty()
    }
}

/// First dotted-quad in `header`, if any.
pub fn extract_ipv4(header: &str) -> Option<&str> {
    IPV4_PATTERN.find(header).map(|m| m.as_str())
}

/// Build one hop per `Received` value, keeping the order given.
pub fn analyze_routing<S: AsRef<str>>(received: &[S]) -> RoutingInfo {
    let hops = received
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let header = header.as_ref();
            let ip = extract_ipv4(header).map(str::to_string);
            if let Some(ip) = &ip {
                log::debug!("Hop #{}: detected IP {}", i + 1, ip);
            } else {
                log::debug!("Hop #{}: no IP address", i + 1);
            }
            RoutingHop {
                index: i + 1,
                raw: header.to_string(),
                ip,
            }
        })
        .collect::<Vec<_>>();

    if hops.is_empty() {
        log::debug!("No routing information found");
    }

    RoutingInfo { hops }
}

pub fn analyze_message_routing(message: &ParsedMessage) -> RoutingInfo {
    analyze_routing(&message.get_all(RECEIVED_HEADER))
}
