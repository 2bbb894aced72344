//! Zone registry and registration helpers.
//!
//! The server owns a flat map from zone apex to its SOA record. Lookup
//! walks a question name toward the root one label at a time; the first
//! registered apex wins. Registration accepts the loose value forms the
//! fluent API allows: durations as integers or `"2h"`-style strings, and
//! a serial of `now`.

use chrono::Utc;
use hashbrown::HashMap;
use sable_proto::rdata::{RData, SOA};
use sable_proto::{Name, ResourceRecord};

/// A zone this server is authoritative for: its apex name and SOA record.
#[derive(Debug, Clone)]
pub struct Zone {
    /// The zone apex.
    name: Name,
    /// The zone's SOA record, owner equal to the apex.
    soa: ResourceRecord,
}

impl Zone {
    /// Creates a zone from its apex and SOA record.
    pub(crate) fn new(name: Name, soa: ResourceRecord) -> Self {
        Self { name, soa }
    }

    /// Returns the zone apex.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the zone's SOA record.
    pub fn soa(&self) -> &ResourceRecord {
        &self.soa
    }

    /// Returns the SOA payload.
    pub fn soa_data(&self) -> &SOA {
        match self.soa.rdata() {
            RData::SOA(soa) => soa,
            // Zones are only constructed with SOA rdata.
            _ => unreachable!("zone record is always SOA"),
        }
    }

    /// Returns the zone's negative-caching TTL (the SOA minimum).
    pub fn negative_ttl(&self) -> u32 {
        self.soa_data().minimum()
    }
}

/// The set of zones a server answers for, keyed by apex.
#[derive(Debug, Default)]
pub struct ZoneRegistry {
    zones: HashMap<Name, Zone>,
}

impl ZoneRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            zones: HashMap::new(),
        }
    }

    /// Registers a zone, replacing any previous registration of the same
    /// apex.
    pub fn insert(&mut self, zone: Zone) {
        self.zones.insert(zone.name().clone(), zone);
    }

    /// Returns the number of registered zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns true if no zones are registered.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Finds the zone covering `qname`: the name itself, then each parent
    /// toward the root. `None` means the server is not authoritative for
    /// this name.
    pub fn find(&self, qname: &Name) -> Option<&Zone> {
        let mut current = qname.clone();
        loop {
            if let Some(zone) = self.zones.get(&current) {
                return Some(zone);
            }
            current = current.parent()?;
        }
    }
}

/// A duration given either in raw seconds or as a short time-span string
/// (`"2h"`, `"30m"`, `"2w"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// A resolved number of seconds.
    Seconds(u32),
    /// An unresolved text form, interpreted at registration time.
    Text(String),
}

impl Span {
    /// Resolves the span to seconds.
    ///
    /// Text forms matching `<digits><s|m|h|d|w>` (surrounding whitespace
    /// allowed) convert by unit; bare digit strings convert directly;
    /// anything else resolves to `None`.
    pub fn seconds(&self) -> Option<u32> {
        match self {
            Self::Seconds(n) => Some(*n),
            Self::Text(s) => span_seconds(s).or_else(|| s.trim().parse().ok()),
        }
    }
}

impl From<u32> for Span {
    fn from(seconds: u32) -> Self {
        Self::Seconds(seconds)
    }
}

impl From<&str> for Span {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Span {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Converts a `"2h"`-style time span to seconds.
///
/// Accepts optional surrounding whitespace around the digits and the unit
/// letter; units are seconds, minutes, hours, days, weeks. Anything else
/// returns `None` so callers can pass the input through untouched.
pub fn span_seconds(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.len() < 2 {
        return None;
    }

    let unit = trimmed.chars().next_back()?;
    let multiplier: u32 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        'w' => 604800,
        _ => return None,
    };

    let digits = trimmed[..trimmed.len() - 1].trim_end();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse::<u32>().ok()?.checked_mul(multiplier)
}

/// A zone serial: either a literal value or the registration moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serial {
    /// Resolve to the current UNIX time in seconds.
    Now,
    /// A literal serial value.
    Value(u32),
}

impl Serial {
    /// Resolves the serial to a concrete value.
    pub fn resolve(&self) -> u32 {
        match self {
            Self::Value(v) => *v,
            Self::Now => Utc::now().timestamp() as u32,
        }
    }
}

impl From<u32> for Serial {
    fn from(value: u32) -> Self {
        Self::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn zone(apex: &str) -> Zone {
        let name = Name::from_str(apex).unwrap();
        let soa = SOA::new(
            Name::from_str(&format!("ns1.{apex}")).unwrap(),
            Name::from_str(&format!("hostmaster.{apex}")).unwrap(),
            1,
            3600,
            900,
            604800,
            600,
        );
        Zone::new(name.clone(), ResourceRecord::soa(name, 600, soa))
    }

    #[test]
    fn test_find_walks_toward_root() {
        let mut registry = ZoneRegistry::new();
        registry.insert(zone("example.com"));

        // Deep subdomains resolve to the covering apex.
        let deep = Name::from_str("foo.bar.example.com").unwrap();
        assert_eq!(
            registry.find(&deep).unwrap().name().to_string(),
            "example.com"
        );

        // The apex itself matches.
        let apex = Name::from_str("example.com").unwrap();
        assert!(registry.find(&apex).is_some());

        // Unrelated names do not.
        let other = Name::from_str("example.org").unwrap();
        assert!(registry.find(&other).is_none());
    }

    #[test]
    fn test_find_prefers_deepest_apex() {
        let mut registry = ZoneRegistry::new();
        registry.insert(zone("example.com"));
        registry.insert(zone("sub.example.com"));

        let qname = Name::from_str("www.sub.example.com").unwrap();
        assert_eq!(
            registry.find(&qname).unwrap().name().to_string(),
            "sub.example.com"
        );
    }

    #[test]
    fn test_zone_accessors() {
        let z = zone("example.com");
        assert_eq!(z.negative_ttl(), 600);
        assert_eq!(z.soa_data().mname().to_string(), "ns1.example.com");
    }

    #[test]
    fn test_span_strings() {
        assert_eq!(span_seconds("2h"), Some(7200));
        assert_eq!(span_seconds("30m"), Some(1800));
        assert_eq!(span_seconds("2w"), Some(1_209_600));
        assert_eq!(span_seconds("10m"), Some(600));
        assert_eq!(span_seconds(" 15 s "), Some(15));
        assert_eq!(span_seconds("3d"), Some(259_200));

        // Non-matching inputs pass through unresolved.
        assert_eq!(span_seconds("2x"), None);
        assert_eq!(span_seconds("h"), None);
        assert_eq!(span_seconds("1.5h"), None);
        assert_eq!(span_seconds(""), None);
    }

    #[test]
    fn test_span_resolution() {
        assert_eq!(Span::from(3600u32).seconds(), Some(3600));
        assert_eq!(Span::from("2h").seconds(), Some(7200));
        assert_eq!(Span::from("900").seconds(), Some(900));
        assert_eq!(Span::from("soon").seconds(), None);
    }

    #[test]
    fn test_serial_now_is_unix_time() {
        let resolved = Serial::Now.resolve();
        let now = Utc::now().timestamp() as u32;
        assert!(resolved.abs_diff(now) < 5);

        assert_eq!(Serial::Value(42).resolve(), 42);
        assert_eq!(Serial::from(7u32), Serial::Value(7));
    }
}
