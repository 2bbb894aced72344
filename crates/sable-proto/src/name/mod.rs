//! DNS domain name representation and operations.
//!
//! Names are stored in uncompressed wire format (length-prefixed labels,
//! terminated by the root label) and compared case-insensitively per DNS
//! semantics. Parsing from messages, including compression pointers, lives
//! in [`parse`]; compressing writer support lives in [`write`].

mod label;
mod parse;
mod write;

pub use label::{Label, LabelIter};
pub use parse::NameParser;
pub use write::NameCompressor;

use crate::error::{Error, Result};
use crate::{MAX_LABEL_LENGTH, MAX_NAME_LENGTH};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A DNS domain name.
///
/// # Wire format
///
/// A domain name is a sequence of labels, each prefixed by a length byte,
/// terminated by a zero-length label. `www.example.com` is encoded as:
///
/// ```text
/// 03 'w' 'w' 'w' 07 'e' 'x' 'a' 'm' 'p' 'l' 'e' 03 'c' 'o' 'm' 00
/// ```
///
/// # Text form
///
/// The in-memory text form joins labels with `.` and carries no trailing
/// dot; the root name renders as `.`. [`FromStr`] accepts an optional
/// trailing dot. Labels in text form must be 1-63 bytes with no embedded
/// dots or whitespace.
///
/// # Comparison
///
/// Equality, hashing, and ordering are ASCII case-insensitive.
#[derive(Clone)]
pub struct Name {
    /// Uncompressed wire bytes; empty for the root name.
    wire: SmallVec<[u8; 64]>,
    /// Number of labels including root.
    label_count: u8,
}

impl Name {
    /// Creates the root domain name.
    #[inline]
    pub const fn root() -> Self {
        Self {
            wire: SmallVec::new_const(),
            label_count: 1,
        }
    }

    /// Creates a domain name from uncompressed wire-format bytes.
    pub fn from_wire(slice: &[u8]) -> Result<Self> {
        let label_count = Self::validate_wire(slice)?;
        Ok(Self {
            wire: SmallVec::from_slice(slice),
            label_count,
        })
    }

    /// Validates wire format and returns the label count.
    fn validate_wire(bytes: &[u8]) -> Result<u8> {
        if bytes.is_empty() {
            return Ok(1);
        }

        let mut pos = 0;
        let mut labels = 0u8;

        while pos < bytes.len() {
            let len = bytes[pos] as usize;

            if len == 0 {
                labels += 1;
                if pos + 1 != bytes.len() {
                    return Err(Error::invalid_name("data after root label"));
                }
                return Ok(labels);
            }

            if len > MAX_LABEL_LENGTH {
                return Err(Error::LabelTooLong { length: len });
            }

            pos += 1 + len;
            if pos > bytes.len() {
                return Err(Error::unexpected_end(pos));
            }
            if pos > MAX_NAME_LENGTH {
                return Err(Error::NameTooLong { length: pos });
            }
            labels += 1;
        }

        Err(Error::invalid_name("missing root label terminator"))
    }

    /// Returns the wire-format bytes (empty for the root name).
    #[inline]
    pub fn as_wire(&self) -> &[u8] {
        &self.wire
    }

    /// Returns the encoded length including the terminating zero.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.wire.len().max(1)
    }

    /// Returns the number of labels including the root.
    #[inline]
    pub const fn label_count(&self) -> usize {
        self.label_count as usize
    }

    /// Returns true if this is the root domain.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.wire.is_empty() || self.wire.as_slice() == [0]
    }

    /// Returns an iterator over the labels, root last.
    #[inline]
    pub fn labels(&self) -> LabelIter<'_> {
        LabelIter::new(&self.wire)
    }

    /// Returns the parent domain (leftmost label removed), or `None` for
    /// the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }

        let first_len = self.wire[0] as usize;
        let rest = &self.wire[1 + first_len..];
        if rest.len() <= 1 {
            return Some(Self::root());
        }
        Self::from_wire(rest).ok()
    }

    /// Returns a new name with `label` prepended.
    pub fn prepend_label(&self, label: &str) -> Result<Self> {
        validate_label(label)?;

        let tail = if self.wire.is_empty() { &[0u8][..] } else { &self.wire };
        let new_len = 1 + label.len() + tail.len();
        if new_len > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong { length: new_len });
        }

        let mut wire = SmallVec::with_capacity(new_len);
        wire.push(label.len() as u8);
        wire.extend_from_slice(label.as_bytes());
        wire.extend_from_slice(tail);

        Ok(Self {
            wire,
            label_count: self.label_count.saturating_add(1),
        })
    }

    /// Returns true if this name equals or sits below `other`.
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        if self.label_count() < other.label_count() {
            return false;
        }

        let self_labels: Vec<_> = self.labels().collect();
        let other_labels: Vec<_> = other.labels().collect();

        for (i, other_label) in other_labels.iter().rev().enumerate() {
            let self_idx = self_labels.len() - 1 - i;
            if !self_labels[self_idx].eq_ignore_ascii_case(other_label) {
                return false;
            }
        }

        true
    }

    /// Renders the dotted text form without a trailing dot.
    pub fn to_text(&self) -> CompactString {
        if self.is_root() {
            return CompactString::const_new(".");
        }

        let mut out = CompactString::default();
        for label in self.labels() {
            if label.is_root() {
                break;
            }
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(label.as_str_lossy().as_ref());
        }
        out
    }

    /// Returns a lowercased copy of the name.
    #[must_use]
    pub fn lowercased(&self) -> Self {
        let mut copy = self.clone();
        for byte in copy.wire.iter_mut() {
            *byte = byte.to_ascii_lowercase();
        }
        copy
    }
}

/// Checks one text-form label against the naming rules.
fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(Error::invalid_name("empty label"));
    }
    if label.len() > MAX_LABEL_LENGTH {
        return Err(Error::LabelTooLong {
            length: label.len(),
        });
    }
    if label.chars().any(|c| c == '.' || c.is_whitespace()) {
        return Err(Error::invalid_name(format!(
            "label \"{label}\" contains a dot or whitespace"
        )));
    }
    Ok(())
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a domain name from dotted text form.
    ///
    /// A trailing dot is accepted and implied when absent. `""` and `"."`
    /// produce the root name.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }

        let s = s.strip_suffix('.').unwrap_or(s);

        let mut wire = SmallVec::<[u8; 64]>::new();
        let mut label_count = 0u8;

        for part in s.split('.') {
            validate_label(part)?;
            wire.push(part.len() as u8);
            wire.extend_from_slice(part.as_bytes());
            label_count += 1;
        }

        wire.push(0);
        label_count += 1;

        if wire.len() > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong { length: wire.len() });
        }

        Ok(Self { wire, label_count })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name(\"{self}\")")
    }
}

impl PartialEq for Name {
    /// Case-insensitive comparison per DNS semantics.
    fn eq(&self, other: &Self) -> bool {
        if self.label_count != other.label_count {
            return false;
        }

        self.labels()
            .zip(other.labels())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels() {
            let lower: SmallVec<[u8; 64]> = label
                .as_bytes()
                .iter()
                .map(|b| b.to_ascii_lowercase())
                .collect();
            lower.hash(state);
        }
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    /// Canonical DNS name ordering per RFC 4034: rightmost labels first.
    fn cmp(&self, other: &Self) -> Ordering {
        let self_labels: Vec<_> = self.labels().collect();
        let other_labels: Vec<_> = other.labels().collect();

        let mut i = self_labels.len();
        let mut j = other_labels.len();

        while i > 0 && j > 0 {
            i -= 1;
            j -= 1;

            let cmp = self_labels[i].cmp_canonical(&other_labels[j]);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }

        self_labels.len().cmp(&other_labels.len())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::root()
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_name() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.label_count(), 1);
        assert_eq!(root.to_string(), ".");
        assert_eq!(root.wire_len(), 1);
    }

    #[test]
    fn test_name_parsing() {
        let name = Name::from_str("www.example.com.").unwrap();
        assert!(!name.is_root());
        assert_eq!(name.label_count(), 4);
        assert_eq!(name.to_string(), "www.example.com");

        // Without trailing dot
        let name2 = Name::from_str("www.example.com").unwrap();
        assert_eq!(name, name2);
    }

    #[test]
    fn test_case_insensitive_comparison() {
        let lower = Name::from_str("www.example.com").unwrap();
        let upper = Name::from_str("WWW.EXAMPLE.COM").unwrap();
        let mixed = Name::from_str("Www.ExAmPlE.CoM").unwrap();

        assert_eq!(lower, upper);
        assert_eq!(lower, mixed);
        assert_eq!(upper, mixed);
        assert_eq!(upper.lowercased().to_text(), "www.example.com");
    }

    #[test]
    fn test_label_iteration() {
        let name = Name::from_str("www.example.com").unwrap();
        let labels: Vec<_> = name.labels().map(|l| l.to_string()).collect();
        assert_eq!(labels, vec!["www", "example", "com", ""]);
    }

    #[test]
    fn test_parent() {
        let name = Name::from_str("www.example.com").unwrap();

        let parent1 = name.parent().unwrap();
        assert_eq!(parent1.to_string(), "example.com");

        let parent2 = parent1.parent().unwrap();
        assert_eq!(parent2.to_string(), "com");

        let parent3 = parent2.parent().unwrap();
        assert!(parent3.is_root());

        assert!(parent3.parent().is_none());
    }

    #[test]
    fn test_subdomain_check() {
        let name = Name::from_str("www.example.com").unwrap();
        let parent = Name::from_str("example.com").unwrap();
        let other = Name::from_str("other.com").unwrap();

        assert!(name.is_subdomain_of(&parent));
        assert!(name.is_subdomain_of(&name));
        assert!(!parent.is_subdomain_of(&name));
        assert!(!name.is_subdomain_of(&other));
    }

    #[test]
    fn test_invalid_names() {
        let long_label = "a".repeat(64);
        assert!(matches!(
            Name::from_str(&long_label),
            Err(Error::LabelTooLong { .. })
        ));

        assert!(matches!(
            Name::from_str("foo..bar"),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(
            Name::from_str("foo. bar.com"),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn test_prepend_label() {
        let name = Name::from_str("example.com").unwrap();
        let subdomain = name.prepend_label("www").unwrap();
        assert_eq!(subdomain.to_string(), "www.example.com");
        assert!(name.prepend_label("has space").is_err());
    }

    #[test]
    fn test_from_wire_validation() {
        let wire = [3, b'w', b'w', b'w', 0];
        let name = Name::from_wire(&wire).unwrap();
        assert_eq!(name.to_string(), "www");

        // Truncated: label runs past the end
        assert!(Name::from_wire(&[5, b'a', b'b']).is_err());
    }

    #[test]
    fn test_canonical_ordering() {
        let names: Vec<Name> = vec![
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "*.z.example.",
        ]
        .into_iter()
        .map(|s| Name::from_str(s).unwrap())
        .collect();

        let mut sorted = names.clone();
        sorted.sort();

        for i in 0..sorted.len() - 1 {
            assert!(sorted[i] <= sorted[i + 1]);
        }
    }
}
