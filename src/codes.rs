//! Sentinel codes for birth and death events
//!
//! Birth is recorded under several synonymous codes depending on the source
//! vocabulary, so it is matched against a set. Death has a single code.

use std::fmt;

/// A set of synonymous codes that all denote a birth event.
///
/// Matching is a membership test on the set held by the receiver, so there
/// is no `PartialEq<str>` impl. Call [`BirthCode::matches`] or
/// [`is_birth_code`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthCode {
    codes: &'static [&'static str],
}

impl BirthCode {
    /// Create a birth code backed by a fixed set of synonyms
    pub const fn new(codes: &'static [&'static str]) -> Self {
        Self { codes }
    }

    /// All accepted synonyms, in declaration order
    pub fn codes(&self) -> &'static [&'static str] {
        self.codes
    }

    /// Whether `candidate` is one of the accepted synonyms
    pub fn matches(&self, candidate: &str) -> bool {
        self.codes.contains(&candidate)
    }
}

impl fmt::Display for BirthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BirthCode({})", self.codes.join(", "))
    }
}

/// Codes recognised as birth events
pub const BIRTH_CODE: BirthCode = BirthCode::new(&["SNOMED/184099003", "SNOMED/3950001"]);

/// Code for death events
pub const DEATH_CODE: &str = "SNOMED/419620001";

/// Whether `candidate` denotes a birth event
pub fn is_birth_code(candidate: &str) -> bool {
    BIRTH_CODE.matches(candidate)
}

/// Whether `candidate` denotes a death event
pub fn is_death_code(candidate: &str) -> bool {
    candidate == DEATH_CODE
}
