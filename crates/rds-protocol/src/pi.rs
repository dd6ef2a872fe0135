//! Program Identification codes (block A)
//!
//! `CCCC AAAA RRRRRRRR`: country code, area coverage, program reference.

use std::fmt;

/// Area coverage code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Coverage {
    /// Single transmitter
    Local,
    /// International
    International,
    /// National
    National,
    /// Supra-regional
    SupraRegional,
    /// Regional, with region number 1-12
    Regional(u8),
}

impl Coverage {
    /// Decode the 4-bit area coverage field
    pub fn from_code(code: u8) -> Self {
        match code & 0x0F {
            0 => Coverage::Local,
            1 => Coverage::International,
            2 => Coverage::National,
            3 => Coverage::SupraRegional,
            n => Coverage::Regional(n - 3),
        }
    }

    /// Encode to the 4-bit area coverage field
    pub fn code(&self) -> u8 {
        match self {
            Coverage::Local => 0,
            Coverage::International => 1,
            Coverage::National => 2,
            Coverage::SupraRegional => 3,
            Coverage::Regional(region) => (*region).clamp(1, 12) + 3,
        }
    }
}

/// A 16-bit Program Identification code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ProgramId(pub u16);

impl ProgramId {
    /// Assemble a PI code from its parts
    pub fn from_parts(country: u8, coverage: Coverage, reference: u8) -> Self {
        ProgramId(
            (u16::from(country & 0x0F) << 12)
                | (u16::from(coverage.code()) << 8)
                | u16::from(reference),
        )
    }

    /// Country code (upper nibble)
    pub fn country_code(&self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// Area coverage
    pub fn coverage(&self) -> Coverage {
        Coverage::from_code(((self.0 >> 8) & 0x0F) as u8)
    }

    /// Program reference number
    pub fn reference(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Raw value
    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}
