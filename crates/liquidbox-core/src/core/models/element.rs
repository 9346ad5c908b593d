use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical elements found in small-molecule liquid simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Element {
    H,
    He,
    Li,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Br,
    I,
}

#[rustfmt::skip]
static ELEMENT_SYMBOLS: Map<&'static str, Element> = phf_map! {
    "H" => Element::H, "He" => Element::He, "Li" => Element::Li,
    "B" => Element::B, "C" => Element::C, "N" => Element::N,
    "O" => Element::O, "F" => Element::F, "Ne" => Element::Ne,
    "Na" => Element::Na, "Mg" => Element::Mg, "Al" => Element::Al,
    "Si" => Element::Si, "P" => Element::P, "S" => Element::S,
    "Cl" => Element::Cl, "Ar" => Element::Ar, "K" => Element::K,
    "Ca" => Element::Ca, "Br" => Element::Br, "I" => Element::I,
};

impl Element {
    /// Standard atomic weight in g/mol (IUPAC conventional values).
    pub fn atomic_mass(&self) -> f64 {
        match self {
            Self::H => 1.008,
            Self::He => 4.0026,
            Self::Li => 6.94,
            Self::B => 10.81,
            Self::C => 12.011,
            Self::N => 14.007,
            Self::O => 15.999,
            Self::F => 18.998,
            Self::Ne => 20.180,
            Self::Na => 22.990,
            Self::Mg => 24.305,
            Self::Al => 26.982,
            Self::Si => 28.085,
            Self::P => 30.974,
            Self::S => 32.06,
            Self::Cl => 35.45,
            Self::Ar => 39.95,
            Self::K => 39.098,
            Self::Ca => 40.078,
            Self::Br => 79.904,
            Self::I => 126.90,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::H => "H",
            Self::He => "He",
            Self::Li => "Li",
            Self::B => "B",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Ne => "Ne",
            Self::Na => "Na",
            Self::Mg => "Mg",
            Self::Al => "Al",
            Self::Si => "Si",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::Ar => "Ar",
            Self::K => "K",
            Self::Ca => "Ca",
            Self::Br => "Br",
            Self::I => "I",
        }
    }

    /// Infers the element from a DREIDING-style force-field type or an atom name.
    ///
    /// Two-letter symbols win over one-letter ones (`Cl_` is chlorine, not
    /// carbon); anything after the leading alphabetic run (`_3`, `R`, digits)
    /// is ignored.
    pub fn infer(label: &str) -> Option<Self> {
        let alpha: String = label
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        let mut chars = alpha.chars();
        let first = chars.next()?.to_ascii_uppercase();
        if let Some(second) = chars.next() {
            let two = format!("{}{}", first, second.to_ascii_lowercase());
            if let Some(element) = ELEMENT_SYMBOLS.get(two.as_str()) {
                // "CA" is an alpha carbon, not calcium.
                if second.is_ascii_lowercase() || (alpha.len() == 2 && label.contains('_')) {
                    return Some(*element);
                }
            }
        }
        ELEMENT_SYMBOLS.get(first.to_string().as_str()).copied()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown element symbol: '{0}'")]
pub struct ParseElementError(pub String);

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ELEMENT_SYMBOLS
            .get(s.trim())
            .copied()
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

impl TryFrom<String> for Element {
    type Error = ParseElementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Element> for String {
    fn from(value: Element) -> Self {
        value.symbol().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbols_case_sensitively() {
        assert_eq!("Cl".parse::<Element>(), Ok(Element::Cl));
        assert_eq!("O".parse::<Element>(), Ok(Element::O));
        assert!("CL".parse::<Element>().is_err());
        assert!("Xx".parse::<Element>().is_err());
    }

    #[test]
    fn infers_element_from_dreiding_types() {
        assert_eq!(Element::infer("C_3"), Some(Element::C));
        assert_eq!(Element::infer("C_R"), Some(Element::C));
        assert_eq!(Element::infer("H_"), Some(Element::H));
        assert_eq!(Element::infer("H___A"), Some(Element::H));
        assert_eq!(Element::infer("O_2"), Some(Element::O));
        assert_eq!(Element::infer("Cl"), Some(Element::Cl));
        assert_eq!(Element::infer("Br"), Some(Element::Br));
        assert_eq!(Element::infer("Na"), Some(Element::Na));
    }

    #[test]
    fn infers_element_from_atom_names() {
        assert_eq!(Element::infer("CA"), Some(Element::C));
        assert_eq!(Element::infer("HO1"), Some(Element::H));
        assert_eq!(Element::infer("N1"), Some(Element::N));
        assert_eq!(Element::infer(""), None);
        assert_eq!(Element::infer("42"), None);
    }

    #[test]
    fn masses_are_standard_weights() {
        assert!((Element::H.atomic_mass() - 1.008).abs() < 1e-9);
        assert!((Element::O.atomic_mass() - 15.999).abs() < 1e-9);
    }

    #[test]
    fn serializes_as_symbol() {
        let json = serde_json::to_string(&Element::Cl).unwrap();
        assert_eq!(json, "\"Cl\"");
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Element::Cl);
    }
}
