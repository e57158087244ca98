//! SMILES reader.
//!
//! Supports the OpenSMILES features needed for similarity work: organic
//! subset and bracket atoms (any element, plus the `*` dummy atom), aromatic
//! atoms, explicit bonds, branches, ring closures (`1`..`9`, `%10`..`%99`)
//! and `.` disconnections. Tetrahedral chirality and bond direction (`/`,
//! `\`) are accepted but not recorded. Kekulé rings are perceived as
//! aromatic after parsing (see [`crate::chem::aromaticity`]).

use std::collections::BTreeMap;

use thiserror::Error;

use crate::chem::aromaticity::set_aromaticity;
use crate::chem::element::Element;
use crate::core::molecule::{Atom, BondOrder, Molecule};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unknown element '{symbol}' at position {pos}")]
    UnknownElement { symbol: String, pos: usize },

    #[error("element '{symbol}' cannot be aromatic (position {pos})")]
    InvalidAromatic { symbol: String, pos: usize },

    #[error("unterminated bracket atom starting at position {0}")]
    UnclosedBracket(usize),

    #[error("unbalanced parenthesis at position {0}")]
    UnbalancedParenthesis(usize),

    #[error("ring bond {0} was opened but never closed")]
    UnclosedRing(u32),

    #[error("invalid ring closure at position {0}")]
    InvalidRingClosure(usize),

    #[error("bond at position {0} is not between two atoms")]
    DanglingBond(usize),
}

/// Parse a SMILES string into a molecule
///
/// # Errors
///
/// Returns a `SmilesError` describing the first syntax problem found.
pub fn parse_smiles(smiles: &str) -> Result<Molecule, SmilesError> {
    let smiles = smiles.trim();
    if smiles.is_empty() {
        return Err(SmilesError::Empty);
    }
    Parser::new(smiles).parse()
}

/// Parse a SMILES string and attach a title
///
/// # Errors
///
/// See [`parse_smiles`].
pub fn parse_smiles_named(smiles: &str, name: Option<&str>) -> Result<Molecule, SmilesError> {
    let mut mol = parse_smiles(smiles)?;
    mol.name = name.filter(|n| !n.is_empty()).map(str::to_string);
    Ok(mol)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    mol: Molecule,
    prev: Option<usize>,
    branches: Vec<Option<usize>>,
    /// Bond symbol waiting for its second atom, with its position
    pending: Option<(Option<BondOrder>, usize)>,
    /// Open ring bonds: number -> (atom, bond symbol given at opening)
    rings: BTreeMap<u32, (usize, Option<BondOrder>)>,
}

impl<'a> Parser<'a> {
    fn new(smiles: &'a str) -> Self {
        Self {
            input: smiles.as_bytes(),
            pos: 0,
            mol: Molecule::new(),
            prev: None,
            branches: Vec::new(),
            pending: None,
            rings: BTreeMap::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmilesError {
        let ch = std::str::from_utf8(&self.input[self.pos..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        SmilesError::UnexpectedChar { ch, pos: self.pos }
    }

    fn parse(mut self) -> Result<Molecule, SmilesError> {
        while let Some(c) = self.peek() {
            match c {
                b'(' => {
                    if self.prev.is_none() || self.pending.is_some() {
                        return Err(SmilesError::UnbalancedParenthesis(self.pos));
                    }
                    self.branches.push(self.prev);
                    self.pos += 1;
                }
                b')' => {
                    if let Some((_, pos)) = self.pending {
                        return Err(SmilesError::DanglingBond(pos));
                    }
                    self.prev = self
                        .branches
                        .pop()
                        .ok_or(SmilesError::UnbalancedParenthesis(self.pos))?;
                    self.pos += 1;
                }
                b'.' => {
                    if let Some((_, pos)) = self.pending {
                        return Err(SmilesError::DanglingBond(pos));
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                b'-' | b'=' | b'#' | b':' | b'/' | b'\\' => {
                    if self.pending.is_some() || self.prev.is_none() {
                        return Err(SmilesError::DanglingBond(self.pos));
                    }
                    let order = match c {
                        b'=' => BondOrder::Double,
                        b'#' => BondOrder::Triple,
                        b':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.pending = Some((Some(order), self.pos));
                    self.pos += 1;
                }
                b'0'..=b'9' => {
                    let number = u32::from(c - b'0');
                    let start = self.pos;
                    self.pos += 1;
                    self.ring_bond(number, start)?;
                }
                b'%' => {
                    let start = self.pos;
                    let number = match (self.peek_at(1), self.peek_at(2)) {
                        (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                            u32::from(a - b'0') * 10 + u32::from(b - b'0')
                        }
                        _ => return Err(SmilesError::InvalidRingClosure(start)),
                    };
                    self.pos += 3;
                    self.ring_bond(number, start)?;
                }
                b'[' => {
                    let atom = self.bracket_atom()?;
                    self.attach(atom)?;
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.attach(atom)?;
                }
            }
        }

        if let Some((_, pos)) = self.pending {
            return Err(SmilesError::DanglingBond(pos));
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::UnbalancedParenthesis(self.input.len()));
        }
        if let Some((&number, _)) = self.rings.iter().next() {
            return Err(SmilesError::UnclosedRing(number));
        }
        if self.mol.is_empty() {
            return Err(SmilesError::Empty);
        }
        set_aromaticity(&mut self.mol);
        Ok(self.mol)
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.mol.atom(a).aromatic && self.mol.atom(b).aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    /// Add an atom and bond it to the previous atom of the current chain
    fn attach(&mut self, atom: Atom) -> Result<(), SmilesError> {
        let index = self.mol.add_atom(atom);
        match (self.prev, self.pending.take()) {
            (Some(prev), pending) => {
                let order = pending
                    .and_then(|(o, _)| o)
                    .unwrap_or_else(|| self.default_order(prev, index));
                self.mol.add_bond(prev, index, order);
            }
            (None, Some((_, pos))) => return Err(SmilesError::DanglingBond(pos)),
            (None, None) => {}
        }
        self.prev = Some(index);
        Ok(())
    }

    fn ring_bond(&mut self, number: u32, pos: usize) -> Result<(), SmilesError> {
        let current = self.prev.ok_or(SmilesError::InvalidRingClosure(pos))?;
        let pending = self.pending.take().and_then(|(o, _)| o);

        if let Some((open_atom, open_order)) = self.rings.remove(&number) {
            let order = match (open_order, pending) {
                (Some(a), Some(b)) if a != b => return Err(SmilesError::InvalidRingClosure(pos)),
                (Some(o), _) | (None, Some(o)) => o,
                (None, None) => self.default_order(open_atom, current),
            };
            self.mol
                .add_bond(open_atom, current, order)
                .ok_or(SmilesError::InvalidRingClosure(pos))?;
        } else {
            self.rings.insert(number, (current, pending));
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let c = self.peek().ok_or(SmilesError::Empty)?;

        let (symbol, aromatic, len) = match (c, self.peek_at(1)) {
            (b'C', Some(b'l')) => ("Cl", false, 2),
            (b'B', Some(b'r')) => ("Br", false, 2),
            (b'B', _) => ("B", false, 1),
            (b'C', _) => ("C", false, 1),
            (b'N', _) => ("N", false, 1),
            (b'O', _) => ("O", false, 1),
            (b'P', _) => ("P", false, 1),
            (b'S', _) => ("S", false, 1),
            (b'F', _) => ("F", false, 1),
            (b'I', _) => ("I", false, 1),
            (b'*', _) => ("*", false, 1),
            (b'b', _) => ("B", true, 1),
            (b'c', _) => ("C", true, 1),
            (b'n', _) => ("N", true, 1),
            (b'o', _) => ("O", true, 1),
            (b'p', _) => ("P", true, 1),
            (b's', _) => ("S", true, 1),
            _ => return Err(self.unexpected()),
        };
        self.pos += len;

        let element = Element::from_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
            symbol: symbol.to_string(),
            pos: start,
        })?;
        let atom = Atom::new(element);
        Ok(if aromatic { atom.aromatic() } else { atom })
    }

    fn read_number(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
    }

    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let open = self.pos;
        self.pos += 1;

        let isotope = self.read_number();

        // Element symbol: aromatic two-letter, aromatic one-letter, or
        // capitalised symbol with an optional lower case letter
        let sym_start = self.pos;
        let (element, aromatic) = match self.peek() {
            Some(c) if c.is_ascii_lowercase() => {
                let two = self
                    .input
                    .get(self.pos..self.pos + 2)
                    .and_then(|s| std::str::from_utf8(s).ok())
                    .filter(|s| matches!(*s, "se" | "as" | "te"));
                let symbol = if let Some(two) = two {
                    self.pos += 2;
                    capitalise(two)
                } else {
                    self.pos += 1;
                    capitalise(&char::from(c).to_string())
                };
                let element = Element::from_symbol(&symbol).ok_or_else(|| {
                    SmilesError::UnknownElement {
                        symbol: symbol.clone(),
                        pos: sym_start,
                    }
                })?;
                if !element.can_be_aromatic() {
                    return Err(SmilesError::InvalidAromatic {
                        symbol,
                        pos: sym_start,
                    });
                }
                (element, true)
            }
            Some(c) if c.is_ascii_uppercase() => {
                let two = self
                    .peek_at(1)
                    .filter(u8::is_ascii_lowercase)
                    .map(|l| format!("{}{}", char::from(c), char::from(l)))
                    .and_then(|s| Element::from_symbol(&s));
                if let Some(element) = two {
                    self.pos += 2;
                    (element, false)
                } else {
                    let symbol = char::from(c).to_string();
                    let element = Element::from_symbol(&symbol)
                        .ok_or(SmilesError::UnknownElement { symbol, pos: sym_start })?;
                    self.pos += 1;
                    (element, false)
                }
            }
            Some(b'*') => {
                let element = Element::from_symbol("*").ok_or(SmilesError::UnknownElement {
                    symbol: "*".to_string(),
                    pos: sym_start,
                })?;
                self.pos += 1;
                (element, false)
            }
            Some(_) => return Err(self.unexpected()),
            None => return Err(SmilesError::UnclosedBracket(open)),
        };

        // Chirality: @, @@, or an extended class such as @TH1 / @SP2
        if self.peek() == Some(b'@') {
            self.pos += 1;
            if self.peek() == Some(b'@') {
                self.pos += 1;
            } else if self.peek().is_some_and(|c| c.is_ascii_uppercase() && c != b'H') {
                while self.peek().is_some_and(|c| c.is_ascii_uppercase()) {
                    self.pos += 1;
                }
                self.read_number();
            }
        }

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.pos += 1;
            hydrogens = match self.read_number() {
                Some(n) => u8::try_from(n).map_err(|_| self.unexpected())?,
                None => 1,
            };
        }

        let mut charge = 0i32;
        if let Some(sign @ (b'+' | b'-')) = self.peek() {
            let unit = if sign == b'+' { 1 } else { -1 };
            self.pos += 1;
            if let Some(n) = self.read_number() {
                charge = unit * i32::try_from(n).unwrap_or(i32::MAX);
            } else {
                charge = unit;
                while self.peek() == Some(sign) {
                    charge += unit;
                    self.pos += 1;
                }
            }
        }

        // Atom class is accepted and discarded
        if self.peek() == Some(b':') {
            self.pos += 1;
            if self.read_number().is_none() {
                return Err(self.unexpected());
            }
        }

        match self.peek() {
            Some(b']') => self.pos += 1,
            Some(_) => return Err(self.unexpected()),
            None => return Err(SmilesError::UnclosedBracket(open)),
        }

        let charge = i8::try_from(charge).map_err(|_| SmilesError::UnexpectedChar {
            ch: '+',
            pos: open,
        })?;
        let mut atom = Atom::new(element)
            .with_charge(charge)
            .with_hydrogens(hydrogens);
        if let Some(isotope) = isotope {
            atom = atom.with_isotope(u16::try_from(isotope).unwrap_or(u16::MAX));
        }
        if aromatic {
            atom = atom.aromatic();
        }
        Ok(atom)
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}
