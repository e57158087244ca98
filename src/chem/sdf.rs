//! MDL V2000 molfile block reader.
//!
//! One call parses one record of a structure-data file: the three header
//! lines, the counts line, the atom and bond blocks, the `M  CHG` / `M  ISO`
//! property lines and any trailing `> <TAG>` data items. Coordinates are
//! validated but not kept. Kekulé rings are perceived as aromatic. Record
//! splitting (`$$$$`) is the loader's job.

use thiserror::Error;

use crate::chem::aromaticity::set_aromaticity;
use crate::chem::element::Element;
use crate::core::molecule::{Atom, BondOrder, Molecule};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MolBlockError {
    #[error("V3000 molfiles are not supported")]
    UnsupportedVersion,

    #[error("invalid molfile data: {details} (at line ~{line})")]
    Parse { line: usize, details: String },
}

impl MolBlockError {
    fn parse(line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            line,
            details: details.into(),
        }
    }
}

const COUNTS_LINE: usize = 3;

/// Parse a single V2000 molfile block. Line numbers in errors are 1-based
/// and relative to the start of the block.
///
/// # Errors
///
/// Returns `MolBlockError::UnsupportedVersion` for V3000 blocks and
/// `MolBlockError::Parse` for truncated or malformed content.
pub fn parse_mol_block(block: &str) -> Result<Molecule, MolBlockError> {
    let lines: Vec<&str> = block.lines().collect();
    if lines.len() <= COUNTS_LINE {
        return Err(MolBlockError::parse(
            lines.len().max(1),
            "block must contain a header and counts line",
        ));
    }

    let counts_line = lines[COUNTS_LINE];
    if counts_line.contains("V3000") {
        return Err(MolBlockError::UnsupportedVersion);
    }
    let (atom_count, bond_count) = parse_counts(counts_line, COUNTS_LINE + 1)?;

    let atom_start = COUNTS_LINE + 1;
    let bond_start = atom_start + atom_count;
    let props_start = bond_start + bond_count;
    if lines.len() < props_start {
        return Err(MolBlockError::parse(
            lines.len(),
            "block ended before atoms/bonds were fully specified",
        ));
    }

    let mut mol = Molecule::new();
    let title = lines[0].trim();
    if !title.is_empty() {
        mol.name = Some(title.to_string());
    }

    for (offset, raw) in lines[atom_start..bond_start].iter().enumerate() {
        mol.add_atom(parse_atom(raw, atom_start + offset + 1)?);
    }

    let mut aromatic_atoms = Vec::new();
    for (offset, raw) in lines[bond_start..props_start].iter().enumerate() {
        let ln = bond_start + offset + 1;
        let (a1, a2, order) = parse_bond(raw, ln, atom_count)?;
        if order == BondOrder::Aromatic {
            aromatic_atoms.extend([a1, a2]);
        }
        mol.add_bond(a1, a2, order)
            .ok_or_else(|| MolBlockError::parse(ln, "duplicate or self-referencing bond"))?;
    }

    let data_start = apply_properties(&mut mol, &lines, props_start)?;
    for atom in aromatic_atoms {
        mol.atom_mut(atom).aromatic = true;
    }
    read_data_items(&mut mol, &lines[data_start..]);
    set_aromaticity(&mut mol);

    Ok(mol)
}

/// Slice a fixed-width column, tolerating short lines
fn column(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("").trim()
}

fn parse_counts(line: &str, ln: usize) -> Result<(usize, usize), MolBlockError> {
    if !line.is_ascii() {
        return Err(MolBlockError::parse(ln, "counts line contains non-ASCII data"));
    }
    let atoms = column(line, 0, 3)
        .parse::<usize>()
        .map_err(|_| MolBlockError::parse(ln, "invalid atom count"))?;
    let bonds = column(line, 3, 6)
        .parse::<usize>()
        .map_err(|_| MolBlockError::parse(ln, "invalid bond count"))?;
    Ok((atoms, bonds))
}

fn parse_atom(raw: &str, ln: usize) -> Result<Atom, MolBlockError> {
    if !raw.is_ascii() {
        return Err(MolBlockError::parse(ln, "atom line contains non-ASCII data"));
    }
    for (start, axis) in [(0, "x"), (10, "y"), (20, "z")] {
        column(raw, start, start + 10)
            .parse::<f64>()
            .map_err(|_| MolBlockError::parse(ln, format!("invalid {axis} coordinate in atom line")))?;
    }

    let symbol = column(raw, 31, 34);
    let element = Element::from_symbol_ignore_case(symbol)
        .ok_or_else(|| MolBlockError::parse(ln, format!("unknown element symbol '{symbol}'")))?;

    let charge_code = match column(raw, 36, 39) {
        "" => 0,
        code => code
            .parse::<u8>()
            .map_err(|_| MolBlockError::parse(ln, "invalid charge field in atom line"))?,
    };
    let charge = match charge_code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        // 0 = uncharged, 4 = doublet radical
        _ => 0,
    };

    Ok(Atom::new(element).with_charge(charge))
}

fn parse_bond(
    raw: &str,
    ln: usize,
    atom_count: usize,
) -> Result<(usize, usize, BondOrder), MolBlockError> {
    if !raw.is_ascii() {
        return Err(MolBlockError::parse(ln, "bond line contains non-ASCII data"));
    }
    let a1 = column(raw, 0, 3)
        .parse::<usize>()
        .map_err(|_| MolBlockError::parse(ln, "invalid first atom index"))?;
    let a2 = column(raw, 3, 6)
        .parse::<usize>()
        .map_err(|_| MolBlockError::parse(ln, "invalid second atom index"))?;
    let order = match column(raw, 6, 9) {
        "1" => BondOrder::Single,
        "2" => BondOrder::Double,
        "3" => BondOrder::Triple,
        "4" => BondOrder::Aromatic,
        _ => {
            return Err(MolBlockError::parse(
                ln,
                "unsupported bond order in bond line",
            ))
        }
    };

    if a1 == 0 || a2 == 0 || a1 > atom_count || a2 > atom_count {
        return Err(MolBlockError::parse(
            ln,
            "bond references atom outside declared range",
        ));
    }
    Ok((a1 - 1, a2 - 1, order))
}

/// Apply `M  CHG` and `M  ISO` lines. Returns the index of the first line
/// after `M  END` (or after the last property line if `M  END` is missing).
fn apply_properties(
    mol: &mut Molecule,
    lines: &[&str],
    start: usize,
) -> Result<usize, MolBlockError> {
    let mut charges_reset = false;
    let mut index = start;

    while index < lines.len() {
        let line = lines[index];
        let ln = index + 1;
        index += 1;

        if line.starts_with("M  END") {
            break;
        }
        if line.starts_with('>') {
            // Data items without a terminating M  END
            index -= 1;
            break;
        }

        let is_charge = line.starts_with("M  CHG");
        let is_isotope = line.starts_with("M  ISO");
        if !is_charge && !is_isotope {
            continue;
        }

        // An M  CHG line supersedes every charge given in the atom block
        if is_charge && !charges_reset {
            for atom in 0..mol.atom_count() {
                mol.atom_mut(atom).charge = 0;
            }
            charges_reset = true;
        }

        let tokens: Vec<&str> = line.split_whitespace().skip(2).collect();
        let entries = tokens
            .first()
            .and_then(|t| t.parse::<usize>().ok())
            .ok_or_else(|| MolBlockError::parse(ln, "invalid property entry count"))?;
        let values = entries
            .checked_mul(2)
            .filter(|&n| n < tokens.len())
            .ok_or_else(|| MolBlockError::parse(ln, "property line is truncated"))?;

        for pair in tokens[1..=values].chunks(2) {
            let atom = pair[0]
                .parse::<usize>()
                .ok()
                .filter(|&a| a >= 1 && a <= mol.atom_count())
                .ok_or_else(|| MolBlockError::parse(ln, "property references unknown atom"))?;
            let value = pair[1]
                .parse::<i32>()
                .map_err(|_| MolBlockError::parse(ln, "invalid property value"))?;

            if is_charge {
                let charge = i8::try_from(value)
                    .map_err(|_| MolBlockError::parse(ln, "charge out of range"))?;
                mol.atom_mut(atom - 1).charge = charge;
            } else {
                let isotope = u16::try_from(value)
                    .map_err(|_| MolBlockError::parse(ln, "isotope out of range"))?;
                mol.atom_mut(atom - 1).isotope = Some(isotope);
            }
        }
    }
    Ok(index)
}

/// Collect `> <TAG>` data items; each value runs until a blank line
fn read_data_items(mol: &mut Molecule, lines: &[&str]) {
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in lines {
        if let Some((tag, values)) = current.as_mut() {
            if line.trim().is_empty() {
                mol.properties.insert(std::mem::take(tag), values.join("\n"));
                current = None;
            } else {
                values.push(line.trim_end());
            }
            continue;
        }

        if line.starts_with('>') {
            if let (Some(open), Some(close)) = (line.find('<'), line.rfind('>')) {
                if close > open {
                    current = Some((line[open + 1..close].to_string(), Vec::new()));
                }
            }
        }
    }

    if let Some((tag, values)) = current {
        mol.properties.insert(tag, values.join("\n"));
    }
}
