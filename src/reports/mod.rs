/*!
Rendering of solver output (§6).

Atom ids are internal to the core; callers identify atoms by whatever external scheme the
grounder used (predicate names, ground terms, ...). [AtomDecoder] is the seam at which that
translation happens — the core never assumes a particular naming convention, only that decoding
an id can fail, in which case that atom is skipped and the failure logged rather than aborting
the whole report (§7).
*/

use crate::structures::atom::Atom;

/// Translates an internal atom id back to whatever external representation the caller's grounder
/// used (e.g. a predicate-and-arguments string). Implementations may fail for ids outside their
/// known range.
pub trait AtomDecoder {
    fn decode(&self, atom: Atom) -> Option<String>;
}

/// An [AtomDecoder] that renders atoms as their bare numeric id; always succeeds. Useful when no
/// external naming is available, or in tests.
pub struct IdentityDecoder;

impl AtomDecoder for IdentityDecoder {
    fn decode(&self, atom: Atom) -> Option<String> {
        Some(atom.to_string())
    }
}

/// Renders a MAP assignment as `<decoded-atom> 0|1\n` per query atom (§6).
///
/// `state_of` yields the final Boolean state of a query atom; `output_all` selects between
/// emitting every query atom or only those set `true`. Atoms the decoder can't resolve are
/// skipped and logged, not fatal.
pub fn format_map(
    query_range: (Atom, Atom),
    state_of: impl Fn(Atom) -> bool,
    decoder: &dyn AtomDecoder,
    output_all: bool,
) -> String {
    let (start, end) = query_range;
    let mut out = String::new();
    for atom in start..=end {
        let value = state_of(atom);
        if !output_all && !value {
            continue;
        }
        match decoder.decode(atom) {
            Some(name) => out.push_str(&format!("{name} {}\n", value as u8)),
            None => log::error!(
                target: crate::misc::log::targets::REPORTS,
                "could not decode atom {atom}; omitted from MAP report",
            ),
        }
    }
    out
}

/// Renders per-atom marginals as `<decoded-atom> <probability>\n`, probability formatted to
/// seven decimal places (§6's `0.0######`).
pub fn format_marginals(
    query_range: (Atom, Atom),
    marginals: &[f64],
    decoder: &dyn AtomDecoder,
) -> String {
    let (start, end) = query_range;
    let mut out = String::new();
    for (offset, atom) in (start..=end).enumerate() {
        let Some(probability) = marginals.get(offset) else {
            continue;
        };
        match decoder.decode(atom) {
            Some(name) => out.push_str(&format!("{name} {probability:.7}\n")),
            None => log::error!(
                target: crate::misc::log::targets::REPORTS,
                "could not decode atom {atom}; omitted from marginal report",
            ),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SkipOne(Atom);
    impl AtomDecoder for SkipOne {
        fn decode(&self, atom: Atom) -> Option<String> {
            if atom == self.0 {
                None
            } else {
                Some(format!("atom{atom}"))
            }
        }
    }

    #[test]
    fn map_report_honours_output_all() {
        let report = format_map((1, 3), |a| a == 2, &IdentityDecoder, false);
        assert_eq!(report, "2 1\n");

        let full = format_map((1, 3), |a| a == 2, &IdentityDecoder, true);
        assert_eq!(full, "1 0\n2 1\n3 0\n");
    }

    #[test]
    fn undecodable_atoms_are_skipped_not_fatal() {
        let report = format_map((1, 2), |_| true, &SkipOne(1), true);
        assert_eq!(report, "atom2 1\n");
    }

    #[test]
    fn marginals_are_formatted_to_seven_places() {
        let report = format_marginals((1, 1), &[0.75], &IdentityDecoder);
        assert_eq!(report, "1 0.7500000\n");
    }
}
