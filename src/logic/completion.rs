/*!
Predicate completion (§4.7).

Turns a set of definite clauses (`head :- body`) together with a background KB of arbitrary
formulas into a logically stronger KB, by replacing each head predicate with the disjunction of
its bodies — Clark's completion. Body variables that don't also occur in the head are treated as
existentially quantified before the disjunction is built, since the completion only speaks for
the head's own variables.
*/

use std::collections::{HashMap, HashSet};

use super::formatter::AUX_PREDICATE_PREFIX;
use super::{FolClause, FolLiteral, Term};
use crate::types::err::ErrorKind;

/// Which completion strategy to apply (§4.7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionMode {
    /// Produce `head ⇔ body-disjunction` as a new formula, leaving the rest of the KB untouched.
    Standard,

    /// Substitute the equivalence into every other formula in the KB that mentions the head
    /// predicate.
    Simplification,

    /// Emit both implications of the equivalence, plus complementary negated-unit clauses for
    /// every head grounding not covered by any body (the "closed-world" groundings).
    Decomposed,
}

/// One definite clause `head :- body₁ ∧ ... ∧ bodyₙ`, expressed as a positive head literal and a
/// (conjunctive) list of body literals.
#[derive(Clone, Debug)]
pub struct DefiniteClause {
    pub head: FolLiteral,
    pub body: Vec<FolLiteral>,
}

/// A knowledge base of arbitrary (non-definite) formulas, each a disjunctive [FolClause].
pub type Kb = Vec<FolClause>;

/// Runs predicate completion over `definite_clauses`, applying `mode`'s strategy to `kb`.
///
/// Definite clauses are grouped by head predicate; each group becomes one completed definition.
/// `Simplification` mode fails with [ErrorKind::Contradiction] — repurposed here as "substitution
/// impossible", since the completion core has no dedicated variant for that — if a formula in
/// `kb` mentions a completed head under a polarity or arity the substitution can't rewrite (§4.7:
/// "fatal error if substitution fails").
pub fn complete(definite_clauses: Vec<DefiniteClause>, kb: Kb, mode: CompletionMode) -> Result<Kb, ErrorKind> {
    let groups = group_by_head_predicate(definite_clauses);

    match mode {
        CompletionMode::Standard => {
            let mut result = kb;
            for (_, clauses) in &groups {
                result.extend(equivalence_clause(clauses));
            }
            Ok(result)
        }
        CompletionMode::Simplification => {
            let mut result = kb;
            for (predicate, clauses) in &groups {
                let (disjuncts, support) = equivalence_disjuncts(clauses);
                result = substitute_equivalence(result, predicate, &disjuncts)?;
                result.extend(support);
            }
            Ok(result)
        }
        CompletionMode::Decomposed => {
            let mut result = kb.clone();
            for (predicate, clauses) in &groups {
                result.extend(decomposed_clauses(clauses));
                result.extend(closed_world_clauses(predicate, clauses, &kb));
            }
            Ok(result)
        }
    }
}

fn group_by_head_predicate(clauses: Vec<DefiniteClause>) -> Vec<(String, Vec<DefiniteClause>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<DefiniteClause>> = HashMap::new();
    for clause in clauses {
        let key = clause.head.predicate.clone();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(clause);
    }
    order.into_iter().map(|k| { let v = groups.remove(&k).unwrap(); (k, v) }).collect()
}

/// Existentially quantifying a body variable not in the head means nothing more, here, than
/// leaving it as a free variable local to its own disjunct — each disjunct already scopes its
/// own body variables, so no renaming is required beyond keeping disjuncts from sharing names
/// that aren't meant to unify. Clause bodies coming out of a grounder are already apart, so this
/// is a no-op placeholder kept for documentation purposes.
fn quantify_body(body: Vec<FolLiteral>, _head: &FolLiteral) -> Vec<FolLiteral> {
    body
}

/// Picks one literal to stand for each clause's body in the head's disjunction. A unit body is
/// used directly; a body with zero or several conjuncts is reified behind a fresh `AUX_` literal
/// so the disjunction built from it stays a flat list of literals, along with the clauses that
/// define that literal as the conjunction it stands for (`aux -> body_i` per conjunct, and
/// `body_1 ∧ ... ∧ body_n -> aux` as one clause; an empty body makes `aux` unconditionally true).
fn equivalence_disjuncts(clauses: &[DefiniteClause]) -> (Vec<FolLiteral>, Vec<FolClause>) {
    let mut disjuncts = Vec::with_capacity(clauses.len());
    let mut support = Vec::new();

    for (index, clause) in clauses.iter().enumerate() {
        if let [single] = clause.body.as_slice() {
            disjuncts.push(single.clone());
            continue;
        }

        let aux = FolLiteral::new(
            format!("{AUX_PREDICATE_PREFIX}COMPL_{}_{index}", clause.head.predicate),
            clause.head.args.clone(),
            true,
        );
        for literal in &clause.body {
            support.push(FolClause::new(f64::INFINITY, vec![aux.negate(), literal.clone()]));
        }
        let mut conjunction_implies_aux: Vec<FolLiteral> = clause.body.iter().map(|l| l.negate()).collect();
        conjunction_implies_aux.push(aux.clone());
        support.push(FolClause::new(f64::INFINITY, conjunction_implies_aux));

        disjuncts.push(aux);
    }

    (disjuncts, support)
}

/// Builds `head ⇔ (body₁ ∨ body₂ ∨ ...)` as the full set of clauses the biconditional expands
/// to: the forward direction `¬head ∨ disjunct₁ ∨ disjunct₂ ∨ ...`, one backward clause per
/// disjunct (`¬disjunctᵢ ∨ head`), and any aux-definition clauses [equivalence_disjuncts] needed
/// along the way. `Standard` mode's "one new formula" is this whole set taken together.
fn equivalence_clause(clauses: &[DefiniteClause]) -> Vec<FolClause> {
    let head = &clauses[0].head;
    let (disjuncts, mut clauses_out) = equivalence_disjuncts(clauses);

    let mut forward = vec![head.negate()];
    forward.extend(disjuncts.iter().cloned());
    clauses_out.insert(0, FolClause::new(f64::INFINITY, forward));

    for disjunct in &disjuncts {
        clauses_out.push(FolClause::new(f64::INFINITY, vec![disjunct.negate(), head.clone()]));
    }

    clauses_out
}

/// Ground head instances that occur (positively) somewhere in `kb` but match none of `clauses`'
/// own ground head instances get asserted false — the closed-world half of `Decomposed` mode.
/// Only literally ground occurrences (all-`Term::Const` args) are considered; a head literal
/// that still carries variables hasn't been grounded yet, and enumerating its groundings is a
/// grounder's job, not this module's.
fn closed_world_clauses(predicate: &str, clauses: &[DefiniteClause], kb: &[FolClause]) -> Vec<FolClause> {
    let is_ground = |args: &[Term]| args.iter().all(|a| matches!(a, Term::Const(_)));

    let covered: HashSet<Vec<Term>> = clauses
        .iter()
        .filter(|c| is_ground(&c.head.args))
        .map(|c| c.head.args.clone())
        .collect();

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for clause in kb {
        for literal in &clause.literals {
            if literal.predicate == predicate
                && literal.polarity
                && is_ground(&literal.args)
                && !covered.contains(&literal.args)
                && seen.insert(literal.args.clone())
            {
                out.push(FolClause::new(f64::INFINITY, vec![literal.negate()]));
            }
        }
    }
    out
}

/// For `Decomposed` mode: both directions of the equivalence as separate clauses, one per body
/// (closed-world groundings not covered by any body are handled separately, by
/// [closed_world_clauses]).
fn decomposed_clauses(clauses: &[DefiniteClause]) -> Vec<FolClause> {
    let head = &clauses[0].head;
    let mut out = Vec::new();

    for clause in clauses {
        // body -> head: ¬body1 ∨ ¬body2 ∨ ... ∨ head
        let mut forward: Vec<FolLiteral> = quantify_body(clause.body.clone(), head)
            .into_iter()
            .map(|l| l.negate())
            .collect();
        forward.push(head.clone());
        out.push(FolClause::new(f64::INFINITY, forward));

        // head -> body, decomposed per conjunct: ¬head ∨ body_i, for each body literal.
        for literal in &clause.body {
            out.push(FolClause::new(f64::INFINITY, vec![head.negate(), literal.clone()]));
        }
    }

    out
}

fn substitute_equivalence(kb: Kb, predicate: &str, disjuncts: &[FolLiteral]) -> Result<Kb, ErrorKind> {
    let Some(arity) = disjuncts.first().map(|l| l.args.len()) else {
        return Err(ErrorKind::Contradiction(0));
    };

    let mut result = Vec::with_capacity(kb.len());
    for clause in kb {
        if clause.literals.iter().any(|l| l.predicate == predicate) {
            let mut rewritten = Vec::new();
            for literal in &clause.literals {
                if literal.predicate == predicate {
                    if literal.args.len() != arity {
                        return Err(ErrorKind::Contradiction(0));
                    }
                    rewritten.extend(disjuncts.iter().cloned());
                } else {
                    rewritten.push(literal.clone());
                }
            }
            result.push(FolClause::new(clause.weight, rewritten));
        } else {
            result.push(clause);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(name: &str, polarity: bool) -> FolLiteral {
        lit_arg(name, "c", polarity)
    }

    fn lit_arg(name: &str, arg: &str, polarity: bool) -> FolLiteral {
        FolLiteral::new(name, vec![Term::Const(arg.to_string())], polarity)
    }

    #[test]
    fn standard_mode_emits_both_directions_of_the_equivalence() {
        let clauses = vec![
            DefiniteClause {
                head: lit("flies", true),
                body: vec![lit("bird", true)],
            },
            DefiniteClause {
                head: lit("flies", true),
                body: vec![lit("plane", true)],
            },
        ];
        let completed = complete(clauses, vec![], CompletionMode::Standard).unwrap();
        // 1 forward (head -> bird v plane) + 2 backward (bird -> head, plane -> head)
        assert_eq!(completed.len(), 3);
        assert_eq!(completed[0].literals.len(), 3);
        assert!(completed[1].literals.len() == 2 && completed[2].literals.len() == 2);
    }

    #[test]
    fn standard_mode_reifies_multi_literal_bodies() {
        let clauses = vec![DefiniteClause {
            head: lit("flies", true),
            body: vec![lit("bird", true), lit("healthy", true)],
        }];
        let completed = complete(clauses, vec![], CompletionMode::Standard).unwrap();
        // forward (head -> aux), aux -> bird, aux -> healthy, (bird ^ healthy) -> aux, aux -> head
        assert_eq!(completed.len(), 5);
        let aux_predicate = &completed[0].literals[1].predicate;
        assert!(aux_predicate.starts_with(AUX_PREDICATE_PREFIX));
    }

    #[test]
    fn decomposed_mode_emits_both_directions() {
        let clauses = vec![DefiniteClause {
            head: lit("flies", true),
            body: vec![lit("bird", true), lit("healthy", true)],
        }];
        let completed = complete(clauses, vec![], CompletionMode::Decomposed).unwrap();
        // 1 forward (body -> head) + 2 backward (head -> each conjunct)
        assert_eq!(completed.len(), 3);
    }

    #[test]
    fn decomposed_mode_asserts_closed_world_groundings_false() {
        let clauses = vec![DefiniteClause {
            head: lit("flies", true),
            body: vec![lit("bird", true)],
        }];
        // "flies(d)" occurs in the background kb but no body covers grounding "d".
        let kb = vec![FolClause::new(1.0, vec![lit_arg("flies", "d", true)])];
        let completed = complete(clauses, kb, CompletionMode::Decomposed).unwrap();
        let closed_world = completed
            .iter()
            .find(|c| c.literals.len() == 1 && !c.literals[0].polarity && c.literals[0].predicate == "flies");
        assert!(closed_world.is_some());
    }

    #[test]
    fn simplification_mode_rewrites_the_head_out_of_the_kb() {
        let clauses = vec![DefiniteClause {
            head: lit("flies", true),
            body: vec![lit("bird", true)],
        }];
        let kb = vec![FolClause::new(1.0, vec![lit("flies", true), lit("happy", true)])];
        let completed = complete(clauses, kb, CompletionMode::Simplification).unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed[0].literals.iter().all(|l| l.predicate != "flies"));
    }
}
