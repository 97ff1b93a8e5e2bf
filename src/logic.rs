use itertools::Itertools;
use varisat::Lit;

fn guarded(guard: Option<Lit>, body: impl IntoIterator<Item = Lit>) -> Vec<Lit> {
    guard.map(|g| !g).into_iter().chain(body).collect_vec()
}

/// No `n + 1` of `lits` hold together; (!A + !B + !C) * (!A + !B + !D) * ... for `n` = 2.
///
/// With a `guard`, every clause is prefixed with its negation so the constraint only binds when the guard holds.
pub(crate) fn at_most(n: usize, lits: &[Lit], guard: Option<Lit>) -> Vec<Vec<Lit>> {
    lits.iter()
        .combinations(n + 1)
        .map(|subset| guarded(guard, subset.into_iter().map(|lit| !*lit)))
        .collect_vec()
}

/// At least `n` of `lits` hold; equivalently, every selection of `len - n + 1` contains a true literal.
///
/// Fewer than `n` literals can never satisfy this, so the result is the bare guard clause, which is empty if unguarded.
pub(crate) fn at_least(n: usize, lits: &[Lit], guard: Option<Lit>) -> Vec<Vec<Lit>> {
    if n == 0 {
        return Vec::new();
    }

    if lits.len() < n {
        return vec![guarded(guard, [])];
    }

    lits.iter()
        .combinations(lits.len() - n + 1)
        .map(|subset| guarded(guard, subset.into_iter().copied()))
        .collect_vec()
}

/// Exactly `n` of `lits` hold, if `guard` does (or unconditionally when there is no guard).
pub(crate) fn exactly(n: usize, lits: &[Lit], guard: Option<Lit>) -> Vec<Vec<Lit>> {
    let mut clauses = at_most(n, lits, guard);
    clauses.extend(at_least(n, lits, guard));
    clauses
}

pub(crate) fn exactly_one(lits: &[Lit]) -> Vec<Vec<Lit>> {
    exactly(1, lits, None)
}
