//! Permutations of tile indices: validation, composition and minimum swap counts.
//!
//! A permutation entry is read as "the source index for this slot": applying `perm` to `state`
//! yields `next[i] = state[perm[i]]`. Scrambles are built by applying such steps in order,
//! starting from the identity.

use crate::error::{PermutationDefect, PermutationError};

/// A validated bijection of `0..n`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// The permutation that exchanges slots `a` and `b` and fixes everything else.
    pub fn transposition(total: usize, a: usize, b: usize) -> Option<Self> {
        if a >= total || b >= total {
            return None;
        }
        let mut values = identity(total);
        values.swap(a, b);
        Some(Self(values))
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

pub fn identity(total: usize) -> Vec<usize> {
    (0..total).collect()
}

/// Checks that `values` has exactly `total` entries, each in `0..total`, none repeated.
pub fn validate(values: &[i64], total: usize) -> Result<Vec<usize>, PermutationError> {
    let invalid = |reason| PermutationError::InvalidPermutation { reason };

    if values.len() != total {
        return Err(invalid(PermutationDefect::WrongLength {
            expected: total,
            actual: values.len(),
        }));
    }

    let mut covered = vec![false; total];
    let mut out = Vec::with_capacity(total);
    for (index, &value) in values.iter().enumerate() {
        let slot = usize::try_from(value)
            .ok()
            .filter(|&v| v < total)
            .ok_or(invalid(PermutationDefect::OutOfRange {
                index,
                value,
                total,
            }))?;
        if std::mem::replace(&mut covered[slot], true) {
            return Err(invalid(PermutationDefect::Duplicate { value: slot }));
        }
        out.push(slot);
    }
    Ok(out)
}

/// `next[i] = state[permutation[i]]`.
///
/// `permutation` must be a valid permutation of `0..state.len()`.
pub fn apply_permutation<T: Clone>(state: &[T], permutation: &[usize]) -> Vec<T> {
    permutation.iter().map(|&src| state[src].clone()).collect()
}

/// Applies `steps` in order, starting from the identity of length `total`.
pub fn compose<'a, I>(total: usize, steps: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a Permutation>,
{
    steps
        .into_iter()
        .fold(identity(total), |state, step| apply_permutation(&state, step.as_slice()))
}

/// Exchanges the entries of `start` pair by pair, in order.
///
/// Returns the first pair that falls outside `0..start.len()`.
pub fn scramble_by_swaps<T: Clone>(
    start: &[T],
    swaps: &[(usize, usize)],
) -> Result<Vec<T>, (usize, usize)> {
    let total = start.len();
    let steps = swaps
        .iter()
        .map(|&(a, b)| Permutation::transposition(total, a, b).ok_or((a, b)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(apply_permutation(start, &compose(total, &steps)))
}

/// Expresses each scrambled piece as the target slot it belongs in.
///
/// Both inputs must be permutations of the same piece ids. Entries of `scrambled` missing from
/// `target` map to themselves.
pub fn arrangement_relative_to(scrambled: &[usize], target: &[usize]) -> Vec<usize> {
    let mut slot_of = vec![usize::MAX; target.len()];
    for (slot, &piece) in target.iter().enumerate() {
        if let Some(entry) = slot_of.get_mut(piece) {
            *entry = slot;
        }
    }
    scrambled
        .iter()
        .enumerate()
        .map(|(i, &piece)| match slot_of.get(piece) {
            Some(&slot) if slot != usize::MAX => slot,
            _ => i,
        })
        .collect()
}

/// Sum of `(cycle length - 1)` over the cycles of `arrangement`.
///
/// This is exact: every swap can merge or split at most one cycle.
pub fn compute_minimum_swap_count(arrangement: &[usize]) -> usize {
    let mut visited = vec![false; arrangement.len()];
    let mut swaps = 0;
    for start in 0..arrangement.len() {
        if visited[start] {
            continue;
        }
        let mut len = 0usize;
        let mut at = start;
        while let Some(seen) = visited.get_mut(at) {
            if *seen {
                break;
            }
            *seen = true;
            len += 1;
            at = arrangement[at];
        }
        swaps += len.saturating_sub(1);
    }
    swaps
}
