//! Jump table pairing every `[` with its `]`.

/// Matching bracket positions for a program, computed once before execution.
///
/// `partner(i)` holds the matching index for a `[` or `]` at `i`; every
/// other position has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopMap {
    jumps: Vec<Option<usize>>,
}

impl LoopMap {
    /// Resolve brackets with a stack of pending `[` positions.
    ///
    /// Input is expected to have passed [`crate::syntax::check`]. A bracket
    /// left unmatched anyway simply gets no partner.
    pub fn build(program: &[u8]) -> Self {
        let mut jumps: Vec<Option<usize>> = vec![None; program.len()];
        let mut stack: Vec<usize> = Vec::new();

        for (i, &b) in program.iter().enumerate() {
            match b {
                b'[' => stack.push(i),
                b']' => {
                    if let Some(open) = stack.pop() {
                        jumps[open] = Some(i);
                        jumps[i] = Some(open);
                    }
                }
                _ => {}
            }
        }

        Self { jumps }
    }

    pub fn partner(&self, ip: usize) -> Option<usize> {
        self.jumps.get(ip).copied().flatten()
    }

    /// `(open, close)` pairs ordered by the open index.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.jumps
            .iter()
            .enumerate()
            .filter_map(|(i, &j)| j.filter(|&j| j > i).map(|j| (i, j)))
    }
}
