//! Scan-state frames for the SQL extractor.
//!
//! The extractor's state (SCANNING, IN_CONDITION, IN_BODY) is derived from
//! the top of a frame stack: an empty stack is SCANNING, otherwise the top
//! frame's phase decides. Nesting is just more frames.

use std::ops::Range;

use rulemine_core::model::Construct;
use rulemine_core::types::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    InCondition,
    InBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Condition,
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameKind {
    /// `CASE [operand]`; collects its branches' conditions.
    Case {
        operand: Option<Range<usize>>,
        conditions: Vec<Range<usize>>,
    },
    CaseBranch(Construct),
    /// Procedural `IF ... END IF`; collects its branches' conditions.
    If { conditions: Vec<Range<usize>> },
    IfBranch(Construct),
    /// `BEGIN ... END` (`looping == false`) or `LOOP ... END LOOP`.
    Block { looping: bool },
    /// WHERE / HAVING, closed by a clause keyword or `;` at its depth.
    Predicate(Construct),
    /// `CHECK (...)`, `GENERATED ALWAYS AS (...)`, trigger `WHEN (...)`:
    /// closed by the matching `)`.
    Paren {
        construct: Construct,
        /// Constraint name or generated column.
        label: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub kind: FrameKind,
    pub phase: Phase,
    /// Token that opened the frame.
    pub start_tok: usize,
    pub start_line: u32,
    /// Parenthesis depth the frame belongs to.
    pub depth: i32,
    /// First token of the condition (or of the body for ELSE branches).
    pub cond_start: usize,
    /// Exclusive end of the condition, once THEN was seen.
    pub cond_end: Option<usize>,
    pub body_start: Option<usize>,
    /// Last token consumed while this frame was open.
    pub last_tok: Option<usize>,
    /// Tables referenced while this frame was open.
    pub tables: BTreeSet<String>,
}

impl Frame {
    pub fn new(kind: FrameKind, phase: Phase, start_tok: usize, start_line: u32, depth: i32) -> Self {
        Self {
            kind,
            phase,
            start_tok,
            start_line,
            depth,
            cond_start: start_tok + 1,
            cond_end: None,
            body_start: if phase == Phase::Body {
                Some(start_tok + 1)
            } else {
                None
            },
            last_tok: None,
            tables: BTreeSet::new(),
        }
    }

    pub fn enter_body(&mut self, then_tok: usize) {
        self.phase = Phase::Body;
        self.cond_end = Some(then_tok);
        self.body_start = Some(then_tok + 1);
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, FrameKind::CaseBranch(_) | FrameKind::IfBranch(_))
    }
}

pub fn state_of(stack: &[Frame]) -> ScanState {
    match stack.last() {
        None => ScanState::Scanning,
        Some(f) if f.phase == Phase::Condition => ScanState::InCondition,
        Some(_) => ScanState::InBody,
    }
}
