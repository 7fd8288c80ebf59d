//! Forward-scanning SQL rule extractor.
//!
//! One pass over the token stream with a frame stack (see [`super::frames`]).
//! Tokens are recorded against every open frame; only the top frame reacts
//! to terminators. A construct becomes a rule when its terminating keyword
//! arrives; branches still open at end of input are emitted as truncated.
//! An unmatched block terminator stops the file with `UnmatchedTerminator`,
//! keeping every rule closed before it.

use std::ops::Range;
use std::path::PathBuf;

use rulemine_core::errors::ParseError;
use rulemine_core::model::{Construct, Rule};
use rulemine_core::types::collections::BTreeSet;

use super::clauses::{
    column_name_before, create_header, ident_name, is_procedural_if, tables_after, CreateHeader,
};
use super::draft::{Draft, DraftBuilder, TriggerScope};
use super::frames::{state_of, Frame, FrameKind, Phase};
use super::keywords::{END_QUALIFIERS, PREDICATE_TERMINATORS, TRANSACTION_WORDS};
use super::lexer::{tokenize, Token, TokenKind};
use crate::extraction::context::{ExtractionContext, FileExtraction};

/// Extract every rule from `sql`, interpreting lines through `ctx`.
pub fn extract_sql(sql: &str, ctx: &ExtractionContext<'_>) -> FileExtraction {
    let toks = tokenize(sql);
    let mut engine = Engine::new(sql, &toks, ctx);
    let error = engine.run();
    let rules = engine.into_rules();
    tracing::debug!(
        file = ctx.file_path,
        line_offset = ctx.line_offset,
        rules = rules.len(),
        failed = error.is_some(),
        "sql extraction finished"
    );
    FileExtraction {
        rules,
        errors: error.into_iter().collect(),
    }
}

enum Step {
    /// Consume this token plus `n` following ones.
    Advance(usize),
    /// A frame was closed; feed the same token again.
    Reprocess,
}

#[derive(Debug)]
struct ActiveTrigger {
    scope: TriggerScope,
    /// Still before the trigger body (WHEN clause allowed).
    header: bool,
    declare: bool,
    body_seen: bool,
}

#[derive(Debug)]
struct ActiveRoutine {
    name: String,
    declare: bool,
    body_seen: bool,
}

struct Engine<'a> {
    src: &'a str,
    toks: &'a [Token],
    ctx: &'a ExtractionContext<'a>,
    stack: Vec<Frame>,
    depth: i32,
    /// Open dollar-quote tag and the stack height when it opened.
    dollar: Option<(String, usize)>,
    stmt_tables: BTreeSet<String>,
    stmt_drafts: Vec<usize>,
    stmt_dml: bool,
    drafts: Vec<Draft>,
    trigger: Option<ActiveTrigger>,
    routine: Option<ActiveRoutine>,
    /// `EXECUTE FUNCTION f` links from trigger declarations.
    linked: Vec<(String, TriggerScope)>,
    trigger_routines: Vec<String>,
    pending_while: bool,
}

impl<'a> Engine<'a> {
    fn new(src: &'a str, toks: &'a [Token], ctx: &'a ExtractionContext<'a>) -> Self {
        Self {
            src,
            toks,
            ctx,
            stack: Vec::new(),
            depth: 0,
            dollar: None,
            stmt_tables: BTreeSet::new(),
            stmt_drafts: Vec::new(),
            stmt_dml: false,
            drafts: Vec::new(),
            trigger: None,
            routine: None,
            linked: Vec::new(),
            trigger_routines: Vec::new(),
            pending_while: false,
        }
    }

    fn run(&mut self) -> Option<ParseError> {
        let mut i = 0;
        let mut error = None;
        while i < self.toks.len() {
            match self.step(i) {
                Ok(Step::Advance(extra)) => {
                    let last = (i + extra).min(self.toks.len() - 1);
                    for frame in &mut self.stack {
                        frame.last_tok = Some(last);
                    }
                    i = last + 1;
                }
                Ok(Step::Reprocess) => {}
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }
        }
        if error.is_none() {
            self.flush(0, self.toks.len());
        }
        self.end_statement();
        error
    }

    fn into_rules(mut self) -> Vec<Rule> {
        self.link_trigger_routines();
        let builder = DraftBuilder {
            toks: self.toks,
            src: self.src,
            ctx: self.ctx,
        };
        self.drafts.iter().map(|d| builder.build(d)).collect()
    }

    fn line(&self, i: usize) -> u32 {
        self.toks.get(i).map_or(1, |t| t.line)
    }

    fn unmatched(&self, i: usize, terminator: &str) -> ParseError {
        ParseError::UnmatchedTerminator {
            path: PathBuf::from(self.ctx.file_path),
            line: self.ctx.host_line(self.line(i)),
            terminator: terminator.to_string(),
        }
    }

    fn step(&mut self, i: usize) -> Result<Step, ParseError> {
        let tok = &self.toks[i];
        tracing::trace!(i, line = tok.line, state = ?state_of(&self.stack), "token");
        match tok.kind {
            TokenKind::DollarQuote => Ok(self.on_dollar(i)),
            TokenKind::LParen => {
                self.depth += 1;
                Ok(Step::Advance(0))
            }
            TokenKind::RParen => Ok(self.on_rparen(i)),
            TokenKind::Semicolon => Ok(self.on_semicolon(i)),
            TokenKind::Word => {
                if let Some(top) = self.stack.last() {
                    if matches!(top.kind, FrameKind::Predicate(_))
                        && top.depth == self.depth
                        && PREDICATE_TERMINATORS.contains(&tok.upper.as_str())
                    {
                        self.close_predicate(i);
                        return Ok(Step::Reprocess);
                    }
                }
                self.on_word(i)
            }
            _ => Ok(Step::Advance(0)),
        }
    }

    fn on_rparen(&mut self, i: usize) -> Step {
        if let Some(top) = self.stack.last() {
            if top.depth == self.depth {
                match top.kind {
                    FrameKind::Predicate(_) => {
                        self.close_predicate(i);
                        return Step::Reprocess;
                    }
                    FrameKind::Paren { .. } => {
                        self.close_paren(i, false);
                        self.depth -= 1;
                        return Step::Advance(0);
                    }
                    _ => {}
                }
            }
        }
        self.depth = (self.depth - 1).max(0);
        Step::Advance(0)
    }

    fn on_semicolon(&mut self, i: usize) -> Step {
        if let Some(top) = self.stack.last() {
            match top.kind {
                FrameKind::Predicate(_) => {
                    self.close_predicate(i);
                    return Step::Reprocess;
                }
                FrameKind::Paren { .. } => {
                    self.close_paren(i, true);
                    return Step::Reprocess;
                }
                _ => {}
            }
        }
        self.end_statement();
        self.depth = 0;
        if self.stack.is_empty() && self.dollar.is_none() {
            self.end_scopes_at_semicolon();
        }
        Step::Advance(0)
    }

    fn on_word(&mut self, i: usize) -> Result<Step, ParseError> {
        let upper = self.toks[i].upper.as_str();
        let next = self.toks.get(i + 1);
        let step = match upper {
            "CREATE" => self.on_create(i),
            // `IS DISTINCT FROM` compares values; it names no table.
            "FROM" if i > 0 && self.toks[i - 1].is_word("DISTINCT") => Step::Advance(0),
            "FROM" | "JOIN" | "UPDATE" | "INTO" | "TABLE" => {
                if upper != "TABLE" {
                    self.stmt_dml = true;
                }
                self.note_tables(i);
                Step::Advance(0)
            }
            "SELECT" | "INSERT" | "DELETE" | "MERGE" => {
                self.stmt_dml = true;
                Step::Advance(0)
            }
            "WHERE" => self.open(i, FrameKind::Predicate(Construct::Where), Phase::Condition),
            "HAVING" => self.open(i, FrameKind::Predicate(Construct::Having), Phase::Condition),
            "CHECK" if next.map(|t| t.kind) == Some(TokenKind::LParen) => {
                let named = i >= 2 && self.toks[i - 2].is_word("CONSTRAINT");
                let label = if named {
                    ident_name(&self.toks[i - 1], self.src)
                } else {
                    None
                };
                let start = if named { i - 2 } else { i };
                self.open_paren(i, start, Construct::Check, label, i + 2)
            }
            "GENERATED"
                if next.is_some_and(|t| t.is_word("ALWAYS"))
                    && self.toks.get(i + 2).is_some_and(|t| t.is_word("AS"))
                    && self.toks.get(i + 3).map(|t| t.kind) == Some(TokenKind::LParen) =>
            {
                let label = column_name_before(self.toks, self.src, i);
                self.open_paren(i, i, Construct::GeneratedColumn, label, i + 4)
            }
            "CASE" => self.open(
                i,
                FrameKind::Case {
                    operand: None,
                    conditions: Vec::new(),
                },
                Phase::Condition,
            ),
            "WHEN" => self.on_when(i),
            "THEN" => {
                if let Some(top) = self.stack.last_mut() {
                    if top.is_branch() && top.phase == Phase::Condition {
                        top.enter_body(i);
                    }
                }
                Step::Advance(0)
            }
            "IF" if is_procedural_if(self.toks, i) => {
                self.open(i, FrameKind::If { conditions: Vec::new() }, Phase::Body);
                self.open(i, FrameKind::IfBranch(Construct::If), Phase::Condition)
            }
            "ELSIF" | "ELSEIF" => {
                if !matches!(self.stack.last().map(|f| &f.kind), Some(FrameKind::IfBranch(_))) {
                    return Err(self.unmatched(i, upper));
                }
                self.close_branch(false);
                self.open(i, FrameKind::IfBranch(Construct::Elsif), Phase::Condition)
            }
            "ELSE" => self.on_else(i),
            "END" => return self.on_end(i),
            "BEGIN" => self.on_begin(i),
            "LOOP" => {
                self.pending_while = false;
                self.open(i, FrameKind::Block { looping: true }, Phase::Body)
            }
            "REPEAT" => self.open(i, FrameKind::Block { looping: true }, Phase::Body),
            "WHILE" => {
                self.pending_while = true;
                Step::Advance(0)
            }
            "DO" if self.pending_while => {
                self.pending_while = false;
                self.open(i, FrameKind::Block { looping: true }, Phase::Body)
            }
            "DECLARE" if self.stack.is_empty() => {
                if let Some(ref mut t) = self.trigger {
                    t.declare = true;
                    t.header = false;
                }
                if let Some(ref mut r) = self.routine {
                    r.declare = true;
                }
                Step::Advance(0)
            }
            "EXECUTE" => {
                if let Some(ref mut t) = self.trigger {
                    t.header = false;
                }
                Step::Advance(0)
            }
            _ => Step::Advance(0),
        };
        Ok(step)
    }

    fn open(&mut self, i: usize, kind: FrameKind, phase: Phase) -> Step {
        let frame = Frame::new(kind, phase, i, self.line(i), self.depth);
        self.stack.push(frame);
        Step::Advance(0)
    }

    fn open_paren(
        &mut self,
        i: usize,
        start_tok: usize,
        construct: Construct,
        label: Option<String>,
        cond_start: usize,
    ) -> Step {
        let mut frame = Frame::new(
            FrameKind::Paren { construct, label },
            Phase::Condition,
            i,
            self.line(start_tok),
            self.depth + 1,
        );
        frame.cond_start = cond_start;
        self.stack.push(frame);
        Step::Advance(0)
    }

    fn on_create(&mut self, i: usize) -> Step {
        if !self.stack.is_empty() {
            return Step::Advance(0);
        }
        if self.dollar.is_none() {
            self.trigger = None;
            self.routine = None;
        }
        match create_header(self.toks, self.src, i) {
            CreateHeader::Trigger(h) => {
                let scope = TriggerScope {
                    name: h.name,
                    timing: h.timing,
                    table: h.table,
                };
                if let Some(ref table) = scope.table {
                    self.stmt_tables.insert(table.clone());
                }
                if let Some(function) = h.function {
                    self.linked.push((function, scope.clone()));
                }
                self.trigger = Some(ActiveTrigger {
                    scope,
                    header: true,
                    declare: false,
                    body_seen: false,
                });
            }
            CreateHeader::Routine(r) => {
                if r.returns_trigger {
                    self.trigger_routines.push(r.name.clone());
                }
                self.routine = Some(ActiveRoutine {
                    name: r.name,
                    declare: false,
                    body_seen: false,
                });
            }
            CreateHeader::Package(p) => {
                tracing::trace!(package = %p.name, line = self.line(i), "package block");
                self.open(p.opens_at, FrameKind::Block { looping: false }, Phase::Body);
                return Step::Advance(p.opens_at - i);
            }
            CreateHeader::Table(_) | CreateHeader::Other => {}
        }
        Step::Advance(0)
    }

    fn on_when(&mut self, i: usize) -> Step {
        match self.stack.last().map(|f| &f.kind) {
            Some(FrameKind::Case { .. }) => {
                self.capture_case_operand(i);
                self.open(i, FrameKind::CaseBranch(Construct::CaseWhen), Phase::Condition)
            }
            Some(FrameKind::CaseBranch(_)) => {
                self.close_branch(false);
                self.open(i, FrameKind::CaseBranch(Construct::CaseWhen), Phase::Condition)
            }
            _ => {
                let header = self.trigger.as_ref().is_some_and(|t| t.header);
                let paren_next = self.toks.get(i + 1).map(|t| t.kind) == Some(TokenKind::LParen);
                if header && paren_next {
                    self.open_paren(i, i, Construct::TriggerWhen, None, i + 2)
                } else {
                    Step::Advance(0)
                }
            }
        }
    }

    fn on_else(&mut self, i: usize) -> Step {
        match self.stack.last().map(|f| &f.kind) {
            Some(FrameKind::Case { .. }) => {
                self.capture_case_operand(i);
                self.open(i, FrameKind::CaseBranch(Construct::CaseElse), Phase::Body)
            }
            Some(FrameKind::CaseBranch(_)) => {
                self.close_branch(false);
                self.open(i, FrameKind::CaseBranch(Construct::CaseElse), Phase::Body)
            }
            Some(FrameKind::IfBranch(_)) => {
                self.close_branch(false);
                self.open(i, FrameKind::IfBranch(Construct::Else), Phase::Body)
            }
            _ => {
                tracing::trace!(line = self.line(i), "ELSE outside CASE/IF ignored");
                Step::Advance(0)
            }
        }
    }

    fn on_end(&mut self, i: usize) -> Result<Step, ParseError> {
        let qualifier = self
            .toks
            .get(i + 1)
            .filter(|t| t.kind == TokenKind::Word && END_QUALIFIERS.contains(&t.upper.as_str()))
            .map(|t| t.upper.clone());
        let top = self.stack.last().map(|f| &f.kind);
        match qualifier.as_deref() {
            Some("IF") => {
                if !matches!(top, Some(FrameKind::IfBranch(_))) {
                    return Err(self.unmatched(i, "END IF"));
                }
                self.close_branch(false);
                if matches!(self.stack.last().map(|f| &f.kind), Some(FrameKind::If { .. })) {
                    self.stack.pop();
                }
                Ok(Step::Advance(1))
            }
            Some("CASE") => {
                if !matches!(top, Some(FrameKind::Case { .. } | FrameKind::CaseBranch(_))) {
                    return Err(self.unmatched(i, "END CASE"));
                }
                self.close_case();
                Ok(Step::Advance(1))
            }
            Some(q @ ("LOOP" | "WHILE" | "REPEAT" | "FOR")) => {
                if !matches!(top, Some(FrameKind::Block { looping: true })) {
                    return Err(self.unmatched(i, &format!("END {q}")));
                }
                self.stack.pop();
                Ok(Step::Advance(1))
            }
            Some(q) => {
                if !matches!(top, Some(FrameKind::Block { .. })) {
                    return Err(self.unmatched(i, &format!("END {q}")));
                }
                self.stack.pop();
                Ok(Step::Advance(1))
            }
            None => match top {
                Some(FrameKind::Case { .. } | FrameKind::CaseBranch(_)) => {
                    self.close_case();
                    Ok(Step::Advance(0))
                }
                Some(FrameKind::Block { looping: false }) => {
                    self.stack.pop();
                    Ok(Step::Advance(0))
                }
                _ => Err(self.unmatched(i, "END")),
            },
        }
    }

    fn on_begin(&mut self, i: usize) -> Step {
        let next = self.toks.get(i + 1);
        let is_transaction = next.map_or(true, |t| {
            t.kind == TokenKind::Semicolon || t.is_any_word(TRANSACTION_WORDS)
        });
        if is_transaction {
            return Step::Advance(0);
        }
        if self.stack.is_empty() {
            self.mark_body_seen();
        }
        self.open(i, FrameKind::Block { looping: false }, Phase::Body);
        if next.is_some_and(|t| t.is_any_word(&["TRY", "CATCH"])) {
            Step::Advance(1)
        } else {
            Step::Advance(0)
        }
    }

    fn on_dollar(&mut self, i: usize) -> Step {
        let tag = self.toks[i].text(self.src).to_string();
        match self.dollar.take() {
            None => {
                self.dollar = Some((tag, self.stack.len()));
                self.mark_body_seen();
            }
            Some((open, base)) if open == tag => {
                // Anything still open inside the quoted body ends with it.
                self.flush(base, i);
            }
            Some(other) => self.dollar = Some(other),
        }
        Step::Advance(0)
    }

    fn mark_body_seen(&mut self) {
        if let Some(ref mut t) = self.trigger {
            t.body_seen = true;
            t.header = false;
        }
        if let Some(ref mut r) = self.routine {
            r.body_seen = true;
        }
    }

    fn end_scopes_at_semicolon(&mut self) {
        if self
            .trigger
            .as_ref()
            .is_some_and(|t| !(t.declare && !t.body_seen))
        {
            self.trigger = None;
        }
        if self.routine.as_ref().is_some_and(|r| r.body_seen) {
            self.routine = None;
        }
    }

    fn capture_case_operand(&mut self, i: usize) {
        if let Some(Frame {
            kind: FrameKind::Case { operand, conditions },
            cond_start,
            ..
        }) = self.stack.last_mut()
        {
            if operand.is_none() && conditions.is_empty() && *cond_start < i {
                *operand = Some(*cond_start..i);
            }
        }
    }

    fn note_tables(&mut self, i: usize) {
        for table in tables_after(self.toks, self.src, i) {
            for frame in &mut self.stack {
                frame.tables.insert(table.clone());
            }
            self.stmt_tables.insert(table);
        }
    }

    fn end_statement(&mut self) {
        for &idx in &self.stmt_drafts {
            if let Some(draft) = self.drafts.get_mut(idx) {
                draft.tables.extend(self.stmt_tables.iter().cloned());
            }
        }
        self.stmt_drafts.clear();
        self.stmt_tables.clear();
        self.stmt_dml = false;
    }

    fn push_draft(&mut self, mut draft: Draft) {
        draft.trigger = self.trigger.as_ref().map(|t| t.scope.clone());
        draft.routine = self.routine.as_ref().map(|r| r.name.clone());
        self.stmt_drafts.push(self.drafts.len());
        self.drafts.push(draft);
    }

    fn end_line_of(&self, frame: &Frame) -> u32 {
        let last = frame.last_tok.unwrap_or(frame.start_tok);
        self.toks
            .get(last)
            .map_or(frame.start_line, |t| t.end_line)
            .max(frame.start_line)
    }

    /// Close the top frame, which must be a branch.
    fn close_branch(&mut self, truncated: bool) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let construct = match frame.kind {
            FrameKind::CaseBranch(c) | FrameKind::IfBranch(c) => c,
            _ => {
                self.stack.push(frame);
                return;
            }
        };
        let last = frame.last_tok.unwrap_or(frame.start_tok);
        let condition = (!construct.is_fallthrough())
            .then(|| frame.cond_start..frame.cond_end.unwrap_or(last + 1));
        let body = frame.body_start.map(|b| b..(last + 1).max(b));

        let (operand, siblings) = match self.stack.last_mut().map(|f| &mut f.kind) {
            Some(FrameKind::Case {
                operand,
                conditions,
            }) => {
                let prior = conditions.clone();
                if let Some(ref c) = condition {
                    conditions.push(c.clone());
                }
                (operand.clone(), prior)
            }
            Some(FrameKind::If { conditions }) => {
                let prior = conditions.clone();
                if let Some(ref c) = condition {
                    conditions.push(c.clone());
                }
                (None, prior)
            }
            _ => (None, Vec::new()),
        };

        let procedural = match construct {
            Construct::If | Construct::Elsif | Construct::Else => true,
            _ => self.routine.is_some() && !self.stmt_dml,
        };
        let mut draft = Draft::new(construct, frame.start_line, self.end_line_of(&frame));
        draft.condition = condition;
        draft.operand = operand;
        draft.siblings = if construct.is_fallthrough() {
            siblings
        } else {
            Vec::new()
        };
        draft.body = body;
        draft.truncated = truncated;
        draft.tables = frame.tables;
        draft.procedural = procedural;
        self.push_draft(draft);
    }

    fn close_case(&mut self) {
        if matches!(self.stack.last().map(|f| &f.kind), Some(FrameKind::CaseBranch(_))) {
            self.close_branch(false);
        }
        if matches!(self.stack.last().map(|f| &f.kind), Some(FrameKind::Case { .. })) {
            self.stack.pop();
        }
    }

    /// Close the top predicate at token `end` (exclusive), one rule per
    /// top-level conjunct.
    fn close_predicate(&mut self, end: usize) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let FrameKind::Predicate(construct) = frame.kind else {
            self.stack.push(frame);
            return;
        };
        for part in split_conjuncts(self.toks, frame.cond_start..end) {
            let first = &self.toks[part.start];
            let last = &self.toks[part.end - 1];
            let mut draft = Draft::new(construct, first.line, last.end_line);
            draft.condition = Some(part);
            draft.tables = frame.tables.clone();
            self.push_draft(draft);
        }
    }

    /// Close the top paren-bounded clause; its condition ends at `end`.
    fn close_paren(&mut self, end: usize, truncated: bool) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let (construct, label) = match frame.kind {
            FrameKind::Paren {
                construct,
                ref label,
            } => (construct, label.clone()),
            _ => {
                self.stack.push(frame);
                return;
            }
        };
        if frame.cond_start >= end {
            return;
        }
        let end_line = self.toks[end - 1].end_line.max(frame.start_line);
        let mut draft = Draft::new(construct, frame.start_line, end_line);
        draft.condition = Some(frame.cond_start..end);
        draft.label = label;
        draft.truncated = truncated;
        draft.tables = frame.tables;
        self.push_draft(draft);
    }

    /// Close every frame above `base`: clauses normally, branches as
    /// truncated, containers silently.
    fn flush(&mut self, base: usize, end: usize) {
        while self.stack.len() > base {
            let Some(top) = self.stack.last() else {
                break;
            };
            match top.kind {
                FrameKind::Predicate(_) => self.close_predicate(end),
                FrameKind::Paren { .. } => self.close_paren(end, true),
                FrameKind::CaseBranch(_) | FrameKind::IfBranch(_) => self.close_branch(true),
                _ => {
                    self.stack.pop();
                }
            }
        }
    }

    /// Attach trigger information to rules found in trigger functions.
    fn link_trigger_routines(&mut self) {
        for draft in &mut self.drafts {
            if draft.trigger.is_some() {
                continue;
            }
            let Some(ref routine) = draft.routine else {
                continue;
            };
            let linked = self
                .linked
                .iter()
                .find(|(function, _)| same_routine(function, routine))
                .map(|(_, scope)| scope.clone());
            draft.trigger = linked.or_else(|| {
                self.trigger_routines
                    .iter()
                    .any(|r| same_routine(r, routine))
                    .then(|| TriggerScope {
                        name: routine.clone(),
                        timing: None,
                        table: None,
                    })
            });
        }
    }
}

fn same_routine(a: &str, b: &str) -> bool {
    let last = |s: &str| s.rsplit('.').next().unwrap_or(s).to_string();
    a == b || last(a) == last(b)
}

/// Split a predicate into top-level AND conjuncts. The AND of
/// `BETWEEN x AND y` and ANDs inside parentheses or CASE stay put.
fn split_conjuncts(toks: &[Token], range: Range<usize>) -> Vec<Range<usize>> {
    let end = range.end.min(toks.len());
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut case_depth = 0i32;
    let mut between = false;
    let mut seg_start = range.start;
    for k in range.start..end {
        let tok = &toks[k];
        match tok.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth -= 1,
            TokenKind::Word if depth == 0 => match tok.upper.as_str() {
                "CASE" => case_depth += 1,
                "END" if case_depth > 0 => case_depth -= 1,
                "BETWEEN" if case_depth == 0 => between = true,
                "AND" if case_depth == 0 => {
                    if between {
                        between = false;
                    } else {
                        parts.push(seg_start..k);
                        seg_start = k + 1;
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
    parts.push(seg_start..end);
    parts.retain(|p| p.start < p.end);
    parts
}
