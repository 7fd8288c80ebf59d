//! Cross-checks a document's traceability claims against the live tree.
//!
//! Read-only: the document and the repository are never modified. Each
//! `trace:source` element becomes one [`Finding`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use rulemine_core::constants::{DEFAULT_TRACE_NAMESPACE, DMN_NAMESPACE};
use rulemine_core::errors::ValidationError;
use rulemine_core::model::line_slice;

use crate::report::{Finding, FindingStatus, ValidationReport};

/// One `trace:source` claim read from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceReference {
    pub rule_id: String,
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub snippet: Option<String>,
}

pub struct TraceValidator {
    repo_root: PathBuf,
    namespace: String,
}

impl TraceValidator {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            namespace: DEFAULT_TRACE_NAMESPACE.to_string(),
        }
    }

    /// Namespace the traceability elements were written under.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn validate_file(&self, document: &Path) -> Result<ValidationReport, ValidationError> {
        let xml = fs::read_to_string(document).map_err(|source| ValidationError::DocumentIo {
            path: document.to_path_buf(),
            source,
        })?;
        let mut report = self.validate_document(&xml)?;
        report.document = Some(document.display().to_string());
        Ok(report)
    }

    pub fn validate_document(&self, xml: &str) -> Result<ValidationReport, ValidationError> {
        let scan = scan_document(xml, &self.namespace)?;
        let mut files: BTreeMap<String, Option<String>> = BTreeMap::new();
        let findings: Vec<Finding> = scan
            .references
            .into_iter()
            .map(|reference| {
                let status = self.check(&reference, &mut files);
                if status != FindingStatus::Pass {
                    tracing::debug!(
                        rule = %reference.rule_id,
                        file = %reference.file,
                        problem = %status,
                        "traceability mismatch"
                    );
                }
                Finding { reference, status }
            })
            .collect();
        let report = ValidationReport {
            document: None,
            decisions: scan.decisions,
            findings,
        };
        tracing::info!(
            decisions = report.decisions,
            checked = report.findings.len(),
            failed = report.failed().len(),
            "trace validation complete"
        );
        Ok(report)
    }

    fn check(
        &self,
        reference: &TraceReference,
        files: &mut BTreeMap<String, Option<String>>,
    ) -> FindingStatus {
        if !is_safe_relative(&reference.file) {
            return FindingStatus::UnsafePath;
        }
        let content = files
            .entry(reference.file.clone())
            .or_insert_with(|| {
                fs::read(self.repo_root.join(&reference.file))
                    .ok()
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            })
            .as_deref();
        let Some(content) = content else {
            return FindingStatus::MissingFile;
        };

        let line_count = content.lines().count() as u32;
        if reference.start_line == 0
            || reference.start_line > reference.end_line
            || reference.end_line > line_count
        {
            return FindingStatus::OutOfRange { line_count };
        }

        let Some(ref embedded) = reference.snippet else {
            return FindingStatus::Pass;
        };
        let live = line_slice(content, reference.start_line, reference.end_line);
        if snippets_agree(embedded, &live) {
            FindingStatus::Pass
        } else {
            FindingStatus::SnippetMismatch
        }
    }
}

/// Embedded snippets may be capped, so a live range that contains the
/// embedded text passes, as does the reverse.
fn snippets_agree(embedded: &str, live: &str) -> bool {
    let embedded = comparable(embedded);
    let live = comparable(live);
    embedded.is_empty() || live.contains(&embedded) || (!live.is_empty() && embedded.contains(&live))
}

fn comparable(text: &str) -> String {
    text.replace('\r', "").trim().to_string()
}

/// Relative, and never escaping the root.
fn is_safe_relative(file: &str) -> bool {
    let path = Path::new(file);
    !file.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// What a document claims: its traceability references and how many
/// decisions it holds.
struct DocumentScan {
    references: Vec<TraceReference>,
    decisions: usize,
}

/// Every `source` element in `namespace`, in document order. A namespace
/// bound to a `traceability` element is also accepted, so documents
/// written under another trace namespace are still checked.
pub fn read_references(xml: &str, namespace: &str) -> Result<Vec<TraceReference>, ValidationError> {
    scan_document(xml, namespace).map(|scan| scan.references)
}

fn scan_document(xml: &str, namespace: &str) -> Result<DocumentScan, ValidationError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut trace_namespaces: Vec<Vec<u8>> = vec![namespace.as_bytes().to_vec()];
    let mut references = Vec::new();
    let mut decisions = 0;
    let mut current: Option<TraceReference> = None;
    let mut in_snippet = false;

    loop {
        let position = reader.buffer_position() as u64;
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| malformed(position, e))?;
        let ns: &[u8] = match resolved {
            ResolveResult::Bound(Namespace(ns)) => ns,
            _ => b"",
        };
        if let Event::Start(ref e) | Event::Empty(ref e) = event {
            match e.local_name().as_ref() {
                b"traceability"
                    if !ns.is_empty()
                        && ns != DMN_NAMESPACE.as_bytes()
                        && !trace_namespaces.iter().any(|t| t.as_slice() == ns) =>
                {
                    tracing::debug!(
                        namespace = %String::from_utf8_lossy(ns),
                        "using trace namespace bound in document"
                    );
                    trace_namespaces.push(ns.to_vec());
                }
                b"decision" if !trace_namespaces.iter().any(|t| t.as_slice() == ns) => {
                    decisions += 1;
                }
                _ => {}
            }
        }
        let ours = !ns.is_empty() && trace_namespaces.iter().any(|t| t.as_slice() == ns);
        match event {
            Event::Start(ref e) if ours => match e.local_name().as_ref() {
                b"source" => current = Some(parse_source(e, position)?),
                b"snippet" => in_snippet = true,
                _ => {}
            },
            Event::Empty(ref e) if ours && e.local_name().as_ref() == b"source" => {
                references.push(parse_source(e, position)?);
            }
            Event::Text(ref t) if in_snippet => {
                let text = t.unescape().map_err(|e| malformed(position, e))?;
                if let Some(ref mut reference) = current {
                    reference
                        .snippet
                        .get_or_insert_with(String::new)
                        .push_str(&text);
                }
            }
            Event::End(ref e) if ours => match e.local_name().as_ref() {
                b"snippet" => in_snippet = false,
                b"source" => references.extend(current.take()),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(DocumentScan {
        references,
        decisions,
    })
}

fn parse_source(e: &BytesStart<'_>, position: u64) -> Result<TraceReference, ValidationError> {
    let mut attrs: BTreeMap<String, String> = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(position, err))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(position, err))?
            .into_owned();
        attrs.insert(key, value);
    }

    let rule_id = attrs.get("ruleId").cloned().unwrap_or_default();
    let required = |name: &str| -> Result<String, ValidationError> {
        attrs
            .get(name)
            .cloned()
            .ok_or_else(|| ValidationError::MissingAttribute {
                rule_id: rule_id.clone(),
                attribute: name.to_string(),
            })
    };
    let line = |name: &str| -> Result<u32, ValidationError> {
        let value = required(name)?;
        value.trim().parse().map_err(|_| ValidationError::InvalidAttribute {
            attribute: name.to_string(),
            value,
        })
    };

    Ok(TraceReference {
        rule_id: required("ruleId")?,
        file: required("file")?,
        start_line: line("startLine")?,
        end_line: line("endLine")?,
        snippet: None,
    })
}

fn malformed(position: u64, e: impl std::fmt::Display) -> ValidationError {
    ValidationError::MalformedXml {
        position,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = DEFAULT_TRACE_NAMESPACE;

    fn doc(sources: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<definitions xmlns=\"https://www.omg.org/spec/DMN/20191111/MODEL/\" \
             xmlns:trace=\"{NS}\"><decision id=\"d\"><extensionElements><trace:traceability>{sources}\
             </trace:traceability></extensionElements></decision></definitions>"
        )
    }

    #[test]
    fn reads_sources_with_and_without_snippets() {
        let xml = doc(
            "<trace:source ruleId=\"r1\" file=\"a.sql\" startLine=\"2\" endLine=\"3\">\
             <trace:snippet>IF x &gt; 1 THEN</trace:snippet></trace:source>\
             <trace:source ruleId=\"r2\" file=\"b.sql\" startLine=\"1\" endLine=\"1\"/>",
        );
        let refs = read_references(&xml, NS).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].snippet.as_deref(), Some("IF x > 1 THEN"));
        assert_eq!((refs[1].start_line, refs[1].end_line), (1, 1));
        assert!(refs[1].snippet.is_none());
    }

    #[test]
    fn namespace_bound_in_document_is_used() {
        let xml = doc("<trace:source ruleId=\"r1\" file=\"a\" startLine=\"1\" endLine=\"1\"/>");
        assert_eq!(read_references(&xml, "urn:other").unwrap().len(), 1);
        let scan = scan_document(&xml, "urn:other").unwrap();
        assert_eq!(scan.decisions, 1);
    }

    #[test]
    fn sources_outside_trace_namespaces_are_ignored() {
        let xml = "<definitions xmlns:x=\"urn:x\"><x:source ruleId=\"r\" file=\"a\" startLine=\"1\" endLine=\"1\"/></definitions>";
        assert!(read_references(xml, NS).unwrap().is_empty());
    }

    #[test]
    fn bad_line_numbers_are_errors() {
        let xml = doc("<trace:source ruleId=\"r1\" file=\"a\" startLine=\"x\" endLine=\"1\"/>");
        assert!(matches!(
            read_references(&xml, NS),
            Err(ValidationError::InvalidAttribute { .. })
        ));
        let xml = doc("<trace:source ruleId=\"r1\" startLine=\"1\" endLine=\"1\"/>");
        assert!(matches!(
            read_references(&xml, NS),
            Err(ValidationError::MissingAttribute { ref attribute, .. }) if attribute == "file"
        ));
    }

    #[test]
    fn truncated_xml_is_malformed() {
        assert!(read_references("<definitions><decision></definitions>", NS).is_err());
    }

    #[test]
    fn unsafe_paths() {
        assert!(is_safe_relative("db/a.sql"));
        assert!(is_safe_relative("./a.sql"));
        assert!(!is_safe_relative("../a.sql"));
        assert!(!is_safe_relative("/etc/passwd"));
        assert!(!is_safe_relative(""));
    }

    #[test]
    fn snippet_comparison() {
        assert!(snippets_agree("IF x > 1", "IF x > 1 THEN\r\n  y := 2;"));
        assert!(snippets_agree("  a  ", "a"));
        assert!(!snippets_agree("IF x > 2", "IF x > 1 THEN"));
    }
}
