// src/profile/filter.rs

//! Source filter compilation.
//!
//! A profile's `[profile.path]` scope rules are compiled into a
//! [`SourcePredicate`]: an ordered list of [`CompiledFilter`] stages that are
//! ANDed together and short-circuit on the first rejection.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::config::model::{BuiltInFilter, PathOptions, TextFilter};
use crate::errors::FilterCompileError;
use crate::types::{BuiltInFilterKind, TextFilterKind};

/// Lower-case extensions (no leading dot) known to any profile, as source or
/// destination. Computed once per compilation pass.
pub type KnownExtensions = Arc<HashSet<String>>;

/// One compiled filter stage.
#[derive(Clone)]
pub enum CompiledFilter {
    /// Directory scope. `dir` is normalised (no leading/trailing slash).
    Scope { dir: String, recursive: bool },
    /// Lower-case extension allow-list.
    Extension(HashSet<String>),
    /// Rejects file names with two or more known-extension components.
    DoubleExtension(KnownExtensions),
    /// Substring containment. `needle` is already lower-cased when
    /// `case_insensitive` is set.
    Contains {
        needle: String,
        case_insensitive: bool,
        negate: bool,
    },
    /// Regex test. `None` means the pattern did not compile; such a stage
    /// never passes.
    Regex {
        pattern: String,
        regex: Option<Regex>,
        negate: bool,
    },
}

impl fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledFilter::Scope { dir, recursive } => f
                .debug_struct("Scope")
                .field("dir", dir)
                .field("recursive", recursive)
                .finish(),
            CompiledFilter::Extension(exts) => {
                let mut sorted: Vec<_> = exts.iter().collect();
                sorted.sort();
                f.debug_tuple("Extension").field(&sorted).finish()
            }
            CompiledFilter::DoubleExtension(known) => f
                .debug_struct("DoubleExtension")
                .field("known", &known.len())
                .finish(),
            CompiledFilter::Contains {
                needle,
                case_insensitive,
                negate,
            } => f
                .debug_struct("Contains")
                .field("needle", needle)
                .field("case_insensitive", case_insensitive)
                .field("negate", negate)
                .finish(),
            CompiledFilter::Regex {
                pattern,
                regex,
                negate,
            } => f
                .debug_struct("Regex")
                .field("pattern", pattern)
                .field("valid", &regex.is_some())
                .field("negate", negate)
                .finish(),
        }
    }
}

impl CompiledFilter {
    /// Does `path` (vault-relative, forward slashes) pass this stage?
    pub fn accepts(&self, path: &str) -> bool {
        match self {
            CompiledFilter::Scope { dir, recursive } => {
                let parent = parent_dir(path);
                if *recursive {
                    dir.is_empty()
                        || parent == dir.as_str()
                        || parent
                            .strip_prefix(dir.as_str())
                            .is_some_and(|rest| rest.starts_with('/'))
                } else {
                    parent == dir.as_str()
                }
            }
            CompiledFilter::Extension(exts) => exts.contains(&lowercase_ext(path)),
            CompiledFilter::DoubleExtension(known) => {
                let hits = file_name(path)
                    .split('.')
                    .filter(|comp| known.contains(&comp.to_lowercase()))
                    .take(2)
                    .count();
                hits < 2
            }
            CompiledFilter::Contains {
                needle,
                case_insensitive,
                negate,
            } => {
                let found = if *case_insensitive {
                    path.to_lowercase().contains(needle.as_str())
                } else {
                    path.contains(needle.as_str())
                };
                found != *negate
            }
            CompiledFilter::Regex { regex, negate, .. } => match regex {
                Some(re) => re.is_match(path) != *negate,
                None => false,
            },
        }
    }
}

/// The compiled source predicate of one profile.
#[derive(Debug, Clone, Default)]
pub struct SourcePredicate {
    stages: Vec<CompiledFilter>,
}

impl SourcePredicate {
    pub fn new(stages: Vec<CompiledFilter>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[CompiledFilter] {
        &self.stages
    }

    pub fn matches(&self, path: &str) -> bool {
        self.stages.iter().all(|stage| stage.accepts(path))
    }
}

/// Compile one profile's path options.
///
/// Stage order: scope, extension, active built-in filters, active user
/// filters. A malformed regex is logged and becomes a stage that rejects
/// everything; it never fails compilation.
pub fn compile_source_predicate(opts: &PathOptions, known: &KnownExtensions) -> SourcePredicate {
    let mut stages = Vec::with_capacity(2 + opts.builtin_filters.len() + opts.filters.len());

    stages.push(CompiledFilter::Scope {
        dir: normalize_dir(&opts.source_dir),
        recursive: opts.recursive,
    });
    stages.push(CompiledFilter::Extension(
        opts.source_exts.iter().map(|e| normalize_ext(e)).collect(),
    ));

    for filter in opts.builtin_filters.iter().filter(|f| f.active) {
        stages.push(compile_builtin(filter, known));
    }

    for filter in opts.filters.iter().filter(|f| f.active) {
        match compile_text_filter(filter) {
            Ok(stage) => stages.push(stage),
            Err(err) => {
                warn!(kind = %filter.kind, error = %err, "filter degraded to match nothing");
                stages.push(CompiledFilter::Regex {
                    pattern: err.pattern,
                    regex: None,
                    negate: filter.kind == TextFilterKind::RegexNonMatch,
                });
            }
        }
    }

    SourcePredicate::new(stages)
}

fn compile_builtin(filter: &BuiltInFilter, known: &KnownExtensions) -> CompiledFilter {
    match filter.kind {
        BuiltInFilterKind::DoubleExtensionBlocker => CompiledFilter::DoubleExtension(known.clone()),
    }
}

/// Compile a single user text filter.
pub fn compile_text_filter(filter: &TextFilter) -> Result<CompiledFilter, FilterCompileError> {
    match filter.kind {
        TextFilterKind::Includes | TextFilterKind::Excludes => {
            let needle = if filter.case_insensitive {
                filter.content.to_lowercase()
            } else {
                filter.content.clone()
            };
            Ok(CompiledFilter::Contains {
                needle,
                case_insensitive: filter.case_insensitive,
                negate: filter.kind == TextFilterKind::Excludes,
            })
        }
        TextFilterKind::RegexMatch | TextFilterKind::RegexNonMatch => {
            let regex = RegexBuilder::new(&filter.content)
                .case_insensitive(filter.case_insensitive)
                .build()
                .map_err(|source| FilterCompileError {
                    pattern: filter.content.clone(),
                    source,
                })?;
            Ok(CompiledFilter::Regex {
                pattern: filter.content.clone(),
                regex: Some(regex),
                negate: filter.kind == TextFilterKind::RegexNonMatch,
            })
        }
    }
}

/// Lower-case, no leading dot.
pub fn normalize_ext(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn normalize_dir(dir: &str) -> String {
    dir.replace('\\', "/")
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

fn lowercase_ext(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx + 1..].to_lowercase(),
        _ => String::new(),
    }
}
