//! The Source Rewriter.
//!
//! Points the program's imports of `weft::fmt` and `weft::show` at their
//! instrumented twins under `weft::capture`, and indexes its Documentation
//! Blocks. The rewrite is a pure insertion of `capture::` in front of the
//! imported module name, on the same line, so every line of the rewritten
//! program keeps its number.

use proc_macro2::Ident;
use syn::spanned::Spanned;
use syn::{Item, UseTree};

use crate::docblock::{DocBlock, find_doc_blocks};
use crate::error::{Result, WeftError};
use crate::lexer::LineIndex;

/// The runtime crate whose modules get hooked.
pub const HOOKED_CRATE: &str = "weft";
/// Modules of [`HOOKED_CRATE`] that have instrumented replacements.
pub const HOOKED_MODULES: [&str; 2] = ["fmt", "show"];
/// Where the replacements live inside [`HOOKED_CRATE`].
pub const CAPTURE_MODULE: &str = "capture";

const BOM: &str = "\u{feff}";

/// One `capture::` insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub line: usize,
    /// 0-based char column of the hooked module name.
    pub column: usize,
    pub module: String,
}

#[derive(Debug, Clone)]
pub struct Rewritten {
    /// The runnable program. Same line count as the input.
    pub source: String,
    pub hooks: Vec<Hook>,
    pub doc_blocks: Vec<DocBlock>,
}

impl Rewritten {
    pub fn is_hooked(&self) -> bool {
        !self.hooks.is_empty()
    }
}

/// Rewrite `source` and index its Documentation Blocks.
///
/// Fails if `source` is not a valid Rust file.
pub fn rewrite(source: &str) -> Result<Rewritten> {
    let (bom, body) = match source.strip_prefix(BOM) {
        Some(body) => (BOM, body),
        None => ("", source),
    };

    let file = syn::parse_file(body).map_err(|e| {
        let start = e.span().start();
        WeftError::Parse {
            line: start.line,
            column: start.column + 1,
            message: e.to_string(),
        }
    })?;

    let mut idents = Vec::new();
    for item in &file.items {
        if let Item::Use(item) = item {
            visit_root(&item.tree, &mut idents);
        }
    }

    let index = LineIndex::new(body);
    let mut hooks = Vec::with_capacity(idents.len());
    let mut offsets = Vec::with_capacity(idents.len());
    for ident in idents {
        let start = ident.span().start();
        let module = ident.to_string();
        let offset = index
            .offset(body, start.line, start.column)
            .filter(|&offset| body[offset..].starts_with(module.as_str()))
            .ok_or_else(|| WeftError::Rewrite {
                line: start.line,
                column: start.column + 1,
                expected: module.clone(),
            })?;

        tracing::debug!(
            "hooking {}::{} at {}:{}",
            HOOKED_CRATE,
            module,
            start.line,
            start.column + 1
        );
        offsets.push(offset);
        hooks.push(Hook {
            line: start.line,
            column: start.column,
            module,
        });
    }

    let mut rewritten = body.to_string();
    let insertion = format!("{}::", CAPTURE_MODULE);
    offsets.sort_unstable();
    for offset in offsets.into_iter().rev() {
        rewritten.insert_str(offset, &insertion);
    }

    let doc_blocks = find_doc_blocks(body, &index);
    tracing::debug!(
        "rewrote {} imports, found {} doc blocks",
        hooks.len(),
        doc_blocks.len()
    );

    Ok(Rewritten {
        source: format!("{}{}", bom, rewritten),
        hooks,
        doc_blocks,
    })
}

/// A `use` tree at the crate root: `weft::...`, `::weft::...` or a group.
fn visit_root<'a>(tree: &'a UseTree, out: &mut Vec<&'a Ident>) {
    match tree {
        UseTree::Path(path) if path.ident == HOOKED_CRATE => visit_crate(&path.tree, out),
        UseTree::Group(group) => {
            for tree in &group.items {
                visit_root(tree, out);
            }
        }
        _ => {}
    }
}

/// A `use` tree directly below `weft::`.
fn visit_crate<'a>(tree: &'a UseTree, out: &mut Vec<&'a Ident>) {
    let ident = match tree {
        UseTree::Path(path) => &path.ident,
        UseTree::Name(name) => &name.ident,
        UseTree::Rename(rename) => &rename.ident,
        UseTree::Group(group) => {
            for tree in &group.items {
                visit_crate(tree, out);
            }
            return;
        }
        UseTree::Glob(glob) => {
            let start = glob.span().start();
            tracing::warn!(
                "glob import of {} at line {} is not hooked; import fmt and show by name",
                HOOKED_CRATE,
                start.line
            );
            return;
        }
    };
    if HOOKED_MODULES.iter().any(|module| ident == module) {
        out.push(ident);
    }
}
