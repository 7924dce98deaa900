use crate::entry::{BuildPhase, GroupTarget};
use crate::error::{AppError, AppResult, SectionKind};
use crate::scan::{
    find_list, find_section, indent_at, line_end_after, line_start, lines, object_has_value,
    object_ref, objects, ListBlock, ListMiss, Section, SectionMiss,
};

/// Where inside a section or list a new line goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Anchor {
    /// After the last entry, or right after the opening line when empty.
    #[default]
    LastEntry,
    /// After the entry carrying this label. First occurrence wins.
    After(String),
    /// After the build entry of this file, in whichever phase it was built.
    /// Falls back to the last entry when the file has no build entry.
    AfterBuildOf(String),
}

/// One anchor per section touched by a registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorPolicy {
    /// Anchor in the `PBXFileReference` section.
    pub file_reference: Anchor,
    /// Anchor in the `PBXBuildFile` section.
    pub build_file: Anchor,
    /// Anchor in the target group's `children`.
    pub group: Anchor,
    /// Anchor in the build phase's `files`.
    pub phase: Anchor,
}

impl AnchorPolicy {
    /// Places both records right after an existing sibling file's records.
    ///
    /// The sibling's build entry is matched in any phase, so a resource can
    /// sit next to a source file. List memberships still go after the last
    /// entry, since the sibling need not share the new file's group.
    pub fn after_sibling(sibling: &str) -> Self {
        Self {
            file_reference: Anchor::After(sibling.to_string()),
            build_file: Anchor::AfterBuildOf(sibling.to_string()),
            ..Self::default()
        }
    }
}

/// A resolved insertion point: the end of the anchor line and the indent
/// the new line should carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPoint {
    /// Byte offset just past the anchor line.
    pub offset: usize,
    /// Leading whitespace for the inserted line.
    pub indent: String,
}

const RECORD_INDENT: &str = "\t\t";

fn section_miss(kind: SectionKind, isa: &str, miss: SectionMiss) -> AppError {
    match miss {
        SectionMiss::Header => {
            AppError::anchor(kind, format!("no '/* Begin {} section */' header", isa))
        }
        SectionMiss::Footer => {
            AppError::anchor(kind, format!("'{}' section is never closed", isa))
        }
    }
}

fn list_miss(kind: SectionKind, owner: &str, key: &str, miss: ListMiss) -> AppError {
    match miss {
        ListMiss::Open => {
            AppError::anchor(kind, format!("{} has no '{} = (' list", owner, key))
        }
        ListMiss::Close => {
            AppError::anchor(kind, format!("{} '{}' list is never closed", owner, key))
        }
    }
}

fn last_record(text: &str, section: &Section) -> InsertPoint {
    let last = lines(text, section.body())
        .into_iter()
        .rev()
        .find(|span| !text[span.start..span.end].trim().is_empty());
    match last {
        Some(span) => InsertPoint {
            offset: span.end,
            indent: indent_at(text, span.start).to_string(),
        },
        None => InsertPoint {
            offset: section.header_end,
            indent: RECORD_INDENT.to_string(),
        },
    }
}

fn last_item(text: &str, list: &ListBlock) -> InsertPoint {
    match list.items.last() {
        Some(span) => InsertPoint {
            offset: span.end,
            indent: indent_at(text, span.start).to_string(),
        },
        None => InsertPoint {
            offset: list.open_end,
            indent: format!("{}\t", indent_at(text, list.open_start)),
        },
    }
}

/// Resolves an anchor inside a one-record-per-line section such as
/// `PBXFileReference` or `PBXBuildFile`.
pub fn resolve_record(
    text: &str,
    isa: &str,
    kind: SectionKind,
    anchor: &Anchor,
) -> AppResult<InsertPoint> {
    let section = find_section(text, isa).map_err(|miss| section_miss(kind, isa, miss))?;
    let body = section.body();

    match anchor {
        Anchor::LastEntry => Ok(last_record(text, &section)),
        Anchor::AfterBuildOf(file) => {
            let prefix = format!("{} in ", file);
            let sibling = objects(text, body)
                .into_iter()
                .find(|block| block.label.is_some_and(|l| l.starts_with(&prefix)));
            Ok(match sibling {
                Some(block) => InsertPoint {
                    offset: block.span.end,
                    indent: indent_at(text, block.span.start).to_string(),
                },
                None => {
                    tracing::debug!(file = %file, "no build entry to follow, using last entry");
                    last_record(text, &section)
                }
            })
        }
        Anchor::After(label) => {
            let marker = format!("/* {} */ = {{", label);
            let end = line_end_after(text, &marker, body.start)
                .filter(|&end| end <= body.end)
                .ok_or_else(|| {
                    AppError::anchor(kind, format!("no '{}' entry in '{}' section", label, isa))
                })?;
            Ok(InsertPoint {
                offset: end,
                indent: indent_at(text, line_start(text, end - 1)).to_string(),
            })
        }
    }
}

/// Resolves an anchor inside a bounded `key = ( … );` list.
pub fn resolve_list(
    text: &str,
    list: &ListBlock,
    kind: SectionKind,
    anchor: &Anchor,
) -> AppResult<InsertPoint> {
    match anchor {
        Anchor::LastEntry => Ok(last_item(text, list)),
        Anchor::AfterBuildOf(file) => {
            let marker = format!("/* {} in ", file);
            Ok(list
                .items
                .iter()
                .find(|span| text[span.start..span.end].contains(&marker))
                .map(|span| InsertPoint {
                    offset: span.end,
                    indent: indent_at(text, span.start).to_string(),
                })
                .unwrap_or_else(|| last_item(text, list)))
        }
        Anchor::After(label) => {
            let marker = format!("/* {} */,", label);
            let span = list
                .items
                .iter()
                .find(|span| text[span.start..span.end].contains(&marker))
                .ok_or_else(|| AppError::anchor(kind, format!("no '{}' item in list", label)))?;
            Ok(InsertPoint {
                offset: span.end,
                indent: indent_at(text, span.start).to_string(),
            })
        }
    }
}

fn main_group_id(text: &str) -> AppResult<&str> {
    let section = find_section(text, "PBXProject")
        .map_err(|miss| section_miss(SectionKind::Group, "PBXProject", miss))?;
    objects(text, section.body())
        .into_iter()
        .find_map(|project| object_ref(text, project.span, "mainGroup"))
        .ok_or_else(|| AppError::anchor(SectionKind::Group, "project declares no mainGroup"))
}

/// Resolves the insertion point in the target group's `children`.
pub fn resolve_group(text: &str, target: &GroupTarget, anchor: &Anchor) -> AppResult<InsertPoint> {
    let kind = SectionKind::Group;
    let section =
        find_section(text, "PBXGroup").map_err(|miss| section_miss(kind, "PBXGroup", miss))?;
    let groups = objects(text, section.body());

    let (group, owner) = match target {
        GroupTarget::Named(name) => {
            let group = groups
                .iter()
                .find(|g| {
                    g.label == Some(name.as_str())
                        || object_has_value(text, g.span, "path", name)
                        || object_has_value(text, g.span, "name", name)
                })
                .ok_or_else(|| AppError::anchor(kind, format!("no group named '{}'", name)))?;
            (group, format!("group '{}'", name))
        }
        GroupTarget::Main => {
            let main_id = main_group_id(text)?;
            let group = groups.iter().find(|g| g.id == main_id).ok_or_else(|| {
                AppError::anchor(kind, format!("main group {} is not declared", main_id))
            })?;
            (group, "main group".to_string())
        }
    };

    let list = find_list(text, group.span, "children")
        .map_err(|miss| list_miss(kind, &owner, "children", miss))?;
    resolve_list(text, &list, kind, anchor)
}

/// Resolves the insertion point in the first build phase of the given kind.
pub fn resolve_phase(text: &str, phase: BuildPhase, anchor: &Anchor) -> AppResult<InsertPoint> {
    let kind = SectionKind::BuildPhase;
    let isa = phase.isa();
    let section = find_section(text, isa).map_err(|miss| section_miss(kind, isa, miss))?;

    let block = objects(text, section.body())
        .into_iter()
        .next()
        .ok_or_else(|| AppError::anchor(kind, format!("'{}' section declares no phase", isa)))?;

    let list = find_list(text, block.span, "files")
        .map_err(|miss| list_miss(kind, isa, "files", miss))?;
    resolve_list(text, &list, kind, anchor)
}
