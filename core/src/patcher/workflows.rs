use crate::entry::Registration;
use crate::error::{AppResult, SectionKind};
use crate::ident::{IdAllocator, IdSource, ObjectId};
use crate::patcher::anchor::{resolve_group, resolve_phase, resolve_record, InsertPoint};
use crate::patcher::insert::insert_line_after;
use crate::patcher::stage::PatchStage;
use crate::registration::is_registered;

/// The identifiers generated for one registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EntryIds {
    /// Identifier of the `PBXFileReference`; reused by the build entry and
    /// the group membership.
    pub file_ref: ObjectId,
    /// Identifier of the `PBXBuildFile`; reused by the phase membership.
    pub build_file: ObjectId,
}

/// A line added to the manifest, with the section it went into.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct InsertedEntry {
    /// Section the line was inserted into.
    pub section: SectionKind,
    /// The full line, indent included, without the trailing newline.
    pub line: String,
}

/// An in-memory manifest with all four entries inserted.
#[derive(Debug, Clone)]
pub struct PatchedManifest {
    /// The new manifest text.
    pub text: String,
    /// Identifiers of the new objects.
    pub ids: EntryIds,
    /// The four inserted lines, in insertion order.
    pub inserted: Vec<InsertedEntry>,
    /// Always `PhaseInserted`; committing moves it on.
    pub stage: PatchStage,
}

/// Result of a registration attempt that did not fail.
#[derive(Debug, Clone)]
pub enum PatchOutcome {
    /// The file name already occurs in the manifest; nothing changed.
    AlreadyRegistered,
    /// All four entries were inserted in memory.
    Patched(PatchedManifest),
}

/// Registers one file in the manifest text.
///
/// Inserts, in order, the file reference, the build entry, the group
/// membership and the build phase membership. Each step takes the previous
/// snapshot and returns a new one; the first unresolvable anchor aborts the
/// whole registration and the input is left as it was.
pub fn register<S: IdSource>(
    manifest: &str,
    registration: &Registration,
    source: &mut S,
) -> AppResult<PatchOutcome> {
    let start = PatchStage::Start;
    let name = registration.file_name();

    if is_registered(manifest, name) {
        start.advance(PatchStage::AlreadyRegistered)?;
        tracing::info!(file = name, "already present in manifest");
        return Ok(PatchOutcome::AlreadyRegistered);
    }

    let mut stage = start.advance(PatchStage::Checked)?;
    match apply(manifest, registration, source, &mut stage) {
        Ok(patched) => Ok(PatchOutcome::Patched(patched)),
        Err(err) => {
            tracing::warn!(file = name, stage = ?stage, error = %err, "registration aborted");
            stage.advance(PatchStage::Aborted)?;
            Err(err)
        }
    }
}

fn apply<S: IdSource>(
    manifest: &str,
    registration: &Registration,
    source: &mut S,
    stage: &mut PatchStage,
) -> AppResult<PatchedManifest> {
    let mut allocator = IdAllocator::new(manifest, source);
    let ids = EntryIds {
        file_ref: allocator.allocate()?,
        build_file: allocator.allocate()?,
    };

    let anchors = registration.anchors();
    let phase = registration.phase();
    let mut inserted = Vec::with_capacity(4);

    // 1. File reference
    let point = resolve_record(
        manifest,
        "PBXFileReference",
        SectionKind::FileReference,
        &anchors.file_reference,
    )?;
    let text = splice(
        manifest,
        &point,
        SectionKind::FileReference,
        &registration.reference_record(&ids.file_ref),
        &mut inserted,
    );
    *stage = stage.advance(PatchStage::RefInserted)?;

    // 2. Build file, pointing back at the reference
    let point = resolve_record(
        &text,
        "PBXBuildFile",
        SectionKind::BuildFile,
        &anchors.build_file,
    )?;
    let text = splice(
        &text,
        &point,
        SectionKind::BuildFile,
        &registration.build_record(&ids.build_file, &ids.file_ref),
        &mut inserted,
    );
    *stage = stage.advance(PatchStage::BuildInserted)?;

    // 3. Group membership
    let point = resolve_group(&text, &registration.group(), &anchors.group)?;
    let text = splice(
        &text,
        &point,
        SectionKind::Group,
        &registration.group_item(&ids.file_ref),
        &mut inserted,
    );
    *stage = stage.advance(PatchStage::GroupInserted)?;

    // 4. Build phase membership
    let point = resolve_phase(&text, phase, &anchors.phase)?;
    let text = splice(
        &text,
        &point,
        SectionKind::BuildPhase,
        &registration.phase_item(&ids.build_file),
        &mut inserted,
    );
    *stage = stage.advance(PatchStage::PhaseInserted)?;

    Ok(PatchedManifest {
        text,
        ids,
        inserted,
        stage: *stage,
    })
}

fn splice(
    text: &str,
    point: &InsertPoint,
    section: SectionKind,
    entry: &str,
    inserted: &mut Vec<InsertedEntry>,
) -> String {
    tracing::debug!(%section, offset = point.offset, "anchor resolved");
    let next = insert_line_after(text, point, entry);
    inserted.push(InsertedEntry {
        section,
        line: format!("{}{}", point.indent, entry),
    });
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::ident::tests::SequenceIds;
    use crate::patcher::anchor::AnchorPolicy;

    const MANIFEST: &str = "\
// !$*UTF8*$!
{
\tobjects = {

/* Begin PBXBuildFile section */
\t\tB00000000000000000000001 /* X.swift in Sources */ = {isa = PBXBuildFile; fileRef = F00000000000000000000001 /* X.swift */; };
/* End PBXBuildFile section */

/* Begin PBXFileReference section */
\t\tF00000000000000000000001 /* X.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = X.swift; sourceTree = \"<group>\"; };
/* End PBXFileReference section */

/* Begin PBXGroup section */
\t\tA00000000000000000000001 /* Services */ = {
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
\t\t\t\tF00000000000000000000001 /* X.swift */,
\t\t\t);
\t\t\tpath = Services;
\t\t\tsourceTree = \"<group>\";
\t\t};
/* End PBXGroup section */

/* Begin PBXSourcesBuildPhase section */
\t\tD00000000000000000000001 /* Sources */ = {
\t\t\tisa = PBXSourcesBuildPhase;
\t\t\tfiles = (
\t\t\t\tB00000000000000000000001 /* X.swift in Sources */,
\t\t\t);
\t\t};
/* End PBXSourcesBuildPhase section */
\t};
}
";

    fn ids() -> SequenceIds {
        SequenceIds(vec![
            "111111111111111111111111",
            "222222222222222222222222",
        ])
    }

    fn patched(outcome: PatchOutcome) -> PatchedManifest {
        match outcome {
            PatchOutcome::Patched(p) => p,
            PatchOutcome::AlreadyRegistered => panic!("expected a patch"),
        }
    }

    #[test]
    fn test_register_inserts_four_linked_lines() {
        let reg = Registration::new("App/Services/Y.swift").unwrap();
        let res = patched(register(MANIFEST, &reg, &mut ids()).unwrap());

        assert_eq!(res.stage, PatchStage::PhaseInserted);
        assert_eq!(res.inserted.len(), 4);
        assert_eq!(res.ids.file_ref.as_str(), "111111111111111111111111");

        assert!(res.text.contains(
            "\t\t222222222222222222222222 /* Y.swift in Sources */ = {isa = PBXBuildFile; fileRef = 111111111111111111111111 /* Y.swift */; };\n"
        ));
        assert!(res
            .text
            .contains("\t\t\t\t111111111111111111111111 /* Y.swift */,\n\t\t\t);\n\t\t\tpath = Services;"));
        assert!(res
            .text
            .contains("\t\t\t\t222222222222222222222222 /* Y.swift in Sources */,\n\t\t\t);\n\t\t};"));
    }

    #[test]
    fn test_register_is_idempotent() {
        let reg = Registration::new("App/Services/Y.swift").unwrap();
        let once = patched(register(MANIFEST, &reg, &mut ids()).unwrap());
        let twice = register(&once.text, &reg, &mut ids()).unwrap();
        assert!(matches!(twice, PatchOutcome::AlreadyRegistered));
    }

    #[test]
    fn test_register_only_adds_lines() {
        let reg = Registration::new("App/Services/Y.swift").unwrap();
        let res = patched(register(MANIFEST, &reg, &mut ids()).unwrap());

        let mut remaining: Vec<&str> = res.text.lines().collect();
        for entry in &res.inserted {
            let pos = remaining.iter().position(|l| *l == entry.line).unwrap();
            remaining.remove(pos);
        }
        assert_eq!(remaining, MANIFEST.lines().collect::<Vec<_>>());
    }

    #[test]
    fn test_register_missing_group_aborts() {
        let reg = Registration::new("App/Models/Y.swift").unwrap();
        let err = register(MANIFEST, &reg, &mut ids()).unwrap_err();
        assert!(matches!(
            err,
            AppError::AnchorNotFound {
                section: SectionKind::Group,
                ..
            }
        ));
    }

    #[test]
    fn test_register_after_named_sibling() {
        let reg = Registration::new("App/Services/Y.swift")
            .unwrap()
            .with_anchors(AnchorPolicy::after_sibling("X.swift"));
        let res = patched(register(MANIFEST, &reg, &mut ids()).unwrap());
        assert!(res.text.contains(
            "/* X.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = X.swift; sourceTree = \"<group>\"; };\n\t\t111111111111111111111111 /* Y.swift */"
        ));
    }

    #[test]
    fn test_register_missing_named_sibling_aborts() {
        let reg = Registration::new("App/Services/Y.swift")
            .unwrap()
            .with_anchors(AnchorPolicy::after_sibling("Gone.swift"));
        let err = register(MANIFEST, &reg, &mut ids()).unwrap_err();
        assert!(matches!(
            err,
            AppError::AnchorNotFound {
                section: SectionKind::FileReference,
                ..
            }
        ));
    }

    #[test]
    fn test_register_skips_colliding_ids() {
        let reg = Registration::new("App/Services/Y.swift").unwrap();
        let mut source = SequenceIds(vec![
            "F00000000000000000000001",
            "111111111111111111111111",
            "222222222222222222222222",
        ]);
        let res = patched(register(MANIFEST, &reg, &mut source).unwrap());
        assert_eq!(res.ids.file_ref.as_str(), "111111111111111111111111");
        assert_eq!(res.ids.build_file.as_str(), "222222222222222222222222");
    }
}
