#![deny(missing_docs)]

//! # Manifest Entries
//!
//! Describes the file being registered and formats the four lines a
//! registration adds to the manifest.

use crate::error::{AppError, AppResult};
use crate::ident::ObjectId;
use crate::patcher::anchor::AnchorPolicy;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// The build phase a registered file joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildPhase {
    /// Compiled sources (`PBXSourcesBuildPhase`).
    Sources,
    /// Bundled resources (`PBXResourcesBuildPhase`).
    Resources,
}

impl BuildPhase {
    /// The `isa` of the phase object and its section.
    pub fn isa(self) -> &'static str {
        match self {
            BuildPhase::Sources => "PBXSourcesBuildPhase",
            BuildPhase::Resources => "PBXResourcesBuildPhase",
        }
    }

    /// Suffix used in build entry labels, e.g. `Foo.swift in Sources`.
    pub fn label(self) -> &'static str {
        match self {
            BuildPhase::Sources => "Sources",
            BuildPhase::Resources => "Resources",
        }
    }
}

/// Maps a file name to its `lastKnownFileType`.
pub fn file_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("swift") => "sourcecode.swift",
        Some("m") => "sourcecode.c.objc",
        Some("mm") => "sourcecode.cpp.objcpp",
        Some("c") => "sourcecode.c.c",
        Some("cc") | Some("cpp") | Some("cxx") => "sourcecode.cpp.cpp",
        Some("metal") => "sourcecode.metal",
        Some("json") => "text.json",
        Some("plist") => "text.plist.xml",
        Some("strings") => "text.plist.strings",
        Some("xib") => "file.xib",
        Some("storyboard") => "file.storyboard",
        Some("xcassets") => "folder.assetcatalog",
        Some("png") => "image.png",
        Some("jpg") | Some("jpeg") => "image.jpeg",
        _ => "text",
    }
}

/// The phase a file of the given type belongs to unless overridden.
pub fn default_phase(file_type: &str) -> BuildPhase {
    if file_type.starts_with("sourcecode.") {
        BuildPhase::Sources
    } else {
        BuildPhase::Resources
    }
}

/// Quotes a value the way the manifest writer does.
///
/// Bare words may only contain alphanumerics and `_$/:.-`; anything else is
/// wrapped in double quotes with `"` and `\` escaped.
pub fn quote_value(value: &str) -> Cow<'_, str> {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_$/:.-".contains(c));
    if bare {
        return Cow::Borrowed(value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Which group receives the new file reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupTarget {
    /// A group matched by its label, `path` or `name`.
    Named(String),
    /// The project's `mainGroup`.
    Main,
}

/// A request to register one file.
#[derive(Debug, Clone)]
pub struct Registration {
    file_name: String,
    relative_path: PathBuf,
    group: Option<String>,
    phase: Option<BuildPhase>,
    anchors: AnchorPolicy,
}

impl Registration {
    /// Builds a request from the file's path relative to the project root.
    ///
    /// The file name (label) is the last path component.
    pub fn new(relative_path: impl Into<PathBuf>) -> AppResult<Self> {
        let relative_path = relative_path.into();
        let file_name = relative_path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                AppError::General(format!(
                    "Cannot derive a file name from {:?}",
                    relative_path
                ))
            })?
            .to_string();

        Ok(Self {
            file_name,
            relative_path,
            group: None,
            phase: None,
            anchors: AnchorPolicy::default(),
        })
    }

    /// Targets an explicit group instead of the parent directory's.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Forces the build phase instead of inferring it from the file type.
    pub fn with_phase(mut self, phase: BuildPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Replaces the anchor policy.
    pub fn with_anchors(mut self, anchors: AnchorPolicy) -> Self {
        self.anchors = anchors;
        self
    }

    /// The label written in comments, e.g. `Foo.swift`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The path the request was built from.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// The anchor policy for the four insertions.
    pub fn anchors(&self) -> &AnchorPolicy {
        &self.anchors
    }

    /// The `lastKnownFileType` of the file.
    pub fn file_type(&self) -> &'static str {
        file_type(&self.file_name)
    }

    /// The build phase the file joins.
    pub fn phase(&self) -> BuildPhase {
        self.phase
            .unwrap_or_else(|| default_phase(self.file_type()))
    }

    /// The group that receives the file reference.
    pub fn group(&self) -> GroupTarget {
        if let Some(group) = &self.group {
            return GroupTarget::Named(group.clone());
        }
        self.relative_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(|n| GroupTarget::Named(n.to_string()))
            .unwrap_or(GroupTarget::Main)
    }

    /// The build entry label, e.g. `Foo.swift in Sources`.
    pub fn build_label(&self) -> String {
        format!("{} in {}", self.file_name, self.phase().label())
    }

    /// The `PBXFileReference` record.
    pub fn reference_record(&self, ref_id: &ObjectId) -> String {
        let file_type = self.file_type();
        let encoding = if file_type.starts_with("sourcecode.") || file_type.starts_with("text") {
            "fileEncoding = 4; "
        } else {
            ""
        };
        format!(
            "{} /* {} */ = {{isa = PBXFileReference; {}lastKnownFileType = {}; path = {}; sourceTree = \"<group>\"; }};",
            ref_id,
            self.file_name,
            encoding,
            file_type,
            quote_value(&self.file_name)
        )
    }

    /// The `PBXBuildFile` record pointing at `ref_id`.
    pub fn build_record(&self, build_id: &ObjectId, ref_id: &ObjectId) -> String {
        format!(
            "{} /* {} */ = {{isa = PBXBuildFile; fileRef = {} /* {} */; }};",
            build_id,
            self.build_label(),
            ref_id,
            self.file_name
        )
    }

    /// The group `children` item.
    pub fn group_item(&self, ref_id: &ObjectId) -> String {
        format!("{} /* {} */,", ref_id, self.file_name)
    }

    /// The build phase `files` item.
    pub fn phase_item(&self, build_id: &ObjectId) -> String {
        format!("{} /* {} */,", build_id, self.build_label())
    }
}
