//! Parsing one build file into property groups, item groups and imports.
//!
//! The parser is a single pass over quick-xml events. It recognizes the
//! handful of shapes discovery needs - the `Sdk` attribute on the root
//! element, `<Sdk>` element imports, `<PropertyGroup>`/`<ItemGroup>` blocks
//! with optional `Condition` attributes, and the dependency-bearing items
//! inside them - and ignores everything else (`Reference`, resource items,
//! targets).
//!
//! Attribute names match case-insensitively: real-world files write
//! `version="1.1.0"` and expect it to work. A `<Version>` element nested in
//! an item is the later-applied value and wins over a `Version` attribute.

use nudge_core::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::{Path, PathBuf};

/// The kind of dependency-bearing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// `<PackageReference>`
    PackageReference,
    /// `<PackageVersion>`
    PackageVersion,
    /// `<GlobalPackageReference>`
    GlobalPackageReference,
}

/// One dependency-bearing item as written in the file, unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyItem {
    /// Which element produced this item.
    pub kind: ItemKind,
    /// The item's own `Condition` attribute, if any. Evaluated in addition
    /// to the enclosing group's condition.
    pub condition: Option<String>,
    /// The `Include` attribute, if present.
    pub include: Option<String>,
    /// The `Update` attribute, if present (update-style declaration).
    pub update: Option<String>,
    /// The `Version` attribute, if present.
    pub version_attribute: Option<String>,
    /// A nested `<Version>` element's text, if present. Wins over the
    /// attribute when both are written.
    pub version_element: Option<String>,
}

impl DependencyItem {
    /// The raw version source: nested element over attribute.
    #[must_use]
    pub fn raw_version(&self) -> Option<&str> {
        self.version_element
            .as_deref()
            .or(self.version_attribute.as_deref())
    }
}

/// A `<PropertyGroup>` block: ordered `(name, raw value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyGroup {
    /// The group's `Condition` attribute, if any.
    pub condition: Option<String>,
    /// Property assignments in document order.
    pub properties: Vec<(String, String)>,
}

/// An `<ItemGroup>` block holding dependency items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemGroup {
    /// The group's `Condition` attribute, if any.
    pub condition: Option<String>,
    /// Recognized dependency items in document order.
    pub items: Vec<DependencyItem>,
}

/// An `<Sdk Name="..." Version="..."/>` element import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkImport {
    /// SDK name.
    pub name: String,
    /// SDK version, if pinned.
    pub version: Option<String>,
}

/// The parse of one build file. Built once per file and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDocument {
    /// Workspace-relative path of the parsed file.
    pub path: PathBuf,
    /// The root element's `Sdk` attribute, if any. Implies a synthetic
    /// MSBuildSdk dependency with no version.
    pub sdk: Option<String>,
    /// `<Sdk>` element imports declared in the file.
    pub sdk_imports: Vec<SdkImport>,
    /// Property groups in document order.
    pub property_groups: Vec<PropertyGroup>,
    /// Item groups in document order.
    pub item_groups: Vec<ItemGroup>,
    /// `<ProjectReference>` Include values in document order.
    pub referenced_projects: Vec<String>,
}

fn parse_error(path: &Path, message: impl ToString) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Reads one attribute by case-insensitive local name.
fn attr(start: &BytesStart<'_>, name: &str, path: &Path) -> Result<Option<String>> {
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| parse_error(path, e))?;
        let key = attribute.key.local_name();
        let Ok(key) = std::str::from_utf8(key.as_ref()) else {
            continue;
        };
        if key.eq_ignore_ascii_case(name) {
            let value = attribute
                .unescape_value()
                .map_err(|e| parse_error(path, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn item_kind(local: &str) -> Option<ItemKind> {
    match local {
        "PackageReference" => Some(ItemKind::PackageReference),
        "PackageVersion" => Some(ItemKind::PackageVersion),
        "GlobalPackageReference" => Some(ItemKind::GlobalPackageReference),
        _ => None,
    }
}

/// Single-pass parser state. `*_depth` fields record the stack height at
/// which the open construct started, so End events close the right thing.
#[derive(Default)]
struct DocumentBuilder {
    doc: ProjectDocument,
    stack: Vec<String>,
    saw_root: bool,
    property_group: Option<PropertyGroup>,
    property: Option<(String, String, usize)>,
    item_group: Option<ItemGroup>,
    item: Option<(DependencyItem, usize)>,
    item_child: Option<(String, String, usize)>,
    group_depth: usize,
}

impl DocumentBuilder {
    fn open(&mut self, start: &BytesStart<'_>, path: &Path, self_closing: bool) -> Result<()> {
        let local = std::str::from_utf8(start.local_name().as_ref())
            .map_err(|e| parse_error(path, e))?
            .to_string();
        let depth = self.stack.len();

        if depth == 0 {
            self.saw_root = true;
            self.doc.sdk = attr(start, "Sdk", path)?;
        } else if let Some((item, _)) = &mut self.item {
            // Child element under a dependency item; only <Version> matters.
            if self_closing {
                if local.eq_ignore_ascii_case("Version") {
                    item.version_element = Some(String::new());
                }
            } else {
                self.item_child = Some((local.clone(), String::new(), depth));
            }
        } else if self.property_group.is_some() && self.property.is_none() {
            // A direct child of a property group is a property assignment.
            if depth == self.group_depth + 1 {
                if self_closing {
                    if let Some(group) = &mut self.property_group {
                        group.properties.push((local.clone(), String::new()));
                    }
                } else {
                    self.property = Some((local.clone(), String::new(), depth));
                }
            }
        } else if self.item_group.is_some() && depth == self.group_depth + 1 {
            if let Some(kind) = item_kind(&local) {
                let item = DependencyItem {
                    kind,
                    condition: attr(start, "Condition", path)?,
                    include: attr(start, "Include", path)?,
                    update: attr(start, "Update", path)?,
                    version_attribute: attr(start, "Version", path)?,
                    version_element: None,
                };
                if self_closing {
                    if let Some(group) = &mut self.item_group {
                        group.items.push(item);
                    }
                } else {
                    self.item = Some((item, depth));
                }
            } else if local == "ProjectReference" {
                if let Some(include) = attr(start, "Include", path)? {
                    self.doc.referenced_projects.push(include);
                }
            }
            // Reference, EmbeddedResource and the rest are not dependencies.
        } else if depth == 1 {
            match local.as_str() {
                "Sdk" => {
                    if let Some(name) = attr(start, "Name", path)? {
                        let version = attr(start, "Version", path)?;
                        self.doc.sdk_imports.push(SdkImport { name, version });
                    }
                }
                "PropertyGroup" => {
                    self.property_group = Some(PropertyGroup {
                        condition: attr(start, "Condition", path)?,
                        properties: Vec::new(),
                    });
                    self.group_depth = depth;
                    if self_closing {
                        if let Some(group) = self.property_group.take() {
                            self.doc.property_groups.push(group);
                        }
                    }
                }
                "ItemGroup" => {
                    self.item_group = Some(ItemGroup {
                        condition: attr(start, "Condition", path)?,
                        items: Vec::new(),
                    });
                    self.group_depth = depth;
                    if self_closing {
                        if let Some(group) = self.item_group.take() {
                            self.doc.item_groups.push(group);
                        }
                    }
                }
                _ => {}
            }
        }

        if !self_closing {
            self.stack.push(local);
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some((_, buffer, _)) = &mut self.property {
            buffer.push_str(text);
        } else if let Some((_, buffer, _)) = &mut self.item_child {
            buffer.push_str(text);
        }
    }

    fn close(&mut self) {
        self.stack.pop();
        let depth = self.stack.len();

        if let Some((name, buffer, d)) = &self.item_child {
            if depth == *d {
                if name.eq_ignore_ascii_case("Version") {
                    if let Some((item, _)) = &mut self.item {
                        item.version_element = Some(buffer.clone());
                    }
                }
                self.item_child = None;
            }
        }
        if let Some((item, d)) = &self.item {
            if depth == *d {
                if let Some(group) = &mut self.item_group {
                    group.items.push(item.clone());
                }
                self.item = None;
            }
        }
        if let Some((name, buffer, d)) = &self.property {
            if depth == *d {
                if let Some(group) = &mut self.property_group {
                    group.properties.push((name.clone(), buffer.clone()));
                }
                self.property = None;
            }
        }
        if depth <= self.group_depth {
            if let Some(group) = self.property_group.take() {
                self.doc.property_groups.push(group);
            }
            if let Some(group) = self.item_group.take() {
                self.doc.item_groups.push(group);
            }
        }
    }
}

impl ProjectDocument {
    /// Parses one build file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed XML - fatal for this file
    /// (and any project importing it) only, never for sibling projects.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let mut reader = Reader::from_str(contents);
        reader.config_mut().trim_text(true);

        let mut builder = DocumentBuilder {
            doc: Self {
                path: path.to_path_buf(),
                ..Self::default()
            },
            ..DocumentBuilder::default()
        };

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => builder.open(e, path, false)?,
                Ok(Event::Empty(ref e)) => builder.open(e, path, true)?,
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|err| parse_error(path, err))?;
                    builder.text(&text);
                }
                Ok(Event::End(_)) => builder.close(),
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(parse_error(
                        path,
                        format!("{err} at position {}", reader.buffer_position()),
                    ));
                }
            }
        }

        if !builder.saw_root {
            return Err(parse_error(path, "missing root element"));
        }
        if !builder.stack.is_empty() {
            return Err(parse_error(path, "unexpected end of file"));
        }
        Ok(builder.doc)
    }
}
