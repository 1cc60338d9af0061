//! Object file parsing and DWARF section loading.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{Dwarf, EndianArcSlice, RunTimeEndian, SectionId};
use object::{Object, ObjectSection};
use once_cell::sync::OnceCell;

use super::{OwnedDwarf, OwnedReader};
use crate::error::{DecodeError, DecodeResult};
use crate::types::{ByteOrder, PointerWidth};

/// Sections type extraction reads, with their Mach-O spellings
const DWARF_SECTIONS: &[(&str, &[&str])] = &[
    (".debug_abbrev", &[".debug_abbrev", "__debug_abbrev"]),
    (".debug_addr", &[".debug_addr", "__debug_addr"]),
    (".debug_info", &[".debug_info", "__debug_info"]),
    (".debug_line_str", &[".debug_line_str", "__debug_line_str"]),
    (".debug_str", &[".debug_str", "__debug_str"]),
    (".debug_str_offsets", &[".debug_str_offsets", "__debug_str_offsets"]),
    (".debug_types", &[".debug_types", "__debug_types"]),
];

fn load_section_bytes(file: &object::File<'_>, names: &[&str]) -> DecodeResult<Option<Arc<[u8]>>>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section
                .uncompressed_data()
                .map_err(|err| DecodeError::InvalidArgument(format!("failed to read {name}: {err}")))?;
            return Ok(Some(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes),
                Cow::Owned(vec) => vec.into(),
            }));
        }
    }

    Ok(None)
}

/// A binary's debug sections, kept in memory for type extraction
pub struct DebugImage
{
    path: PathBuf,
    endian: RunTimeEndian,
    pointer_width: PointerWidth,
    debug_sections: HashMap<&'static str, Arc<[u8]>>,
    dwarf_cache: OnceCell<OwnedDwarf>,
}

impl DebugImage
{
    /// Read and parse the object file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DecodeResult<Self>
    {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        Self::parse(path.to_path_buf(), &bytes)
    }

    /// Parse an object file already in memory; `path` is only used for
    /// messages.
    pub fn parse(path: PathBuf, bytes: &[u8]) -> DecodeResult<Self>
    {
        let file = object::File::parse(bytes)
            .map_err(|err| DecodeError::InvalidArgument(format!("failed to parse {}: {err}", path.display())))?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };
        let pointer_width = if file.is_64() {
            PointerWidth::Bits64
        } else {
            PointerWidth::Bits32
        };

        let mut debug_sections = HashMap::new();
        for (canonical, aliases) in DWARF_SECTIONS {
            if let Some(data) = load_section_bytes(&file, aliases)? {
                debug_sections.insert(*canonical, data);
            }
        }
        if !debug_sections.contains_key(".debug_info") {
            return Err(DecodeError::InvalidArgument(format!(
                "{} has no .debug_info section",
                path.display()
            )));
        }

        tracing::debug!(
            path = %path.display(),
            sections = debug_sections.len(),
            pointer_width = pointer_width.bytes(),
            "loaded debug sections"
        );

        Ok(Self {
            path,
            endian,
            pointer_width,
            debug_sections,
            dwarf_cache: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    pub fn byte_order(&self) -> ByteOrder
    {
        match self.endian {
            RunTimeEndian::Little => ByteOrder::Little,
            RunTimeEndian::Big => ByteOrder::Big,
        }
    }

    pub fn pointer_width(&self) -> PointerWidth
    {
        self.pointer_width
    }

    pub(crate) fn dwarf(&self) -> DecodeResult<&OwnedDwarf>
    {
        self.dwarf_cache.get_or_try_init(|| {
            Dwarf::load(|section| Ok::<_, gimli::Error>(self.section_reader(section)))
                .map_err(|err| DecodeError::InvalidArgument(format!("failed to load DWARF: {err}")))
        })
    }

    fn section_reader(&self, id: SectionId) -> OwnedReader
    {
        let data = self
            .debug_sections
            .get(id.name())
            .cloned()
            .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
        EndianArcSlice::new(data, self.endian)
    }
}
