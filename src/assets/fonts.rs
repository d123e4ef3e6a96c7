//! Font discovery for the raster text shaper and SVG image sources.

use std::path::Path;
use std::sync::Arc;

use usvg::fontdb;

use crate::page::model::FontStyle;

/// Environment variable naming an extra directory of `.ttf` / `.otf` / `.ttc` files.
pub const FONT_DIR_ENV: &str = "PAGEVIS_FONT_DIR";

/// A font face selected for a CSS family list.
#[derive(Clone, Debug)]
pub struct ResolvedFace {
    /// Raw font file bytes.
    pub data: Arc<Vec<u8>>,
    /// Face index within a collection file.
    pub index: u32,
    /// Primary family name of the face.
    pub family: String,
}

/// Shared font database.
#[derive(Clone, Debug)]
pub struct FontLibrary {
    db: Arc<fontdb::Database>,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::system()
    }
}

impl FontLibrary {
    /// Library without any faces. Text measurement falls back to the approximation.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }

    /// System fonts plus the directory named by [`FONT_DIR_ENV`], if set.
    pub fn system() -> Self {
        Self::with_dirs(std::iter::empty::<&Path>())
    }

    /// System fonts, `dirs`, and the directory named by [`FONT_DIR_ENV`].
    pub fn with_dirs<P: AsRef<Path>>(dirs: impl IntoIterator<Item = P>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir.as_ref());
        }
        if let Some(dir) = std::env::var_os(FONT_DIR_ENV) {
            load_fonts_from_dir(&mut db, Path::new(&dir));
        }
        tracing::debug!(faces = db.len(), "font library loaded");
        Self { db: Arc::new(db) }
    }

    /// Add a font file held in memory.
    pub fn add_font_data(&mut self, data: Vec<u8>) {
        Arc::make_mut(&mut self.db).load_font_data(data);
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// `true` when no faces are loaded.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Underlying database.
    pub fn database(&self) -> &Arc<fontdb::Database> {
        &self.db
    }

    /// Pick a face for a CSS `font-family` list.
    ///
    /// Falls back to sans-serif, serif, monospace and finally the first loaded face.
    pub fn resolve(&self, families: &str, weight: u16, style: FontStyle) -> Option<ResolvedFace> {
        let names = parse_family_list(families);
        let mut query_families: Vec<fontdb::Family<'_>> =
            names.iter().map(|n| generic_or_named(n)).collect();
        query_families.push(fontdb::Family::SansSerif);
        query_families.push(fontdb::Family::Serif);
        query_families.push(fontdb::Family::Monospace);

        let query = fontdb::Query {
            families: &query_families,
            weight: fontdb::Weight(weight),
            stretch: fontdb::Stretch::Normal,
            style: match style {
                FontStyle::Normal => fontdb::Style::Normal,
                FontStyle::Italic => fontdb::Style::Italic,
                FontStyle::Oblique => fontdb::Style::Oblique,
            },
        };

        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;
        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;
        Some(ResolvedFace {
            data: Arc::new(data),
            index,
            family,
        })
    }
}

/// Split a CSS family list, trimming whitespace and quotes.
pub fn parse_family_list(families: &str) -> Vec<String> {
    families
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

fn generic_or_named(name: &str) -> fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sans-serif" => fontdb::Family::SansSerif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        _ => fontdb::Family::Name(name),
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to load font file");
        }
    }
}
