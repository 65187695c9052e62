//! Font loading for rasterized text
//!
//! A configured font file wins. Otherwise the system font database is asked
//! for a common sans-serif family, and when nothing installed matches the
//! DejaVu Sans faces bundled with the binary are used.

use std::path::Path;

use ab_glyph::{FontArc, FontVec};
use fontdb::{Database, Family, Query, Weight};
use tracing::{debug, warn};

use crate::error::ExportError;

static EMBEDDED_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static EMBEDDED_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Families asked for, in order, before the generic sans-serif.
const PREFERRED_FAMILIES: &[&str] = &[
    "Inter",
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
    "Helvetica",
];

/// The two faces used when rasterizing a card.
#[derive(Clone)]
pub struct Fonts {
    regular: FontArc,
    bold: FontArc,
}

impl std::fmt::Debug for Fonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fonts").finish_non_exhaustive()
    }
}

impl Fonts {
    /// Build from raw font files. Without a bold face the regular one is used.
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self, ExportError> {
        let regular = FontArc::try_from_vec(regular).map_err(|_| ExportError::FontUnavailable)?;
        let bold = match bold {
            Some(bytes) => FontArc::try_from_vec(bytes).map_err(|_| ExportError::FontUnavailable)?,
            None => regular.clone(),
        };
        Ok(Self { regular, bold })
    }

    /// The DejaVu Sans pair compiled into the binary.
    pub fn embedded() -> Result<Self, ExportError> {
        let regular =
            FontArc::try_from_slice(EMBEDDED_REGULAR).map_err(|_| ExportError::FontUnavailable)?;
        let bold =
            FontArc::try_from_slice(EMBEDDED_BOLD).map_err(|_| ExportError::FontUnavailable)?;
        Ok(Self { regular, bold })
    }

    /// Configured fonts first, then an installed family, then the bundled pair.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self, ExportError> {
        if let Some(path) = regular {
            match read_font(path).map(|bytes| Self::from_bytes(bytes, bold.and_then(read_font))) {
                Some(Ok(fonts)) => return Ok(fonts),
                Some(Err(_)) => warn!(path = %path.display(), "configured font failed to parse"),
                None => warn!(path = %path.display(), "configured font not readable"),
            }
        }
        match Self::discover() {
            Ok(fonts) => Ok(fonts),
            Err(_) => {
                debug!("no system font matched, using the bundled DejaVu Sans");
                Self::embedded()
            }
        }
    }

    /// Query the system font database for a sans-serif regular/bold pair.
    pub fn discover() -> Result<Self, ExportError> {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::from_database(&db)
    }

    fn from_database(db: &Database) -> Result<Self, ExportError> {
        let mut families: Vec<Family> = PREFERRED_FAMILIES.iter().copied().map(Family::Name).collect();
        families.push(Family::SansSerif);

        let regular = query_face(db, &families, Weight::NORMAL).ok_or(ExportError::FontUnavailable)?;
        let bold = query_face(db, &families, Weight::BOLD).unwrap_or_else(|| regular.clone());
        Ok(Self { regular, bold })
    }

    pub fn bold(&self) -> &FontArc {
        &self.bold
    }

    pub fn face(&self, bold: bool) -> &FontArc {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }
}

fn query_face(db: &Database, families: &[Family], weight: Weight) -> Option<FontArc> {
    let id = db.query(&Query {
        families,
        weight,
        ..Query::default()
    })?;
    if let Some(face) = db.face(id) {
        debug!(font = %face.post_script_name, weight = weight.0, "using system font");
    }
    let font = db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index)
    })?;
    match font {
        Ok(font) => Some(FontArc::new(font)),
        Err(_) => {
            warn!(weight = weight.0, "system font failed to parse");
            None
        }
    }
}

fn read_font(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(path = %path.display(), "failed to read font: {e}");
            None
        }
    }
}
