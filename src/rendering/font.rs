//! Font specification strings and font face loading

use std::fmt;

/// A canvas-style font specification: `"<style> <weight> <size>px <family>"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub italic: bool,
    pub weight: u16,
    pub size_px: f32,
    pub family: String,
}

impl FontSpec {
    pub fn new(italic: bool, weight: u16, size_px: f32, family: impl Into<String>) -> Self {
        Self {
            italic,
            weight,
            size_px,
            family: family.into(),
        }
    }

    /// Family names from the CSS-style family list, unquoted, in order.
    pub fn families(&self) -> Vec<&str> {
        self.family
            .split(',')
            .map(|name| name.trim().trim_matches(&['"', '\''][..]))
            .filter(|name| !name.is_empty())
            .collect()
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(false, 400, 10.0, "sans-serif")
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = if self.italic { "italic" } else { "normal" };
        write!(f, "{} {} {}px {}", style, self.weight, self.size_px, self.family)
    }
}

#[cfg(feature = "raster")]
pub use face::{FontBook, FontFace, FONT_ENV};

#[cfg(feature = "raster")]
mod face {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
    use fontdb::{Database, Family, Query, Stretch, Style, Weight, ID};

    use super::FontSpec;
    use crate::{Error, Result};

    /// Environment variable naming a TTF/OTF file preferred for text.
    pub const FONT_ENV: &str = "LIFEGRID_FONT";

    const SANS_SERIF: &[&str] = &[
        "Arial",
        "Helvetica",
        "DejaVu Sans",
        "Liberation Sans",
        "Noto Sans",
        "Roboto",
        "Segoe UI",
    ];
    const SERIF: &[&str] = &[
        "Times New Roman",
        "Times",
        "DejaVu Serif",
        "Liberation Serif",
        "Noto Serif",
    ];
    const MONOSPACE: &[&str] = &[
        "Courier New",
        "Menlo",
        "DejaVu Sans Mono",
        "Liberation Mono",
        "Noto Sans Mono",
    ];

    /// One outline face, ready for glyph layout.
    pub struct FontFace {
        font: FontVec,
        name: String,
    }

    impl std::fmt::Debug for FontFace {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("FontFace")
                .field("name", &self.name)
                .field("glyphs", &self.font.glyph_count())
                .finish()
        }
    }

    impl FontFace {
        pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
            Self::from_collection(data, 0, String::new())
        }

        /// Face `index` of a font file or collection.
        pub fn from_collection(data: Vec<u8>, index: u32, name: String) -> Result<Self> {
            let font = FontVec::try_from_vec_and_index(data, index)
                .map_err(|e| Error::FontError(format!("invalid font data: {}", e)))?;
            Ok(Self { font, name })
        }

        /// PostScript name, when the face came from a [`FontBook`].
        pub fn name(&self) -> &str {
            &self.name
        }

        pub(crate) fn font(&self) -> &FontVec {
            &self.font
        }

        /// Scale at which one em spans `px` pixels.
        pub fn em_scale(&self, px: f32) -> PxScale {
            let upem = self.font.units_per_em().unwrap_or(1000.0);
            PxScale::from(px * self.font.height_unscaled() / upem)
        }

        /// Advance width of `text` at an em size of `px`, including kerning.
        pub fn measure(&self, text: &str, px: f32) -> f32 {
            let scaled = self.font.as_scaled(self.em_scale(px));
            let mut width = 0.0;
            let mut prev = None;
            for c in text.chars() {
                let id = scaled.glyph_id(c);
                if let Some(p) = prev {
                    width += scaled.kern(p, id);
                }
                width += scaled.h_advance(id);
                prev = Some(id);
            }
            width
        }
    }

    /// A database of installed and user-supplied faces.
    ///
    /// [`FontBook::resolve`] matches a [`FontSpec`] by family list, weight
    /// and style. Parsed faces are cached per database id, so a book can be
    /// shared between threads and renders.
    pub struct FontBook {
        db: Database,
        loaded: Mutex<HashMap<ID, Arc<FontFace>>>,
    }

    impl std::fmt::Debug for FontBook {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("FontBook")
                .field("faces", &self.db.len())
                .finish()
        }
    }

    impl Default for FontBook {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FontBook {
        /// An empty book; nothing resolves until faces are added.
        pub fn new() -> Self {
            Self {
                db: Database::new(),
                loaded: Mutex::new(HashMap::new()),
            }
        }

        /// Installed system fonts, with generic families mapped to common
        /// installed faces.
        pub fn system() -> Self {
            let mut book = Self::new();
            book.db.load_system_fonts();
            book.map_generic_families();
            log::debug!("loaded {} system font faces", book.db.len());
            book
        }

        /// System fonts plus a preferred file: `path` when given, else
        /// `$LIFEGRID_FONT`. A bad `path` is an error; a bad environment
        /// value only logs a warning.
        pub fn discover(path: Option<&Path>) -> Result<Self> {
            let mut book = Self::system();
            match path {
                Some(path) => book.add_file(path)?,
                None => {
                    if let Some(env) = std::env::var_os(FONT_ENV) {
                        if let Err(e) = book.add_file(Path::new(&env)) {
                            log::warn!("ignoring {}: {}", FONT_ENV, e);
                        }
                    }
                }
            }
            if book.is_empty() {
                log::warn!("no font faces found; text will be skipped");
            }
            Ok(book)
        }

        pub fn len(&self) -> usize {
            self.db.len()
        }

        pub fn is_empty(&self) -> bool {
            self.db.is_empty()
        }

        /// Load a TTF/OTF/TTC file and make its family the default for
        /// every generic family.
        pub fn add_file(&mut self, path: &Path) -> Result<()> {
            let before = self.db.len();
            self.db
                .load_font_file(path)
                .map_err(|e| Error::FontError(format!("{}: {}", path.display(), e)))?;
            self.prefer_added(before, &path.display().to_string())
        }

        /// In-memory counterpart of [`FontBook::add_file`].
        pub fn add_data(&mut self, data: Vec<u8>) -> Result<()> {
            let before = self.db.len();
            self.db.load_font_data(data);
            self.prefer_added(before, "font data")
        }

        fn prefer_added(&mut self, before: usize, source: &str) -> Result<()> {
            let family = self
                .db
                .faces()
                .skip(before)
                .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
                .ok_or_else(|| Error::FontError(format!("{}: no usable font faces", source)))?;
            log::debug!("preferring {:?} from {}", family, source);
            self.db.set_sans_serif_family(family.clone());
            self.db.set_serif_family(family.clone());
            self.db.set_monospace_family(family.clone());
            self.db.set_cursive_family(family.clone());
            self.db.set_fantasy_family(family);
            Ok(())
        }

        fn map_generic_families(&mut self) {
            let installed = |candidates: &[&str]| -> Option<String> {
                candidates
                    .iter()
                    .find(|name| {
                        self.db
                            .faces()
                            .any(|face| face.families.iter().any(|(f, _)| f == *name))
                    })
                    .map(|name| name.to_string())
            };
            let sans = installed(SANS_SERIF);
            let serif = installed(SERIF);
            let mono = installed(MONOSPACE);
            if let Some(name) = sans {
                self.db.set_sans_serif_family(name);
            }
            if let Some(name) = serif {
                self.db.set_serif_family(name);
            }
            if let Some(name) = mono {
                self.db.set_monospace_family(name);
            }
        }

        /// Database id of the face that best matches `spec`: the first
        /// family in its list that is installed, then sans-serif, then any
        /// face at all. Weight and italic are matched within the family.
        pub fn resolve_id(&self, spec: &FontSpec) -> Option<ID> {
            let mut families: Vec<Family<'_>> =
                spec.families().into_iter().map(generic_or_named).collect();
            families.push(Family::SansSerif);
            let query = Query {
                families: &families,
                weight: Weight(spec.weight),
                stretch: Stretch::Normal,
                style: if spec.italic { Style::Italic } else { Style::Normal },
            };
            self.db
                .query(&query)
                .or_else(|| self.db.faces().next().map(|face| face.id))
        }

        /// The parsed face for `spec`, loading it on first use.
        pub fn resolve(&self, spec: &FontSpec) -> Option<Arc<FontFace>> {
            let id = self.resolve_id(spec)?;
            let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(face) = loaded.get(&id) {
                return Some(Arc::clone(face));
            }
            let name = self
                .db
                .face(id)
                .map(|info| info.post_script_name.clone())
                .unwrap_or_default();
            let parsed = self
                .db
                .with_face_data(id, |data, index| {
                    FontFace::from_collection(data.to_vec(), index, name)
                })?;
            match parsed {
                Ok(face) => {
                    log::debug!("loaded face {} for {}", face.name(), spec);
                    let face = Arc::new(face);
                    loaded.insert(id, Arc::clone(&face));
                    Some(face)
                }
                Err(e) => {
                    log::warn!("cannot use face for {}: {}", spec, e);
                    None
                }
            }
        }
    }

    fn generic_or_named(name: &str) -> Family<'_> {
        match name.to_ascii_lowercase().as_str() {
            "serif" | "ui-serif" => Family::Serif,
            "sans-serif" | "system-ui" | "ui-sans-serif" | "-apple-system" => Family::SansSerif,
            "monospace" | "ui-monospace" => Family::Monospace,
            "cursive" => Family::Cursive,
            "fantasy" => Family::Fantasy,
            _ => Family::Name(name),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn rejects_garbage_font_data() {
            let err = FontFace::from_bytes(vec![0u8; 16]).unwrap_err();
            assert!(matches!(err, Error::FontError(_)));

            let mut book = FontBook::new();
            let err = book.add_data(vec![0u8; 16]).unwrap_err();
            assert!(err.to_string().contains("no usable font faces"));
            assert!(book.is_empty());
        }

        #[test]
        fn missing_file_is_a_font_error() {
            let mut book = FontBook::new();
            let err = book.add_file(Path::new("/definitely/not/here.ttf")).unwrap_err();
            assert!(matches!(err, Error::FontError(_)));
            assert!(err.to_string().contains("not/here.ttf"));
        }

        #[test]
        fn empty_book_resolves_nothing() {
            let book = FontBook::new();
            assert!(book.resolve(&FontSpec::default()).is_none());
        }

        #[test]
        fn generic_names_map_to_generic_families() {
            assert_eq!(generic_or_named("Sans-Serif"), Family::SansSerif);
            assert_eq!(generic_or_named("system-ui"), Family::SansSerif);
            assert_eq!(generic_or_named("serif"), Family::Serif);
            assert_eq!(generic_or_named("Inter"), Family::Name("Inter"));
        }

        #[test]
        fn resolved_faces_are_cached() {
            let book = FontBook::system();
            let spec = FontSpec::new(false, 700, 24.0, "sans-serif");
            let Some(first) = book.resolve(&spec) else {
                println!("no system font found; skipping");
                return;
            };
            let second = book.resolve(&spec).expect("cached face");
            assert!(Arc::ptr_eq(&first, &second));
            let small = first.measure("active 27%", 14.0);
            let large = first.measure("active 27%", 28.0);
            assert!(small > 0.0);
            assert!(large > small * 1.5);
        }
    }
}
