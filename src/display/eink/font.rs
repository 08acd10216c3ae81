use fontdue::{Font, FontSettings};
use rust_fontconfig::{FcFontCache, FcFontPath, FcPattern};
use tracing::{debug, instrument};

use super::{EinkArgs, EinkError};

/// Families tried in order when no font is asked for.
///
/// Serifs first: these are book quotes.
const WELL_KNOWN: [&str; 8] = [
	"DejaVu Serif",
	"Noto Serif",
	"Liberation Serif",
	"FreeSerif",
	"DejaVu Sans",
	"Noto Sans",
	"Liberation Sans",
	"FreeSans",
];

#[instrument(level = "debug", skip_all)]
pub fn load(args: &EinkArgs) -> Result<Font, EinkError> {
	if let Some(path) = &args.font_file {
		debug!(?path, "loading font from file");
		let file = std::fs::read(path).map_err(|source| EinkError::FontFile {
			path: path.clone(),
			source,
		})?;
		return Font::from_bytes(file, FontSettings::default()).map_err(EinkError::Font);
	}

	let FcFontPath { path, font_index } = select(args).ok_or(EinkError::NoFont)?;
	debug!(?path, ?font_index, "loading font from system");
	let file = std::fs::read(&path).map_err(|source| EinkError::FontFile {
		path: path.clone().into(),
		source,
	})?;

	Font::from_bytes(
		file,
		FontSettings {
			collection_index: u32::try_from(font_index)
				.map_err(|_| EinkError::Font("font index too large"))?,
			..FontSettings::default()
		},
	)
	.map_err(EinkError::Font)
}

fn select(args: &EinkArgs) -> Option<FcFontPath> {
	debug!("building font cache");
	let cache = FcFontCache::build();

	if let Some(name) = &args.font_name {
		debug!(?name, "querying for a specific name");
		if let Some(font) = cache.query(&FcPattern {
			name: Some(name.clone()),
			..Default::default()
		}) {
			return Some(font.clone());
		}
	}

	let families = args.family.iter().map(String::as_str).chain(WELL_KNOWN);
	for family in families {
		debug!(?family, "querying for family");
		if let Some(font) = cache.query(&FcPattern {
			family: Some(family.to_string()),
			..Default::default()
		}) {
			debug!(?font, "found a font");
			return Some(font.clone());
		}
	}

	debug!("querying for any font at all");
	cache.query(&FcPattern::default()).cloned()
}
