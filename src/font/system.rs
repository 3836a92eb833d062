//! System font discovery.
//!
//! Used when a conversation names no fonts. Picks one Latin sans-serif face
//! and one face with CJK coverage from the fonts installed on the host and
//! appends them to a [`FontContext`].

use super::FontContext;
use fontdb::{Database, Family, Query, ID};

/// Sans-serif families tried after the generic family, in order.
const LATIN_FAMILIES: [&str; 6] = [
    "Helvetica Neue",
    "Arial",
    "Noto Sans",
    "Liberation Sans",
    "DejaVu Sans",
    "Segoe UI",
];

/// CJK families tried before scanning for coverage, in order.
const CJK_FAMILIES: [&str; 9] = [
    "PingFang TC",
    "Noto Sans CJK TC",
    "Noto Sans TC",
    "Source Han Sans TC",
    "Microsoft JhengHei",
    "Noto Sans CJK SC",
    "Source Han Sans SC",
    "WenQuanYi Micro Hei",
    "Droid Sans Fallback",
];

/// Probe character for CJK coverage.
const CJK_PROBE: char = '中';

/// Load the host's fonts and append a Latin and a CJK face to `ctx`.
/// Finding nothing is not an error.
pub fn register_system_faces(ctx: &mut FontContext) {
    let mut db = Database::new();
    db.load_system_fonts();
    if db.is_empty() {
        log::debug!("no system fonts found");
        return;
    }

    let mut chosen: Vec<ID> = Vec::new();

    let mut latin = vec![Family::SansSerif];
    latin.extend(LATIN_FAMILIES.iter().map(|name| Family::Name(name)));
    if let Some(id) = query(&db, &latin) {
        chosen.push(id);
    }

    let cjk: Vec<Family> = CJK_FAMILIES.iter().map(|name| Family::Name(name)).collect();
    let cjk_face = query(&db, &cjk)
        .filter(|id| has_glyph(&db, *id, CJK_PROBE))
        .or_else(|| {
            db.faces()
                .map(|face| face.id)
                .find(|id| has_glyph(&db, *id, CJK_PROBE))
        });
    if let Some(id) = cjk_face {
        if !chosen.contains(&id) {
            chosen.push(id);
        }
    }

    for id in chosen {
        let loaded = db.with_face_data(id, |data, index| ctx.register_face(data.to_vec(), index));
        match loaded {
            Some(Ok(())) => {}
            Some(Err(e)) => log::warn!("skipping system face {:?}: {}", id, e),
            None => log::warn!("system face {:?} could not be read", id),
        }
    }
}

fn query(db: &Database, families: &[Family<'_>]) -> Option<ID> {
    db.query(&Query {
        families,
        ..Query::default()
    })
}

fn has_glyph(db: &Database, id: ID, ch: char) -> bool {
    db.with_face_data(id, |data, index| {
        ttf_parser::Face::parse(data, index)
            .map(|face| face.glyph_index(ch).is_some())
            .unwrap_or(false)
    })
    .unwrap_or(false)
}
