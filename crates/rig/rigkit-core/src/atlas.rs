//! Texture atlas model and the line-oriented atlas document parser.
//!
//! Grammar (blank lines ignored, every line trimmed):
//!
//! ```text
//! hero.png
//! size: 1024,512
//! filter: Linear,Linear
//! pma: true
//! head
//! bounds: 2,2,120,96
//! offsets: 0,0,124,100
//! rotate: 90
//! ...
//! ```
//!
//! The header is four lines. Each sprite record is a name line, a `bounds:` line,
//! an `offsets:` line and an optional `rotate:` line whose presence alone marks the
//! sprite as rotated. Parsing is all-or-nothing.

use std::str::FromStr;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, AtlasSection, LookupError, RectParseError, SpriteField};
use crate::ids::SpriteId;

/// Axis-aligned integer rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

}

impl FromStr for Rect {
    type Err = RectParseError;

    /// Parses `x,y,width,height`; whitespace around fields is tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(',').collect();
        if parts.len() != 4 {
            return Err(RectParseError::FieldCount { found: parts.len() });
        }
        let mut fields = [0i32; 4];
        for (index, (slot, raw)) in fields.iter_mut().zip(&parts).enumerate() {
            let raw = raw.trim();
            *slot = raw.parse().map_err(|_| RectParseError::NotAnInteger {
                index,
                value: raw.to_string(),
            })?;
        }
        let [x, y, width, height] = fields;
        Ok(Self::new(x, y, width, height))
    }
}

/// A named region of the atlas image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub name: String,
    /// Region inside the atlas image, as stored.
    pub bounds: Rect,
    /// Original (pre-trim) offset and size.
    pub offsets: Rect,
    /// Pixel data is stored rotated 90° relative to its logical orientation.
    pub rotated: bool,
}

impl Sprite {
    /// Rectangle to sample from the atlas image.
    ///
    /// Rotated sprites swap width and height relative to the stored bounds.
    pub fn source_rect(&self) -> Rect {
        let b = self.bounds;
        if self.rotated {
            Rect::new(b.x, b.y, b.height, b.width)
        } else {
            b
        }
    }
}

/// Parsed atlas document. Immutable once built.
#[derive(Clone, Debug, Serialize)]
pub struct Atlas {
    pub image_name: String,
    pub width: u32,
    pub height: u32,
    pub filter_min: String,
    pub filter_mag: String,
    pub premultiplied_alpha: bool,
    sprites: Vec<Sprite>,
    #[serde(skip)]
    index: HashMap<String, SpriteId>,
}

impl PartialEq for Atlas {
    fn eq(&self, other: &Self) -> bool {
        self.image_name == other.image_name
            && self.width == other.width
            && self.height == other.height
            && self.filter_min == other.filter_min
            && self.filter_mag == other.filter_mag
            && self.premultiplied_alpha == other.premultiplied_alpha
            && self.sprites == other.sprites
    }
}

impl Atlas {
    /// Sprites in declaration order.
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sprites.iter().map(|s| s.name.as_str())
    }

    pub fn sprite_id(&self, name: &str) -> Option<SpriteId> {
        self.index.get(name).copied()
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id.index())
    }

    /// Look up a sprite by name. When a name is declared twice the first record wins.
    pub fn find_sprite(&self, name: &str) -> Result<&Sprite, LookupError> {
        self.sprite_id(name)
            .and_then(|id| self.sprite(id))
            .ok_or_else(|| LookupError::SpriteNotFound {
                name: name.to_string(),
            })
    }

    fn from_sprites(header: Header, sprites: Vec<Sprite>) -> Self {
        let mut index = HashMap::with_capacity(sprites.len());
        for (i, sprite) in sprites.iter().enumerate() {
            index
                .entry(sprite.name.clone())
                .or_insert(SpriteId::from_index(i));
        }
        Self {
            image_name: header.image_name,
            width: header.width,
            height: header.height,
            filter_min: header.filter_min,
            filter_mag: header.filter_mag,
            premultiplied_alpha: header.premultiplied_alpha,
            sprites,
            index,
        }
    }
}

impl FromStr for Atlas {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_atlas(s)
    }
}

struct Header {
    image_name: String,
    width: u32,
    height: u32,
    filter_min: String,
    filter_mag: String,
    premultiplied_alpha: bool,
}

const HEADER_LINES: usize = 4;

/// Parse an atlas document.
pub fn parse_atlas(text: &str) -> Result<Atlas, AtlasError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let header = parse_header(&lines)?;

    let mut sprites = Vec::new();
    let mut i = HEADER_LINES;
    while i < lines.len() {
        let name = lines[i];
        i += 1;
        let bounds = sprite_rect(&lines, i, name, SpriteField::Bounds)?;
        i += 1;
        let offsets = sprite_rect(&lines, i, name, SpriteField::Offsets)?;
        i += 1;
        let rotated = lines
            .get(i)
            .is_some_and(|line| line.starts_with("rotate:"));
        if rotated {
            i += 1;
        }
        sprites.push(Sprite {
            name: name.to_string(),
            bounds,
            offsets,
            rotated,
        });
    }

    Ok(Atlas::from_sprites(header, sprites))
}

fn parse_header(lines: &[&str]) -> Result<Header, AtlasError> {
    let image_name = lines.first().ok_or(AtlasError::Empty)?.to_string();

    let size = section_value(lines, 1, AtlasSection::Size)?;
    let (width, height) = parse_size(size).ok_or_else(|| AtlasError::MalformedSection {
        section: AtlasSection::Size,
        line: lines[1].to_string(),
    })?;

    let filter = section_value(lines, 2, AtlasSection::Filter)?;
    let filter_parts: Vec<&str> = filter.split(',').map(str::trim).collect();
    let (filter_min, filter_mag) = match filter_parts.as_slice() {
        [min] => (min.to_string(), String::new()),
        [min, mag] => (min.to_string(), mag.to_string()),
        // Anything else is kept whole as the min filter.
        _ => (filter.trim().to_string(), String::new()),
    };

    let pma = section_value(lines, 3, AtlasSection::Pma)?;

    Ok(Header {
        image_name,
        width,
        height,
        filter_min,
        filter_mag,
        premultiplied_alpha: pma == "true",
    })
}

/// Value after the `section:` prefix on header line `at`.
fn section_value<'a>(
    lines: &[&'a str],
    at: usize,
    section: AtlasSection,
) -> Result<&'a str, AtlasError> {
    lines
        .get(at)
        .and_then(|line| line.strip_prefix(section.prefix()))
        .map(str::trim)
        .ok_or(AtlasError::MissingSection { section })
}

fn parse_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once(',')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

fn sprite_rect(
    lines: &[&str],
    at: usize,
    sprite: &str,
    field: SpriteField,
) -> Result<Rect, AtlasError> {
    let value = lines
        .get(at)
        .and_then(|line| line.strip_prefix(field.prefix()))
        .ok_or_else(|| AtlasError::MissingSpriteField {
            sprite: sprite.to_string(),
            field,
        })?;
    value
        .parse()
        .map_err(|source| AtlasError::MalformedSpriteRect {
            sprite: sprite.to_string(),
            field,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "hero.png\nsize: 256,128\nfilter: Linear,Nearest\npma: true\n";

    #[test]
    fn rect_tolerates_whitespace() {
        let r: Rect = " 1, 2, 3, 4 ".parse().unwrap();
        assert_eq!(r, Rect::new(1, 2, 3, 4));
    }

    #[test]
    fn rect_rejects_wrong_arity_and_non_integers() {
        assert_eq!(
            "1,2,3".parse::<Rect>(),
            Err(RectParseError::FieldCount { found: 3 })
        );
        assert_eq!(
            "1,x,3,4".parse::<Rect>(),
            Err(RectParseError::NotAnInteger {
                index: 1,
                value: "x".into()
            })
        );
        assert!("1,2,3,4,5".parse::<Rect>().is_err());
        assert!("1.5,2,3,4".parse::<Rect>().is_err());
    }

    #[test]
    fn header_fields_are_parsed() {
        let atlas = parse_atlas(HEADER).unwrap();
        assert_eq!(atlas.image_name, "hero.png");
        assert_eq!((atlas.width, atlas.height), (256, 128));
        assert_eq!(atlas.filter_min, "Linear");
        assert_eq!(atlas.filter_mag, "Nearest");
        assert!(atlas.premultiplied_alpha);
        assert!(atlas.sprites().is_empty());
    }

    #[test]
    fn filter_without_comma_leaves_mag_empty() {
        let atlas = parse_atlas("a.png\nsize: 1,1\nfilter: Linear\npma: false\n").unwrap();
        assert_eq!(atlas.filter_min, "Linear");
        assert_eq!(atlas.filter_mag, "");
    }

    #[test]
    fn filter_with_extra_fields_is_kept_whole() {
        let atlas =
            parse_atlas("a.png\nsize: 4,4\nfilter: Linear,Linear,Nearest\npma: true\n").unwrap();
        assert_eq!(atlas.filter_min, "Linear,Linear,Nearest");
        assert_eq!(atlas.filter_mag, "");
        assert!(atlas.premultiplied_alpha);
    }

    #[test]
    fn unknown_pma_token_means_false() {
        let atlas = parse_atlas("a.png\nsize: 1,1\nfilter: Linear,Linear\npma: yes\n").unwrap();
        assert!(!atlas.premultiplied_alpha);
    }

    #[test]
    fn blank_lines_and_indentation_are_ignored() {
        let text = "\n  a.png\n\n size: 8, 8 \nfilter: Linear,Linear\n\npma: false\n\n  dot\n   bounds: 0, 0, 2, 2\n   offsets: 0,0,2,2\n";
        let atlas = parse_atlas(text).unwrap();
        let dot = atlas.find_sprite("dot").unwrap();
        assert_eq!(dot.bounds, Rect::new(0, 0, 2, 2));
        assert!(!dot.rotated);
    }

    #[test]
    fn missing_header_sections_are_named() {
        assert_eq!(parse_atlas("   \n\n"), Err(AtlasError::Empty));
        assert_eq!(
            parse_atlas("a.png\nfilter: Linear,Linear\npma: true\n"),
            Err(AtlasError::MissingSection {
                section: AtlasSection::Size
            })
        );
        assert_eq!(
            parse_atlas("a.png\nsize: 4,4\nfilter: Linear,Linear\n"),
            Err(AtlasError::MissingSection {
                section: AtlasSection::Pma
            })
        );
    }

    #[test]
    fn malformed_size_is_rejected() {
        let err = parse_atlas("a.png\nsize: 4\nfilter: Linear,Linear\npma: true\n").unwrap_err();
        assert!(matches!(
            err,
            AtlasError::MalformedSection {
                section: AtlasSection::Size,
                ..
            }
        ));
        let err = parse_atlas("a.png\nsize: 4,x\nfilter: Linear,Linear\npma: true\n").unwrap_err();
        assert!(matches!(err, AtlasError::MalformedSection { .. }));
    }

    #[test]
    fn rotate_line_presence_marks_sprite_rotated() {
        let text = format!(
            "{HEADER}arm\nbounds: 10,20,30,40\noffsets: 1,2,32,44\nrotate: 90\nleg\nbounds: 0,0,5,6\noffsets: 0,0,5,6\n"
        );
        let atlas = parse_atlas(&text).unwrap();
        let arm = atlas.find_sprite("arm").unwrap();
        assert!(arm.rotated);
        assert_eq!(arm.offsets, Rect::new(1, 2, 32, 44));
        assert_eq!(arm.source_rect(), Rect::new(10, 20, 40, 30));
        let leg = atlas.find_sprite("leg").unwrap();
        assert!(!leg.rotated);
        assert_eq!(leg.source_rect(), leg.bounds);
        assert_eq!(atlas.sprite_names().collect::<Vec<_>>(), vec!["arm", "leg"]);
    }

    #[test]
    fn sprite_missing_offsets_names_the_sprite() {
        let text = format!("{HEADER}arm\nbounds: 10,20,30,40\nleg\n");
        assert_eq!(
            parse_atlas(&text),
            Err(AtlasError::MissingSpriteField {
                sprite: "arm".into(),
                field: SpriteField::Offsets
            })
        );
    }

    #[test]
    fn sprite_with_bad_rect_fails_whole_parse() {
        let text = format!("{HEADER}ok\nbounds: 0,0,1,1\noffsets: 0,0,1,1\nbad\nbounds: 0,0,1\noffsets: 0,0,1,1\n");
        match parse_atlas(&text) {
            Err(AtlasError::MalformedSpriteRect { sprite, field, .. }) => {
                assert_eq!(sprite, "bad");
                assert_eq!(field, SpriteField::Bounds);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_sprite_is_a_lookup_error() {
        let atlas = parse_atlas(HEADER).unwrap();
        assert_eq!(
            atlas.find_sprite("ghost"),
            Err(LookupError::SpriteNotFound {
                name: "ghost".into()
            })
        );
    }

    #[test]
    fn first_declaration_wins_on_duplicate_names() {
        let text = format!(
            "{HEADER}dup\nbounds: 1,1,1,1\noffsets: 0,0,1,1\ndup\nbounds: 9,9,9,9\noffsets: 0,0,9,9\n"
        );
        let atlas = parse_atlas(&text).unwrap();
        assert_eq!(atlas.sprites().len(), 2);
        assert_eq!(atlas.find_sprite("dup").unwrap().bounds, Rect::new(1, 1, 1, 1));
    }
}
