//! Render-instruction composition.
//!
//! Turns slots into draw instructions (destination transform + source rectangle) in
//! slot order, which is paint order. A slot whose bone, skin attachment or sprite
//! cannot be found is left out of the frame; the rest of the frame is unaffected.

use std::f32::consts::FRAC_PI_2;

use glam::{Affine2, Vec2};

use crate::atlas::{Atlas, Rect};
use crate::data::{Skin, SlotData};
use crate::hierarchy::{BoneHierarchy, BoneState};

/// One sprite blit for the external renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawInstruction {
    pub slot: String,
    pub sprite: String,
    /// Maps source-rect-local pixels to screen space.
    pub transform: Affine2,
    /// Region of the atlas image to sample.
    pub source: Rect,
    pub rotated: bool,
}

/// Consumer of draw instructions. `image` is the atlas image name.
pub trait Renderer {
    fn draw(&mut self, image: &str, instruction: &DrawInstruction);
}

impl Renderer for Vec<DrawInstruction> {
    fn draw(&mut self, _image: &str, instruction: &DrawInstruction) {
        self.push(instruction.clone());
    }
}

/// Why a slot produced no instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Skip {
    NoAttachment,
    Bone,
    Placement,
    Sprite,
}

/// Borrowed view over everything one frame needs.
#[derive(Clone, Copy, Debug)]
pub struct Composer<'a> {
    pub hierarchy: &'a BoneHierarchy,
    pub pose: &'a BoneState,
    pub slots: &'a [SlotData],
    pub skin: Option<&'a Skin>,
    pub atlas: &'a Atlas,
}

impl<'a> Composer<'a> {
    /// Instructions for every drawable slot, in slot order.
    pub fn compose(&self, origin_x: f32, origin_y: f32) -> Vec<DrawInstruction> {
        let origin = Vec2::new(origin_x, origin_y);
        self.slots
            .iter()
            .filter_map(|slot| match self.compose_slot(slot, origin) {
                Ok(instruction) => Some(instruction),
                Err(reason) => {
                    log::trace!("slot '{}' skipped: {:?}", slot.name, reason);
                    None
                }
            })
            .collect()
    }

    fn compose_slot(&self, slot: &SlotData, origin: Vec2) -> Result<DrawInstruction, Skip> {
        let attachment_name = slot.attachment.as_deref().ok_or(Skip::NoAttachment)?;
        let world = self
            .hierarchy
            .resolve(&slot.bone, self.pose)
            .map_err(|_| Skip::Bone)?;
        let placement = self
            .skin
            .and_then(|skin| skin.attachment(&slot.name, attachment_name))
            .ok_or(Skip::Placement)?;
        let sprite = self
            .atlas
            .find_sprite(attachment_name)
            .map_err(|_| Skip::Sprite)?;

        // Applied right to left: center on the trim box, undo atlas rotation,
        // rotate by bone + attachment, then move into place.
        let center = Vec2::new(
            -(sprite.offsets.width as f32) / 2.0,
            -(sprite.offsets.height as f32) / 2.0,
        );
        let mut transform = Affine2::from_translation(center);
        if sprite.rotated {
            transform = Affine2::from_angle(FRAC_PI_2) * transform;
        }
        transform = Affine2::from_angle((world.rotation + placement.rotation).to_radians()) * transform;
        let position = origin + Vec2::new(world.x + placement.x, world.y - placement.y);
        transform = Affine2::from_translation(position) * transform;

        Ok(DrawInstruction {
            slot: slot.name.clone(),
            sprite: sprite.name.clone(),
            transform,
            source: sprite.source_rect(),
            rotated: sprite.rotated,
        })
    }

    /// Stream the frame into `renderer`; returns the number of instructions drawn.
    pub fn render(&self, renderer: &mut dyn Renderer, origin_x: f32, origin_y: f32) -> usize {
        let frame = self.compose(origin_x, origin_y);
        for instruction in &frame {
            renderer.draw(&self.atlas.image_name, instruction);
        }
        frame.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::parse_atlas;
    use crate::data::{Attachment, BoneData};

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-4, "left={a} right={b}");
    }

    fn slot(name: &str, bone: &str, attachment: Option<&str>) -> SlotData {
        SlotData {
            name: name.into(),
            bone: bone.into(),
            attachment: attachment.map(Into::into),
        }
    }

    #[test]
    fn unrotated_sprite_is_centered_and_placed() {
        let hierarchy = BoneHierarchy::new(vec![BoneData::new("root").at(10.0, 20.0)]).unwrap();
        let pose = BoneState::zeroed(hierarchy.len());
        let atlas = parse_atlas(
            "a.png\nsize: 64,64\nfilter: Linear,Linear\npma: false\nbox\nbounds: 4,8,10,6\noffsets: 0,0,10,6\n",
        )
        .unwrap();
        let mut skin = Skin {
            name: "default".into(),
            ..Default::default()
        };
        skin.attachments.entry("s".into()).or_default().insert(
            "box".into(),
            Attachment {
                x: 1.0,
                y: 2.0,
                ..Default::default()
            },
        );
        let slots = [slot("s", "root", Some("box"))];
        let composer = Composer {
            hierarchy: &hierarchy,
            pose: &pose,
            slots: &slots,
            skin: Some(&skin),
            atlas: &atlas,
        };

        let frame = composer.compose(100.0, 100.0);
        assert_eq!(frame.len(), 1);
        let draw = &frame[0];
        assert_eq!(draw.source, Rect::new(4, 8, 10, 6));
        assert!(!draw.rotated);
        // Bone y is flipped (-20); attachment y is subtracted.
        let p = draw.transform.transform_point2(Vec2::ZERO);
        approx(p.x, 100.0 + 10.0 + 1.0 - 5.0);
        approx(p.y, 100.0 - 20.0 - 2.0 - 3.0);
    }

    #[test]
    fn missing_skin_skips_everything() {
        let hierarchy = BoneHierarchy::new(vec![BoneData::new("root")]).unwrap();
        let pose = BoneState::zeroed(1);
        let atlas = parse_atlas("a.png\nsize: 1,1\nfilter: Linear\npma: false\n").unwrap();
        let slots = [slot("s", "root", Some("box")), slot("t", "root", None)];
        let composer = Composer {
            hierarchy: &hierarchy,
            pose: &pose,
            slots: &slots,
            skin: None,
            atlas: &atlas,
        };
        assert!(composer.compose(0.0, 0.0).is_empty());
        let mut sink: Vec<DrawInstruction> = Vec::new();
        assert_eq!(composer.render(&mut sink, 0.0, 0.0), 0);
    }
}
