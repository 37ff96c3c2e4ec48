use crate::data::SkeletonDocument;
use crate::error::SkeletonError;

/// Public API: parse a skeleton JSON document into [`SkeletonDocument`].
///
/// Notes:
/// - Every top-level key is optional; unknown keys (events, slot timelines, ...) are ignored.
/// - Empty `parent` / `attachment` strings are read as absent.
/// - Keyframe times are validated here; bone cycles are detected when the
///   [`crate::BoneHierarchy`] is built.
pub fn parse_skeleton_json(s: &str) -> Result<SkeletonDocument, SkeletonError> {
    let doc: SkeletonDocument = serde_json::from_str(s)?;
    doc.validate_basic()?;
    log::debug!(
        "parsed skeleton '{}': {} bones, {} slots, {} skins, {} animations",
        doc.skeleton.hash,
        doc.bones.len(),
        doc.slots.len(),
        doc.skins.len(),
        doc.animations.len()
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InheritMode;

    const DOC: &str = r#"{
        "skeleton": { "hash": "abc", "spine": "4.1.24", "x": -10, "y": -2, "width": 200, "height": 300, "images": "./images/", "audio": "" },
        "bones": [
            { "name": "root" },
            { "name": "hip", "parent": "root", "y": 40, "length": 12.5, "inherit": "noScale" },
            { "name": "head", "parent": "hip", "rotation": 90, "x": 3, "transform": "onlyTranslation" },
            { "name": "tail", "parent": "", "inherit": "somethingNew" }
        ],
        "slots": [
            { "name": "body", "bone": "hip", "attachment": "torso" },
            { "name": "fx", "bone": "root", "attachment": "" },
            { "name": "hat", "bone": "head" }
        ],
        "skins": [
            { "name": "default", "attachments": {
                "body": { "torso": { "x": 1.5, "y": -2, "rotation": 4, "width": 10, "height": 20, "type": "region" } }
            } }
        ],
        "animations": {
            "walk": { "bones": { "hip": {
                "translate": [ { "x": 1 }, { "time": 0.5, "x": 3, "y": 2, "curve": "stepped" } ],
                "rotate": [ { "value": 5 }, { "time": 1, "angle": 15 } ]
            } } },
            "idle": { "bones": {} },
            "attack": {}
        },
        "events": { "hit": {} }
    }"#;

    #[test]
    fn parses_full_document() {
        let doc = parse_skeleton_json(DOC).unwrap();
        assert_eq!(doc.skeleton.hash, "abc");
        assert_eq!(doc.skeleton.width, 200.0);

        assert_eq!(doc.bones.len(), 4);
        assert_eq!(doc.bones[0].parent, None);
        assert_eq!(doc.bones[1].parent.as_deref(), Some("root"));
        assert_eq!(doc.bones[1].length, 12.5);
        assert_eq!(doc.bones[1].inherit, InheritMode::NoScale);
        assert_eq!(doc.bones[2].rotation, 90.0);
        assert_eq!(doc.bones[2].inherit, InheritMode::OnlyTranslation);
        assert_eq!(doc.bones[3].parent, None);
        assert_eq!(doc.bones[3].inherit, InheritMode::Other);

        assert_eq!(doc.slots[0].attachment.as_deref(), Some("torso"));
        assert_eq!(doc.slots[1].attachment, None);
        assert_eq!(doc.slots[2].attachment, None);

        let att = doc.skins[0].attachment("body", "torso").unwrap();
        assert_eq!((att.x, att.y, att.rotation), (1.5, -2.0, 4.0));
        assert_eq!((att.width, att.height), (10.0, 20.0));

        let names: Vec<&str> = doc.animations.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["walk", "idle", "attack"]);
        let hip = &doc.animations["walk"].bones["hip"];
        assert_eq!(hip.translate[0].time, 0.0);
        assert_eq!(hip.translate[1].y, 2.0);
        assert_eq!(hip.rotate[1].value, 15.0);
    }

    #[test]
    fn empty_object_is_an_empty_document() {
        let doc = parse_skeleton_json("{}").unwrap();
        assert!(doc.bones.is_empty());
        assert!(doc.animations.is_empty());
    }

    #[test]
    fn malformed_json_is_structural_error() {
        assert!(matches!(
            parse_skeleton_json(r#"{ "bones": [ { "parent": "x" } ] }"#),
            Err(SkeletonError::Json { .. })
        ));
        assert!(matches!(
            parse_skeleton_json("not json"),
            Err(SkeletonError::Json { .. })
        ));
    }

    #[test]
    fn non_monotonic_track_fails_load() {
        let doc = r#"{ "bones": [ { "name": "root" } ],
            "animations": { "bad": { "bones": { "root": { "translate": [ { "time": 1 }, { "time": 0.5 } ] } } } } }"#;
        assert!(matches!(
            parse_skeleton_json(doc),
            Err(SkeletonError::InvalidKeyframeTime { .. })
        ));
    }
}
